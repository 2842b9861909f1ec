pub mod main_handler;
pub mod menu;

pub mod codegen;
pub mod config;
pub mod core;
pub mod env;
pub mod eval;
pub mod model;
pub mod parse;
pub mod pool;
pub mod problem;
pub mod search;
pub mod solve;
pub mod typecheck;
pub mod util;

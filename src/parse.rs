//! # Parsing encoded programs
//!
//! Programs are exchanged in a compact textual encoding: `|`-separated tokens,
//! starting with the input types and followed by one token per statement, e.g.
//! `LIST|INT|TAKE,1,0|SORT,2`. This module parses that encoding into a
//! [`Program`]; the inverse lives in [`crate::codegen`].
//!
//! Parsing is purely syntactic (plus name resolution). Use
//! [`crate::typecheck::program`] to check that the result is well-formed.

use crate::core::*;

use chumsky::error::SimpleReason;
use chumsky::prelude::*;

// Shorthand

trait P<T>: Parser<char, T, Error = Simple<char>> {}
impl<S, T> P<T> for S where S: Parser<char, T, Error = Simple<char>> {}

// Errors

fn error(title: &str, code: i32, src: &str, err: &Simple<char>) -> String {
    use ariadne::*;

    let err_span = err.span();
    let err_expected = err
        .expected()
        .filter_map(|mtok| mtok.map(|tok| format!("`{}`", tok)))
        .collect::<Vec<_>>();

    let error_color = Color::Red;

    let label = match err.reason() {
        SimpleReason::Custom(msg) => msg.clone(),
        _ => "Unexpected token".to_owned(),
    };

    let mut report = Report::build(ReportKind::Error, "program", err_span.start)
        .with_code(code)
        .with_message(title)
        .with_label(
            Label::new(("program", err_span))
                .with_message(format!("{}", label.clone().fg(error_color)))
                .with_color(error_color),
        );

    if !err_expected.is_empty() {
        report = report.with_note(format!(
            "{}{}",
            if err_expected.len() == 1 {
                format!("Expected {}", err_expected[0])
            } else {
                format!("Expected one of {}", err_expected.join(", "))
            },
            match err.found() {
                Some(tok) => format!(", but found `{}`", tok),
                None => "".to_owned(),
            }
        ));
    }

    let mut buf: Vec<u8> = vec![];
    match report
        .finish()
        .write(sources(vec![("program", src)]), &mut buf)
    {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}: {}", title, label),
    }
}

// Helpers

enum Item {
    Input(Type),
    Statement(Statement),
}

fn atom() -> impl P<String> {
    none_of(",| \t\r\n").repeated().at_least(1).collect()
}

fn arg() -> impl P<Arg> {
    atom().try_map(|s: String, span| {
        if s.chars().all(|c| c.is_ascii_digit()) {
            return s.parse().map(Arg::Var).map_err(|_| {
                Simple::custom(span, format!("variable index `{}` too large", s))
            });
        }
        Lambda::from_name(&s)
            .map(Arg::Lambda)
            .ok_or_else(|| Simple::custom(span, format!("unknown lambda `{}`", s)))
    })
}

fn item() -> impl P<Item> {
    atom()
        .then(just(',').ignore_then(arg()).repeated())
        .try_map(|(head, args), span| {
            if let Some(t) = Type::from_name(&head) {
                if args.is_empty() {
                    return Ok(Item::Input(t));
                }
                return Err(Simple::custom(
                    span,
                    format!("input type `{}` takes no arguments", head),
                ));
            }
            Function::from_name(&head)
                .map(|f| Item::Statement(Statement::new(f, args)))
                .ok_or_else(|| {
                    Simple::custom(span, format!("unknown function `{}`", head))
                })
        })
}

// Main

fn program_parser() -> impl P<Program> {
    item()
        .separated_by(just('|'))
        .at_least(1)
        .padded()
        .then_ignore(end())
        .try_map(|items, span| {
            let mut input_types = vec![];
            let mut statements = vec![];
            for it in items {
                match it {
                    Item::Input(t) => {
                        if !statements.is_empty() {
                            return Err(Simple::custom(
                                span,
                                "input types must precede all statements",
                            ));
                        }
                        input_types.push(t)
                    }
                    Item::Statement(s) => statements.push(s),
                }
            }
            Ok(Program::new(input_types, statements))
        })
}

/// Parse an encoded program
pub fn program(src: &str) -> Result<Program, String> {
    program_parser().parse(src).map_err(|errs| match errs.first() {
        Some(e) => error("Program parse error", 0, src, e),
        None => "Program parse error".to_owned(),
    })
}

use std::io;

/// Errors that stop the interpreter. Each carries the number of the line being executed.
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    /// Control ran past the last line without `END`. `line` is `None` for an empty program.
    #[error("[Line {}] PC out of range", display_line(.line))]
    PcOutOfRange { line: Option<i16> },
    #[error("[Line {line}] Stack empty")]
    EmptyStack { line: i16 },
    #[error("[Line {line}] Arithmetic overflow")]
    ArithmeticOverflow { line: i16 },
    #[error("[Line {line}] Division by zero")]
    DivisionByZero { line: i16 },
    #[error("[Line {line}] Cannot compare non integer values")]
    NonIntegerComparison { line: i16 },
    #[error("[Line {line}] Variable {ident} has no value")]
    UndefinedVariable { line: i16, ident: String },
    #[error("[Line {line}] Input stream closed")]
    EndOfInput { line: i16 },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn display_line(line: &Option<i16>) -> String {
    match line {
        Some(line) => line.to_string(),
        None => "-".to_string(),
    }
}

use std::fmt;

/// Where a syntax error was noticed. Invalid tokens carry no usable text, so
/// they get no location suffix.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorLocation {
    /// At a concrete token; holds its raw text.
    Lexeme(String),
    /// At the end of the token stream.
    EndOfInput,
    /// At an invalid token.
    Invalid,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ErrorType {
    // Parsing errors.
    SyntaxError {
        message: String,
        line: usize,
        column: usize,
        location: ErrorLocation,
    },

    // Evaluation-level conditions. These never abort the run: callers fall
    // back to a safe default and keep going.
    UndefinedVariable {
        name: String,
        line: usize,
    },
    ConstAssignment {
        name: String,
        line: usize,
    },
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorType::SyntaxError { message, line, column, location } => {
                write!(f, "[line {}:{}] Error", line, column)?;
                match location {
                    ErrorLocation::Lexeme(raw) => write!(f, " at '{}'", raw)?,
                    ErrorLocation::EndOfInput => write!(f, " at end")?,
                    ErrorLocation::Invalid => (),
                }
                write!(f, ": {}", message)
            },
            ErrorType::UndefinedVariable { name, line } => {
                write!(f, "Line {}: '{}' is not defined.", line, name)
            },
            ErrorType::ConstAssignment { name, line } => {
                write!(f, "Line {}: assignment to constant '{}' was rejected.", line, name)
            },
        }
    }
}

/// Prints the diagnostic to the error channel. Reporting never halts the
/// run by itself.
pub fn report(type_: &ErrorType) {
    eprintln!("{}", type_);
}

pub fn report_and_return(type_: ErrorType) -> ErrorType {
    report(&type_);
    type_
}

#[cfg(test)]
mod tests {
    use super::{ErrorLocation, ErrorType};

    #[test]
    fn syntax_error_formats() {
        let at_token = ErrorType::SyntaxError {
            message: String::from("Expect ';' after assignment."),
            line: 3,
            column: 7,
            location: ErrorLocation::Lexeme(String::from("print")),
        };
        assert_eq!(
            at_token.to_string(),
            "[line 3:7] Error at 'print': Expect ';' after assignment."
        );

        let at_end = ErrorType::SyntaxError {
            message: String::from("Expect expression."),
            line: 1,
            column: 9,
            location: ErrorLocation::EndOfInput,
        };
        assert_eq!(at_end.to_string(), "[line 1:9] Error at end: Expect expression.");

        let at_invalid = ErrorType::SyntaxError {
            message: String::from("Expect expression."),
            line: 2,
            column: 1,
            location: ErrorLocation::Invalid,
        };
        assert_eq!(at_invalid.to_string(), "[line 2:1] Error: Expect expression.");
    }
}

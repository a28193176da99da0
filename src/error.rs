use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Everything that can go wrong between reading an expression and producing
/// its value. Each variant points into the input it was raised for.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("unrecognized character `{ch}`")]
    #[diagnostic(code(calc::unrecognized_character))]
    UnrecognizedCharacter {
        ch: char,
        #[label("this input character")]
        at: SourceSpan,
    },

    #[error("invalid number `{literal}`")]
    #[diagnostic(
        code(calc::invalid_number),
        help("a number is a run of digits with at most one decimal point")
    )]
    InvalidNumber {
        literal: String,
        #[label("this numeric literal")]
        at: SourceSpan,
    },

    #[error("unexpected token `{found}`")]
    #[diagnostic(code(calc::unexpected_token))]
    UnexpectedToken {
        found: String,
        #[label("here")]
        at: SourceSpan,
    },

    #[error("unexpected end of input")]
    #[diagnostic(
        code(calc::unexpected_eof),
        help("expected a number, `-` or `(`")
    )]
    UnexpectedEndOfInput {
        #[label("expression ends here")]
        at: SourceSpan,
    },

    #[error("unmatched parenthesis")]
    #[diagnostic(code(calc::unmatched_paren))]
    UnmatchedParenthesis {
        #[label("this parenthesis is never closed")]
        at: SourceSpan,
    },

    #[error("division by zero")]
    #[diagnostic(code(calc::division_by_zero))]
    DivisionByZero {
        #[label("the right-hand side of this division is zero")]
        at: SourceSpan,
    },

    #[error("numeric overflow")]
    #[diagnostic(
        code(calc::overflow),
        help("results must stay within the range of a 64-bit float")
    )]
    Overflow {
        #[label("this is not a finite number")]
        at: SourceSpan,
    },

    #[error("expression nested deeper than {limit} levels")]
    #[diagnostic(code(calc::too_complex))]
    InputTooComplex {
        limit: usize,
        #[label("nesting limit exceeded here")]
        at: SourceSpan,
    },
}

/// The variant of a [`CalcError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnrecognizedCharacter,
    InvalidNumber,
    UnexpectedToken,
    UnexpectedEndOfInput,
    UnmatchedParenthesis,
    DivisionByZero,
    Overflow,
    InputTooComplex,
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::UnrecognizedCharacter { .. } => ErrorKind::UnrecognizedCharacter,
            CalcError::InvalidNumber { .. } => ErrorKind::InvalidNumber,
            CalcError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            CalcError::UnexpectedEndOfInput { .. } => ErrorKind::UnexpectedEndOfInput,
            CalcError::UnmatchedParenthesis { .. } => ErrorKind::UnmatchedParenthesis,
            CalcError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            CalcError::Overflow { .. } => ErrorKind::Overflow,
            CalcError::InputTooComplex { .. } => ErrorKind::InputTooComplex,
        }
    }

    /// Labelled span in the input.
    pub fn span(&self) -> SourceSpan {
        match self {
            CalcError::UnrecognizedCharacter { at, .. }
            | CalcError::InvalidNumber { at, .. }
            | CalcError::UnexpectedToken { at, .. }
            | CalcError::UnexpectedEndOfInput { at }
            | CalcError::UnmatchedParenthesis { at }
            | CalcError::DivisionByZero { at }
            | CalcError::Overflow { at }
            | CalcError::InputTooComplex { at, .. } => *at,
        }
    }

    /// Zero-based byte offset of the error in the input.
    ///
    /// This equals the character index only while everything before the
    /// error is ASCII. Non-ASCII whitespace is skipped, so in `"\u{a0}@"`
    /// the `@` is character 1 but byte 2.
    pub fn position(&self) -> usize {
        self.span().offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_position() {
        let err = CalcError::UnrecognizedCharacter {
            ch: '@',
            at: (1, 1).into(),
        };

        assert_eq!(err.kind(), ErrorKind::UnrecognizedCharacter);
        assert_eq!(err.position(), 1);
        assert_eq!(err.to_string(), "unrecognized character `@`");
    }

    #[test]
    fn test_end_of_input_span_is_empty() {
        let err = CalcError::UnexpectedEndOfInput { at: (2, 0).into() };

        assert_eq!(err.span().len(), 0);
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn test_limit_in_message() {
        let err = CalcError::InputTooComplex {
            limit: 8,
            at: (8, 1).into(),
        };

        assert_eq!(err.to_string(), "expression nested deeper than 8 levels");
        assert_eq!(err.kind(), ErrorKind::InputTooComplex);
    }
}

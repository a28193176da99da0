//! Headless model of the calculator's keypad and display.
//!
//! Key presses build up the display text; `=` hands that text to
//! [`evaluate_with`] and replaces it with the result. Presenting the display
//! is left to whoever drives the [`Calculator`].

use std::str::FromStr;

use miette::Diagnostic;
use thiserror::Error;

use crate::{
    eval::{evaluate_with, format_number, Options},
    error::CalcError,
};

/// Shown in place of a result when evaluation fails.
pub const ERROR_MSG: &str = "ERROR";

/// Key labels, row by row.
pub const KEYPAD: [[&str; 5]; 4] = [
    ["7", "8", "9", "/", "C"],
    ["4", "5", "6", "*", "("],
    ["1", "2", "3", "-", ")"],
    ["0", "00", ".", "+", "="],
];

#[derive(Diagnostic, Debug, Error, Clone, PartialEq, Eq)]
#[error("no key labelled `{0}`")]
#[diagnostic(
    code(calc::unknown_key),
    help("keys are 0-9, 00, ., +, -, *, /, (, ), C and =")
)]
pub struct UnknownKey(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A digit key. Only `0..=9` name real keys; [`Key::digit`] checks the
    /// range, and a larger value is read modulo 10.
    Digit(u8),
    DoubleZero,
    Point,
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Clear,
    Equals,
}

impl Key {
    pub fn digit(d: u8) -> Option<Self> {
        (d <= 9).then_some(Key::Digit(d))
    }

    pub fn label(self) -> &'static str {
        const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

        match self {
            Key::Digit(d) => DIGITS[usize::from(d % 10)],
            Key::DoubleZero => "00",
            Key::Point => ".",
            Key::Plus => "+",
            Key::Minus => "-",
            Key::Star => "*",
            Key::Slash => "/",
            Key::LeftParen => "(",
            Key::RightParen => ")",
            Key::Clear => "C",
            Key::Equals => "=",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "00" => Key::DoubleZero,
            "." => Key::Point,
            "+" => Key::Plus,
            "-" => Key::Minus,
            "*" => Key::Star,
            "/" => Key::Slash,
            "(" => Key::LeftParen,
            ")" => Key::RightParen,
            "C" => Key::Clear,
            "=" => Key::Equals,
            _ => match s.as_bytes() {
                [d @ b'0'..=b'9'] => Key::Digit(*d - b'0'),
                _ => return Err(UnknownKey(s.to_string())),
            },
        };
        Ok(key)
    }
}

/// Display text plus the key handling around it.
#[derive(Debug, Default)]
pub struct Calculator {
    display: String,
    options: Options,
    /// The failed evaluation and the text it was run on.
    last_error: Option<(CalcError, String)>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Why the display currently reads [`ERROR_MSG`], if it does.
    pub fn last_error(&self) -> Option<&CalcError> {
        self.last_error.as_ref().map(|(err, _)| err)
    }

    /// The display text that produced [`Calculator::last_error`]; the
    /// error's span points into it.
    pub fn failed_expression(&self) -> Option<&str> {
        self.last_error.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn press(&mut self, key: Key) {
        tracing::debug!(%key, display = %self.display, "key pressed");

        match key {
            Key::Clear => self.clear(),
            Key::Equals => self.calculate(),
            _ => {
                if self.display == ERROR_MSG {
                    self.clear();
                }
                self.display.push_str(key.label());
            }
        }
    }

    pub fn press_all(&mut self, keys: impl IntoIterator<Item = Key>) {
        for key in keys {
            self.press(key);
        }
    }

    pub fn clear(&mut self) {
        self.display.clear();
        self.last_error = None;
    }

    fn calculate(&mut self) {
        match evaluate_with(&self.display, &self.options) {
            Ok(value) => {
                let shown = format_number(value);
                tracing::debug!(expression = %self.display, result = %shown, "evaluated");
                self.display = shown;
                self.last_error = None;
            }
            Err(err) => {
                tracing::info!(expression = %self.display, error = %err, "evaluation failed");
                let text = std::mem::replace(&mut self.display, ERROR_MSG.to_string());
                self.last_error = Some((err, text));
            }
        }
    }
}

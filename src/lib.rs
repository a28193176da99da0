pub mod lexer;
pub mod parser;
pub mod eval;
pub mod error;
pub mod keypad;

pub use lexer::*;
pub use eval::*;
pub use error::{CalcError, ErrorKind};

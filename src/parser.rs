use miette::SourceSpan;

use crate::{
    error::CalcError,
    lexer::{Token, TokenKind},
    Lexer,
};

/// Nesting allowed by [`Parser::new`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Hard ceiling on any requested nesting limit. Each level costs several
/// stack frames, and deeper input has to come back as `InputTooComplex`
/// rather than overflow the stack.
pub const MAX_DEPTH_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Minus,
    Plus,
    Star,
    Slash,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Op::Minus => "-",
                Op::Plus => "+",
                Op::Star => "*",
                Op::Slash => "/",
            }
        )
    }
}

/// One `op operand` step of a left-associative chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub op: Op,
    /// Where the operator sits in the input.
    pub at: SourceSpan,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number {
        value: f64,
        at: SourceSpan,
    },
    Negate(Box<Expr>),
    /// `head op rhs op rhs ...`, folded from the left. All steps share one
    /// precedence level, so the tree only deepens through parentheses and
    /// unary minus.
    Chain {
        head: Box<Expr>,
        steps: Vec<Step>,
    },
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number { value, .. } => write!(f, "{}", value),
            Expr::Negate(operand) => write!(f, "(- {})", operand),
            Expr::Chain { head, steps } => {
                for step in steps.iter().rev() {
                    write!(f, "({} ", step.op)?;
                }
                write!(f, "{}", head)?;
                for step in steps {
                    write!(f, " {})", step.rhs)?;
                }
                Ok(())
            }
        }
    }
}

fn span_of(token: &Token<'_>) -> SourceSpan {
    (token.offset, token.slice.len()).into()
}

/// Recursive-descent parser for
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/') unary)*
/// unary   := '-' unary | primary
/// primary := Number | '(' expr ')'
/// ```
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_max_depth(input, DEFAULT_MAX_DEPTH)
    }

    /// Limits nesting to `max_depth`, clamped to [`MAX_DEPTH_LIMIT`].
    pub fn with_max_depth(input: &'a str, max_depth: usize) -> Self {
        Self {
            source: input,
            lexer: Lexer::new(input),
            depth: 0,
            max_depth: max_depth.min(MAX_DEPTH_LIMIT),
        }
    }

    /// Parses the whole input as one expression.
    pub fn parse(&mut self) -> Result<Expr, CalcError> {
        let expr = self.parse_expr()?;

        match self.peek()? {
            None => Ok(expr),
            Some(token) => Err(unexpected(&token)),
        }
    }

    /// Looks at the next token, surfacing lexer markers as errors.
    fn peek(&mut self) -> Result<Option<Token<'a>>, CalcError> {
        match self.lexer.peek() {
            Some(token) => check(token).map(Some),
            None => Ok(None),
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, CalcError> {
        let token = self.peek()?;
        self.lexer.next();
        Ok(token)
    }

    fn eof(&self) -> CalcError {
        CalcError::UnexpectedEndOfInput {
            at: (self.source.len(), 0).into(),
        }
    }

    fn enter(&mut self, token: &Token<'_>) -> Result<(), CalcError> {
        if self.depth >= self.max_depth {
            return Err(CalcError::InputTooComplex {
                limit: self.max_depth,
                at: span_of(token),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_expr(&mut self) -> Result<Expr, CalcError> {
        let head = self.parse_term()?;
        let mut steps = vec![];

        while let Some(token) = self.peek()? {
            let op = match token.kind {
                TokenKind::Plus => Op::Plus,
                TokenKind::Minus => Op::Minus,
                _ => break,
            };
            self.lexer.next();
            steps.push(Step {
                op,
                at: span_of(&token),
                rhs: self.parse_term()?,
            });
        }

        Ok(chain(head, steps))
    }

    fn parse_term(&mut self) -> Result<Expr, CalcError> {
        let head = self.parse_unary()?;
        let mut steps = vec![];

        while let Some(token) = self.peek()? {
            let op = match token.kind {
                TokenKind::Star => Op::Star,
                TokenKind::Slash => Op::Slash,
                _ => break,
            };
            self.lexer.next();
            steps.push(Step {
                op,
                at: span_of(&token),
                rhs: self.parse_unary()?,
            });
        }

        Ok(chain(head, steps))
    }

    fn parse_unary(&mut self) -> Result<Expr, CalcError> {
        match self.peek()? {
            Some(token) if token.kind == TokenKind::Minus => {
                self.lexer.next();
                self.enter(&token)?;
                let operand = self.parse_unary()?;
                self.leave();
                Ok(Expr::Negate(Box::new(operand)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, CalcError> {
        match self.next_token()? {
            Some(Token {
                kind: TokenKind::Number,
                slice,
                offset,
            }) => {
                let at: SourceSpan = (offset, slice.len()).into();
                match slice.parse::<f64>() {
                    Ok(value) if value.is_finite() => Ok(Expr::Number { value, at }),
                    Ok(_) => Err(CalcError::Overflow { at }),
                    Err(_) => Err(CalcError::InvalidNumber {
                        literal: slice.to_string(),
                        at,
                    }),
                }
            }
            Some(
                open @ Token {
                    kind: TokenKind::LeftParen,
                    ..
                },
            ) => {
                self.enter(&open)?;
                let inner = self.parse_expr()?;
                match self.next_token()? {
                    Some(Token {
                        kind: TokenKind::RightParen,
                        ..
                    }) => {}
                    Some(token) => return Err(unexpected(&token)),
                    None => {
                        return Err(CalcError::UnmatchedParenthesis {
                            at: span_of(&open),
                        })
                    }
                }
                self.leave();
                Ok(inner)
            }
            Some(token) => Err(unexpected(&token)),
            None => Err(self.eof()),
        }
    }
}

fn chain(head: Expr, steps: Vec<Step>) -> Expr {
    if steps.is_empty() {
        head
    } else {
        Expr::Chain {
            head: Box::new(head),
            steps,
        }
    }
}

fn check<'a>(token: &Token<'a>) -> Result<Token<'a>, CalcError> {
    match token.kind {
        TokenKind::Unrecognized => Err(CalcError::UnrecognizedCharacter {
            ch: token.slice.chars().next().unwrap_or_default(),
            at: span_of(token),
        }),
        TokenKind::InvalidNumber => Err(CalcError::InvalidNumber {
            literal: token.slice.to_string(),
            at: span_of(token),
        }),
        _ => Ok(*token),
    }
}

fn unexpected(token: &Token<'_>) -> CalcError {
    CalcError::UnexpectedToken {
        found: token.slice.to_string(),
        at: span_of(token),
    }
}

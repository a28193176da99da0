#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub slice: &'a str,
    pub offset: usize,
    pub kind: TokenKind,
}

impl<'a> std::fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    Number,
    /// A run of digits and points that does not form a number (`1.2.3`, `.`).
    InvalidNumber,
    /// A single character the calculator has no use for.
    Unrecognized,
}

/// Splits an input string into tokens.
///
/// Lexing never fails: characters that cannot start a token and malformed
/// numeric literals come out as marker tokens so the parser can report them
/// with their position.
#[derive(Debug)]
pub struct Lexer<'a> {
    rest: &'a str,
    byte: usize,
    peeked: Option<Option<Token<'a>>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            byte: 0,
            peeked: None,
        }
    }

    pub fn peek(&mut self) -> Option<&Token<'a>> {
        if self.peeked.is_none() {
            let next = self.lex();
            self.peeked = Some(next);
        }

        self.peeked.as_ref().and_then(Option::as_ref)
    }

    fn lex(&mut self) -> Option<Token<'a>> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let offset = self.byte;
            let slice = &self.rest[..c.len_utf8()];
            let c_onwards = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let make_token = |kind: TokenKind| {
                Some(Token {
                    slice,
                    kind,
                    offset,
                })
            };

            match c {
                '(' => return make_token(TokenKind::LeftParen),
                ')' => return make_token(TokenKind::RightParen),
                '+' => return make_token(TokenKind::Plus),
                '-' => return make_token(TokenKind::Minus),
                '*' => return make_token(TokenKind::Star),
                '/' => return make_token(TokenKind::Slash),
                '0'..='9' | '.' => {}
                c if c.is_whitespace() => continue,
                _ => return make_token(TokenKind::Unrecognized),
            }

            let end = c_onwards
                .find(|c: char| !matches!(c, '0'..='9' | '.'))
                .unwrap_or(c_onwards.len());
            let literal = &c_onwards[..end];
            let extra_byte = literal.len() - c.len_utf8();
            self.byte += extra_byte;
            self.rest = &self.rest[extra_byte..];

            let points = literal.bytes().filter(|b| *b == b'.').count();
            let kind = if points > 1 || points == literal.len() {
                TokenKind::InvalidNumber
            } else {
                TokenKind::Number
            };

            return Some(Token {
                slice: literal,
                offset,
                kind,
            });
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.peeked.take() {
            Some(next) => next,
            None => self.lex(),
        }
    }
}

/// Collects every token of `input`, marker tokens included.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parentheses() {
        let input = "( )";
        let mut lexer = Lexer::new(input);

        let expected_tokens = vec![
            Token {
                slice: "(",
                offset: 0,
                kind: TokenKind::LeftParen,
            },
            Token {
                slice: ")",
                offset: 2,
                kind: TokenKind::RightParen,
            },
        ];

        for expected_token in expected_tokens.into_iter() {
            assert_eq!(lexer.next().unwrap(), expected_token);
        }
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_numbers() {
        let input = "42 3.14 .5 7. 007";
        let tokens = tokenize(input);

        let expected_tokens = vec![
            Token {
                slice: "42",
                offset: 0,
                kind: TokenKind::Number,
            },
            Token {
                slice: "3.14",
                offset: 3,
                kind: TokenKind::Number,
            },
            Token {
                slice: ".5",
                offset: 8,
                kind: TokenKind::Number,
            },
            Token {
                slice: "7.",
                offset: 11,
                kind: TokenKind::Number,
            },
            Token {
                slice: "007",
                offset: 14,
                kind: TokenKind::Number,
            },
        ];

        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    fn test_minus_is_never_part_of_a_number() {
        let kinds: Vec<_> = tokenize("-100").into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Minus, TokenKind::Number]);
    }

    #[test]
    fn test_invalid_numbers() {
        let tokens = tokenize("1.2.3 + .");

        assert_eq!(
            tokens[0],
            Token {
                slice: "1.2.3",
                offset: 0,
                kind: TokenKind::InvalidNumber,
            }
        );
        assert_eq!(tokens[1].kind, TokenKind::Plus);
        assert_eq!(
            tokens[2],
            Token {
                slice: ".",
                offset: 8,
                kind: TokenKind::InvalidNumber,
            }
        );
    }

    #[test]
    fn test_operators() {
        let input = "+ - * /";
        let kinds: Vec<_> = tokenize(input).into_iter().map(|t| (t.slice, t.offset, t.kind)).collect();

        assert_eq!(
            kinds,
            vec![
                ("+", 0, TokenKind::Plus),
                ("-", 2, TokenKind::Minus),
                ("*", 4, TokenKind::Star),
                ("/", 6, TokenKind::Slash),
            ]
        );
    }

    #[test]
    fn test_unrecognized_characters_do_not_stop_lexing() {
        let tokens = tokenize("2@3");

        assert_eq!(
            tokens,
            vec![
                Token {
                    slice: "2",
                    offset: 0,
                    kind: TokenKind::Number,
                },
                Token {
                    slice: "@",
                    offset: 1,
                    kind: TokenKind::Unrecognized,
                },
                Token {
                    slice: "3",
                    offset: 2,
                    kind: TokenKind::Number,
                },
            ]
        );
    }

    #[test]
    fn test_offsets_are_bytes() {
        let tokens = tokenize("€1");

        assert_eq!(tokens[0].slice, "€");
        assert_eq!(tokens[0].kind, TokenKind::Unrecognized);
        assert_eq!(tokens[1].offset, 3);
    }

    #[test]
    fn test_whitespace_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n ").is_empty());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("(1)");

        assert_eq!(lexer.peek().map(|t| t.kind), Some(TokenKind::LeftParen));
        assert_eq!(lexer.peek().map(|t| t.kind), Some(TokenKind::LeftParen));
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::LeftParen));
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Number));
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::RightParen));
        assert_eq!(lexer.peek(), None);
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_nested_expressions() {
        let input = "(2+3)*(6/2)";
        let slices: Vec<_> = tokenize(input).into_iter().map(|t| t.slice).collect();

        assert_eq!(
            slices,
            vec!["(", "2", "+", "3", ")", "*", "(", "6", "/", "2", ")"]
        );
    }
}

//! Tokenizer for key match patterns and use expressions, built on logos.

use logos::Logos;

use super::SyntaxError;

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum Token {
    #[token("|")]
    Pipe,
    #[token("/")]
    Slash,
    #[token("@")]
    At,
    #[token("*")]
    Star,
    #[token(":")]
    Colon,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // NCName, ASCII only
    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*")]
    Name,
}

impl Token {
    /// Human-readable form for error messages.
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Token::Pipe => "`|`",
            Token::Slash => "`/`",
            Token::At => "`@`",
            Token::Star => "`*`",
            Token::Colon => "`:`",
            Token::DotDot => "`..`",
            Token::Dot => "`.`",
            Token::LParen => "`(`",
            Token::RParen => "`)`",
            Token::Name => "a name",
        }
    }
}

/// A token with its source text and byte offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Lexeme<'src> {
    pub token: Token,
    pub text: &'src str,
    pub offset: usize,
}

/// Tokenize a whole expression.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Lexeme<'_>>, SyntaxError> {
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();
    while let Some(result) = lexer.next() {
        let offset = lexer.span().start;
        match result {
            Ok(token) => lexemes.push(Lexeme {
                token,
                text: lexer.slice(),
                offset,
            }),
            Err(()) => {
                return Err(SyntaxError::BadCharacter {
                    found: lexer.slice().to_owned(),
                    offset,
                })
            }
        }
    }
    Ok(lexemes)
}

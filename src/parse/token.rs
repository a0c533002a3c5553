use logos::Logos;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexerError {
    #[default]
    #[error("unrecognized input")]
    Unrecognized,
}

#[derive(Debug, PartialEq, Logos)]
#[logos(skip r"[ \t\r\n\f\x0B]+", error = LexerError)]
pub enum Token<'a> {
    #[token("|")]
    Pipe,

    #[regex(r"[^ \t\r\n\f\x0B|]+")]
    Word(&'a str),
}

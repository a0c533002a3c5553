use std::ffi::{CString, NulError};

use logos::{Lexer, Logos};
use thiserror::Error;

use self::token::{LexerError, Token};

pub mod token;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty command in pipeline")]
    EmptyStage,
    #[error("failed to tokenize command: {0}")]
    Lexer(#[from] LexerError),
}

/// One program invocation. Never empty: the program name is the first token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Stage<'a> {
    pub fn program(&self) -> &'a str {
        self.tokens[0]
    }

    pub fn args(&self) -> &[&'a str] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    /// The argument vector handed to `execvp`, program name included.
    pub fn argv(&self) -> Result<Vec<CString>, NulError> {
        self.tokens.iter().map(|token| CString::new(*token)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline<'a> {
    stages: Vec<Stage<'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn stages(&self) -> &[Stage<'a>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// The first stage of a line, tokenized, and whatever follows its `|`.
///
/// Built-in dispatch only looks at the head. The rest of the line is left
/// untouched until [`Head::into_pipeline`] is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head<'a> {
    stage: Stage<'a>,
    rest: Option<&'a str>,
}

impl<'a> Head<'a> {
    pub fn program(&self) -> &'a str {
        self.stage.program()
    }

    pub fn args(&self) -> &[&'a str] {
        self.stage.args()
    }

    pub fn into_pipeline(self) -> Result<Pipeline<'a>, ParseError> {
        let mut stages = vec![self.stage];

        if let Some(rest) = self.rest {
            for segment in split_pipeline(rest) {
                stages.push(tokenize(segment)?);
            }
        }

        Ok(Pipeline { stages })
    }
}

pub fn parse_head(line: &str) -> Result<Head<'_>, ParseError> {
    let mut lexer = Token::lexer(terminate(line));
    let (tokens, rest) = lex_stage(&mut lexer)?;

    if tokens.is_empty() {
        return Err(ParseError::EmptyStage);
    }

    Ok(Head {
        stage: Stage { tokens },
        rest,
    })
}

pub fn split_pipeline(line: &str) -> Vec<&str> {
    terminate(line).split('|').collect()
}

pub fn tokenize(stage: &str) -> Result<Stage<'_>, ParseError> {
    let mut lexer = Token::lexer(terminate(stage));
    let (tokens, _) = lex_stage(&mut lexer)?;

    if tokens.is_empty() {
        return Err(ParseError::EmptyStage);
    }

    Ok(Stage { tokens })
}

/// Reads words up to the next pipe. Returns the source after that pipe, if any.
fn lex_stage<'a>(
    lexer: &mut Lexer<'a, Token<'a>>,
) -> Result<(Vec<&'a str>, Option<&'a str>), ParseError> {
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next() {
        match token? {
            Token::Word(word) => tokens.push(word),
            Token::Pipe => return Ok((tokens, Some(lexer.remainder()))),
        }
    }

    Ok((tokens, None))
}

fn terminate(line: &str) -> &str {
    match line.find('\n') {
        Some(end) => &line[..end],
        None => line,
    }
}

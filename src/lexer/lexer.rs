use std::{
    fs,
    path::PathBuf,
    sync::{
        mpsc::{self, Receiver},
        Arc,
    },
    thread::{self, JoinHandle},
};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

// Every pattern is anchored, so a match always starts at the cursor.
lazy_static! {
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new("^([0-9]+(\\.[0-9]*)?|\\.[0-9]+)").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new("^\\s+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^#[^\\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^\\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new("^\\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new("^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new("^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new("^[[:punct:]]").unwrap(), handler: operator_handler },
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Arc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = Arc::new(file.unwrap_or_else(|| String::from("shell")));

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Arc::clone(&self.file))
    }

    /// Span of the next `len` bytes.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: Position((self.pos + len) as u32, Arc::clone(&self.file)),
        }
    }

    fn matched(&self, regex: &Regex) -> Option<String> {
        regex.find(self.remainder()).map(|m| m.as_str().to_string())
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) {
    let Some(matched) = lexer.matched(regex) else {
        return;
    };

    let span = lexer.span_of(matched.len());
    let len = matched.len();
    lexer.push(MK_TOKEN!(TokenKind::Number, matched, span));
    lexer.advance_n(len);
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    if let Some(matched) = lexer.matched(regex) {
        lexer.advance_n(matched.len());
    }
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let Some(value) = lexer.matched(regex) else {
        return;
    };

    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);
    let span = lexer.span_of(value.len());
    let len = value.len();

    lexer.push(MK_TOKEN!(kind, value, span));
    lexer.advance_n(len);
}

fn operator_handler(lexer: &mut Lexer, regex: &Regex) {
    let Some(operator) = lexer.matched(regex) else {
        return;
    };

    let span = lexer.span_of(operator.len());
    let len = operator.len();
    lexer.push(MK_TOKEN!(TokenKind::Operator, operator, span));
    lexer.advance_n(len);
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex),
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().map(String::from).unwrap_or_default(),
                    },
                    lex.position(),
                ))
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}

/// Runs the lexer stage on its own thread.
///
/// Files are read and tokenized in order and their tokens are sent down the
/// returned channel. Per-file EOF tokens are not forwarded: the stream ends
/// when the sender is dropped after the last file. A file that cannot be read
/// or tokenized stops the stage and its error is returned by the join handle.
pub fn spawn_lexer(files: Vec<PathBuf>) -> (Receiver<Token>, JoinHandle<Result<(), Error>>) {
    let (sender, receiver) = mpsc::channel();

    let handle = thread::spawn(move || -> Result<(), Error> {
        for file in files {
            let source = fs::read_to_string(&file).map_err(|error| ErrorImpl::Io {
                message: format!("can not open the file {}: {}", file.display(), error),
            })?;
            let tokens = tokenize(source, Some(file.to_string_lossy().into_owned()))?;

            debug!(file = %file.display(), tokens = tokens.len(), "tokenized source file");

            for token in tokens.into_iter().filter(|token| token.kind != TokenKind::EOF) {
                if sender.send(token).is_err() {
                    // Downstream stopped consuming.
                    return Ok(());
                }
            }
        }

        Ok(())
    });

    (receiver, handle)
}

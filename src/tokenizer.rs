use log::{debug, trace};

use crate::error::{syntax_error, Position, ScriptError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    LeftParen,
    RightParen,

    Symbol(String),
    Number(f64),

    EOF,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub span: Span,
}

pub fn tokenize(bytes: &[u8]) -> Result<Vec<Token>, ScriptError> {
    let n = bytes.len();
    let mut position = Position::start();
    let mut tokens = Vec::new();

    loop {
        let skipped = bytes[position.offset..]
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        position = advance(bytes, position, skipped);

        match next_token(&bytes[position.offset..]) {
            Ok((_, TokenType::EOF)) => {
                assert_eq!(position.offset, n);
                tokens.push(Token {
                    token_type: TokenType::EOF,
                    span: Span::new(position, position),
                });
                trace!("tokenized {} bytes into {} tokens", n, tokens.len());
                return Ok(tokens);
            }
            Ok((bytes_read, token_type)) => {
                let end = advance(bytes, position, bytes_read);
                tokens.push(Token {
                    token_type,
                    span: Span::new(position, end),
                });
                position = end;
            }
            Err(expected) => {
                debug!("unexpected input at {}", position);
                return syntax_error(expected, position);
            }
        }
    }
}

/// Moves `position` forward over `count` bytes of `bytes`.
fn advance(bytes: &[u8], mut position: Position, count: usize) -> Position {
    for &b in &bytes[position.offset..position.offset + count] {
        if b == b'\n' {
            position.line += 1;
            position.column = 1;
        } else {
            position.column += 1;
        }
    }
    position.offset += count;
    position
}

fn is_symbol_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'+' | b'-' | b'*' | b'/')
}

fn is_symbol_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-')
}

/// Scans one token at the start of `bytes`, which has no leading whitespace.
/// On failure returns a description of what was expected.
fn next_token(bytes: &[u8]) -> Result<(usize, TokenType), &'static str> {
    let n = bytes.len();
    if n == 0 {
        return Ok((0, TokenType::EOF));
    }

    match bytes[0] {
        b'(' => return Ok((1, TokenType::LeftParen)),
        b')' => return Ok((1, TokenType::RightParen)),
        _ => (),
    }

    if is_symbol_start(bytes[0]) {
        let end_byte = 1 + bytes[1..]
            .iter()
            .take_while(|&&b| is_symbol_continue(b))
            .count();

        let name = String::from_utf8_lossy(&bytes[..end_byte]).into_owned();
        return Ok((end_byte, TokenType::Symbol(name)));
    }

    if bytes[0].is_ascii_digit() {
        let end_byte = bytes.iter().take_while(|b| b.is_ascii_digit()).count();

        let number = std::str::from_utf8(&bytes[..end_byte])
            .ok()
            .and_then(|digits| digits.parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .ok_or("number small enough to be finite")?;
        return Ok((end_byte, TokenType::Number(number)));
    }

    Err("symbol, number or list")
}

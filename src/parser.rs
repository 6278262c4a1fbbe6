use crate::{
    error::{syntax_error, Position, ScriptError, Span},
    tokenizer::{tokenize, Token, TokenType},
};
use log::trace;
use serde::Serialize;
use serde_json::json;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Serialize)]
pub struct Expr {
    #[serde(flatten)]
    pub expr_type: ExprType,
    #[serde(flatten)]
    pub span: Span,
}

/// Trees compare by shape; spans are ignored.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.expr_type == other.expr_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExprType {
    Symbol { symbol: String },
    Number { number: f64 },
    List { list: Vec<Expr> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename = "module")]
pub struct Module {
    pub exprs: Vec<Expr>,
    #[serde(flatten)]
    pub span: Span,
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.exprs == other.exprs
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.expr_type {
            ExprType::Symbol { symbol } => write!(f, "{}", symbol),
            ExprType::Number { number } => write!(f, "{}", number),
            ExprType::List { list } => {
                write!(f, "(")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, expr) in self.exprs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", expr)?;
        }
        Ok(())
    }
}

impl Module {
    /// JSON form of the tree for host display. In compact mode each node's
    /// `start`/`end` pair collapses to a single `"@": "l:c:l:c"` entry.
    pub fn to_json(&self, compact: bool) -> Result<serde_json::Value, serde_json::Error> {
        if !compact {
            return serde_json::to_value(self);
        }

        Ok(json!({
            "kind": "module",
            "exprs": self.exprs.iter().map(Expr::to_compact_json).collect::<Vec<_>>(),
            "@": self.span.compact(),
        }))
    }
}

impl Expr {
    fn to_compact_json(&self) -> serde_json::Value {
        let span = self.span.compact();
        match &self.expr_type {
            ExprType::Symbol { symbol } => json!({ "kind": "symbol", "symbol": symbol, "@": span }),
            ExprType::Number { number } => json!({ "kind": "number", "number": number, "@": span }),
            ExprType::List { list } => json!({
                "kind": "list",
                "list": list.iter().map(Expr::to_compact_json).collect::<Vec<_>>(),
                "@": span,
            }),
        }
    }
}

/// Tokenizes and parses `source` in one step.
pub fn parse_str(source: &str) -> Result<Module, ScriptError> {
    let tokens = tokenize(source.as_bytes())?;
    parse(&tokens)
}

pub fn parse(tokens: &[Token]) -> Result<Module, ScriptError> {
    assert!(
        tokens
            .last()
            .map_or(false, |t| t.token_type == TokenType::EOF),
        "Token slice must be terminated by EOF"
    );

    let mut consumed = 0;
    let mut exprs = Vec::new();

    while tokens[consumed].token_type != TokenType::EOF {
        if tokens[consumed].token_type == TokenType::RightParen {
            return syntax_error("expression or end of input", tokens[consumed].span.start);
        }

        let (expr, expr_consumed) = parse_expression(&tokens[consumed..])?;
        exprs.push(expr);
        consumed += expr_consumed;
    }

    let end = tokens[consumed].span.end;
    trace!("parsed {} top-level forms", exprs.len());

    Ok(Module {
        exprs,
        span: Span::new(Position::start(), end),
    })
}

fn parse_expression(tokens: &[Token]) -> Result<(Expr, usize), ScriptError> {
    let token = &tokens[0];
    match &token.token_type {
        TokenType::Symbol(name) => Ok((
            Expr {
                expr_type: ExprType::Symbol {
                    symbol: name.clone(),
                },
                span: token.span,
            },
            1,
        )),
        TokenType::Number(n) => Ok((
            Expr {
                expr_type: ExprType::Number { number: *n },
                span: token.span,
            },
            1,
        )),
        TokenType::LeftParen => parse_list(tokens),
        TokenType::RightParen | TokenType::EOF => {
            syntax_error("symbol, number or list", token.span.start)
        }
    }
}

fn parse_list(tokens: &[Token]) -> Result<(Expr, usize), ScriptError> {
    let start = tokens[0].span.start;
    let mut consumed = 1; // Skip '('
    let mut list = Vec::new();

    loop {
        match tokens[consumed].token_type {
            TokenType::RightParen => break,
            TokenType::EOF => return syntax_error("')'", tokens[consumed].span.start),
            _ => {
                let (expr, expr_consumed) = parse_expression(&tokens[consumed..])?;
                list.push(expr);
                consumed += expr_consumed;
            }
        }
    }

    let end = tokens[consumed].span.end;
    consumed += 1; // Skip ')'

    Ok((
        Expr {
            expr_type: ExprType::List { list },
            span: Span::new(start, end),
        },
        consumed,
    ))
}

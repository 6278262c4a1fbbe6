use nu_ansi_term::{Color, Style};
use reedline::{
    Highlighter, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    StyledText, ValidationResult, Validator,
};
use std::borrow::Cow;

use crate::stdlib::BuiltinOp;
use crate::tokenizer::{tokenize, TokenType};

#[derive(Clone)]
pub struct REPLPrompt;

impl Prompt for REPLPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("klisp")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("  ... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

/// Asks for more input while parentheses are still open.
pub struct REPLValidator;

impl Validator for REPLValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        let mut depth = 0usize;

        for c in line.chars() {
            match c {
                '(' => depth += 1,
                ')' => match depth.checked_sub(1) {
                    Some(d) => depth = d,
                    // let the parser report the stray ')'
                    None => return ValidationResult::Complete,
                },
                _ => (),
            }
        }

        if depth == 0 {
            ValidationResult::Complete
        } else {
            ValidationResult::Incomplete
        }
    }
}

pub static KEYWORD_COLOR: Color = Color::LightBlue;
pub static LITERAL_COLOR: Color = Color::Yellow;
pub static DEFAULT_COLOR: Color = Color::White;
pub static OPERATOR_COLOR: Color = Color::DarkGray;

pub struct SyntaxHighlighter;

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();

        let tokens = match tokenize(line.as_bytes()) {
            Ok(t) => t,
            Err(_) => {
                styled_text.push((Style::new().fg(DEFAULT_COLOR), line.to_string()));
                return styled_text;
            }
        };

        let mut cursor = 0;

        for token in tokens {
            let color = match &token.token_type {
                TokenType::EOF => break,
                TokenType::Symbol(name) if BuiltinOp::from_name(name).is_some() => KEYWORD_COLOR,
                TokenType::Symbol(_) => DEFAULT_COLOR,
                TokenType::Number(_) => LITERAL_COLOR,
                TokenType::LeftParen | TokenType::RightParen => OPERATOR_COLOR,
            };

            let (start, end) = (token.span.start.offset, token.span.end.offset);
            if start > cursor {
                styled_text.push((Style::new().fg(DEFAULT_COLOR), line[cursor..start].to_string()));
            }
            styled_text.push((Style::new().fg(color), line[start..end].to_string()));
            cursor = end;
        }

        if cursor < line.len() {
            styled_text.push((Style::new().fg(DEFAULT_COLOR), line[cursor..].to_string()));
        }

        styled_text
    }
}

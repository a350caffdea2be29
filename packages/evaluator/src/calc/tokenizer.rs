//! Splits text into literal runs and `{{CALC:...}}` tokens using logos.
//!
//! Anything that is not a complete token, including an unterminated
//! `{{CALC:`, stays literal text.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'src> {
    #[regex(r"\{\{CALC:[^}]*\}\}", |lex| {
        let s = lex.slice();
        &s[7..s.len() - 2]  // Strip `{{CALC:` and `}}`
    })]
    Calc(&'src str),

    #[regex(r"[^{]+")]
    Text,

    #[token("{")]
    Brace,
}

/// One run of a tokenized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPart<'a> {
    Literal(&'a str),
    /// Payload between `{{CALC:` and `}}`
    Token(&'a str),
}

/// Literal runs and tokens in source order; adjacent literal runs are merged
pub fn tokenize(text: &str) -> Vec<TextPart<'_>> {
    let mut parts = Vec::new();
    let mut literal_start: Option<usize> = None;

    for (piece, span) in Piece::lexer(text).spanned() {
        match piece {
            Ok(Piece::Calc(payload)) => {
                if let Some(start) = literal_start.take() {
                    parts.push(TextPart::Literal(&text[start..span.start]));
                }
                parts.push(TextPart::Token(payload));
            }
            // Text, stray braces and anything unrecognized
            _ => {
                literal_start.get_or_insert(span.start);
            }
        }
    }

    if let Some(start) = literal_start {
        parts.push(TextPart::Literal(&text[start..]));
    }
    parts
}

pub fn contains_tokens(text: &str) -> bool {
    text.contains("{{CALC:") && tokenize(text).iter().any(|p| matches!(p, TextPart::Token(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(tokenize("Hello"), vec![TextPart::Literal("Hello")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokens_keep_position() {
        assert_eq!(
            tokenize("Total: {{CALC:sum:e1,e2}} ({{CALC:count:e1}})"),
            vec![
                TextPart::Literal("Total: "),
                TextPart::Token("sum:e1,e2"),
                TextPart::Literal(" ("),
                TextPart::Token("count:e1"),
                TextPart::Literal(")"),
            ]
        );
    }

    #[test]
    fn test_adjacent_tokens() {
        assert_eq!(
            tokenize("{{CALC:ref:a}}{{CALC:ref:b}}"),
            vec![TextPart::Token("ref:a"), TextPart::Token("ref:b")]
        );
    }

    #[test]
    fn test_unterminated_token_is_literal() {
        let text = "Price {{CALC:sum:a,b and more";
        assert_eq!(tokenize(text), vec![TextPart::Literal(text)]);
        assert!(!contains_tokens(text));
    }

    #[test]
    fn test_other_braces_are_literal() {
        let text = "{a} {{name}} {{CALC:ref:x}}";
        assert_eq!(
            tokenize(text),
            vec![
                TextPart::Literal("{a} {{name}} "),
                TextPart::Token("ref:x"),
            ]
        );
    }

    #[test]
    fn test_literal_preserved_verbatim() {
        let text = "  line one\n\tline two {{CALC:ref:x}} ünïcode ";
        let rebuilt: String = tokenize(text)
            .into_iter()
            .map(|p| match p {
                TextPart::Literal(s) => s.to_string(),
                TextPart::Token(payload) => format!("{{{{CALC:{}}}}}", payload),
            })
            .collect();
        assert_eq!(rebuilt, text);
    }
}

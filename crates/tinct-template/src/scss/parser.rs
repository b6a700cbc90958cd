//! SCSS source parsing on top of the `cssparser` tokenizer.
//!
//! `cssparser` understands CSS tokens, blocks, strings and block comments. SCSS
//! adds two things the tokenizer does not know about:
//!
//! - `//` line comments, which are rewritten to `/* */` comments before
//!   tokenizing;
//! - `#{...}` interpolation, which tokenizes as a `#` delimiter followed by a
//!   curly block and is folded back into the surrounding selector or value.

use cssparser::{ParseError, Parser, ParserInput, Token};

use super::{AtRule, Declaration, Node, Rule, Stylesheet};
use crate::error::GenerateError;

/// Parses SCSS source text into a [`Stylesheet`].
///
/// # Errors
///
/// Returns [`GenerateError::Parse`] on an unbalanced closing brace.
pub fn parse(source: &str) -> Result<Stylesheet, GenerateError> {
    let normalized = convert_line_comments(source);
    let mut input = ParserInput::new(&normalized);
    let mut parser = Parser::new(&mut input);
    let nodes = parse_items(&mut parser).map_err(|message| GenerateError::Parse {
        path: None,
        message,
    })?;
    Ok(Stylesheet::new(nodes))
}

/// Text collected for the item currently being read.
#[derive(Default)]
struct Item {
    text: String,
    /// Byte offset of the first top-level `:`.
    colon: Option<usize>,
    at_rule: bool,
    after_hash: bool,
}

impl Item {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn push(&mut self, text: &str) {
        self.text.push_str(text);
        self.after_hash = false;
    }

    fn take(&mut self) -> Item {
        std::mem::take(self)
    }

    /// Finishes a `;`-terminated (or block-terminated) statement.
    fn finish_statement(&mut self) -> Option<Node> {
        let item = self.take();
        let text = item.text.trim_end();
        if text.is_empty() {
            return None;
        }
        if item.at_rule {
            let (name, params) = split_at_keyword(text);
            return Some(Node::AtRule(AtRule {
                name,
                params,
                children: None,
            }));
        }
        match item.colon {
            Some(at) => Some(Node::Declaration(Declaration::new(
                text[..at].trim(),
                text[at + 1..].trim(),
            ))),
            None => Some(Node::Raw(text.to_string())),
        }
    }

    /// Finishes an item followed by a `{ ... }` body.
    fn finish_block(&mut self, children: Vec<Node>) -> Node {
        let item = self.take();
        let text = item.text.trim();
        if item.at_rule {
            let (name, params) = split_at_keyword(text);
            Node::AtRule(AtRule {
                name,
                params,
                children: Some(children),
            })
        } else {
            Node::Rule(Rule {
                selector: text.to_string(),
                children,
            })
        }
    }
}

fn split_at_keyword(text: &str) -> (String, String) {
    let body = text.strip_prefix('@').unwrap_or(text);
    match body.find(|c: char| c.is_whitespace() || c == '(') {
        Some(end) => (body[..end].to_string(), body[end..].trim().to_string()),
        None => (body.to_string(), String::new()),
    }
}

fn parse_items<'i, 't>(parser: &mut Parser<'i, 't>) -> Result<Vec<Node>, String> {
    let mut nodes = Vec::new();
    let mut item = Item::default();

    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(ws) => {
                if !item.is_empty() {
                    item.push(ws);
                }
            }
            Token::Comment(text) => {
                // Comments inside a selector or value are dropped.
                if item.is_empty() {
                    nodes.push(Node::Comment(text.to_string()));
                }
            }
            Token::Semicolon => {
                if let Some(node) = item.finish_statement() {
                    nodes.push(node);
                }
            }
            Token::CurlyBracketBlock if item.after_hash => {
                item.push("{");
                let inner = nested_text(parser);
                item.push(&inner);
                item.push("}");
            }
            Token::CurlyBracketBlock => {
                let children = parser
                    .parse_nested_block(|nested| Ok::<_, ParseError<'i, ()>>(parse_items(nested)))
                    .map_err(|e| format!("invalid block: {:?}", e.kind))??;
                nodes.push(item.finish_block(children));
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                item.push(parser.slice_from(start));
                let inner = nested_text(parser);
                item.push(&inner);
                item.push(closing_delimiter(&token));
            }
            Token::Colon => {
                if item.colon.is_none() {
                    item.colon = Some(item.text.len());
                }
                item.push(":");
            }
            Token::AtKeyword(_) if item.is_empty() => {
                item.at_rule = true;
                item.push(parser.slice_from(start));
            }
            Token::Delim('#') => {
                item.push("#");
                item.after_hash = true;
            }
            Token::CloseCurlyBracket => {
                return Err("unexpected '}'".to_string());
            }
            _ => item.push(parser.slice_from(start)),
        }
    }

    if let Some(node) = item.finish_statement() {
        nodes.push(node);
    }
    Ok(nodes)
}

/// Reads the rest of the block just opened, as raw text without comments.
fn nested_text<'i, 't>(parser: &mut Parser<'i, 't>) -> String {
    parser
        .parse_nested_block(|nested| Ok::<_, ParseError<'i, ()>>(raw_text(nested)))
        .unwrap_or_default()
}

fn raw_text<'i, 't>(parser: &mut Parser<'i, 't>) -> String {
    let mut out = String::new();
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Comment(_) => {}
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                out.push_str(parser.slice_from(start));
                out.push_str(&nested_text(parser));
                out.push_str(closing_delimiter(&token));
            }
            _ => out.push_str(parser.slice_from(start)),
        }
    }
    out
}

fn closing_delimiter(token: &Token<'_>) -> &'static str {
    match token {
        Token::SquareBracketBlock => "]",
        Token::CurlyBracketBlock => "}",
        _ => ")",
    }
}

/// Rewrites SCSS `//` line comments as block comments.
///
/// Quoted strings, block comments and unquoted `url(...)` arguments are
/// copied through untouched, so `url(//cdn/x.png)` survives.
fn convert_line_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        match c {
            '"' | '\'' => {
                out.push(c);
                let mut escaped = false;
                for (_, s) in chars.by_ref() {
                    out.push(s);
                    if escaped {
                        escaped = false;
                    } else if s == '\\' {
                        escaped = true;
                    } else if s == c || s == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                out.push(c);
                if let Some((_, star)) = chars.next() {
                    out.push(star);
                }
                let mut prev = '\0';
                for (_, s) in chars.by_ref() {
                    out.push(s);
                    if prev == '*' && s == '/' {
                        break;
                    }
                    prev = s;
                }
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                chars.next();
                let mut text = String::new();
                while let Some((_, s)) = chars.peek() {
                    if *s == '\n' {
                        break;
                    }
                    text.push(*s);
                    chars.next();
                }
                out.push_str("/*");
                out.push_str(&text.replace("*/", "* /"));
                out.push_str("*/");
            }
            '(' if ends_with_url(&out) => {
                out.push(c);
                let quoted = chars
                    .peek()
                    .map(|(_, s)| matches!(s, '"' | '\''))
                    .unwrap_or(false);
                if !quoted {
                    for (_, s) in chars.by_ref() {
                        out.push(s);
                        if s == ')' {
                            break;
                        }
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn ends_with_url(out: &str) -> bool {
    out.get(out.len().saturating_sub(3)..)
        .map(|tail| tail.eq_ignore_ascii_case("url"))
        .unwrap_or(false)
}

//! Declaration-literal reader
//!
//! Manifests are executable declaration files whose body is a single
//! literal expression: a mapping of keys to strings, numbers, booleans,
//! `None`, lists, tuples and nested mappings. The source is parsed with
//! `tree-sitter-python` and the concrete syntax tree is folded into a
//! [`serde_json::Value`] with key order preserved.
//!
//! Accepted beyond plain literals:
//! - comments and backslash line continuations anywhere
//! - `r`/`u`/`b` string prefixes, triple quotes, adjacent concatenation
//! - unary `-`/`+` on numbers
//! - trailing commas in every collection

use serde_json::{Map, Number, Value};
use tree_sitter::{Node, Parser};

/// Position-aware literal syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct LiteralError {
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// What went wrong
    pub message: String,
}

/// Parse a complete declaration literal
///
/// # Errors
/// Returns [`LiteralError`] when the text is not valid source, or is not
/// exactly one literal expression (surrounding comments are allowed).
pub fn parse_literal(source: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    parser.set_language(&language).map_err(|e| LiteralError {
        line: 1,
        column: 1,
        message: format!("parser initialization failed: {e}"),
    })?;
    let tree = parser.parse(source, None).ok_or_else(|| LiteralError {
        line: 1,
        column: 1,
        message: "parse aborted".to_string(),
    })?;

    let reader = Reader { source };
    let root = tree.root_node();
    if root.has_error() {
        let node = first_error(root).unwrap_or(root);
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            format!("invalid syntax near '{}'", reader.snippet(node))
        };
        return Err(reader.error(node, message));
    }

    let mut statements = reader.significant_children(root).into_iter();
    let statement = statements
        .next()
        .ok_or_else(|| reader.error(root, "expected a literal expression"))?;
    if let Some(extra) = statements.next() {
        return Err(reader.error(extra, "unexpected trailing statement"));
    }
    if statement.kind() != "expression_statement" {
        return Err(reader.error(statement, "expected a literal expression"));
    }
    match reader.significant_children(statement).as_slice() {
        [expression] => reader.value(*expression),
        _ => Err(reader.error(statement, "expected a single expression")),
    }
}

/// Leftmost missing or error node below `node`, innermost first
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let nested = node.children(&mut cursor).find_map(first_error);
    nested.or_else(|| node.is_error().then_some(node))
}

struct Reader<'s> {
    source: &'s str,
}

impl<'s> Reader<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn snippet(&self, node: Node<'_>) -> String {
        self.text(node)
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(20)
            .collect()
    }

    fn error(&self, node: Node<'_>, message: impl Into<String>) -> LiteralError {
        let start = node.start_byte().min(self.source.len());
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        LiteralError {
            line: node.start_position().row + 1,
            column: self.source[line_start..start].chars().count() + 1,
            message: message.into(),
        }
    }

    /// Named children without comments and line continuations
    fn significant_children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| !child.is_extra() && child.kind() != "comment")
            .collect()
    }

    fn value(&self, node: Node<'_>) -> Result<Value, LiteralError> {
        match node.kind() {
            "dictionary" => self.mapping(node),
            "list" | "tuple" => self
                .significant_children(node)
                .into_iter()
                .map(|item| self.value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            "parenthesized_expression" => match self.significant_children(node).as_slice() {
                [inner] => self.value(*inner),
                _ => Err(self.error(node, "expected one parenthesized expression")),
            },
            "string" => self.string(node).map(Value::String),
            "concatenated_string" => {
                let mut joined = String::new();
                for part in self.significant_children(node) {
                    joined.push_str(&self.string(part)?);
                }
                Ok(Value::String(joined))
            }
            "integer" | "float" => self.number(node, self.text(node)),
            "unary_operator" => self.signed(node),
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "none" => Ok(Value::Null),
            "identifier" => Err(self.error(
                node,
                format!("unsupported name '{}'", self.text(node)),
            )),
            kind => Err(self.error(node, format!("unsupported expression: {kind}"))),
        }
    }

    fn mapping(&self, node: Node<'_>) -> Result<Value, LiteralError> {
        let mut map = Map::new();
        for pair in self.significant_children(node) {
            if pair.kind() != "pair" {
                return Err(self.error(pair, format!("unsupported mapping entry: {}", pair.kind())));
            }
            let (Some(key), Some(value)) = (
                pair.child_by_field_name("key"),
                pair.child_by_field_name("value"),
            ) else {
                return Err(self.error(pair, "incomplete mapping entry"));
            };
            let Value::String(key_text) = self.value(key)? else {
                return Err(self.error(key, "mapping keys must be strings"));
            };
            map.insert(key_text, self.value(value)?);
        }
        Ok(Value::Object(map))
    }

    fn string(&self, node: Node<'_>) -> Result<String, LiteralError> {
        if node.kind() != "string" {
            return Err(self.error(node, format!("expected string, found {}", node.kind())));
        }
        let mut start = None;
        let mut end = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "string_start" => start = Some(child),
                "string_end" => end = Some(child),
                "interpolation" => {
                    return Err(self.error(child, "interpolated strings are not literals"));
                }
                _ => {}
            }
        }
        let (Some(start), Some(end)) = (start, end) else {
            return Err(self.error(node, "malformed string"));
        };
        let opening = self.text(start);
        let raw = opening.contains(['r', 'R']);
        let body = &self.source[start.end_byte()..end.start_byte()];
        if raw {
            return Ok(body.to_string());
        }
        unescape(body).map_err(|message| self.error(node, message))
    }

    fn signed(&self, node: Node<'_>) -> Result<Value, LiteralError> {
        let operator = node
            .child_by_field_name("operator")
            .map(|op| self.text(op));
        let Some(argument) = node.child_by_field_name("argument") else {
            return Err(self.error(node, "missing operand"));
        };
        if !matches!(argument.kind(), "integer" | "float") {
            return Err(self.error(argument, "sign applies only to numbers"));
        }
        match operator {
            Some("+") => self.number(argument, self.text(argument)),
            Some("-") => self.number(argument, &format!("-{}", self.text(argument))),
            _ => Err(self.error(node, format!("unsupported operator in '{}'", self.text(node)))),
        }
    }

    fn number(&self, node: Node<'_>, text: &str) -> Result<Value, LiteralError> {
        let invalid = || self.error(node, format!("invalid number '{text}'"));
        let cleaned = text.replace('_', "");
        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        let radix = match digits.get(..2) {
            Some("0x" | "0X") => Some(16),
            Some("0o" | "0O") => Some(8),
            Some("0b" | "0B") => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            let magnitude = i64::from_str_radix(&digits[2..], radix).map_err(|_| invalid())?;
            return Ok(Value::from(if negative { -magnitude } else { magnitude }));
        }
        if node.kind() == "float" {
            let float: f64 = cleaned.parse().map_err(|_| invalid())?;
            return Number::from_f64(float).map(Value::Number).ok_or_else(invalid);
        }
        if let Ok(int) = cleaned.parse::<i64>() {
            return Ok(Value::from(int));
        }
        match digits.parse::<u64>() {
            Ok(int) if !negative => Ok(Value::from(int)),
            _ => Err(invalid()),
        }
    }
}

/// Decode backslash escapes of a non-raw string body
fn unescape(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(escaped),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'x' => out.push(code_point(&mut chars, 2, 16)?),
            'u' => out.push(code_point(&mut chars, 4, 16)?),
            'U' => out.push(code_point(&mut chars, 8, 16)?),
            '0'..='7' => {
                let mut digits = String::from(escaped);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d) if d.is_digit(8) => digits.push(*d),
                        _ => break,
                    }
                    chars.next();
                }
                out.push(octal(&digits)?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn code_point(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    radix: u32,
) -> Result<char, String> {
    let text: String = chars.by_ref().take(digits).collect();
    if text.chars().count() < digits {
        return Err("truncated escape sequence".to_string());
    }
    let code =
        u32::from_str_radix(&text, radix).map_err(|_| format!("invalid escape sequence '{text}'"))?;
    char::from_u32(code).ok_or_else(|| format!("invalid code point {code:#x}"))
}

fn octal(digits: &str) -> Result<char, String> {
    u32::from_str_radix(digits, 8)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid escape sequence '{digits}'"))
}

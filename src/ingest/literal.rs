//! Parser for list literals embedded in tabular cells, e.g.
//! `['2 cups flour', '1 egg']`.
//!
//! Accepts quoted strings (either quote style, backslash escapes), integers,
//! floats, `True`/`False`/`None` and nested lists. Anything else (bare words,
//! tuples, a lone scalar) is rejected so the caller can fall back to
//! comma splitting.

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Int(String),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
}

impl Literal {
    /// Plain rendering used for list elements.
    fn render(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            _ => self.repr(),
        }
    }

    /// Quoted rendering used inside nested lists.
    fn repr(&self) -> String {
        match self {
            Literal::Str(s) => {
                if s.contains('\'') && !s.contains('"') {
                    format!("\"{s}\"")
                } else {
                    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
                }
            }
            Literal::Int(digits) => digits.clone(),
            Literal::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e16 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::None => "None".to_string(),
            Literal::List(items) => {
                let inner: Vec<String> = items.iter().map(Literal::repr).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }
}

/// Parse `input` as a list literal, returning the rendered elements.
///
/// Returns `None` when `input` is not exactly one well-formed list.
pub fn parse_list_literal(input: &str) -> Option<Vec<String>> {
    let mut parser = Parser {
        chars: input.trim().chars().collect(),
        pos: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos != parser.chars.len() {
        return None;
    }
    match value {
        Literal::List(items) => Some(items.iter().map(Literal::render).collect()),
        _ => None,
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Option<Literal> {
        self.skip_ws();
        match self.peek()? {
            '[' => self.list(),
            '\'' | '"' => self.string(),
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            c if c.is_alphabetic() => self.keyword(),
            _ => None,
        }
    }

    fn list(&mut self) -> Option<Literal> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek()? == ']' {
                self.bump();
                return Some(Literal::List(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump()? {
                ',' => continue,
                ']' => return Some(Literal::List(items)),
                _ => return None,
            }
        }
    }

    fn string(&mut self) -> Option<Literal> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(Literal::Str(out)),
                '\\' => {
                    let escaped = self.bump()?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' => out.push(escaped),
                        '\n' => {}
                        'x' => out.push(self.hex_escape(2)?),
                        'u' => out.push(self.hex_escape(4)?),
                        'U' => out.push(self.hex_escape(8)?),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                '\n' => return None,
                c => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, width: usize) -> Option<char> {
        let end = self.pos.checked_add(width)?;
        let digits: String = self.chars.get(self.pos..end)?.iter().collect();
        self.pos = end;
        u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
    }

    fn number(&mut self) -> Option<Literal> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    if matches!(self.chars.get(self.pos + 1), Some('-') | Some('+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().filter(|c| **c != '_').collect();
        if is_float {
            raw.parse::<f64>().ok().map(Literal::Float)
        } else {
            let value = raw.parse::<i128>().ok()?;
            Some(Literal::Int(value.to_string()))
        }
    }

    fn keyword(&mut self) -> Option<Literal> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Some(Literal::Bool(true)),
            "False" => Some(Literal::Bool(false)),
            "None" => Some(Literal::None),
            _ => None,
        }
    }
}

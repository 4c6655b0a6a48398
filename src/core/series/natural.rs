//! Human ("natural") ordering of instance keys such as `cpu2` / `cpu10`

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Digits(&'a str),
    Char(char),
}

/// Splits into digit runs and single non-digit characters, whitespace is dropped
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.rest = self.rest.trim_start();
        let first = self.rest.chars().next()?;
        if first.is_ascii_digit() {
            let end = self
                .rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(self.rest.len());
            let (digits, rest) = self.rest.split_at(end);
            self.rest = rest;
            Some(Token::Digits(digits))
        } else {
            self.rest = &self.rest[first.len_utf8()..];
            Some(Token::Char(first))
        }
    }
}

fn tokens(s: &str) -> Tokens<'_> {
    Tokens { rest: s }
}

fn numeric_cmp(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn token_text<'a>(token: &Token<'a>, buf: &'a mut [u8; 4]) -> &'a str {
    match token {
        Token::Digits(d) => d,
        Token::Char(c) => c.encode_utf8(buf),
    }
}

/// Natural string comparison.
///
/// Digit runs compare as integers, everything else compares character by
/// character, whitespace is insignificant and a sequence that runs out of
/// tokens first sorts first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ta = tokens(a);
    let mut tb = tokens(b);
    loop {
        match (ta.next(), tb.next()) {
            (Some(Token::Digits(x)), Some(Token::Digits(y))) => match numeric_cmp(x, y) {
                Ordering::Equal => continue,
                other => return other,
            },
            (Some(x), Some(y)) => {
                let (mut bx, mut by) = ([0u8; 4], [0u8; 4]);
                match token_text(&x, &mut bx).cmp(token_text(&y, &mut by)) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return Ordering::Equal,
        }
    }
}

fn sentinel_rank(key: &str) -> u8 {
    match key {
        "sum" => 1,
        "all" => 2,
        _ => 0,
    }
}

/// Ordering for multi-instance keys: natural order, with `sum` and then
/// `all` after every ordinary key
pub fn instance_cmp(a: &str, b: &str) -> Ordering {
    sentinel_rank(a)
        .cmp(&sentinel_rank(b))
        .then_with(|| natural_cmp(a, b))
}

/// Map key ordered by [`instance_cmp`]; keys that compare equal naturally
/// (`02` and `2`) stay distinct through a plain string tie-break
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceKey(String);

impl InstanceKey {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for InstanceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        instance_cmp(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for InstanceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

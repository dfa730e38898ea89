use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::errors::{DomainError, DomainResult};

/// Immutable mapping from class id to label, built once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassIndex {
    names: BTreeMap<usize, String>,
}

impl ClassIndex {
    /// Labels in id order, starting at 0.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: labels.into_iter().map(Into::into).enumerate().collect(),
        }
    }

    /// One label per line; the 0-based line number is the class id.
    pub fn from_labels_file(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| DomainError::NotFound(format!("labels file {}: {e}", path.display())))?;
        let index = Self::from_labels(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
        if index.is_empty() {
            return Err(DomainError::InvalidInput(format!("labels file {} is empty", path.display())));
        }
        Ok(index)
    }

    /// Parses the `names` metadata property written by the YOLO exporter,
    /// a dict literal such as `{0: 'person', 1: 'bicycle'}`. JSON objects
    /// with quoted keys are accepted too.
    pub fn parse_metadata_names(raw: &str) -> DomainResult<Self> {
        let invalid = |msg: &str| DomainError::InvalidInput(format!("class names metadata: {msg}"));

        let body = raw
            .trim()
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| invalid("expected a {id: name} mapping"))?;

        let mut names = BTreeMap::new();
        let mut chars = body.chars().peekable();
        loop {
            while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
                chars.next();
            }
            if chars.peek().is_none() {
                break;
            }

            let key = match chars.peek() {
                Some('\'' | '"') => read_quoted(&mut chars).ok_or_else(|| invalid("unterminated key"))?,
                _ => {
                    let mut digits = String::new();
                    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
                        digits.push(c);
                        chars.next();
                    }
                    digits
                }
            };
            let id: usize = key
                .trim()
                .parse()
                .map_err(|_| invalid(&format!("class id {key:?} is not an integer")))?;

            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            if chars.next() != Some(':') {
                return Err(invalid("expected ':' after class id"));
            }
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            let name = read_quoted(&mut chars).ok_or_else(|| invalid("expected a quoted class name"))?;
            names.insert(id, name);
        }

        if names.is_empty() {
            return Err(invalid("no classes"));
        }
        Ok(Self { names })
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    pub fn resolve(&self, class_id: usize) -> DomainResult<&str> {
        self.get(class_id)
            .ok_or_else(|| DomainError::OperationFailed(format!("class id {class_id} missing from class index")))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

fn read_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let quote = chars.next().filter(|c| *c == '\'' || *c == '"')?;
    let mut out = String::new();
    loop {
        match chars.next()? {
            '\\' => out.push(chars.next()?),
            c if c == quote => return Some(out),
            c => out.push(c),
        }
    }
}

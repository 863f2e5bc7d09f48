use std::fmt;

use crate::value::Value;

/// One segment of a document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    Key(String),
    Index(usize),
}

impl PathKey {
    /// Step into `value` by this segment.
    ///
    /// Numeric keys address arrays (`a.1`) and indices address objects by their
    /// string form, so both spellings reach the same member.
    pub fn get<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match (value, self) {
            (Value::Object(map), PathKey::Key(k)) => map.get(k),
            (Value::Object(map), PathKey::Index(i)) => map.get(&i.to_string()),
            (Value::Array(items), PathKey::Index(i)) => items.get(*i),
            (Value::Array(items), PathKey::Key(k)) => k.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    pub fn get_mut<'v>(&self, value: &'v mut Value) -> Option<&'v mut Value> {
        match (value, self) {
            (Value::Object(map), PathKey::Key(k)) => map.get_mut(k),
            (Value::Object(map), PathKey::Index(i)) => map.get_mut(&i.to_string()),
            (Value::Array(items), PathKey::Index(i)) => items.get_mut(*i),
            (Value::Array(items), PathKey::Key(k)) => {
                k.parse::<usize>().ok().and_then(move |i| items.get_mut(i))
            }
            _ => None,
        }
    }

    /// Human-readable path of this segment below `base`: `base.key` or `base[0]`.
    pub fn join(&self, base: &str) -> String {
        match self {
            PathKey::Key(k) if base.is_empty() => k.clone(),
            PathKey::Key(k) => format!("{}.{}", base, k),
            PathKey::Index(i) => format!("{}[{}]", base, i),
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Key(k) => write!(f, "{}", k),
            PathKey::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        PathKey::Key(key.to_string())
    }
}

impl From<String> for PathKey {
    fn from(key: String) -> Self {
        PathKey::Key(key)
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

/// Split a dotted/indexed path into segments.
///
/// Accepts `a.b.c`, `a[1]`, `a.1` and `a["quoted key"]`. Unquoted bracket
/// contents that parse as integers become indices, everything else is a key.
pub fn parse_path(path: &str) -> Vec<PathKey> {
    let mut keys = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => flush(&mut keys, &mut current),
            '[' => {
                flush(&mut keys, &mut current);

                let quote = match chars.peek() {
                    Some('"') | Some('\'') => chars.next(),
                    _ => None,
                };

                let mut inner = String::new();
                while let Some(ch) = chars.next() {
                    match quote {
                        Some(q) if ch == q && chars.peek() == Some(&']') => {
                            chars.next();
                            break;
                        }
                        None if ch == ']' => break,
                        _ => inner.push(ch),
                    }
                }

                match inner.trim().parse::<usize>() {
                    Ok(i) if quote.is_none() => keys.push(PathKey::Index(i)),
                    _ => keys.push(PathKey::Key(inner)),
                }
            }
            _ => current.push(c),
        }
    }

    flush(&mut keys, &mut current);
    keys
}

fn flush(keys: &mut Vec<PathKey>, current: &mut String) {
    if !current.is_empty() {
        keys.push(PathKey::Key(std::mem::take(current)));
    }
}

/// Walk `keys` down from `root`.
pub fn lookup<'v>(root: &'v Value, keys: &[PathKey]) -> Option<&'v Value> {
    keys.iter().try_fold(root, |value, key| key.get(value))
}

pub fn lookup_mut<'v>(root: &'v mut Value, keys: &[PathKey]) -> Option<&'v mut Value> {
    keys.iter().try_fold(root, |value, key| key.get_mut(value))
}

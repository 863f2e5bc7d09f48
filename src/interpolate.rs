use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::path::{self, parse_path};
use crate::value::Value;
use crate::KyoError;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// A double-quoted string whose `${path}` tokens are resolved lazily.
///
/// Until the interpolation pass replaces it, the document holds this wrapper
/// instead of a plain string. Other templates that reference it compute it on
/// demand, which is what makes forward references and chains work.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedString {
    template: String,
}

impl InterpolatedString {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The template, tokens included.
    pub fn raw(&self) -> &str {
        &self.template
    }

    /// Distinct `${...}` keys in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for caps in TOKEN.captures_iter(&self.template) {
            if let Some(m) = caps.get(1) {
                if !keys.contains(&m.as_str()) {
                    keys.push(m.as_str());
                }
            }
        }
        keys
    }

    pub fn has_tokens(&self) -> bool {
        TOKEN.is_match(&self.template)
    }

    /// Resolve every token against `sources`, first match wins.
    ///
    /// A key found in no source becomes the empty string.
    pub fn compute(&self, sources: &[&Value]) -> Result<String, KyoError> {
        self.compute_with(sources, &mut Vec::new())
    }

    fn compute_with(&self, sources: &[&Value], visiting: &mut Vec<String>) -> Result<String, KyoError> {
        let mut resolved: IndexMap<&str, String> = IndexMap::new();

        for key in self.keys() {
            if visiting.iter().any(|k| k == key) {
                let mut chain = visiting.clone();
                chain.push(key.to_string());
                return Err(KyoError::CircularInterpolation { chain });
            }

            let keys = parse_path(key);
            let found = sources.iter().find_map(|root| path::lookup(root, &keys));

            let text = match found {
                None => String::new(),
                Some(Value::Interpolated(nested)) => {
                    visiting.push(key.to_string());
                    let text = nested.compute_with(sources, visiting);
                    visiting.pop();
                    text?
                }
                Some(value) if value.has_pending_interpolation() => {
                    visiting.push(key.to_string());
                    let value = resolve_nested(value.clone(), sources, visiting);
                    visiting.pop();
                    value?.to_string()
                }
                Some(value) => value.to_string(),
            };

            resolved.insert(key, text);
        }

        let output = TOKEN.replace_all(&self.template, |caps: &Captures| {
            resolved.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(output.into_owned())
    }
}

/// Compute every template inside an array or object that is about to be stringified.
fn resolve_nested(value: Value, sources: &[&Value], visiting: &mut Vec<String>) -> Result<Value, KyoError> {
    match value {
        Value::Interpolated(template) => template.compute_with(sources, visiting).map(Value::String),
        Value::Array(items) => items
            .into_iter()
            .map(|item| resolve_nested(item, sources, visiting))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| resolve_nested(v, sources, visiting).map(|v| (k, v)))
            .collect::<Result<IndexMap<_, _>, _>>()
            .map(Value::Object),
        other => Ok(other),
    }
}

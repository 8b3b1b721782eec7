use crate::SchemaError;
use serde::{Deserialize, Serialize};

/// JAD attribute carrying installer control arguments.
pub const CONTROL_ARGS_KEY: &str = "MIDP_ARGS";

/// Ordered key/value pairs from a JAD or a JAR manifest.
///
/// Duplicates are kept in file order; [`get`](Self::get) returns the first
/// match, which is how JAD values shadow manifest values once both sets are
/// stored one after the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySet {
    pairs: Vec<(String, String)>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of strings this set occupies on disk (two per pair).
    pub fn string_count(&self) -> usize {
        self.pairs.len() * 2
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Concatenate `self` followed by `other`, keeping every pair.
    #[must_use]
    pub fn chain(&self, other: &PropertySet) -> PropertySet {
        let mut pairs = self.pairs.clone();
        pairs.extend(other.pairs.iter().cloned());
        PropertySet { pairs }
    }

    /// Parse `Key: Value` lines as found in JAD files and JAR manifests.
    ///
    /// Lines beginning with a single space continue the previous value.
    /// Blank lines are skipped.
    pub fn parse_jad(text: &str) -> Result<Self, SchemaError> {
        let mut set = PropertySet::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if let Some(cont) = line.strip_prefix(' ') {
                match set.pairs.last_mut() {
                    Some((_, value)) => value.push_str(cont),
                    None => {
                        return Err(SchemaError::MalformedProperty {
                            line: idx + 1,
                            text: line.to_owned(),
                        })
                    }
                }
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(SchemaError::MalformedProperty {
                    line: idx + 1,
                    text: line.to_owned(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(SchemaError::MalformedProperty {
                    line: idx + 1,
                    text: line.to_owned(),
                });
            }
            set.push(key, value.trim());
        }
        Ok(set)
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Installer directives given in the JAD `MIDP_ARGS` attribute.
///
/// Arguments are separated by `;`, `,` or whitespace and take the form
/// `name` or `name=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlArgs {
    args: Vec<(String, Option<String>)>,
}

impl ControlArgs {
    pub const ALLOW_ALL_PERMISSIONS: &'static str = "allow_all_permissions";

    pub fn from_jad(jad: &PropertySet) -> Self {
        let Some(raw) = jad.get(CONTROL_ARGS_KEY) else {
            return Self::default();
        };
        let args = raw
            .split(|c: char| c == ';' || c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|arg| match arg.split_once('=') {
                Some((name, value)) => (name.to_owned(), Some(value.to_owned())),
                None => (arg.to_owned(), None),
            })
            .collect();
        Self { args }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.args.iter().any(|(n, _)| n == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn allow_all_permissions(&self) -> bool {
        self.contains(Self::ALLOW_ALL_PERMISSIONS)
    }
}

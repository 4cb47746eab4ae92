//! Positional route captures

use super::HandlerError;

/// Values captured from the request path, in pattern order
///
/// A capture group that did not take part in the match is `None`. Token
/// routes also record placeholder names so captures can be looked up by
/// name, but handlers receive them positionally either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    values: Vec<Option<String>>,
    names: Vec<Option<String>>,
}

impl Args {
    pub(crate) fn from_captures(captures: &regex::Captures<'_>, regex: &regex::Regex) -> Self {
        let values = captures
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        let names = regex
            .capture_names()
            .skip(1)
            .map(|name| name.map(ToString::to_string))
            .collect();
        Self { values, names }
    }

    /// Build positional arguments directly, mostly useful in tests
    pub fn positional<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<Option<String>> = values.into_iter().map(|v| Some(v.into())).collect();
        let names = vec![None; values.len()];
        Self { values, names }
    }

    /// Capture at `index`, if that group matched
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(Option::as_deref)
    }

    /// Capture at `index`, failing the handler when it is absent
    pub fn require(&self, index: usize) -> Result<&str, HandlerError> {
        self.get(index).ok_or(HandlerError::MissingCapture(index))
    }

    /// Capture recorded under a placeholder or named group
    pub fn named(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .position(|candidate| candidate.as_deref() == Some(name))
            .and_then(|index| self.get(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(Option::as_deref)
    }
}

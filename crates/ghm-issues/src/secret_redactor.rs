use std::fmt;

use aho_corasick::{AhoCorasick, MatchKind};

/// Mask substituted for every registered literal in outbound text.
pub const REDACTION_MASK: &str = "****";

/// Receives every literal accepted by a [`SecretSet`], e.g. to forward it to
/// the CI runner's own log masking.
pub trait SecretSink {
    fn secret_registered(&self, value: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSecretSink;

impl SecretSink for NoopSecretSink {
    fn secret_registered(&self, _value: &str) {}
}

/// Append-only set of sensitive literals discovered while a command runs.
pub struct SecretSet {
    values: Vec<String>,
    sink: Box<dyn SecretSink>,
}

impl Default for SecretSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretSet")
            .field("registered", &self.values.len())
            .finish()
    }
}

impl SecretSet {
    pub fn new() -> Self {
        Self::with_sink(Box::new(NoopSecretSink))
    }

    pub fn with_sink(sink: Box<dyn SecretSink>) -> Self {
        Self {
            values: Vec::new(),
            sink,
        }
    }

    /// Records `value` for redaction. Empty and already-known literals are
    /// ignored; returns whether the value was newly added.
    pub fn register(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() || self.values.iter().any(|known| known == &value) {
            return false;
        }
        self.sink.secret_registered(&value);
        self.values.push(value);
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|known| known == value)
    }

    /// Replaces every occurrence of every registered literal with
    /// [`REDACTION_MASK`]. Overlapping literals resolve leftmost-longest, so a
    /// literal that prefixes another never leaves an unmasked tail behind.
    pub fn redact(&self, text: &str) -> String {
        if self.values.is_empty() {
            return text.to_string();
        }
        match AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&self.values)
        {
            Ok(automaton) => {
                let mut redacted = String::with_capacity(text.len());
                automaton.replace_all_with(text, &mut redacted, |_, _, dst| {
                    dst.push_str(REDACTION_MASK);
                    true
                });
                redacted
            }
            Err(_) => self.redact_sequentially(text),
        }
    }

    fn redact_sequentially(&self, text: &str) -> String {
        let mut ordered = self.values.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|value| std::cmp::Reverse(value.len()));
        ordered
            .into_iter()
            .fold(text.to_string(), |acc, value| {
                acc.replace(value.as_str(), REDACTION_MASK)
            })
    }
}

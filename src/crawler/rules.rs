//! Field extraction rules
//!
//! Every extracted field is described by a `FieldRule`: an ordered list of
//! independent probes, each of which looks at the parsed page and either finds
//! a value or gives up. The first probe that finds a value wins and later probes
//! are not consulted. Probes can be appended, inserted or replaced without
//! touching the code that assembles the extracted record.

use scraper::Html;

/// A single extraction attempt against a parsed page
pub type Probe<T> = fn(&Html) -> Option<T>;

/// Ordered cascade of probes for one field
#[derive(Clone)]
pub struct FieldRule<T> {
    field: &'static str,
    probes: Vec<Probe<T>>,
}

impl<T> FieldRule<T> {
    /// Creates an empty rule for the named field
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            probes: Vec::new(),
        }
    }

    /// Appends a probe, consulted after all probes added before it
    pub fn then(mut self, probe: Probe<T>) -> Self {
        self.probes.push(probe);
        self
    }

    /// Inserts a probe ahead of all existing ones
    pub fn prepend(mut self, probe: Probe<T>) -> Self {
        self.probes.insert(0, probe);
        self
    }

    /// Name of the field this rule extracts
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Number of probes in the cascade
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Runs the probes in order and returns the first value found
    pub fn apply(&self, document: &Html) -> Option<T> {
        let found = self
            .probes
            .iter()
            .enumerate()
            .find_map(|(index, probe)| probe(document).map(|value| (index, value)));

        match found {
            Some((index, value)) => {
                tracing::trace!(field = self.field, probe = index, "Field extracted");
                Some(value)
            }
            None => {
                tracing::debug!(field = self.field, "No probe matched");
                None
            }
        }
    }
}

impl<T> std::fmt::Debug for FieldRule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("field", &self.field)
            .field("probes", &self.probes.len())
            .finish()
    }
}

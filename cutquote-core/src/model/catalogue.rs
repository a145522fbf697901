//! Part catalogue - part records keyed by name, in first-seen order.

use super::PartRecord;
use crate::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered mapping from part name to part record.
///
/// Iteration follows the order in which names were first inserted, which is also
/// the order rows are laid out in the workbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PartRecord>", into = "Vec<PartRecord>")]
pub struct PartCatalogue {
    parts: Vec<PartRecord>,
    index: HashMap<String, usize>,
}

impl PartCatalogue {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check whether no parts were found.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Check whether a part name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a part by name.
    pub fn get(&self, name: &str) -> Option<&PartRecord> {
        self.index.get(name).map(|&i| &self.parts[i])
    }

    /// Look up a part by name for editing.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut PartRecord> {
        self.index.get(name).map(|&i| &mut self.parts[i])
    }

    /// Position of a part in first-seen order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Return the record for `name`, creating it with `make` on first sight.
    ///
    /// The boolean is true when the record was created by this call.
    pub fn entry_or_insert_with(
        &mut self,
        name: &str,
        make: impl FnOnce() -> PartRecord,
    ) -> (&mut PartRecord, bool) {
        match self.index.get(name) {
            Some(&i) => (&mut self.parts[i], false),
            None => {
                let i = self.parts.len();
                self.parts.push(make());
                self.index.insert(name.to_string(), i);
                (&mut self.parts[i], true)
            }
        }
    }

    /// Iterate parts in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, PartRecord> {
        self.parts.iter()
    }

    /// Iterate parts mutably in first-seen order.
    ///
    /// Names must not be changed through this iterator.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, PartRecord> {
        self.parts.iter_mut()
    }

    /// Part names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Sum of all part quantities.
    pub fn total_quantity(&self) -> u64 {
        self.parts.iter().map(|p| p.quantity as u64).sum()
    }
}

impl TryFrom<Vec<PartRecord>> for PartCatalogue {
    type Error = QuoteError;

    /// Build from records in order; a repeated name is rejected.
    fn try_from(records: Vec<PartRecord>) -> Result<Self> {
        let mut catalogue = PartCatalogue::new();
        for record in records {
            if catalogue.contains(&record.name) {
                return Err(QuoteError::DuplicatePart { name: record.name });
            }
            let name = record.name.clone();
            catalogue.entry_or_insert_with(&name, || record);
        }
        Ok(catalogue)
    }
}

impl From<PartCatalogue> for Vec<PartRecord> {
    fn from(catalogue: PartCatalogue) -> Self {
        catalogue.parts
    }
}

impl<'a> IntoIterator for &'a PartCatalogue {
    type Item = &'a PartRecord;
    type IntoIter = std::slice::Iter<'a, PartRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

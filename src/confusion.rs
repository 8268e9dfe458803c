//! Confusion map: which classes count as "similar" to each other.
//!
//! The text format has one group per line, class names separated by colons:
//!
//! ```text
//! cat:dog:tiger
//! car:truck
//! ```
//!
//! Every class in a group is similar to every other class of that group.
//! All remaining known classes (except the class itself and the background)
//! are "other".

use crate::error::Result;
use crate::types::BACKGROUND_CLASS;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Similar and other classes of one class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionEntry {
    pub similar: BTreeSet<String>,
    pub other: BTreeSet<String>,
}

/// Per-class confusion entries, built once and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMap {
    entries: HashMap<String, ConfusionEntry>,
}

impl ConfusionMap {
    /// Build the map from already-parsed similar sets.
    ///
    /// Names outside `classes` are ignored, both as keys and as members.
    /// Every known class except the background gets an entry.
    pub fn from_similar<S: AsRef<str>>(
        classes: &[S],
        similar: &HashMap<String, HashSet<String>>,
    ) -> Self {
        let known: Vec<&str> = classes
            .iter()
            .map(AsRef::<str>::as_ref)
            .filter(|name| *name != BACKGROUND_CLASS)
            .collect();

        let entries = known
            .iter()
            .map(|&class_name| {
                let similar: BTreeSet<String> = similar
                    .get(class_name)
                    .into_iter()
                    .flatten()
                    .filter(|name| name.as_str() != class_name && known.contains(&name.as_str()))
                    .cloned()
                    .collect();
                let other: BTreeSet<String> = known
                    .iter()
                    .filter(|&&name| name != class_name && !similar.contains(name))
                    .map(|&name| name.to_string())
                    .collect();
                (class_name.to_string(), ConfusionEntry { similar, other })
            })
            .collect();

        Self { entries }
    }

    /// Parse the colon-separated text format.
    pub fn parse<S: AsRef<str>>(classes: &[S], text: &str) -> Self {
        let known: HashSet<&str> = classes.iter().map(AsRef::<str>::as_ref).collect();
        let mut similar: HashMap<String, HashSet<String>> = HashMap::new();

        for line in text.lines() {
            let group: Vec<&str> = line
                .split(':')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect();

            for &class_name in &group {
                if !known.contains(class_name) {
                    debug!(class = class_name, "Ignoring unknown class in confusion map");
                    continue;
                }
                let members = similar.entry(class_name.to_string()).or_default();
                members.extend(
                    group
                        .iter()
                        .filter(|&&name| name != class_name)
                        .map(|&name| name.to_string()),
                );
            }
        }

        Self::from_similar(classes, &similar)
    }

    /// Load and parse a confusion file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load_from_file<S: AsRef<str>, P: AsRef<Path>>(classes: &[S], path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(classes, &text))
    }

    pub fn get(&self, class_name: &str) -> Option<&ConfusionEntry> {
        self.entries.get(class_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

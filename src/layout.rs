//! Per-patient channel layout.
//!
//! A [`ChannelLayout`] is the target schema every record of a patient is
//! reconciled to: an ordered list of unique channel names. It is built once
//! from the summary file and never mutated afterwards.
use std::collections::{HashMap, HashSet};

/// Suffix appended to a label that collides with an already registered one.
pub const DUPLICATE_SUFFIX: &str = "-2";

/// One named channel of a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutChannel {
    pub name:    String,
    /// 1-based discovery indices registered under this name.
    pub indices: Vec<usize>,
    /// Channel numbers the summary declared for this name (1-based).
    pub source:  Vec<usize>,
}

/// Ordered channel name → indices mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelLayout {
    channels: Vec<LayoutChannel>,
    position: HashMap<String, usize>,
}

/// Resolve a label against already registered names.
///
/// Only one level of disambiguation exists: a label whose `-2` form is also
/// taken maps onto that existing `-2` name.
pub fn disambiguate(label: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(label) {
        return label.to_string();
    }
    let renamed = format!("{label}{DUPLICATE_SUFFIX}");
    if taken(&renamed) {
        log::warn!("channel label {label:?} appears more than twice; {renamed:?} is reused");
    }
    renamed
}

impl ChannelLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a summary channel. Returns the name it was stored under.
    ///
    /// `source` is the channel number as written in the summary file.
    pub fn register(&mut self, label: &str, source: usize) -> &str {
        let name = disambiguate(label, |n| self.position.contains_key(n));
        let index = self.n_registered() + 1;
        let existing = self.position.get(&name).copied();
        let pos = match existing {
            Some(pos) => pos,
            None => {
                self.channels.push(LayoutChannel {
                    name: name.clone(),
                    indices: Vec::new(),
                    source: Vec::new(),
                });
                self.position.insert(name, self.channels.len() - 1);
                self.channels.len() - 1
            }
        };
        let ch = &mut self.channels[pos];
        ch.indices.push(index);
        ch.source.push(source);
        &ch.name
    }

    /// Total registrations, including repeated ones.
    fn n_registered(&self) -> usize {
        self.channels.iter().map(|c| c.indices.len()).sum()
    }

    /// Number of distinct channel names.
    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.position.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&LayoutChannel> {
        self.position.get(name).map(|&p| &self.channels[p])
    }

    pub fn channels(&self) -> &[LayoutChannel] {
        &self.channels
    }

    /// Channel names in layout order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.iter().map(|c| c.name.as_str())
    }

    /// Owned copy of [`names`](Self::names), as embedded in record metadata.
    pub fn valid_names(&self) -> Vec<String> {
        self.names().map(str::to_string).collect()
    }

    /// Name set used to match recording labels.
    pub fn name_set(&self) -> HashSet<String> {
        self.position.keys().cloned().collect()
    }
}

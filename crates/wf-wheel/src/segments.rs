//! Segment list snapshot and display helpers

use serde::{Deserialize, Serialize};
use wf_core::segment_angle;

/// Wheels shorter than this are repeated until they reach it, so a two-item
/// wheel still has enough pegs to tick.
pub const MIN_DISPLAY_SEGMENTS: usize = 16;

/// Ordered display strings, one per equal slice of the wheel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentList {
    labels: Vec<String>,
}

impl SegmentList {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// One segment per non-blank line, trimmed
    pub fn from_lines(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label of the segment at `index`
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Angular width of one segment (degrees)
    pub fn segment_angle(&self) -> f64 {
        segment_angle(self.len())
    }

    /// Copy repeated up to [`MIN_DISPLAY_SEGMENTS`]
    pub fn padded(&self) -> Self {
        Self {
            labels: pad_to_minimum(&self.labels, MIN_DISPLAY_SEGMENTS),
        }
    }

    /// Adjacent identical labels collapsed into runs
    pub fn groups(&self) -> Vec<SegmentGroup> {
        group_runs(&self.labels)
    }

    /// Distinct labels in first-appearance order
    pub fn unique_labels(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.labels
            .iter()
            .map(String::as_str)
            .filter(|label| seen.insert(*label))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SegmentList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// A run of adjacent segments sharing one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentGroup {
    pub label: String,
    pub start_index: usize,
    pub count: usize,
}

/// Repeat the whole list `ceil(minimum / len)` times when it is shorter than
/// `minimum`. Empty lists stay empty.
pub fn pad_to_minimum(items: &[String], minimum: usize) -> Vec<String> {
    if items.is_empty() || items.len() >= minimum {
        return items.to_vec();
    }
    let repeats = minimum.div_ceil(items.len());
    items
        .iter()
        .cycle()
        .take(items.len() * repeats)
        .cloned()
        .collect()
}

/// Collapse adjacent duplicates into [`SegmentGroup`]s
pub fn group_runs(labels: &[String]) -> Vec<SegmentGroup> {
    let mut groups: Vec<SegmentGroup> = Vec::new();
    for (index, label) in labels.iter().enumerate() {
        match groups.last_mut() {
            Some(group) if group.label == *label => group.count += 1,
            _ => groups.push(SegmentGroup {
                label: label.clone(),
                start_index: index,
                count: 1,
            }),
        }
    }
    groups
}

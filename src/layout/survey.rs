//! Canonical page size inference.
//!
//! Full-page backgrounds vastly outnumber icons and logos in a fixed-layout
//! book, so the most common image size is taken as the authored page size.

use crate::model::Dimension;
use serde::Serialize;
use std::collections::HashMap;

/// Frequency table of image sizes, in first-seen order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SizeSurvey {
    counts: Vec<(Dimension, usize)>,
    #[serde(skip)]
    positions: HashMap<Dimension, usize>,
}

impl SizeSurvey {
    /// Create an empty survey.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one image size.
    pub fn record(&mut self, size: Dimension) {
        match self.positions.get(&size) {
            Some(&pos) => self.counts[pos].1 += 1,
            None => {
                self.positions.insert(size, self.counts.len());
                self.counts.push((size, 1));
            }
        }
    }

    /// Number of sizes recorded.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct sizes and their counts, in first-seen order.
    pub fn frequencies(&self) -> &[(Dimension, usize)] {
        &self.counts
    }

    /// The most frequent size; ties go to the size seen first.
    pub fn canonical(&self) -> Option<Dimension> {
        let mut best: Option<(Dimension, usize)> = None;
        for &(size, count) in &self.counts {
            if best.map_or(true, |(_, n)| count > n) {
                best = Some((size, count));
            }
        }
        best.map(|(size, _)| size)
    }
}

impl FromIterator<Dimension> for SizeSurvey {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        let mut survey = SizeSurvey::new();
        for size in iter {
            survey.record(size);
        }
        survey
    }
}

/// The statistical mode of `samples`, or `None` when there are none.
pub fn canonical_size<I>(samples: I) -> Option<Dimension>
where
    I: IntoIterator<Item = Dimension>,
{
    samples.into_iter().collect::<SizeSurvey>().canonical()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wins() {
        let samples = [
            Dimension::new(600, 800),
            Dimension::new(600, 800),
            Dimension::new(100, 100),
        ];
        assert_eq!(canonical_size(samples), Some(Dimension::new(600, 800)));
    }

    #[test]
    fn test_minority_first() {
        let samples = [
            Dimension::new(32, 32),
            Dimension::new(1200, 1600),
            Dimension::new(1200, 1600),
        ];
        assert_eq!(canonical_size(samples), Some(Dimension::new(1200, 1600)));
    }

    #[test]
    fn test_tie_first_seen_wins() {
        let samples = [
            Dimension::new(100, 100),
            Dimension::new(600, 800),
            Dimension::new(600, 800),
            Dimension::new(100, 100),
        ];
        assert_eq!(canonical_size(samples), Some(Dimension::new(100, 100)));
    }

    #[test]
    fn test_empty() {
        assert_eq!(canonical_size(Vec::new()), None);
        assert!(SizeSurvey::new().is_empty());
    }

    #[test]
    fn test_frequencies() {
        let survey: SizeSurvey = [
            Dimension::new(1, 2),
            Dimension::new(3, 4),
            Dimension::new(1, 2),
        ]
        .into_iter()
        .collect();
        assert_eq!(survey.total(), 3);
        assert_eq!(
            survey.frequencies(),
            &[(Dimension::new(1, 2), 2), (Dimension::new(3, 4), 1)]
        );
    }
}

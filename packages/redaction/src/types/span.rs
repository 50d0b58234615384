//! Detected spans of PII within a text.

use serde::{Deserialize, Serialize};

use super::PiiCategory;

/// Where a detection came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// A local pattern redactor whose validator accepted the match
    Pattern,
    /// A cloud detection provider, by registered name
    Provider(String),
}

/// A half-open byte range `[start, end)` flagged as PII.
///
/// Offsets always index the text the detection was produced against and
/// always fall on UTF-8 character boundaries. Detections from chunked scans
/// are rebased to whole-text offsets before merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub start: usize,
    pub end: usize,
    pub category: PiiCategory,
    /// Provider-reported score in `[0.0, 1.0]`; pattern matches are 1.0
    pub confidence: f64,
    pub source: DetectionSource,
}

impl Detection {
    /// Detection produced by a local pattern redactor.
    pub fn pattern(start: usize, end: usize, category: PiiCategory) -> Self {
        Self {
            start,
            end,
            category,
            confidence: 1.0,
            source: DetectionSource::Pattern,
        }
    }

    /// Detection reported by a cloud provider.
    pub fn provider(
        start: usize,
        end: usize,
        category: PiiCategory,
        confidence: f64,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            category,
            confidence,
            source: DetectionSource::Provider(provider.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when the two byte ranges share at least one byte.
    pub fn overlaps(&self, other: &Detection) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Shifts both offsets by `offset`, mapping chunk-relative positions
    /// back to whole-text positions.
    pub fn rebase(mut self, offset: usize) -> Self {
        self.start += offset;
        self.end += offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_symmetric_and_excludes_touching() {
        let a = Detection::pattern(0, 5, PiiCategory::Email);
        let b = Detection::pattern(3, 8, PiiCategory::Phone);
        let c = Detection::pattern(5, 9, PiiCategory::Phone);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // [0,5) and [5,9) touch but do not overlap
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_rebase_shifts_both_ends() {
        let d = Detection::pattern(2, 7, PiiCategory::Email).rebase(100);
        assert_eq!((d.start, d.end), (102, 107));
        assert_eq!(d.len(), 5);
    }

    #[test]
    fn test_pattern_detections_have_full_confidence() {
        let d = Detection::pattern(0, 4, PiiCategory::Phone);
        assert_eq!(d.confidence, 1.0);
        assert_eq!(d.source, DetectionSource::Pattern);
    }
}

//! Merge and conflict resolution for raw detections.

use std::cmp::Ordering;

use crate::types::{Detection, DetectionSource};

/// Resolves raw detections from every source into a replacement plan:
/// non-overlapping, sorted by position.
///
/// When spans conflict the winner is decided by, in order: earlier start,
/// wider span, pattern source over provider source, higher provider
/// confidence, then arrival order (registration order for patterns). The
/// sort is stable, so equal keys never reorder.
pub fn resolve(mut detections: Vec<Detection>) -> Vec<Detection> {
    detections.sort_by(compare_precedence);

    let mut plan: Vec<Detection> = Vec::with_capacity(detections.len());
    for detection in detections {
        if detection.is_empty() {
            continue;
        }
        match plan.last() {
            Some(kept) if detection.start < kept.end => {
                tracing::debug!(
                    start = detection.start,
                    end = detection.end,
                    category = %detection.category,
                    "Dropping overlapped detection"
                );
            }
            _ => plan.push(detection),
        }
    }
    plan
}

fn compare_precedence(a: &Detection, b: &Detection) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| source_rank(&a.source).cmp(&source_rank(&b.source)))
        .then_with(|| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        })
}

fn source_rank(source: &DetectionSource) -> u8 {
    match source {
        DetectionSource::Pattern => 0,
        DetectionSource::Provider(_) => 1,
    }
}

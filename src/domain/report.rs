use std::cmp::Reverse;

use serde::Serialize;

use super::CollaborationRecord;

/// The outcome of a computation: the pair who worked together longest, and
/// every pair who worked together at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollaborationReport {
    #[serde(rename = "longestCollaboration")]
    longest: CollaborationRecord,

    #[serde(rename = "allCollaborations")]
    all: Vec<CollaborationRecord>,
}

impl CollaborationReport {
    /// The pair with the most shared days.
    ///
    /// When nobody collaborated this is an empty record: no employees, no
    /// projects, and zero days.
    #[must_use]
    pub const fn longest(&self) -> &CollaborationRecord {
        &self.longest
    }

    /// Every collaborating pair, in computation order.
    #[must_use]
    pub fn all(&self) -> &[CollaborationRecord] {
        &self.all
    }

    /// Returns `true` if no pair shared any days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Every collaborating pair, most shared days first.
    ///
    /// The sort is stable, so pairs with equal totals keep their computation
    /// order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&CollaborationRecord> {
        let mut ranked: Vec<_> = self.all.iter().collect();
        ranked.sort_by_key(|record| Reverse(record.total_days()));
        ranked
    }
}

/// Picks the longest collaboration out of a set of records.
///
/// Ties go to the record that comes first. An empty set is not an error; it
/// yields an empty [`longest`](CollaborationReport::longest) record.
#[must_use]
pub fn select(records: Vec<CollaborationRecord>) -> CollaborationReport {
    let longest = records
        .iter()
        .fold(None, |best: Option<&CollaborationRecord>, record| match best {
            Some(best) if best.total_days() >= record.total_days() => Some(best),
            _ => Some(record),
        })
        .cloned()
        .unwrap_or_default();

    CollaborationReport {
        longest,
        all: records,
    }
}

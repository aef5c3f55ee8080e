//! Per-item results of a batch run.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single item produced no output.  Never fatal to the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemError {
    #[error("could not read source: {0}")]
    Read(String),

    #[error("could not decode source: {0}")]
    Decode(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("could not encode output: {0}")]
    Encode(String),

    #[error("could not write output: {0}")]
    Write(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Rendered and written to `output`.
    Processed { output: PathBuf },
    /// Caught failure; the item still counts as completed.
    Failed(ItemError),
    /// The run was cancelled before the item was dequeued.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub id: String,
    pub outcome: ItemOutcome,
}

/// Outcome of every input item, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    /// Number of items the run accounted for (always the input length).
    pub fn completed(&self) -> usize {
        self.items.len()
    }

    pub fn processed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Processed { .. }))
            .count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.items
            .iter()
            .filter(|r| r.outcome == ItemOutcome::Cancelled)
            .count()
    }

    /// Items that failed, with their error.
    pub fn failed(&self) -> Vec<(&str, &ItemError)> {
        self.items
            .iter()
            .filter_map(|r| match &r.outcome {
                ItemOutcome::Failed(e) => Some((r.id.as_str(), e)),
                _ => None,
            })
            .collect()
    }

    /// Every item was processed.
    pub fn is_clean(&self) -> bool {
        self.processed_count() == self.items.len()
    }

    pub fn outcome(&self, id: &str) -> Option<&ItemOutcome> {
        self.items.iter().find(|r| r.id == id).map(|r| &r.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> BatchReport {
        BatchReport {
            items: vec![
                ItemReport {
                    id: "a".into(),
                    outcome: ItemOutcome::Processed {
                        output: PathBuf::from("processed_a.wav"),
                    },
                },
                ItemReport {
                    id: "b".into(),
                    outcome: ItemOutcome::Failed(ItemError::Decode("bad header".into())),
                },
                ItemReport {
                    id: "c".into(),
                    outcome: ItemOutcome::Cancelled,
                },
            ],
        }
    }

    #[test]
    fn counts_by_outcome() {
        let r = report();
        assert_eq!(r.completed(), 3);
        assert_eq!(r.processed_count(), 1);
        assert_eq!(r.cancelled_count(), 1);
        assert!(!r.is_clean());

        let failed = r.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "b");
        assert_eq!(
            failed[0].1.to_string(),
            "could not decode source: bad header"
        );
    }

    #[test]
    fn empty_report_is_clean() {
        assert!(BatchReport::default().is_clean());
    }

    #[test]
    fn outcome_lookup() {
        let r = report();
        assert_eq!(r.outcome("c"), Some(&ItemOutcome::Cancelled));
        assert!(r.outcome("zzz").is_none());
    }
}

use crate::domain::error::Result;
use crate::domain::submission::{Submission, SubmissionInput};
use crate::infrastructure::record_store::JsonRecordStore;
use std::sync::Arc;
use tracing::{error, info};
use validator::Validate;

pub struct SubmissionUseCase {
    store: Arc<JsonRecordStore>,
}

impl SubmissionUseCase {
    pub fn new(store: Arc<JsonRecordStore>) -> Self {
        Self { store }
    }

    /// Records a drawn pair. Blank fields are rejected before the store is touched.
    pub fn submit(&self, name: &str, manitto: &str) -> Result<Submission> {
        let input = SubmissionInput::new(name, manitto);
        input.validate()?;

        let record = self
            .store
            .append(input.name, input.manitto)
            .map_err(|e| {
                error!(error = %e, path = %self.store.path().display(), "Failed to save submission");
                e
            })?;

        info!(name = %record.name, time = %record.time, "Submission recorded");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn use_case(dir: &tempfile::TempDir) -> (SubmissionUseCase, Arc<JsonRecordStore>) {
        let store = Arc::new(JsonRecordStore::new(dir.path().join("result.json")));
        (SubmissionUseCase::new(store.clone()), store)
    }

    #[test]
    fn test_submit_trims_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let (use_case, store) = use_case(&dir);

        let record = use_case.submit("  Alice ", " Bob").unwrap();
        assert_eq!(record.name, "Alice");
        assert_eq!(record.manitto, "Bob");
        assert_eq!(store.load().unwrap(), vec![record]);
    }

    #[test]
    fn test_blank_field_is_rejected_without_write() {
        let dir = tempfile::tempdir().unwrap();
        let (use_case, store) = use_case(&dir);

        assert!(use_case.submit("Alice", "   ").unwrap_err().is_validation());
        assert!(use_case.submit("", "Bob").unwrap_err().is_validation());
        assert!(!store.path().exists());
    }
}

use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};
use crate::domain::submission::{DisplayRecord, Submission};
use crate::infrastructure::csv::{CsvExport, CsvExporter};
use crate::infrastructure::record_store::JsonRecordStore;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const DEFAULT_RECENT_LIMIT: usize = 5;
pub const WRONG_PASSWORD_MESSAGE: &str = "비밀번호가 틀렸습니다.";

/// Everything the admin screen renders.
#[derive(Debug, Clone)]
pub struct AdminView {
    pub records: Vec<DisplayRecord>,
    pub recent: Vec<Submission>,
    pub show_full: bool,
    pub message: Option<String>,
    pub sort_by_name: bool,
}

/// Attach each record's stored position, then optionally sort by name.
///
/// `sort_by` is stable, so equal names keep submission order.
pub fn build_display_set(records: &[Submission], sort_by_name: bool) -> Vec<DisplayRecord> {
    let mut display: Vec<DisplayRecord> = records
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, record)| DisplayRecord { index, record })
        .collect();

    if sort_by_name {
        display.sort_by(|a, b| a.record.name.cmp(&b.record.name));
    }
    display
}

/// The last `n` submissions, most recent first.
pub fn recent_summary(records: &[Submission], n: usize) -> Vec<Submission> {
    records.iter().rev().take(n).cloned().collect()
}

/// Plain value sort by name, used by the export.
pub fn sorted_by_name(records: &[Submission]) -> Vec<Submission> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

pub struct AdminUseCase {
    store: Arc<JsonRecordStore>,
    exporter: CsvExporter,
    admin_password: String,
    recent_limit: usize,
}

impl AdminUseCase {
    pub fn new(store: Arc<JsonRecordStore>, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            store,
            exporter: CsvExporter::for_label(&config.export_encoding)?,
            admin_password: config.admin_password.clone(),
            recent_limit: config.recent_limit,
        })
    }

    pub fn authenticate(&self, password: &str) -> bool {
        password == self.admin_password
    }

    /// Builds the admin screen. `password` is `Some` only when the reveal form was submitted.
    ///
    /// A wrong password still returns the full record set; only `show_full` and
    /// `message` differ.
    pub fn view(&self, sort_by_name: bool, password: Option<&str>) -> Result<AdminView> {
        let records = self.load()?;

        let (show_full, message) = match password {
            Some(candidate) if self.authenticate(candidate) => {
                info!(records = records.len(), "Admin revealed manitto pairs");
                (true, None)
            }
            Some(_) => {
                warn!("Admin password mismatch");
                (false, Some(WRONG_PASSWORD_MESSAGE.to_string()))
            }
            None => (false, None),
        };

        Ok(AdminView {
            records: build_display_set(&records, sort_by_name),
            recent: recent_summary(&records, self.recent_limit),
            show_full,
            message,
            sort_by_name,
        })
    }

    pub fn record(&self, idx: usize) -> Result<DisplayRecord> {
        let record = self.store.get(idx).map_err(|e| log_failure(e, "lookup", idx))?;
        Ok(DisplayRecord { index: idx, record })
    }

    /// Renames the record at `idx`. A blank name is accepted but writes nothing;
    /// an out-of-range index is still reported as not found.
    pub fn edit(&self, idx: usize, new_name: &str) -> Result<Option<Submission>> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            self.record(idx)?;
            return Ok(None);
        }

        let updated = self
            .store
            .update_name(idx, new_name.to_string())
            .map_err(|e| log_failure(e, "edit", idx))?;
        info!(index = idx, name = %updated.name, "Submission renamed");
        Ok(Some(updated))
    }

    pub fn delete(&self, idx: usize) -> Result<Submission> {
        let removed = self
            .store
            .remove(idx)
            .map_err(|e| log_failure(e, "delete", idx))?;
        info!(index = idx, name = %removed.name, "Submission deleted");
        Ok(removed)
    }

    pub fn export(&self, sort_by_name: bool) -> Result<CsvExport> {
        let records = self.load()?;
        let records = if sort_by_name {
            sorted_by_name(&records)
        } else {
            records
        };

        let export = self.exporter.export(&records)?;
        info!(
            rows = records.len(),
            bytes = export.bytes.len(),
            encoding = self.exporter.encoding().name(),
            "CSV export generated"
        );
        Ok(export)
    }

    fn load(&self) -> Result<Vec<Submission>> {
        self.store.load().map_err(|e| {
            error!(error = %e, path = %self.store.path().display(), "Failed to load submissions");
            e
        })
    }
}

fn log_failure(e: AppError, action: &str, idx: usize) -> AppError {
    if e.is_not_found() {
        warn!(index = idx, action, "Submission index out of range");
    } else {
        error!(error = %e, index = idx, action, "Submission update failed");
    }
    e
}

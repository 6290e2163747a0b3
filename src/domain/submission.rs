use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Korea Standard Time (UTC+9), the zone every `time` field is written in.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("UTC+9 is within offset bounds")
}

pub fn format_kst(now: DateTime<Utc>) -> String {
    now.with_timezone(&kst()).format(TIME_FORMAT).to_string()
}

/// One persisted pairing. Field order matches the JSON document layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub manitto: String,
    pub time: String,
}

impl Submission {
    pub fn new(name: String, manitto: String) -> Self {
        Self::at(name, manitto, Utc::now())
    }

    pub fn at(name: String, manitto: String, now: DateTime<Utc>) -> Self {
        Self {
            name,
            manitto,
            time: format_kst(now),
        }
    }
}

/// Trimmed form input. Both fields must be non-empty before it reaches the store.
#[derive(Debug, Clone, Validate)]
pub struct SubmissionInput {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub manitto: String,
}

impl SubmissionInput {
    pub fn new(name: &str, manitto: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            manitto: manitto.trim().to_string(),
        }
    }
}

/// A record paired with its position in the stored collection.
///
/// The index is attached before any reordering so edit and delete links keep
/// pointing at the underlying record whatever the display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    pub index: usize,
    pub record: Submission,
}

//! Performance status classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest performance classified as [`Status::Success`].
pub const SUCCESS_THRESHOLD: i32 = 80;

/// Lowest performance classified as [`Status::Warning`].
pub const WARNING_THRESHOLD: i32 = 70;

/// Traffic-light status of a member, derived from its performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Danger,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Warning => "warning",
            Status::Danger => "danger",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a performance value: `>= 80` success, `>= 70` warning, else danger.
///
/// Total over all integers; out-of-range values classify like their nearest bucket.
pub fn status_from_performance(value: i32) -> Status {
    if value >= SUCCESS_THRESHOLD {
        Status::Success
    } else if value >= WARNING_THRESHOLD {
        Status::Warning
    } else {
        Status::Danger
    }
}

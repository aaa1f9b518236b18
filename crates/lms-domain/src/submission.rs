//! Submission lifecycle.
//!
//! ```text
//! none ──submit (at or before due)──▶ submitted ──grade──▶ graded
//!   └───submit (strictly after due)─▶ late ───────grade──▶ graded
//! ```
//!
//! There is no way back to `none` and no second submission for the same
//! (assignment, student) pair. `Draft` exists only as a storage-level value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Late,
    Graded,
}

impl SubmissionStatus {
    /// Status of a first submission made at `submitted_at` against `due_at`.
    /// The due instant itself is on time.
    pub fn on_submit(submitted_at: DateTime<Utc>, due_at: DateTime<Utc>) -> Self {
        if submitted_at > due_at {
            Self::Late
        } else {
            Self::Submitted
        }
    }

    pub fn is_gradable(self) -> bool {
        matches!(self, Self::Submitted | Self::Late | Self::Graded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Late => "late",
            Self::Graded => "graded",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "late" => Ok(Self::Late),
            "graded" => Ok(Self::Graded),
            other => Err(UnknownVariant {
                kind: "submission status",
                value: other.to_owned(),
            }),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An active alert. The title doubles as the key used to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>, raised_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            raised_at,
        }
    }
}

impl core::fmt::Display for Alert {
    /// `"title: message"`, the form listed to operators and accepted back by `resolve`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

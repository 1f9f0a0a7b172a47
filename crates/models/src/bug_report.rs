use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What the user types into the bug-report dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct NewBugReport {
    pub title: String,
    pub description: String,
}

/// Body for `POST /report-bug`, enriched with the reporter's first name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct BugReport {
    pub name: String,
    pub title: String,
    pub description: String,
}

impl BugReport {
    pub fn from_draft(draft: NewBugReport, reporter: impl Into<String>) -> Self {
        Self {
            name: reporter.into(),
            title: draft.title,
            description: draft.description,
        }
    }
}

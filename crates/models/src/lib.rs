//! Entity types shared by the inventory client, services and CLI.
//!
//! The backend owns every record; these types mirror its JSON wire format and
//! tolerate the drift observed between backend versions (numeric vs string ids,
//! status capitalization, legacy note keys).

pub mod bug_report;
pub mod exhibit;
mod id;
pub mod jotform;
pub mod note;
pub mod part;
pub mod user_profile;

pub use bug_report::{BugReport, NewBugReport};
pub use exhibit::{
    AddPartRequest, Exhibit, ExhibitStatus, NewExhibit, Sponsorship, StatusChange, UpdateExhibit,
};
pub use id::CreatedId;
pub use jotform::{Department, Jotform, JotformStatus, Priority, SubmissionDate, SubmitterName};
pub use note::{NewNote, Note, NoteOwner, NoteOwnerKind, NoteTimestamp};
pub use part::{NewPart, Part, UpdatePart};
pub use user_profile::UserProfile;

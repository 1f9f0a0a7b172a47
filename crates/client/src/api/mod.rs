mod bug_reports;
mod dev;
mod exhibits;
mod jotforms;
mod notes;
mod parts;

pub use bug_reports::BugReportsApi;
pub use dev::DevApi;
pub use exhibits::ExhibitsApi;
pub use jotforms::JotformsApi;
pub use notes::NotesApi;
pub use parts::PartsApi;

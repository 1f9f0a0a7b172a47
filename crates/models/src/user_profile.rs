use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Signed-in staff member, as reported by the native shell (not the REST backend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

impl UserProfile {
    /// Name used when attributing notes; falls back to the given name.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.given_name
        } else {
            &self.name
        }
    }
}

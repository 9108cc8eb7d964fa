pub use super::id::MemberId;
use serde::{Deserialize, Serialize};

/// A member as known to the profile directory.
///
/// The engine itself only ever looks at the identifier; the display name is
/// attached after settlements have been planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

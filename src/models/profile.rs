use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    id: String,
    save_chats: bool,
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            save_chats: false,
        }
    }

    pub fn with_save_chats(mut self, save_chats: bool) -> Self {
        self.save_chats = save_chats;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the user opted into history retention.
    pub fn save_chats(&self) -> bool {
        self.save_chats
    }
}

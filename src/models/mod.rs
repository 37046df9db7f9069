pub mod api;
pub mod conversation;
pub mod crisis;
pub mod event;
pub mod message;
pub mod profile;
pub mod transcript;
pub mod user;

pub use api::*;
pub use conversation::Conversation;
pub use crisis::CrisisFlag;
pub use event::MessageEvent;
pub use message::{Message, Sender};
pub use profile::Profile;
pub use transcript::{Role, TranscriptMessage};
pub use user::User;

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;

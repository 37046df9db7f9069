pub mod events;
pub mod history;
pub mod router;

pub use events::MessageEvents;
pub use history::HistoryAssembler;
pub use router::{ChatError, ResponseRouter};

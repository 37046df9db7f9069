use std::sync::Arc;

use crate::{
    chat::{MessageEvents, ResponseRouter},
    identity::ArcIdentity,
    storage::ArcStorage,
};

/// Shared by every handler. All members are cheap to clone or behind `Arc`.
pub struct AppState {
    pub storage: ArcStorage,
    pub identity: ArcIdentity,
    pub router: Arc<ResponseRouter>,
    pub events: MessageEvents,
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::Stream;
use serde_json::{Value, json};
use tokio_stream::{
    StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};

use crate::{
    config::{self, ServerConfig},
    crisis::{CrisisResource, crisis_resources},
    models::{
        ChatRequest, ChatResponse, Conversation, DeleteConversationsResponse, Message, Profile,
        ProfileSettings, User,
    },
};

use super::{
    auth::AuthUser,
    error::ServerError,
    middleware::{access_log, cors_layer},
    state::SharedState,
};

pub fn build(state: SharedState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/chat", post(chat))
        .route("/profile", get(get_profile).put(update_profile))
        .route(
            "/conversations",
            get(list_conversations).delete(delete_conversations),
        )
        .route("/conversations/{id}/messages", get(list_messages))
        .route("/conversations/{id}/events", get(conversation_events))
        .route("/crisis-resources", get(get_crisis_resources));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .layer(middleware::from_fn(access_log))
        .layer(cors_layer(config))
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": config::VERSION,
        "revision": config::GIT_SHA,
    }))
}

async fn get_crisis_resources() -> Json<&'static [CrisisResource]> {
    Json(crisis_resources())
}

async fn chat(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(req) = body.map_err(|err| ServerError::BadRequest(err.body_text()))?;
    let resp = state.router.handle(&user, req).await?;
    Ok(Json(resp))
}

async fn get_profile(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileSettings>, ServerError> {
    let profile = state.storage.get_profile(user.id()).await?;
    Ok(Json(ProfileSettings {
        save_chats: profile.map(|p| p.save_chats()).unwrap_or(false),
    }))
}

async fn update_profile(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    body: Result<Json<ProfileSettings>, JsonRejection>,
) -> Result<Json<ProfileSettings>, ServerError> {
    let Json(settings) = body.map_err(|err| ServerError::BadRequest(err.body_text()))?;
    state
        .storage
        .upsert_profile(Profile::new(user.id()).with_save_chats(settings.save_chats))
        .await?;
    log::info!(
        "User {} set chat retention to {}",
        user.id(),
        settings.save_chats
    );
    Ok(Json(settings))
}

async fn list_conversations(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Conversation>>, ServerError> {
    let conversations = state.storage.get_conversations(user.id()).await?;
    Ok(Json(conversations))
}

async fn delete_conversations(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
) -> Result<Json<DeleteConversationsResponse>, ServerError> {
    let deleted = state.storage.delete_conversations(user.id()).await?;
    log::info!("Deleted {} conversations of user {}", deleted, user.id());
    Ok(Json(DeleteConversationsResponse { deleted }))
}

async fn list_messages(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ServerError> {
    ensure_owned(&state, &user, &id).await?;
    let messages = state.storage.get_messages(&id).await?;
    Ok(Json(messages))
}

/// Streams assistant messages persisted to the conversation after the
/// subscription starts.
async fn conversation_events(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    ensure_owned(&state, &user, &id).await?;

    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |event| {
        let event = match event {
            Ok(event) => event,
            Err(BroadcastStreamRecvError::Lagged(n)) => {
                log::warn!("Event subscriber for conversation {} lagged by {}", id, n);
                return None;
            }
        };

        let message = event.message();
        if message.conversation_id() != id || !message.is_assistant() {
            return None;
        }

        match Event::default().event("message").json_data(message) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                log::warn!("Failed to encode message event: {}", err);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Foreign and missing conversations are indistinguishable to the caller.
async fn ensure_owned(state: &SharedState, user: &User, id: &str) -> Result<(), ServerError> {
    match state.storage.get_conversation(id).await? {
        Some(conversation) if conversation.is_owned_by(user.id()) => Ok(()),
        _ => Err(ServerError::NotFound("conversation not found".to_string())),
    }
}

use crate::history::{ ConversationStore, StoreError };
use crate::models::api::{
    DeleteMessageRequest,
    ErrorResponse,
    SendMessageRequest,
    StartConversationResponse,
    TranscriptResponse,
    UpdateMessageRequest,
};
use std::sync::Arc;
use axum::{
    routing::post,
    Router,
    Json,
    extract::State,
    response::{ IntoResponse, Response },
    http::{ HeaderValue, StatusCode },
};
use tower_http::cors::{ AllowHeaders, AllowMethods, AllowOrigin, CorsLayer };
use log::{ debug, warn };

#[derive(Clone)]
struct AppState {
    store: Arc<ConversationStore>,
}

/// Store errors as HTTP responses. Both map to 404 with a fixed `detail`.
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match self.0 {
            StoreError::NotFound | StoreError::InvalidIndex => StatusCode::NOT_FOUND,
        };
        (code, Json(ErrorResponse { detail: self.0.to_string() })).into_response()
    }
}

pub fn router(store: Arc<ConversationStore>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/start_conversation", post(start_conversation_handler))
        .route("/send_message", post(send_message_handler))
        .route("/update_message", post(update_message_handler))
        .route("/delete_message", post(delete_message_handler))
        .layer(cors_layer(allowed_origins))
        .with_state(AppState { store })
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        warn!("No CORS origins configured; browser clients will be rejected.");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn start_conversation_handler(State(state): State<AppState>) -> Json<StartConversationResponse> {
    let conversation_id = state.store.create().await;
    Json(StartConversationResponse {
        status: "conversation started".into(),
        conversation_id,
    })
}

async fn send_message_handler(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    debug!("send_message conversation={}", req.conversation_id);
    let transcript = state.store.append(&req.conversation_id, &req.text).await?;
    Ok(Json(TranscriptResponse {
        status: "message sent".into(),
        response: transcript,
    }))
}

async fn update_message_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    debug!("update_message conversation={} message_id={}", req.conversation_id, req.message_id);
    let transcript = state.store
        .edit_from(&req.conversation_id, req.message_id, &req.text).await?;
    Ok(Json(TranscriptResponse {
        status: "message updated".into(),
        response: transcript,
    }))
}

async fn delete_message_handler(
    State(state): State<AppState>,
    Json(req): Json<DeleteMessageRequest>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    debug!("delete_message conversation={} message_id={}", req.conversation_id, req.message_id);
    let transcript = state.store
        .truncate_before(&req.conversation_id, req.message_id).await?;
    // Deletion reports the same status string as an edit.
    Ok(Json(TranscriptResponse {
        status: "message updated".into(),
        response: transcript,
    }))
}

use super::tls::{ load_tls_config, TlsPaths };
use super::ServerError;
use crate::agent::Assistant;
use crate::models::chat::{ ChatRequest, ChatResponse, ErrorResponse, INVALID_REQUEST_MESSAGE };
use axum::{
    routing::post,
    Router,
    Json,
    extract::{ State, rejection::JsonRejection },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use serde_json::Value as JsonValue;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn };

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", INVALID_REQUEST_MESSAGE)]
    InvalidRequest,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

#[derive(Clone)]
struct AppState {
    assistant: Assistant,
}

pub fn router(assistant: Assistant) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/assistant", post(assistant_handler))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(AppState { assistant })
}

/// Serves the router on an already-bound listener.
pub async fn serve(listener: TcpListener, assistant: Assistant) -> Result<(), ServerError> {
    axum::serve(listener, router(assistant).into_make_service()).await?;
    Ok(())
}

pub async fn start_http_server(
    addr: &str,
    assistant: Assistant,
    tls: Option<TlsPaths>,
) -> Result<(), ServerError> {
    let socket_addr = addr.parse::<SocketAddr>().map_err(|source| ServerError::Address {
        addr: addr.to_string(),
        source,
    })?;

    match tls {
        Some(paths) => {
            let config = axum_server::tls_rustls::RustlsConfig::from_config(
                load_tls_config(&paths)?
            );
            info!("HTTPS assistant API listening on: https://{}", socket_addr);
            axum_server::bind_rustls(socket_addr, config)
                .serve(router(assistant).into_make_service())
                .await
                .map_err(|source| ServerError::Bind { addr: addr.to_string(), source })?;
        }
        None => {
            let listener = TcpListener::bind(socket_addr).await.map_err(|source| {
                ServerError::Bind { addr: addr.to_string(), source }
            })?;
            info!("HTTP assistant API listening on: http://{}", socket_addr);
            serve(listener, assistant).await?;
        }
    }

    Ok(())
}

async fn assistant_handler(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let body = payload.map_err(|rejection| {
        warn!("Rejected assistant request body: {}", rejection.body_text());
        ApiError::InvalidRequest
    })?;

    let request = ChatRequest::from_json(&body).ok_or_else(|| {
        warn!("Assistant request without a string 'message' field");
        ApiError::InvalidRequest
    })?;

    let reply = state.assistant.process_message(&request.message);
    Ok(Json(ChatResponse { response: reply.text }))
}

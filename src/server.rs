//! HTTPS front end: a single `POST /mutate` route behind rustls.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tracing::{debug, error, info, warn};

use crate::admission::{
    build_response, check_resource, decode_review, extract_pod, JSON_CONTENT_TYPE,
};
use crate::config::ServerConfig;
use crate::error::{AdmissionError, StartupError};
use crate::patch::Injector;

pub const MUTATE_PATH: &str = "/mutate";

/// Shared, read-only state handed to every request.
#[derive(Clone, Debug)]
pub struct WebhookState {
    pub injector: Arc<Injector>,
}

impl WebhookState {
    pub fn new(injector: Injector) -> Self {
        Self {
            injector: Arc::new(injector),
        }
    }
}

pub fn webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route(MUTATE_PATH, post(mutate_handler))
        .with_state(state)
}

async fn mutate_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    debug!("received message on mutate");

    match mutate(&state.injector, &headers, &body) {
        Ok(review) => {
            (StatusCode::OK, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], review).into_response()
        }
        Err(err) => {
            if err.status_code().is_server_error() {
                error!(error = %err, "admission request failed");
            } else {
                warn!(error = %err, "admission request rejected");
            }
            err.into_response()
        }
    }
}

/// Run one admission review through decode, resource check, pod extraction,
/// decision and response building, stopping at the first failure.
pub fn mutate(
    injector: &Injector,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Vec<u8>, AdmissionError> {
    let review = decode_review(headers, body)?;
    check_resource(&review.request)?;
    let pod = extract_pod(&review)?;
    let decision = injector.decide(&pod);
    debug!(
        uid = %review.request.uid,
        patched = decision.patch.is_some(),
        "returning response"
    );
    build_response(&review.request, decision)
}

/// Load the key pair, bind the port and serve until the listener fails.
pub async fn run_webhook_server(
    config: &ServerConfig,
    state: WebhookState,
) -> Result<(), StartupError> {
    debug!(cert = ?config.tls_cert, key = ?config.tls_key, "loading TLS key pair");
    let tls = RustlsConfig::from_pem_file(&config.tls_cert, &config.tls_key)
        .await
        .map_err(|source| StartupError::Tls {
            cert: config.tls_cert.clone(),
            key: config.tls_key.clone(),
            source,
        })?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = std::net::TcpListener::bind(addr)
        .and_then(|listener| listener.set_nonblocking(true).map(|()| listener))
        .map_err(|source| StartupError::Bind {
            port: config.port,
            source,
        })?;

    info!(port = config.port, "starting webhook");
    axum_server::from_tcp_rustls(listener, tls)
        .serve(webhook_router(state).into_make_service())
        .await
        .map_err(StartupError::Serve)
}

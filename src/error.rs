use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kube::core::admission::{ConvertAdmissionReviewError, SerializePatchError};

/// Failures of a single admission request.
///
/// None of these turn into an `allowed: false` review; every one of them
/// fails the HTTP exchange with a plaintext body instead.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("error getting admission review from request: expect application/json content-type")]
    UnsupportedMediaType,

    #[error("error getting admission review from request: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("error getting admission review from request: {0}")]
    MissingRequest(#[from] ConvertAdmissionReviewError),

    /// The review targets something other than core/v1 pods
    #[error("did not receive pod, got {0}")]
    ResourceMismatch(String),

    #[error("error decoding raw pod: {0}")]
    PodDecode(#[source] serde_json::Error),

    #[error("error decoding raw pod: no object in admission request")]
    MissingObject,

    #[error("error marshalling response json: {0}")]
    Patch(#[from] SerializePatchError),

    #[error("error marshalling response json: {0}")]
    Marshal(#[source] serde_json::Error),
}

impl AdmissionError {
    /// Malformed reviews are the caller's fault, a review whose embedded
    /// object or response cannot be handled is ours.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdmissionError::UnsupportedMediaType
            | AdmissionError::Decode(_)
            | AdmissionError::MissingRequest(_)
            | AdmissionError::ResourceMismatch(_) => StatusCode::BAD_REQUEST,
            AdmissionError::PodDecode(_)
            | AdmissionError::MissingObject
            | AdmissionError::Patch(_)
            | AdmissionError::Marshal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Conditions that stop the process before (or while) serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load TLS key pair ({cert:?}, {key:?}): {source}")]
    Tls {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build patch document: {0}")]
    Patch(#[source] serde_json::Error),

    #[error("webhook server error: {0}")]
    Serve(#[source] std::io::Error),
}

//! AdmissionReview handling: decoding the envelope, checking what it targets,
//! pulling the pod out of it, and building the review sent back.

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use k8s_openapi::api::core::v1::Pod;
use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse, AdmissionReview},
    DynamicObject, ResourceExt,
};
use serde_json::Value;
use tracing::trace;

use crate::error::AdmissionError;
use crate::patch::{AdmittedPod, PatchDecision};

pub const JSON_CONTENT_TYPE: &str = "application/json";

pub const POD_GROUP: &str = "";
pub const POD_VERSION: &str = "v1";
pub const POD_RESOURCE: &str = "pods";

/// An admission request with the reviewed object still in raw JSON form.
#[derive(Clone, Debug)]
pub struct DecodedReview {
    /// The envelope, with `object` and `oldObject` stripped.
    pub request: AdmissionRequest<DynamicObject>,
    pub object: Option<Value>,
}

/// Decode the request body into an admission request.
///
/// The body is only looked at once the content type is exactly
/// `application/json`. The reviewed objects are lifted out of the envelope
/// before it is decoded, so whatever shape they have is reported by
/// [`extract_pod`] rather than as a bad review.
pub fn decode_review(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<DecodedReview, AdmissionError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    if content_type != Some(JSON_CONTENT_TYPE) {
        return Err(AdmissionError::UnsupportedMediaType);
    }

    let mut envelope: Value = serde_json::from_slice(body).map_err(AdmissionError::Decode)?;
    let object = match envelope.get_mut("request").and_then(Value::as_object_mut) {
        Some(request) => {
            request.remove("oldObject");
            request.remove("object").filter(|object| !object.is_null())
        }
        None => None,
    };

    let review: AdmissionReview<DynamicObject> =
        serde_json::from_value(envelope).map_err(AdmissionError::Decode)?;
    let request: AdmissionRequest<DynamicObject> = review.try_into()?;
    trace!(uid = %request.uid, "decoded admission review");
    Ok(DecodedReview { request, object })
}

/// Reject anything that is not core/v1 pods.
pub fn check_resource<T: kube::Resource>(
    request: &AdmissionRequest<T>,
) -> Result<(), AdmissionError> {
    let gvr = &request.resource;
    if gvr.group == POD_GROUP && gvr.version == POD_VERSION && gvr.resource == POD_RESOURCE {
        Ok(())
    } else {
        Err(AdmissionError::ResourceMismatch(gvr.resource.clone()))
    }
}

/// Decode the reviewed object as a Pod.
///
/// A pod without a namespace of its own is attributed to the namespace of the
/// request.
pub fn extract_pod(review: &DecodedReview) -> Result<AdmittedPod, AdmissionError> {
    let object = review.object.as_ref().ok_or(AdmissionError::MissingObject)?;
    let pod: Pod = serde_json::from_value(object.clone()).map_err(AdmissionError::PodDecode)?;

    let namespace = pod
        .namespace()
        .filter(|ns| !ns.is_empty())
        .or_else(|| review.request.namespace.clone())
        .unwrap_or_default();

    Ok(AdmittedPod {
        name: pod.name_any(),
        namespace,
    })
}

/// Build the serialized response review.
///
/// The UID and the envelope's apiVersion/kind are echoed from the request.
/// The patch and its `JSONPatch` type are set together or not at all.
pub fn build_response<T: kube::Resource>(
    request: &AdmissionRequest<T>,
    decision: PatchDecision,
) -> Result<Vec<u8>, AdmissionError> {
    // AdmissionResponse::from always allows; denials are never produced.
    debug_assert!(decision.allowed, "admission decisions never deny");

    let mut response = AdmissionResponse::from(request);
    if let Some(patch) = decision.patch {
        response = response.with_patch(patch)?;
    }

    let mut review = response.into_review();
    review.types = request.types.clone();
    serde_json::to_vec(&review).map_err(AdmissionError::Marshal)
}

//! Mutating admission webhook that gives every new pod a freshly refreshed
//! CA certificate store.
//!
//! Pods outside the exempt namespaces get an init container that runs
//! `update-ca-certificates` and copies the result into an `emptyDir`, which is
//! then mounted over the system certificate path of the pod's first container.

pub mod admission;
pub mod cli;
pub mod config;
pub mod error;
pub mod patch;
pub mod server;

pub use config::{InjectionConfig, ServerConfig};
pub use error::{AdmissionError, StartupError};
pub use patch::{AdmittedPod, Injector, PatchDecision};
pub use server::{run_webhook_server, webhook_router, WebhookState, MUTATE_PATH};

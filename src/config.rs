//! Settings for the injected init container and for the HTTPS listener.
//!
//! Both are built once at startup and shared read-only with every request.

use std::collections::BTreeSet;
use std::path::PathBuf;

/// Namespaces whose pods are admitted without any mutation.
pub const DEFAULT_EXEMPT_NAMESPACES: [&str; 2] = ["cattle-system", "kube-system"];
/// Image used by the certificate refresh init container.
pub const DEFAULT_INIT_IMAGE: &str = "ubuntu";
/// Name of the `emptyDir` volume shared between the init container and the pod.
pub const DEFAULT_VOLUME_NAME: &str = "certs-out";
/// System certificate store path inside the first container.
pub const DEFAULT_MOUNT_PATH: &str = "/etc/ssl/certs";

/// Name of the injected init container.
pub const INIT_CONTAINER_NAME: &str = "certificates-to-shared-volume";
/// Where the init container sees the shared volume.
pub const STAGING_PATH: &str = "/certs-out";

/// Default HTTPS port.
pub const DEFAULT_PORT: u16 = 443;

/// What gets injected, and where it is skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectionConfig {
    pub exempt_namespaces: BTreeSet<String>,
    pub init_image: String,
    pub volume_name: String,
    pub mount_path: String,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            exempt_namespaces: DEFAULT_EXEMPT_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            init_image: DEFAULT_INIT_IMAGE.to_string(),
            volume_name: DEFAULT_VOLUME_NAME.to_string(),
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
        }
    }
}

impl InjectionConfig {
    pub fn is_exempt(&self, namespace: &str) -> bool {
        self.exempt_namespaces.contains(namespace)
    }
}

/// TLS material and listening port for the webhook server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// PEM encoded certificate chain
    pub tls_cert: PathBuf,
    /// PEM encoded private key
    pub tls_key: PathBuf,
    pub port: u16,
}

//! Patch decision engine.
//!
//! Every pod outside the exempt namespaces receives the same four operations:
//! an empty `initContainers` list, an init container that refreshes the CA
//! bundle and copies it into a shared `emptyDir`, that volume, and a mount of
//! it over the system certificate store of the first container.

use json_patch::{AddOperation, Patch, PatchOperation};
use k8s_openapi::api::core::v1::{Container, EmptyDirVolumeSource, Volume, VolumeMount};
use serde_json::json;
use tracing::{debug, info};

use crate::config::{InjectionConfig, INIT_CONTAINER_NAME, STAGING_PATH};

/// The admitted pod, reduced to what the decision needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmittedPod {
    pub name: String,
    pub namespace: String,
}

/// Outcome for one pod. Admission is never denied; only the patch varies.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchDecision {
    pub allowed: bool,
    pub patch: Option<Patch>,
}

/// Holds the injection settings and the patch document derived from them.
#[derive(Clone, Debug)]
pub struct Injector {
    config: InjectionConfig,
    patch: Patch,
}

impl Injector {
    pub fn new(config: InjectionConfig) -> Result<Self, serde_json::Error> {
        let patch = patch_document(&config)?;
        Ok(Self { config, patch })
    }

    pub fn config(&self) -> &InjectionConfig {
        &self.config
    }

    /// The document attached to every non-exempt pod.
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn decide(&self, pod: &AdmittedPod) -> PatchDecision {
        info!(pod = %pod.name, namespace = %pod.namespace, "processing pod");

        if self.config.is_exempt(&pod.namespace) {
            debug!(namespace = %pod.namespace, "namespace exempt, admitting unchanged");
            return PatchDecision {
                allowed: true,
                patch: None,
            };
        }

        PatchDecision {
            allowed: true,
            patch: Some(self.patch.clone()),
        }
    }
}

fn add(path: &str, value: serde_json::Value) -> PatchOperation {
    PatchOperation::Add(AddOperation {
        path: path.to_string(),
        value,
    })
}

/// Shell run by the init container: refresh the bundle, then stage it.
fn refresh_script(config: &InjectionConfig) -> String {
    format!(
        "apt-get update && apt-get install -y ca-certificates && apt-get update && \
         update-ca-certificates && cp -r {}/* {}/",
        config.mount_path, STAGING_PATH
    )
}

/// Build the patch document for `config`.
///
/// The init container list is reset to empty before appending, so any init
/// containers already declared by the pod are replaced.
pub fn patch_document(config: &InjectionConfig) -> Result<Patch, serde_json::Error> {
    let init_container = Container {
        name: INIT_CONTAINER_NAME.to_string(),
        image: Some(config.init_image.clone()),
        command: Some(vec!["/bin/sh".to_string(), "-c".to_string()]),
        args: Some(vec![refresh_script(config)]),
        volume_mounts: Some(vec![VolumeMount {
            name: config.volume_name.clone(),
            mount_path: STAGING_PATH.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    };

    let volume = Volume {
        name: config.volume_name.clone(),
        empty_dir: Some(EmptyDirVolumeSource::default()),
        ..Default::default()
    };

    let mount = VolumeMount {
        name: config.volume_name.clone(),
        mount_path: config.mount_path.clone(),
        ..Default::default()
    };

    Ok(Patch(vec![
        add("/spec/initContainers", json!([])),
        add("/spec/initContainers/-", serde_json::to_value(init_container)?),
        add("/spec/volumes/-", serde_json::to_value(volume)?),
        add(
            "/spec/containers/0/volumeMounts/-",
            serde_json::to_value(mount)?,
        ),
    ]))
}

//! # Cluster Resources
//!
//! Kubernetes API access used by the reconciler.
//!
//! Reads and writes go through [`ClusterResources`] so the reconcile logic can be
//! exercised against an in-memory cluster in tests. [`KubeResources`] is the
//! production implementation backed by `kube::Client`.

use crate::constants::CONTROLLER_NAME;
use crate::controller::labels::LabelSet;
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, ListParams, PostParams};
use kube::Client;

/// Namespace and name of a secret to reconcile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
}

impl SecretRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Build a reference from a watched object.
    /// Returns `None` for objects without a name.
    #[must_use]
    pub fn from_secret(secret: &Secret) -> Option<Self> {
        let name = secret.metadata.name.clone()?;
        let namespace = secret
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| "default".to_string());
        Some(Self { namespace, name })
    }
}

impl std::fmt::Display for SecretRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Kubernetes API operations needed by a reconcile cycle
#[async_trait]
pub trait ClusterResources: Send + Sync {
    /// Fetch a secret. `Ok(None)` when it does not exist.
    async fn get_secret(&self, secret_ref: &SecretRef) -> Result<Option<Secret>>;

    /// Replace a secret. The object's `resourceVersion` guards against stale writes.
    async fn replace_secret(&self, secret: &Secret) -> Result<Secret>;

    /// List ingresses in all namespaces carrying every label in `labels`
    async fn list_ingresses(&self, labels: &LabelSet) -> Result<Vec<Ingress>>;

    /// Replace an ingress. The object's `resourceVersion` guards against stale writes.
    async fn replace_ingress(&self, ingress: &Ingress) -> Result<Ingress>;
}

/// `kube::Client` backed cluster access
#[derive(Clone)]
pub struct KubeResources {
    client: Client,
}

impl std::fmt::Debug for KubeResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeResources").finish_non_exhaustive()
    }
}

impl KubeResources {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterResources for KubeResources {
    async fn get_secret(&self, secret_ref: &SecretRef) -> Result<Option<Secret>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &secret_ref.namespace);
        api.get_opt(&secret_ref.name)
            .await
            .with_context(|| format!("failed to get secret {secret_ref}"))
    }

    async fn replace_secret(&self, secret: &Secret) -> Result<Secret> {
        let (namespace, name) = object_key(&secret.metadata)?;
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.replace(name, &write_params(), secret)
            .await
            .with_context(|| format!("failed to update secret {namespace}/{name}"))
    }

    async fn list_ingresses(&self, labels: &LabelSet) -> Result<Vec<Ingress>> {
        let api: Api<Ingress> = Api::all(self.client.clone());
        let selector = labels.to_selector();
        let list = api
            .list(&ListParams::default().labels(&selector))
            .await
            .with_context(|| format!("failed to list ingresses with labels '{selector}'"))?;
        Ok(list.items)
    }

    async fn replace_ingress(&self, ingress: &Ingress) -> Result<Ingress> {
        let (namespace, name) = object_key(&ingress.metadata)?;
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        api.replace(name, &write_params(), ingress)
            .await
            .with_context(|| format!("failed to update ingress {namespace}/{name}"))
    }
}

/// Writes are attributed to the controller in `managedFields`
fn write_params() -> PostParams {
    PostParams {
        field_manager: Some(CONTROLLER_NAME.to_string()),
        ..PostParams::default()
    }
}

fn object_key(
    metadata: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta,
) -> Result<(&str, &str)> {
    let name = metadata
        .name
        .as_deref()
        .context("object has no metadata.name")?;
    let namespace = metadata.namespace.as_deref().unwrap_or("default");
    Ok((namespace, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_secret_ref_from_secret() {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("tls-site".to_string()),
                namespace: Some("web".to_string()),
                ..ObjectMeta::default()
            },
            ..Secret::default()
        };

        let secret_ref = SecretRef::from_secret(&secret).unwrap();
        assert_eq!(secret_ref, SecretRef::new("web", "tls-site"));
        assert_eq!(secret_ref.to_string(), "web/tls-site");
    }

    #[test]
    fn test_secret_ref_requires_name() {
        assert!(SecretRef::from_secret(&Secret::default()).is_none());
    }

    #[test]
    fn test_object_key_defaults_namespace() {
        let metadata = ObjectMeta {
            name: Some("site".to_string()),
            ..ObjectMeta::default()
        };
        assert_eq!(object_key(&metadata).unwrap(), ("default", "site"));
    }

    #[test]
    fn test_writes_use_controller_field_manager() {
        let params = write_params();
        assert_eq!(params.field_manager.as_deref(), Some("cert-secret-syncer"));
        assert!(!params.dry_run);
    }
}

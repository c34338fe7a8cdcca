//! In-memory stand-ins for the cluster and the certificate backend.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use cert_secret_syncer::config::ControllerConfig;
use cert_secret_syncer::controller::labels::LabelSet;
use cert_secret_syncer::controller::reconciler::Reconciler;
use cert_secret_syncer::controller::resources::{ClusterResources, SecretRef};
use cert_secret_syncer::provider::{CertificateBackend, ImportCertificateRequest};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long `get_secret` stalls when `slow_get_secret` is set
pub const SLOW_CALL: Duration = Duration::from_secs(5);

pub const TEST_ARN: &str = "arn:aws:acm:eu-west-1:123456789012:certificate/0d5e7c1a-test";

type ObjectKey = (String, String);

fn key_of(metadata: &ObjectMeta) -> ObjectKey {
    (
        metadata.namespace.clone().unwrap_or_else(|| "default".to_string()),
        metadata.name.clone().unwrap_or_default(),
    )
}

/// Secrets and ingresses held in memory, with write counters
#[derive(Default)]
pub struct FakeCluster {
    secrets: Mutex<BTreeMap<ObjectKey, Secret>>,
    ingresses: Mutex<BTreeMap<ObjectKey, Ingress>>,
    pub secret_replacements: AtomicUsize,
    pub ingress_replacements: AtomicUsize,
    pub fail_get_secret: AtomicBool,
    pub fail_replace_secret: AtomicBool,
    pub fail_list_ingresses: AtomicBool,
    pub fail_replace_ingress: AtomicBool,
    pub slow_get_secret: AtomicBool,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_secret(&self, secret: Secret) {
        self.secrets
            .lock()
            .unwrap()
            .insert(key_of(&secret.metadata), secret);
    }

    pub fn add_ingress(&self, ingress: Ingress) {
        self.ingresses
            .lock()
            .unwrap()
            .insert(key_of(&ingress.metadata), ingress);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Secret {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .expect("secret should exist")
    }

    pub fn ingress(&self, namespace: &str, name: &str) -> Ingress {
        self.ingresses
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .expect("ingress should exist")
    }

    pub fn secret_replacements(&self) -> usize {
        self.secret_replacements.load(Ordering::SeqCst)
    }

    pub fn ingress_replacements(&self) -> usize {
        self.ingress_replacements.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterResources for FakeCluster {
    async fn get_secret(&self, secret_ref: &SecretRef) -> Result<Option<Secret>> {
        if self.slow_get_secret.load(Ordering::SeqCst) {
            tokio::time::sleep(SLOW_CALL).await;
        }
        if self.fail_get_secret.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .get(&(secret_ref.namespace.clone(), secret_ref.name.clone()))
            .cloned())
    }

    async fn replace_secret(&self, secret: &Secret) -> Result<Secret> {
        if self.fail_replace_secret.load(Ordering::SeqCst) {
            return Err(anyhow!("409 conflict: the object has been modified"));
        }
        let key = key_of(&secret.metadata);
        let mut secrets = self.secrets.lock().unwrap();
        if !secrets.contains_key(&key) {
            return Err(anyhow!("secret {}/{} not found", key.0, key.1));
        }
        secrets.insert(key, secret.clone());
        self.secret_replacements.fetch_add(1, Ordering::SeqCst);
        Ok(secret.clone())
    }

    async fn list_ingresses(&self, labels: &LabelSet) -> Result<Vec<Ingress>> {
        if self.fail_list_ingresses.load(Ordering::SeqCst) {
            return Err(anyhow!("403 forbidden: cannot list ingresses"));
        }
        let empty = BTreeMap::new();
        Ok(self
            .ingresses
            .lock()
            .unwrap()
            .values()
            .filter(|ingress| labels.matches(ingress.metadata.labels.as_ref().unwrap_or(&empty)))
            .cloned()
            .collect())
    }

    async fn replace_ingress(&self, ingress: &Ingress) -> Result<Ingress> {
        if self.fail_replace_ingress.load(Ordering::SeqCst) {
            return Err(anyhow!("the object has been modified"));
        }
        self.ingresses
            .lock()
            .unwrap()
            .insert(key_of(&ingress.metadata), ingress.clone());
        self.ingress_replacements.fetch_add(1, Ordering::SeqCst);
        Ok(ingress.clone())
    }
}

/// Records every import and answers with a fixed ARN or a failure
pub struct FakeBackend {
    arn: String,
    fail: bool,
    imports: Mutex<Vec<ImportCertificateRequest>>,
}

impl FakeBackend {
    pub fn returning(arn: &str) -> Self {
        Self {
            arn: arn.to_string(),
            fail: false,
            imports: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            arn: String::new(),
            fail: true,
            imports: Mutex::new(Vec::new()),
        }
    }

    pub fn imports(&self) -> Vec<ImportCertificateRequest> {
        self.imports.lock().unwrap().clone()
    }
}

#[async_trait]
impl CertificateBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn import_certificate(&self, request: ImportCertificateRequest) -> Result<String> {
        self.imports.lock().unwrap().push(request);
        if self.fail {
            return Err(anyhow!("AccessDeniedException"));
        }
        Ok(self.arn.clone())
    }
}

pub fn reconciler(cluster: &Arc<FakeCluster>, backend: &Arc<FakeBackend>) -> Reconciler {
    reconciler_with_config(cluster, backend, ControllerConfig::default())
}

pub fn reconciler_with_config(
    cluster: &Arc<FakeCluster>,
    backend: &Arc<FakeBackend>,
    config: ControllerConfig,
) -> Reconciler {
    Reconciler::new(cluster.clone(), backend.clone(), config)
}

/// PEM certificates and key of a generated chain, leaf first
pub struct TestChain {
    pub certificates: Vec<String>,
    pub key_pem: String,
}

impl TestChain {
    pub fn generate(length: usize) -> Self {
        let mut certificates = Vec::with_capacity(length);
        let mut key_pem = String::new();
        for index in 0..length {
            let generated =
                rcgen::generate_simple_self_signed(vec![format!("host{index}.example.com")])
                    .expect("certificate generation should succeed");
            if index == 0 {
                key_pem = generated.key_pair.serialize_pem();
            }
            certificates.push(generated.cert.pem());
        }
        Self {
            certificates,
            key_pem,
        }
    }

    pub fn bundle_pem(&self) -> String {
        self.certificates.concat()
    }
}

pub struct SecretBuilder {
    secret: Secret,
}

impl SecretBuilder {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            secret: Secret {
                metadata: ObjectMeta {
                    name: Some(name.to_string()),
                    namespace: Some(namespace.to_string()),
                    ..ObjectMeta::default()
                },
                type_: Some("kubernetes.io/tls".to_string()),
                ..Secret::default()
            },
        }
    }

    pub fn annotation(mut self, key: &str, value: &str) -> Self {
        self.secret
            .metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn data(mut self, key: &str, value: &str) -> Self {
        self.secret
            .data
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), ByteString(value.as_bytes().to_vec()));
        self
    }

    pub fn tls(self, chain: &TestChain) -> Self {
        self.data("tls.crt", &chain.bundle_pem())
            .data("tls.key", &chain.key_pem)
    }

    pub fn build(self) -> Secret {
        self.secret
    }
}

pub fn ingress(namespace: &str, name: &str, labels: &[(&str, &str)]) -> Ingress {
    Ingress {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(
                labels
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            ..ObjectMeta::default()
        },
        ..Ingress::default()
    }
}

pub fn annotation_of(metadata: &ObjectMeta, key: &str) -> Option<String> {
    metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(key))
        .cloned()
}

//! Test helpers for netboot-server
//!
//! Provides a populated in-memory store and a one-shot request helper.

use crate::sign::{ArmoredSigner, Ed25519Signer, Signer};
use crate::store::MemoryStore;
use crate::{Config, Server};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use netboot_crd::{BootSpec, Group, Profile};
use std::sync::Arc;
use tower::ServiceExt;

pub const NODE_MAC: &str = "00:11:22:33:44:55";

pub const CLOUD_TEMPLATE: &str = "#cloud-config
hostname: {{ hostname }}
write_files:
  - path: /etc/node
    content: {{ mac }}
";

pub const IGNITION_TEMPLATE: &str = r#"{
  "ignition": {"version": "3.0.0"},
  "storage": {"files": [{"path": "/etc/hostname", "contents": {"source": "data:,{{ hostname }}"}}]}
}
"#;

/// Store holding the resources most tests share
///
/// - `node1` selects [`NODE_MAC`] and boots Profile `p1`
/// - `orphan` selects `role=orphan` and points at a missing Profile
/// - `prose` selects `role=prose` and boots a Profile whose cloud template
///   renders plain text
pub fn create_test_store() -> MemoryStore {
    MemoryStore::new()
        .with_group(
            Group::new("node1", "p1")
                .with_selector("mac", NODE_MAC)
                .with_metadata("hostname", "node1.example.com")
                .with_metadata("network", serde_json::json!({"gateway": "10.0.0.1"})),
        )
        .with_group(Group::new("orphan", "missing").with_selector("role", "orphan"))
        .with_group(Group::new("prose", "prose").with_selector("role", "prose"))
        .with_profile(
            Profile::new("p1")
                .with_name("Node")
                .with_boot(
                    BootSpec::new("/assets/vmlinuz")
                        .with_initrd("/assets/initrd.img")
                        .with_arg("console=ttyS0"),
                )
                .with_cloud("node.yaml")
                .with_ignition("node.ign"),
        )
        .with_profile(Profile::new("prose").with_cloud("prose.txt"))
        .with_cloud_config("node.yaml", CLOUD_TEMPLATE)
        .with_cloud_config("prose.txt", "Dear machine, please boot.\n")
        .with_ignition("node.ign", IGNITION_TEMPLATE)
}

/// Deterministic signer for signed route tests
pub fn test_signer() -> Arc<Ed25519Signer> {
    Arc::new(Ed25519Signer::from_seed([7; 32]))
}

/// Router over the shared store with both signers configured
pub fn create_test_router() -> Router {
    let signer = test_signer();
    let config = Config::new(Arc::new(create_test_store()))
        .with_signer(signer.clone())
        .with_armored_signer(Arc::new(ArmoredSigner::new(signer)) as Arc<dyn Signer>);
    Server::new(config).router()
}

/// Response status, content type and body
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

    TestResponse {
        status,
        content_type,
        body,
    }
}

//! Store contract tests
//!
//! Every Store implementation is loaded with the same resources and must
//! answer the same way.

use super::*;
use netboot_crd::BootSpec;
use std::fs;
use tempfile::TempDir;

fn fixture_groups() -> Vec<Group> {
    vec![
        Group::new("default", "base"),
        Group::new("workers", "worker").with_selector("role", "worker"),
        Group::new("node1", "worker")
            .with_selector("role", "worker")
            .with_selector("mac", "52:54:00:A1:9C:AE")
            .with_metadata("etcd_name", "node1"),
    ]
}

fn fixture_profile() -> Profile {
    Profile::new("worker")
        .with_name("Worker")
        .with_boot(BootSpec::new("/assets/vmlinuz").with_initrd("/assets/initrd.img"))
        .with_ignition("worker.ign")
}

const IGNITION: &str = r#"{"ignition":{"version":"3.0.0"}}"#;

fn write(root: &std::path::Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Both backends holding the fixture resources
fn create_test_stores() -> (TempDir, Vec<(&'static str, Arc<dyn Store>)>) {
    let mut memory = MemoryStore::new()
        .with_profile(fixture_profile())
        .with_ignition("worker.ign", IGNITION)
        .with_template("custom.ipxe", "#!ipxe\nboot\n")
        .with_cloud_config("worker.yaml", "#cloud-config\n");
    for group in fixture_groups() {
        memory = memory.with_group(group);
    }

    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    for group in fixture_groups() {
        write(
            tmp.path(),
            &format!("groups/{}.json", group.id),
            &serde_json::to_string(&group).unwrap(),
        );
    }
    write(
        tmp.path(),
        "profiles/worker.json",
        &serde_json::to_string(&fixture_profile()).unwrap(),
    );
    write(tmp.path(), "ignition/worker.ign", IGNITION);
    write(tmp.path(), "templates/custom.ipxe", "#!ipxe\nboot\n");
    write(tmp.path(), "cloud/worker.yaml", "#cloud-config\n");
    write(tmp.path(), "groups/README.md", "not a group");

    let stores: Vec<(&'static str, Arc<dyn Store>)> = vec![
        ("memory", Arc::new(memory)),
        ("file", Arc::new(FileStore::new(tmp.path()))),
    ];
    (tmp, stores)
}

#[tokio::test]
async fn test_list_groups_most_specific_first() {
    let (_tmp, stores) = create_test_stores();
    for (name, store) in stores {
        let groups = store.list_groups().await.unwrap();
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["node1", "workers", "default"], "{}: match order", name);
    }
}

#[tokio::test]
async fn test_list_groups_normalizes_mac_selectors() {
    let (_tmp, stores) = create_test_stores();
    for (name, store) in stores {
        let groups = store.list_groups().await.unwrap();
        assert_eq!(
            groups[0].selector.get("mac").map(String::as_str),
            Some("52:54:00:a1:9c:ae"),
            "{}: mac selector",
            name
        );
    }
}

#[tokio::test]
async fn test_get_profile() {
    let (_tmp, stores) = create_test_stores();
    for (name, store) in stores {
        let profile = store.get_profile("worker").await.unwrap();
        assert_eq!(profile, Some(fixture_profile()), "{}: profile", name);
        assert!(store.get_profile("missing").await.unwrap().is_none(), "{}", name);
    }
}

#[tokio::test]
async fn test_get_templates() {
    let (_tmp, stores) = create_test_stores();
    for (name, store) in stores {
        assert_eq!(
            store.get_ignition("worker.ign").await.unwrap().as_deref(),
            Some(IGNITION),
            "{}: ignition",
            name
        );
        assert_eq!(
            store.get_template("custom.ipxe").await.unwrap().as_deref(),
            Some("#!ipxe\nboot\n"),
            "{}: template",
            name
        );
        assert_eq!(
            store.get_cloud_config("worker.yaml").await.unwrap().as_deref(),
            Some("#cloud-config\n"),
            "{}: cloud",
            name
        );
        assert!(store.get_cloud_config("other.yaml").await.unwrap().is_none(), "{}", name);
    }
}

#[tokio::test]
async fn test_file_store_rejects_path_traversal() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileStore::new(tmp.path());

    for id in ["../secret", "a/b", "..", ""] {
        assert!(
            matches!(store.get_ignition(id).await, Err(StoreError::InvalidData(_))),
            "id {:?} should be rejected",
            id
        );
    }
}

#[tokio::test]
async fn test_file_store_empty_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileStore::new(tmp.path());
    assert!(store.list_groups().await.unwrap().is_empty());
    assert!(store.get_profile("worker").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_reads_edits_without_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileStore::new(tmp.path());
    assert!(store.get_cloud_config("c").await.unwrap().is_none());

    write(tmp.path(), "cloud/c", "#cloud-config\nhostname: a\n");
    assert_eq!(
        store.get_cloud_config("c").await.unwrap().as_deref(),
        Some("#cloud-config\nhostname: a\n")
    );
}

#[tokio::test]
async fn test_file_store_invalid_group_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "groups/bad.json", r#"{"id": "bad"}"#);
    let store = FileStore::new(tmp.path());
    assert!(matches!(
        store.list_groups().await,
        Err(StoreError::Serialization(_))
    ));

    write(tmp.path(), "groups/bad.json", r#"{"id": "bad", "profile": ""}"#);
    assert!(matches!(
        store.list_groups().await,
        Err(StoreError::InvalidData(_))
    ));
}

#[tokio::test]
async fn test_file_store_duplicate_group_id_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "groups/a.json", r#"{"id": "dup", "profile": "p-a", "selector": {"role": "w"}}"#);
    write(tmp.path(), "groups/b.json", r#"{"id": "dup", "profile": "p-b", "selector": {"role": "w"}}"#);
    let store = FileStore::new(tmp.path());

    match store.list_groups().await {
        Err(StoreError::InvalidData(message)) => assert!(message.contains("duplicate group id dup")),
        other => panic!("expected duplicate id error, got {:?}", other),
    }

    fs::remove_file(tmp.path().join("groups/b.json")).unwrap();
    let groups = store.list_groups().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].profile, "p-a");
}

#[tokio::test]
async fn test_create_store() {
    let store = create_store(&StoreConfig::Memory);
    assert!(store.list_groups().await.unwrap().is_empty());

    let tmp = tempfile::tempdir().unwrap();
    let store = create_store(&StoreConfig::File {
        path: tmp.path().to_path_buf(),
    });
    assert!(store.list_groups().await.unwrap().is_empty());
}

use std::fs;
use std::sync::Arc;
use std::thread;

use reauth_core::{CredentialPair, CredentialStore, StoreError};
use reauth_file::FileStore;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> FileStore {
    FileStore::new(dir.path().join("nested").join("credentials.json"))
}

#[test]
fn empty_store_has_no_credentials() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(store.get().unwrap().is_none());
    // Reading does not create anything.
    assert!(!dir.path().join("nested").exists());
}

#[test]
fn set_then_get_returns_the_pair() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let pair = CredentialPair::new("access-1", "refresh-1");

    store.set(&pair).unwrap();

    assert_eq!(store.get().unwrap(), Some(pair));
    let raw: serde_json::Value =
        serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
    assert_eq!(raw["access_token"], "access-1");
    assert_eq!(raw["refresh_token"], "refresh-1");
}

#[test]
fn set_replaces_both_tokens() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.set(&CredentialPair::new("a1", "r1")).unwrap();
    store.set(&CredentialPair::new("a2", "r2")).unwrap();

    assert_eq!(store.get().unwrap(), Some(CredentialPair::new("a2", "r2")));
    assert!(!store.path().with_extension("tmp").exists());
}

#[test]
fn clear_removes_credentials_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.set(&CredentialPair::new("a1", "r1")).unwrap();

    store.clear().unwrap();
    assert!(store.get().unwrap().is_none());
    assert!(!store.path().exists());

    store.clear().unwrap();
}

#[test]
fn credentials_survive_a_new_instance() {
    let dir = TempDir::new().unwrap();
    store_in(&dir)
        .set(&CredentialPair::new("a1", "r1"))
        .unwrap();

    let reopened = store_in(&dir);
    assert_eq!(reopened.get().unwrap(), Some(CredentialPair::new("a1", "r1")));
}

#[test]
fn corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("credentials.json"));
    fs::write(store.path(), "{not json").unwrap();

    assert!(matches!(store.get(), Err(StoreError::Corrupt { .. })));

    // Clearing recovers from corruption.
    store.clear().unwrap();
    assert!(store.get().unwrap().is_none());
}

#[test]
fn concurrent_writers_never_expose_a_mixed_pair() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(store_in(&dir));
    store.set(&CredentialPair::new("access-0", "refresh-0")).unwrap();

    let writers: Vec<_> = (1..=4)
        .map(|w| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    let n = w * 100 + i;
                    store
                        .set(&CredentialPair::new(format!("access-{n}"), format!("refresh-{n}")))
                        .unwrap();
                }
            })
        })
        .collect();

    for _ in 0..200 {
        let pair = store.get().unwrap().unwrap();
        let access = pair.access.as_str().trim_start_matches("access-");
        let refresh = pair.refresh.as_str().trim_start_matches("refresh-");
        assert_eq!(access, refresh);
    }
    for writer in writers {
        writer.join().unwrap();
    }
}

#[cfg(unix)]
#[test]
fn credentials_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.set(&CredentialPair::new("a1", "r1")).unwrap();

    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

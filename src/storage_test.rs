use super::*;

// =============================================================================
// StorageKeys
// =============================================================================

#[test]
fn default_keys_use_config_defaults() {
    let keys = StorageKeys::default();
    assert_eq!(keys.token_key, "token");
    assert_eq!(keys.session_scope_prefix, "session:");
}

#[test]
fn session_scoped_key_lands_in_namespace() {
    let keys = StorageKeys::default();
    let key = keys.session_scoped_key("u42", "chat_history");
    assert_eq!(key, "session:u42:chat_history");
    assert!(keys.is_session_scoped(&key));
}

#[test]
fn token_key_is_not_session_scoped() {
    let keys = StorageKeys::default();
    assert!(!keys.is_session_scoped("token"));
    assert!(!keys.is_session_scoped("theme"));
}

#[test]
fn empty_prefix_scopes_nothing() {
    let keys = StorageKeys { token_key: "token".into(), session_scope_prefix: String::new() };
    assert!(!keys.is_session_scoped("anything"));
}

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_storage_set_get_remove() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("k").unwrap(), None);

    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

    storage.remove("k").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
}

#[test]
fn memory_storage_remove_missing_is_ok() {
    let storage = MemoryStorage::new();
    assert!(storage.remove("missing").is_ok());
}

#[test]
fn memory_storage_clones_share_entries() {
    let storage = MemoryStorage::new();
    let observer = storage.clone();
    storage.set("token", "abc").unwrap();
    assert!(observer.contains("token"));
    assert_eq!(observer.len(), 1);
}

#[test]
fn memory_storage_lists_keys_sorted() {
    let storage = MemoryStorage::with_entries([("b", "2"), ("a", "1"), ("c", "3")]);
    assert_eq!(storage.list_keys().unwrap(), vec!["a", "b", "c"]);
}

use prdapp::error::PrdError;
use prdapp::store::{entry_bytes, DocumentStore, FsBackend, StorageBackend};
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().join("data"));
    (dir, backend)
}

#[test]
fn test_fs_backend_basic_io() {
    let (_dir, backend) = setup();

    // Missing keys read as None, even before the directory exists
    assert_eq!(backend.get("prd-documents").unwrap(), None);
    assert!(backend.keys().unwrap().is_empty());

    backend.set("prd-documents", "{}").unwrap();
    assert_eq!(backend.get("prd-documents").unwrap(), Some("{}".to_string()));

    backend.remove("prd-documents").unwrap();
    assert_eq!(backend.get("prd-documents").unwrap(), None);

    // Removing again is not an error
    backend.remove("prd-documents").unwrap();
}

#[test]
fn test_fs_backend_atomic_write_artifacts() {
    let (_dir, backend) = setup();

    backend.set("prd-current-document", "doc_1").unwrap();
    backend.set("prd-current-document", "doc_2").unwrap();

    let path = backend.root().join("prd-current-document");
    assert_eq!(fs::read_to_string(&path).unwrap(), "doc_2");

    for entry in fs::read_dir(backend.root()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_fs_backend_keys_skip_dotfiles_and_dirs() {
    let (_dir, backend) = setup();
    backend.set("prd-preferences", "{}").unwrap();
    backend.set("other-app", "x").unwrap();

    fs::write(backend.root().join(".hidden"), "x").unwrap();
    fs::create_dir(backend.root().join("nested")).unwrap();

    let mut keys = backend.keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["other-app", "prd-preferences"]);
}

#[test]
fn test_fs_backend_ignores_foreign_files() {
    let (_dir, backend) = setup();
    backend.set("prd-preferences", "{}").unwrap();
    fs::write(backend.root().join("notes for later.txt"), "x").unwrap();

    assert_eq!(backend.keys().unwrap(), vec!["prd-preferences"]);
    backend.set("prd-documents", "{}").unwrap();

    let store = DocumentStore::with_backend(backend);
    let mut doc = store.create_document(Some("Still saves"));
    store.save_document(&mut doc).unwrap();
    assert_eq!(store.get_documents().len(), 1);
}

#[test]
fn test_fs_backend_rejects_path_like_keys() {
    let (_dir, backend) = setup();
    for key in ["", "../escape", "a/b", ".dot"] {
        assert!(
            matches!(backend.set(key, "x"), Err(PrdError::Store(_))),
            "key {:?} should be rejected",
            key
        );
    }
}

#[test]
fn test_fs_backend_enforces_capacity() {
    let dir = TempDir::new().unwrap();
    let limit = entry_bytes("prd-documents", "0123456789");
    let backend = FsBackend::new(dir.path().to_path_buf()).with_capacity(limit);

    backend.set("prd-documents", "0123456789").unwrap();

    // Overwriting the same key only counts the new value
    backend.set("prd-documents", "abcdefghij").unwrap();

    let err = backend.set("prd-documents", "abcdefghijk").unwrap_err();
    assert!(err.is_storage_full());

    // The failed write left the previous value in place
    assert_eq!(
        backend.get("prd-documents").unwrap(),
        Some("abcdefghij".to_string())
    );
    assert!(matches!(
        backend.set("prd-preferences", "{}"),
        Err(PrdError::QuotaExceeded { .. })
    ));
}

//! Filesystem-backed embedding store: one JSON file per book identity.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use super::{CachedBook, EmbeddingStore};
use crate::error::Result;

/// Stores each book's cache entry as `<root>/<book_id>.json`.
///
/// Writes land in a temporary sibling file first and are moved into place
/// with a rename, so a reader never observes a torn entry. Each write
/// gets its own temporary file, so concurrent writers for the same book
/// id cannot truncate each other mid-write; the rename that lands last
/// wins with a complete entry.
pub struct FsStore {
    root: PathBuf,
}

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, book_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(book_id)))
    }

    /// A temporary path unique to this write, never shared across
    /// concurrent writers of the same key.
    fn temp_path(&self, book_id: &str) -> PathBuf {
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            ".{}.{}.{}.tmp",
            sanitize_key(book_id),
            std::process::id(),
            seq
        ))
    }
}

/// Normalize a book identity into a safe file name.
fn sanitize_key(book_id: &str) -> String {
    let sanitized: String = book_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

#[async_trait]
impl EmbeddingStore for FsStore {
    async fn put(&self, entry: &CachedBook) -> Result<()> {
        fs::create_dir_all(&self.root).await?;

        let path = self.entry_path(&entry.book_id);
        let tmp = self.temp_path(&entry.book_id);

        let payload = serde_json::to_vec(entry)?;
        if let Err(err) = fs::write(&tmp, &payload).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, book_id: &str) -> Result<Option<CachedBook>> {
        let path = self.entry_path(book_id);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::entry_fixture;
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        assert!(store.get("84").await.unwrap().is_none());

        let entry = entry_fixture("84", &["It was a dark and stormy night.", "Then it wasn't."]);
        store.put(&entry).await.unwrap();

        let loaded = store.get("84").await.unwrap().unwrap();
        assert_eq!(loaded.book_id, "84");
        assert_eq!(loaded.records, entry.records);
        assert_eq!(loaded.records[0].chunk_index, 0);
        assert_eq!(loaded.records[1].chunk_index, 1);
    }

    #[tokio::test]
    async fn test_fs_store_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        store
            .put(&entry_fixture("84", &["old a", "old b", "old c"]))
            .await
            .unwrap();
        store.put(&entry_fixture("84", &["replacement"])).await.unwrap();

        let loaded = store.get("84").await.unwrap().unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].text, "replacement");
    }

    #[tokio::test]
    async fn test_fs_store_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        store.put(&entry_fixture("84", &["a chunk"])).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["84.json".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_writers_never_leave_a_torn_entry() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FsStore::new(dir.path()));

        // Many overlapping writes to one key: the surviving entry must be
        // one complete payload, not a mix, and every read must parse.
        let first = entry_fixture("84", &["a".repeat(2000).as_str(), "alpha"]);
        let second = entry_fixture("84", &["b".repeat(2000).as_str()]);

        for _ in 0..20 {
            let (a, b) = tokio::join!(store.put(&first), store.put(&second));
            a.unwrap();
            b.unwrap();

            let loaded = store.get("84").await.unwrap().unwrap();
            assert!(
                loaded.records == first.records || loaded.records == second.records,
                "entry was neither writer's complete record set"
            );
        }

        let stray: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(stray.is_empty(), "leftover temp files: {:?}", stray);
    }

    #[test]
    fn test_writers_use_distinct_temp_paths() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        assert_ne!(store.temp_path("84"), store.temp_path("84"));
    }

    #[tokio::test]
    async fn test_sanitized_keys() {
        assert_eq!(sanitize_key("pg/1342"), "pg_1342");
        assert_eq!(sanitize_key("simple-id_1.2"), "simple-id_1.2");
        assert_eq!(sanitize_key(""), "_");

        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        store.put(&entry_fixture("pg/1342", &["text"])).await.unwrap();
        assert!(store.get("pg/1342").await.unwrap().is_some());
    }
}

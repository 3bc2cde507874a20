//! Build directory walking and upload sequencing

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::content_type::{SNIFF_LEN, from_extension, resolve_content_type};
use crate::error::{Error, Result};
use crate::traits::{ObjectStore, UploadProgress};

/// Cache directive for the SPA entry point
pub const NO_CACHE: &str = "no-cache,no-store,must-revalidate";

/// Cache directive for every other object
pub const LONG_CACHE: &str = "max-age=31536000,public,immutable";

/// Object key that must never be served stale
pub const ENTRY_POINT_KEY: &str = "index.html";

/// One file scheduled for upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadItem {
    /// Object key, relative to the build directory, `/`-separated
    pub key: String,
    #[serde(skip)]
    pub source: PathBuf,
    pub content_type: String,
    pub cache_control: String,
    pub size: u64,
}

/// Cache-Control value for an object key
pub fn cache_control_for(key: &str) -> &'static str {
    if key == ENTRY_POINT_KEY {
        NO_CACHE
    } else {
        LONG_CACHE
    }
}

/// Collect every regular file under `root`, in lexical walk order
pub fn collect_upload_items(root: &Path) -> Result<Vec<UploadItem>> {
    let mut items = Vec::new();
    walk(root, root, &mut items)?;
    Ok(items)
}

fn walk(dir: &Path, root: &Path, items: &mut Vec<UploadItem>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk(&path, root, items)?;
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            items.push(upload_item(&path, root)?);
        }
    }
    Ok(())
}

fn upload_item(path: &Path, root: &Path) -> Result<UploadItem> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| Error::General(format!("{}: {e}", path.display())))?;
    let key = object_key(relative);
    let size = fs::metadata(path)?.len();

    let content_type = match from_extension(path) {
        Some(ct) => ct,
        None => resolve_content_type(path, &read_leading(path)?),
    };

    Ok(UploadItem {
        cache_control: cache_control_for(&key).to_string(),
        key,
        source: path.to_path_buf(),
        content_type,
        size,
    })
}

/// Join path components with `/` regardless of platform separator
pub fn object_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_leading(path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(SNIFF_LEN);
    fs::File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut buf)?;
    Ok(buf)
}

/// Upload `items` in order, stopping at the first failure
pub async fn upload_all<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    items: &[UploadItem],
    progress: &dyn UploadProgress,
) -> Result<usize> {
    progress.begin(items.len());

    for item in items {
        tracing::debug!(
            key = %item.key,
            content_type = %item.content_type,
            cache_control = %item.cache_control,
            "Uploading"
        );
        store.upload(bucket, item).await?;
        progress.uploaded(item);
    }

    progress.finish();
    Ok(items.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeStore, RecordingProgress};
    use tempfile::TempDir;

    fn build_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("index.html"), "<!doctype html><html></html>").unwrap();
        fs::write(root.join("app.js"), "console.log(1)").unwrap();
        fs::create_dir_all(root.join("assets").join("img")).unwrap();
        fs::write(root.join("assets").join("style.css"), "body{}").unwrap();
        fs::write(root.join("assets").join("img").join("blob.bin2"), [1u8, 2, 3]).unwrap();
        fs::write(root.join("assets").join("index.html"), "<p>nested</p>").unwrap();
        dir
    }

    #[test]
    fn test_collect_keys_in_walk_order() {
        let dir = build_dir();
        let items = collect_upload_items(dir.path()).unwrap();
        let keys: Vec<&str> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "app.js",
                "assets/img/blob.bin2",
                "assets/index.html",
                "assets/style.css",
                "index.html",
            ]
        );
    }

    #[test]
    fn test_only_root_index_is_uncached() {
        let dir = build_dir();
        let items = collect_upload_items(dir.path()).unwrap();

        let uncached: Vec<&str> = items
            .iter()
            .filter(|i| i.cache_control == NO_CACHE)
            .map(|i| i.key.as_str())
            .collect();
        assert_eq!(uncached, vec!["index.html"]);
        assert!(
            items
                .iter()
                .filter(|i| i.key != "index.html")
                .all(|i| i.cache_control == LONG_CACHE)
        );
    }

    #[test]
    fn test_content_types_and_sizes() {
        let dir = build_dir();
        let items = collect_upload_items(dir.path()).unwrap();
        let find = |key: &str| items.iter().find(|i| i.key == key).unwrap();

        assert_eq!(find("app.js").content_type, "application/javascript");
        assert_eq!(find("assets/style.css").content_type, "text/css");
        assert_eq!(find("assets/img/blob.bin2").content_type, "application/octet-stream");
        assert_eq!(find("assets/img/blob.bin2").size, 3);
    }

    #[test]
    fn test_object_key_normalizes_separators() {
        let relative: PathBuf = ["a", "b", "c.js"].iter().collect();
        assert_eq!(object_key(&relative), "a/b/c.js");
    }

    #[tokio::test]
    async fn test_upload_all_reports_progress() {
        let dir = build_dir();
        let items = collect_upload_items(dir.path()).unwrap();
        let store = FakeStore::new();
        let progress = RecordingProgress::default();

        let count = upload_all(&store, "site", &items, &progress).await.unwrap();
        assert_eq!(count, 5);
        assert_eq!(store.uploaded_keys().len(), 5);
        assert_eq!(progress.events(), vec![
            "begin 5".to_string(),
            "uploaded app.js".to_string(),
            "uploaded assets/img/blob.bin2".to_string(),
            "uploaded assets/index.html".to_string(),
            "uploaded assets/style.css".to_string(),
            "uploaded index.html".to_string(),
            "finish".to_string(),
        ]);
    }

    #[tokio::test]
    async fn test_upload_all_stops_at_first_failure() {
        let dir = build_dir();
        let items = collect_upload_items(dir.path()).unwrap();
        let store = FakeStore::new().fail_upload("assets/index.html");
        let progress = RecordingProgress::default();

        let err = upload_all(&store, "site", &items, &progress).await.unwrap_err();
        assert!(matches!(err, Error::Upload { ref key, .. } if key == "assets/index.html"));
        assert_eq!(
            store.uploaded_keys(),
            vec!["app.js".to_string(), "assets/img/blob.bin2".to_string()]
        );
    }
}

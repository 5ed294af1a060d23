//! Image attachment lifecycle, decoupled from record persistence.
//!
//! Files for one stock record live under a directory named by its business
//! code: `<public_dir>/uploads/<code>/<millis>-<original name>`. Every
//! operation reports a `Result`; callers decide whether a failure is fatal
//! (create) or merely logged (best-effort cleanup on update/delete).

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{StoreError, StoreResult};

/// One uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    public_dir: PathBuf,
    base_url: String,
}

impl AttachmentStore {
    pub fn new(public_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            public_dir: public_dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join("uploads")
    }

    /// Store uploaded files under the per-code directory (created lazily)
    /// and return their public URLs in upload order.
    pub async fn store(&self, code: &str, files: &[UploadedFile]) -> StoreResult<Vec<String>> {
        let code = sanitize_component(code);
        let dir = self.uploads_dir().join(&code);
        tokio::fs::create_dir_all(&dir).await?;

        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            let stored_name = format!(
                "{}-{}",
                Utc::now().timestamp_millis(),
                sanitize_component(&file.filename)
            );
            tokio::fs::write(dir.join(&stored_name), &file.bytes).await?;
            urls.push(format!(
                "{}/public/uploads/{}/{}",
                self.base_url, code, stored_name
            ));
        }
        Ok(urls)
    }

    /// Delete the files behind the given URLs.
    ///
    /// All paths are attempted; the first failure is reported after the
    /// sweep so one unreadable file does not leave later ones behind.
    pub async fn remove_files(&self, urls: &[String]) -> StoreResult<()> {
        let mut first_err: Option<std::io::Error> = None;
        for url in urls {
            let Some(path) = self.path_for_url(url) else {
                tracing::warn!(url, "attachment url does not map into the uploads tree");
                continue;
            };
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(StoreError::Attachment(e)),
            None => Ok(()),
        }
    }

    /// Remove the whole per-code directory derived from one of its file
    /// URLs (used when the owning record is deleted).
    pub async fn remove_dir_for(&self, url: &str) -> StoreResult<()> {
        let path = self
            .path_for_url(url)
            .ok_or_else(|| bad_url(url))?;
        let dir = path
            .parent()
            .ok_or_else(|| bad_url(url))?;
        // Refuse to delete anything at or above the uploads root.
        if dir == self.uploads_dir() || !dir.starts_with(self.uploads_dir()) {
            return Err(bad_url(url));
        }
        tokio::fs::remove_dir_all(dir).await?;
        Ok(())
    }

    /// Map a public URL back to its on-disk path. Returns `None` for URLs
    /// outside the uploads tree or containing traversal components.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let rest = url.split("/public/").nth(1)?;
        if !rest.starts_with("uploads/") {
            return None;
        }
        let path = Path::new(rest);
        if path
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return None;
        }
        Some(self.public_dir.join(path))
    }
}

fn bad_url(url: &str) -> StoreError {
    StoreError::Attachment(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("url does not map into the uploads tree: {url}"),
    ))
}

/// Keep only the final path component and replace separators, so client
/// supplied names cannot escape the per-code directory.
fn sanitize_component(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> (AttachmentStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("depot-attach-{}", Uuid::now_v7()));
        (
            AttachmentStore::new(&dir, "http://127.0.0.1:3000"),
            dir,
        )
    }

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn store_creates_per_code_dir_and_preserves_order() {
        let (store, root) = temp_store();
        let urls = store
            .store("SKU1", &[file("a.png"), file("b.png")])
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|u| u.contains("/uploads/SKU1/")));
        assert!(urls[0].ends_with("-a.png"));
        assert!(urls[1].ends_with("-b.png"));
        for url in &urls {
            assert!(store.path_for_url(url).unwrap().is_file());
        }

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn remove_files_then_dir() {
        let (store, root) = temp_store();
        let urls = store.store("SKU2", &[file("a.png")]).await.unwrap();

        store.remove_files(&urls).await.unwrap();
        assert!(!store.path_for_url(&urls[0]).unwrap().exists());

        // Directory itself is still there until the record is deleted.
        let dir = store.path_for_url(&urls[0]).unwrap();
        assert!(dir.parent().unwrap().is_dir());

        let urls = store.store("SKU2", &[file("b.png")]).await.unwrap();
        store.remove_dir_for(&urls[0]).await.unwrap();
        assert!(!store.path_for_url(&urls[0]).unwrap().parent().unwrap().exists());

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn remove_files_reports_missing_file() {
        let (store, _root) = temp_store();
        let urls = vec!["http://127.0.0.1:3000/public/uploads/SKU3/1-a.png".to_string()];
        assert!(store.remove_files(&urls).await.is_err());
    }

    #[test]
    fn path_for_url_rejects_traversal() {
        let (store, _root) = temp_store();
        assert!(store
            .path_for_url("http://x/public/uploads/../outside.png")
            .is_none());
        assert!(store.path_for_url("http://x/other/uploads/a.png").is_none());
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_component("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_component("c:\\tmp\\x.png"), "x.png");
        assert_eq!(sanitize_component(""), "file");
    }
}

//! On-disk attachment storage.
//!
//! Files live under `<root>/<ticket_id>/<uuid>-<sanitized name>`; the
//! database keeps only the path relative to `root`.

use std::io;
use std::path::{Component, Path, PathBuf};

use mesa_core::attachment::sanitize_filename;
use mesa_core::types::DbId;

pub struct AttachmentStorage {
    root: PathBuf,
}

impl AttachmentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Whether the root directory exists and is a directory.
    pub async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Fresh relative path for a new upload to `ticket_id`.
    pub fn new_relative_path(ticket_id: DbId, original_name: &str) -> String {
        format!(
            "{ticket_id}/{}-{}",
            uuid::Uuid::new_v4(),
            sanitize_filename(original_name)
        )
    }

    /// Resolve a stored relative path, refusing anything that would escape
    /// the storage root.
    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let rel = Path::new(relative);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative.is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage path '{relative}'"),
            ));
        }
        Ok(self.root.join(rel))
    }

    pub async fn save(&self, relative: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await
    }

    pub async fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(relative)?).await
    }

    /// Delete one stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.resolve(relative)?).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Delete a ticket's directory if it is empty.
    pub async fn remove_ticket_dir(&self, ticket_id: DbId) -> io::Result<()> {
        match tokio::fs::remove_dir(self.root.join(ticket_id.to_string())).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_scoped_to_ticket() {
        let path = AttachmentStorage::new_relative_path(42, "../../etc/passwd");
        assert!(path.starts_with("42/"));
        assert!(path.ends_with("-passwd"));
        assert!(!path.contains(".."));
    }

    #[test]
    fn resolve_rejects_escapes() {
        let storage = AttachmentStorage::new("/srv/attachments");
        assert!(storage.resolve("../secret").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("").is_err());
        assert_eq!(
            storage.resolve("3/a-b.png").unwrap(),
            PathBuf::from("/srv/attachments/3/a-b.png")
        );
    }

    #[tokio::test]
    async fn save_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AttachmentStorage::new(dir.path());

        storage.save("9/x-note.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(storage.read("9/x-note.pdf").await.unwrap(), b"%PDF-1.4");

        storage.remove("9/x-note.pdf").await.unwrap();
        storage.remove("9/x-note.pdf").await.unwrap();
        assert!(storage.read("9/x-note.pdf").await.is_err());

        storage.remove_ticket_dir(9).await.unwrap();
        assert!(!dir.path().join("9").exists());
    }
}

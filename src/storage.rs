//! Filesystem store for entity attachments.
//!
//! Every file lives under `{root}/{scope}/{entity uuid}/{filename}`, where
//! the scope names the owning table (`articles`, `pallet_types`, ...). The
//! stored filename is kept on the owning row; the row UUID keeps uploads
//! from different entities apart.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Attachment scopes, one per owning table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentScope {
    ArticleLineLayout,
    InstructionDocument,
    PalletTechnicalSheet,
}

impl AttachmentScope {
    fn dir_name(&self) -> &'static str {
        match self {
            AttachmentScope::ArticleLineLayout => "articles",
            AttachmentScope::InstructionDocument => "article_instructions",
            AttachmentScope::PalletTechnicalSheet => "pallet_types",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Strip any path components from a client-supplied filename.
    pub fn sanitize_filename(name: &str) -> Result<String, ServiceError> {
        let base = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::trim)
            .unwrap_or_default();

        if base.is_empty() || base == "." || base == ".." {
            return Err(ServiceError::InvalidInput(
                "Attachment filename is empty or invalid".to_string(),
            ));
        }

        Ok(base.to_string())
    }

    fn entity_dir(&self, scope: AttachmentScope, entity_id: Uuid) -> PathBuf {
        self.root.join(scope.dir_name()).join(entity_id.to_string())
    }

    /// Absolute path of a stored attachment.
    pub fn resolve(&self, scope: AttachmentScope, entity_id: Uuid, filename: &str) -> PathBuf {
        self.entity_dir(scope, entity_id).join(filename)
    }

    /// Persist uploaded bytes, returning the stored filename.
    #[instrument(skip(self, bytes), fields(scope = ?scope, entity_id = %entity_id))]
    pub async fn save(
        &self,
        scope: AttachmentScope,
        entity_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, ServiceError> {
        let name = Self::sanitize_filename(filename)?;
        let dir = self.entity_dir(scope, entity_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(&name);
        fs::write(&path, bytes).await?;

        debug!(path = %path.display(), size = bytes.len(), "Attachment stored");
        Ok(name)
    }

    /// Read a stored attachment back, or NotFound if it is missing.
    #[instrument(skip(self), fields(scope = ?scope, entity_id = %entity_id))]
    pub async fn read(
        &self,
        scope: AttachmentScope,
        entity_id: Uuid,
        filename: &str,
    ) -> Result<Vec<u8>, ServiceError> {
        let name = Self::sanitize_filename(filename)?;
        let path = self.resolve(scope, entity_id, &name);

        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ServiceError::NotFound(
                format!("Attachment {} not found", name),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Duplicate an attachment into another entity's scope, returning the
    /// stored filename. Used when cloning an article from an offer template.
    #[instrument(skip(self))]
    pub async fn copy(
        &self,
        from_scope: AttachmentScope,
        from_id: Uuid,
        to_scope: AttachmentScope,
        to_id: Uuid,
        filename: &str,
    ) -> Result<String, ServiceError> {
        let name = Self::sanitize_filename(filename)?;
        let source = self.resolve(from_scope, from_id, &name);

        if !fs::try_exists(&source).await? {
            return Err(ServiceError::NotFound(format!(
                "Attachment {} not found",
                name
            )));
        }

        let dest_dir = self.entity_dir(to_scope, to_id);
        fs::create_dir_all(&dest_dir).await?;
        fs::copy(&source, dest_dir.join(&name)).await?;

        Ok(name)
    }

    /// Remove a stored attachment; missing files are not an error.
    pub async fn remove(
        &self,
        scope: AttachmentScope,
        entity_id: Uuid,
        filename: &str,
    ) -> Result<(), ServiceError> {
        let name = Self::sanitize_filename(filename)?;
        let path = self.resolve(scope, entity_id, &name);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn store() -> (TempDir, AttachmentStore) {
        let dir = TempDir::new().unwrap();
        let store = AttachmentStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(
            AttachmentStore::sanitize_filename("../../etc/passwd").unwrap(),
            "passwd"
        );
        assert_eq!(
            AttachmentStore::sanitize_filename("layout.pdf").unwrap(),
            "layout.pdf"
        );
        assert!(AttachmentStore::sanitize_filename("").is_err());
        assert!(AttachmentStore::sanitize_filename("..").is_err());
    }

    #[tokio::test]
    async fn save_and_read_round_trip() {
        let (_dir, store) = store();
        let id = Uuid::new_v4();

        let stored = store
            .save(AttachmentScope::ArticleLineLayout, id, "layout.pdf", b"%PDF")
            .await
            .unwrap();
        assert_eq!(stored, "layout.pdf");

        let bytes = store
            .read(AttachmentScope::ArticleLineLayout, id, "layout.pdf")
            .await
            .unwrap();
        assert_eq!(bytes, b"%PDF");
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let (_dir, store) = store();
        let err = store
            .read(AttachmentScope::ArticleLineLayout, Uuid::new_v4(), "x.pdf")
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
    }

    #[tokio::test]
    async fn copy_duplicates_between_scopes() {
        let (_dir, store) = store();
        let source_id = Uuid::new_v4();
        let dest_id = Uuid::new_v4();

        store
            .save(
                AttachmentScope::ArticleLineLayout,
                source_id,
                "layout.pdf",
                b"drawing",
            )
            .await
            .unwrap();

        store
            .copy(
                AttachmentScope::ArticleLineLayout,
                source_id,
                AttachmentScope::ArticleLineLayout,
                dest_id,
                "layout.pdf",
            )
            .await
            .unwrap();

        let copied = store
            .read(AttachmentScope::ArticleLineLayout, dest_id, "layout.pdf")
            .await
            .unwrap();
        assert_eq!(copied, b"drawing");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (_dir, store) = store();
        let id = Uuid::new_v4();

        store
            .save(AttachmentScope::PalletTechnicalSheet, id, "sheet.pdf", b"s")
            .await
            .unwrap();
        store
            .remove(AttachmentScope::PalletTechnicalSheet, id, "sheet.pdf")
            .await
            .unwrap();
        store
            .remove(AttachmentScope::PalletTechnicalSheet, id, "sheet.pdf")
            .await
            .unwrap();
    }
}

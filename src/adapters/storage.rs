use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested/out"));

        let written = storage.write_file("leads.json", b"[]").await.unwrap();

        assert!(written.ends_with("leads.json"));
        let on_disk = std::fs::read(dir.path().join("nested/out/leads.json")).unwrap();
        assert_eq!(on_disk, b"[]");
    }

    #[tokio::test]
    async fn test_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("leads.csv", b"old").await.unwrap();
        let written = storage.write_file("leads.csv", b"new").await.unwrap();

        assert_eq!(std::fs::read(written).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_write_into_file_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blocker"), b"").unwrap();
        let storage = LocalStorage::new(dir.path().join("blocker"));

        let err = storage.write_file("leads.csv", b"x").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::LeadError::IoError(_)));
    }
}

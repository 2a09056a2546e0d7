use std::path::{Path, PathBuf};

use scap_relay_core::models::ScanReport;
use scap_relay_core::Config;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::location::{StorageLocation, StorageRoot};
use crate::{StorageError, StorageResult};

/// Filesystem persistence for report archives across the three tiers.
#[derive(Clone)]
pub struct StorageFS {
    primary_root: PathBuf,
    failed_root: PathBuf,
    spool_root: PathBuf,
}

/// A report waiting in the spool for out-of-band delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpooledEntry {
    pub common_name: String,
    pub policy_id: String,
    pub timestamp: String,
    pub digest: String,
}

impl StorageFS {
    pub fn new(
        primary_root: impl Into<PathBuf>,
        failed_root: impl Into<PathBuf>,
        spool_root: impl Into<PathBuf>,
    ) -> Self {
        StorageFS {
            primary_root: primary_root.into(),
            failed_root: failed_root.into(),
            spool_root: spool_root.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.reports_dir, &config.failed_dir, &config.spool_dir)
    }

    /// Write the raw bundle under the primary root, keyed by the assigned
    /// report id. The id must have been assigned by a successful forward.
    pub async fn store_archive(&self, report: &ScanReport) -> StorageResult<StorageLocation> {
        let id = report.report_id.as_deref().ok_or_else(|| {
            StorageError::StoreReport("report has no assigned id".to_string())
        })?;

        let location = StorageLocation::new(
            StorageRoot::Primary,
            &self.primary_root,
            &report.common_name,
            id,
            &report.timestamp().to_string(),
        )?;

        self.write_archive(&location, report)
            .await
            .map_err(|e| StorageError::StoreReport(e.to_string()))?;

        Ok(location)
    }

    /// Write the raw bundle under the failed root after a primary write
    /// failure, same key shape. Errors here propagate as-is; the caller
    /// decides what a secondary failure means.
    pub async fn store_failed(&self, report: &ScanReport) -> StorageResult<StorageLocation> {
        let id = report.report_id.as_deref().ok_or_else(|| {
            StorageError::StoreReport("report has no assigned id".to_string())
        })?;

        let location = StorageLocation::new(
            StorageRoot::Failed,
            &self.failed_root,
            &report.common_name,
            id,
            &report.timestamp().to_string(),
        )?;

        self.write_archive(&location, report)
            .await
            .map_err(|e| StorageError::StoreReport(e.to_string()))?;

        Ok(location)
    }

    /// Write the raw bundle under the spool root, keyed by the policy id
    /// since no report id exists yet.
    pub async fn store_spool(&self, report: &ScanReport) -> StorageResult<StorageLocation> {
        let location = StorageLocation::new(
            StorageRoot::Spool,
            &self.spool_root,
            &report.common_name,
            &report.policy_id,
            &report.timestamp().to_string(),
        )
        .map_err(|e| StorageError::StoreSpool(e.to_string()))?;

        self.write_archive(&location, report)
            .await
            .map_err(|e| StorageError::StoreSpool(e.to_string()))?;

        Ok(location)
    }

    async fn write_archive(
        &self,
        location: &StorageLocation,
        report: &ScanReport,
    ) -> StorageResult<()> {
        let path = location.artifact(report.digest())?;
        let size = report.bytes().len();

        fs::create_dir_all(location.dir()).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory {}: {}", location.dir().display(), e),
            ))
        })?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create file {}: {}", path.display(), e),
            ))
        })?;

        file.write_all(report.bytes()).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write file {}: {}", path.display(), e),
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to sync file {}: {}", path.display(), e),
            ))
        })?;

        tracing::info!(
            root = location.root().as_str(),
            path = %path.display(),
            digest = report.digest(),
            size_bytes = size,
            "Stored report archive"
        );

        Ok(())
    }

    fn primary_location(
        &self,
        common_name: &str,
        id: &str,
        date: &str,
    ) -> StorageResult<StorageLocation> {
        StorageLocation::new(StorageRoot::Primary, &self.primary_root, common_name, id, date)
    }

    /// Retrieve the raw archive bytes stored for the given digest.
    pub async fn get_arf_xml(
        &self,
        common_name: &str,
        id: &str,
        date: &str,
        digest: &str,
    ) -> StorageResult<Vec<u8>> {
        let location = self.primary_location(common_name, id, date)?;
        let path = location.artifact(digest)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::FileNotFound(format!(
                "no archive for digest {}",
                digest
            )));
        }

        let data = fs::read(&path).await?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            "Retrieved report archive"
        );

        Ok(data)
    }

    /// Derive an HTML view of the stored archive. Rendered lazily at
    /// retrieval time from the decoded report; the raw archive is the only
    /// at-rest artifact.
    pub async fn get_arf_html(
        &self,
        common_name: &str,
        id: &str,
        date: &str,
        digest: &str,
    ) -> StorageResult<String> {
        let data = self.get_arf_xml(common_name, id, date, digest).await?;

        scap_relay_arf::render_html(&data).map_err(|e| StorageError::Render(e.to_string()))
    }

    /// Remove every artifact under the resolved path. Removal of an
    /// already-absent artifact reports `FileNotFound`, never silent
    /// success.
    pub async fn delete_arf_file(
        &self,
        common_name: &str,
        id: &str,
        date: &str,
    ) -> StorageResult<()> {
        let location = self.primary_location(common_name, id, date)?;
        let dir = location.dir();

        if !fs::try_exists(dir).await.unwrap_or(false) {
            return Err(StorageError::FileNotFound(format!(
                "no artifacts under {}/{}/{}",
                common_name, id, date
            )));
        }

        fs::remove_dir_all(dir).await?;

        tracing::info!(path = %dir.display(), "Deleted report artifacts");

        Ok(())
    }

    /// Enumerate spooled reports in deterministic order.
    pub async fn list_spooled(&self) -> StorageResult<Vec<SpooledEntry>> {
        let mut entries = Vec::new();

        if !fs::try_exists(&self.spool_root).await.unwrap_or(false) {
            return Ok(entries);
        }

        let mut clients = read_subdirs(&self.spool_root).await?;
        clients.sort();
        for (common_name, client_dir) in clients {
            let mut policies = read_subdirs(&client_dir).await?;
            policies.sort();
            for (policy_id, policy_dir) in policies {
                let mut stamps = read_subdirs(&policy_dir).await?;
                stamps.sort();
                for (timestamp, stamp_dir) in stamps {
                    let mut digests = read_files(&stamp_dir).await?;
                    digests.sort();
                    for digest in digests {
                        entries.push(SpooledEntry {
                            common_name: common_name.clone(),
                            policy_id: policy_id.clone(),
                            timestamp: timestamp.clone(),
                            digest,
                        });
                    }
                }
            }
        }

        Ok(entries)
    }

    /// Read a spooled archive back for redelivery.
    pub async fn read_spooled(&self, entry: &SpooledEntry) -> StorageResult<Vec<u8>> {
        let location = StorageLocation::new(
            StorageRoot::Spool,
            &self.spool_root,
            &entry.common_name,
            &entry.policy_id,
            &entry.timestamp,
        )?;
        let path = location.artifact(&entry.digest)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::FileNotFound(format!(
                "no spooled archive for digest {}",
                entry.digest
            )));
        }

        Ok(fs::read(&path).await?)
    }

    /// Drop a spool entry after successful redelivery.
    pub async fn remove_spooled(&self, entry: &SpooledEntry) -> StorageResult<()> {
        let location = StorageLocation::new(
            StorageRoot::Spool,
            &self.spool_root,
            &entry.common_name,
            &entry.policy_id,
            &entry.timestamp,
        )?;
        let dir = location.dir();

        if !fs::try_exists(dir).await.unwrap_or(false) {
            return Err(StorageError::FileNotFound(format!(
                "no spooled artifacts under {}",
                dir.display()
            )));
        }

        fs::remove_dir_all(dir).await?;

        tracing::info!(path = %dir.display(), "Removed spooled report");

        Ok(())
    }
}

async fn read_subdirs(dir: &Path) -> StorageResult<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                out.push((name.to_string(), entry.path()));
            }
        }
    }
    Ok(out)
}

async fn read_files(dir: &Path) -> StorageResult<Vec<String>> {
    let mut out = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                out.push(name.to_string());
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tempfile::tempdir;

    fn test_storage(dir: &Path) -> StorageFS {
        StorageFS::new(dir.join("reports"), dir.join("failed"), dir.join("spool"))
    }

    fn forwarded_report(id: &str) -> ScanReport {
        let mut report = ScanReport::new(
            "client.example.com",
            "7",
            Bytes::from_static(b"<arf/>"),
        );
        report.assign_report_id(id);
        report
    }

    #[tokio::test]
    async fn test_store_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path());

        let report = forwarded_report("42");
        storage.store_archive(&report).await.unwrap();

        let data = storage
            .get_arf_xml(
                "client.example.com",
                "42",
                &report.timestamp().to_string(),
                report.digest(),
            )
            .await
            .unwrap();
        assert_eq!(data, b"<arf/>");
    }

    #[tokio::test]
    async fn test_get_after_delete_is_file_not_found() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path());

        let report = forwarded_report("42");
        storage.store_archive(&report).await.unwrap();
        let date = report.timestamp().to_string();

        storage
            .delete_arf_file("client.example.com", "42", &date)
            .await
            .unwrap();

        let result = storage
            .get_arf_xml("client.example.com", "42", &date, report.digest())
            .await;
        assert!(matches!(result, Err(StorageError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_absent_is_file_not_found() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path());

        let result = storage
            .delete_arf_file("client.example.com", "42", "1700000000")
            .await;
        assert!(matches!(result, Err(StorageError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_store_archive_requires_assigned_id() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path());

        let report = ScanReport::new("client.example.com", "7", Bytes::from_static(b"x"));
        let result = storage.store_archive(&report).await;
        assert!(matches!(result, Err(StorageError::StoreReport(_))));
    }

    #[tokio::test]
    async fn test_store_failed_lands_under_failed_root() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path());

        let report = forwarded_report("42");
        let location = storage.store_failed(&report).await.unwrap();

        assert!(location.dir().starts_with(dir.path().join("failed")));
        assert!(location.artifact(report.digest()).unwrap().exists());
        // Nothing under the primary root.
        assert!(!dir.path().join("reports").exists());
    }

    #[tokio::test]
    async fn test_spool_is_keyed_by_policy_id() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path());

        let report = ScanReport::new("client.example.com", "7", Bytes::from_static(b"x"));
        let location = storage.store_spool(&report).await.unwrap();

        assert!(location
            .dir()
            .starts_with(dir.path().join("spool").join("client.example.com").join("7")));
    }

    #[tokio::test]
    async fn test_spool_list_read_remove() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path());

        let report = ScanReport::new("client.example.com", "7", Bytes::from_static(b"spooled"));
        storage.store_spool(&report).await.unwrap();

        let entries = storage.list_spooled().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].common_name, "client.example.com");
        assert_eq!(entries[0].policy_id, "7");
        assert_eq!(entries[0].digest, report.digest());

        let data = storage.read_spooled(&entries[0]).await.unwrap();
        assert_eq!(data, b"spooled");

        storage.remove_spooled(&entries[0]).await.unwrap();
        assert!(storage.list_spooled().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_spooled_empty_when_root_missing() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path());
        assert!(storage.list_spooled().await.unwrap().is_empty());
    }
}

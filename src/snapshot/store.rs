use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use super::codec::SnapshotNode;
use crate::ext::BestEffortPathExt;

const ZSTD_EXTENSION: &str = "zst";
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    CompressedJson,
}

impl SnapshotFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ZSTD_EXTENSION) => SnapshotFormat::CompressedJson,
            _ => SnapshotFormat::Json,
        }
    }
}

/// Reads and writes snapshot files.
pub struct SnapshotStore;

impl SnapshotStore {
    pub async fn save(path: &Path, snapshot: &SnapshotNode) -> Result<(), SnapshotStoreError> {
        let format = SnapshotFormat::for_path(path);
        let bytes = Self::encode(snapshot, format)?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.context(WriteSnafu { path })?;
        }

        debug!(
            "Writing {} bytes of {:?} snapshot to {}",
            bytes.len(),
            format,
            path.best_effort_path_display()
        );
        fs::write(path, bytes).await.0.context(WriteSnafu { path })?;
        info!("Saved snapshot to {}", path.best_effort_path_display());
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<SnapshotNode, SnapshotStoreError> {
        debug!("Reading snapshot from {}", path.best_effort_path_display());
        let bytes = fs::read(path).await.context(ReadSnafu { path })?;
        let snapshot = Self::decode(&bytes, SnapshotFormat::for_path(path))?;
        info!("Loaded snapshot from {}", path.best_effort_path_display());
        Ok(snapshot)
    }

    fn encode(
        snapshot: &SnapshotNode,
        format: SnapshotFormat,
    ) -> Result<Vec<u8>, SnapshotStoreError> {
        let json = serde_json::to_vec_pretty(snapshot).context(EncodeSnafu)?;
        match format {
            SnapshotFormat::Json => Ok(json),
            SnapshotFormat::CompressedJson => {
                zstd::encode_all(json.as_slice(), ZSTD_LEVEL).context(CompressionSnafu)
            }
        }
    }

    fn decode(bytes: &[u8], format: SnapshotFormat) -> Result<SnapshotNode, SnapshotStoreError> {
        let json = match format {
            SnapshotFormat::Json => bytes.to_vec(),
            SnapshotFormat::CompressedJson => zstd::decode_all(bytes).context(CompressionSnafu)?,
        };
        serde_json::from_slice(&json).context(DecodeSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotStoreError {
    #[snafu(display("Failed to read snapshot {}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write snapshot {}", path.best_effort_path_display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to serialise snapshot"))]
    EncodeError { source: serde_json::Error },
    #[snafu(display("Snapshot is not valid JSON of the expected shape"))]
    DecodeError { source: serde_json::Error },
    #[snafu(display("Failed to (de)compress snapshot"))]
    CompressionError { source: std::io::Error },
}

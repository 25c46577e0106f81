use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use colonycore_base::{CoreError, CoreResult};

use crate::snapshot::Snapshot;

/// The recognized driver selector (§6). `sqlite` additionally consumes a path; `postgres` is
/// reserved and always resolves to `CoreError::Store` ("unavailable").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverConfig {
    Memory,
    Sqlite(PathBuf),
    Postgres,
}

impl DriverConfig {
    /// Parses the recognized selector. `sqlite` without a path is a validation error; unknown
    /// tokens are a validation error; `postgres` parses fine but fails later, at `open`, with
    /// the reserved "unavailable" error — parsing the token is not the same as attempting to
    /// use it.
    pub fn parse(raw: &str) -> CoreResult<DriverConfig> {
        let raw = raw.trim();
        match raw {
            "memory" => Ok(DriverConfig::Memory),
            "postgres" => Ok(DriverConfig::Postgres),
            _ if raw.starts_with("sqlite") => {
                let path = raw.strip_prefix("sqlite").unwrap_or("").trim_start_matches(':').trim();
                if path.is_empty() {
                    return Err(CoreError::validation("sqlite driver requires a non-empty path"));
                }
                Ok(DriverConfig::Sqlite(PathBuf::from(path)))
            }
            other => Err(CoreError::validation(format!("unrecognized store driver {other:?}"))),
        }
    }

    pub fn from_env(var: &str) -> CoreResult<DriverConfig> {
        match std::env::var(var) {
            Ok(raw) => DriverConfig::parse(&raw),
            Err(_) => Ok(DriverConfig::Memory),
        }
    }

    pub fn sqlite(path: impl Into<PathBuf>) -> CoreResult<DriverConfig> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(CoreError::validation("sqlite driver requires a non-empty path"));
        }
        Ok(DriverConfig::Sqlite(path))
    }
}

/// The persistence half of a driver. The in-memory variant's persist step is a no-op; the
/// file variant writes a single JSON document and fsyncs (§4.1: "a deliberate simplicity
/// trade that constrains throughput and keeps commits atomic at the file level").
pub(crate) enum Driver {
    Memory,
    Sqlite(PathBuf),
}

impl Driver {
    /// Opens the driver and loads whatever snapshot is already durable (empty for `memory`,
    /// or for a `sqlite` path that doesn't exist yet).
    pub(crate) fn open(config: DriverConfig) -> CoreResult<(Driver, Snapshot)> {
        match config {
            DriverConfig::Memory => Ok((Driver::Memory, Snapshot::default())),
            DriverConfig::Sqlite(path) => {
                let snapshot = if path.exists() {
                    let bytes = fs::read(&path).map_err(CoreError::store)?;
                    serde_json::from_slice(&bytes).map_err(CoreError::store)?
                } else {
                    Snapshot::default()
                };
                Ok((Driver::Sqlite(path), snapshot))
            }
            DriverConfig::Postgres => {
                Err(CoreError::store(std::io::Error::other("postgres driver is unavailable")))
            }
        }
    }

    /// Serializes the snapshot to a sibling temp file, fsyncs it, then renames it over the
    /// target. The rename is atomic on the same filesystem, so readers of the file never see
    /// a partial write; there is no incremental WAL.
    pub(crate) fn persist(&self, snapshot: &Snapshot) -> CoreResult<()> {
        match self {
            Driver::Memory => Ok(()),
            Driver::Sqlite(path) => persist_to_path(path, snapshot),
        }
    }
}

fn persist_to_path(path: &Path, snapshot: &Snapshot) -> CoreResult<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(CoreError::store)?;
    let bytes = serde_json::to_vec_pretty(snapshot).map_err(CoreError::store)?;
    tmp.write_all(&bytes).map_err(CoreError::store)?;
    tmp.as_file().sync_all().map_err(CoreError::store)?;
    tmp.persist(path).map_err(|e| CoreError::store(e.error)).map(|_| ())
}

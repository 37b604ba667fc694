use crate::services::{layout::DaySegment, object_store::StoreConfig};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{env, path::PathBuf, str::FromStr};

const MB: usize = 1_000_000;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub max_upload_mb: usize,
    pub day_segment: DaySegment,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Blob storage API")]
pub struct Args {
    /// Host to bind to (overrides BLOBSTORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BLOBSTORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where blobs are stored (overrides BLOBSTORE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Upload size limit in megabytes (overrides BLOBSTORE_MAX_UPLOAD_MB)
    #[arg(long)]
    pub max_upload_mb: Option<usize>,

    /// Third directory level format (overrides BLOBSTORE_DAY_SEGMENT)
    #[arg(long, value_enum)]
    pub day_segment: Option<DaySegment>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::merge(Args::parse(), |key| env::var(key))
    }

    /// Merge parsed arguments over values looked up with `var`.
    pub fn merge<F>(args: Args, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = var("BLOBSTORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_var(&var, "BLOBSTORE_PORT", 7000u16)?;
        let env_storage = var("BLOBSTORE_STORAGE_DIR").unwrap_or_else(|_| "./data/blobs".into());
        let env_max_upload = parse_var(&var, "BLOBSTORE_MAX_UPLOAD_MB", 128usize)?;
        let env_day_segment = match var("BLOBSTORE_DAY_SEGMENT") {
            Ok(value) => DaySegment::from_str(&value, true)
                .map_err(|err| anyhow::anyhow!(err))
                .with_context(|| format!("parsing BLOBSTORE_DAY_SEGMENT value `{}`", value))?,
            Err(env::VarError::NotPresent) => DaySegment::default(),
            Err(err) => return Err(err).context("reading BLOBSTORE_DAY_SEGMENT"),
        };

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            max_upload_mb: args.max_upload_mb.unwrap_or(env_max_upload),
            day_segment: args.day_segment.unwrap_or(env_day_segment),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(MB)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            root: PathBuf::from(&self.storage_dir),
            day_segment: self.day_segment,
        }
    }
}

fn parse_var<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::merge(Args::default(), lookup(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:7000");
        assert_eq!(cfg.storage_dir, "./data/blobs");
        assert_eq!(cfg.max_upload_bytes(), 128 * MB);
        assert_eq!(cfg.day_segment, DaySegment::Legacy);
    }

    #[test]
    fn args_override_env() {
        let args = Args {
            port: Some(9000),
            day_segment: Some(DaySegment::DayOfMonth),
            ..Args::default()
        };
        let env = lookup(&[
            ("BLOBSTORE_PORT", "8000"),
            ("BLOBSTORE_STORAGE_DIR", "/var/state"),
            ("BLOBSTORE_DAY_SEGMENT", "legacy"),
        ]);
        let cfg = AppConfig::merge(args, env).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.day_segment, DaySegment::DayOfMonth);
        assert_eq!(cfg.store_config().root, PathBuf::from("/var/state"));
    }

    #[test]
    fn bad_env_values_are_errors() {
        assert!(AppConfig::merge(Args::default(), lookup(&[("BLOBSTORE_PORT", "http")])).is_err());
        assert!(
            AppConfig::merge(Args::default(), lookup(&[("BLOBSTORE_DAY_SEGMENT", "weekly")]))
                .is_err()
        );
    }

    #[test]
    fn cli_flags_parse() {
        let args = Args::parse_from([
            "blobstore",
            "--storage-dir",
            "/tmp/blobs",
            "--day-segment",
            "day-of-month",
            "--max-upload-mb",
            "4",
        ]);
        let cfg = AppConfig::merge(args, lookup(&[])).unwrap();
        assert_eq!(cfg.storage_dir, "/tmp/blobs");
        assert_eq!(cfg.day_segment, DaySegment::DayOfMonth);
        assert_eq!(cfg.max_upload_bytes(), 4 * MB);
    }
}

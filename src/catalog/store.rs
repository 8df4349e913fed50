//! Static configuration catalog loaded from disk.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use thiserror::Error;

/// Families of configuration values the frontend can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationKind {
    Styles,
    Languages,
    Voices,
    VisualStyles,
    TargetAudiences,
    Durations,
}

impl ConfigurationKind {
    pub const ALL: [ConfigurationKind; 6] = [
        ConfigurationKind::Styles,
        ConfigurationKind::Languages,
        ConfigurationKind::Voices,
        ConfigurationKind::VisualStyles,
        ConfigurationKind::TargetAudiences,
        ConfigurationKind::Durations,
    ];

    /// Segment used under `/api/configurations/`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ConfigurationKind::Styles => "styles",
            ConfigurationKind::Languages => "languages",
            ConfigurationKind::Voices => "voices",
            ConfigurationKind::VisualStyles => "visual-styles",
            ConfigurationKind::TargetAudiences => "target-audiences",
            ConfigurationKind::Durations => "durations",
        }
    }

    /// File name (without `.json`) inside the catalog directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ConfigurationKind::Styles => "styles",
            ConfigurationKind::Languages => "languages",
            ConfigurationKind::Voices => "voices",
            ConfigurationKind::VisualStyles => "visual_styles",
            ConfigurationKind::TargetAudiences => "target_audiences",
            ConfigurationKind::Durations => "durations",
        }
    }
}

impl fmt::Display for ConfigurationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Error type for catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog directory {} does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} must contain a JSON array", .0.display())]
    NotAnArray(PathBuf),
}

const EMPTY_LIST: &[u8] = b"[]";

/// Immutable map from configuration kind to the raw JSON served for it.
///
/// File contents are kept byte for byte; they are only parsed to check
/// that each file holds an array.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    entries: HashMap<ConfigurationKind, Bytes>,
}

impl CatalogStore {
    /// Load every `{kind}.json` file from `dir`. Missing files serve `[]`.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        if !dir.is_dir() {
            return Err(CatalogError::NotADirectory(dir.to_path_buf()));
        }

        let mut entries = HashMap::new();
        for kind in ConfigurationKind::ALL {
            let path = dir.join(format!("{}.json", kind.file_stem()));
            if !path.exists() {
                tracing::warn!(path = %path.display(), kind = %kind, "No catalog file, serving empty list");
                continue;
            }

            let raw = fs::read(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            let parsed: serde_json::Value =
                serde_json::from_slice(&raw).map_err(|source| CatalogError::InvalidJson {
                    path: path.clone(),
                    source,
                })?;
            let count = match parsed.as_array() {
                Some(items) => items.len(),
                None => return Err(CatalogError::NotAnArray(path)),
            };

            tracing::debug!(kind = %kind, entries = count, "Catalog entry loaded");
            entries.insert(kind, Bytes::from(raw));
        }

        tracing::info!(
            dir = %dir.display(),
            kinds = entries.len(),
            "Configuration catalog loaded"
        );
        Ok(Self { entries })
    }

    /// Raw JSON for a kind.
    pub fn get(&self, kind: ConfigurationKind) -> Bytes {
        self.entries
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Bytes::from_static(EMPTY_LIST))
    }
}

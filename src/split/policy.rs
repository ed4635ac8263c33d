//! Splitting policy: how changed paths are grouped into buckets.

use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

/// Strategy selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Bucket by the file's directory.
    Directory,
    /// Bucket by the nearest ancestor containing a marker file.
    MarkerFile,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Directory => write!(f, "directory"),
            Strategy::MarkerFile => write!(f, "marker-file"),
        }
    }
}

/// A validated splitting policy.
///
/// `max_depth == 0` means unlimited in both variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplittingPolicy {
    Directory { max_depth: usize },
    MarkerFile { marker_name: String, max_depth: usize },
}

impl SplittingPolicy {
    /// Validate a raw strategy/marker/depth combination.
    pub fn new(
        strategy: Strategy,
        marker: Option<&str>,
        max_depth: usize,
    ) -> Result<Self, ConfigError> {
        let marker = marker.map(str::trim).filter(|m| !m.is_empty());

        match strategy {
            Strategy::Directory => {
                if marker.is_some() {
                    return Err(ConfigError::UnexpectedMarker);
                }
                Ok(SplittingPolicy::Directory { max_depth })
            }
            Strategy::MarkerFile => {
                let marker = marker.ok_or(ConfigError::MissingMarker)?;
                if marker.contains('/') || marker.contains('\\') || marker == "." || marker == ".." {
                    return Err(ConfigError::InvalidMarker(marker.to_string()));
                }
                Ok(SplittingPolicy::MarkerFile {
                    marker_name: marker.to_string(),
                    max_depth,
                })
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            SplittingPolicy::Directory { .. } => Strategy::Directory,
            SplittingPolicy::MarkerFile { .. } => Strategy::MarkerFile,
        }
    }

    pub fn max_depth(&self) -> usize {
        match self {
            SplittingPolicy::Directory { max_depth } => *max_depth,
            SplittingPolicy::MarkerFile { max_depth, .. } => *max_depth,
        }
    }
}

use std::path::PathBuf;

use crate::{
    config::{DEFAULT_TOOL_PATH, ToolConfig},
    error::{MediaInfoError, Result},
};

pub mod runner;
pub mod version;

use runner::ToolRunner;
use version::Version;

/// Resolves the mediainfo binary: configured override first, then [`DEFAULT_TOOL_PATH`]
pub fn locate(config: &ToolConfig) -> Result<PathBuf> {
    let path = config
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOOL_PATH));

    if !path.exists() {
        return Err(MediaInfoError::ToolNotFound(path));
    }
    Ok(path)
}

/// A located mediainfo binary whose version passed the gate
#[derive(Debug, Clone)]
pub struct ToolHandle {
    pub path: PathBuf,
    pub version: Version,
}

impl ToolHandle {
    pub fn resolve(config: &ToolConfig, runner: &dyn ToolRunner) -> Result<Self> {
        let path = locate(config)?;
        let version = version::verify(runner, &path)?;
        log::info!("using mediainfo {} at {}", version, path.to_string_lossy());
        Ok(Self { path, version })
    }
}

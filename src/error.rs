use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::tool::version::Version;

#[derive(Debug, Error)]
pub enum MediaInfoError {
    #[error("bad input: {0}")]
    InvalidInput(String),

    #[error("{0} cannot be found. Are you sure mediainfo is installed?")]
    ToolNotFound(PathBuf),

    #[error(
        "unable to determine mediainfo version. We tried: {command}. \
         Set MEDIAINFO_PATH to the full path of mediainfo if it is not installed at the default location"
    )]
    UnknownVersion { command: String },

    #[error("your version of mediainfo, {found}, is not compatible. >= {required} required")]
    IncompatibleVersion { found: Version, required: Version },

    #[error("execution of '{command}' failed. {output:?}")]
    Execution { command: String, output: String },

    #[error("execution of '{command}' timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("HTTP call to {0} is not working!")]
    RemoteUrl(String),

    #[error("{0}")]
    Argument(String),

    #[error("XML parser {0:?} could not be loaded, only \"roxmltree\" is available")]
    UnsupportedParser(String),

    #[error("xml error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MediaInfoError>;

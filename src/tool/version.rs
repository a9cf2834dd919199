//! Module to query and gate the mediainfo version

use std::{cmp::Ordering, fmt::Display, path::Path, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{MediaInfoError, Result},
    tool::runner::{ToolRunner, shell_word},
};

static VERSION_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"v([\d.]+)").unwrap());

/// Oldest mediainfo release whose XML output is understood
pub const MINIMUM_VERSION: &str = "0.7.25";

/// Dotted version number compared component by component.
///
/// Missing trailing components count as zero, so `0.7` equals `0.7.0`.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parts: Vec<u64>,
}

impl Version {
    pub fn minimum() -> Self {
        Self {
            raw: MINIMUM_VERSION.to_string(),
            parts: vec![0, 7, 25],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    pub fn is_supported(&self) -> bool {
        *self >= Self::minimum()
    }

    /// Extracts the first `v<major>.<minor>...` token from `--Version` output
    pub fn from_tool_output(output: &str) -> Option<Self> {
        let token = VERSION_TOKEN.captures(output)?.get(1)?.as_str();
        token.parse().ok()
    }
}

impl FromStr for Version {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let raw = s.trim().trim_matches('.');
        let parts = raw
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| ())?;
        if parts.is_empty() {
            return Err(());
        }
        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| {
                let a = self.parts.get(i).copied().unwrap_or(0);
                let b = other.parts.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Rejects anything below [`MINIMUM_VERSION`]
pub fn check_compatible(version: Version) -> Result<Version> {
    if version.is_supported() {
        Ok(version)
    } else {
        Err(MediaInfoError::IncompatibleVersion {
            found: version,
            required: Version::minimum(),
        })
    }
}

/// Runs `<tool> --Version` and gates the reported version.
///
/// The exit status is not inspected, only the printed text.
pub fn verify(runner: &dyn ToolRunner, tool_path: &Path) -> Result<Version> {
    let command = format!("{} --Version", shell_word(&tool_path.to_string_lossy()));
    log::debug!("querying mediainfo version: {command}");

    let output = runner.run_command(&command)?;
    let version = Version::from_tool_output(&output.text)
        .ok_or(MediaInfoError::UnknownVersion { command })?;

    check_compatible(version)
}

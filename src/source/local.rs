//! Module to analyze media stored on the local file system

use std::path::{Component, Path, PathBuf};

use crate::{
    error::{MediaInfoError, Result},
    tool::runner::escape_double_quotes,
};

/// Expands `~`, makes the path absolute and folds `.` and `..` without touching the disk
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };

    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether the file already holds mediainfo XML and needs no analysis
pub fn is_xml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false)
}

/// Reads `.xml` files directly, hands anything else to `analyze` as an escaped absolute path
pub fn resolve<F>(path: &Path, analyze: F) -> Result<String>
where
    F: FnOnce(&str) -> Result<String>,
{
    if path.as_os_str().is_empty() {
        return Err(MediaInfoError::Argument(
            "You must include a file location.".to_string(),
        ));
    }

    let absolute = expand_path(path)?;
    if !absolute.exists() {
        return Err(MediaInfoError::Argument(format!(
            "need a path to a video file, {} does not exist",
            absolute.to_string_lossy()
        )));
    }

    if is_xml_file(&absolute) {
        log::debug!("reading XML from {}", absolute.to_string_lossy());
        return Ok(std::fs::read_to_string(&absolute)?);
    }

    analyze(&escape_double_quotes(&absolute.to_string_lossy()))
}

//! Module to decide how an input reference gets turned into mediainfo XML

use std::{fmt::Display, path::PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::{MediaInfoError, Result};

pub const XML_MARKER: &str = "<?xml";

static FILE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^/\\]+\.\w+$").unwrap());

pub const INPUT_GUIDELINES: &str = "Input must be:\n\
    A video or xml file location. Example: '~/videos/test_video.mov' or '~/videos/test_video.xml'\n\
    A valid URL. Example: 'http://www.site.com/videofile.mov'\n\
    Or MediaInfo XML\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputReference {
    RawXmlText(String),
    RemoteUrl(String),
    LocalFilePath(PathBuf),
}

impl InputReference {
    /// Checks, in order: XML marker, URL, `basename.extension`. First match wins.
    pub fn classify(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(invalid_input());
        }

        if input.contains(XML_MARKER) {
            return Ok(Self::RawXmlText(input.to_string()));
        }

        let trimmed = input.trim();
        if is_url(trimmed) {
            return Ok(Self::RemoteUrl(trimmed.to_string()));
        }

        if FILE_PATTERN.is_match(trimmed) {
            return Ok(Self::LocalFilePath(PathBuf::from(trimmed)));
        }

        Err(invalid_input())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::RawXmlText(_) => "xml",
            Self::RemoteUrl(_) => "url",
            Self::LocalFilePath(_) => "file",
        }
    }
}

impl Display for InputReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RawXmlText(xml) => write!(f, "XML({} bytes)", xml.len()),
            Self::RemoteUrl(url) => write!(f, "{url}"),
            Self::LocalFilePath(path) => write!(f, "{}", path.to_string_lossy()),
        }
    }
}

/// Absolute URI of any scheme, hierarchical (`http://..`) or opaque (`mailto:..`).
/// Single letter schemes are drive letters (`C:\a.mov`), not URLs.
fn is_url(input: &str) -> bool {
    Url::parse(input)
        .map(|url| url.scheme().len() > 1)
        .unwrap_or(false)
}

fn invalid_input() -> MediaInfoError {
    MediaInfoError::InvalidInput(INPUT_GUIDELINES.to_string())
}

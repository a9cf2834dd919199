//! Module to analyze media served over the network

use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::{
    error::{MediaInfoError, Result},
    tool::runner::escape_double_quotes,
};

/// Status a HEAD request must return for a URL to count as reachable
pub const REACHABLE_STATUS: u16 = 200;

/// Answers the status of a HEAD request, without downloading the body
pub trait Reachability: Send + Sync {
    fn head_status(&self, url: &str) -> Result<u16>;
}

/// [`Reachability`] over HTTP with redirects disabled
pub struct HttpHeadCheck {
    agent: ureq::Agent,
}

impl HttpHeadCheck {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .redirects(0)
            .build();
        Self { agent }
    }
}

impl Reachability for HttpHeadCheck {
    fn head_status(&self, url: &str) -> Result<u16> {
        match self.agent.head(url).call() {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(code, _)) => Ok(code),
            Err(ureq::Error::Transport(transport)) => {
                log::debug!("HEAD {url} failed: {transport}");
                Err(MediaInfoError::RemoteUrl(url.to_string()))
            }
        }
    }
}

/// Bytes that may not appear anywhere in a URI. Reserved characters and `%` are left alone.
const URI_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-escapes characters that may not appear in a URI.
///
/// Reserved characters and existing `%` escapes are kept as they are.
pub fn escape_url(url: &str) -> String {
    utf8_percent_encode(url, URI_UNSAFE).to_string()
}

/// Checks `url` is reachable, then hands the escaped URL to `analyze`.
///
/// `analyze` is never called for an unreachable URL.
pub fn resolve<F>(url: &str, reachability: &dyn Reachability, analyze: F) -> Result<String>
where
    F: FnOnce(&str) -> Result<String>,
{
    let status = reachability.head_status(url)?;
    log::debug!("HEAD {url} -> {status}");
    if status != REACHABLE_STATUS {
        return Err(MediaInfoError::RemoteUrl(url.to_string()));
    }

    analyze(&escape_double_quotes(&escape_url(url)))
}

use anyhow::Context;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_TOOL_PATH: &str = "/usr/local/bin/mediainfo";
pub const DEFAULT_XML_PARSER: &str = "roxmltree";

pub const TOOL_PATH_ENV: &str = "MEDIAINFO_PATH";
pub const XML_PARSER_ENV: &str = "MEDIAINFO_XML_PARSER";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub xml: XmlConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }

    /// Applies `MEDIAINFO_PATH` and `MEDIAINFO_XML_PARSER` on top of the loaded values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var_os(TOOL_PATH_ENV).map(PathBuf::from),
            std::env::var(XML_PARSER_ENV).ok(),
        )
    }

    fn with_overrides(mut self, tool_path: Option<PathBuf>, parser: Option<String>) -> Self {
        if let Some(path) = tool_path.filter(|p| !p.as_os_str().is_empty()) {
            self.tool.path = Some(path);
        }
        if let Some(parser) = parser.filter(|p| !p.trim().is_empty()) {
            self.xml.parser = Some(parser);
        }
        self
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ToolConfig {
    /// Location of the mediainfo binary, falls back to [`DEFAULT_TOOL_PATH`]
    pub path: Option<PathBuf>,
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

impl ToolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: default_tool_timeout(),
        }
    }
}

fn default_tool_timeout() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    #[serde(default = "default_network_timeout")]
    pub timeout_secs: u64,
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_network_timeout(),
        }
    }
}

fn default_network_timeout() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct XmlConfig {
    pub parser: Option<String>,
}

impl XmlConfig {
    /// blank or missing means the default parser
    pub fn parser_name(&self) -> &str {
        match self.parser.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_XML_PARSER,
        }
    }
}

//! Resolves XML text, URLs and local files into mediainfo track metadata.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod input;
pub mod materialize;
pub mod resolver;
pub mod source;
pub mod tool;

pub use config::Config;
pub use domain::{AttributeValue, Track, TrackCollection};
pub use error::MediaInfoError;
pub use input::InputReference;
pub use resolver::MediaInfo;

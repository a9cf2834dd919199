//! Strategies turning each kind of input reference into a mediainfo XML document

pub mod local;
pub mod url;
pub mod xml;

pub use url::{HttpHeadCheck, Reachability};

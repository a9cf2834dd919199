pub mod collection;
pub mod track;

pub use collection::TrackCollection;
pub use track::{AttributeValue, Track};

mod media;
mod metadata;

pub use media::{MediaFile, MediaProperties, SubtitleDescriptor};
pub use metadata::{Episode, Movie};

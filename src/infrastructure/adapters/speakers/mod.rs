//! Speaker Sample Adapters

mod dir_lookup;

pub use dir_lookup::DirSpeakerLookup;

pub mod collections;
pub mod settings;

pub use collections::{load_collections, CollectionEntry, CollectionOptions, MetadataOverride};
pub use settings::CONFIG;

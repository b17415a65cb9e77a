//! Data models for the explore subsystem

pub mod artist;
pub mod config;
pub mod meta;
pub mod parameters;

pub use artist::{
    ExternalAlbum, ExternalArtist, LibraryArtist, SeedArtist, SimilarArtistEntry,
    SimilarArtistRef,
};
pub use config::{ExploreConfig, ServiceEndpoints};
pub use meta::{ExploreMeta, PARTIAL_FAILURE_MESSAGE, TOTAL_FAILURE_MESSAGE};
pub use parameters::ExploreParameters;

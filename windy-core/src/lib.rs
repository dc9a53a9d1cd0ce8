//! Core library for the `windy` CLI.
//!
//! This crate defines:
//! - City catalog loading and the search/autocomplete engine
//! - Favourites persistence over a durable key-value store
//! - Abstraction over the wind data API
//! - Configuration and shared domain models
//!
//! It is used by `windy-cli`, but can also be reused by other front ends.

pub mod beaufort;
pub mod catalog;
pub mod config;
pub mod favourites;
pub mod model;
pub mod provider;
pub mod search;
pub mod storage;

pub use catalog::{CatalogLoader, CatalogSource};
pub use config::Config;
pub use favourites::{Favourites, FavouritesError, FavouritesSlot, FavouritesStore};
pub use model::{CityRecord, FavouriteLocation, NewFavourite, WindData, WindDataParams, WindReport};
pub use provider::{HttpWindFetcher, WindFetcher};
pub use search::{SearchEngine, SearchEvents, SearchPhase};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageAdapter};

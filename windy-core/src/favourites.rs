use chrono::Utc;
use std::sync::Arc;

use crate::{
    model::{FavouriteLocation, NewFavourite},
    storage::{KeyValueStore, StorageAdapter},
};

/// Key under which the favourites list is persisted.
pub const FAVOURITES_STORAGE_KEY: &str = "windyDaysFavourites";

#[derive(Debug, thiserror::Error)]
pub enum FavouritesError {
    #[error(
        "favourites store is not initialized; construct a FavouritesStore and provide it before use"
    )]
    NotInitialized,
}

/// What consumers of the favourites list are allowed to do.
pub trait Favourites {
    fn favourites(&self) -> &[FavouriteLocation];
    fn add(&mut self, location: NewFavourite);
    fn remove(&mut self, city_name: &str, country: &str);
    fn is_favourited(&self, city_name: &str, country: &str) -> bool;
    fn clear(&mut self);

    /// Remove if present, add otherwise. Returns the state afterwards.
    fn toggle(&mut self, location: NewFavourite) -> bool {
        if self.is_favourited(&location.city_name, &location.country) {
            self.remove(&location.city_name, &location.country);
            false
        } else {
            self.add(location);
            true
        }
    }
}

/// Ordered favourites list mirrored to durable storage.
///
/// Every mutation writes the whole list. The in-memory list is updated first,
/// so a failed write leaves the session state intact.
#[derive(Debug)]
pub struct FavouritesStore {
    storage: StorageAdapter,
    items: Vec<FavouriteLocation>,
}

impl FavouritesStore {
    /// Rehydrate from `store`.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let storage = StorageAdapter::new(store);
        let items = storage.get(FAVOURITES_STORAGE_KEY, Vec::new());
        tracing::debug!("Loaded {} favourite(s)", items.len());
        Self { storage, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn persist(&self) {
        self.storage.set(FAVOURITES_STORAGE_KEY, &self.items);
    }
}

impl Favourites for FavouritesStore {
    fn favourites(&self) -> &[FavouriteLocation] {
        &self.items
    }

    fn add(&mut self, location: NewFavourite) {
        if self.is_favourited(&location.city_name, &location.country) {
            tracing::debug!("{}, {} is already a favourite", location.city_name, location.country);
            return;
        }

        let added_at = Utc::now().timestamp_millis();
        self.items.push(location.into_favourite(added_at));
        self.persist();
    }

    fn remove(&mut self, city_name: &str, country: &str) {
        let before = self.items.len();
        self.items.retain(|fav| !fav.matches(city_name, country));

        if self.items.len() != before {
            self.persist();
        }
    }

    fn is_favourited(&self, city_name: &str, country: &str) -> bool {
        self.items.iter().any(|fav| fav.matches(city_name, country))
    }

    fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }
}

/// Holds the session's store once it has been constructed.
#[derive(Debug, Default)]
pub struct FavouritesSlot {
    store: Option<FavouritesStore>,
}

impl FavouritesSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn provide(&mut self, store: FavouritesStore) {
        self.store = Some(store);
    }

    pub fn get(&self) -> Result<&FavouritesStore, FavouritesError> {
        self.store.as_ref().ok_or(FavouritesError::NotInitialized)
    }

    pub fn get_mut(&mut self) -> Result<&mut FavouritesStore, FavouritesError> {
        self.store.as_mut().ok_or(FavouritesError::NotInitialized)
    }
}

impl From<FavouritesStore> for FavouritesSlot {
    fn from(store: FavouritesStore) -> Self {
        Self { store: Some(store) }
    }
}

use std::sync::Arc;

use windy_core::{
    Favourites, FavouritesStore, FileStore, KeyValueStore, NewFavourite, WindData,
    favourites::FAVOURITES_STORAGE_KEY,
};

fn london() -> NewFavourite {
    NewFavourite {
        city_name: "London".into(),
        country: "GB".into(),
        latitude: 51.5074,
        longitude: -0.1278,
        wind_data: WindData {
            wind_speed: 3.1,
            wind_direction: 250.0,
            timestamp: 1_700_000_000_000,
        },
    }
}

#[test]
fn favourite_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let disk: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));

    let mut store = FavouritesStore::open(disk.clone());
    store.add(london());
    drop(store);

    let reopened = FavouritesStore::open(Arc::new(FileStore::new(dir.path())));
    assert!(reopened.is_favourited("London", "GB"));
    assert_eq!(reopened.favourites()[0].wind_data.wind_direction, 250.0);

    let raw = disk.get_item(FAVOURITES_STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"cityName\":\"London\""));
}

#[test]
fn corrupted_file_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join(format!("{FAVOURITES_STORAGE_KEY}.json"));
    std::fs::write(file, "invalid json").unwrap();

    let disk = Arc::new(FileStore::new(dir.path()));
    let store = FavouritesStore::open(disk.clone());

    assert!(store.is_empty());
    assert_eq!(disk.get_item(FAVOURITES_STORAGE_KEY).unwrap(), None);
}

#[test]
fn stores_share_one_backing_store() {
    let dir = tempfile::tempdir().unwrap();
    let disk: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));

    let mut first = FavouritesStore::open(disk.clone());
    first.add(london());
    first.remove("London", "GB");

    let second = FavouritesStore::open(disk);
    assert!(!second.is_favourited("London", "GB"));
}

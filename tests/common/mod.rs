#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use ride_ledger::{
    config::{Config, ConfigManager},
    domain::{Category, Entry},
    storage::{EntryStore, Identity, JsonFileStore},
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

fn temp_base() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated file-backed store and config manager for one identity.
pub fn setup_test_env(identity: &str) -> (EntryStore<JsonFileStore>, ConfigManager) {
    let base = temp_base();
    let config_manager = ConfigManager::with_base_dir(base.clone());
    let config = Config {
        identity: Some(identity.into()),
        data_dir: Some(base.join("data")),
        ..Config::default()
    };
    config_manager.save(&config).expect("save test config");

    let store = EntryStore::open(&config).expect("open entry store");
    (store, config_manager)
}

/// A second store over the same directory, as another session would see it.
pub fn reopen(store: &EntryStore<JsonFileStore>, identity: &str) -> EntryStore<JsonFileStore> {
    let backend = JsonFileStore::new(store.backend().root().to_path_buf()).expect("reopen backend");
    EntryStore::new(backend, Identity::new(identity).expect("identity"))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn entry(id: &str, day: NaiveDate, category: Category, amount: f64) -> Entry {
    Entry::new(day, category, amount).with_id(id)
}

pub fn refill(id: &str, day: NaiveDate, category: Category, odo: f64, quantity: f64) -> Entry {
    entry(id, day, category, 500.0)
        .with_odo(odo)
        .with_liters(quantity)
}

use std::path::Path;

use crate::models::settings::AppSettings;
use crate::storage::store::JsonStore;

const STORE_FILE: &str = "settings.json";
const SETTINGS_KEY: &str = "settings";

/// Read application settings. Returns defaults if no settings saved.
pub fn get_settings(data_dir: &Path) -> crate::error::Result<AppSettings> {
    let store = JsonStore::open(data_dir, STORE_FILE)?;
    let settings = store
        .get(SETTINGS_KEY)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    Ok(settings)
}

/// Save application settings. Persists to disk immediately.
pub fn save_settings(data_dir: &Path, settings: &AppSettings) -> crate::error::Result<()> {
    let mut store = JsonStore::open(data_dir, STORE_FILE)?;
    store.set(SETTINGS_KEY, serde_json::to_value(settings)?);
    store.save()
}

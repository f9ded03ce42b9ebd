use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use dirs::home_dir;

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".ride_ledger";
const DATA_DIR: &str = "data";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Environment variable that overrides the application directory.
pub const HOME_ENV_VAR: &str = "RIDE_LEDGER_HOME";

/// Returns the application-specific directory, defaulting to `~/.ride_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV_VAR) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding one persisted value per storage key.
pub fn data_dir() -> PathBuf {
    app_data_dir().join(DATA_DIR)
}

/// Path to the persisted [`crate::config::Config`].
pub fn config_file() -> PathBuf {
    app_data_dir().join(CONFIG_FILE)
}

/// Sibling path used to stage writes before they replace `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` to `path` by staging to a temporary file and renaming it into place,
/// so readers observe either the previous content or the new one.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data)?;
        file.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

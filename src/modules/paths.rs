use std::fs;
use std::path::PathBuf;

const DATA_DIR: &str = ".servana-gateway";

/// Data directory for config and logs, created on first use.
pub fn get_data_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Failed to get user home directory")?;
    let data_dir = home.join(DATA_DIR);

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
    }

    Ok(data_dir)
}

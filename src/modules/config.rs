use std::fs;

use crate::gateway::GatewayConfig;
use crate::modules::paths::get_data_dir;

const CONFIG_FILE: &str = "gateway_config.json";

/// Load the gateway configuration, writing defaults on first run.
pub fn load_gateway_config() -> Result<GatewayConfig, String> {
    let data_dir = get_data_dir()?;
    let config_path = data_dir.join(CONFIG_FILE);

    if !config_path.exists() {
        let config = GatewayConfig::default();
        let _ = save_gateway_config(&config);
        return Ok(config);
    }

    let content = fs::read_to_string(&config_path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
}

/// Save the gateway configuration.
pub fn save_gateway_config(config: &GatewayConfig) -> Result<(), String> {
    let data_dir = get_data_dir()?;
    let config_path = data_dir.join(CONFIG_FILE);

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(&config_path, content).map_err(|e| format!("Failed to save config: {}", e))
}

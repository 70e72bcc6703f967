use crate::drive::DriveConfig;
use std::env;
use std::path::PathBuf;

pub const ENV_SCOPES: &str = "GDRIVE_SCOPES";
pub const ENV_TOKEN_FILE: &str = "GDRIVE_TOKEN_FILE";
pub const ENV_TOKEN_DIR: &str = "GDRIVE_TOKEN_DIR";
pub const ENV_CLIENT_SECRET_FILE: &str = "GDRIVE_CLIENT_SECRET_FILE";
pub const ENV_USER_ID: &str = "GDRIVE_USER_ID";
pub const ENV_API_URL: &str = "GDRIVE_API_URL";

// Unset and blank variables are both treated as absent.
fn get_env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Split a scope list separated by commas and/or whitespace.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load Drive configuration from environment variables.
///
/// Missing variables are left unset; `DriveClient::new` reports which required one is absent.
pub fn load_drive_config() -> DriveConfig {
    DriveConfig {
        scopes: get_env_var(ENV_SCOPES).map(|raw| parse_scopes(&raw)),
        token_file: get_env_var(ENV_TOKEN_FILE),
        token_dir: get_env_var(ENV_TOKEN_DIR).map(PathBuf::from),
        client_secret_file: get_env_var(ENV_CLIENT_SECRET_FILE).map(PathBuf::from),
        user_id: get_env_var(ENV_USER_ID),
        api_base_url: get_env_var(ENV_API_URL),
    }
}

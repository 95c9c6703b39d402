//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML document
    pub fn to_toml(&self) -> String {
        format!(
            r#"# medium configuration
# Environment variables override this file:
#   MEDIUM_BACKEND_URL, MEDIUM_PAGE_SIZE, MEDIUM_TOKEN_PATH, MEDIUM_THEME

# Backend API prefix
backend_url = "{backend_url}"

# Default page size for list views
page_size = {page_size}

# Request timeout in seconds
request_timeout_secs = {timeout}

# Auth token file (written on login, removed on logout)
token_path = "{token_path}"

# Navigation URL shown when the TUI starts
start_route = "{start_route}"

# Theme: dark, light
theme = "{theme}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            backend_url = self.backend_url,
            page_size = self.page_size,
            timeout = self.request_timeout_secs,
            token_path = toml_path(&self.token_path),
            start_route = self.start_route,
            theme = self.theme,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = toml_path(&self.logging.file_dir),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}

/// Paths as TOML basic strings (backslashes on Windows need escaping)
fn toml_path(path: &std::path::Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

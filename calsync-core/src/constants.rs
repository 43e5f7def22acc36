/// Days synced from now when nothing else is configured.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Time zone used for display when neither config nor the system provides one.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Where the identity mapping lives unless `state_path` says otherwise.
pub const DEFAULT_STATE_PATH: &str = "~/.local/state/calsync/mapping.json";

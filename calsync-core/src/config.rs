//! calsync configuration.
//!
//! Read from ~/.config/calsync/config.toml, with every key overridable from
//! the environment (`CALSYNC_SYNC_DIRECTION=a_to_b`, `CALSYNC_WINDOW_DAYS=14`,
//! `CALSYNC_PROVIDER_A__GOOGLE_CALENDAR_ID=work`, ...).

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_STATE_PATH, DEFAULT_WINDOW_DAYS};
use crate::direction::{Side, SyncDirection};
use crate::error::{CalSyncError, CalSyncResult};
use crate::mapping::FileMappingStore;
use crate::remote::Remote;

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_state_path() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_PATH)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub sync_direction: SyncDirection,

    #[serde(default = "default_window_days")]
    pub window_days: u32,

    #[serde(default)]
    pub dry_run: bool,

    /// Side that wins conflicts in two-way syncs
    #[serde(default)]
    pub source_of_truth: Option<Side>,

    /// IANA time zone used when displaying events
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    pub provider_a: Option<Remote>,
    pub provider_b: Option<Remote>,
}

impl SyncConfig {
    pub fn config_path() -> CalSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalSyncError::Config("Could not determine config directory".into()))?
            .join("calsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/calsync/config.toml, creating a commented default first
    /// if it does not exist yet.
    pub fn load() -> CalSyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CalSyncResult<Self> {
        let config: SyncConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CALSYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CalSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalSyncError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CalSyncResult<()> {
        if self.window_days == 0 {
            return Err(CalSyncError::Config(
                "window_days must be a positive number of days".into(),
            ));
        }
        self.timezone()?;
        Ok(())
    }

    /// Both configured providers, A first.
    pub fn providers(&self) -> CalSyncResult<(Remote, Remote)> {
        match (&self.provider_a, &self.provider_b) {
            (Some(a), Some(b)) => Ok((a.clone(), b.clone())),
            _ => Err(CalSyncError::Config(
                "Both [provider_a] and [provider_b] must be configured".into(),
            )),
        }
    }

    pub fn timezone(&self) -> CalSyncResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>().map_err(|_| {
                    CalSyncError::Config(format!("Unknown time zone '{}'", name))
                })
            })
            .transpose()
    }

    /// `state_path` with `~` expanded.
    pub fn state_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.state_path.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn mapping_store(&self) -> FileMappingStore {
        FileMappingStore::new(self.state_path())
    }

    /// Set `source_of_truth` in the config file at `path`, keeping the rest
    /// of the file (comments included) as it is.
    pub fn set_source_of_truth(path: &Path, side: Side) -> CalSyncResult<()> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| CalSyncError::Config(format!("Could not read config file: {e}")))?;
        let updated = with_top_level_key(&contents, "source_of_truth", &format!("\"{side}\""));

        let table: toml::Table = toml::from_str(&updated)
            .map_err(|e| CalSyncError::Config(format!("Invalid config file: {e}")))?;
        if table.get("source_of_truth").and_then(|v| v.as_str()) != Some(side.to_string().as_str()) {
            return Err(CalSyncError::Config(
                "Could not set source_of_truth in the config file".into(),
            ));
        }

        std::fs::write(path, updated)
            .map_err(|e| CalSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalSyncResult<()> {
        let contents = format!(
            "\
# calsync configuration

# Which way changes flow: \"both\", \"a_to_b\" or \"b_to_a\"
# sync_direction = \"both\"

# Days to sync, starting today:
# window_days = {}

# Only show what would change:
# dry_run = false

# Side that wins conflicts when syncing both ways (\"a\" or \"b\"):
# source_of_truth = \"a\"

# Time zone for displaying events:
# timezone = \"Europe/Paris\"

# Where the identity mapping is kept:
# state_path = \"{}\"

# The two calendars. Extra keys are passed to the provider as-is.
# [provider_a]
# provider = \"google\"
# google_calendar_id = \"primary\"
#
# [provider_b]
# provider = \"icloud\"
# icloud_calendar_url = \"https://caldav.icloud.com/...\"
",
            DEFAULT_WINDOW_DAYS, DEFAULT_STATE_PATH
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// Replace the top-level `key = ...` line, or add one before the first table.
fn with_top_level_key(contents: &str, key: &str, value: &str) -> String {
    let line = format!("{key} = {value}");
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();

    let first_table = lines
        .iter()
        .position(|l| l.trim_start().starts_with('['))
        .unwrap_or(lines.len());

    let existing = lines[..first_table].iter().position(|l| {
        l.trim_start()
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='))
    });

    match existing {
        Some(i) => lines[i] = line,
        None if first_table == lines.len() => lines.push(line),
        None => {
            let mut at = first_table;
            while at > 0 && lines[at - 1].trim_start().starts_with('#') {
                at -= 1;
            }
            lines.insert(at, line);
            lines.insert(at + 1, String::new());
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

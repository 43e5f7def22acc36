pub mod config;
pub mod status;
pub mod sync;

use anyhow::Result;
use calsync_core::config::SyncConfig;
use calsync_core::constants::DEFAULT_TIMEZONE;
use chrono_tz::Tz;

/// Time zone for displaying events: the configured one, else the system's,
/// else the default.
pub fn display_timezone(config: &SyncConfig) -> Result<Tz> {
    if let Some(tz) = config.timezone()? {
        return Ok(tz);
    }

    let tz = iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .or_else(|| DEFAULT_TIMEZONE.parse::<Tz>().ok())
        .unwrap_or(chrono_tz::UTC);
    Ok(tz)
}

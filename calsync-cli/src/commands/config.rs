use anyhow::Result;
use calsync_core::config::SyncConfig;
use calsync_core::direction::{Side, SyncDirection};
use calsync_core::remote::ProviderAdapter;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

/// Show the effective settings, or set the conflict winner.
pub fn run(config: &SyncConfig, source: Option<Side>) -> Result<()> {
    let config_path = SyncConfig::config_path()?;

    if let Some(side) = source {
        SyncConfig::set_source_of_truth(&config_path, side)?;
        println!("{} Source of truth set to {}", "✓".green(), side);
        return Ok(());
    }

    let tz = super::display_timezone(config)?;

    println!("{}", "Paths".bold());
    println!("  Config:   {}", config_path.display());
    println!("  Mapping:  {}", config.state_path().display());
    println!();
    println!("{}", "Sync".bold());
    for (label, value) in settings(config, tz) {
        println!("  {:<17} {}", format!("{label}:"), value);
    }

    if config.sync_direction == SyncDirection::Both && config.source_of_truth.is_none() {
        println!();
        println!(
            "{}",
            "Conflicts are only reported in two-way syncs. Pick a winner with:".dimmed()
        );
        println!("{}", "  calsync config --source a".dimmed());
    }

    Ok(())
}

fn settings(config: &SyncConfig, tz: Tz) -> Vec<(&'static str, String)> {
    let provider = |side: Side| {
        let remote = match side {
            Side::A => config.provider_a.as_ref(),
            Side::B => config.provider_b.as_ref(),
        };
        remote
            .map(|r| r.name().to_string())
            .unwrap_or_else(|| "not configured".to_string())
    };

    vec![
        ("Provider A", provider(Side::A)),
        ("Provider B", provider(Side::B)),
        ("Direction", config.sync_direction.to_string()),
        (
            "Source of truth",
            config
                .source_of_truth
                .map(|side| side.to_string())
                .unwrap_or_else(|| "none".to_string()),
        ),
        ("Window", format!("{} days", config.window_days)),
        ("Dry run", config.dry_run.to_string()),
        ("Time zone", tz.name().to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: serde_json::Value) -> SyncConfig {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_settings_show_configured_values() {
        let config = config(serde_json::json!({
            "sync_direction": "a_to_b",
            "window_days": 14,
            "source_of_truth": "b",
            "provider_a": { "provider": "google", "google_calendar_id": "primary" },
        }));

        let settings = settings(&config, chrono_tz::Europe::Paris);
        let value = |label: &str| {
            settings
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(value("Provider A"), "google");
        assert_eq!(value("Provider B"), "not configured");
        assert_eq!(value("Direction"), "a_to_b");
        assert_eq!(value("Source of truth"), "b");
        assert_eq!(value("Window"), "14 days");
        assert_eq!(value("Time zone"), "Europe/Paris");
    }

    #[test]
    fn test_settings_without_source_of_truth() {
        let config = config(serde_json::json!({}));

        let settings = settings(&config, chrono_tz::UTC);
        assert!(settings.contains(&("Source of truth", "none".to_string())));
        assert!(settings.contains(&("Direction", "both".to_string())));
    }
}

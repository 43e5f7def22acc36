use anyhow::Result;
use calsync_core::DateRange;
use calsync_core::config::SyncConfig;
use calsync_core::mapping::MappingStore;
use calsync_core::remote::{ProviderAdapter, Remote};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use crate::render::event_time;
use crate::utils::tui;

/// List both providers' events in the window and show how many pairs are
/// tracked.
pub async fn run(config: &SyncConfig, range: DateRange) -> Result<()> {
    let (a, b) = config.providers()?;
    let tz = super::display_timezone(config)?;

    for (label, remote) in [("A", &a), ("B", &b)] {
        show_provider(label, remote, &range, tz).await;
        println!();
    }

    let store = config.mapping_store();
    match store.load() {
        Ok(mapping) => println!(
            "{} {} tracked {}",
            "🔗".dimmed(),
            mapping.len(),
            if mapping.len() == 1 { "pair" } else { "pairs" }
        ),
        Err(e) => println!("{} {}", "🔗".dimmed(), e.to_string().red()),
    }
    println!("{}", store.path().display().to_string().dimmed());

    Ok(())
}

async fn show_provider(label: &str, remote: &Remote, range: &DateRange, tz: Tz) {
    let heading = format!("📅 {} ({})", remote.name(), label);
    let spinner = tui::create_spinner(heading.clone());
    let result = remote.list_events(range).await;
    spinner.finish_and_clear();

    println!("{}", heading);
    match result {
        Ok(events) if events.is_empty() => println!("   {}", "No events".dimmed()),
        Ok(mut events) => {
            events.sort_by_key(|e| e.start);
            for event in &events {
                println!("   {} {}", event, event_time(event, tz).dimmed());
            }
        }
        Err(e) => println!("   {}", e.to_string().red()),
    }
}

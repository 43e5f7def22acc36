use anyhow::Result;
use calsync_core::DateRange;
use calsync_core::config::SyncConfig;
use calsync_core::direction::SyncDirection;
use calsync_core::sync::Orchestrator;
use owo_colors::OwoColorize;

use crate::render::ReportRender;
use crate::utils::tui;

pub struct SyncArgs {
    pub range: DateRange,
    pub direction: Option<SyncDirection>,
    pub dry_run: bool,
    pub json: bool,
    pub verbose: bool,
}

pub async fn run(config: &SyncConfig, args: SyncArgs) -> Result<()> {
    let (a, b) = config.providers()?;
    let tz = super::display_timezone(config)?;
    let direction = args.direction.unwrap_or(config.sync_direction);
    let dry_run = args.dry_run || config.dry_run;

    let heading = format!(
        "🔄 {} ↔ {} ({})",
        a.provider.name(),
        b.provider.name(),
        direction
    );

    let store = config.mapping_store();
    tracing::debug!(mapping = %store.path().display(), "using identity mapping");

    let orchestrator = Orchestrator::new(a, b, store)
        .with_source_of_truth(config.source_of_truth);

    let spinner = (!args.json).then(|| tui::create_spinner(heading.clone()));
    let result = orchestrator.run(direction, &args.range, dry_run).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", heading);
        println!("{}", report.render(tz, args.verbose));
        println!("\n{}", report.render_summary());
        if dry_run {
            println!("{}", "Dry run: nothing was changed".dimmed());
        }
    }

    if report.failed > 0 {
        anyhow::bail!("{} operation(s) could not be applied", report.failed);
    }

    Ok(())
}

//! TUI rendering traits for calsync types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to calsync-core types using owo_colors.

use calsync_core::diff::{Conflict, ConflictKind, DiffKind, Operation};
use calsync_core::sync::{OperationOutcome, OutcomeStatus, SyncReport};
use calsync_core::{Event, Side};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self, tz: Tz) -> String;
}

/// Human-readable span of an event in `tz`.
///
/// All-day events end at midnight of the following day on most providers,
/// so the last day shown is the one before `end`.
pub fn event_time(event: &Event, tz: Tz) -> String {
    let start = event.start.with_timezone(&tz);
    let end = event.end.with_timezone(&tz);

    if event.all_day {
        let last = if event.end > event.start {
            (event.end - Duration::seconds(1)).with_timezone(&tz)
        } else {
            start
        };
        return if start.date_naive() == last.date_naive() {
            format!("{} (all day)", start.format("%a %b %-d, %Y"))
        } else {
            format!(
                "{} - {} (all day)",
                start.format("%b %-d"),
                last.format("%b %-d, %Y")
            )
        };
    }

    if start.date_naive() == end.date_naive() {
        format!(
            "{} {} - {}",
            start.format("%a %b %-d, %Y"),
            start.format("%-I:%M %p"),
            end.format("%-I:%M %p")
        )
    } else {
        format!(
            "{} {} → {} {}",
            start.format("%a %b %-d, %Y"),
            start.format("%-I:%M %p"),
            end.format("%a %b %-d, %Y"),
            end.format("%-I:%M %p")
        )
    }
}

fn short_time(instant: Option<DateTime<Utc>>, tz: Tz) -> String {
    match instant {
        Some(instant) => instant.with_timezone(&tz).format("%b %-d %-I:%M %p").to_string(),
        None => "unknown".to_string(),
    }
}

/// Colorize text according to the diff kind
fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

fn kind_symbol(kind: DiffKind) -> String {
    colorize_diff(kind, kind.symbol())
}

impl Render for Operation {
    fn render(&self, tz: Tz) -> String {
        let summary = colorize_diff(self.kind, &self.event.to_string());
        let time = event_time(&self.event, tz);

        format!("{} {} {}", kind_symbol(self.kind), summary, time.dimmed())
    }
}

impl Render for OperationOutcome {
    fn render(&self, tz: Tz) -> String {
        let line = self.operation.render(tz);
        match &self.status {
            OutcomeStatus::Applied | OutcomeStatus::Planned => line,
            OutcomeStatus::Skipped => format!("{} {}", line, "(skipped)".dimmed()),
            OutcomeStatus::Failed(reason) => format!("{}\n      {}", line, reason.red()),
        }
    }
}

impl Render for Conflict {
    fn render(&self, tz: Tz) -> String {
        let mut lines = vec![format!("{} {} ({})", "!".magenta(), self.title().magenta(), self)];

        match &self.kind {
            ConflictKind::Collision { events, .. } => {
                for event in events {
                    lines.push(format!(
                        "      {} {}",
                        event.provider_id.dimmed(),
                        event_time(event, tz).dimmed()
                    ));
                }
            }
            _ => {
                for side in [Side::A, Side::B] {
                    if let Some(event) = self.event(side) {
                        let modified = format!("(modified {})", short_time(event.last_modified, tz));
                        lines.push(format!(
                            "      {}: {} {} {}",
                            side,
                            event.title,
                            event_time(event, tz).dimmed(),
                            modified.dimmed()
                        ));
                    }
                }
            }
        }

        lines.join("\n")
    }
}

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 5;

fn is_failed(outcome: &OperationOutcome) -> bool {
    matches!(outcome.status, OutcomeStatus::Failed(_))
}

/// Render outcomes for one provider, using compact view if there are many and verbose is false
fn render_outcome_list(
    outcomes: &[&OperationOutcome],
    tz: Tz,
    verbose: bool,
    lines: &mut Vec<String>,
) {
    if verbose || outcomes.len() <= COMPACT_THRESHOLD {
        for outcome in outcomes {
            lines.push(format!("   {}", outcome.render(tz)));
        }
        return;
    }

    for kind in [DiffKind::Create, DiffKind::Update, DiffKind::Delete] {
        let count = outcomes
            .iter()
            .filter(|o| o.operation.kind == kind && !is_failed(o))
            .count();
        if count == 0 {
            continue;
        }
        let label = match kind {
            DiffKind::Create => format!("({} new {})", count, pluralize("event", count)),
            DiffKind::Update => format!("({} changed {})", count, pluralize("event", count)),
            DiffKind::Delete => format!("({} deleted {})", count, pluralize("event", count)),
        };
        lines.push(format!("   {} {}", kind_symbol(kind), colorize_diff(kind, &label)));
    }

    // Failures are always listed one by one.
    for outcome in outcomes.iter().filter(|o| is_failed(o)) {
        lines.push(format!("   {}", outcome.render(tz)));
    }
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Full rendering of a sync run
pub trait ReportRender {
    fn render(&self, tz: Tz, verbose: bool) -> String;
    fn render_summary(&self) -> String;
}

impl ReportRender for SyncReport {
    fn render(&self, tz: Tz, verbose: bool) -> String {
        let mut lines = Vec::new();

        for side in [Side::A, Side::B] {
            let outcomes: Vec<&OperationOutcome> = self
                .outcomes
                .iter()
                .filter(|o| o.operation.target == side)
                .collect();
            if outcomes.is_empty() {
                continue;
            }
            if !lines.is_empty() {
                lines.push(String::new());
            }
            let header = if self.dry_run {
                format!("   Would change on {} ({}):", self.provider_name(side), side)
            } else {
                format!("   Changes on {} ({}):", self.provider_name(side), side)
            };
            lines.push(header.dimmed().to_string());
            render_outcome_list(&outcomes, tz, verbose, &mut lines);
        }

        let unresolved: Vec<&Conflict> = self.unresolved_conflicts().collect();
        if !unresolved.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push("   Conflicts (not applied):".dimmed().to_string());
            for conflict in unresolved {
                lines.push(format!("   {}", conflict.render(tz)));
            }
        }

        if lines.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        lines.join("\n")
    }

    fn render_summary(&self) -> String {
        let verb = if self.dry_run { "Would sync" } else { "Synced" };
        let mut summary = format!(
            "{}: {} created, {} updated, {} deleted, {} skipped",
            verb, self.created, self.updated, self.deleted, self.skipped
        );
        if self.conflicted > 0 {
            let conflicted = format!("{} conflicted", self.conflicted);
            summary.push_str(&format!(", {}", conflicted.magenta()));
        }
        if self.failed > 0 {
            let failed = format!("{} failed", self.failed);
            summary.push_str(&format!(", {}", failed.red()));
        }
        summary
    }
}

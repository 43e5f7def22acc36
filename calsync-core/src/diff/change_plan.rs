//! Change plan computation: the reconciler.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::date_range::DateRange;
use crate::diff::{Conflict, ConflictKind, DiffKind, MappingUpdate, Operation};
use crate::direction::Side;
use crate::event::Event;
use crate::identity::{SyncKey, normalize_text};
use crate::mapping::{IdentityMapping, MappingRow};

/// Everything needed to converge provider A (local) and provider B (remote).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangePlan {
    pub operations: Vec<Operation>,
    pub conflicts: Vec<Conflict>,
    pub mapping_updates: Vec<MappingUpdate>,
    /// Keys already in sync (including pairs only linked in the mapping)
    pub unchanged: usize,
}

/// One side's snapshot, grouped by resolved sync key.
struct KeyedSnapshot<'a> {
    order: Vec<SyncKey>,
    by_key: HashMap<SyncKey, Vec<&'a Event>>,
}

impl<'a> KeyedSnapshot<'a> {
    /// Events whose provider ID is already mapped keep their mapped key.
    /// Everyone else gets a derived key, moved along to the next free one
    /// while a mapped event on the same side owns it.
    fn resolve(events: &'a [Event], known_ids: &HashMap<&str, &SyncKey>) -> Self {
        let mut snapshot = KeyedSnapshot {
            order: Vec::new(),
            by_key: HashMap::new(),
        };

        let mut unmapped = Vec::new();
        for event in events {
            match known_ids.get(event.provider_id.as_str()) {
                Some(key) => snapshot.push((*key).clone(), event),
                None => unmapped.push(event),
            }
        }

        let mapped: HashSet<SyncKey> = snapshot.order.iter().cloned().collect();
        for event in unmapped {
            let mut key = event.sync_key();
            while mapped.contains(&key) {
                key = key.disambiguate();
            }
            snapshot.push(key, event);
        }

        snapshot
    }

    fn push(&mut self, key: SyncKey, event: &'a Event) {
        let entry = self.by_key.entry(key.clone()).or_default();
        if entry.is_empty() {
            self.order.push(key);
        }
        entry.push(event);
    }

    /// The single event for `key`, or None when absent.
    fn get(&self, key: &SyncKey) -> Option<&'a Event> {
        self.by_key.get(key).and_then(|events| events.first().copied())
    }

    /// Keys that only this side has and the mapping does not know about:
    /// candidates for a create.
    fn unpaired(
        &self,
        other: &KeyedSnapshot<'_>,
        mapping: &IdentityMapping,
        blocked: &HashSet<SyncKey>,
    ) -> Vec<(&SyncKey, &'a Event)> {
        self.order
            .iter()
            .filter(|key| !blocked.contains(*key))
            .filter(|key| other.get(key).is_none() && mapping.get(key).is_none())
            .filter_map(|key| self.get(key).map(|event| (key, event)))
            .collect()
    }

    fn collisions(&self) -> impl Iterator<Item = (&SyncKey, &Vec<&'a Event>)> {
        self.order
            .iter()
            .filter_map(|key| self.by_key.get(key).map(|events| (key, events)))
            .filter(|(_, events)| events.len() > 1)
    }
}

impl ChangePlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.conflicts.is_empty() && self.mapping_updates.is_empty()
    }

    /// (created, updated, deleted) operation counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut created = 0;
        let mut updated = 0;
        let mut deleted = 0;

        for op in &self.operations {
            match op.kind {
                DiffKind::Create => created += 1,
                DiffKind::Update => updated += 1,
                DiffKind::Delete => deleted += 1,
            }
        }

        (created, updated, deleted)
    }

    /// Compare both snapshots against the mapping. `local` is provider A,
    /// `remote` provider B; both must cover `window`.
    pub fn diff(
        local: &[Event],
        remote: &[Event],
        mapping: &IdentityMapping,
        window: &DateRange,
    ) -> ChangePlan {
        let a = KeyedSnapshot::resolve(local, &mapping.keys_by_id(Side::A));
        let b = KeyedSnapshot::resolve(remote, &mapping.keys_by_id(Side::B));

        let mut plan = ChangePlan::default();
        let mut blocked = HashSet::new();

        for (side, snapshot) in [(Side::A, &a), (Side::B, &b)] {
            for (key, events) in snapshot.collisions() {
                blocked.insert(key.clone());
                plan.conflicts.push(Conflict {
                    sync_key: key.clone(),
                    kind: ConflictKind::Collision {
                        side,
                        events: events.iter().map(|e| (*e).clone()).collect(),
                    },
                    a: None,
                    b: None,
                });
            }
        }

        let mut seen = HashSet::new();
        for (a_key, a_event, b_key, b_event) in rescheduled_pairs(&a, &b, mapping, &blocked) {
            seen.insert(a_key);
            seen.insert(b_key);
            plan.conflict(a_key, ConflictKind::Divergent, Some(a_event), Some(b_event));
        }

        let keys = a
            .order
            .iter()
            .chain(b.order.iter())
            .chain(mapping.rows().map(|(key, _)| key));

        for key in keys {
            if blocked.contains(key) || !seen.insert(key) {
                continue;
            }
            plan.classify(key, a.get(key), b.get(key), mapping.get(key), window);
        }

        // Sort by event start time (ascending)
        plan.operations.sort_by_key(|op| op.event.start);
        plan.conflicts.sort_by_key(|c| c.start());

        plan
    }

    fn classify(
        &mut self,
        key: &SyncKey,
        a: Option<&Event>,
        b: Option<&Event>,
        row: Option<&MappingRow>,
        window: &DateRange,
    ) {
        match (a, b, row) {
            // Never synced
            (Some(a), None, None) => {
                self.operations.push(Operation::create(key.clone(), Side::B, a));
            }
            (None, Some(b), None) => {
                self.operations.push(Operation::create(key.clone(), Side::A, b));
            }
            (Some(a), Some(b), None) => {
                if a == b {
                    self.mapping_updates.push(MappingUpdate::link(key.clone(), a, b));
                    self.unchanged += 1;
                } else {
                    self.conflict(key, ConflictKind::Divergent, Some(a), Some(b));
                }
            }

            // Synced before, present on both sides
            (Some(a), Some(b), Some(row)) => {
                let a_hash = a.content_hash();
                let b_hash = b.content_hash();
                let a_changed = a_hash != row.content_hash;
                let b_changed = b_hash != row.content_hash;

                match (a_changed, b_changed) {
                    (false, false) => {
                        if row.provider_a_id != a.provider_id || row.provider_b_id != b.provider_id
                        {
                            self.mapping_updates.push(MappingUpdate::link(key.clone(), a, b));
                        }
                        self.unchanged += 1;
                    }
                    (true, false) => {
                        self.operations.push(Operation::update(
                            key.clone(),
                            Side::B,
                            b.provider_id.clone(),
                            a,
                        ));
                    }
                    (false, true) => {
                        self.operations.push(Operation::update(
                            key.clone(),
                            Side::A,
                            a.provider_id.clone(),
                            b,
                        ));
                    }
                    (true, true) if a_hash == b_hash => {
                        // Same edit made on both sides
                        self.mapping_updates.push(MappingUpdate::link(key.clone(), a, b));
                        self.unchanged += 1;
                    }
                    (true, true) => {
                        self.conflict(key, ConflictKind::BothModified, Some(a), Some(b));
                    }
                }
            }

            // Synced before, present on one side only
            (Some(survivor), None, Some(row)) => {
                self.one_sided(key, Side::A, survivor, row, window);
            }
            (None, Some(survivor), Some(row)) => {
                self.one_sided(key, Side::B, survivor, row, window);
            }

            (None, None, Some(row)) => {
                // Rows outside the window are simply not visible this run
                if window.contains(row.start) {
                    self.mapping_updates.push(MappingUpdate::Forget {
                        sync_key: key.clone(),
                    });
                }
            }

            (None, None, None) => {}
        }
    }

    fn one_sided(
        &mut self,
        key: &SyncKey,
        present: Side,
        survivor: &Event,
        row: &MappingRow,
        window: &DateRange,
    ) {
        let missing = present.other();
        let changed = survivor.content_hash() != row.content_hash;

        if window.contains(row.start) {
            // The missing side should have listed it: it was deleted there
            if changed {
                let (a, b) = match present {
                    Side::A => (Some(survivor), None),
                    Side::B => (None, Some(survivor)),
                };
                self.conflict(key, ConflictKind::DeletedVsModified { deleted_on: missing }, a, b);
            } else {
                warn!(
                    sync_key = key.short(),
                    "'{}' is gone from {}, deleting it on {} (widen the window if it was only moved)",
                    survivor.title,
                    missing,
                    present
                );
                self.operations.push(Operation::delete(key.clone(), present, survivor));
            }
        } else if changed {
            // Moved into the window on one side; the other copy still sits at
            // its old time, outside what we fetched
            self.operations.push(Operation::update(
                key.clone(),
                missing,
                row.id(missing).to_string(),
                survivor,
            ));
        } else {
            self.unchanged += 1;
        }
    }

    fn conflict(
        &mut self,
        key: &SyncKey,
        kind: ConflictKind,
        a: Option<&Event>,
        b: Option<&Event>,
    ) {
        self.conflicts.push(Conflict {
            sync_key: key.clone(),
            kind,
            a: a.cloned(),
            b: b.cloned(),
        });
    }
}

/// Unsynced events that look like one event scheduled at two different
/// times: same title and description, same day, one on each side. Each
/// event is paired at most once.
fn rescheduled_pairs<'k, 'e>(
    a: &'k KeyedSnapshot<'e>,
    b: &'k KeyedSnapshot<'e>,
    mapping: &IdentityMapping,
    blocked: &HashSet<SyncKey>,
) -> Vec<(&'k SyncKey, &'e Event, &'k SyncKey, &'e Event)> {
    let mut candidates: HashMap<(String, String, NaiveDate), VecDeque<(&'k SyncKey, &'e Event)>> =
        HashMap::new();
    for (key, event) in b.unpaired(a, mapping, blocked) {
        candidates
            .entry(reschedule_signature(event))
            .or_default()
            .push_back((key, event));
    }

    let mut pairs = Vec::new();
    for (a_key, a_event) in a.unpaired(b, mapping, blocked) {
        if let Some((b_key, b_event)) = candidates
            .get_mut(&reschedule_signature(a_event))
            .and_then(|queue| queue.pop_front())
        {
            pairs.push((a_key, a_event, b_key, b_event));
        }
    }
    pairs
}

fn reschedule_signature(event: &Event) -> (String, String, NaiveDate) {
    (
        normalize_text(&event.title),
        normalize_text(event.description.as_deref().unwrap_or_default()),
        event.start.date_naive(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, hour, minute, 0).unwrap()
    }

    fn window() -> DateRange {
        DateRange::days_from(Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap(), 7)
    }

    fn event(id: &str, title: &str, hour: u32) -> Event {
        Event::new(id, title, at(hour, 0), at(hour, 0) + Duration::minutes(15))
    }

    /// Apply a plan as if every provider call succeeded, assigning
    /// predictable IDs to created events.
    fn apply(
        plan: &ChangePlan,
        a: &mut Vec<Event>,
        b: &mut Vec<Event>,
        mapping: &mut IdentityMapping,
    ) {
        let now = at(12, 0);
        for op in &plan.operations {
            let target = match op.target {
                Side::A => &mut *a,
                Side::B => &mut *b,
            };
            let created_id = match op.kind {
                DiffKind::Create => {
                    let id = format!("{}-new-{}", op.target, target.len());
                    let mut created = op.event.clone();
                    created.provider_id = id.clone();
                    target.push(created);
                    Some(id)
                }
                DiffKind::Update => {
                    let id = op.target_id.clone().unwrap();
                    let existing = target.iter_mut().find(|e| e.provider_id == id).unwrap();
                    *existing = Event {
                        provider_id: id,
                        ..op.event.clone()
                    };
                    None
                }
                DiffKind::Delete => {
                    let id = op.target_id.clone().unwrap();
                    target.retain(|e| e.provider_id != id);
                    None
                }
            };
            mapping.record(op, created_id, now);
        }
        for update in &plan.mapping_updates {
            mapping.apply(update, now);
        }
    }

    #[test]
    fn test_new_local_event_is_created_remotely_once() {
        let mut a = vec![event("g1", "Standup", 9)];
        let mut b = vec![];
        let mut mapping = IdentityMapping::new();

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        assert_eq!(plan.operations.len(), 1);
        let op = &plan.operations[0];
        assert_eq!(op.kind, DiffKind::Create);
        assert_eq!(op.target, Side::B);
        assert_eq!(op.sync_key, a[0].sync_key());

        apply(&plan, &mut a, &mut b, &mut mapping);
        assert!(mapping.get(&a[0].sync_key()).is_some());

        let again = ChangePlan::diff(&a, &b, &mapping, &window());
        assert!(again.is_empty(), "second run should be a no-op: {:?}", again);
        assert_eq!(again.unchanged, 1);
    }

    #[test]
    fn test_new_remote_event_is_created_locally() {
        let a = vec![];
        let b = vec![event("ical-1", "Dentist", 15)];

        let plan = ChangePlan::diff(&a, &b, &IdentityMapping::new(), &window());
        assert_eq!(plan.counts(), (1, 0, 0));
        assert_eq!(plan.operations[0].target, Side::A);
    }

    #[test]
    fn test_matching_events_without_mapping_are_linked_not_duplicated() {
        let a = vec![event("g1", "Standup", 9)];
        let mut b_event = event("ical-1", " standup ", 9);
        b_event.location = Some(String::new());
        let b = vec![b_event];

        let plan = ChangePlan::diff(&a, &b, &IdentityMapping::new(), &window());
        assert!(plan.operations.is_empty());
        assert_eq!(plan.mapping_updates.len(), 1);
        assert!(matches!(plan.mapping_updates[0], MappingUpdate::Link { .. }));
    }

    #[test]
    fn test_same_identity_different_content_without_baseline_conflicts() {
        let a = vec![event("g1", "Standup", 9)];
        let mut b_event = event("ical-1", "Standup", 9);
        b_event.description = Some("Bring notes".into());
        let b = vec![b_event];

        let plan = ChangePlan::diff(&a, &b, &IdentityMapping::new(), &window());
        assert!(plan.operations.is_empty());
        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].kind, ConflictKind::Divergent);
    }

    fn synced_pair() -> (Vec<Event>, Vec<Event>, IdentityMapping) {
        let mut a = vec![event("g1", "Planning", 10)];
        let mut b = vec![];
        let mut mapping = IdentityMapping::new();
        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        apply(&plan, &mut a, &mut b, &mut mapping);
        (a, b, mapping)
    }

    #[test]
    fn test_local_change_updates_remote_even_when_title_changes() {
        let (mut a, b, mapping) = synced_pair();
        a[0].title = "Planning (moved room)".into();
        a[0].location = Some("Room 4".into());

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        assert_eq!(plan.counts(), (0, 1, 0));
        let op = &plan.operations[0];
        assert_eq!(op.target, Side::B);
        assert_eq!(op.target_id.as_deref(), Some(b[0].provider_id.as_str()));
        assert_eq!(op.event.title, "Planning (moved room)");
    }

    #[test]
    fn test_remote_change_updates_local() {
        let (a, mut b, mapping) = synced_pair();
        b[0].start = at(11, 0);
        b[0].end = at(11, 30);

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        assert_eq!(plan.counts(), (0, 1, 0));
        assert_eq!(plan.operations[0].target, Side::A);
        assert_eq!(plan.operations[0].target_id.as_deref(), Some("g1"));
    }

    #[test]
    fn test_changes_on_both_sides_conflict() {
        let (mut a, mut b, mapping) = synced_pair();
        a[0].title = "Planning v2".into();
        b[0].location = Some("Cafeteria".into());

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        assert!(plan.operations.is_empty());
        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].kind, ConflictKind::BothModified);
        assert_eq!(plan.conflicts[0].sync_key, *mapping.rows().next().unwrap().0);
    }

    #[test]
    fn test_identical_edits_on_both_sides_refresh_mapping() {
        let (mut a, mut b, mapping) = synced_pair();
        a[0].description = Some("Agenda".into());
        b[0].description = Some("Agenda".into());

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        assert!(plan.operations.is_empty());
        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.mapping_updates.len(), 1);
    }

    #[test]
    fn test_remote_deletion_propagates_locally() {
        let (a, _b, mapping) = synced_pair();

        let plan = ChangePlan::diff(&a, &[], &mapping, &window());
        assert_eq!(plan.counts(), (0, 0, 1));
        let op = &plan.operations[0];
        assert_eq!(op.target, Side::A);
        assert_eq!(op.target_id.as_deref(), Some("g1"));
    }

    #[test]
    fn test_local_deletion_propagates_remotely() {
        let (_a, b, mapping) = synced_pair();

        let plan = ChangePlan::diff(&[], &b, &mapping, &window());
        assert_eq!(plan.counts(), (0, 0, 1));
        assert_eq!(plan.operations[0].target, Side::B);
    }

    #[test]
    fn test_delete_against_modification_conflicts() {
        let (mut a, _b, mapping) = synced_pair();
        a[0].description = Some("Updated agenda".into());

        let plan = ChangePlan::diff(&a, &[], &mapping, &window());
        assert!(plan.operations.is_empty());
        assert_eq!(
            plan.conflicts[0].kind,
            ConflictKind::DeletedVsModified { deleted_on: Side::B }
        );
    }

    #[test]
    fn test_gone_from_both_sides_forgets_row() {
        let (_a, _b, mapping) = synced_pair();

        let plan = ChangePlan::diff(&[], &[], &mapping, &window());
        assert!(plan.operations.is_empty());
        assert_eq!(plan.mapping_updates.len(), 1);
        assert!(matches!(plan.mapping_updates[0], MappingUpdate::Forget { .. }));
    }

    #[test]
    fn test_rows_outside_window_are_left_alone() {
        let (_a, _b, mapping) = synced_pair();
        let later = DateRange::days_from(Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(), 7);

        let plan = ChangePlan::diff(&[], &[], &mapping, &later);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_event_moved_into_window_updates_other_side_by_mapped_id() {
        let (mut a, b, mapping) = synced_pair();
        let next_week = Utc.with_ymd_and_hms(2025, 3, 27, 10, 0, 0).unwrap();
        a[0].start = next_week;
        a[0].end = next_week + Duration::minutes(15);
        let later = DateRange::days_from(Utc.with_ymd_and_hms(2025, 3, 27, 0, 0, 0).unwrap(), 7);

        let plan = ChangePlan::diff(&a, &[], &mapping, &later);
        assert_eq!(plan.counts(), (0, 1, 0));
        assert_eq!(plan.operations[0].target, Side::B);
        assert_eq!(plan.operations[0].target_id.as_deref(), Some(b[0].provider_id.as_str()));
    }

    #[test]
    fn test_duplicate_events_on_one_side_are_a_collision() {
        let a = vec![event("g1", "Lunch", 12), event("g2", "lunch", 12)];
        let b = vec![event("ical-1", "Lunch", 12)];

        let plan = ChangePlan::diff(&a, &b, &IdentityMapping::new(), &window());
        assert!(plan.operations.is_empty());
        assert!(plan.mapping_updates.is_empty());
        assert_eq!(plan.conflicts.len(), 1);
        assert!(matches!(
            plan.conflicts[0].kind,
            ConflictKind::Collision { side: Side::A, ref events } if events.len() == 2
        ));
    }

    #[test]
    fn test_new_event_reusing_a_renamed_events_identity_gets_own_key() {
        let (mut a, b, mapping) = synced_pair();
        // The synced event is renamed, then a new one takes its old title/time
        a[0].title = "Planning (cancelled)".into();
        a.push(event("g2", "Planning", 10));

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.counts(), (1, 1, 0));

        let create = plan.operations.iter().find(|op| op.kind == DiffKind::Create).unwrap();
        assert_eq!(create.event.provider_id, "g2");
        assert_ne!(create.sync_key, a[1].sync_key());
    }

    #[test]
    fn test_same_new_copy_on_both_sides_of_a_synced_event_is_linked() {
        let (mut a, mut b, mut mapping) = synced_pair();
        a.push(event("g2", "Planning", 10));
        b.push(event("ical-2", "Planning", 10));

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        assert_eq!(plan.counts(), (0, 0, 0));
        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.mapping_updates.len(), 1);
        assert!(matches!(
            &plan.mapping_updates[0],
            MappingUpdate::Link { provider_a_id, provider_b_id, .. }
                if provider_a_id == "g2" && provider_b_id == "ical-2"
        ));

        apply(&plan, &mut a, &mut b, &mut mapping);
        assert_eq!(mapping.len(), 2);
        assert_eq!((a.len(), b.len()), (2, 2));

        let again = ChangePlan::diff(&a, &b, &mapping, &window());
        assert!(again.is_empty(), "second run should be a no-op: {:?}", again);
        assert_eq!(again.unchanged, 2);
    }

    #[test]
    fn test_two_new_copies_of_a_synced_event_on_one_side_collide() {
        let (mut a, b, mapping) = synced_pair();
        a.push(event("g2", "Planning", 10));
        a.push(event("g3", "planning", 10));

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        assert!(plan.operations.is_empty());
        assert_eq!(plan.unchanged, 1);
        assert!(matches!(
            plan.conflicts[0].kind,
            ConflictKind::Collision { side: Side::A, ref events } if events.len() == 2
        ));
    }

    #[test]
    fn test_same_title_at_different_times_on_first_sync_conflicts() {
        let a = vec![event("g1", "Standup", 9)];
        let b = vec![event("ical-1", "Standup", 10)];

        let plan = ChangePlan::diff(&a, &b, &IdentityMapping::new(), &window());
        assert!(plan.operations.is_empty());
        assert_eq!(plan.conflicts.len(), 1);

        let conflict = &plan.conflicts[0];
        assert_eq!(conflict.kind, ConflictKind::Divergent);
        assert_eq!(conflict.a.as_ref().unwrap().provider_id, "g1");
        assert_eq!(conflict.b.as_ref().unwrap().provider_id, "ical-1");
    }

    #[test]
    fn test_resolved_reschedule_converges() {
        let mut a = vec![event("g1", "Standup", 9)];
        let mut b = vec![event("ical-1", "Standup", 10)];
        let mut mapping = IdentityMapping::new();

        let plan = ChangePlan::diff(&a, &b, &mapping, &window());
        let resolution = ChangePlan {
            operations: vec![plan.conflicts[0].resolve(Side::A).unwrap()],
            ..ChangePlan::default()
        };
        apply(&resolution, &mut a, &mut b, &mut mapping);
        assert_eq!(b[0].start, at(9, 0));

        let again = ChangePlan::diff(&a, &b, &mapping, &window());
        assert!(again.is_empty(), "second run should be a no-op: {:?}", again);
    }

    #[test]
    fn test_same_title_on_different_days_is_not_a_reschedule() {
        let a = vec![event("g1", "Standup", 9)];
        let tomorrow = at(9, 0) + Duration::days(1);
        let b = vec![Event::new(
            "ical-1",
            "Standup",
            tomorrow,
            tomorrow + Duration::minutes(15),
        )];

        let plan = ChangePlan::diff(&a, &b, &IdentityMapping::new(), &window());
        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.counts(), (2, 0, 0));
    }

    #[test]
    fn test_deletion_carries_the_doomed_event() {
        let (a, _b, mapping) = synced_pair();

        let plan = ChangePlan::diff(&a, &[], &mapping, &window());
        let op = &plan.operations[0];
        assert_eq!(op.kind, DiffKind::Delete);
        assert_eq!(op.event.title, "Planning");
        assert_eq!(op.event.provider_id, "g1");
    }

    #[test]
    fn test_operations_are_sorted_by_start() {
        let a = vec![event("g2", "Late", 17), event("g1", "Early", 8)];
        let b = vec![event("ical-1", "Noon", 12)];

        let plan = ChangePlan::diff(&a, &b, &IdentityMapping::new(), &window());
        let titles: Vec<_> = plan.operations.iter().map(|op| op.event.title.as_str()).collect();
        assert_eq!(titles, vec!["Early", "Noon", "Late"]);
    }
}

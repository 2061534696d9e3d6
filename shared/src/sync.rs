use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::capabilities::TimerId;
use crate::event::PoiId;
use crate::poi::{Poi, PoiRecord};

/// Last-synced serialized form of every record the remote store knows about.
///
/// Written only by the sync pass and by load seeding; everything else reads.
pub type Snapshot = BTreeMap<PoiId, PoiRecord>;

/// One batch of remote work. Deletes always dispatch before upserts so a
/// delete-then-recreate under the same key cannot be clobbered.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SyncPlan {
    pub deletes: Vec<PoiId>,
    pub upserts: Vec<PoiRecord>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.upserts.is_empty()
    }
}

/// Diff the live collection against the snapshot.
///
/// A live entity is upserted when its current serialized record differs from
/// the snapshot entry by full structural equality, or has no snapshot entry
/// at all. A snapshot key with no live entity is deleted.
pub fn plan(pois: &BTreeMap<PoiId, Poi>, snapshot: &Snapshot, page: u32) -> SyncPlan {
    let deletes = snapshot
        .keys()
        .filter(|id| !pois.contains_key(*id))
        .cloned()
        .collect();

    let upserts = pois
        .values()
        .map(|poi| poi.record(page))
        .filter(|record| snapshot.get(&record.uuid) != Some(record))
        .collect();

    SyncPlan { deletes, upserts }
}

/// Single-slot debounce state.
///
/// Each invalidation retires the previous timer generation and opens a new
/// one, so edits made in quick succession coalesce into one pass. A fire is
/// only honoured when its generation is the live one; late fires from
/// cancelled timers fall through harmlessly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debounce {
    next: u64,
    pending: Option<TimerId>,
}

impl Debounce {
    /// Start (or restart) the window. Returns the stale timer to cancel, if
    /// one was pending, and the fresh timer to arm.
    pub fn schedule(&mut self) -> (Option<TimerId>, TimerId) {
        let stale = self.pending.take();
        self.next += 1;
        let fresh = TimerId(self.next);
        self.pending = Some(fresh);
        (stale, fresh)
    }

    /// True when `id` is the live generation; clears the slot so a second
    /// fire of the same timer is also rejected.
    pub fn acknowledge(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            return true;
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Coordinate;
    use proptest::prelude::*;

    fn poi(id: &str, title: &str, lat: f64, lng: f64) -> Poi {
        Poi {
            id: PoiId::new(id),
            title: title.to_string(),
            description: "d".to_string(),
            position: Coordinate::new(lat, lng).expect("valid coordinate"),
        }
    }

    fn live(pois: &[Poi]) -> BTreeMap<PoiId, Poi> {
        pois.iter().map(|p| (p.id.clone(), p.clone())).collect()
    }

    fn snapshot_of(pois: &BTreeMap<PoiId, Poi>, page: u32) -> Snapshot {
        pois.iter()
            .map(|(id, poi)| (id.clone(), poi.record(page)))
            .collect()
    }

    #[test]
    fn plan_is_empty_when_nothing_changed() {
        let pois = live(&[poi("a", "one", 1.0, 2.0), poi("b", "two", 3.0, 4.0)]);
        let snapshot = snapshot_of(&pois, 0);
        assert!(plan(&pois, &snapshot, 0).is_empty());
    }

    #[test]
    fn plan_upserts_unsynced_entities() {
        let pois = live(&[poi("a", "one", 1.0, 2.0)]);
        let result = plan(&pois, &Snapshot::new(), 0);
        assert!(result.deletes.is_empty());
        assert_eq!(result.upserts.len(), 1);
        assert_eq!(result.upserts[0].uuid, PoiId::new("a"));
    }

    #[test]
    fn plan_upserts_on_any_field_change() {
        let pois = live(&[poi("a", "one", 1.0, 2.0)]);
        let mut snapshot = snapshot_of(&pois, 0);

        let mut edited = pois.clone();
        edited.get_mut(&PoiId::new("a")).expect("present").title = "renamed".to_string();
        assert_eq!(plan(&edited, &snapshot, 0).upserts.len(), 1);

        // A page change alone also counts: the comparison unit is the full record.
        snapshot.get_mut(&PoiId::new("a")).expect("present").page = 9;
        assert_eq!(plan(&pois, &snapshot, 0).upserts.len(), 1);
    }

    #[test]
    fn plan_deletes_snapshot_keys_missing_from_live() {
        let pois = live(&[poi("a", "one", 1.0, 2.0)]);
        let snapshot = snapshot_of(&pois, 0);
        let result = plan(&BTreeMap::new(), &snapshot, 0);
        assert_eq!(result.deletes, vec![PoiId::new("a")]);
        assert!(result.upserts.is_empty());
    }

    #[test]
    fn plan_mixes_deletes_and_upserts() {
        let old = live(&[poi("a", "one", 1.0, 2.0)]);
        let snapshot = snapshot_of(&old, 0);
        let current = live(&[poi("b", "two", 3.0, 4.0)]);

        let result = plan(&current, &snapshot, 0);
        assert_eq!(result.deletes, vec![PoiId::new("a")]);
        assert_eq!(result.upserts.len(), 1);
        assert_eq!(result.upserts[0].uuid, PoiId::new("b"));
    }

    #[test]
    fn debounce_schedule_retires_previous_generation() {
        let mut debounce = Debounce::default();

        let (stale, first) = debounce.schedule();
        assert_eq!(stale, None);

        let (stale, second) = debounce.schedule();
        assert_eq!(stale, Some(first));
        assert_ne!(first, second);
    }

    #[test]
    fn debounce_rejects_stale_fires() {
        let mut debounce = Debounce::default();
        let (_, first) = debounce.schedule();
        let (_, second) = debounce.schedule();

        assert!(!debounce.acknowledge(first));
        assert!(debounce.acknowledge(second));
        // The same generation does not fire twice.
        assert!(!debounce.acknowledge(second));
    }

    #[test]
    fn debounce_idle_after_acknowledge() {
        let mut debounce = Debounce::default();
        let (_, id) = debounce.schedule();
        assert!(debounce.is_pending());
        assert!(debounce.acknowledge(id));
        assert!(!debounce.is_pending());
    }

    proptest! {
        #[test]
        fn snapshot_of_live_is_always_a_fixpoint(
            titles in proptest::collection::vec("[a-z]{1,8}", 0..8),
        ) {
            let pois: Vec<Poi> = titles
                .iter()
                .enumerate()
                .map(|(i, title)| poi(&format!("id-{i}"), title, i as f64, -(i as f64)))
                .collect();
            let pois = live(&pois);
            let snapshot = snapshot_of(&pois, 2);
            prop_assert!(plan(&pois, &snapshot, 2).is_empty());
        }
    }
}

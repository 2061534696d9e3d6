use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::capabilities::{Capabilities, TimerOutput};
use crate::event::{Coordinate, Event, PoiId};
use crate::model::Model;
use crate::poi::Poi;
use crate::store::{page_from_path, PoiListing, RemoteStore, StoreOutcome};
use crate::sync;
use crate::{
    DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LNG, DEFAULT_MAP_ZOOM, MOVE_PROMPT_TOAST,
    SYNC_DEBOUNCE_MS,
};

#[derive(Default)]
pub struct App;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoiCard {
    pub id: PoiId,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub editable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub cards: Vec<PoiCard>,
    pub editable: bool,
    pub awaiting_move: Option<PoiId>,
    pub map_center_lat: f64,
    pub map_center_lng: f64,
    pub map_zoom: f64,
}

impl App {
    /// Start (or restart) the debounce window: any change pushes the sync
    /// a full window into the future.
    fn schedule_sync(&self, model: &mut Model, caps: &Capabilities) {
        let (stale, fresh) = model.debounce.schedule();
        if let Some(stale) = stale {
            caps.timer.cancel(stale);
        }
        caps.timer.start(fresh, SYNC_DEBOUNCE_MS, Event::SyncDue);
    }

    /// Diff live state against the snapshot and dispatch the difference.
    /// Deletes go first; each deleted key leaves the snapshot at dispatch.
    fn run_sync_pass(&self, model: &mut Model, caps: &Capabilities) {
        let Some(store) = model.store.clone() else {
            warn!("sync fired before the store was configured");
            return;
        };

        let plan = sync::plan(&model.pois, &model.snapshot, store.page());
        if plan.is_empty() {
            debug!("sync pass found nothing to do");
            return;
        }

        debug!(
            deletes = plan.deletes.len(),
            upserts = plan.upserts.len(),
            "running sync pass"
        );

        for id in plan.deletes {
            store.remove(&caps.http, id.clone());
            model.snapshot.remove(&id);
        }
        for record in plan.upserts {
            store.upsert(&caps.http, record);
        }
    }

    /// Turn the fetched listing into live entities, seeding the snapshot
    /// with each entity's own serialized form so the follow-up pass has
    /// nothing to upsert.
    fn seed_from_listing(&self, listing: PoiListing, model: &mut Model, caps: &Capabilities) {
        let page = model.store.as_ref().map_or(0, RemoteStore::page);
        let mut created = 0usize;

        for remote in listing.points_of_interest {
            let position = match Coordinate::new(remote.latitude, remote.longitude) {
                Ok(position) => position,
                Err(err) => {
                    warn!(uuid = %remote.uuid, %err, "skipping record with invalid coordinates");
                    continue;
                }
            };

            let poi = Poi {
                id: PoiId::new(remote.uuid),
                title: remote.title,
                description: remote.description,
                position,
            };
            caps.map
                .place_marker(poi.id.clone(), position.lat(), position.lng());
            model.snapshot.insert(poi.id.clone(), poi.record(page));
            model.pois.insert(poi.id.clone(), poi);
            created += 1;
        }

        if created > 0 {
            // Entity creation invalidates sync. The seeded snapshot makes
            // the resulting pass a no-op unless something changed meanwhile.
            self.schedule_sync(model, caps);
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        match event {
            Event::Started {
                api_root,
                path,
                csrf,
            } => {
                let page = page_from_path(&path);
                match RemoteStore::new(&api_root, page, csrf) {
                    Ok(remote) => {
                        remote.fetch_all(&caps.http);
                        model.store = Some(remote);
                        debug!(page, "remote store configured");
                    }
                    Err(err) => {
                        error!(%err, "cannot configure remote store");
                    }
                }
                caps.render.render();
            }

            Event::LoadCompleted(outcome) => match outcome {
                StoreOutcome::Response { status, body } if (200..300).contains(&status) => {
                    match serde_json::from_slice::<PoiListing>(&body) {
                        Ok(listing) => {
                            self.seed_from_listing(listing, model, caps);
                            caps.render.render();
                        }
                        Err(err) => {
                            error!(%err, "malformed POI listing");
                        }
                    }
                }
                StoreOutcome::Response { status, .. } => {
                    warn!(status, "POI load rejected");
                    caps.toast.show(format!(
                        "Looks like there was a problem. Status Code: {status}"
                    ));
                }
                StoreOutcome::TransportError { message } => {
                    error!(%message, "POI load failed");
                }
            },

            Event::MapClicked {
                latitude,
                longitude,
            } => {
                let position = match Coordinate::new(latitude, longitude) {
                    Ok(position) => position,
                    Err(err) => {
                        warn!(%err, "ignoring map click outside valid range");
                        return;
                    }
                };

                if let Some(id) = model.pending_move.take() {
                    if let Some(poi) = model.pois.get_mut(&id) {
                        poi.position = position;
                        caps.map.remove_marker(id.clone());
                        caps.map.place_marker(id, position.lat(), position.lng());
                        self.schedule_sync(model, caps);
                        caps.render.render();
                        return;
                    }
                    // Move target vanished while armed; the click falls
                    // through and creates a new POI instead.
                    debug!(%id, "pending move target no longer exists");
                }

                let id = model.ids.mint();
                let poi = Poi::placed_at(id.clone(), position);
                caps.map
                    .place_marker(id.clone(), position.lat(), position.lng());
                model.pois.insert(id, poi);
                self.schedule_sync(model, caps);
                caps.render.render();
            }

            Event::FieldsEdited {
                id,
                title,
                description,
            } => {
                if let Some(poi) = model.pois.get_mut(&id) {
                    poi.title = title;
                    poi.description = description;
                    self.schedule_sync(model, caps);
                    caps.render.render();
                } else {
                    debug!(%id, "edit for unknown POI ignored");
                }
            }

            Event::MoveRequested { id } => {
                if model.pois.contains_key(&id) {
                    model.pending_move = Some(id);
                    caps.toast.show(MOVE_PROMPT_TOAST);
                    caps.render.render();
                } else {
                    debug!(%id, "move requested for unknown POI");
                }
            }

            Event::DeleteRequested { id } => {
                if model.pois.remove(&id).is_some() {
                    caps.map.remove_marker(id);
                    self.schedule_sync(model, caps);
                    caps.render.render();
                } else {
                    debug!(%id, "delete for unknown POI ignored");
                }
            }

            Event::EditModeToggled => {
                model.editable = !model.editable;
                caps.render.render();
            }

            Event::SyncDue(output) => match output {
                TimerOutput::Fired(id) => {
                    if model.debounce.acknowledge(id) {
                        self.run_sync_pass(model, caps);
                    } else {
                        debug!(?id, "stale sync timer ignored");
                    }
                }
                TimerOutput::Cancelled(id) => {
                    debug!(?id, "sync timer cancelled");
                }
            },

            Event::UpsertCompleted {
                id,
                record,
                outcome,
            } => {
                if outcome.is_success() {
                    debug!(%id, "upsert acknowledged");
                } else {
                    warn!(%id, ?outcome, "upsert failed, not retried");
                }
                // The snapshot advances to the record actually sent even on
                // failure. A failed write is therefore not re-attempted on
                // the next pass unless the entity changes again.
                model.snapshot.insert(id, record);
            }

            Event::DeleteCompleted { id, outcome } => {
                if outcome.is_success() {
                    debug!(%id, "delete acknowledged");
                } else {
                    warn!(%id, ?outcome, "delete failed, not retried");
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel {
            cards: model
                .pois
                .values()
                .map(|poi| PoiCard {
                    id: poi.id.clone(),
                    title: poi.title.clone(),
                    description: poi.description.clone(),
                    latitude: poi.position.lat(),
                    longitude: poi.position.lng(),
                    editable: model.editable,
                })
                .collect(),
            editable: model.editable,
            awaiting_move: model.pending_move.clone(),
            map_center_lat: DEFAULT_MAP_CENTER_LAT,
            map_center_lng: DEFAULT_MAP_CENTER_LNG,
            map_zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crux_core::App as _;

    fn model_with(pois: &[(&str, &str)]) -> Model {
        let mut model = Model::default();
        for (id, title) in pois {
            let poi = Poi {
                id: PoiId::new(*id),
                title: (*title).to_string(),
                description: "d".to_string(),
                position: Coordinate::new(1.0, 2.0).expect("valid"),
            };
            model.pois.insert(poi.id.clone(), poi);
        }
        model
    }

    #[test]
    fn view_applies_edit_mode_to_every_card() {
        let mut model = model_with(&[("a", "one"), ("b", "two")]);
        model.editable = true;

        let view = App.view(&model);
        assert_eq!(view.cards.len(), 2);
        assert!(view.editable);
        assert!(view.cards.iter().all(|card| card.editable));
    }

    #[test]
    fn view_orders_cards_by_id() {
        let model = model_with(&[("b", "two"), ("a", "one")]);
        let view = App.view(&model);
        assert_eq!(view.cards[0].id, PoiId::new("a"));
        assert_eq!(view.cards[1].id, PoiId::new("b"));
    }

    #[test]
    fn view_exposes_default_viewport() {
        let view = App.view(&Model::default());
        assert!((view.map_center_lat - 43.4643).abs() < 1e-9);
        assert!((view.map_center_lng + 80.5204).abs() < 1e-9);
        assert!((view.map_zoom - 13.0).abs() < 1e-9);
    }
}

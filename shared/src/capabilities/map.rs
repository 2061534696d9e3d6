use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::event::PoiId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MapOperation {
    PlaceMarker {
        id: PoiId,
        latitude: f64,
        longitude: f64,
    },
    RemoveMarker {
        id: PoiId,
    },
}

impl Operation for MapOperation {
    type Output = ();
}

/// Marker placement on whatever map widget the shell runs.
///
/// Notify-only: the widget never answers, it just mirrors the collection.
pub struct Map<E> {
    context: CapabilityContext<MapOperation, E>,
}

impl<Ev> Capability<Ev> for Map<Ev> {
    type Operation = MapOperation;
    type MappedSelf<MappedEv> = Map<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Map::new(self.context.map_event(f))
    }
}

impl<E> Map<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<MapOperation, E>) -> Self {
        Self { context }
    }

    pub fn place_marker(&self, id: PoiId, latitude: f64, longitude: f64) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .notify_shell(MapOperation::PlaceMarker {
                    id,
                    latitude,
                    longitude,
                })
                .await;
        });
    }

    pub fn remove_marker(&self, id: PoiId) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(MapOperation::RemoveMarker { id }).await;
        });
    }
}

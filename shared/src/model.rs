use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::event::PoiId;
use crate::poi::{IdSource, Poi};
use crate::store::RemoteStore;
use crate::sync::{Debounce, Snapshot};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Model {
    /// Live collection: what the user currently sees.
    pub pois: BTreeMap<PoiId, Poi>,

    /// Last serialized form acknowledged per record. Written only by the
    /// sync pass and by load seeding.
    pub snapshot: Snapshot,

    /// Collection-wide edit mode; every card follows it.
    pub editable: bool,

    /// The POI the next map click should move, if any. Last writer wins.
    pub pending_move: Option<PoiId>,

    pub debounce: Debounce,
    pub ids: IdSource,

    /// Configured once by `Event::Started`.
    pub store: Option<RemoteStore>,
}

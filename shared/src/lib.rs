#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod event;
pub mod model;
pub mod poi;
pub mod store;
pub mod sync;

pub use app::{App, PoiCard, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use event::{CsrfToken, Event, PoiId};
pub use model::Model;

/// Quiet window between the last change and the sync pass.
pub const SYNC_DEBOUNCE_MS: u64 = 2_000;

pub const DEFAULT_POI_TITLE: &str = "New POI";
pub const DEFAULT_POI_DESCRIPTION: &str = "Add a description";

pub const MOVE_PROMPT_TOAST: &str = "Click on the map to move the POI marker";

pub const DEFAULT_MAP_CENTER_LAT: f64 = 43.4643;
pub const DEFAULT_MAP_CENTER_LNG: f64 = -80.5204;
pub const DEFAULT_MAP_ZOOM: f64 = 13.0;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{Coordinate, PoiId};
use crate::{DEFAULT_POI_DESCRIPTION, DEFAULT_POI_TITLE};

/// A point of interest as held in the live collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: PoiId,
    pub title: String,
    pub description: String,
    pub position: Coordinate,
}

impl Poi {
    /// A freshly placed POI with the default placeholder text.
    pub fn placed_at(id: PoiId, position: Coordinate) -> Self {
        Self {
            id,
            title: DEFAULT_POI_TITLE.to_string(),
            description: DEFAULT_POI_DESCRIPTION.to_string(),
            position,
        }
    }

    /// The wire form of this POI for the given page.
    ///
    /// Coordinates serialize as fixed six-decimal strings. This record is
    /// also the unit of comparison for the sync diff, so any field change
    /// (including reformatting) counts as a difference.
    pub fn record(&self, page: u32) -> PoiRecord {
        PoiRecord {
            uuid: self.id.clone(),
            page,
            title: self.title.clone(),
            description: self.description.clone(),
            latitude: format!("{:.6}", self.position.lat()),
            longitude: format!("{:.6}", self.position.lng()),
        }
    }
}

/// The serialized form stored in the snapshot and sent to the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiRecord {
    pub uuid: PoiId,
    pub page: u32,
    pub title: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
}

/// Deterministic-within-a-session id minting.
///
/// A UUIDv4 session prefix plus a monotonic counter. Lives on the model so
/// update logic never reaches for a clock or ambient randomness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSource {
    session: String,
    counter: u64,
}

impl IdSource {
    pub fn mint(&mut self) -> PoiId {
        self.counter += 1;
        PoiId::new(format!("{}-{}", self.session, self.counter))
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self {
            session: Uuid::new_v4().to_string(),
            counter: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn poi_at(lat: f64, lng: f64) -> Poi {
        Poi::placed_at(
            PoiId::new("p-1"),
            Coordinate::new(lat, lng).expect("valid coordinate"),
        )
    }

    #[test]
    fn record_serializes_six_decimal_strings() {
        let record = poi_at(43.4643, -80.5204).record(3);
        assert_eq!(record.latitude, "43.464300");
        assert_eq!(record.longitude, "-80.520400");
        assert_eq!(record.page, 3);
    }

    #[test]
    fn record_rounds_excess_precision() {
        let record = poi_at(1.23456789, -1.98765432).record(0);
        assert_eq!(record.latitude, "1.234568");
        assert_eq!(record.longitude, "-1.987654");
    }

    #[test]
    fn placed_poi_uses_placeholder_text() {
        let poi = poi_at(0.0, 0.0);
        assert_eq!(poi.title, "New POI");
        assert_eq!(poi.description, "Add a description");
    }

    #[test]
    fn record_json_shape_matches_wire_format() {
        let value = serde_json::to_value(poi_at(10.0, 20.0).record(7)).expect("serializes");
        assert_eq!(value["uuid"], "p-1");
        assert_eq!(value["page"], 7);
        assert_eq!(value["latitude"], "10.000000");
        assert_eq!(value["longitude"], "20.000000");
    }

    #[test]
    fn id_source_is_monotonic_and_unique() {
        let mut ids = IdSource::default();
        let a = ids.mint();
        let b = ids.mint();
        assert_ne!(a, b);
        assert!(a.as_str().len() > 36);
    }

    #[test]
    fn id_sources_differ_across_sessions() {
        let a = IdSource::default().mint();
        let b = IdSource::default().mint();
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn coordinates_round_trip_within_precision(
            lat in -90.0f64..=90.0,
            lng in -180.0f64..=180.0,
        ) {
            let record = Poi::placed_at(
                PoiId::new("p"),
                Coordinate::new(lat, lng).expect("in range"),
            )
            .record(0);

            let lat_back: f64 = record.latitude.parse().expect("parses");
            let lng_back: f64 = record.longitude.parse().expect("parses");
            prop_assert!((lat_back - lat).abs() < 5e-7);
            prop_assert!((lng_back - lng).abs() < 5e-7);
        }

        #[test]
        fn identical_state_serializes_identically(
            lat in -90.0f64..=90.0,
            lng in -180.0f64..=180.0,
            page in 0u32..10_000,
        ) {
            let coordinate = Coordinate::new(lat, lng).expect("in range");
            let a = Poi::placed_at(PoiId::new("p"), coordinate).record(page);
            let b = Poi::placed_at(PoiId::new("p"), coordinate).record(page);
            prop_assert_eq!(a, b);
        }
    }
}

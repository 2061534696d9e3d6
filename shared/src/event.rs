use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::TimerOutput;
use crate::poi::PoiRecord;
use crate::store::StoreOutcome;

// --- CSRF token: redacts Debug so it never leaks into logs ---

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(PoiId);

// --- Coordinate: validated, NaN-safe ---

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid coordinate: lat={0}, lng={1}")]
    InvalidCoordinate(f64, f64),
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite()
            || !lng.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Err(ValidationError::InvalidCoordinate(lat, lng));
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

// Bitwise equality: coordinates are always finite here, and the sync diff
// must not treat byte-identical values as a change.
impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lng.to_bits() == other.lng.to_bits()
    }
}

impl Eq for Coordinate {}

// --- Event enum ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Shell-driven
    Started {
        api_root: String,
        path: String,
        csrf: CsrfToken,
    },
    MapClicked {
        latitude: f64,
        longitude: f64,
    },
    FieldsEdited {
        id: PoiId,
        title: String,
        description: String,
    },
    MoveRequested {
        id: PoiId,
    },
    DeleteRequested {
        id: PoiId,
    },
    EditModeToggled,

    // Capability responses
    SyncDue(TimerOutput),
    LoadCompleted(StoreOutcome),
    UpsertCompleted {
        id: PoiId,
        record: PoiRecord,
        outcome: StoreOutcome,
    },
    DeleteCompleted {
        id: PoiId,
        outcome: StoreOutcome,
    },
}

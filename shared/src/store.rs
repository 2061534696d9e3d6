use serde::{Deserialize, Deserializer, Serialize};
use tracing::error;
use url::Url;

use crate::capabilities::AppHttp;
use crate::event::{CsrfToken, Event, PoiId};
use crate::poi::PoiRecord;

/// Page context key: the first run of digits anywhere in the path.
/// Missing or unparseable digits fall back to page 0.
pub fn page_from_path(path: &str) -> u32 {
    path.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid API root {root:?}: {source}")]
    InvalidRoot {
        root: String,
        source: url::ParseError,
    },
}

/// Completion of a store request, normalized so events stay serializable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreOutcome {
    Response { status: u16, body: Vec<u8> },
    TransportError { message: String },
}

impl StoreOutcome {
    fn from_result(result: crux_http::Result<crux_http::Response<Vec<u8>>>) -> Self {
        match result {
            Ok(mut response) => Self::Response {
                status: u16::from(response.status()),
                body: response.take_body().unwrap_or_default(),
            },
            Err(err) => Self::TransportError {
                message: err.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Response { status, .. } if (200..300).contains(status))
    }
}

/// HTTP adapter for one page of the POI collection.
///
/// All requests are scoped to the page parsed at startup and carry the
/// anti-forgery token the shell handed over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteStore {
    root: String,
    page: u32,
    csrf: CsrfToken,
}

impl RemoteStore {
    pub fn new(api_root: &str, page: u32, csrf: CsrfToken) -> Result<Self, StoreError> {
        let parsed = Url::parse(api_root).map_err(|source| StoreError::InvalidRoot {
            root: api_root.to_string(),
            source,
        })?;
        Ok(Self {
            root: parsed.as_str().trim_end_matches('/').to_string(),
            page,
            csrf,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    fn collection_url(&self) -> String {
        format!("{}/api/PointOfInterest/{}?format=json", self.root, self.page)
    }

    fn record_url(&self, id: &PoiId) -> String {
        format!("{}/api/PointOfInterest/{id}", self.root)
    }

    /// Fetch every record on this page.
    pub fn fetch_all(&self, http: &AppHttp) {
        http.get(self.collection_url())
            .header("X-CSRFToken", self.csrf.expose())
            .send(|result| Event::LoadCompleted(StoreOutcome::from_result(result)));
    }

    /// Create-or-update one record, keyed by its uuid.
    pub fn upsert(&self, http: &AppHttp, record: PoiRecord) {
        let builder = http
            .post(self.record_url(&record.uuid))
            .header("X-CSRFToken", self.csrf.expose());

        let builder = match builder.body_json(&UpsertEnvelope { poi: &record }) {
            Ok(builder) => builder,
            Err(err) => {
                error!(id = %record.uuid, %err, "failed to encode upsert body");
                return;
            }
        };

        let id = record.uuid.clone();
        builder.send(move |result| Event::UpsertCompleted {
            id,
            record,
            outcome: StoreOutcome::from_result(result),
        });
    }

    /// Delete one record by uuid.
    pub fn remove(&self, http: &AppHttp, id: PoiId) {
        let completed = id.clone();
        http.delete(self.record_url(&id))
            .header("X-CSRFToken", self.csrf.expose())
            .send(move |result| Event::DeleteCompleted {
                id: completed,
                outcome: StoreOutcome::from_result(result),
            });
    }
}

// --- Wire types ---

/// Upsert body envelope: `{"PoI": {...}}`.
#[derive(Serialize)]
pub struct UpsertEnvelope<'a> {
    #[serde(rename = "PoI")]
    pub poi: &'a PoiRecord,
}

/// List response envelope: `{"PointsOfInterest": [...]}`.
#[derive(Debug, Deserialize)]
pub struct PoiListing {
    #[serde(rename = "PointsOfInterest")]
    pub points_of_interest: Vec<RemotePoi>,
}

/// One record as the backend returns it. Ids and coordinates arrive as
/// strings or numbers depending on the backend's serializer, so both are
/// accepted.
#[derive(Debug, Deserialize)]
pub struct RemotePoi {
    #[serde(deserialize_with = "string_or_number")]
    pub uuid: String,
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "f64_or_string")]
    pub latitude: f64,
    #[serde(deserialize_with = "f64_or_string")]
    pub longitude: f64,
}

fn f64_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(value) => value.to_string(),
        Raw::Text(text) => text,
    })
}

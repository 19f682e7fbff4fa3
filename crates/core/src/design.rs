use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::{DEFAULT_ITEM_COLOR, DEFAULT_ITEM_MATERIAL};
use crate::furniture::{generate_item_id, unix_millis, FurnitureItem, Xyz};
use crate::room::RoomSpecs;
use crate::session::EditorSession;

pub const DEFAULT_DESIGN_NAME: &str = "New Design";
const UNKNOWN_KIND: &str = "unknown";

/// A design as persisted. Deserializing goes through [`DesignRecord`], so every
/// loaded document is already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DesignRecord")]
pub struct DesignDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub room_specs: RoomSpecs,
    pub furniture: Vec<FurnitureItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// Raw document shape accepted on load; every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignRecord {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub room_specs: Option<RoomSpecs>,
    pub furniture: Option<Vec<FurnitureRecord>>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PartialXyz {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FurnitureRecord {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub model_id: Option<String>,
    pub position: Option<PartialXyz>,
    pub rotation: Option<PartialXyz>,
    pub scale: Option<PartialXyz>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub shaded: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSummary {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "lastModified")]
    pub updated_at: Option<String>,
}

impl From<DesignRecord> for DesignDocument {
    fn from(record: DesignRecord) -> Self {
        normalize_document(record)
    }
}

impl DesignDocument {
    pub fn summary(&self) -> Option<DesignSummary> {
        Some(DesignSummary {
            id: self.id.clone()?,
            name: self.name.clone(),
            updated_at: self.last_modified.clone(),
        })
    }
}

// Missing, zero and non-finite components fall back; mirrors `value || fallback`.
fn component(value: Option<f32>, fallback: f32) -> f32 {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => fallback,
    }
}

fn xyz_or(partial: Option<PartialXyz>, fallback: f32) -> Xyz {
    let partial = partial.unwrap_or_default();
    Xyz::new(
        component(partial.x, fallback),
        component(partial.y, fallback),
        component(partial.z, fallback),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fills every absent field of a stored furniture record with its default.
/// `position.y` is clamped to the floor; zero scale components become 1.
pub fn normalize_record(record: FurnitureRecord) -> FurnitureItem {
    let kind = non_empty(record.kind).unwrap_or_else(|| UNKNOWN_KIND.to_string());
    let id = non_empty(record.id).unwrap_or_else(|| generate_item_id(&kind, |_| false));
    let model_id = non_empty(record.model_id).unwrap_or_else(|| kind.clone());
    let mut position = xyz_or(record.position, 0.0);
    position.y = position.y.max(0.0);
    FurnitureItem {
        id,
        model_id,
        position,
        rotation: xyz_or(record.rotation, 0.0),
        scale: xyz_or(record.scale, 1.0),
        color: non_empty(record.color).unwrap_or_else(|| DEFAULT_ITEM_COLOR.to_string()),
        material: non_empty(record.material).unwrap_or_else(|| DEFAULT_ITEM_MATERIAL.to_string()),
        shaded: record.shaded.unwrap_or(false),
        kind,
    }
}

pub fn normalize_document(record: DesignRecord) -> DesignDocument {
    let furniture = record
        .furniture
        .unwrap_or_default()
        .into_iter()
        .map(normalize_record)
        .collect();
    DesignDocument {
        id: non_empty(record.id),
        name: record.name.unwrap_or_default(),
        room_specs: record.room_specs.unwrap_or_default(),
        furniture,
        last_modified: record.last_modified,
    }
}

/// Snapshot of the session ready to be persisted under `name`.
pub fn document_from_session(session: &EditorSession, name: &str) -> DesignDocument {
    let furniture = session
        .items()
        .iter()
        .map(|item| {
            let mut item = item.clone();
            if item.model_id.is_empty() {
                item.model_id = item.kind.clone();
            }
            item
        })
        .collect();
    DesignDocument {
        id: session.design_id().map(str::to_string),
        name: name.to_string(),
        room_specs: session.room().clone(),
        furniture,
        last_modified: Some(iso_timestamp(unix_millis())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    /// The design has never been named; ask the user first.
    NeedsName,
    Create(DesignDocument),
    Update(String, DesignDocument),
}

/// Decides what a save should do. `name` is the answer from the naming prompt,
/// if one was shown.
pub fn save_request(session: &EditorSession, name: Option<&str>) -> SaveRequest {
    let prompted = name.map(str::trim);
    let stored = session.design_name().trim();
    let name = match prompted {
        Some(name) if !name.is_empty() => name,
        Some(_) if !stored.is_empty() => stored,
        Some(_) => DEFAULT_DESIGN_NAME,
        None => {
            if stored.is_empty() || session.design_id().is_none() {
                return SaveRequest::NeedsName;
            }
            stored
        }
    };
    let document = document_from_session(session, name);
    match session.design_id() {
        Some(id) => SaveRequest::Update(id.to_string(), document),
        None => SaveRequest::Create(document),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DesignError {
    NotFound(String),
    Io(String),
    Parse(String),
    Http { status: u16, message: String },
    Transport(String),
}

impl fmt::Display for DesignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignError::NotFound(id) => write!(f, "design {id} not found"),
            DesignError::Io(message) => write!(f, "design storage error: {message}"),
            DesignError::Parse(message) => write!(f, "invalid design data: {message}"),
            DesignError::Http { status, message } => write!(f, "server error {status}: {message}"),
            DesignError::Transport(message) => write!(f, "network error: {message}"),
        }
    }
}

impl std::error::Error for DesignError {}

/// Persistence collaborator for designs.
pub trait DesignStore {
    fn fetch(&self, id: &str) -> Result<DesignDocument, DesignError>;
    /// Stores a new design and returns it with its assigned id.
    fn create(&mut self, document: &DesignDocument) -> Result<DesignDocument, DesignError>;
    fn update(&mut self, id: &str, document: &DesignDocument) -> Result<(), DesignError>;
    fn delete(&mut self, id: &str) -> Result<(), DesignError>;
    fn list(&self) -> Result<Vec<DesignSummary>, DesignError>;
}

fn sort_summaries(summaries: &mut [DesignSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.name.cmp(&b.name)));
}

#[derive(Debug, Default)]
pub struct MemoryDesignStore {
    designs: BTreeMap<String, DesignDocument>,
}

impl MemoryDesignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DesignStore for MemoryDesignStore {
    fn fetch(&self, id: &str) -> Result<DesignDocument, DesignError> {
        self.designs
            .get(id)
            .cloned()
            .ok_or_else(|| DesignError::NotFound(id.to_string()))
    }

    fn create(&mut self, document: &DesignDocument) -> Result<DesignDocument, DesignError> {
        let id = generate_item_id("design", |candidate| self.designs.contains_key(candidate));
        let mut stored = document.clone();
        stored.id = Some(id.clone());
        self.designs.insert(id, stored.clone());
        Ok(stored)
    }

    fn update(&mut self, id: &str, document: &DesignDocument) -> Result<(), DesignError> {
        let slot = self
            .designs
            .get_mut(id)
            .ok_or_else(|| DesignError::NotFound(id.to_string()))?;
        *slot = document.clone();
        slot.id = Some(id.to_string());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), DesignError> {
        self.designs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DesignError::NotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<DesignSummary>, DesignError> {
        let mut summaries: Vec<_> = self.designs.values().filter_map(DesignDocument::summary).collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }
}

/// One pretty-printed JSON file per design, named `<id>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryDesignStore {
    root: PathBuf,
}

impl DirectoryDesignStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, DesignError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DesignError::NotFound(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }

    fn write(&self, path: &Path, document: &DesignDocument) -> Result<(), DesignError> {
        std::fs::create_dir_all(&self.root)
            .map_err(|err| DesignError::Io(format!("{}: {err}", self.root.display())))?;
        let data = serde_json::to_string_pretty(document)
            .map_err(|err| DesignError::Parse(err.to_string()))?;
        std::fs::write(path, data).map_err(|err| DesignError::Io(format!("{}: {err}", path.display())))
    }
}

pub fn read_design_file(path: &Path) -> Result<DesignDocument, DesignError> {
    let data = std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            DesignError::NotFound(path.display().to_string())
        } else {
            DesignError::Io(format!("{}: {err}", path.display()))
        }
    })?;
    serde_json::from_str(&data).map_err(|err| DesignError::Parse(format!("{}: {err}", path.display())))
}

impl DesignStore for DirectoryDesignStore {
    fn fetch(&self, id: &str) -> Result<DesignDocument, DesignError> {
        let mut document = read_design_file(&self.path_for(id)?).map_err(|err| match err {
            DesignError::NotFound(_) => DesignError::NotFound(id.to_string()),
            other => other,
        })?;
        document.id = Some(id.to_string());
        Ok(document)
    }

    fn create(&mut self, document: &DesignDocument) -> Result<DesignDocument, DesignError> {
        let id = generate_item_id("design", |candidate| {
            self.path_for(candidate).map(|path| path.exists()).unwrap_or(true)
        });
        let mut stored = document.clone();
        stored.id = Some(id.clone());
        self.write(&self.path_for(&id)?, &stored)?;
        tracing::info!("design {} written to {}", id, self.root.display());
        Ok(stored)
    }

    fn update(&mut self, id: &str, document: &DesignDocument) -> Result<(), DesignError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(DesignError::NotFound(id.to_string()));
        }
        let mut stored = document.clone();
        stored.id = Some(id.to_string());
        self.write(&path, &stored)
    }

    fn delete(&mut self, id: &str) -> Result<(), DesignError> {
        let path = self.path_for(id)?;
        std::fs::remove_file(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                DesignError::NotFound(id.to_string())
            } else {
                DesignError::Io(format!("{}: {err}", path.display()))
            }
        })
    }

    fn list(&self) -> Result<Vec<DesignSummary>, DesignError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(DesignError::Io(format!("{}: {err}", self.root.display()))),
        };
        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match read_design_file(&path) {
                Ok(document) => summaries.push(DesignSummary {
                    id: id.to_string(),
                    name: document.name,
                    updated_at: document.last_modified,
                }),
                Err(err) => tracing::warn!("skipping unreadable design {}: {}", path.display(), err),
            }
        }
        sort_summaries(&mut summaries);
        Ok(summaries)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpDesignStore;

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use std::time::Duration;

    use super::{DesignDocument, DesignError, DesignStore, DesignSummary};

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    /// REST client for `/api/designs`.
    pub struct HttpDesignStore {
        agent: ureq::Agent,
        base_url: String,
        token: Option<String>,
    }

    impl HttpDesignStore {
        pub fn new(base_url: &str, token: Option<String>) -> Self {
            let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
            Self {
                agent,
                base_url: base_url.trim_end_matches('/').to_string(),
                token,
            }
        }

        fn url(&self, id: Option<&str>) -> String {
            match id {
                Some(id) => format!("{}/api/designs/{}", self.base_url, id),
                None => format!("{}/api/designs", self.base_url),
            }
        }

        fn request(&self, method: &str, url: &str) -> ureq::Request {
            let request = self.agent.request(method, url);
            match &self.token {
                Some(token) => request.set("Authorization", &format!("Bearer {token}")),
                None => request,
            }
        }
    }

    fn map_error(err: ureq::Error) -> DesignError {
        match err {
            ureq::Error::Status(404, response) => {
                DesignError::NotFound(response.get_url().to_string())
            }
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                let message = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|value| value.get("message")?.as_str().map(str::to_string))
                    .unwrap_or(body);
                DesignError::Http { status, message }
            }
            ureq::Error::Transport(transport) => DesignError::Transport(transport.to_string()),
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<T, DesignError> {
        response
            .into_json()
            .map_err(|err| DesignError::Parse(err.to_string()))
    }

    impl DesignStore for HttpDesignStore {
        fn fetch(&self, id: &str) -> Result<DesignDocument, DesignError> {
            let response = self
                .request("GET", &self.url(Some(id)))
                .call()
                .map_err(map_error)?;
            parse(response)
        }

        fn create(&mut self, document: &DesignDocument) -> Result<DesignDocument, DesignError> {
            let response = self
                .request("POST", &self.url(None))
                .send_json(document)
                .map_err(map_error)?;
            let mut created: DesignDocument = parse(response)?;
            if created.id.is_none() {
                return Err(DesignError::Parse("created design has no id".to_string()));
            }
            if created.name.is_empty() {
                created.name = document.name.clone();
            }
            Ok(created)
        }

        fn update(&mut self, id: &str, document: &DesignDocument) -> Result<(), DesignError> {
            self.request("PUT", &self.url(Some(id)))
                .send_json(document)
                .map_err(map_error)?;
            Ok(())
        }

        fn delete(&mut self, id: &str) -> Result<(), DesignError> {
            self.request("DELETE", &self.url(Some(id)))
                .call()
                .map_err(map_error)?;
            Ok(())
        }

        fn list(&self) -> Result<Vec<DesignSummary>, DesignError> {
            let response = self.request("GET", &self.url(None)).call().map_err(map_error)?;
            parse(response)
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ` for a unix timestamp in milliseconds.
pub fn iso_timestamp(millis: u128) -> String {
    let total_secs = (millis / 1000) as i64;
    let ms = (millis % 1000) as u32;
    let days = total_secs.div_euclid(86_400);
    let secs_of_day = total_secs.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{ms:03}Z",
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60
    )
}

// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rotation_defaults_to_zero() {
        let doc: DesignDocument = serde_json::from_str(
            r#"{"name":"d","roomSpecs":{"width":5,"length":5,"height":3},
                "furniture":[{"id":"a","type":"sofa","position":{"x":1,"y":0,"z":2},
                              "scale":{"x":1,"y":1,"z":1}}]}"#,
        )
        .expect("parse");
        let item = &doc.furniture[0];
        assert_eq!(item.rotation, Xyz::ZERO);
        assert_eq!(item.position, Xyz::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn record_normalization_fills_defaults() {
        let item = normalize_record(FurnitureRecord {
            kind: Some("lamp1".to_string()),
            position: Some(PartialXyz {
                x: Some(0.5),
                y: Some(-2.0),
                z: None,
            }),
            scale: Some(PartialXyz {
                x: Some(0.0),
                y: Some(2.0),
                z: None,
            }),
            ..FurnitureRecord::default()
        });
        assert!(item.id.starts_with("lamp1-"));
        assert_eq!(item.model_id, "lamp1");
        assert_eq!(item.position, Xyz::new(0.5, 0.0, 0.0));
        assert_eq!(item.scale, Xyz::new(1.0, 2.0, 1.0));
        assert_eq!(item.color, DEFAULT_ITEM_COLOR);
        assert_eq!(item.material, DEFAULT_ITEM_MATERIAL);
        assert!(!item.shaded);
    }

    #[test]
    fn mongo_style_id_is_accepted() {
        let doc: DesignDocument =
            serde_json::from_str(r#"{"_id":"abc123","name":"Lounge","furniture":[]}"#).expect("parse");
        assert_eq!(doc.id.as_deref(), Some("abc123"));
        assert_eq!(doc.room_specs, RoomSpecs::default());
    }

    #[test]
    fn normalized_items_round_trip_losslessly() {
        let json = r##"{"name":"n","roomSpecs":{"width":4,"length":3,"height":2.5},"furniture":[
            {"id":"x","type":"sofa1","modelId":"sofa1","position":{"x":1.5,"y":0.25,"z":-1},
             "rotation":{"x":0,"y":0.3927,"z":0},"scale":{"x":1.2,"y":1.2,"z":1.2},
             "color":"#112233","material":"fabric","shaded":true}]}"##;
        let first: DesignDocument = serde_json::from_str(json).expect("parse");
        let saved = serde_json::to_string(&first).expect("save");
        let second: DesignDocument = serde_json::from_str(&saved).expect("reparse");
        assert_eq!(first, second);
        assert_eq!(second.furniture[0].material, "fabric");
    }

    #[test]
    fn memory_store_crud() {
        let mut store = MemoryDesignStore::new();
        let doc = DesignDocument {
            id: None,
            name: "Studio".to_string(),
            room_specs: RoomSpecs::default(),
            furniture: Vec::new(),
            last_modified: Some(iso_timestamp(0)),
        };
        let created = store.create(&doc).expect("create");
        let id = created.id.clone().expect("id");
        assert_eq!(store.fetch(&id).expect("fetch").name, "Studio");
        let mut renamed = created.clone();
        renamed.name = "Loft".to_string();
        store.update(&id, &renamed).expect("update");
        assert_eq!(store.list().expect("list")[0].name, "Loft");
        store.delete(&id).expect("delete");
        assert_eq!(store.fetch(&id), Err(DesignError::NotFound(id)));
    }

    #[test]
    fn directory_store_rejects_path_like_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DirectoryDesignStore::new(dir.path());
        assert!(matches!(store.fetch("../etc"), Err(DesignError::NotFound(_))));
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn timestamps_format_as_iso() {
        assert_eq!(iso_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso_timestamp(951_782_400_123), "2000-02-29T00:00:00.123Z");
    }

    #[test]
    fn save_requires_name_for_new_designs() {
        let session = EditorSession::new(RoomSpecs::default());
        assert_eq!(save_request(&session, None), SaveRequest::NeedsName);
        match save_request(&session, Some("  ")) {
            SaveRequest::Create(doc) => assert_eq!(doc.name, DEFAULT_DESIGN_NAME),
            other => panic!("unexpected {other:?}"),
        }
    }
}

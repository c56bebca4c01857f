//! Viewpoint capture, sharing and bookmarks
//!
//! A viewpoint is the camera position, its look angles, the orbit target
//! (orbit mode only) and the navigation mode. It travels as a compact token
//!
//! ```text
//! cam:x,y,z|rx,ry,rz|tx,ty,tz|mode
//! ```
//!
//! with `null` in place of the target in first-person mode. The token is
//! embedded base64-encoded in `#view=` URL fragments and verbatim in
//! clipboard text. Named bookmarks are stored as one JSON map in a
//! key/value store.
//!
//! Nothing here fails past the persistence boundary: malformed input is
//! logged and treated as absent, and store or clipboard failures come back
//! as `false`.

use crate::camera::Camera;
use crate::navigation::{NavigationMode, NavigationModeController};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use lidarview_core::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::warn;

/// Storage key of the bookmark map
pub const BOOKMARKS_KEY: &str = "lidar-bookmarks";

/// URL fragment prefix carrying an encoded viewpoint
pub const URL_FRAGMENT_PREFIX: &str = "#view=";

const TOKEN_PREFIX: &str = "cam:";

/// Failures inside the persistence boundary
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Malformed viewpoint: {0}")]
    Malformed(String),

    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bookmark name cannot be empty")]
    EmptyName,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A saved camera state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewpoint {
    pub position: Point3d,
    /// Look angles, see [`Camera::rotation`]
    pub rotation: Vector3d,
    /// Orbit pivot; `None` in first-person mode
    pub target: Option<Point3d>,
    #[serde(rename = "controlMode")]
    pub mode: NavigationMode,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

impl Viewpoint {
    /// Capture the current camera state
    pub fn capture(camera: &Camera, navigation: &NavigationModeController) -> Self {
        let mode = navigation.mode();
        Self {
            position: camera.position,
            rotation: camera.rotation(),
            target: (mode == NavigationMode::Orbit).then_some(camera.target),
            mode,
            timestamp: now_millis(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Put the camera back: mode first, then position and orientation
    pub fn restore(&self, camera: &mut Camera, navigation: &mut NavigationModeController) {
        navigation.switch_to(self.mode, camera);
        camera.position = self.position;
        match (self.mode, self.target) {
            (NavigationMode::Orbit, Some(target)) => camera.look_at(target),
            _ => camera.set_rotation(&self.rotation),
        }
    }

    /// Compact token form
    pub fn to_compact(&self) -> String {
        let p = &self.position;
        let r = &self.rotation;
        let target = match &self.target {
            Some(t) => format!("{:.1},{:.1},{:.1}", t.x, t.y, t.z),
            None => "null".to_string(),
        };
        format!(
            "{TOKEN_PREFIX}{:.1},{:.1},{:.1}|{:.3},{:.3},{:.3}|{target}|{}",
            p.x, p.y, p.z, r.x, r.y, r.z, self.mode
        )
    }

    /// Parse a compact token
    pub fn parse_compact(token: &str) -> Result<Self, StoreError> {
        let body = token.trim();
        let body = body.strip_prefix(TOKEN_PREFIX).unwrap_or(body);
        let parts: Vec<&str> = body.split('|').collect();
        let [position, rotation, target, mode] = parts[..] else {
            return Err(StoreError::Malformed(format!("expected 4 fields, got {}", parts.len())));
        };

        let target = match target {
            "null" => None,
            t => Some(Point3d::from(parse_triple(t)?)),
        };
        let mode = mode
            .parse::<NavigationMode>()
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        Ok(Self {
            position: Point3d::from(parse_triple(position)?),
            rotation: parse_triple(rotation)?,
            target,
            mode,
            timestamp: now_millis(),
            name: None,
        })
    }

    /// Parse a compact token, treating anything malformed as absent
    pub fn from_compact(token: &str) -> Option<Self> {
        Self::parse_compact(token)
            .inspect_err(|e| warn!(error = %e, "Failed to deserialize viewpoint"))
            .ok()
    }

    /// `#view=<base64 token>`
    pub fn to_url_fragment(&self) -> String {
        format!("{URL_FRAGMENT_PREFIX}{}", BASE64.encode(self.to_compact()))
    }

    /// Read a viewpoint from a URL fragment; `None` unless it is a valid `#view=` fragment
    pub fn from_url_fragment(fragment: &str) -> Option<Self> {
        let encoded = fragment.strip_prefix(URL_FRAGMENT_PREFIX)?;
        let decoded = BASE64
            .decode(encoded)
            .map_err(StoreError::from)
            .and_then(|bytes| Ok(String::from_utf8(bytes)?));
        match decoded {
            Ok(token) => Self::from_compact(&token),
            Err(e) => {
                warn!(error = %e, "Failed to deserialize URL viewpoint");
                None
            }
        }
    }

    /// Shareable link: `base_url` followed by the fragment
    pub fn shareable_url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.to_url_fragment())
    }

    /// Clipboard form: the token, a blank line, then the shareable link
    pub fn clipboard_text(&self, base_url: &str) -> String {
        format!("{}\n\nShareable link: {}", self.to_compact(), self.shareable_url(base_url))
    }

    /// Read clipboard text written by [`Viewpoint::clipboard_text`] or a bare token
    pub fn from_clipboard_text(text: &str) -> Option<Self> {
        if !text.starts_with(TOKEN_PREFIX) {
            return None;
        }
        Self::from_compact(text.lines().next()?)
    }
}

fn parse_triple(field: &str) -> Result<Vector3d, StoreError> {
    let values = field
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::Malformed(format!("{field:?}: {e}")))?;
    match values[..] {
        [x, y, z] if values.iter().all(|v| v.is_finite()) => Ok(Vector3d::new(x, y, z)),
        _ => Err(StoreError::Malformed(format!("{field:?} is not three finite numbers"))),
    }
}

/// Durable string key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-process [`KeyValueStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// System clipboard access
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), StoreError>;
    fn read_text(&mut self) -> Result<String, StoreError>;
}

/// In-process [`Clipboard`]
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), StoreError> {
        self.text = Some(text.to_string());
        Ok(())
    }

    fn read_text(&mut self) -> Result<String, StoreError> {
        self.text
            .clone()
            .ok_or_else(|| StoreError::Unavailable("clipboard is empty".to_string()))
    }
}

/// Write a viewpoint to the clipboard. Returns false on failure.
pub fn copy_to_clipboard(clipboard: &mut dyn Clipboard, viewpoint: &Viewpoint, base_url: &str) -> bool {
    clipboard
        .write_text(&viewpoint.clipboard_text(base_url))
        .inspect_err(|e| warn!(error = %e, "Failed to copy to clipboard"))
        .is_ok()
}

/// Read a viewpoint from the clipboard, if it holds one
pub fn paste_from_clipboard(clipboard: &mut dyn Clipboard) -> Option<Viewpoint> {
    let text = clipboard
        .read_text()
        .inspect_err(|e| warn!(error = %e, "Failed to paste from clipboard"))
        .ok()?;
    Viewpoint::from_clipboard_text(&text)
}

/// Named viewpoints persisted under [`BOOKMARKS_KEY`]
#[derive(Debug)]
pub struct BookmarkStore<S> {
    store: S,
    bookmarks: BTreeMap<String, Viewpoint>,
}

impl<S: KeyValueStore> BookmarkStore<S> {
    /// Load bookmarks from `store`; unreadable data yields an empty set
    pub fn load(store: S) -> Self {
        let bookmarks = store
            .get(BOOKMARKS_KEY)
            .and_then(|raw| match raw {
                Some(json) => Ok(serde_json::from_str(&json)?),
                None => Ok(BTreeMap::new()),
            })
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load bookmarks");
                BTreeMap::new()
            });
        Self { store, bookmarks }
    }

    /// Save `viewpoint` as `name`, replacing any bookmark of that name.
    /// Blank names are rejected.
    pub fn save(&mut self, name: &str, viewpoint: Viewpoint) -> bool {
        if name.trim().is_empty() {
            warn!("{}", StoreError::EmptyName);
            return false;
        }
        self.bookmarks
            .insert(name.to_string(), viewpoint.with_name(name));
        self.persist()
    }

    pub fn delete(&mut self, name: &str) -> bool {
        if self.bookmarks.remove(name).is_none() {
            return false;
        }
        self.persist()
    }

    pub fn get(&self, name: &str) -> Option<&Viewpoint> {
        self.bookmarks.get(name)
    }

    /// Bookmark names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bookmarks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> bool {
        let result = serde_json::to_string(&self.bookmarks)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(BOOKMARKS_KEY, json));
        result
            .inspect_err(|e| warn!(error = %e, "Failed to persist bookmarks"))
            .is_ok()
    }
}

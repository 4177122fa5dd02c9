//! Credential entries and their access history.
//!
//! Entries are decoded permissively: missing or `null` text fields become
//! empty strings, and keys we do not know about are carried through
//! untouched so a round-trip never drops data the user typed.
//!
//! Access history exists in two on-disk shapes.  Older files carry a flat
//! `last_accessed_utc` / `device_last_accessed` pair; newer ones carry an
//! `accessed` list of single-key `{device: timestamp}` maps, newest first.
//! `AccessHistory` models both and converts to the list form the first
//! time an entry is touched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{Result, VaultError};

/// Device name used when a legacy record has a timestamp but no device.
const UNKNOWN_DEVICE: &str = "unknown";

/// One access event: which device opened the entry, and when.
///
/// Serialized as a single-key map, e.g. `{"laptop": "2024-05-01T10:00:00Z"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub device: String,
    pub at: DateTime<Utc>,
}

impl Serialize for AccessRecord {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.device, &self.at)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for AccessRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = BTreeMap::<String, DateTime<Utc>>::deserialize(deserializer)?;
        let mut records = map.into_iter();
        match (records.next(), records.next()) {
            (Some((device, at)), None) => Ok(Self { device, at }),
            _ => Err(serde::de::Error::custom(
                "access record must contain exactly one device",
            )),
        }
    }
}

/// Where and when an entry was last opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessHistory {
    /// Flat fields written by older versions.
    Legacy {
        last_accessed_utc: Option<DateTime<Utc>>,
        device: Option<String>,
    },
    /// Most-recent-first list of access records.
    Modern(Vec<AccessRecord>),
}

impl Default for AccessHistory {
    fn default() -> Self {
        Self::Modern(Vec::new())
    }
}

impl AccessHistory {
    /// Convert legacy fields into the list form in place.  A no-op for
    /// histories that are already modern.
    pub fn migrate(&mut self) {
        if let Self::Legacy {
            last_accessed_utc,
            device,
        } = self
        {
            let records = match last_accessed_utc.take() {
                Some(at) => vec![AccessRecord {
                    device: device.take().unwrap_or_else(|| UNKNOWN_DEVICE.to_string()),
                    at,
                }],
                None => Vec::new(),
            };
            *self = Self::Modern(records);
        }
    }

    /// Prepend an access record, migrating legacy fields first.
    pub fn record(&mut self, device: &str, at: DateTime<Utc>) {
        self.migrate();
        if let Self::Modern(records) = self {
            records.insert(
                0,
                AccessRecord {
                    device: device.to_string(),
                    at,
                },
            );
        }
    }

    /// The most recent access, in either shape.
    pub fn latest(&self) -> Option<(&str, DateTime<Utc>)> {
        match self {
            Self::Legacy {
                last_accessed_utc: Some(at),
                device,
            } => Some((device.as_deref().unwrap_or(UNKNOWN_DEVICE), *at)),
            Self::Legacy { .. } => None,
            Self::Modern(records) => records.first().map(|r| (r.device.as_str(), r.at)),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }

    /// Modern records, or an empty slice for legacy histories.
    pub fn records(&self) -> &[AccessRecord] {
        match self {
            Self::Modern(records) => records,
            Self::Legacy { .. } => &[],
        }
    }
}

/// A single credential record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct Entry {
    pub title: String,
    pub username: String,
    pub password: String,
    pub notes: String,
    pub last_changed_utc: Option<DateTime<Utc>>,
    pub access: AccessHistory,
    /// Any other keys present in the stored JSON object.
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Check the write-time invariant: a non-blank title, and at least
    /// one of username or notes.  The password is deliberately optional.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(VaultError::InvalidEntry("entry must have a title".into()));
        }
        if self.username.is_empty() && self.notes.is_empty() {
            return Err(VaultError::InvalidEntry(
                "entry must contain a username or notes".into(),
            ));
        }
        Ok(())
    }

    /// Case-insensitive substring match against the title.
    pub fn title_matches(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(&term.to_lowercase())
    }

    /// Record that `device` opened this entry at `at`.
    pub fn record_access(&mut self, device: &str, at: DateTime<Utc>) {
        self.access.record(device, at);
    }

    /// Title for display, with a placeholder for untitled legacy entries.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "<no title>"
        } else {
            &self.title
        }
    }
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct RawEntry {
    #[serde(default, deserialize_with = "nullable_string")]
    title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    username: String,
    #[serde(default, deserialize_with = "nullable_string")]
    password: String,
    #[serde(default, deserialize_with = "nullable_string")]
    notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_changed_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accessed: Option<Vec<AccessRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_accessed_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_last_accessed: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Text fields accept any JSON value.  `null` becomes empty, strings are
/// taken as-is and anything else (`"password": 1234`) keeps its JSON text.
fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl From<RawEntry> for Entry {
    fn from(raw: RawEntry) -> Self {
        let legacy_present = raw.last_accessed_utc.is_some() || raw.device_last_accessed.is_some();

        let access = match raw.accessed {
            Some(mut records) => {
                // Both shapes present: keep the list and fold the flat pair
                // in once, unless it is already recorded.
                if let Some(at) = raw.last_accessed_utc {
                    let device = raw
                        .device_last_accessed
                        .unwrap_or_else(|| UNKNOWN_DEVICE.to_string());
                    if !records.iter().any(|r| r.at == at && r.device == device) {
                        records.push(AccessRecord { device, at });
                        records.sort_by(|a, b| b.at.cmp(&a.at));
                    }
                }
                AccessHistory::Modern(records)
            }
            None if legacy_present => AccessHistory::Legacy {
                last_accessed_utc: raw.last_accessed_utc,
                device: raw.device_last_accessed,
            },
            None => AccessHistory::default(),
        };

        Self {
            title: raw.title,
            username: raw.username,
            password: raw.password,
            notes: raw.notes,
            last_changed_utc: raw.last_changed_utc,
            access,
            extra: raw.extra,
        }
    }
}

impl From<Entry> for RawEntry {
    fn from(entry: Entry) -> Self {
        let (accessed, last_accessed_utc, device_last_accessed) = match entry.access {
            AccessHistory::Legacy {
                last_accessed_utc,
                device,
            } => (None, last_accessed_utc, device),
            AccessHistory::Modern(records) if records.is_empty() => (None, None, None),
            AccessHistory::Modern(records) => (Some(records), None, None),
        };

        Self {
            title: entry.title,
            username: entry.username,
            password: entry.password,
            notes: entry.notes,
            last_changed_utc: entry.last_changed_utc,
            accessed,
            last_accessed_utc,
            device_last_accessed,
            extra: entry.extra,
        }
    }
}

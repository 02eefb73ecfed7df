//! Saved playlist: a JSON array of track records and unresolved ids.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::track::{PersistedTrack, encode};

use super::model::{Entry, EntryKind};

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PersistedEntry {
    Placeholder { placeholder: bool, id: String },
    Track(PersistedTrack),
}

/// One saved entry, ready to be turned back into a playlist entry.
#[derive(Debug, PartialEq)]
pub(super) enum Restored {
    Track(PersistedTrack),
    /// Only the id survived; resolve it again.
    Pending(String),
}

pub(super) fn encode_entries(entries: &[Entry]) -> Result<Vec<u8>, serde_json::Error> {
    let records: Vec<PersistedEntry> = entries
        .iter()
        .map(|e| match &e.kind {
            EntryKind::Track(t) => PersistedEntry::Track(encode(t)),
            EntryKind::Placeholder(p) => PersistedEntry::Placeholder {
                placeholder: true,
                id: p.id.clone(),
            },
        })
        .collect();
    serde_json::to_vec(&records)
}

fn salvage_id(value: &Value) -> Option<String> {
    value
        .get("id")
        .or_else(|| value.get("video").and_then(|v| v.get("_id")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Parse saved state. Records that no longer parse are restored by id when
/// one can be found and dropped otherwise.
pub(super) fn decode_entries(bytes: &[u8]) -> Result<Vec<Restored>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_slice(bytes)?;

    Ok(values
        .into_iter()
        .filter_map(|value| match PersistedEntry::deserialize(&value) {
            Ok(PersistedEntry::Track(t)) => Some(Restored::Track(t)),
            Ok(PersistedEntry::Placeholder { id, .. }) => Some(Restored::Pending(id)),
            Err(e) => {
                let id = salvage_id(&value);
                log::warn!("unreadable saved entry ({e}); id: {id:?}");
                id.map(Restored::Pending)
            }
        })
        .collect())
}

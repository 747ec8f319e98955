//! Typed domain records decoded from envelope row-maps.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{EventError, EventResult};

/// One file row from the metadata store (`destinationTable == "Files"`).
///
/// Every field is optional; `path()` is the only derived accessor and
/// requires `name` to be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    #[serde(rename = "_id")]
    pub id: Option<i64>,
    pub ctime: Option<String>,
    pub encoding: Option<String>,
    pub hashsum: Option<String>,
    pub hashtype: Option<String>,
    pub mimetype: Option<String>,
    pub mtime: Option<String>,
    pub name: Option<String>,
    pub size: Option<u64>,
    pub subdir: Option<String>,
    pub suspense_date: Option<String>,
}

impl File {
    /// Relative path of the file: `subdir/name` when `subdir` is set,
    /// otherwise `name` alone. Fails when `name` is unset.
    pub fn path(&self) -> EventResult<PathBuf> {
        let name = self
            .name
            .as_deref()
            .ok_or(EventError::MissingField { field: "name" })?;
        Ok(match self.subdir.as_deref() {
            Some(subdir) => PathBuf::from(subdir).join(name),
            None => PathBuf::from(name),
        })
    }
}

/// Names of the per-field transaction rows, in the fixed scan order.
///
/// The leading `_id` is the remote-assigned identifier; the rest are the
/// attributes a submitter may populate.
pub const TRANSACTION_FIELDS: [&str; 7] = [
    "_id",
    "analytical_tool",
    "description",
    "instrument",
    "proposal",
    "submitter",
    "suspense_date",
];

/// The single transaction represented by an envelope, assembled from
/// `Transactions.<field>` rows. Values are kept as raw JSON since the
/// metadata store does not constrain their types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub id: Option<Value>,
    pub analytical_tool: Option<Value>,
    pub description: Option<Value>,
    pub instrument: Option<Value>,
    pub proposal: Option<Value>,
    pub submitter: Option<Value>,
    pub suspense_date: Option<Value>,
}

impl Transaction {
    pub(crate) fn field(&self, name: &str) -> Option<&Value> {
        match name {
            "_id" => self.id.as_ref(),
            "analytical_tool" => self.analytical_tool.as_ref(),
            "description" => self.description.as_ref(),
            "instrument" => self.instrument.as_ref(),
            "proposal" => self.proposal.as_ref(),
            "submitter" => self.submitter.as_ref(),
            "suspense_date" => self.suspense_date.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn set_field(&mut self, name: &str, value: Value) {
        match name {
            "_id" => self.id = Some(value),
            "analytical_tool" => self.analytical_tool = Some(value),
            "description" => self.description = Some(value),
            "instrument" => self.instrument = Some(value),
            "proposal" => self.proposal = Some(value),
            "submitter" => self.submitter = Some(value),
            "suspense_date" => self.suspense_date = Some(value),
            _ => {}
        }
    }

    /// Set non-identifier fields in scan order, paired with their names.
    pub fn set_fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        TRANSACTION_FIELDS
            .into_iter()
            .filter(|name| *name != "_id")
            .filter_map(|name| self.field(name).map(|value| (name, value)))
    }

    /// Clone of this transaction with the identifier cleared, suitable for
    /// submission to the remote (which assigns identifiers itself).
    pub fn without_id(&self) -> Transaction {
        Transaction {
            id: None,
            ..self.clone()
        }
    }
}

/// One `TransactionKeyValue` row. Keys are not unique within an envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionKeyValue {
    pub key: Option<String>,
    pub value: Option<Value>,
}

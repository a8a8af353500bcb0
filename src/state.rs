//! Correlation state linking an outgoing authentication request to its
//! eventual response.
//!
//! A [`State`] is written to a [`StateStore`] under its id before the request
//! leaves, and read back when the response arrives. Entries that never see a
//! response are removed by [`crate::sweep`].

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::clock::Clock;
use crate::error::{Result, StateError, StoreError};
use crate::id::{IdGenerator, UuidV4Generator};
use crate::store::StateStore;

/// Construction parameters for a [`State`].
///
/// Every field is optional: a missing or empty `id` is generated, and a
/// missing or non-positive `created` is taken from the clock. This is also the
/// shape a storage string decodes into.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StateArgs {
    pub id: Option<String>,
    /// `Some(Value::Null)` is an explicit null, `None` means absent.
    #[serde(deserialize_with = "deserialize_present")]
    pub data: Option<Value>,
    pub created: Option<i64>,
    pub request_type: Option<String>,
}

impl StateArgs {
    pub fn new(request_type: impl Into<String>) -> Self {
        Self {
            request_type: Some(request_type.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_created(mut self, created: i64) -> Self {
        self.created = Some(created);
        self
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// One pending correlation record. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    id: String,
    created: i64,
    request_type: Option<String>,
    data: Option<Value>,
}

impl State {
    pub fn new(args: StateArgs, clock: &dyn Clock) -> Self {
        Self::with_id_generator(args, clock, &UuidV4Generator)
    }

    pub fn with_id_generator(args: StateArgs, clock: &dyn Clock, ids: &dyn IdGenerator) -> Self {
        let id = match args.id {
            Some(id) if !id.is_empty() => id,
            _ => ids.generate(),
        };

        let created = match args.created {
            Some(created) if created > 0 => created,
            _ => clock.now(),
        };

        Self {
            id,
            created,
            request_type: args.request_type,
            data: args.data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time in epoch seconds.
    pub fn created(&self) -> i64 {
        self.created
    }

    pub fn request_type(&self) -> Option<&str> {
        self.request_type.as_deref()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// True when the state was created at or before `cutoff`.
    pub fn is_stale(&self, cutoff: i64) -> bool {
        self.created <= cutoff
    }

    /// Encode as a JSON object of `id`, `data`, `created` and `request_type`.
    /// Absent `data` and `request_type` are omitted.
    pub fn to_storage_string(&self) -> String {
        let mut fields = Map::new();
        fields.insert("id".into(), Value::String(self.id.clone()));
        if let Some(data) = &self.data {
            fields.insert("data".into(), data.clone());
        }
        fields.insert("created".into(), Value::from(self.created));
        if let Some(request_type) = &self.request_type {
            fields.insert("request_type".into(), Value::String(request_type.clone()));
        }
        Value::Object(fields).to_string()
    }

    /// Decode a storage string.
    ///
    /// `id` must be a string and `created` an integer; an object missing
    /// either is not a state. The remaining fields follow [`State::new`].
    pub fn from_storage_string(
        storage_string: &str,
        clock: &dyn Clock,
    ) -> std::result::Result<Self, StateError> {
        let value: Value = serde_json::from_str(storage_string).map_err(StateError::InvalidJson)?;
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(StateError::NotAnObject(json_kind(&other))),
        };
        for field in REQUIRED_FIELDS {
            if fields.get(field).is_none_or(Value::is_null) {
                return Err(StateError::MissingField(field));
            }
        }
        let args: StateArgs =
            serde_json::from_value(Value::Object(fields)).map_err(StateError::InvalidField)?;
        Ok(Self::new(args, clock))
    }

    /// Write this state to `store` under its own id.
    pub async fn save(&self, store: &dyn StateStore) -> std::result::Result<(), StoreError> {
        store.set(&self.id, self.to_storage_string()).await
    }

    /// Read the state stored under `id`, if any.
    pub async fn load(store: &dyn StateStore, id: &str, clock: &dyn Clock) -> Result<Option<Self>> {
        let Some(raw) = store.get(id).await? else {
            return Ok(None);
        };
        Ok(Some(Self::from_storage_string(&raw, clock)?))
    }
}

const REQUIRED_FIELDS: [&str; 2] = ["id", "created"];

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Logic wiring between placed items.
//!
//! Connections live inside an item's property map under `ItemConnections`,
//! as an array of `ItemConnectionData` structs. Each element names a target
//! item by GUID, the event that fires on the source, and the listener it
//! triggers on the target.

use serde_json::{Map, Value, json};

use crate::error::{CondoError, CondoResult};
use crate::property::ITEM_CONNECTIONS;
use crate::record::PropertyMap;

const ELEMENTS: &str = "/Array/value/Struct/value";

const ITEM: &str = "Item";
const EVENT: &str = "Event";
const LISTENER: &str = "Listener";
const DELAY: &str = "Delay";
const TYPED: [&str; 4] = [ITEM, EVENT, LISTENER, DELAY];

const GUID_LEAF: &str = "/Struct/value/Guid";
const NAME_LEAF: &str = "/Name/value";
const FLOAT_LEAF: &str = "/Float/value";

/// A single directed logic link from the owning item to `item_guid`.
///
/// A decoded connection remembers the element it came from. Encoding patches
/// only the values that changed, so an untouched connection encodes to the
/// exact element it was read from. Equality compares the link itself.
#[derive(Debug, Clone)]
pub struct ItemConnection {
    /// GUID of the target item.
    pub item_guid: String,
    /// Event name on the source item, e.g. `OnTriggered`.
    pub event: String,
    /// Listener name on the target item, e.g. `Toggle`.
    pub listener: String,
    /// Delay in seconds before the listener fires.
    pub delay: f64,
    /// Element fields this crate does not interpret, kept verbatim.
    pub extra: Map<String, Value>,
    source: Map<String, Value>,
}

impl ItemConnection {
    /// Create a connection with no delay.
    pub fn new(
        item_guid: impl Into<String>,
        event: impl Into<String>,
        listener: impl Into<String>,
    ) -> Self {
        Self {
            item_guid: item_guid.into(),
            event: event.into(),
            listener: listener.into(),
            delay: 0.0,
            extra: Map::new(),
            source: Map::new(),
        }
    }

    /// Set the delay in seconds.
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Decode one element of the connection array.
    pub fn from_value(value: &Value) -> CondoResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CondoError::InvalidConnection("element is not an object".into()))?;
        let item_guid = text_field(obj, ITEM, GUID_LEAF)?;
        let event = text_field(obj, EVENT, NAME_LEAF)?;
        let listener = text_field(obj, LISTENER, NAME_LEAF)?;
        let delay = match obj.get(DELAY) {
            Some(_) => field(obj, DELAY, FLOAT_LEAF)?
                .as_f64()
                .ok_or_else(|| CondoError::InvalidConnection(format!("{DELAY} is not a number")))?,
            None => 0.0,
        };

        let extra = obj
            .iter()
            .filter(|(k, _)| !TYPED.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            item_guid,
            event,
            listener,
            delay,
            extra,
            source: obj.clone(),
        })
    }

    /// Encode as one element of the connection array.
    pub fn to_value(&self) -> Value {
        let mut obj = self.source.clone();
        patch(&mut obj, ITEM, GUID_LEAF, json!(self.item_guid), || {
            json!({
                "Struct": {
                    "value": {"Guid": self.item_guid},
                    "struct_type": {"Struct": "Guid"},
                    "struct_id": "00000000-0000-0000-0000-000000000000"
                }
            })
        });
        patch(&mut obj, EVENT, NAME_LEAF, json!(self.event), || {
            json!({"Name": {"value": self.event}})
        });
        patch(&mut obj, LISTENER, NAME_LEAF, json!(self.listener), || {
            json!({"Name": {"value": self.listener}})
        });
        // A source element without a delay stays without one while the delay is zero.
        if obj.contains_key(DELAY) || self.source.is_empty() || self.delay != 0.0 {
            patch(&mut obj, DELAY, FLOAT_LEAF, json!(self.delay), || {
                json!({"Float": {"value": self.delay}})
            });
        }

        obj.retain(|k, _| TYPED.contains(&k.as_str()) || self.extra.contains_key(k));
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}

impl PartialEq for ItemConnection {
    fn eq(&self, other: &Self) -> bool {
        self.item_guid == other.item_guid
            && self.event == other.event
            && self.listener == other.listener
            && self.delay == other.delay
            && self.extra == other.extra
    }
}

/// Set the leaf under `obj[key]` to `value`, or insert a fresh envelope when
/// the key is absent. Numerically equal leaves are left as written.
fn patch(
    obj: &mut Map<String, Value>,
    key: &str,
    leaf: &str,
    value: Value,
    envelope: impl FnOnce() -> Value,
) {
    match obj.get_mut(key).and_then(|v| v.pointer_mut(leaf)) {
        Some(current) => {
            let unchanged = match (current.as_f64(), value.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => *current == value,
            };
            if !unchanged {
                *current = value;
            }
        }
        None => {
            obj.insert(key.to_string(), envelope());
        }
    }
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str, pointer: &str) -> CondoResult<&'a Value> {
    obj.get(key)
        .and_then(|v| v.pointer(pointer))
        .ok_or_else(|| CondoError::InvalidConnection(format!("missing {key}")))
}

fn text_field(obj: &Map<String, Value>, key: &str, pointer: &str) -> CondoResult<String> {
    field(obj, key, pointer)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CondoError::InvalidConnection(format!("{key} is not a string")))
}

/// The empty `ItemConnections` array envelope the converter expects.
pub fn empty_container() -> Value {
    json!({
        "Array": {
            "array_type": "StructProperty",
            "value": {
                "Struct": {
                    "_type": "ItemConnections",
                    "name": "StructProperty",
                    "struct_type": {"Struct": "ItemConnectionData"},
                    "id": "00000000-0000-0000-0000-000000000000",
                    "value": []
                }
            }
        }
    })
}

/// Make sure `props` holds a connection container and return its elements.
///
/// A container whose element path is not an array is replaced with an empty one.
pub(crate) fn ensure_elements(props: &mut PropertyMap) -> CondoResult<&mut Vec<Value>> {
    let entry = props
        .entry(ITEM_CONNECTIONS)
        .or_insert_with(empty_container);
    if !matches!(entry.pointer(ELEMENTS), Some(Value::Array(_))) {
        tracing::warn!("replacing malformed {ITEM_CONNECTIONS} container");
        *entry = empty_container();
    }
    match entry.pointer_mut(ELEMENTS) {
        Some(Value::Array(elements)) => Ok(elements),
        _ => Err(CondoError::InvalidConnection(format!(
            "{ITEM_CONNECTIONS} container has no element array"
        ))),
    }
}

/// Decode every element of an existing container.
pub(crate) fn decode_all(elements: &[Value]) -> CondoResult<Vec<ItemConnection>> {
    elements.iter().map(ItemConnection::from_value).collect()
}

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser};
use serde_json::{Map, Value};

use crate::vector::{Quaternion, Vector3};

/// Ordered property mapping as emitted by the converter.
///
/// Every value is wrapped in a per-field tag envelope such as
/// `{"Int": {"value": 3}}`; see [`crate::property`] for typed access.
pub type PropertyMap = Map<String, Value>;

const NAME: &str = "name";
const GUID: &str = "guid";
const PROPERTIES: &str = "properties";
const ROTATION: &str = "rotation";
const POSITION: &str = "position";
const SCALE: &str = "scale";

/// Where a record came from: its key order and the encoding of its
/// transform fields as read.
///
/// Written records follow the source key order, and a transform that was not
/// changed is written back exactly as read (so `{"x": 5}` stays an integer).
#[derive(Debug, Clone, Default)]
struct Source {
    keys: Vec<String>,
    transforms: Map<String, Value>,
}

impl Source {
    fn capture(map: &Map<String, Value>) -> Self {
        Self {
            keys: map.keys().cloned().collect(),
            transforms: [ROTATION, POSITION, SCALE]
                .into_iter()
                .filter_map(|k| Some((k.to_string(), map.get(k)?.clone())))
                .collect(),
        }
    }

    /// Encode a transform, reusing the source encoding when the value is unchanged.
    fn transform<T>(&self, key: &str, current: &T) -> serde_json::Result<Value>
    where
        T: Serialize + DeserializeOwned + PartialEq,
    {
        match self.transforms.get(key) {
            Some(raw) if serde_json::from_value::<T>(raw.clone()).is_ok_and(|v| v == *current) => {
                Ok(raw.clone())
            }
            _ => serde_json::to_value(current),
        }
    }

    /// Lay out `typed` and `extra` in source key order. Keys the source did
    /// not have follow, typed fields first.
    fn layout(
        &self,
        mut typed: Vec<(&'static str, Value)>,
        extra: &Map<String, Value>,
    ) -> Map<String, Value> {
        let mut out = Map::new();
        for key in &self.keys {
            if let Some(i) = typed.iter().position(|(k, _)| *k == key.as_str()) {
                out.insert(key.clone(), typed.remove(i).1);
            } else if let Some(value) = extra.get(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in typed {
            out.insert(key.to_string(), value);
        }
        for (key, value) in extra {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        out
    }
}

#[derive(Deserialize)]
struct ItemFields {
    name: String,
    #[serde(default)]
    guid: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
    #[serde(default)]
    properties: PropertyMap,
    rotation: Quaternion,
    position: Vector3,
    scale: Vector3,
}

/// One entry of the top-level `items` array: an object placed in the world.
///
/// Serializes in the key order it was read with. Equality ignores that order.
#[derive(Debug, Clone)]
pub struct ItemData {
    /// Item type name, e.g. `CanvasWedge`.
    pub name: String,
    /// Globally unique identifier of this placed object.
    pub guid: String,
    /// Converter fields this crate does not interpret, kept verbatim.
    pub extra: Map<String, Value>,
    /// Item-specific property mapping.
    pub properties: PropertyMap,
    /// World rotation.
    pub rotation: Quaternion,
    /// World position.
    pub position: Vector3,
    /// Local scale.
    pub scale: Vector3,
    source: Source,
}

impl ItemData {
    /// Create an item at the origin with identity rotation and unit scale.
    pub fn new(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid: guid.into(),
            extra: Map::new(),
            properties: PropertyMap::new(),
            rotation: Quaternion::default(),
            position: Vector3::default(),
            scale: Vector3::ONE,
            source: Source::default(),
        }
    }

    fn to_map(&self) -> serde_json::Result<Map<String, Value>> {
        let typed = vec![
            (NAME, Value::String(self.name.clone())),
            (GUID, Value::String(self.guid.clone())),
            (PROPERTIES, Value::Object(self.properties.clone())),
            (ROTATION, self.source.transform(ROTATION, &self.rotation)?),
            (POSITION, self.source.transform(POSITION, &self.position)?),
            (SCALE, self.source.transform(SCALE, &self.scale)?),
        ];
        Ok(self.source.layout(typed, &self.extra))
    }
}

impl PartialEq for ItemData {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.guid == other.guid
            && self.extra == other.extra
            && self.properties == other.properties
            && self.rotation == other.rotation
            && self.position == other.position
            && self.scale == other.scale
    }
}

impl Serialize for ItemData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map()
            .map_err(<S::Error as ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ItemData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::deserialize(deserializer)?;
        let source = Source::capture(&map);
        let fields: ItemFields =
            serde_json::from_value(Value::Object(map)).map_err(<D::Error as de::Error>::custom)?;
        Ok(Self {
            name: fields.name,
            guid: fields.guid,
            extra: fields.extra,
            properties: fields.properties,
            rotation: fields.rotation,
            position: fields.position,
            scale: fields.scale,
            source,
        })
    }
}

#[derive(Deserialize)]
struct PropertiesFields {
    name: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
    #[serde(default)]
    properties: PropertyMap,
}

/// One entry of the top-level `properties` array: gameplay configuration.
#[derive(Debug, Clone)]
pub struct PropertiesData {
    /// Instance name, `<ROOT>_C_<index>` for entries paired with an item.
    pub name: String,
    /// Converter fields this crate does not interpret, kept verbatim.
    pub extra: Map<String, Value>,
    /// Behaviour property mapping.
    pub properties: PropertyMap,
    source: Source,
}

impl PropertiesData {
    /// Create an empty properties section with the given instance name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
            properties: PropertyMap::new(),
            source: Source::default(),
        }
    }
}

impl PartialEq for PropertiesData {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.extra == other.extra && self.properties == other.properties
    }
}

impl Serialize for PropertiesData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let typed = vec![
            (NAME, Value::String(self.name.clone())),
            (PROPERTIES, Value::Object(self.properties.clone())),
        ];
        self.source.layout(typed, &self.extra).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertiesData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::deserialize(deserializer)?;
        let source = Source::capture(&map);
        let fields: PropertiesFields =
            serde_json::from_value(Value::Object(map)).map_err(<D::Error as de::Error>::custom)?;
        Ok(Self {
            name: fields.name,
            extra: fields.extra,
            properties: fields.properties,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use serde_json::json;

    fn converter_item() -> Value {
        json!({
            "name": "Chair",
            "guid": "2c1b6a6e-0f0d-4d59-8a4a-5d8b0c1f7e11",
            "format_version": 1,
            "unreal_version": 522,
            "steam_item_id": 42,
            "properties": {"GroupID": {"Int": {"value": 2}}},
            "actors": [],
            "rotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0},
            "position": {"x": 5, "y": 0, "z": 0},
            "scale": {"x": 1.0, "y": 1.0, "z": 1.0}
        })
    }

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn unknown_item_fields_survive_roundtrip() {
        let raw = converter_item();
        let item: ItemData = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.extra.get("steam_item_id"), Some(&json!(42)));

        let written = serde_json::to_value(&item).unwrap();
        assert_eq!(keys(&written), keys(&raw));
        assert_eq!(
            serde_json::to_string(&written).unwrap(),
            serde_json::to_string(&raw).unwrap()
        );
    }

    #[test]
    fn integer_coordinates_stay_integers_until_changed() {
        let mut item: ItemData = serde_json::from_value(converter_item()).unwrap();
        let written = serde_json::to_value(&item).unwrap();
        assert_eq!(written["position"], json!({"x": 5, "y": 0, "z": 0}));
        assert!(written["position"]["x"].is_u64());

        item.position = DVec3::new(6.0, 0.0, 0.0).into();
        let written = serde_json::to_value(&item).unwrap();
        assert_eq!(written["position"]["x"].as_f64(), Some(6.0));
        assert_eq!(keys(&written), keys(&converter_item()));
    }

    #[test]
    fn new_item_uses_canonical_order() {
        let written = serde_json::to_value(ItemData::new("Chair", "g")).unwrap();
        assert_eq!(
            keys(&written),
            ["name", "guid", "properties", "rotation", "position", "scale"]
        );
    }

    #[test]
    fn equality_ignores_source_layout() {
        let loaded: ItemData = serde_json::from_value(converter_item()).unwrap();
        let mut built = ItemData::new("Chair", "2c1b6a6e-0f0d-4d59-8a4a-5d8b0c1f7e11");
        built.extra = loaded.extra.clone();
        built.properties = loaded.properties.clone();
        built.position = DVec3::new(5.0, 0.0, 0.0).into();
        assert_eq!(loaded, built);
    }

    #[test]
    fn properties_keep_source_order() {
        let raw = json!({"properties": {}, "name": "CondoWeather_C_0", "flags": 3});
        let props: PropertiesData = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(keys(&serde_json::to_value(&props).unwrap()), keys(&raw));
    }

    #[test]
    fn properties_without_mapping_default_to_empty() {
        let props: PropertiesData =
            serde_json::from_value(json!({"name": "CondoWeather_C_0"})).unwrap();
        assert!(props.properties.is_empty());
        assert_eq!(props.name, "CondoWeather_C_0");
    }
}

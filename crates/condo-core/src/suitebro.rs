use std::collections::{BTreeMap, HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::{Entity, EntityId};
use crate::error::{CondoError, CondoResult};
use crate::record::{ItemData, PropertiesData};
use crate::selection::Selection;

const ITEMS_KEY: &str = "items";
const PROPERTIES_KEY: &str = "properties";
const GROUPS_KEY: &str = "groups";

/// I/O, logic, volume, and game-world items. They can be placed in a condo
/// but never occupy a player inventory slot.
pub const NON_INVENTORY_ITEMS: &[&str] = &[
    "AmmoPickup",
    "CustomSpawnPoint",
    "HealthPickup",
    "SDNL_ArmorPickup",
    "GW_SDNLOddball",
    "GW_SDNLFlag",
    "GW_BallRaceFinish",
    "GW_BallRaceSpawn",
    "LaserBeam",
    "LeverBasic",
    "ButtonShapes",
    "PhysicsSlot",
    "WeaponPickupIO",
    "ButtonCanvas",
    "LocationVolumeIO",
    "DamageHealVolume",
    "BlockingVolume",
    "WaterVolume",
    "CommentVolume",
    "DialogueVolume",
    "GravityVolume",
    "ButtonVolume",
    "HitTargetVolume",
    "LadderVolume",
    "PlayerMovementVolume",
    "PostProcessVolume",
    "PushVolume",
    "SizeVolume",
    "SkyProcessVolume",
    "SpawnPointTagVolume",
    "TriggerVolume",
    "WeaponStripVolume",
    "TeleportVolume",
    "GameWorldEvents",
    "LaserBeamReciever",
    "Mover",
    "Counter",
    "LogicGateAnd",
    "SwitchBoolean",
    "LogicGateNot",
    "LogicGateOr",
    "LogicGateXor",
    "Random",
    "Relay",
    "Timer",
    "Toggle",
    "WorldControl",
    "LeverLightSwitch",
    "MoverAdvanced",
    "MoverPlayerSlide",
    "MoverTrain",
];

/// One entry of the derived `groups` summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// The group tag.
    pub group_id: i32,
    /// How many objects carry the tag.
    pub item_count: usize,
}

/// The two raw arrays a save is split into for the converter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitArrays {
    /// The `items` array, in save order.
    pub items: Vec<ItemData>,
    /// The `properties` array, in save order, with paired names re-indexed.
    pub properties: Vec<PropertiesData>,
}

/// Strip the `_C_<index>` suffix from a properties name.
///
/// Names without that suffix belong to metadata-only entries and have no root.
pub fn root_name(name: &str) -> Option<&str> {
    let (root, index) = name.rsplit_once("_C_")?;
    (!index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())).then_some(root)
}

/// Everything before the trailing `_<digits>` of a name, or the whole name.
fn strip_index(name: &str) -> &str {
    match name.rsplit_once('_') {
        Some((root, index)) if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
            root
        }
        _ => name,
    }
}

enum Step {
    ItemOnly,
    Paired,
    PropertiesOnly,
}

/// A decoded condo save: every object, plus passthrough metadata.
///
/// Objects keep their load order until the save is split again, at which
/// point they are sorted into the order the game expects.
#[derive(Debug, Clone, Default)]
pub struct Suitebro {
    meta: Map<String, Value>,
    objects: Vec<Entity>,
}

impl Suitebro {
    /// An empty save with the given passthrough metadata.
    pub fn new(meta: Map<String, Value>) -> Self {
        Self {
            meta,
            objects: Vec::new(),
        }
    }

    /// Decode the converter's JSON document.
    pub fn from_json(value: Value) -> CondoResult<Self> {
        let Value::Object(root) = value else {
            return Err(CondoError::MalformedDocument(
                "top level is not an object".into(),
            ));
        };

        let mut meta = Map::new();
        let mut items = None;
        let mut properties = None;
        for (key, value) in root {
            match key.as_str() {
                ITEMS_KEY => items = Some(value),
                PROPERTIES_KEY => properties = Some(value),
                _ => {
                    meta.insert(key, value);
                }
            }
        }

        let items: Vec<ItemData> = decode_array(ITEMS_KEY, items)?;
        let properties: Vec<PropertiesData> = decode_array(PROPERTIES_KEY, properties)?;
        Ok(Self::from_parts(items, properties, meta))
    }

    /// Merge the two raw arrays into entities.
    ///
    /// Both arrays list paired entries in the same relative order. The walk
    /// advances each side independently, choosing per step:
    /// an item with no properties counterpart, an item paired with the current
    /// properties entry, or a properties-only metadata entry.
    pub fn from_parts(
        items: Vec<ItemData>,
        properties: Vec<PropertiesData>,
        meta: Map<String, Value>,
    ) -> Self {
        let roots: HashSet<String> = properties
            .iter()
            .filter_map(|p| root_name(&p.name))
            .map(str::to_string)
            .collect();

        let mut objects = Vec::with_capacity(items.len() + properties.len());
        let mut items = items.into_iter().peekable();
        let mut props = properties.into_iter().peekable();

        loop {
            let step = match (items.peek(), props.peek()) {
                (None, None) => break,
                (Some(item), _) if !roots.contains(&item.name) => Step::ItemOnly,
                (Some(item), Some(prop)) if prop.name.starts_with(&item.name) => Step::Paired,
                (_, Some(_)) => Step::PropertiesOnly,
                // A rooted item whose properties entry is missing entirely.
                (Some(_), None) => Step::ItemOnly,
            };
            let entity = match step {
                Step::ItemOnly => items.next().map(Entity::from_item),
                Step::Paired => items
                    .next()
                    .zip(props.next())
                    .map(|(item, prop)| Entity::paired(item, prop)),
                Step::PropertiesOnly => props.next().map(Entity::from_properties),
            };
            objects.extend(entity);
        }

        tracing::debug!(
            objects = objects.len(),
            roots = roots.len(),
            "reconciled items and properties"
        );
        Self { meta, objects }
    }

    /// Passthrough metadata: every top-level key except `items` and `properties`.
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    // -----------------------------------------------------------------------
    // Object access
    // -----------------------------------------------------------------------

    /// All objects in their current order.
    pub fn objects(&self) -> &[Entity] {
        &self.objects
    }

    /// Iterate over all objects.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.objects.iter()
    }

    /// Iterate mutably over all objects.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.objects.iter_mut()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the save has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by handle.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.objects.iter().find(|o| o.id() == id)
    }

    /// Look up an object mutably by handle.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// Remove an object, keeping the order of the rest.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.objects.iter().position(|o| o.id() == id)?;
        Some(self.objects.remove(idx))
    }

    /// Append an object. Returns its handle.
    pub fn add_object(&mut self, obj: Entity) -> EntityId {
        let id = obj.id();
        self.objects.push(obj);
        id
    }

    /// Append several objects, keeping their order.
    pub fn add_objects(&mut self, objs: impl IntoIterator<Item = Entity>) {
        self.objects.extend(objs);
    }

    /// First object whose proper or custom name matches (case-insensitive).
    pub fn find_item(&self, name: &str) -> Option<&Entity> {
        self.objects.iter().find(|o| o.matches_name(name))
    }

    /// A selection of every object.
    pub fn select_all(&self) -> Selection<'_> {
        self.objects.iter().collect()
    }

    /// A selection of the objects with the given handles. Unknown handles are skipped.
    pub fn select(&self, ids: &[EntityId]) -> Selection<'_> {
        let wanted: HashSet<EntityId> = ids.iter().copied().collect();
        self.objects
            .iter()
            .filter(|o| wanted.contains(&o.id()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// The `groups` summary as last written.
    pub fn groups_meta(&self) -> CondoResult<Vec<GroupInfo>> {
        match self.meta.get(GROUPS_KEY) {
            Some(raw) => Ok(serde_json::from_value(raw.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// The highest group tag in use.
    pub fn max_group_id(&self) -> CondoResult<i32> {
        self.objects
            .iter()
            .filter_map(Entity::group_id)
            .max()
            .ok_or(CondoError::NoGroups)
    }

    /// Recompute the `groups` summary from the live group tags.
    pub fn update_groups_meta(&mut self) {
        let groups: Vec<GroupInfo> = self
            .select_all()
            .groups()
            .into_iter()
            .map(|(group_id, members)| GroupInfo {
                group_id,
                item_count: members.len(),
            })
            .collect();
        self.meta
            .insert(GROUPS_KEY.to_string(), serde_json::json!(groups));
    }

    /// Remove the group tag from the given objects.
    pub fn ungroup(&mut self, ids: &[EntityId]) {
        let wanted: HashSet<EntityId> = ids.iter().copied().collect();
        for obj in self.objects.iter_mut().filter(|o| wanted.contains(&o.id())) {
            obj.ungroup();
        }
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Objects that exist in the world.
    pub fn items(&self) -> Vec<&Entity> {
        self.objects.iter().filter(|o| o.item().is_some()).collect()
    }

    /// Objects that exist in the world and come from a player inventory.
    pub fn inventory_items(&self) -> Vec<&Entity> {
        self.objects
            .iter()
            .filter(|o| o.item().is_some() && !NON_INVENTORY_ITEMS.contains(&o.name()))
            .collect()
    }

    /// Count of world objects per item name.
    pub fn item_count(&self) -> BTreeMap<String, usize> {
        count_names(self.items())
    }

    /// Count of inventory objects per item name.
    pub fn inventory_count(&self) -> BTreeMap<String, usize> {
        count_names(self.inventory_items())
    }

    // -----------------------------------------------------------------------
    // Saving
    // -----------------------------------------------------------------------

    /// Sort into save order and split back into the two raw arrays.
    ///
    /// The groups summary is refreshed first. Properties entries paired with
    /// an item are renamed `<ROOT>_<n>`, numbering each root from zero in
    /// save order.
    pub fn split(&mut self) -> SplitArrays {
        self.update_groups_meta();
        self.objects.sort_by(Entity::save_order);

        let mut next_index: HashMap<String, usize> = HashMap::new();
        let mut out = SplitArrays::default();
        for obj in &mut self.objects {
            let paired = obj.item().is_some();
            if let Some(item) = obj.item() {
                out.items.push(item.clone());
            }
            if let Some(props) = obj.properties_mut() {
                if paired {
                    let root = strip_index(&props.name).to_string();
                    let index = next_index.entry(root.clone()).or_insert(0);
                    props.name = format!("{root}_{index}");
                    *index += 1;
                }
                out.properties.push(props.clone());
            }
        }
        out
    }

    /// Encode as the converter's JSON document.
    pub fn to_json(&mut self) -> CondoResult<Value> {
        let SplitArrays { items, properties } = self.split();
        let mut root = self.meta.clone();
        root.insert(ITEMS_KEY.to_string(), serde_json::to_value(items)?);
        root.insert(PROPERTIES_KEY.to_string(), serde_json::to_value(properties)?);
        Ok(Value::Object(root))
    }
}

fn decode_array<T: DeserializeOwned>(key: &str, raw: Option<Value>) -> CondoResult<Vec<T>> {
    let raw = raw.ok_or_else(|| CondoError::MalformedDocument(format!("missing \"{key}\" array")))?;
    serde_json::from_value(raw).map_err(|e| CondoError::MalformedDocument(format!("{key}: {e}")))
}

fn count_names<'a>(objs: impl IntoIterator<Item = &'a Entity>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for obj in objs {
        *counts.entry(obj.name().to_string()).or_insert(0) += 1;
    }
    counts
}

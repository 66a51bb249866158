//! Loading and saving whole documents.

use condo_core::{Entity, ItemConnection, PropertiesData, Suitebro};
use glam::DVec3;
use serde_json::{Value, json};

fn item(name: &str, guid: &str) -> Value {
    json!({
        "name": name,
        "guid": guid,
        "properties": {},
        "rotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0},
        "position": {"x": 0.0, "y": 0.0, "z": 0.0},
        "scale": {"x": 1.0, "y": 1.0, "z": 1.0}
    })
}

fn props(name: &str) -> Value {
    json!({"name": name, "properties": {}})
}

fn names(values: &Value) -> Vec<&str> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Merge on load
// ---------------------------------------------------------------------------

#[test]
fn merge_pairs_items_with_matching_properties() {
    let save = Suitebro::from_json(json!({
        "items": [item("Foo", "g-foo"), item("Bar", "g-bar")],
        "properties": [props("Foo_C_0"), props("Baz_C_0")],
    }))
    .unwrap();

    let objs = save.objects();
    assert_eq!(objs.len(), 3);
    assert_eq!(objs[0].name(), "Foo");
    assert_eq!(objs[0].properties().unwrap().name, "Foo_C_0");
    assert_eq!(objs[1].name(), "Bar");
    assert!(objs[1].properties().is_none());
    assert_eq!(objs[2].name(), "Baz_C_0");
    assert!(objs[2].item().is_none());
}

#[test]
fn metadata_without_index_suffix_stays_properties_only() {
    let save = Suitebro::from_json(json!({
        "items": [item("Chair", "g1")],
        "properties": [props("WorldSettings"), props("Chair_C_0")],
    }))
    .unwrap();
    assert_eq!(save.len(), 2);
    assert_eq!(save.objects()[0].name(), "WorldSettings");
    assert_eq!(save.objects()[1].properties().unwrap().name, "Chair_C_0");
}

// ---------------------------------------------------------------------------
// Split on save
// ---------------------------------------------------------------------------

#[test]
fn save_orders_metadata_then_items() {
    let mut save = Suitebro::from_json(json!({
        "items": [item("Table", "g1"), item("Chair", "g2")],
        "properties": [
            props("Ultra_Dynamic_Sky_C_0"),
            props("Aardvark_C_0"),
            props("CondoSettingsManager_C_0"),
            props("CondoWeather_C_0"),
            props("Table_C_0"),
        ],
    }))
    .unwrap();

    let doc = save.to_json().unwrap();
    assert_eq!(names(&doc["items"]), ["Chair", "Table"]);
    assert_eq!(
        names(&doc["properties"]),
        [
            "CondoWeather_C_0",
            "CondoSettingsManager_C_0",
            "Ultra_Dynamic_Sky_C_0",
            "Aardvark_C_0",
            "Table_C_0",
        ]
    );
}

#[test]
fn paired_properties_are_renumbered_per_root() {
    let mut save = Suitebro::default();
    for suffix in ["7", "3"] {
        save.add_object(Entity::paired(
            condo_core::ItemData::new("Lamp", condo_core::entity::new_guid()),
            PropertiesData::new(format!("Lamp_{suffix}")),
        ));
    }
    let doc = save.to_json().unwrap();
    assert_eq!(names(&doc["properties"]), ["Lamp_0", "Lamp_1"]);
}

#[test]
fn passthrough_keys_survive_in_order() {
    let mut save = Suitebro::from_json(json!({
        "header": {"magic": "SUITEBRO"},
        "items": [],
        "properties": [],
        "groups": [],
        "trailer": 7,
    }))
    .unwrap();
    let doc = save.to_json().unwrap();
    let keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["header", "groups", "trailer", "items", "properties"]);
    assert_eq!(doc["header"]["magic"], "SUITEBRO");
}

#[test]
fn unedited_items_are_written_as_read() {
    let chair = json!({
        "name": "Chair",
        "guid": "g1",
        "format_version": 1,
        "unreal_version": 522,
        "steam_item_id": 42,
        "properties": {},
        "actors": [],
        "rotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0},
        "position": {"x": 5, "y": 0, "z": 0},
        "scale": {"x": 1.0, "y": 1.0, "z": 1.0}
    });
    let mut save = Suitebro::from_json(json!({
        "items": [chair.clone()],
        "properties": [],
    }))
    .unwrap();
    let doc = save.to_json().unwrap();
    assert_eq!(
        serde_json::to_string(&doc["items"][0]).unwrap(),
        serde_json::to_string(&chair).unwrap()
    );
}

#[test]
fn group_metadata_is_rebuilt_on_save() {
    let mut save = Suitebro::from_json(json!({
        "items": [item("A", "g1"), item("B", "g2"), item("C", "g3")],
        "properties": [],
        "groups": [{"group_id": 40, "item_count": 9}],
    }))
    .unwrap();
    let ids: Vec<_> = save.iter().map(Entity::id).collect();
    save.get_mut(ids[0]).unwrap().set_group_id(3);
    save.get_mut(ids[2]).unwrap().set_group_id(3);
    save.get_mut(ids[1]).unwrap().set_group_id(1);

    let doc = save.to_json().unwrap();
    assert_eq!(
        doc["groups"],
        json!([
            {"group_id": 1, "item_count": 1},
            {"group_id": 3, "item_count": 2},
        ])
    );
    assert_eq!(save.max_group_id().unwrap(), 3);

    save.ungroup(&ids);
    assert!(save.max_group_id().is_err());
}

// ---------------------------------------------------------------------------
// Mirrored fields through a full cycle
// ---------------------------------------------------------------------------

#[test]
fn edits_survive_a_full_cycle() {
    let mut spawn_props = props("CustomSpawnPoint_C_0");
    spawn_props["properties"]["WorldScale"] =
        json!({"Struct": {"value": {"Vector": {"x": 1.0, "y": 1.0, "z": 1.0}}}});
    let mut save = Suitebro::from_json(json!({
        "items": [item("CustomSpawnPoint", "g-spawn"), item("Relay", "g-relay")],
        "properties": [spawn_props],
    }))
    .unwrap();

    let spawn = save.find_item("customspawnpoint").unwrap().id();
    let obj = save.get_mut(spawn).unwrap();
    obj.set_scale(DVec3::new(2.0, 1.0, 3.0));
    obj.add_connection(ItemConnection::new("g-relay", "OnTriggered", "Toggle"))
        .unwrap();

    let doc = save.to_json().unwrap();
    let mut reloaded = Suitebro::from_json(doc).unwrap();
    let spawn = reloaded.find_item("CustomSpawnPoint").unwrap().id();
    let obj = reloaded.get_mut(spawn).unwrap();

    assert_eq!(obj.world_scale(), Some(DVec3::new(2.0, 1.0, 3.0)));
    assert_eq!(obj.scale(), Some(DVec3::new(2.0, 1.0, 3.0)));
    let connections = obj.connections().unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].item_guid, "g-relay");
    assert!(
        obj.properties()
            .unwrap()
            .properties
            .contains_key("ItemConnections")
    );
}

#[test]
fn inventory_counts_skip_logic_items() {
    let save = Suitebro::from_json(json!({
        "items": [item("Chair", "g1"), item("Relay", "g2"), item("Chair", "g3")],
        "properties": [props("CondoWeather_C_0")],
    }))
    .unwrap();
    assert_eq!(save.item_count().values().sum::<usize>(), 3);
    assert_eq!(save.inventory_count().get("Chair"), Some(&2));
    assert_eq!(save.inventory_count().get("Relay"), None);
}

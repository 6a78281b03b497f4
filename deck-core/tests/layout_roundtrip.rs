//! Layout Round-Trip Tests
//!
//! Loads complete deck layouts and checks that serialization reproduces
//! geometry, variant fields and child order, and that the state projection
//! survives independently of the structure.

use deck_core::{
    Coordinate, DeckError, DeckScene, Liquid, ResourceKind, ResourceRecord, ResourceType,
    StateRecord,
};

const STAR_LAYOUT: &str = include_str!("fixtures/star_layout.json");
const OT_LAYOUT: &str = include_str!("fixtures/ot_layout.json");

fn star() -> DeckScene {
    DeckScene::from_json(STAR_LAYOUT).expect("star layout should load")
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_star_layout_loads_every_resource() {
    let scene = star();
    assert_eq!(scene.len(), 26);
    assert_eq!(
        scene.deck().map(deck_core::Resource::resource_type),
        Some(ResourceType::HamiltonDeck)
    );
    assert!(scene.contains_name("plate_well_2_1"));
    assert!(scene.contains_name("tips_tipspot_1_1"));
}

#[test]
fn test_serialize_matches_source_record() {
    let source = ResourceRecord::from_json(STAR_LAYOUT).expect("record");
    let serialized = star().to_layout().expect("layout");
    assert_eq!(serialized, source);
}

#[test]
fn test_json_round_trip_is_identity() {
    let first = star().to_json().expect("json");
    let second = DeckScene::from_json(&first)
        .expect("reload")
        .to_json()
        .expect("json");
    assert_eq!(first, second);
}

#[test]
fn test_child_order_is_preserved() {
    let scene = star();
    let carrier = scene.id_of("plate_car").expect("carrier");
    let names: Vec<_> = scene
        .children(carrier)
        .iter()
        .map(|&id| scene.get(id).expect("site").name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["plate_car_0", "plate_car_1", "plate_car_2", "plate_car_3", "plate_car_4"]
    );
}

#[test]
fn test_absolute_location_through_carrier() {
    let scene = star();
    let plate = scene.id_of("plate").expect("plate");
    let abs = scene.absolute_location(plate).expect("abs");
    assert!((abs.x - 104.0).abs() < 1e-9);
    assert!((abs.y - 71.5).abs() < 1e-9);
    assert!((abs.z - 186.15).abs() < 1e-9);
}

#[test]
fn test_ot_deck_location_is_fixed() {
    let scene = DeckScene::from_json(OT_LAYOUT).expect("ot layout");
    let deck = scene.deck().expect("deck");
    assert_eq!(deck.location, Coordinate::new(115.65, 68.03, 0.0));

    let layout = scene.to_layout().expect("layout");
    assert!((layout.location.x - 115.65).abs() < 1e-9);
    assert_eq!(layout.fields.no_trash, Some(true));
}

#[test]
fn test_unknown_type_loads_as_generic_resource() {
    let json = r#"{
        "name": "deck", "type": "Deck",
        "location": {"x": 0, "y": 0, "z": 0},
        "size_x": 1000, "size_y": 600, "size_z": 0,
        "children": [{
            "name": "lid", "type": "Lid",
            "location": {"x": 10, "y": 10, "z": 0},
            "size_x": 127, "size_y": 86, "size_z": 5,
            "parent_name": "deck"
        }]
    }"#;
    let scene = DeckScene::from_json(json).expect("layout");
    let lid = scene.get_by_name("lid").expect("lid");
    assert_eq!(lid.kind, ResourceKind::Resource);
    assert!(lid.resource_type().is_draggable());
}

#[test]
fn test_duplicate_names_reject_whole_layout() {
    let mut record = ResourceRecord::from_json(STAR_LAYOUT).expect("record");
    let mut twin = record.children[3].clone();
    twin.location.x += 50.0;
    record.children.push(twin);

    let result = DeckScene::from_layout(&record);
    assert!(matches!(result, Err(DeckError::DuplicateName(name)) if name == "trough"));
}

#[test]
fn test_load_resource_attaches_under_named_parent() {
    let mut scene = star();
    let json = r#"{
        "name": "plate2", "type": "Plate",
        "location": {"x": 0, "y": 0, "z": 0},
        "size_x": 127, "size_y": 86, "size_z": 14.5,
        "num_items_x": 1, "num_items_y": 1,
        "parent_name": "plate_car_1",
        "children": [{
            "name": "anything", "type": "Well",
            "location": {"x": 10, "y": 10, "z": 1},
            "size_x": 6.4, "size_y": 6.4, "size_z": 10.7,
            "max_volume": 360, "parent_name": "plate2"
        }]
    }"#;
    let record = ResourceRecord::from_json(json).expect("record");
    let id = scene.load_resource(&record).expect("load");

    assert_eq!(scene.parent(id), scene.id_of("plate_car_1"));
    assert!(scene.contains_name("plate2_well_0_0"));
    assert!(!scene.contains_name("anything"));
}

#[test]
fn test_load_resource_with_unknown_parent_fails() {
    let mut scene = star();
    let mut record = ResourceRecord::from_json(STAR_LAYOUT).expect("record").children[3].clone();
    record.name = "trough2".to_string();
    record.parent_name = Some("nowhere".to_string());
    assert!(matches!(
        scene.load_resource(&record),
        Err(DeckError::UnknownParent(_))
    ));
}

// ============================================================================
// State projection
// ============================================================================

#[test]
fn test_state_projection_round_trip() {
    let mut scene = star();
    scene
        .container_mut("trough")
        .expect("trough")
        .add_liquid("trough", Liquid::new("water", 400.0))
        .expect("add");
    scene
        .tip_spot_mut("tips_tipspot_0_1")
        .expect("spot")
        .drop_tip("tips_tipspot_0_1")
        .expect("drop");

    let state = scene.serialize_state();
    let json = serde_json::to_string(&state).expect("serialize");

    let mut fresh = star();
    let parsed = serde_json::from_str(&json).expect("parse");
    fresh.load_state(&parsed).expect("load state");

    assert_eq!(fresh.serialize_state(), state);
    assert!(fresh.tip_spot("tips_tipspot_0_1").expect("spot").has_tip);
    assert!(!fresh.tip_spot("tips_tipspot_0_0").expect("spot").has_tip);
}

#[test]
fn test_state_is_not_part_of_structure() {
    let mut scene = star();
    let before = scene.to_layout().expect("layout");
    scene
        .container_mut("plate_well_0_0")
        .expect("well")
        .dispense("plate_well_0_0", 100.0)
        .expect("dispense");
    assert_eq!(scene.to_layout().expect("layout"), before);
}

#[test]
fn test_state_record_shapes() {
    let scene = star();
    let state = scene.serialize_state();

    assert!(matches!(
        state.get("trough"),
        Some(StateRecord::Container { liquids, pending_liquids })
            if liquids.is_empty() && pending_liquids.is_empty()
    ));
    assert!(matches!(
        state.get("tips_tipspot_1_0"),
        Some(StateRecord::TipSpot { tip: None, pending_tip: None })
    ));
    // 6 wells, 1 trough, 4 tip spots.
    assert_eq!(state.len(), 11);
}

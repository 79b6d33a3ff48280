use crate::*;

use std::path::PathBuf;

use serde_json::json;
use urchin_client::AreaSet;
use urchin_core::{OneOrMany, Side};

const ONTOLOGY: &str = r#"[
    {"id": 997, "acronym": "root", "name": "root", "rgb_triplet": [255, 255, 255], "structure_id_path": "/997/"},
    {"id": 315, "acronym": "Isocortex", "name": "Isocortex", "rgb_triplet": [112, 255, 113], "structure_id_path": "/997/8/567/688/695/315/"},
    {"id": 385, "acronym": "VISp", "name": "Primary visual area", "rgb_triplet": [8, 133, 140], "structure_id_path": "/997/8/567/688/695/315/669/385/"}
]"#;

/// A config whose atlas directory holds a small `ccf25` ontology.
fn atlas_config(tag: &str) -> (UrchinConfig, PathBuf) {
    let dir = std::env::temp_dir().join(format!("urchin-atlas-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("ccf25.structures.json"), ONTOLOGY).unwrap();
    let mut config = test_config();
    config.atlas.data_dir = dir.clone();
    (config, dir)
}

#[test]
fn area_setters_wait_for_load() {
    let (config, dir) = atlas_config("unloaded");
    let (client, t) = connected_client(config);
    let atlas = client.atlas("ccf25").unwrap();
    assert_eq!(atlas.ontology().len(), 3);

    let areas = atlas.get_areas(&["root", "VISp"]).unwrap();
    assert!(matches!(
        atlas.set_colors(&areas, OneOrMany::One("#FF0000".into()), Side::Full),
        Err(ClientError::AtlasNotLoaded(name)) if name == "ccf25"
    ));
    assert!(matches!(
        atlas.set_data_index(3),
        Err(ClientError::AtlasNotLoaded(_))
    ));
    assert!(t.take().is_empty());

    // Area groupings and clearing do not need the atlas loaded.
    atlas.load_defaults().unwrap();
    atlas.load_area_set(AreaSet::Beryl).unwrap();
    atlas.clear().unwrap();
    assert_eq!(
        t.take(),
        vec![
            ("LoadDefaultAreas".to_string(), Payload::Json(json!(""))),
            ("LoadDefaultAreas".to_string(), Payload::Json(json!("beryl"))),
            ("Clear".to_string(), Payload::Json(json!("area"))),
        ]
    );
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn load_is_once_per_atlas() {
    let (config, dir) = atlas_config("load");
    let (client, t) = connected_client(config);
    let mut atlas = client.atlas("ccf25").unwrap();

    atlas.load().unwrap();
    assert!(atlas.is_loaded());
    assert_eq!(t.take_one(), ("LoadAtlas".into(), json!("ccf25")));

    assert!(matches!(
        atlas.load(),
        Err(ClientError::AtlasAlreadyLoaded(name)) if name == "ccf25"
    ));
    assert!(t.take().is_empty());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn batch_setters_key_areas_by_side() {
    let (config, dir) = atlas_config("sided");
    let (client, t) = connected_client(config);
    let mut atlas = client.atlas("ccf25").unwrap();
    atlas.load().unwrap();
    t.take();

    let areas = atlas.get_areas(&["Isocortex", "VISp"]).unwrap();
    atlas
        .set_visibilities(&areas, OneOrMany::One(true), Side::Left)
        .unwrap();
    assert_eq!(
        t.take_one(),
        (
            "SetAreaVisibility".into(),
            json!({"Isocortex-lh": true, "VISp-lh": true})
        )
    );

    atlas
        .set_colors(
            &areas,
            OneOrMany::Many(vec!["#00FF00".into(), [0.5, 0.2, 0.8].into()]),
            Side::Full,
        )
        .unwrap();
    assert_eq!(
        t.take_one(),
        (
            "SetAreaColors".into(),
            json!({"Isocortex": "#00FF00", "VISp": "#7F33CC"})
        )
    );

    assert!(matches!(
        atlas.set_intensities(&areas, OneOrMany::Many(vec![0.5]), Side::Full),
        Err(ClientError::Sanitize(_))
    ));
    assert!(t.take().is_empty());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn empty_area_selection_sends_nothing() {
    let (config, dir) = atlas_config("empty");
    let (client, t) = connected_client(config);
    let mut atlas = client.atlas("ccf25").unwrap();
    atlas.load().unwrap();
    t.take();

    atlas.set_visibilities(&[], OneOrMany::One(true), Side::Full).unwrap();
    atlas
        .set_colors(&[], OneOrMany::One("#FF0000".into()), Side::Left)
        .unwrap();
    atlas.set_alphas(&[], OneOrMany::Many(vec![]), Side::Full).unwrap();
    atlas.set_data(&[], OneOrMany::One(vec![1.0]), Side::Full).unwrap();
    assert!(t.take().is_empty());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn single_area_setters_and_data_series() {
    let (config, dir) = atlas_config("single");
    let (client, t) = connected_client(config);
    let mut atlas = client.atlas("ccf25").unwrap();
    atlas.load().unwrap();
    t.take();

    let visp = atlas.area("VISp").unwrap();
    assert_eq!(visp.structure().id, 385);
    visp.set_alpha(0.25, Side::Right).unwrap();
    visp.set_material("transparent-unlit", Side::Right).unwrap();
    assert_eq!(
        t.take(),
        vec![
            ("SetAreaAlpha".to_string(), Payload::Json(json!({"VISp-rh": 0.25}))),
            (
                "SetAreaMaterial".to_string(),
                Payload::Json(json!({"VISp-rh": "transparent-unlit"}))
            ),
        ]
    );

    atlas.set_colormap("cool").unwrap();
    atlas
        .set_data(&[visp], OneOrMany::One(vec![0.0, 0.5, 1.0]), Side::Full)
        .unwrap();
    atlas.set_data_index(2).unwrap();
    assert_eq!(
        t.take(),
        vec![
            ("SetAreaColormap".to_string(), Payload::Json(json!("cool"))),
            ("SetAreaData".to_string(), Payload::Json(json!({"VISp": [0.0, 0.5, 1.0]}))),
            ("SetAreaIndex".to_string(), Payload::Json(json!(2))),
        ]
    );

    assert!(matches!(
        atlas.area("MOp"),
        Err(ClientError::UnknownArea { acronym, .. }) if acronym == "MOp"
    ));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_ontology_file_is_an_error() {
    let (config, dir) = atlas_config("missing");
    let (client, _t) = connected_client(config);
    assert!(matches!(
        client.atlas("allen2017"),
        Err(ClientError::Ontology(_))
    ));
    let _ = std::fs::remove_dir_all(dir);
}

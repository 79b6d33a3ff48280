use crate::*;

use serde_json::json;
use urchin_client::meshes::MeshOptions;
use urchin_client::neurons::NeuronOptions;
use urchin_client::particles::ParticleOptions;
use urchin_client::probes::ProbeOptions;
use urchin_client::text::TextOptions;
use urchin_client::RemoteObject;
use urchin_core::config::RepeatDelete;
use urchin_core::event::MESH_CLICK;
use urchin_core::{ClearTarget, NeuronShape, OneOrMany, SanitizeError};

#[test]
fn create_then_set_color_emits_in_order() {
    let (client, t) = connected_client(test_config());
    let meshes = client.meshes();

    let mut mesh = meshes.create(MeshOptions::default()).unwrap();
    assert_eq!(mesh.id(), "0");
    assert_eq!(t.take_one(), ("CreateMesh".into(), json!(["0"])));

    mesh.set_color("#FF0000").unwrap();
    assert_eq!(t.take_one(), ("SetColor".into(), json!({"0": "#FF0000"})));
    assert_eq!(mesh.color().as_str(), "#FF0000");

    mesh.set_color([127.6, 51.2, 204.0]).unwrap();
    assert_eq!(t.take_one(), ("SetColor".into(), json!({"0": "#8033CC"})));
}

#[test]
fn create_options_go_out_after_creation() {
    let (client, t) = connected_client(test_config());
    let mesh = client
        .meshes()
        .create(MeshOptions {
            position: Some([1000.0, 2000.0, -500.0]),
            color: Some("00ff00".into()),
            material: Some("unlit".into()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(t.take_names(), vec!["CreateMesh", "SetPosition", "SetColor", "SetMaterial"]);
    assert_eq!(mesh.position(), [1000.0, 2000.0, -500.0]);
    assert_eq!(mesh.color().as_str(), "#00ff00");
}

#[test]
fn malformed_options_create_nothing() {
    let (client, t) = connected_client(test_config());
    let err = client
        .meshes()
        .create(MeshOptions {
            color: Some("#12345".into()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ClientError::Sanitize(SanitizeError::InvalidColor(_))));
    assert!(t.take().is_empty());
    // The failed create did not consume an id.
    assert_eq!(client.meshes().create(MeshOptions::default()).unwrap().id(), "0");
}

#[test]
fn mesh_positions_are_sent_in_millimeters() {
    let (client, t) = connected_client(test_config());
    let mut mesh = client.meshes().create(MeshOptions::default()).unwrap();
    let mut probe = client.probes().create(ProbeOptions::default()).unwrap();
    t.take();

    mesh.set_position([1000.0, 2500.0, 0.0]).unwrap();
    assert_eq!(t.take_one(), ("SetPosition".into(), json!({"0": [1.0, 2.5, 0.0]})));

    probe.set_position([1000.0, 2500.0, 0.0]).unwrap();
    assert_eq!(
        t.take_one(),
        ("SetProbePos".into(), json!({"p1": [1000.0, 2500.0, 0.0]}))
    );
}

#[test]
fn deleted_object_setter_emits_nothing() {
    let (client, t) = connected_client(test_config());
    let mut particle = client.particles().create(ParticleOptions::default()).unwrap();
    particle.delete().unwrap();
    assert_eq!(t.take_names(), vec!["CreateParticles", "DeleteParticles"]);

    let err = particle.set_size(2.0).unwrap_err();
    assert!(matches!(err, ClientError::StaleObject { ref id, .. } if id == "n1"));
    assert!(t.take().is_empty());
    assert_eq!(particle.size(), 1.0);
}

#[test]
fn batch_skips_deleted_members() {
    let (client, t) = connected_client(test_config());
    let meshes = client.meshes();
    let mut all = meshes.create_many(3).unwrap();
    assert_eq!(t.take_one(), ("CreateMesh".into(), json!(["0", "1", "2"])));

    all[1].delete().unwrap();
    t.take();

    let report = meshes
        .set_colors(&mut all, OneOrMany::Many(vec!["#FF0000".into(), "#00FF00".into(), "#0000FF".into()]))
        .unwrap();
    assert_eq!(report.applied, vec!["0", "2"]);
    assert_eq!(report.skipped, vec!["1"]);
    assert_eq!(
        t.take_one(),
        ("SetColor".into(), json!({"0": "#FF0000", "2": "#0000FF"}))
    );
    assert_eq!(all[1].color().as_str(), "#FFFFFF");
}

#[test]
fn batch_broadcasts_single_value() {
    let (client, t) = connected_client(test_config());
    let mut probes = client.probes().create_many(2).unwrap();
    t.take();

    client
        .probes()
        .set_angles(&mut probes, OneOrMany::One([90.0, 45.0, 0.0]))
        .unwrap();
    assert_eq!(
        t.take_one(),
        (
            "SetProbeAngles".into(),
            json!({"p1": [90.0, 45.0, 0.0], "p2": [90.0, 45.0, 0.0]})
        )
    );
}

#[test]
fn batch_rejects_short_value_lists_before_emitting() {
    let (client, t) = connected_client(test_config());
    let mut texts = client.texts().create_many(3).unwrap();
    t.take();

    let err = client
        .texts()
        .set_font_sizes(&mut texts, OneOrMany::Many(vec![10, 12]))
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Sanitize(SanitizeError::TooFewValues { expected: 3, actual: 2 })
    ));
    assert!(t.take().is_empty());
    assert!(texts.iter().all(|t| t.font_size() == 12));
}

#[test]
fn batch_with_nothing_live_emits_nothing() {
    let (client, t) = connected_client(test_config());
    let lines = client.lines();
    let mut all = lines.create_many(2).unwrap();
    lines.delete_many(&mut all).unwrap();
    assert_eq!(t.take_names(), vec!["CreateLine", "DeleteLine"]);

    let report = lines
        .set_colors(&mut all, OneOrMany::One("#FFFFFF".into()))
        .unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped.len(), 2);
    assert!(t.take().is_empty());
}

#[test]
fn repeated_delete_follows_config() {
    let (client, t) = connected_client(test_config());
    let mut mesh = client.meshes().create(MeshOptions::default()).unwrap();
    mesh.delete().unwrap();
    mesh.delete().unwrap();
    assert_eq!(t.take_names(), vec!["CreateMesh", "DeleteMesh", "DeleteMesh"]);

    let mut config = test_config();
    config.objects.repeat_delete = RepeatDelete::Skip;
    let (client, t) = connected_client(config);
    let mut mesh = client.meshes().create(MeshOptions::default()).unwrap();
    mesh.delete().unwrap();
    mesh.delete().unwrap();
    assert_eq!(t.take_names(), vec!["CreateMesh", "DeleteMesh"]);

    let mut config = test_config();
    config.objects.repeat_delete = RepeatDelete::Error;
    let (client, t) = connected_client(config);
    let mut mesh = client.meshes().create(MeshOptions::default()).unwrap();
    mesh.delete().unwrap();
    assert!(matches!(mesh.delete(), Err(ClientError::StaleObject { .. })));
    assert_eq!(t.take_names(), vec!["CreateMesh", "DeleteMesh"]);
}

#[test]
fn batch_delete_follows_repeat_policy() {
    let (client, t) = connected_client(test_config());
    let probes = client.probes();
    let mut all = probes.create_many(2).unwrap();
    all[0].delete().unwrap();
    t.take();
    let report = probes.delete_many(&mut all).unwrap();
    assert_eq!(report.applied, vec!["p1", "p2"]);
    assert_eq!(t.take_one(), ("DeleteProbes".into(), json!(["p1", "p2"])));

    let mut config = test_config();
    config.objects.repeat_delete = RepeatDelete::Skip;
    let (client, t) = connected_client(config);
    let probes = client.probes();
    let mut all = probes.create_many(2).unwrap();
    all[0].delete().unwrap();
    t.take();
    let report = probes.delete_many(&mut all).unwrap();
    assert_eq!(report.applied, vec!["p2"]);
    assert_eq!(report.skipped, vec!["p1"]);
    assert_eq!(t.take_one(), ("DeleteProbes".into(), json!(["p2"])));

    let mut config = test_config();
    config.objects.repeat_delete = RepeatDelete::Error;
    let (client, t) = connected_client(config);
    let probes = client.probes();
    let mut all = probes.create_many(2).unwrap();
    all[1].delete().unwrap();
    t.take();
    assert!(matches!(
        probes.delete_many(&mut all),
        Err(ClientError::StaleObject { .. })
    ));
    assert!(t.take().is_empty());
    assert!(all[0].is_live());
}

#[test]
fn neurons_carry_shape_and_material() {
    let (client, t) = connected_client(test_config());
    let neurons = client.neurons();
    let mut n = neurons
        .create(NeuronOptions {
            position: Some([1.0, 2.0, 3.0]),
            shape: Some(NeuronShape::Cube),
            material: Some("unlit".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(n.id(), "n1");
    assert_eq!(
        t.take(),
        vec![
            ("CreateNeurons".to_string(), Payload::Json(json!(["n1"]))),
            ("SetNeuronPos".to_string(), Payload::Json(json!({"n1": [1.0, 2.0, 3.0]}))),
            ("SetNeuronShape".to_string(), Payload::Json(json!({"n1": "cube"}))),
            ("SetNeuronMaterial".to_string(), Payload::Json(json!({"n1": "unlit"}))),
        ]
    );
    assert_eq!(n.size(), 0.02);

    // Particles draw from the same "n" sequence.
    let particle = client.particles().create(ParticleOptions::default()).unwrap();
    assert_eq!(particle.id(), "n2");

    let mut more = neurons.create_many(2).unwrap();
    assert_eq!(t.take_one(), ("CreateNeurons".into(), json!(["n3", "n4"])));
    more[1].delete().unwrap();
    t.take();
    let report = neurons
        .set_shapes(&mut more, OneOrMany::One(NeuronShape::Sphere))
        .unwrap();
    assert_eq!(report.skipped, vec!["n4"]);
    assert_eq!(t.take_one(), ("SetNeuronShape".into(), json!({"n3": "sphere"})));
    neurons
        .set_materials(&mut more[..1], OneOrMany::One("lit".to_string()))
        .unwrap();
    assert_eq!(t.take_one(), ("SetNeuronMaterial".into(), json!({"n3": "lit"})));
    assert_eq!(more[0].material(), "lit");

    n.set_shape(NeuronShape::Sphere).unwrap();
    n.set_color("#00FF00").unwrap();
    assert_eq!(t.take_names(), vec!["SetNeuronShape", "SetNeuronColor"]);
    assert_eq!(n.shape(), NeuronShape::Sphere);
}

#[test]
fn text_and_lines_use_their_own_id_sequences() {
    let (client, t) = connected_client(test_config());
    let mut text = client
        .texts()
        .create(TextOptions {
            text: Some("hello".into()),
            position: Some([-0.5, 0.9]),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(text.id(), "t1");
    assert_eq!(t.take_names(), vec!["CreateText", "SetTextText", "SetTextPositions"]);

    text.set_font_size(24).unwrap();
    assert_eq!(t.take_one(), ("SetTextSizes".into(), json!({"t1": 24})));

    let mut line = client.lines().create(Default::default()).unwrap();
    assert_eq!(line.id(), "l1");
    t.take();
    line.set_positions(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]).unwrap();
    assert_eq!(
        t.take_one(),
        ("SetLinePosition".into(), json!({"l1": [[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]}))
    );
}

#[test]
fn particle_material_is_global() {
    let (client, t) = connected_client(test_config());
    client.particles().set_material("circle").unwrap();
    assert_eq!(t.take_one(), ("SetParticleMaterial".into(), json!("circle")));
}

#[test]
fn custom_mesh_payloads_are_json_text() {
    let (client, t) = connected_client(test_config());
    let mut mesh = client
        .custom_meshes()
        .create(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
            None,
        )
        .unwrap();
    assert_eq!(mesh.id(), "custom0");
    let (name, payload) = t.take_one();
    assert_eq!(name, "CustomMeshCreate");
    let body: serde_json::Value = serde_json::from_str(payload.as_str().unwrap()).unwrap();
    assert_eq!(body["ID"], "custom0");
    assert_eq!(body["triangles"], json!([0, 1, 2]));
    assert_eq!(body["vertices"][1], json!({"x": 1.0, "y": 0.0, "z": 0.0}));
    assert!(body.get("normals").is_none());

    mesh.set_position([1.0, 2.0, 3.0], false).unwrap();
    let (name, payload) = t.take_one();
    assert_eq!(name, "CustomMeshPosition");
    let body: serde_json::Value = serde_json::from_str(payload.as_str().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({"ID": "custom0", "Position": {"x": 1.0, "y": 2.0, "z": 3.0}, "UseReference": false})
    );
}

#[test]
fn camera_setters_and_main_camera() {
    let (client, t) = connected_client(test_config());
    let main = client.cameras().main();
    assert_eq!(main.id(), "CameraMain");
    assert!(t.take().is_empty());

    let mut cam = client.cameras().create().unwrap();
    assert_eq!(cam.id(), "Camera1");
    cam.set_zoom(4.0).unwrap();
    cam.set_mode(urchin_core::event::CameraMode::Perspective).unwrap();
    cam.set_control().unwrap();
    let sent = t.take();
    let names: Vec<_> = sent.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["CreateCamera", "SetCameraZoom", "SetCameraMode", "SetCameraControl"]);
    assert_eq!(sent[2].1, Payload::Json(json!({"Camera1": "perspective"})));
    assert_eq!(sent[3].1, Payload::Json(json!("Camera1")));

    client.scene().set_light_link(&cam).unwrap();
    client.scene().clear(ClearTarget::All).unwrap();
    assert_eq!(
        t.take(),
        vec![
            ("SetLightLink".to_string(), Payload::Json(json!("Camera1"))),
            ("Clear".to_string(), Payload::Json(json!("all"))),
        ]
    );
}

#[test]
fn click_callbacks_receive_ids() {
    let (client, _t) = connected_client(test_config());
    let clicked = Arc::new(Mutex::new(Vec::new()));
    let sink = clicked.clone();
    client
        .meshes()
        .on_click(move |id| sink.lock().unwrap().push(id.to_string()));

    assert!(client.dispatcher().dispatch(&inbound(MESH_CLICK, json!("4"))));
    assert_eq!(clicked.lock().unwrap().as_slice(), ["4"]);
}

#[test]
fn emitting_while_disconnected_fails() {
    init_tracing();
    let client = Client::new(test_config());
    assert!(matches!(
        client.meshes().create(MeshOptions::default()),
        Err(ClientError::NotConnected)
    ));
}

#[test]
fn category_clears_name_their_target() {
    let (client, t) = connected_client(test_config());
    client.meshes().clear().unwrap();
    client.particles().clear().unwrap();
    client.probes().clear().unwrap();
    client.texts().clear().unwrap();
    client.volumes().clear().unwrap();
    client.custom_meshes().clear().unwrap();
    let targets: Vec<_> = t
        .take()
        .into_iter()
        .map(|(name, payload)| {
            assert_eq!(name, "Clear");
            payload
        })
        .collect();
    assert_eq!(
        targets,
        ["neurons", "particle", "probes", "texts", "volumes", "custommesh"]
            .map(|s| Payload::Json(json!(s)))
            .to_vec()
    );
}

#[test]
fn camera_position_sends_the_preserve_target_flag() {
    let (client, t) = connected_client(test_config());
    let mut main = client.cameras().main();
    main.set_position([500.0, 1500.0, 1000.0], true).unwrap();
    assert_eq!(
        t.take_one(),
        ("SetCameraPosition".into(), json!({"CameraMain": [500.0, 1500.0, 1000.0, true]}))
    );

    let mut cam = client.cameras().create().unwrap();
    t.take();
    cam.set_position([-100.0, 0.0, 20000.0], false).unwrap();
    assert_eq!(
        t.take_one(),
        ("SetCameraPosition".into(), json!({"Camera1": [-100.0, 0.0, 20000.0, false]}))
    );
    assert_eq!(cam.position(), Some([-100.0, 0.0, 20000.0]));

    cam.delete().unwrap();
    t.take();
    assert!(matches!(
        cam.set_position([0.0, 0.0, 0.0], true),
        Err(ClientError::StaleObject { .. })
    ));
    assert!(t.take().is_empty());
}

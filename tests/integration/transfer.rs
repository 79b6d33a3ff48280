use crate::*;

use std::io::{Cursor, Read};
use std::time::Duration;

use bytes::Bytes;
use flate2::read::ZlibDecoder;
use serde_json::json;
use urchin_core::event::{IMAGE_CHUNK, IMAGE_META, VOLUME_CLICK};

fn text_payload(payload: &Payload) -> Value {
    match payload {
        Payload::Json(Value::String(text)) => serde_json::from_str(text).unwrap(),
        other => panic!("expected JSON text, got {other:?}"),
    }
}

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

// ── Textures ──────────────────────────────────────────────────────────────────

#[test]
fn texture_upload_sends_meta_then_pairs() {
    let mut config = test_config();
    config.transfer.chunk_bytes = 10;
    let (client, t) = connected_client(config);
    let mut tex = client.textures().create().unwrap();
    assert_eq!(t.take_one(), ("CreateFOV".into(), json!(["tex1"])));

    // 4x3 pixels, two bytes each.
    let data: Vec<u8> = (0..24).collect();
    assert_eq!(tex.set_image(4, 3, data.clone()).unwrap(), 3);

    let sent = t.take();
    let names: Vec<_> = sent.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "SetFOVTextureDataMetaInit",
            "SetFOVTextureDataMeta",
            "SetFOVTextureData",
            "SetFOVTextureDataMeta",
            "SetFOVTextureData",
            "SetFOVTextureDataMeta",
            "SetFOVTextureData",
        ]
    );
    assert_eq!(sent[0].1, Payload::Json(json!(["tex1", 3, 3, 4, "array"])));
    assert_eq!(sent[1].1, Payload::Json(json!(["tex1", 0, false])));
    assert_eq!(sent[3].1, Payload::Json(json!(["tex1", 1, false])));
    assert_eq!(sent[5].1, Payload::Json(json!(["tex1", 2, true])));

    let mut rebuilt = Vec::new();
    for (_, payload) in sent.iter().filter(|(n, _)| n == "SetFOVTextureData") {
        match payload {
            Payload::Binary(b) => rebuilt.extend_from_slice(b),
            other => panic!("texture data should be binary, got {other:?}"),
        }
    }
    assert_eq!(rebuilt, data);
    assert_eq!(tex.image_size(), Some((4, 3)));
}

#[test]
fn texture_rejects_bad_shapes_without_emitting() {
    let (client, t) = connected_client(test_config());
    let mut tex = client.textures().create().unwrap();
    t.take();

    assert!(matches!(
        tex.set_image(4, 3, vec![0u8; 13]),
        Err(ClientError::TextureShape { pixels: 12, actual: 13 })
    ));
    assert!(matches!(
        tex.set_image(20_000, 1, vec![0u8; 20_000]),
        Err(ClientError::ImageSize { width: 20_000, .. })
    ));
    assert!(t.take().is_empty());
}

// ── Volumes ───────────────────────────────────────────────────────────────────

#[test]
fn volume_is_compressed_and_chunked_by_offset() {
    let mut config = test_config();
    config.transfer.chunk_bytes = 8;
    let (client, t) = connected_client(config);

    let data: Vec<u8> = (0..64).map(|i| (i * 7 % 255) as u8).collect();
    let volume = client.volumes().create(&data, [4, 4, 4], None).unwrap();
    assert_eq!(volume.id(), "volume0");

    let sent = t.take();
    assert_eq!(sent[0].0, "UpdateVolume");
    let meta = text_payload(&sent[0].1);
    assert_eq!(meta["name"], "volume0");
    assert_eq!(meta["visible"], true);
    assert_eq!(meta["colormap"].as_array().unwrap().len(), 255);
    let n_compressed = meta["nCompressedBytes"].as_u64().unwrap() as usize;
    assert_eq!(n_compressed, volume.n_compressed_bytes());

    let mut compressed = vec![0u8; n_compressed];
    let mut expected_offset = 0;
    for (name, payload) in &sent[1..] {
        assert_eq!(name, "SetVolumeData");
        let chunk = text_payload(payload);
        let offset = chunk["offset"].as_u64().unwrap() as usize;
        assert_eq!(offset, expected_offset);
        let bytes: Vec<u8> = serde_json::from_value(chunk["compressedByteChunk"].clone()).unwrap();
        assert!(bytes.len() <= 8);
        compressed[offset..offset + bytes.len()].copy_from_slice(&bytes);
        expected_offset += bytes.len();
    }
    assert_eq!(expected_offset, n_compressed);

    let mut voxels = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut voxels)
        .unwrap();
    assert_eq!(voxels, data);
}

#[test]
fn volume_shape_must_match_data() {
    let (client, t) = connected_client(test_config());
    assert!(matches!(
        client.volumes().create(&[0u8; 10], [2, 2, 2], None),
        Err(ClientError::VolumeShape { expected: 8, actual: 10 })
    ));
    assert!(t.take().is_empty());
}

#[test]
fn overflowing_volume_shape_is_rejected() {
    let (client, t) = connected_client(test_config());
    assert!(matches!(
        client.volumes().create(&[0u8; 8], [usize::MAX, 2, 2], None),
        Err(ClientError::VolumeShape { expected: usize::MAX, actual: 8 })
    ));
    assert!(t.take().is_empty());
}

#[test]
fn volume_updates_resend_meta() {
    let (client, t) = connected_client(test_config());
    let mut volume = client.volumes().create(&[1u8; 8], [2, 2, 2], None).unwrap();
    t.take();

    volume.set_visible(false).unwrap();
    let (name, payload) = t.take_one();
    assert_eq!(name, "UpdateVolume");
    let meta: Value = serde_json::from_str(payload.as_str().unwrap()).unwrap();
    assert_eq!(meta["visible"], false);

    volume.delete().unwrap();
    assert_eq!(t.take_one(), ("DeleteVolume".into(), json!("volume0")));
}

#[test]
fn float_volumes_map_nan_to_transparent() {
    let (client, t) = connected_client(test_config());
    let values = [0.0, 1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0, 7.0];
    let (_volume, edges) = client
        .volumes()
        .create_from_floats(&values, [2, 2, 2], None)
        .unwrap();
    assert_eq!(edges.len(), 254);

    let sent = t.take();
    let chunk = text_payload(&sent[1].1);
    let compressed: Vec<u8> = serde_json::from_value(chunk["compressedByteChunk"].clone()).unwrap();
    let mut voxels = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut voxels)
        .unwrap();
    assert_eq!(voxels[2], 255);
    assert_eq!(voxels[0], 0);
}

#[test]
fn volume_click_callback_gets_coordinates() {
    let (client, _t) = connected_client(test_config());
    let clicks = Arc::new(Mutex::new(Vec::new()));
    let sink = clicks.clone();
    client
        .volumes()
        .on_click(move |c| sink.lock().unwrap().push((c.ap, c.ml, c.dv)));

    client
        .dispatcher()
        .dispatch(&inbound(VOLUME_CLICK, json!({"ap": 100.0, "ml": 200.0, "dv": 300.0})));
    assert_eq!(clicks.lock().unwrap().as_slice(), &[(100.0, 200.0, 300.0)]);
}

// ── Screenshots ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn screenshot_resolves_from_inbound_chunks() {
    let (client, t) = connected_client(test_config());
    let camera = client.cameras().main();
    let png = tiny_png();
    let dispatcher = client.dispatcher().clone();

    let feed = async {
        tokio::task::yield_now().await;
        let (first, second) = png.split_at(png.len() / 2);
        dispatcher.dispatch(&inbound(
            IMAGE_META,
            json!({"name": "CameraMain", "totalBytes": png.len()}),
        ));
        dispatcher.dispatch(&inbound(IMAGE_CHUNK, json!({"name": "CameraMain", "data": first})));
        dispatcher.dispatch(&inbound(IMAGE_CHUNK, json!({"name": "CameraMain", "data": second})));
    };
    let (shot, ()) = tokio::join!(camera.screenshot([2, 2]), feed);
    let shot = shot.unwrap();

    let (name, payload) = t.take_one();
    assert_eq!(name, "RequestCameraImg");
    let request: Value = serde_json::from_str(payload.as_str().unwrap()).unwrap();
    assert_eq!(request, json!({"name": "CameraMain", "size": [2, 2]}));

    assert_eq!(shot.png, Bytes::from(png));
    let img = shot.decode().unwrap();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);

    let path = std::env::temp_dir().join(format!("urchin-shot-{}.png", std::process::id()));
    shot.save(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), shot.png.to_vec());
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn overlapping_screenshot_is_rejected() {
    let (client, _t) = connected_client(test_config());
    let camera = client.cameras().main();
    let dispatcher = client.dispatcher().clone();

    let second = async {
        tokio::task::yield_now().await;
        let rejected = camera.screenshot([8, 8]).await;
        dispatcher.dispatch(&inbound(IMAGE_META, json!({"name": "CameraMain", "totalBytes": 3})));
        dispatcher.dispatch(&inbound(IMAGE_CHUNK, json!({"name": "CameraMain", "data": [1, 2, 3]})));
        rejected
    };
    let (first, second) = tokio::join!(camera.screenshot([8, 8]), second);

    assert_eq!(first.unwrap().png, Bytes::from_static(&[1, 2, 3]));
    assert!(matches!(second, Err(ClientError::RequestInFlight(id)) if id == "CameraMain"));
}

#[tokio::test]
async fn screenshot_times_out_and_frees_the_camera() {
    let mut config = test_config();
    config.transfer.screenshot_timeout_secs = 1;
    let (client, t) = connected_client(config);
    let camera = client.cameras().create().unwrap();
    t.take();

    // Metadata arrives but the image never completes.
    let dispatcher = client.dispatcher().clone();
    let feed = async {
        tokio::task::yield_now().await;
        dispatcher.dispatch(&inbound(IMAGE_META, json!({"name": "Camera1", "totalBytes": 10})));
    };
    let (result, ()) = tokio::join!(camera.screenshot([4, 4]), feed);
    match result {
        Err(ClientError::Timeout { waited, .. }) => assert_eq!(waited, Duration::from_secs(1)),
        other => panic!("expected timeout, got {other:?}"),
    }

    // A late chunk for the dropped transfer is refused, and the camera is free again.
    assert!(dispatcher.dispatch(&inbound(IMAGE_CHUNK, json!({"name": "Camera1", "data": [0]}))));
    let feed = async {
        tokio::task::yield_now().await;
        dispatcher.dispatch(&inbound(IMAGE_META, json!({"name": "Camera1", "totalBytes": 1})));
        dispatcher.dispatch(&inbound(IMAGE_CHUNK, json!({"name": "Camera1", "data": [9]})));
    };
    let (result, ()) = tokio::join!(camera.screenshot([4, 4]), feed);
    assert_eq!(result.unwrap().png, Bytes::from_static(&[9]));
}

#[tokio::test]
async fn screenshot_size_is_validated_before_emitting() {
    let (client, t) = connected_client(test_config());
    let camera = client.cameras().main();
    for size in [[0, 10], [10, 0], [15_001, 10]] {
        assert!(matches!(
            camera.screenshot(size).await,
            Err(ClientError::ImageSize { .. })
        ));
    }
    assert!(t.take().is_empty());
}

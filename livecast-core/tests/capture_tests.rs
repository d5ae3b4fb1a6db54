//! Integration tests for camera queries and live camera settings

mod mocks;

use livecast_core::capture::{
    CameraCharacteristics, CaptureSettings, CaptureSourceRegistry, LensFacing, ZoomRange,
    ZoomTier,
};
use livecast_core::engine::{InstanceRegistry, StreamingEngine};
use livecast_core::error::{ErrorKind, LivecastError};
use livecast_core::types::LensDirection;
use mocks::{camera, MockEngine, MockPlatform};
use std::sync::Arc;

fn registry(platform: MockPlatform) -> CaptureSourceRegistry {
    CaptureSourceRegistry::new(Arc::new(platform))
}

#[test]
fn test_zoom_range_prefers_ratio_range() {
    let platform = MockPlatform::new().with_camera(
        "0",
        CameraCharacteristics {
            lens_facing: Some(LensFacing::Back),
            zoom_ratio_range: Some((0.5, 8.0)),
            max_digital_zoom: Some(4.0),
            ..Default::default()
        },
    );

    let range = registry(platform).zoom_range("0").unwrap();
    assert_eq!(range, ZoomRange::new(0.5, 8.0));
}

#[test]
fn test_zoom_range_falls_back_to_max_digital_zoom() {
    let platform = MockPlatform::new().with_camera(
        "0",
        CameraCharacteristics {
            lens_facing: Some(LensFacing::Back),
            max_digital_zoom: Some(4.0),
            ..Default::default()
        },
    );

    let registry = registry(platform);
    assert_eq!(registry.zoom_range("0").unwrap(), ZoomRange::new(1.0, 4.0));
    assert_eq!(registry.min_zoom_ratio("0").unwrap(), 1.0);
    assert_eq!(registry.max_zoom_ratio("0").unwrap(), 4.0);
}

#[test]
fn test_zoom_range_without_capabilities_is_fixed() {
    let platform = MockPlatform::new().with_camera("0", camera(LensFacing::Front));

    assert_eq!(registry(platform).zoom_range("0").unwrap(), ZoomRange::new(1.0, 1.0));
}

#[test]
fn test_zoom_tier_order_is_replaceable() {
    let platform = MockPlatform::new().with_camera(
        "0",
        CameraCharacteristics {
            lens_facing: Some(LensFacing::Back),
            zoom_ratio_range: Some((0.5, 8.0)),
            max_digital_zoom: Some(4.0),
            ..Default::default()
        },
    );

    let registry = registry(platform).with_zoom_tiers(vec![ZoomTier::MaxDigitalZoom, ZoomTier::Fixed]);

    assert_eq!(registry.zoom_tiers(), &[ZoomTier::MaxDigitalZoom, ZoomTier::Fixed]);
    assert_eq!(registry.zoom_range("0").unwrap(), ZoomRange::new(1.0, 4.0));
}

#[test]
fn test_lens_direction_classification() {
    let platform = MockPlatform::new()
        .with_camera("front", camera(LensFacing::Front))
        .with_camera("back", camera(LensFacing::Back))
        .with_camera("usb", camera(LensFacing::External))
        .with_camera("mystery", CameraCharacteristics::default());
    let registry = registry(platform);

    assert_eq!(registry.lens_direction("front").unwrap(), LensDirection::Front);
    assert_eq!(registry.lens_direction("back").unwrap(), LensDirection::Back);
    assert_eq!(registry.lens_direction("usb").unwrap(), LensDirection::Other);

    let err = registry.lens_direction("mystery").unwrap_err();
    assert!(matches!(err, LivecastError::InvalidDevice(_)));
    assert!(err.to_string().contains("Invalid camera position for camera mystery"));
}

#[test]
fn test_sensor_rotation_defaults_to_zero() {
    let platform = MockPlatform::new()
        .with_camera("0", camera(LensFacing::Back))
        .with_camera(
            "1",
            CameraCharacteristics {
                sensor_orientation: Some(270),
                lens_facing: Some(LensFacing::Front),
                ..Default::default()
            },
        );
    let registry = registry(platform);

    assert_eq!(registry.sensor_rotation_degrees("0").unwrap(), 0);
    assert_eq!(registry.sensor_rotation_degrees("1").unwrap(), 270);
}

#[test]
fn test_unknown_camera_is_invalid_device() {
    let registry = registry(MockPlatform::new());

    assert_eq!(
        registry.sensor_rotation_degrees("9").unwrap_err().kind(),
        ErrorKind::InvalidDevice
    );
    assert_eq!(registry.zoom_range("9").unwrap_err().kind(), ErrorKind::InvalidDevice);
}

#[test]
fn test_device_list_is_not_cached() {
    let platform = Arc::new(MockPlatform::new().with_camera("0", camera(LensFacing::Back)));
    let registry = CaptureSourceRegistry::new(platform.clone());
    assert_eq!(registry.list_device_ids().unwrap(), vec!["0"]);

    platform.plug("1", camera(LensFacing::External));
    assert_eq!(registry.list_device_ids().unwrap(), vec!["0", "1"]);

    platform.unplug("0");
    assert_eq!(registry.list_device_ids().unwrap(), vec!["1"]);
}

#[test]
fn test_describe_all_skips_unclassifiable() {
    let platform = MockPlatform::new()
        .with_camera("0", camera(LensFacing::Back))
        .with_camera("1", CameraCharacteristics::default())
        .with_camera("2", camera(LensFacing::Front));

    let cameras = registry(platform).describe_all().unwrap();

    let ids: Vec<_> = cameras.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "2"]);
    assert_eq!(cameras[1].lens_direction, LensDirection::Front);
    assert_eq!(cameras[1].zoom_range, ZoomRange::FIXED);
}

fn settings_over(engine: Arc<MockEngine>) -> CaptureSettings {
    let engines = Arc::new(InstanceRegistry::new(move || {
        Ok(engine.clone() as Arc<dyn StreamingEngine>)
    }));
    CaptureSettings::new(engines)
}

#[tokio::test]
async fn test_zoom_ratio_round_trip() {
    let engine = Arc::new(MockEngine::new());
    let settings = settings_over(engine.clone());

    settings.set_zoom_ratio(2.5).await.unwrap();

    assert_eq!(settings.zoom_ratio().await.unwrap(), 2.5);
    assert_eq!(*engine.camera().zoom.writes.lock(), vec![2.5]);
}

#[tokio::test]
async fn test_zoom_rejects_non_positive_ratio() {
    let engine = Arc::new(MockEngine::new());
    let settings = settings_over(engine.clone());

    for ratio in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = settings.set_zoom_ratio(ratio).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
    assert!(engine.camera().zoom.writes.lock().is_empty());
}

#[tokio::test]
async fn test_zoom_on_non_camera_source_fails() {
    let engine = Arc::new(MockEngine::new());
    engine.bind_screen_source();
    let settings = settings_over(engine.clone());

    assert!(matches!(
        settings.set_zoom_ratio(2.0).await,
        Err(LivecastError::NotACaptureSource)
    ));
    assert!(matches!(
        settings.zoom_ratio().await,
        Err(LivecastError::NotACaptureSource)
    ));

    engine.unbind_video();
    assert!(matches!(
        settings.zoom_ratio().await,
        Err(LivecastError::NotACaptureSource)
    ));
}

#[tokio::test]
async fn test_concurrent_zoom_writes_serialize() {
    let engine = Arc::new(MockEngine::new());
    let settings = Arc::new(settings_over(engine.clone()));

    let mut tasks = Vec::new();
    for i in 1..=6 {
        let settings = settings.clone();
        tasks.push(tokio::spawn(async move {
            settings.set_zoom_ratio(i as f64).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let zoom = engine.camera().zoom.clone();
    assert_eq!(zoom.writes.lock().len(), 6);
    assert_eq!(zoom.max_in_flight.load(std::sync::atomic::Ordering::SeqCst), 1);
}

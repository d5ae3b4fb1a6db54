//! Integration tests for the host boundary

mod mocks;

use livecast_core::config::{Preset, VideoConfig};
use livecast_core::engine::{InstanceRegistry, StreamingEngine};
use livecast_core::host::LiveStreamHost;
use livecast_core::types::SessionEvent;
use mocks::{MockEngine, MockPlatform, RecordingSurfaces, ScriptedPrompt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Setup {
    engine: Arc<MockEngine>,
    created: Arc<AtomicUsize>,
    surfaces: Arc<RecordingSurfaces>,
    host: LiveStreamHost,
}

fn setup() -> Setup {
    let engine = Arc::new(MockEngine::new());
    let created = Arc::new(AtomicUsize::new(0));
    let surfaces = Arc::new(RecordingSurfaces::new());

    let factory_engine = engine.clone();
    let factory_created = created.clone();
    let engines = Arc::new(InstanceRegistry::new(move || {
        factory_created.fetch_add(1, Ordering::SeqCst);
        Ok(factory_engine.clone() as Arc<dyn StreamingEngine>)
    }));

    let host = LiveStreamHost::new(
        engines,
        Arc::new(MockPlatform::new()),
        Arc::new(ScriptedPrompt::granting()),
        surfaces.clone(),
    );

    Setup {
        engine,
        created,
        surfaces,
        host,
    }
}

#[tokio::test]
async fn test_create_is_lazy_and_reused() {
    let s = setup();
    assert!(!s.host.has_session().await);
    assert!(!s.host.engine_created());

    let first = s.host.create().await.unwrap();
    let second = s.host.create().await.unwrap();

    assert_eq!(first, second);
    assert!(s.host.engine_created());
    assert_eq!(s.created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dispose_releases_texture_and_engine() {
    let s = setup();
    let texture = s.host.create().await.unwrap();

    s.host.dispose().await;

    assert!(!s.host.has_session().await);
    assert!(!s.host.engine_created());
    assert!(s.host.status().await.is_none());
    assert_eq!(s.surfaces.released(), vec![texture]);

    let replacement = s.host.create().await.unwrap();
    assert_ne!(replacement, texture);
    assert_eq!(s.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_events_fan_out_to_every_subscriber() {
    let s = setup();
    let mut first = s.host.subscribe();
    let mut second = s.host.subscribe();

    let session = s.host.session().await.unwrap();
    session
        .set_video_config(VideoConfig::from_preset(Preset::P720_30))
        .await
        .unwrap();
    session.start_stream("rtmp://example.com/live/key").await.unwrap();

    for rx in [&mut first, &mut second] {
        let event = loop {
            let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("event in time")
                .unwrap();
            if !matches!(event, SessionEvent::VideoSizeChanged { .. }) {
                break event;
            }
        };
        assert_eq!(event, SessionEvent::Connected);
    }
    assert_eq!(s.host.last_event(), Some(SessionEvent::Connected));
    assert!(s.engine.is_streaming());
}

#[tokio::test]
async fn test_status_reflects_session() {
    let s = setup();
    let session = s.host.session().await.unwrap();
    session
        .set_video_config(VideoConfig::from_preset(Preset::P1080_30))
        .await
        .unwrap();

    let snapshot = s.host.status().await.unwrap();
    assert_eq!(snapshot.handle, session.handle().as_u64());
    assert_eq!(snapshot.texture_id, session.texture_id());
    assert_eq!(
        snapshot.video_config,
        Some(VideoConfig::from_preset(Preset::P1080_30))
    );
}

#[tokio::test]
async fn test_dispose_clears_last_event() {
    let s = setup();
    let session = s.host.session().await.unwrap();
    session
        .set_video_config(VideoConfig::from_preset(Preset::P720_30))
        .await
        .unwrap();
    assert!(s.host.last_event().is_some());

    s.host.dispose().await;
    assert!(s.host.last_event().is_none());
}

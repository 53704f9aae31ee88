//! Integration tests for the sync engine against the device emulator.

use b3ctl_device::{DeviceConfig, DeviceEmulator};
use b3ctl_engine::{
    HttpMethod, HttpResponse, HttpTransport, LogScale, LogStatus, LoopbackClient, LoopbackServer,
    PanelConfig, RecordingSink, SyncEngine,
};
use b3ctl_protocol::{
    control_by_key, Control, PlaybackState, BODY_THRESHOLD, CONFIG_ROUTE, FILE_ROUTE, HPF_CUTOFF,
    MOUTH_THRESHOLD, RMS_WINDOW_MS,
};
use std::sync::Arc;
use std::time::Duration;

/// Routes loopback requests into a shared emulator.
#[derive(Clone)]
struct SharedDevice(Arc<DeviceEmulator>);

impl LoopbackServer for SharedDevice {
    fn handle(&self, method: HttpMethod, path: &str, body: &[u8]) -> HttpResponse {
        let response = self.0.handle(method.as_str(), path, body);
        HttpResponse::new(response.status, response.body)
    }
}

type Engine = SyncEngine<HttpTransport<LoopbackClient<SharedDevice>>, RecordingSink>;

fn connect(device: &Arc<DeviceEmulator>) -> Engine {
    let config = PanelConfig::new("http://b3.local").with_poll_interval(Duration::from_millis(10));
    let transport = HttpTransport::new(
        config.base_url.clone(),
        LoopbackClient::new(SharedDevice(Arc::clone(device))),
    );
    SyncEngine::new(config, transport, RecordingSink::new())
}

fn device_with(config: DeviceConfig) -> Arc<DeviceEmulator> {
    Arc::new(DeviceEmulator::new(config))
}

fn control(key: &str) -> &'static Control {
    control_by_key(key).unwrap()
}

fn latest_log(engine: &Engine) -> (LogStatus, String) {
    let entry = engine.log_entries().into_iter().next().unwrap();
    (entry.status, entry.message)
}

#[tokio::test]
async fn load_tracks_then_play() {
    let device = device_with(DeviceConfig::new(["b.mp3", "a.mp3"]));
    let engine = connect(&device);

    engine.load_tracks().await;

    assert_eq!(engine.tracks(), vec!["a.mp3", "b.mp3"]);
    assert_eq!(engine.selected_track().as_deref(), Some("a.mp3"));
    assert_eq!(
        engine.sink().track_options(),
        Some(vec!["a.mp3".to_string(), "b.mp3".to_string()])
    );
    assert_eq!(
        engine.sink().control_value("bodyThreshold"),
        Some((0.1, "0.1".to_string()))
    );
    assert_eq!(engine.stats().polls_applied, 1);

    engine.play_pause().await;

    assert_eq!(device.playback(), PlaybackState::Playing);
    assert_eq!(device.active_song().as_deref(), Some("a.mp3"));
    assert_eq!(engine.playback(), PlaybackState::Playing);
    assert_eq!(engine.sink().playback(), Some(PlaybackState::Playing));
    assert_eq!(engine.sink().selected_track().as_deref(), Some("a.mp3"));
    assert_eq!(
        latest_log(&engine),
        (LogStatus::Ok, "Sent action play_pause".to_string())
    );

    engine.play_pause().await;
    assert_eq!(engine.playback(), PlaybackState::Paused);
}

#[tokio::test]
async fn committed_edit_reaches_device() {
    let device = device_with(DeviceConfig::new(["a.mp3"]));
    let engine = connect(&device);
    engine.load_tracks().await;

    engine.commit_edit(control(BODY_THRESHOLD), 0.25).await;

    assert_eq!(device.value(BODY_THRESHOLD), Some(0.25));
    assert_eq!(device.value(RMS_WINDOW_MS), Some(50.0));
    assert_eq!(engine.stats().configs_pushed, 1);
    assert_eq!(
        latest_log(&engine),
        (LogStatus::Ok, "Sent config OK".to_string())
    );
}

#[tokio::test]
async fn masked_control_survives_poll() {
    let device = device_with(DeviceConfig::new(["a.mp3"]));
    let engine = connect(&device);
    let hpf = control(HPF_CUTOFF);
    engine.load_tracks().await;

    engine.begin_edit(hpf);
    engine.preview_edit(hpf, 0.9);
    device.handle("POST", CONFIG_ROUTE, br#"{"hpf_cutoff": 300}"#);
    engine.poll().await;

    assert_eq!(engine.position(hpf).unwrap(), 0.9);

    engine.end_edit(hpf);
    engine.poll().await;

    let expected = LogScale::AUDIO.to_normalized(300.0, true).unwrap();
    assert!((engine.position(hpf).unwrap() - expected).abs() < 1e-12);
    assert!(engine
        .log_entries()
        .iter()
        .all(|entry| entry.status == LogStatus::Ok));
}

#[tokio::test]
async fn user_track_change_stops_playback() {
    let device = device_with(DeviceConfig::new(["a.mp3", "b.mp3"]));
    let engine = connect(&device);
    engine.load_tracks().await;
    engine.play_pause().await;
    assert_eq!(device.playback(), PlaybackState::Playing);

    engine.select_track("b.mp3").await;

    assert_eq!(device.playback(), PlaybackState::Idle);
    assert_eq!(device.active_song(), None);
    assert_eq!(engine.selected_track().as_deref(), Some("b.mp3"));

    engine.play_pause().await;
    assert_eq!(device.active_song().as_deref(), Some("b.mp3"));
}

#[tokio::test]
async fn finished_track_shows_as_stopped() {
    let device = device_with(DeviceConfig::new(["a.mp3"]));
    let engine = connect(&device);
    engine.load_tracks().await;
    engine.play_pause().await;

    device.end_track();
    engine.poll().await;

    assert_eq!(engine.playback(), PlaybackState::Idle);
    assert_eq!(engine.sink().playback(), Some(PlaybackState::Idle));
}

#[tokio::test]
async fn http_failure_is_logged_and_leaves_display() {
    let device = device_with(DeviceConfig::new(["a.mp3"]));
    let engine = connect(&device);
    engine.load_tracks().await;
    let before = engine.sink().control_updates("bodyThreshold");

    device.fail_route(CONFIG_ROUTE, 500);
    engine.poll().await;

    assert_eq!(
        latest_log(&engine),
        (LogStatus::Error, "/api/config: HTTP 500".to_string())
    );
    assert_eq!(engine.stats().polls_failed, 1);
    assert_eq!(engine.sink().control_updates("bodyThreshold"), before);
}

#[tokio::test]
async fn track_list_failure_skips_poll() {
    let device = device_with(DeviceConfig::new(["a.mp3"]));
    let engine = connect(&device);
    device.fail_route(FILE_ROUTE, 503);

    engine.load_tracks().await;

    assert!(engine.tracks().is_empty());
    assert_eq!(engine.stats().polls_issued, 0);
    assert_eq!(
        latest_log(&engine),
        (LogStatus::Error, "/api/audiofiles: HTTP 503".to_string())
    );
}

#[tokio::test]
async fn missing_key_is_reported() {
    let device = device_with(DeviceConfig::new(["a.mp3"]).without_value(MOUTH_THRESHOLD));
    let engine = connect(&device);

    engine.poll().await;

    let messages: Vec<_> = engine
        .log_entries()
        .into_iter()
        .filter(|entry| entry.status == LogStatus::Error)
        .map(|entry| entry.message)
        .collect();
    assert_eq!(
        messages,
        vec!["/api/config: Key mouth_threshold missing from config response"]
    );
    assert_eq!(
        engine.sink().control_value("bodyThreshold"),
        Some((0.1, "0.1".to_string()))
    );
}

#[tokio::test]
async fn edit_before_first_load_is_not_pushed() {
    let device = device_with(DeviceConfig::new(["a.mp3"]));
    let engine = connect(&device);
    device.fail_route(CONFIG_ROUTE, 500);

    engine.poll().await;
    engine.commit_edit(control(BODY_THRESHOLD), 0.25).await;

    let (status, message) = latest_log(&engine);
    assert_eq!(status, LogStatus::Error);
    assert!(message.starts_with("config not loaded yet"), "{message}");
    assert_eq!(engine.stats().configs_pushed, 0);
    device.clear_failures();
    assert_eq!(device.value(RMS_WINDOW_MS), Some(50.0));
    assert_eq!(device.value(BODY_THRESHOLD), Some(0.1));
}

#[tokio::test]
async fn non_numeric_value_spoils_only_its_control() {
    let device = device_with(DeviceConfig::new(["a.mp3"]));
    let engine = connect(&device);
    device.handle("POST", CONFIG_ROUTE, br#"{"hpf_cutoff": true}"#);

    engine.poll().await;

    assert_eq!(engine.stats().polls_applied, 1);
    let (status, message) = latest_log(&engine);
    assert_eq!(status, LogStatus::Error);
    assert_eq!(
        message,
        "/api/config: Key hpf_cutoff missing from config response"
    );
    assert_eq!(engine.sink().control_value("hpfCutoff"), None);
    assert_eq!(
        engine.sink().control_value("bodyThreshold"),
        Some((0.1, "0.1".to_string()))
    );
}

#[tokio::test]
async fn ini_string_values_are_accepted() {
    let device = device_with(DeviceConfig::new(["a.mp3"]).with_ini_values(true));
    let engine = connect(&device);

    engine.poll().await;

    assert_eq!(engine.stats().polls_applied, 1);
    assert!(engine.log_entries().is_empty());
    assert_eq!(engine.physical_value(control(RMS_WINDOW_MS)).unwrap(), 50.0);
}

#[tokio::test]
async fn run_loop_polls_until_shutdown() {
    let device = device_with(DeviceConfig::new(["a.mp3"]));
    let engine = Arc::new(connect(&device));

    let shutdown = tokio::time::sleep(Duration::from_millis(80));
    Arc::clone(&engine).run(shutdown).await;

    assert!(engine.stats().polls_applied >= 2);
    assert!(device.request_count() >= 2);
    assert_eq!(engine.stats().polls_failed, 0);
}

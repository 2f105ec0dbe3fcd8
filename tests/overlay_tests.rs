//! End-to-end tests: taps -> repositories -> overlays and export

use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use tracked_telemetry::{
    CallSite, EventDirection, EventTone, ModeMetadata, ModeTone, Telemetry, TelemetryConfig,
};

fn quiet_config() -> TelemetryConfig {
    let mut config = TelemetryConfig::default();
    config.events.timestamp_format = "T".to_string();
    config.event_overlay.lines = 4;
    config.mode_overlay.lines = 4;
    config
}

#[test]
fn test_event_overlay_from_taps() {
    let telemetry = Telemetry::with_config(quiet_config());
    let tap = telemetry.event_tap();

    tap.post(
        "Evt_BallDrained",
        EventDirection::ToGui,
        CallSite::new("Trough", "OnSwitch"),
        Some(&"Game.Balls.Ball"),
    );
    tap.received("Evt_BallDrained", CallSite::new("Hud", "OnDrain"));
    tap.received("Evt_BallDrained", CallSite::new("Hud", "OnDrain"));
    // verbose by default
    tap.post("Evt_SetLED", EventDirection::ToGui, CallSite::new("Lamps", "Set"), None);

    let mut overlay = telemetry.event_overlay();
    assert!(overlay.refresh());
    let lines = overlay.lines();
    assert!(lines[0].is_blank());
    assert!(lines[1].is_blank());
    assert_eq!(lines[2].text, "T Evt_BallDrained [GUI] < Trough.OnSwitch(Ball)");
    assert_eq!(lines[2].tone, EventTone::PostedToGui);
    assert_eq!(lines[3].text, "T Evt_BallDrained > Hud.OnDrain (x2)");
    assert_eq!(lines[3].tone, EventTone::Handling);
}

#[test]
fn test_mode_overlay_from_taps() {
    let telemetry = Telemetry::with_config(quiet_config());
    let tap = telemetry.mode_tap();
    let ids = telemetry.ids();

    let attract = ModeMetadata::from_description("AttractMode  pri=20", "Game.AttractMode", 20);
    let tilt = ModeMetadata::new("TiltMode", "Game.TiltMode", 90).added_by("Base");
    let attract_id = ids.allocate();
    tap.added(attract_id, &attract);
    tap.added(ids.allocate(), &tilt);
    tap.removed(attract_id, &attract);

    let mut overlay = telemetry.mode_overlay();
    assert!(overlay.refresh());
    let lines = overlay.lines();
    assert_eq!(lines[0].text, "Base.TiltMode_90");
    assert!(matches!(lines[0].tone, ModeTone::Aging(_) | ModeTone::Active));
    assert_eq!(lines[1].text, "AttractMode_20");
    assert_eq!(lines[1].tone, ModeTone::Inactive);
    assert!(lines[2].is_blank());

    assert_eq!(
        telemetry.modes().modes_used_report(),
        "Game.AttractMode\nGame.TiltMode\n"
    );
}

#[test]
fn test_overlay_follows_concurrent_producers() {
    let telemetry = Arc::new(Telemetry::with_config(quiet_config()));
    let mut overlay = telemetry.event_overlay();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let telemetry = Arc::clone(&telemetry);
            thread::spawn(move || {
                let tap = telemetry.event_tap();
                for i in 0..50 {
                    tap.post(
                        &format!("Evt_{}", t),
                        EventDirection::ToModes,
                        CallSite::new("Worker", "Run"),
                        Some(&i),
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(overlay.refresh());
    assert!(overlay.lines().iter().all(|l| !l.is_blank()));
    assert!(overlay
        .lines()
        .iter()
        .all(|l| l.text.chars().count() <= telemetry.config().event_overlay.max_chars_per_line));
    assert!(!overlay.refresh());
}

#[test]
fn test_export_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let telemetry = Telemetry::with_config(quiet_config());
    let tap = telemetry.event_tap();
    tap.post("Evt_A", EventDirection::ToModes, CallSite::new("A", "a"), Some(&1));
    tap.received("Evt_A", CallSite::new("B", "b"));

    let path = temp_dir.path().join("events.jsonl");
    assert_eq!(telemetry.export_events(&path).unwrap(), 2);

    let content = fs::read_to_string(&path).unwrap();
    let records: Vec<tracked_telemetry::EventRecord> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].payload, "1");
    assert!(records[0].is_posted());
    assert_eq!(records[1].full_method_name(), "B.b");

    let modes_path = temp_dir.path().join("nested").join("modes.jsonl");
    assert_eq!(telemetry.export_modes(&modes_path).unwrap(), 0);
    assert!(modes_path.exists());
}

//! Telemetry Feed - Binary Entry Point
//!
//! Runs synthetic producers against a shared [`Telemetry`] and prints the
//! overlays whenever a repository changes. Configuration comes from
//! `TELEMETRY_*` environment variables, log filtering from `RUST_LOG`.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tracked_telemetry::overlay::OverlayLine;
use tracked_telemetry::{
    CallSite, EventDirection, EventTone, ModeMetadata, ModeTone, Telemetry, TelemetryConfig,
};

const MODE_NAMES: [(&str, i32); 5] = [
    ("AttractMode", 20),
    ("BallSaveMode", 50),
    ("MultiballMode", 40),
    ("BonusMode", 10),
    ("TiltMode", 90),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match TelemetryConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "invalid environment configuration, using defaults");
            TelemetryConfig::default()
        }
    };

    let telemetry = Arc::new(Telemetry::with_config(config));
    telemetry
        .payloads()
        .register("Evt_ScoreChanged", |p| Some(format!("{} pts", p)));

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let producers = vec![
        spawn_event_producer(Arc::clone(&telemetry), Arc::clone(&running)),
        spawn_mode_producer(Arc::clone(&telemetry), Arc::clone(&running)),
    ];
    info!(producers = producers.len(), "telemetry feed running, press Ctrl+C to stop");

    let mut events_changed = telemetry.events().watch();
    let mut modes_changed = telemetry.modes().watch();
    let mut event_overlay = telemetry.event_overlay();
    let mut mode_overlay = telemetry.mode_overlay();
    let mut tick = tokio::time::interval(Duration::from_millis(100));

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            _ = events_changed.changed() => {}
            _ = modes_changed.changed() => {}
            // keeps aging lines animated and polls the shutdown flag
            _ = tick.tick() => {}
        }

        let events_redrawn = event_overlay.refresh();
        let modes_redrawn = mode_overlay.refresh();
        if events_redrawn || modes_redrawn {
            print_frame(event_overlay.lines(), mode_overlay.lines());
        }
    }

    for handle in producers {
        if handle.join().is_err() {
            warn!("producer thread panicked");
        }
    }

    info!(
        events = telemetry.events().len(),
        posted = telemetry.events().posted_count(),
        modes = telemetry.modes().len(),
        ids = telemetry.ids().allocated(),
        "telemetry feed stopped"
    );
    print!("{}", telemetry.modes().modes_used_report());
    Ok(())
}

fn spawn_event_producer(telemetry: Arc<Telemetry>, running: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let tap = telemetry.event_tap();
        let mut score: u64 = 0;
        let mut tick: u64 = 0;
        while running.load(Ordering::SeqCst) {
            tick += 1;
            score += 250;
            tap.post(
                "Evt_ScoreChanged",
                EventDirection::ToGui,
                CallSite::parse("Game.Scoring.ScoreMode.AddScore"),
                Some(&score),
            );
            tap.received("Evt_ScoreChanged", CallSite::new("Hud", "OnScore"));
            if tick % 7 == 0 {
                tap.post(
                    "Evt_BallDrained",
                    EventDirection::ToModes,
                    CallSite::new("Game.Trough.TroughMode", "OnSwitch"),
                    None,
                );
            }
            // filtered by the default verbose prefixes
            tap.post("Evt_SetLED", EventDirection::ToGui, CallSite::new("Lamps", "Set"), Some(&tick));
            thread::sleep(Duration::from_millis(150));
        }
    })
}

fn spawn_mode_producer(telemetry: Arc<Telemetry>, running: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let tap = telemetry.mode_tap();
        let modes: Vec<_> = MODE_NAMES
            .iter()
            .map(|&(name, priority)| {
                let meta = ModeMetadata::from_description(
                    &format!("{}  pri={}", name, priority),
                    format!("Game.Modes.{}", name),
                    priority,
                );
                (telemetry.ids().allocate(), meta)
            })
            .collect();

        let mut step = 0usize;
        while running.load(Ordering::SeqCst) {
            let (id, meta) = &modes[step % modes.len()];
            if (step / modes.len()) % 2 == 0 {
                tap.added(*id, meta);
            } else {
                tap.removed(*id, meta);
            }
            step += 1;
            thread::sleep(Duration::from_millis(900));
        }
    })
}

fn print_frame(events: &[OverlayLine<EventTone>], modes: &[OverlayLine<ModeTone>]) {
    println!("---- modes ----");
    for line in modes.iter().filter(|l| !l.is_blank()) {
        let marker = match line.tone {
            ModeTone::Inactive => ' ',
            ModeTone::Aging(_) => '+',
            ModeTone::Active => '*',
        };
        println!("{} {}", marker, line.text);
    }
    println!("---- events ----");
    for line in events.iter().filter(|l| !l.is_blank()) {
        println!("{}{}", if line.bold { "! " } else { "  " }, line.text);
    }
}

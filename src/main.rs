//! Lid Pong entry point
//!
//! Headless console front end: runs the frame loop and prints the live
//! status line. Window creation and drawing live in a separate front end.

use std::io::Write;
use std::time::{Duration, Instant};

use lid_pong::input::{InputSource, SensorAdapter};
use lid_pong::sensor::mock::{MockBackend, MockDeviceHandle, MockResponse};
use lid_pong::sim::GameState;
use lid_pong::{FrameDriver, FrameInput, Settings, hud};

const FRAME_TIME: Duration = Duration::from_millis(16);
const DEFAULT_FRAMES: u64 = 600;

fn main() {
    env_logger::init();
    log::info!("Lid Pong starting (sensor library {})", lid_pong::sensor::version());

    let settings = Settings::load_or_default();
    let seed = settings.seed.unwrap_or_else(time_seed);

    let (adapter, mock) = build_adapter(&settings);
    let input = InputSource::new(adapter, &settings);
    let mut driver = FrameDriver::new(input, GameState::from_settings(seed, &settings), &settings);

    let frames = std::env::var("LID_PONG_FRAMES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    println!("Lid Pong - MacBook Lid Angle Game");
    println!("==================================");

    let mut stdout = std::io::stdout();
    for frame in 0..frames {
        let started = Instant::now();
        if let Some(mock) = &mock {
            mock.set_angle(sweep_angle(frame));
        }

        driver.tick(&FrameInput::default(), |snapshot| {
            let _ = write!(stdout, "\r{}    ", hud::status_line(snapshot));
            let _ = stdout.flush();
        });

        if let Some(rest) = FRAME_TIME.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    println!();
}

/// Pick the sensor transport: mock demo, real HID, or none
fn build_adapter(settings: &Settings) -> (SensorAdapter, Option<MockDeviceHandle>) {
    if std::env::var("LID_PONG_MOCK_SENSOR").as_deref() == Ok("1") {
        log::info!("Using simulated lid sensor");
        let mut backend = MockBackend::new();
        let handle = backend.add_device(MockBackend::lid_info("mock-lid"), MockResponse::Angle(90));
        return (SensorAdapter::from_backend(&mut backend, settings), Some(handle));
    }
    (hardware_adapter(settings), None)
}

#[cfg(feature = "hid")]
fn hardware_adapter(settings: &Settings) -> SensorAdapter {
    use lid_pong::sensor::hid::HidApiBackend;

    match HidApiBackend::new() {
        Ok(mut backend) => SensorAdapter::from_backend(&mut backend, settings),
        Err(e) => SensorAdapter::new(Err(e), settings),
    }
}

#[cfg(not(feature = "hid"))]
fn hardware_adapter(settings: &Settings) -> SensorAdapter {
    log::warn!("Built without the `hid` feature, lid sensor disabled");
    SensorAdapter::disabled(settings)
}

/// Slow back-and-forth lid motion between 60 and 120 degrees
fn sweep_angle(frame: u64) -> u16 {
    let phase = (frame % 240) as u16;
    if phase < 120 { 60 + phase / 2 } else { 120 - (phase - 120) / 2 }
}

fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

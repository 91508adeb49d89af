#![cfg(not(target_arch = "wasm32"))]

//! Headless runner: loads config and map, then replays a scripted input
//! timeline through the fixed-timestep loop and logs the camera pose.
//!
//! ```text
//! strafe_engine [engine_config.json] [map.tmap]
//! strafe_engine [engine_config.json] [game_meta.json] [map name]
//! ```

use std::backtrace::Backtrace;
use std::fs::File;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info, LevelFilter};

use strafe_engine::input::{buttons, Buttons};
use strafe_engine::{EngineConfig, GameMeta, GameSession, InputSnapshot, LevelData, ScriptedInput};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    setup_diagnostics();

    if let Err(err) = run() {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => EngineConfig::load_from_file(&path)
            .with_context(|| format!("engine config {path}"))?,
        None => EngineConfig::default(),
    };
    let frame_rate = match config.frame_rate_limit() {
        Some(fps) => fps as f64,
        None => config.tick_rate * 2.0,
    };
    info!(
        "Starting strafe_engine: {} Hz ticks, {} fps frames (vsync {})",
        config.tick_rate, frame_rate, config.graphics.display.vsync
    );

    let tick_rate = config.tick_rate;
    let mut session = GameSession::new(config);

    match args.next() {
        Some(arg) => {
            let path = resolve_map(&arg, args.next())?;
            if !session.set_map(&path) {
                anyhow::bail!("could not load map {}", path.display());
            }
        }
        None => session
            .load_level(LevelData::arena())
            .context("built-in arena")?,
    }

    let mut input = timeline();
    let frame_dt = 1.0 / frame_rate;
    let ticks_per_log = tick_rate.round().max(1.0) as u64;
    let mut next_log = ticks_per_log;

    while !input.is_empty() {
        let Some(pose) = session.advance(frame_dt, &mut input) else {
            continue;
        };
        if session.clock().total_ticks() >= next_log {
            next_log += ticks_per_log;
            let report = session.last_report();
            info!(
                "t={:>5} pos=({:.2}, {:.2}, {:.2}) yaw={:.1} fov x{:.2} {:?}",
                session.clock().total_ticks(),
                pose.position.x,
                pose.position.y,
                pose.position.z,
                pose.yaw,
                pose.fov_multiplier,
                report
            );
        }
    }

    info!("Timeline finished after {} ticks", session.clock().total_ticks());
    Ok(())
}

/// A `.json` argument is game metadata naming the content directory; the map
/// name (default `test.tmap`) is then looked up under its `maps/` folder.
fn resolve_map(arg: &str, map_name: Option<String>) -> Result<PathBuf> {
    let path = Path::new(arg);
    if path.extension().map_or(true, |ext| ext != "json") {
        return Ok(path.to_path_buf());
    }

    let meta = GameMeta::load_from_file(path).with_context(|| format!("game metadata {arg}"))?;
    info!("{} v{}", meta.title, meta.version);
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(meta.map_path(root, map_name.as_deref().unwrap_or("test.tmap")))
}

/// Settle, walk, jump, turn, slide, stand.
fn timeline() -> ScriptedInput {
    let forward = Buttons {
        move_forward: true,
        ..Buttons::default()
    };
    let turn = InputSnapshot {
        buttons: forward,
        mouse_delta: glam::Vec2::new(15.0, 0.0),
        ..InputSnapshot::default()
    };

    ScriptedInput::new()
        .idle(60)
        .hold(buttons(forward), 120)
        .hold(buttons(Buttons { jump: true, ..forward }), 3)
        .hold(buttons(forward), 60)
        .hold(turn, 60)
        .hold(buttons(Buttons { slide: true, ..forward }), 90)
        .idle(120)
}

/// Logging plus a panic hook that writes a crash report.
fn setup_diagnostics() {
    env_logger::Builder::new()
        .filter_level(if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .format_timestamp_millis()
        .format_target(false)
        .parse_default_env()
        .init();

    panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::force_capture();

        let msg = match panic_info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => &s[..],
                None => "Box<dyn Any>",
            },
        };

        let location = panic_info.location().map_or("Unknown location".to_string(), |loc| {
            format!("{}:{}", loc.file(), loc.line())
        });

        let crash_msg = format!(
            "=== ENGINE CRASH ===\nReason: {}\nLocation: {}\n\nStack Trace:\n{}",
            msg, location, backtrace
        );

        eprintln!("\x1b[31;1m{}\x1b[0m", crash_msg);

        if let Ok(mut file) = File::create("engine_crash.log") {
            let _ = file.write_all(crash_msg.as_bytes());
            eprintln!("Crash report saved to engine_crash.log");
        }
    }));
}

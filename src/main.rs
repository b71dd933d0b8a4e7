//! Headless driver: ticks a particle group at a fixed step and packs the
//! arrays for upload every frame, the way a render loop would.
//!
//! Run with: `cargo run -- [scene.json] [frames]`
//!
//! Without a scene file the reference star field is used. Set
//! `RUST_LOG=debug` to see emitter allocation, `trace` for per-tick spawns.

use log::{error, info};
use spe::prelude::*;
use std::process::ExitCode;

fn reference_scene() -> SceneConfig {
    SceneConfig {
        group: GroupConfig::new().with_max_age(2.0),
        emitters: vec![presets::starfield(2500.0)],
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let scene = match args.next() {
        Some(path) => match SceneConfig::load(&path) {
            Ok(scene) => scene,
            Err(e) => {
                error!("failed to load {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => reference_scene(),
    };
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);

    let mut group = ParticleGroup::new(scene.group);
    for config in scene.emitters {
        if let Err(e) = group.attach_emitter(config) {
            error!("skipping emitter: {e}");
        }
    }
    info!("{} emitters, {} particle slots", group.emitters().len(), group.len());

    // Stand-in for a GPU vertex buffer, sized once
    let mut vertices = vec![ParticleVertex::default(); group.len()];

    for _ in 0..frames {
        group.tick_fixed();
        let _upload = group.vertices_bytes(&mut vertices);

        if group.frame() % 60 == 0 {
            info!(
                "t={:.2}s frame {} alive {}/{}",
                group.elapsed(),
                group.frame(),
                group.alive_count(),
                group.len()
            );
        }
    }

    ExitCode::SUCCESS
}

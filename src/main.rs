//! Squad Siege headless runner
//!
//! Plays a scripted session against the simulation core and logs the result.
//! Usage: `squad-siege [config.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Squad Siege (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => squad_siege::SimConfig::load(&path).unwrap_or_else(|e| {
            log::warn!("Could not load config from {}: {} - using defaults", path, e);
            squad_siege::SimConfig::default()
        }),
        None => squad_siege::SimConfig::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);

    demo::run(&config, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;
    use squad_siege::SimConfig;
    use squad_siege::audio::CueQueue;
    use squad_siege::rng::SimRng;
    use squad_siege::sim::{InputIntent, WorldBounds, WorldState, new_game, step};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Ten minutes of play
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    /// Leader sways this often
    const SWAY_FRAMES: u32 = 120;

    /// Auto-pilot: sway side to side and aim at the enemy closest to the squad
    fn scripted_input(state: &WorldState, frame: u32) -> InputIntent {
        let sway_right = (frame / SWAY_FRAMES) % 2 == 0;
        let squad_y = state.leader.pos.y;

        let threat = state
            .enemies
            .iter()
            .map(|z| z.pos)
            .chain(state.boss.iter().filter(|b| b.active).map(|b| b.body.pos))
            .filter(|p| p.y > 0.0)
            .min_by(|a, b| (squad_y - a.y).abs().total_cmp(&(squad_y - b.y).abs()));

        InputIntent {
            moving_left: !sway_right,
            moving_right: sway_right,
            aim_point: threat.map(|p| p + Vec2::new(0.0, 5.0)),
            ..Default::default()
        }
    }

    pub fn run(config: &SimConfig, seed: u64) {
        let bounds = WorldBounds::new(360.0, 640.0);
        let mut rng = SimRng::new(seed);
        let mut cues = CueQueue::new();
        let mut cue_count = 0usize;
        let mut state = new_game(bounds, 0.0, config);
        log::info!("Seed {}", rng.seed());

        let mut frame = 0;
        while frame < MAX_FRAMES && !state.is_over {
            frame += 1;
            let now = frame as f64 * FRAME_MS;
            let input = scripted_input(&state, frame);
            let next = step(&state, now, &input, bounds, config, &mut rng);
            next.signal_since(&state, &mut cues);
            state = next;
            cues.sync_laser_loop(state.multi_laser_active);
            cue_count += cues.drain().len();
        }

        let seconds = frame as f64 * FRAME_MS / 1000.0;
        log::info!(
            "Finished after {:.1}s: wave {}, score {}, squad {}{}",
            seconds,
            state.wave,
            state.score,
            state.squad_size,
            if state.is_over { " (game over)" } else { "" }
        );
        log::info!("{} sound cues emitted", cue_count);
        match state.to_json() {
            Ok(json) => log::debug!("Final snapshot: {}", json),
            Err(e) => log::warn!("Could not serialize final snapshot: {}", e),
        }
    }
}

/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use config::GameConfig;
use sim::event::GameEvent;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::{InputState, KEYS_QUIT, KEYS_RESTART};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    env_logger::init();

    let config = GameConfig::load();
    if let Err(e) = config.world.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let mut world = WorldState::new(config.world, config.seed);
    log::info!("session started (seed {})", world.seed);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Final score: {}", world.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    loop {
        input.drain_events();

        if input.ctrl_c_pressed() || input.any_pressed(KEYS_QUIT) {
            break;
        }
        // The restart entry point: full state reset, back to Running.
        if input.any_pressed(KEYS_RESTART) {
            world.reset();
            log::info!("session restarted (seed {})", world.seed);
        }

        if last_tick.elapsed() >= tick_rate {
            if world.phase == Phase::Running {
                let frame_input = input.frame_input(renderer.viewport(), &world.cfg);
                let events = step::step(world, frame_input);
                process_events(world, &events);
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(world: &WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::PlatformCleared { score } => {
                log::debug!("platform cleared, score {score}");
            }
            GameEvent::SpeedRaised { speed } => {
                log::debug!("scroll speed raised to {speed:.1}");
            }
            GameEvent::Won { score } => {
                log::info!("win threshold reached at {score} after {} ticks", world.tick);
            }
            GameEvent::Crushed { score } => {
                log::info!("crushed at the bottom, score {score} after {} ticks", world.tick);
            }
        }
    }
}

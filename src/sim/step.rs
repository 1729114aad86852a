/// The step function: advances the session by one tick.
///
/// Processing order (fixed):
///   1. Platform advance + recycle
///   2. Scoring pass (recycle first, so a platform can never be scored
///      and recycled in the same tick under contradictory state)
///   3. Player motion (input velocity, four-side clamp, gravity)
///   4. Collision resolution
///   5. Lose check (bottom boundary)
///
/// Win detection happens inside the scoring pass, lose detection at the
/// end. Both flip the phase to GameOver, which makes every later call a
/// no-op until `WorldState::reset`.

use crate::domain::player::FrameInput;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Running {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    advance_stream(world);
    resolve_scoring(world, &mut events);
    world.player.apply_input(input);
    let cfg = world.cfg;
    world.player.step_motion(&cfg);
    resolve_collision(world);
    resolve_lose(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Platform stream
// ══════════════════════════════════════════════════════════════

fn advance_stream(world: &mut WorldState) {
    let cfg = world.cfg;
    world.stream.advance(world.scroll_speed);
    world.stream.recycle(&cfg, &mut world.rng);
}

// ══════════════════════════════════════════════════════════════
// Scoring & difficulty
// ══════════════════════════════════════════════════════════════

/// Count every unscored platform whose top edge has passed below the
/// player's bottom edge. Each counts exactly once (scored flag).
/// Every 10th point raises the scroll speed by one increment until the
/// cap; reaching the win threshold ends the session.
fn resolve_scoring(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let cfg = world.cfg;
    let player_bottom = world.player.bottom();

    let mut score = world.score;
    let mut speed = world.scroll_speed;
    let mut won = false;

    for plat in world.stream.iter_mut() {
        if plat.scored || plat.y <= player_bottom {
            continue;
        }
        plat.scored = true;
        score += 1;
        events.push(GameEvent::PlatformCleared { score });

        if score % 10 == 0 && speed < cfg.max_scroll_speed {
            speed = (speed + cfg.speed_increment).min(cfg.max_scroll_speed);
            events.push(GameEvent::SpeedRaised { speed });
        }
        if score >= cfg.win_threshold {
            won = true;
            events.push(GameEvent::Won { score });
            break;
        }
    }

    world.score = score;
    world.scroll_speed = speed;
    if won {
        world.phase = Phase::GameOver;
        world.won = true;
    }
}

// ══════════════════════════════════════════════════════════════
// Collision
// ══════════════════════════════════════════════════════════════

/// Push the player to rest just below the platform it hit.
///
/// The front of the deque is the bottom-most platform, so the first
/// overlap found is the nearest one; resolve against it only. Platform
/// spacing exceeds player height, so at most one platform can overlap
/// anyway.
fn resolve_collision(world: &mut WorldState) {
    let cfg = world.cfg;
    let p = &mut world.player;
    for plat in world.stream.iter() {
        if plat.overlaps_vertically(p.y, p.h, cfg.platform_height)
            && !plat.gap_contains(p.x, p.w)
        {
            p.y = plat.y + cfg.platform_height + cfg.settle_offset;
            break;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Lose check
// ══════════════════════════════════════════════════════════════

fn resolve_lose(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::Running {
        return;
    }
    if world.player.bottom() >= world.cfg.height {
        world.phase = Phase::GameOver;
        world.won = false;
        events.push(GameEvent::Crushed { score: world.score });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

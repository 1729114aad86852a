/// WorldState: the complete snapshot of a running session.
///
/// Everything mutable lives here — player, platform stream, score,
/// scroll speed, phase, RNG — owned by the loop driver and mutated only
/// inside its tick. There is no module-level state; `reset()` fully
/// reinitializes a session in place.
///
/// The RNG is a seeded Pcg32 so a session (and every test) is
/// replayable from its seed alone.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::WorldConfig;
use crate::domain::platform::PlatformStream;
use crate::domain::player::Player;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    /// Terminal until an explicit `reset()`.
    GameOver,
}

pub struct WorldState {
    pub cfg: WorldConfig,
    pub player: Player,
    pub stream: PlatformStream,
    pub score: u32,
    pub scroll_speed: f32,
    pub phase: Phase,
    /// Distinguishes the end-panel message; only meaningful in GameOver.
    pub won: bool,
    pub tick: u64,
    pub rng: Pcg32,
    pub seed: u64,
}

impl WorldState {
    /// Build a fresh session. `seed = None` seeds from entropy.
    pub fn new(cfg: WorldConfig, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut stream = PlatformStream::new();
        stream.seed(&cfg, &mut rng);

        WorldState {
            cfg,
            player: Player::new(&cfg),
            stream,
            score: 0,
            scroll_speed: cfg.base_scroll_speed,
            phase: Phase::Running,
            won: false,
            tick: 0,
            rng,
            seed,
        }
    }

    /// Full state reset: score, speed, player spawn, reseeded stream,
    /// back to Running. The restart entry point.
    pub fn reset(&mut self) {
        self.player = Player::new(&self.cfg);
        self.stream.seed(&self.cfg, &mut self.rng);
        self.score = 0;
        self.scroll_speed = self.cfg.base_scroll_speed;
        self.phase = Phase::Running;
        self.won = false;
        self.tick = 0;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn world(seed: u64) -> WorldState {
        WorldState::new(GameConfig::default().world, Some(seed))
    }

    #[test]
    fn same_seed_same_layout() {
        let a = world(42);
        let b = world(42);
        for (pa, pb) in a.stream.iter().zip(b.stream.iter()) {
            assert_eq!(pa.y, pb.y);
            assert_eq!(pa.gap_x, pb.gap_x);
            assert_eq!(pa.gap_width, pb.gap_width);
        }
    }

    #[test]
    fn new_session_is_running_at_base_speed() {
        let w = world(1);
        assert_eq!(w.phase, Phase::Running);
        assert_eq!(w.score, 0);
        assert_eq!(w.scroll_speed, w.cfg.base_scroll_speed);
        assert!(!w.won);
        assert!(!w.stream.is_empty());
    }

    #[test]
    fn reset_restores_session_defaults() {
        let mut w = world(2);
        w.score = 137;
        w.scroll_speed = 4.2;
        w.phase = Phase::GameOver;
        w.won = true;
        w.tick = 999;
        w.player.y = 470.0;

        let len = w.stream.len();
        w.reset();

        assert_eq!(w.phase, Phase::Running);
        assert_eq!(w.score, 0);
        assert_eq!(w.scroll_speed, w.cfg.base_scroll_speed);
        assert!(!w.won);
        assert_eq!(w.tick, 0);
        assert_eq!(w.stream.len(), len);
        assert_eq!(w.player.y, w.cfg.height / 2.0 - w.cfg.player_h / 2.0);
    }
}

/// Player body: an axis-aligned box with position, size, and velocity.
///
/// Motion order inside one tick is fixed:
///   1. velocity is applied to position
///   2. position is clamped to the stage on all four sides
///   3. gravity is added to y unconditionally
///
/// There is deliberately no terminal velocity: fall speed is unbounded
/// and only collision resolution caps it in practice.

use crate::config::WorldConfig;

/// Directional control snapshot for one tick.
///
/// Produced once per tick by the input adapter and consumed by the
/// simulation step; asynchronous key/pointer events never touch the
/// player directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl FrameInput {
    pub const NONE: FrameInput =
        FrameInput { left: false, right: false, up: false, down: false };
}

#[derive(Clone, Copy, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
}

impl Player {
    /// Spawn centered on the stage with zero velocity.
    pub fn new(cfg: &WorldConfig) -> Self {
        Player {
            x: cfg.width / 2.0 - cfg.player_w / 2.0,
            y: cfg.height / 2.0 - cfg.player_h / 2.0,
            w: cfg.player_w,
            h: cfg.player_h,
            dx: 0.0,
            dy: 0.0,
            speed: cfg.player_speed,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Translate the control snapshot into a velocity vector.
    /// Opposing axes cancel out.
    pub fn apply_input(&mut self, input: FrameInput) {
        self.dx = match (input.left, input.right) {
            (true, false) => -self.speed,
            (false, true) => self.speed,
            _ => 0.0,
        };
        self.dy = match (input.up, input.down) {
            (true, false) => -self.speed,
            (false, true) => self.speed,
            _ => 0.0,
        };
    }

    /// One tick of motion: velocity, four-side clamp, then gravity.
    /// The clamp runs *before* gravity so the bottom-boundary lose check
    /// can only trip via gravity or collision, never via steering alone.
    pub fn step_motion(&mut self, cfg: &WorldConfig) {
        self.x += self.dx;
        self.y += self.dy;

        self.x = self.x.clamp(0.0, cfg.width - self.w);
        self.y = self.y.clamp(0.0, cfg.height - self.h);

        self.y += cfg.gravity;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn cfg() -> WorldConfig {
        GameConfig::default().world
    }

    #[test]
    fn spawns_centered() {
        let cfg = cfg();
        let p = Player::new(&cfg);
        assert_eq!(p.x, cfg.width / 2.0 - cfg.player_w / 2.0);
        assert_eq!(p.y, cfg.height / 2.0 - cfg.player_h / 2.0);
        assert_eq!(p.dx, 0.0);
        assert_eq!(p.dy, 0.0);
    }

    #[test]
    fn free_fall_adds_exactly_gravity() {
        // 320x480 stage, 30x30 player at center, gravity 1.7:
        // one motion tick with no velocity adds exactly 1.7 to y.
        let cfg = cfg();
        let mut p = Player::new(&cfg);
        let y0 = p.y;
        p.step_motion(&cfg);
        assert_eq!(p.y, y0 + 1.7);
        assert_eq!(p.x, cfg.width / 2.0 - cfg.player_w / 2.0);
    }

    #[test]
    fn velocity_applies_before_gravity() {
        let cfg = cfg();
        let mut p = Player::new(&cfg);
        p.apply_input(FrameInput { right: true, up: true, ..FrameInput::NONE });
        let (x0, y0) = (p.x, p.y);
        p.step_motion(&cfg);
        assert_eq!(p.x, x0 + p.speed);
        assert_eq!(p.y, y0 - p.speed + cfg.gravity);
    }

    #[test]
    fn opposing_axes_cancel() {
        let cfg = cfg();
        let mut p = Player::new(&cfg);
        p.apply_input(FrameInput { left: true, right: true, up: true, down: true });
        assert_eq!(p.dx, 0.0);
        assert_eq!(p.dy, 0.0);
    }

    #[test]
    fn clamped_to_left_edge() {
        let cfg = cfg();
        let mut p = Player::new(&cfg);
        p.x = 1.0;
        p.apply_input(FrameInput { left: true, ..FrameInput::NONE });
        p.step_motion(&cfg);
        assert_eq!(p.x, 0.0);
    }

    #[test]
    fn clamped_to_right_edge() {
        let cfg = cfg();
        let mut p = Player::new(&cfg);
        p.x = cfg.width - p.w - 1.0;
        p.apply_input(FrameInput { right: true, ..FrameInput::NONE });
        p.step_motion(&cfg);
        assert_eq!(p.x, cfg.width - p.w);
    }

    #[test]
    fn bottom_clamp_applies_before_gravity() {
        // Steering down at the floor clamps to height-h, then gravity
        // pushes past it — that overhang is what the lose check reads.
        let cfg = cfg();
        let mut p = Player::new(&cfg);
        p.y = cfg.height - p.h;
        p.apply_input(FrameInput { down: true, ..FrameInput::NONE });
        p.step_motion(&cfg);
        assert_eq!(p.y, cfg.height - p.h + cfg.gravity);
    }

    #[test]
    fn top_clamp() {
        let cfg = cfg();
        let mut p = Player::new(&cfg);
        p.y = 2.0;
        p.apply_input(FrameInput { up: true, ..FrameInput::NONE });
        p.step_motion(&cfg);
        // clamped to 0, then gravity
        assert_eq!(p.y, cfg.gravity);
    }

    #[test]
    fn no_terminal_velocity() {
        let cfg = cfg();
        let mut p = Player::new(&cfg);
        p.y = 0.0;
        let mut last = p.y;
        for _ in 0..5 {
            p.step_motion(&cfg);
            assert_eq!(p.y, last + cfg.gravity);
            last = p.y;
        }
    }
}

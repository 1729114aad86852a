/// Platform stream: the endless-scroll illusion.
///
/// A fixed-size ring of gapped platforms stands in for an infinite
/// descent. Platforms scroll downward uniformly; whenever the front
/// (bottom-most, oldest) platform leaves the stage, it is popped and a
/// fresh one is pushed at the back, one spacing above the current top.
///
/// Deque ordering invariant: front = largest y (scrolled furthest down),
/// back = smallest y. Consecutive y-origins differ by `platform_gap`.

use std::collections::VecDeque;

use rand::Rng;

use crate::config::WorldConfig;

#[derive(Clone, Copy, Debug)]
pub struct Platform {
    /// Top edge.
    pub y: f32,
    /// Left edge of the passable gap.
    pub gap_x: f32,
    pub gap_width: f32,
    /// Idempotence marker: set once when the platform passes the player.
    pub scored: bool,
}

impl Platform {
    /// Create a platform at `y` with a randomly placed gap.
    ///
    /// gap_width ∈ [min_gap_width, width/2] and the gap always fits
    /// on-stage; min_gap_width > player width guarantees passability.
    pub fn create(y: f32, cfg: &WorldConfig, rng: &mut impl Rng) -> Self {
        let min_gap = cfg.min_gap_width();
        let gap_width = min_gap + rng.random::<f32>() * (cfg.width / 2.0 - min_gap);
        let gap_x = rng.random::<f32>() * (cfg.width - gap_width);
        Platform { y, gap_x, gap_width, scored: false }
    }

    /// Is the horizontal span [x, x+w] entirely inside the gap?
    #[inline]
    pub fn gap_contains(&self, x: f32, w: f32) -> bool {
        x >= self.gap_x && x + w <= self.gap_x + self.gap_width
    }

    /// Does the vertical span [y, y+h] overlap this platform's slab?
    #[inline]
    pub fn overlaps_vertically(&self, y: f32, h: f32, platform_height: f32) -> bool {
        y + h > self.y && y < self.y + platform_height
    }
}

pub struct PlatformStream {
    platforms: VecDeque<Platform>,
}

impl PlatformStream {
    pub fn new() -> Self {
        PlatformStream { platforms: VecDeque::new() }
    }

    /// Fill the stream: platforms spaced `platform_gap` apart covering
    /// the visible stage plus one screen of lookahead above it.
    /// Front of the deque ends up bottom-most.
    pub fn seed(&mut self, cfg: &WorldConfig, rng: &mut impl Rng) {
        self.platforms.clear();
        let mut y = -cfg.height;
        while y < cfg.height {
            self.platforms.push_front(Platform::create(y, cfg, rng));
            y += cfg.platform_gap;
        }
    }

    /// Scroll every platform down by `speed`. Pure translation.
    pub fn advance(&mut self, speed: f32) {
        for plat in &mut self.platforms {
            plat.y += speed;
        }
    }

    /// Pop platforms whose top edge has left the stage; push a
    /// replacement one spacing above the current back. Remove/add are
    /// always paired, so the stream length never changes.
    pub fn recycle(&mut self, cfg: &WorldConfig, rng: &mut impl Rng) {
        while self.platforms.front().is_some_and(|p| p.y > cfg.height) {
            self.platforms.pop_front();
            let next_y = self
                .platforms
                .back()
                .map_or(0.0, |b| b.y - cfg.platform_gap);
            self.platforms.push_back(Platform::create(next_y, cfg, rng));
        }
    }

    #[allow(dead_code)]
    #[inline]
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    #[allow(dead_code)]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Platform> {
        self.platforms.iter_mut()
    }

    /// Test scaffolding: build a stream from explicit platforms.
    #[cfg(test)]
    pub(crate) fn from_vec(platforms: Vec<Platform>) -> Self {
        PlatformStream { platforms: platforms.into() }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn cfg() -> WorldConfig {
        GameConfig::default().world
    }

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    fn seeded_stream(seed: u64) -> (WorldConfig, Pcg32, PlatformStream) {
        let cfg = cfg();
        let mut rng = rng(seed);
        let mut stream = PlatformStream::new();
        stream.seed(&cfg, &mut rng);
        (cfg, rng, stream)
    }

    // ── Platform::create ──

    proptest! {
        #[test]
        fn generated_gaps_fit_and_are_passable(seed in any::<u64>()) {
            let cfg = cfg();
            let mut rng = rng(seed);
            for i in 0..50 {
                let p = Platform::create(i as f32 * 10.0, &cfg, &mut rng);
                prop_assert!(p.gap_x >= 0.0);
                prop_assert!(p.gap_x + p.gap_width <= cfg.width);
                prop_assert!(p.gap_width >= cfg.min_gap_width());
                prop_assert!(p.gap_width <= cfg.width / 2.0);
                prop_assert!(!p.scored);
            }
        }
    }

    #[test]
    fn gap_contains_checks_both_edges() {
        let p = Platform { y: 0.0, gap_x: 50.0, gap_width: 100.0, scored: false };
        assert!(p.gap_contains(50.0, 30.0));
        assert!(p.gap_contains(120.0, 30.0));
        assert!(!p.gap_contains(49.0, 30.0));   // pokes out left
        assert!(!p.gap_contains(121.0, 30.0));  // pokes out right
        assert!(!p.gap_contains(0.0, 30.0));
    }

    #[test]
    fn vertical_overlap_is_half_open() {
        let p = Platform { y: 100.0, gap_x: 0.0, gap_width: 50.0, scored: false };
        assert!(p.overlaps_vertically(95.0, 30.0, 10.0));
        assert!(p.overlaps_vertically(105.0, 30.0, 10.0));
        assert!(!p.overlaps_vertically(70.0, 30.0, 10.0));  // bottom touches top
        assert!(!p.overlaps_vertically(110.0, 30.0, 10.0)); // top touches bottom
    }

    // ── seed ──

    #[test]
    fn seed_covers_stage_plus_lookahead() {
        let (cfg, _, stream) = seeded_stream(1);
        let front_y = stream.iter().next().unwrap().y;
        let back_y = stream.iter().last().unwrap().y;
        assert!(front_y < cfg.height);
        assert!(front_y >= cfg.height - cfg.platform_gap);
        assert!(back_y <= -cfg.height + cfg.platform_gap);
    }

    #[test]
    fn seed_orders_front_bottom_most_with_constant_spacing() {
        let (cfg, _, stream) = seeded_stream(2);
        let ys: Vec<f32> = stream.iter().map(|p| p.y).collect();
        for pair in ys.windows(2) {
            assert!((pair[0] - pair[1] - cfg.platform_gap).abs() < 1e-3);
        }
    }

    // ── advance ──

    #[test]
    fn advance_translates_uniformly() {
        let (_, _, mut stream) = seeded_stream(3);
        let before: Vec<f32> = stream.iter().map(|p| p.y).collect();
        stream.advance(2.5);
        for (a, b) in stream.iter().zip(&before) {
            assert_eq!(a.y, b + 2.5);
        }
    }

    // ── recycle ──

    #[test]
    fn recycle_is_noop_while_front_on_stage() {
        let (cfg, mut rng, mut stream) = seeded_stream(4);
        let before: Vec<f32> = stream.iter().map(|p| p.y).collect();
        stream.recycle(&cfg, &mut rng);
        let after: Vec<f32> = stream.iter().map(|p| p.y).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn recycle_preserves_length() {
        let (cfg, mut rng, mut stream) = seeded_stream(5);
        let n = stream.len();
        // Scroll far enough to force many recycles.
        for _ in 0..2000 {
            stream.advance(3.0);
            stream.recycle(&cfg, &mut rng);
            assert_eq!(stream.len(), n);
        }
    }

    #[test]
    fn recycle_keeps_spacing_and_order() {
        let (cfg, mut rng, mut stream) = seeded_stream(6);
        for _ in 0..500 {
            stream.advance(4.0);
            stream.recycle(&cfg, &mut rng);
        }
        let ys: Vec<f32> = stream.iter().map(|p| p.y).collect();
        for pair in ys.windows(2) {
            assert!((pair[0] - pair[1] - cfg.platform_gap).abs() < 1e-2);
        }
        // No platform fully off the bottom remains.
        assert!(ys.iter().all(|&y| y <= cfg.height));
    }

    #[test]
    fn recycled_platforms_are_unscored() {
        let (cfg, mut rng, mut stream) = seeded_stream(7);
        for p in stream.iter_mut() {
            p.scored = true;
        }
        for _ in 0..200 {
            stream.advance(4.0);
            stream.recycle(&cfg, &mut rng);
        }
        assert!(stream.iter().any(|p| !p.scored));
    }
}

/// Events emitted during a simulation step.
/// The presentation layer consumes these for logging and the end panel.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    /// A platform scrolled past the player and was counted.
    PlatformCleared { score: u32 },
    /// Difficulty milestone: scroll speed was raised.
    SpeedRaised { speed: f32 },
    /// Win threshold reached. Terminal.
    Won { score: u32 },
    /// Player was crushed against the bottom boundary. Terminal.
    Crushed { score: u32 },
}

/// Input adapter: polled control-state snapshots.
///
/// Asynchronous terminal events (keys, mouse) are drained once per
/// frame into this tracker; the simulation only ever sees the
/// `FrameInput` snapshot taken at the start of its tick, which keeps
/// the step deterministic and replayable without a live input source.
///
/// Key-hold detection uses crossterm Release events when the terminal
/// reports them, with a timeout fallback for terminals that don't.
///
/// The pointer variant mirrors touch controls: while a button is held,
/// direction is derived from the pointer's offset against the stage
/// center, per axis, outside a configured deadzone; both axes drop to
/// zero on release.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind, poll,
};

use crate::config::WorldConfig;
use crate::domain::player::FrameInput;
use super::renderer::Viewport;

/// After this duration without a Press/Repeat event, consider the key
/// released. Fallback for terminals without Release reporting.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key bindings ──

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned "not held" → "held" during the most
    /// recent drain. Used for edge-triggered actions (restart, quit).
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    raw_events: Vec<KeyEvent>,

    /// Terminal cell under the pointer while a button is held.
    pointer: Option<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            pointer: None,
        }
    }

    /// Drain all pending terminal events and update key/pointer state.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    self.raw_events.push(key);
                    match key.kind {
                        KeyEventKind::Release => {
                            self.last_active.remove(&key.code);
                        }
                        _ => {
                            let was_held = self.is_held(key.code);
                            self.last_active.insert(key.code, Instant::now());
                            if !was_held {
                                self.fresh_presses.push(key.code);
                            }
                        }
                    }
                }
                Ok(Event::Mouse(m)) => match m.kind {
                    MouseEventKind::Down(_) | MouseEventKind::Drag(_) => {
                        self.pointer = Some((m.column, m.row));
                    }
                    MouseEventKind::Up(_) => {
                        self.pointer = None;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Expire keys that have timed out.
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held down? (continuous actions)
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Snapshot the directional control state for one tick.
    /// Keyboard axes and the pointer variant are merged per axis.
    pub fn frame_input(&self, view: Viewport, cfg: &WorldConfig) -> FrameInput {
        let mut fi = FrameInput {
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
            up: self.any_held(KEYS_UP),
            down: self.any_held(KEYS_DOWN),
        };

        if let Some((col, row)) = self.pointer {
            if let Some((wx, wy)) = view.cell_to_world(col, row, cfg) {
                let axes = pointer_axes(wx, wy, cfg);
                fi.left |= axes.left;
                fi.right |= axes.right;
                fi.up |= axes.up;
                fi.down |= axes.down;
            }
        }

        fi
    }
}

/// Direction from a stage-space pointer position: per axis, movement
/// applies only when the offset from the stage center exceeds the
/// deadzone.
fn pointer_axes(wx: f32, wy: f32, cfg: &WorldConfig) -> FrameInput {
    let off_x = wx - cfg.width / 2.0;
    let off_y = wy - cfg.height / 2.0;
    FrameInput {
        left: off_x < -cfg.pointer_deadzone,
        right: off_x > cfg.pointer_deadzone,
        up: off_y < -cfg.pointer_deadzone,
        down: off_y > cfg.pointer_deadzone,
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Creep movement along axis-aligned waypoint routes.
//!
//! A [`Creep`] converts a tile route into world-space tile centres, keeps only
//! the endpoints and corners, and walks that polyline at a speed reduced by an
//! optional slow effect. When a creep arrives on a corner it stops for the
//! rest of the tick, so it never cuts across the corner in a single step.

use std::time::Duration;

use glam::Vec2;
use path_defence_core::CellCoord;

/// Distance below which a creep counts as standing on its target waypoint.
const EPSILON: f32 = 1e-6;
/// Per-axis tolerance used to decide that a step landed on a waypoint.
const ARRIVAL_TOLERANCE: f32 = 0.001;
/// Strongest slow a creep can suffer.
pub const MAX_SLOW: f32 = 0.95;
/// Fraction of base speed a creep keeps regardless of slows.
pub const MIN_SPEED_FACTOR: f32 = 0.05;

/// Outcome of advancing a creep by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The creep is still walking, or cannot move because it is dead.
    InTransit,
    /// The creep stands on the final waypoint.
    Reached,
}

/// Single-slot slow effect; only the strongest slow is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Slow {
    fraction: f32,
    remaining: Duration,
}

/// Walker that follows a fixed waypoint polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct Creep {
    waypoints: Vec<Vec2>,
    position: Vec2,
    target: usize,
    path_index: usize,
    base_speed: f32,
    hp: f32,
    max_hp: f32,
    alive: bool,
    bounty: u32,
    slow: Slow,
}

impl Creep {
    /// Creates a creep walking the centres of the tiles in `route`.
    ///
    /// `speed_tiles_per_sec` is converted to world units using `tile_length`.
    /// An empty route places the creep at the world origin.
    #[must_use]
    pub fn new(
        route: &[CellCoord],
        tile_length: f32,
        speed_tiles_per_sec: f32,
        max_hp: f32,
    ) -> Self {
        let half = tile_length * 0.5;
        let centres = route
            .iter()
            .map(|tile| {
                Vec2::new(
                    tile.column() as f32 * tile_length + half,
                    tile.row() as f32 * tile_length + half,
                )
            })
            .collect();
        Self::from_waypoints(
            centres,
            speed_tiles_per_sec.max(0.0) * tile_length,
            max_hp,
        )
    }

    /// Creates a creep walking explicit world-space points at
    /// `speed_units_per_sec`.
    ///
    /// Repeated points are dropped and straight runs collapse to their
    /// endpoints.
    #[must_use]
    pub fn from_waypoints(points: Vec<Vec2>, speed_units_per_sec: f32, max_hp: f32) -> Self {
        let mut waypoints = compress_collinear(dedup(points));
        if waypoints.is_empty() {
            waypoints.push(Vec2::ZERO);
        }
        let position = waypoints[0];
        let target = 1.min(waypoints.len() - 1);
        Self {
            waypoints,
            position,
            target,
            path_index: 0,
            base_speed: speed_units_per_sec.max(0.0),
            hp: max_hp,
            max_hp,
            alive: true,
            bounty: 0,
            slow: Slow::default(),
        }
    }

    /// Sets the gold awarded for killing the creep.
    #[must_use]
    pub fn with_bounty(mut self, bounty: u32) -> Self {
        self.bounty = bounty;
        self
    }

    /// Applies or refreshes a slow.
    ///
    /// `fraction` is clamped into `[0, MAX_SLOW]`. A stronger slow replaces the
    /// current one; an equally strong slow only extends the remaining time.
    pub fn apply_slow(&mut self, fraction: f32, duration: Duration) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, MAX_SLOW)
        };
        let stronger = fraction > self.slow.fraction;
        let longer = fraction == self.slow.fraction && duration > self.slow.remaining;
        if stronger || longer {
            self.slow = Slow {
                fraction,
                remaining: duration,
            };
        }
    }

    /// Current speed in world units per second after slows.
    #[must_use]
    pub fn current_speed(&self) -> f32 {
        self.base_speed * (1.0 - self.slow.fraction).max(MIN_SPEED_FACTOR)
    }

    /// Subtracts `amount` hit points; the creep dies at zero or below.
    ///
    /// Negative and NaN damage is ignored, as is damage to a dead creep.
    pub fn take_damage(&mut self, amount: f32) {
        if !self.alive || amount.is_nan() || amount <= 0.0 {
            return;
        }
        self.hp -= amount;
        if self.hp <= 0.0 {
            self.alive = false;
        }
    }

    /// Walks the creep forward by `dt`.
    ///
    /// The slow timer ticks first. Movement then consumes `speed * dt` along
    /// the polyline, snapping onto every waypoint it reaches, and discards the
    /// remaining distance when that waypoint is a corner.
    pub fn advance(&mut self, dt: Duration) -> Advance {
        if !self.alive {
            return Advance::InTransit;
        }

        self.slow.remaining = self.slow.remaining.saturating_sub(dt);
        if self.slow.remaining.is_zero() {
            self.slow.fraction = 0.0;
        }

        let mut budget = self.current_speed() * dt.as_secs_f32();
        while budget > 0.0 && self.target < self.waypoints.len() {
            let goal = self.waypoints[self.target];
            let offset = goal - self.position;
            let distance = offset.length();

            if distance <= EPSILON {
                self.target += 1;
                self.path_index = self.target;
                continue;
            }

            let step = budget.min(distance);
            self.position += offset / distance.max(EPSILON) * step;
            budget -= step;

            if (self.position - goal).abs().max_element() > ARRIVAL_TOLERANCE {
                break;
            }

            self.position = goal;
            let previous = self.waypoints[self.target.saturating_sub(1)];
            self.target += 1;
            self.path_index = self.target;
            match self.waypoints.get(self.target) {
                Some(&next) if heading(previous, goal) != heading(goal, next) => break,
                Some(_) => {}
                None => return Advance::Reached,
            }
        }

        if self.target >= self.waypoints.len() {
            self.position = self.waypoints[self.waypoints.len() - 1];
            return Advance::Reached;
        }
        Advance::InTransit
    }

    /// World-space position of the creep.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hp(&self) -> f32 {
        self.hp
    }

    /// Hit points at spawn.
    #[must_use]
    pub const fn max_hp(&self) -> f32 {
        self.max_hp
    }

    /// Reports whether the creep is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Gold awarded for killing the creep.
    #[must_use]
    pub const fn bounty(&self) -> u32 {
        self.bounty
    }

    /// Number of waypoints reached so far. Never decreases.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Compressed waypoint polyline the creep follows.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Active slow fraction, zero when unslowed.
    #[must_use]
    pub const fn slow_pct(&self) -> f32 {
        self.slow.fraction
    }

    /// Time left on the active slow.
    #[must_use]
    pub const fn slow_remaining(&self) -> Duration {
        self.slow.remaining
    }
}

fn dedup(mut points: Vec<Vec2>) -> Vec<Vec2> {
    points.dedup();
    points
}

/// Keeps endpoints plus every point where the heading changes.
fn compress_collinear(points: Vec<Vec2>) -> Vec<Vec2> {
    if points.len() <= 2 {
        return points;
    }
    let mut kept = vec![points[0]];
    for window in points.windows(2).skip(1) {
        let (current, next) = (window[0], window[1]);
        let anchor = kept[kept.len() - 1];
        if heading(anchor, current) != heading(current, next) {
            kept.push(current);
        }
    }
    kept.push(points[points.len() - 1]);
    kept
}

fn heading(from: Vec2, to: Vec2) -> (i8, i8) {
    (axis_sign(to.x - from.x), axis_sign(to.y - from.y))
}

fn axis_sign(delta: f32) -> i8 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

//! Tree layout and the hedgehog that catches falling apples
//!
//! Coordinates are in the 800x600 scene the front end draws into
//! (y grows downward, like the DOM).

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Green parts of the crown as (cx, cy, r)
pub const FOLIAGE_CIRCLES: [(f32, f32, f32); 7] = [
    (250.0, 200.0, 42.0),
    (330.0, 150.0, 50.0),
    (400.0, 130.0, 60.0),
    (470.0, 150.0, 50.0),
    (550.0, 200.0, 42.0),
    (290.0, 180.0, 45.0),
    (510.0, 180.0, 45.0),
];

/// Where apples like to hang
pub const CROWN_ANCHORS: [(f32, f32); 12] = [
    (250.0, 180.0),
    (330.0, 135.0),
    (400.0, 115.0),
    (470.0, 135.0),
    (550.0, 180.0),
    (340.0, 145.0),
    (370.0, 125.0),
    (430.0, 125.0),
    (460.0, 145.0),
    (400.0, 130.0),
    (290.0, 160.0),
    (510.0, 160.0),
];

/// Most apples the tree can show at once
pub const MAX_APPLES: usize = CROWN_ANCHORS.len();
/// Random offset applied to an anchor (each axis, +/-)
pub const APPLE_JITTER: f32 = 10.0;
/// Jittered candidates tried before falling back to a foliage centre
pub const PLACEMENT_ATTEMPTS: u32 = 5;

/// Scene width, used to centre the hedgehog
pub const SCENE_WIDTH: f32 = 800.0;
/// Height at which falling fruit reaches the hedgehog
pub const GROUND_Y: f32 = 520.0;
/// Offset between the hedgehog's left edge and its mouth
pub const HEDGEHOG_CATCH_OFFSET: f32 = 75.0;
/// Hedgehog speed (15 px every 30 ms)
pub const HEDGEHOG_SPEED: f32 = 500.0;
/// Distance at which the hedgehog snaps onto its target
pub const HEDGEHOG_SNAP: f32 = 5.0;

/// True if `pos` lies strictly inside any foliage circle
pub fn in_foliage(pos: Vec2) -> bool {
    FOLIAGE_CIRCLES
        .iter()
        .any(|&(cx, cy, r)| pos.distance(Vec2::new(cx, cy)) < r)
}

/// An apple on the tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Apple {
    pub id: u32,
    pub pos: Vec2,
    pub picked: bool,
}

/// The apples for one round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Orchard {
    pub apples: Vec<Apple>,
}

impl Orchard {
    /// Hang `count` apples (capped at `MAX_APPLES`) inside the crown
    pub fn grow<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Self {
        let mut anchors = CROWN_ANCHORS;
        anchors.shuffle(rng);

        let count = (count as usize).min(MAX_APPLES);
        let apples = anchors
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, &(ax, ay))| {
                let anchor = Vec2::new(ax, ay);
                let pos = (0..PLACEMENT_ATTEMPTS)
                    .map(|_| {
                        anchor
                            + Vec2::new(
                                rng.random_range(-APPLE_JITTER..APPLE_JITTER),
                                rng.random_range(-APPLE_JITTER..APPLE_JITTER),
                            )
                    })
                    .find(|&candidate| in_foliage(candidate))
                    .unwrap_or_else(|| {
                        let (cx, cy, _) = FOLIAGE_CIRCLES[i % FOLIAGE_CIRCLES.len()];
                        Vec2::new(cx, cy)
                    });
                Apple {
                    id: i as u32,
                    pos,
                    picked: false,
                }
            })
            .collect();

        Self { apples }
    }

    /// Pick an apple. Returns where it was hanging, or None if it
    /// doesn't exist or was already picked.
    pub fn pick(&mut self, id: u32) -> Option<Vec2> {
        let apple = self.apples.iter_mut().find(|a| a.id == id)?;
        if apple.picked {
            return None;
        }
        apple.picked = true;
        Some(apple.pos)
    }

    /// Apples still on the tree
    pub fn remaining(&self) -> impl Iterator<Item = &Apple> {
        self.apples.iter().filter(|a| !a.picked)
    }
}

/// The hedgehog (receptacle) running along the ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hedgehog {
    /// Left edge, in scene pixels
    pub x: f32,
    /// Where it is heading, if anywhere
    pub target: Option<f32>,
}

impl Default for Hedgehog {
    fn default() -> Self {
        Self {
            x: SCENE_WIDTH / 2.0,
            target: None,
        }
    }
}

impl Hedgehog {
    /// Run to catch an apple falling at `apple_x`
    pub fn chase(&mut self, apple_x: f32) {
        self.target = Some(apple_x - HEDGEHOG_CATCH_OFFSET);
    }

    /// Move toward the target for `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let Some(target) = self.target else { return };
        let delta = target - self.x;
        if delta.abs() < HEDGEHOG_SNAP {
            self.x = target;
            self.target = None;
            return;
        }
        let max_step = HEDGEHOG_SPEED * dt;
        self.x += delta.clamp(-max_step, max_step);
    }

    pub fn is_moving(&self) -> bool {
        self.target.is_some()
    }
}

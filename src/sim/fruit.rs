//! A single body and its per-body physics
//!
//! Integration is position-based (Verlet): velocity is never stored, it is
//! the difference between `pos` and `last_pos`.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::math::{rotate90, rsqrt};
use super::radii::RadiusTable;
use crate::consts::*;
use crate::merge_score;

/// Converts radians to the 0..65536 rotation domain
const ANGLE_SCALE: f32 = 32768.0 / std::f32::consts::PI;
/// Rolling speed per unit of tangential velocity
const ROLL_RATE: f32 = 0.1 / std::f32::consts::PI;

/// One physical body
///
/// `repr(C)` and `Pod` so the live array can be viewed as raw bytes for
/// hashing and bit-exact comparison.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Fruit {
    pub pos: Vec2,
    pub last_pos: Vec2,
    /// Radius of the current tier
    pub r: f32,
    /// `r * r`
    pub r2: f32,
    /// Cosmetic angle, 65536 ticks per turn
    pub rotation: u32,
    /// Tier index into the radius table
    pub r_index: u32,
    /// Sum of positional corrections this pass (drives rolling)
    pub rel_sum: Vec2,
    pub flags: u32,
    /// Last frame this body rested on the floor or on a grounded body (0 = never)
    pub bottom_touch_frame: u32,
}

impl Fruit {
    /// Had a contact or wall correction this pass
    pub const TOUCHED: u32 = 1;
    /// Preview body, never part of the live set
    pub const SENSOR: u32 = 2;
    /// Merged away, pending swap-removal
    pub const DELETABLE: u32 = 4;

    /// Create a resting body of the given tier (clamped)
    pub fn new(pos: Vec2, tier: u32, radii: &RadiusTable, rotation: u32) -> Self {
        let mut fruit = Self {
            pos,
            last_pos: pos,
            rotation: rotation & 0xFFFF,
            ..Self::default()
        };
        fruit.set_tier(tier, radii);
        fruit
    }

    /// Set tier and refresh the cached radius and radius squared
    #[inline]
    pub fn set_tier(&mut self, tier: u32, radii: &RadiusTable) {
        self.r_index = RadiusTable::clamp_tier(tier);
        self.r = radii.get(self.r_index);
        self.r2 = self.r * self.r;
    }

    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    #[inline]
    pub fn is_touched(&self) -> bool {
        self.has_flag(Self::TOUCHED)
    }

    #[inline]
    pub fn is_sensor(&self) -> bool {
        self.has_flag(Self::SENSOR)
    }

    #[inline]
    pub fn is_deletable(&self) -> bool {
        self.has_flag(Self::DELETABLE)
    }

    /// Implicit per-frame velocity
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.pos - self.last_pos
    }

    /// Verlet step: apply gravity and drag, reset the per-pass accumulators
    pub fn integrate(&mut self, gravity: f32) {
        let diff = self.velocity() * DRAG;
        self.last_pos = self.pos;
        self.pos.y += gravity;
        self.pos += diff;
        self.rel_sum = Vec2::ZERO;
        self.flags &= !Self::TOUCHED;
    }

    /// Whether the two circles overlap (no side effects)
    #[inline]
    pub fn touches(&self, other: &Fruit) -> bool {
        let rsum = self.r + other.r;
        (other.pos - self.pos).length_squared() < rsum * rsum
    }

    /// Resolve an overlap with `other`
    ///
    /// Equal tiers merge into `self` (or annihilate at the top tier) and the
    /// merge score is returned. Different tiers are pushed apart, the smaller
    /// body moving more, and 0 is returned. Non-overlapping pairs are left
    /// untouched.
    pub fn keep_distance(&mut self, other: &mut Fruit, radii: &RadiusTable, frame_index: u32) -> u32 {
        let mut diff = other.pos - self.pos;
        let d2 = diff.length_squared();
        let rsum = self.r + other.r;
        if d2 >= rsum * rsum {
            return 0;
        }

        if self.r_index == other.r_index {
            let score = merge_score(self.r_index);
            other.flags |= Self::DELETABLE;
            if self.r_index >= radii.max_tier() {
                self.flags |= Self::DELETABLE;
                return score;
            }
            self.set_tier(self.r_index + 1, radii);
            self.pos = (self.pos + other.pos) * 0.5;
            self.last_pos = self.pos;
            self.bottom_touch_frame = 0;
            return score;
        }

        // d2 * rsqrt(d2) is the center distance
        let dr = rsqrt(d2);
        let factor = (rsum - d2 * dr) * NUDGE_FRACTION / rsum;
        diff *= factor;
        other.pos += diff * self.r;
        self.pos -= diff * other.r;

        diff *= ROLL_GAIN;
        self.rel_sum += diff;
        self.flags |= Self::TOUCHED;
        other.rel_sum -= diff;
        other.flags |= Self::TOUCHED;

        // A body pushed down onto a grounded body is grounded too
        if self.bottom_touch_frame == frame_index && diff.y < -diff.x.abs() * 0.5 {
            other.bottom_touch_frame = frame_index;
        } else if other.bottom_touch_frame == frame_index {
            self.bottom_touch_frame = frame_index;
        }
        0
    }

    /// Clamp to the side walls and floor; the top is open
    pub fn constrain_inside(&mut self, frame_index: u32) {
        if self.pos.x < self.r {
            self.pos.x = self.r;
            self.rel_sum += Vec2::new(self.r, 0.0);
            self.flags |= Self::TOUCHED;
        }
        if self.pos.x > WORLD_SIZE_X - self.r {
            self.pos.x = WORLD_SIZE_X - self.r;
            self.rel_sum += Vec2::new(-self.r, 0.0);
            self.flags |= Self::TOUCHED;
        }
        if self.pos.y < WORLD_SANITY_TOP {
            self.pos.y = WORLD_SANITY_TOP;
        }
        if self.pos.y > WORLD_SIZE_Y - self.r {
            self.pos.y = WORLD_SIZE_Y - self.r;
            self.rel_sum += Vec2::new(0.0, self.r);
            self.flags |= Self::TOUCHED;
            self.bottom_touch_frame = frame_index;
        }
    }

    /// Integrate the cosmetic rotation from the accumulated contact corrections
    pub fn roll(&mut self) {
        if !self.is_touched() {
            return;
        }
        let vel = self.velocity();
        if vel.length_squared() <= ROLL_MIN_SPEED_SQ {
            return;
        }
        let mut axis = rotate90(self.rel_sum);
        axis *= rsqrt(axis.length_squared());
        let angle_vel = axis.dot(vel) * ROLL_RATE;
        let ticks = (angle_vel * ANGLE_SCALE).round() as i32;
        self.rotation = self.rotation.wrapping_add(ticks as u32) & 0xFFFF;
    }
}

//! Discrete heading sectors ("consolidated angles").
//!
//! A unit's sprite sheet only has `max_angle_count` facings, so headings are
//! bucketed into that many equal sectors instead of being tracked as a
//! continuous angle. Sector indices are always in `[0, max_angle_count)`.
//!
//! Sprite sheets start their first facing three quarters of a turn away from
//! the math-space zero heading, so every consolidated sector carries a fixed
//! offset of `floor(max_angle_count * 0.75)`.

use crate::geometry::normalize_degrees;

/// Direction of a single sector step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    /// +1 sector per step
    Right,
    /// -1 sector per step
    Left,
}

/// Fixed offset applied to every consolidated sector.
pub fn rotation_offset(max_angle_count: u32) -> u32 {
    (max_angle_count as f64 * 0.75).floor() as u32
}

/// Bucket a heading in degrees into a sector index, including the sprite offset.
///
/// Returns 0 when the unit has no rotation modelling (`max_angle_count <= 1`).
pub fn consolidate_angle(degrees: f64, max_angle_count: u32) -> u32 {
    if max_angle_count <= 1 {
        return 0;
    }
    let sector_width = 360.0 / max_angle_count as f64;
    let bucket = (normalize_degrees(degrees) / sector_width).floor() as u64;
    let n = max_angle_count as u64;
    ((bucket + rotation_offset(max_angle_count) as u64) % n) as u32
}

/// Number of single-sector steps needed to get from `from` to `to` turning in
/// `direction`, wrapping modulo `max_angle_count`.
pub fn calculate_step_to(
    from: u32,
    to: u32,
    max_angle_count: u32,
    direction: TurnDirection,
) -> u32 {
    if max_angle_count <= 1 {
        return 0;
    }
    let n = max_angle_count as i64;
    let delta = match direction {
        TurnDirection::Right => to as i64 - from as i64,
        TurnDirection::Left => from as i64 - to as i64,
    };
    delta.rem_euclid(n) as u32
}

/// Both step counts at once: `(to_right, to_left)`.
pub fn sector_steps(from: u32, to: u32, max_angle_count: u32) -> (u32, u32) {
    (
        calculate_step_to(from, to, max_angle_count, TurnDirection::Right),
        calculate_step_to(from, to, max_angle_count, TurnDirection::Left),
    )
}

/// The cheaper way to turn, `None` if already facing `to`. Ties turn right.
pub fn shortest_turn(from: u32, to: u32, max_angle_count: u32) -> Option<TurnDirection> {
    let (right, left) = sector_steps(from, to, max_angle_count);
    if right == 0 && left == 0 {
        None
    } else if right <= left {
        Some(TurnDirection::Right)
    } else {
        Some(TurnDirection::Left)
    }
}

/// The neighbouring sector one step in `direction`.
pub fn step_sector(sector: u32, max_angle_count: u32, direction: TurnDirection) -> u32 {
    if max_angle_count <= 1 {
        return 0;
    }
    let (sector, n) = (sector as u64, max_angle_count as u64);
    let next = match direction {
        TurnDirection::Right => (sector + 1) % n,
        TurnDirection::Left => (sector + n - 1) % n,
    };
    next as u32
}

//! Angle math shared by the engine, the gesture layer and the layout model.
//!
//! All angles are degrees. Wheel rotation is unbounded and accumulates across
//! spins; only the helpers here fold it back into a single turn.

/// Offset between the wheel's drawing frame and the fixed pointer.
///
/// The wheel artwork is pre-rotated by 90° and the pointer sits at the top,
/// which puts the pointer at 180° in wheel coordinates.
pub const POINTER_OFFSET_DEG: f64 = 180.0;

/// Angular width of one segment for a wheel with `count` segments.
///
/// A wheel with no segments is treated as one full slice.
#[inline]
pub fn segment_angle(count: usize) -> f64 {
    360.0 / count.max(1) as f64
}

/// Fold a pointer delta into `[-180, 180]` so a drag across the ±180° seam
/// does not read as a near-full turn.
#[inline]
pub fn normalize_delta(delta: f64) -> f64 {
    let mut delta = delta;
    if delta > 180.0 {
        delta -= 360.0;
    }
    if delta < -180.0 {
        delta += 360.0;
    }
    delta
}

/// Pointer angle of `(x, y)` around the centre `(cx, cy)`, screen coordinates
/// (y grows downward), in degrees.
#[inline]
pub fn pointer_angle(x: f64, y: f64, cx: f64, cy: f64) -> f64 {
    (y - cy).atan2(x - cx).to_degrees()
}

/// Index of the boundary slot currently under the pointer.
///
/// Consecutive values differ exactly when a peg passes the pointer, which is
/// what drives ticks and pointer kicks. May be negative.
#[inline]
pub fn boundary_slot(rotation: f64, segment_angle: f64) -> i64 {
    ((rotation - POINTER_OFFSET_DEG) / segment_angle).floor() as i64
}

/// Signed distance from the centre of the segment under the pointer.
///
/// Negative when the pointer sits in the first half of the segment.
#[inline]
pub fn offset_from_segment_center(rotation: f64, segment_angle: f64) -> f64 {
    let angle_in_segment = (rotation - POINTER_OFFSET_DEG).rem_euclid(segment_angle);
    angle_in_segment - segment_angle / 2.0
}

/// Segment index under the pointer for a resting rotation.
///
/// `floor(((180 - (rotation mod 360) + 360) mod 360) / segment_angle)`,
/// clamped so float rounding at the last edge never yields `count`.
pub fn winning_index(rotation: f64, count: usize) -> usize {
    let count = count.max(1);
    let degrees = (POINTER_OFFSET_DEG - (rotation % 360.0) + 360.0) % 360.0;
    let index = (degrees / segment_angle(count)).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(count - 1)
    }
}

/// Rotation that puts the centre of segment `index` under the pointer,
/// modulo full turns.
#[inline]
pub fn center_rotation(index: usize, count: usize) -> f64 {
    let angle = segment_angle(count);
    POINTER_OFFSET_DEG - (index as f64 * angle + angle / 2.0)
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure formation math mapping a rank index to an offset from the leader.
//!
//! Followers settle into an elliptical Vogel spiral: successive ranks rotate
//! by the golden angle while the radius grows with the square root of the
//! index, which packs the crowd densely without overlaps.

/// Golden-angle increment between successive ranks, in degrees.
const ANGLE_INCREMENT_DEGREES: f32 = 137.5;

/// Lateral semi-axis scale of the elliptical spiral.
const RADIUS_X: f32 = 0.5;

/// Travel-axis semi-axis scale of the elliptical spiral.
const RADIUS_Z: f32 = 0.25;

/// Offset of a formation rank relative to the leader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormationOffset {
    /// Lateral component of the offset.
    pub x: f32,
    /// Travel-axis component of the offset.
    pub z: f32,
}

impl FormationOffset {
    /// The zero offset occupied by the leader.
    pub const ZERO: Self = Self { x: 0.0, z: 0.0 };
}

/// Computes the spiral offset for the provided rank index.
///
/// Rank zero is the leader and always maps to [`FormationOffset::ZERO`].
#[must_use]
pub fn offset_for_rank(index: usize) -> FormationOffset {
    if index == 0 {
        return FormationOffset::ZERO;
    }

    let rank = index as f32;
    let angle = rank * ANGLE_INCREMENT_DEGREES.to_radians();
    let radius = rank.sqrt();

    FormationOffset {
        x: angle.cos() * RADIUS_X * radius,
        z: angle.sin() * RADIUS_Z * radius,
    }
}

#[cfg(test)]
mod tests {
    use super::{offset_for_rank, FormationOffset};

    #[test]
    fn leader_rank_has_zero_offset() {
        assert_eq!(offset_for_rank(0), FormationOffset::ZERO);
    }

    #[test]
    fn offsets_are_deterministic() {
        assert_eq!(offset_for_rank(17), offset_for_rank(17));
    }

    #[test]
    fn radius_grows_with_rank() {
        let near = offset_for_rank(1);
        let far = offset_for_rank(64);
        let near_len = (near.x * near.x + near.z * near.z).sqrt();
        let far_len = (far.x * far.x + far.z * far.z).sqrt();
        assert!(far_len > near_len);
    }

    #[test]
    fn spiral_is_elliptical() {
        // The lateral semi-axis is twice the travel semi-axis, so the
        // magnitude envelope along x exceeds the envelope along z.
        let max_x = (1..50)
            .map(|index| offset_for_rank(index).x.abs())
            .fold(0.0_f32, f32::max);
        let max_z = (1..50)
            .map(|index| offset_for_rank(index).z.abs())
            .fold(0.0_f32, f32::max);
        assert!(max_x > max_z);
    }

    #[test]
    fn first_rank_matches_golden_angle() {
        let offset = offset_for_rank(1);
        let angle = 137.5_f32.to_radians();
        assert!((offset.x - angle.cos() * 0.5).abs() < 1e-6);
        assert!((offset.z - angle.sin() * 0.25).abs() < 1e-6);
    }
}

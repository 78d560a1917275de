//! Hilbert-curve ordering of grid tiles.
//!
//! Neighbouring tiles land close together on the curve, so feeding the curve
//! position into a cyclic color ramp gives spatially coherent colors.

use crate::tile::GridCoordinate;

/// Distance of `coord` along the Hilbert curve filling its `2^z` x `2^z` grid,
/// in `[0, 4^z)`.
pub fn hilbert_index(coord: &GridCoordinate) -> u64 {
    let n = coord.side();
    let mut x = u64::from(coord.x());
    let mut y = u64::from(coord.y());
    let mut d = 0u64;

    let mut s = n >> 1;
    while s > 0 {
        let rx = u64::from((x & s) > 0);
        let ry = u64::from((y & s) > 0);
        d += s * s * ((3 * rx) ^ ry);

        // Rotate the quadrant so the sub-curve has the canonical orientation.
        if ry == 0 {
            if rx == 1 {
                x = n - 1 - x;
                y = n - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        s >>= 1;
    }
    d
}

/// Curve position normalized by the cell count `4^z`, in `[0, 1)`.
///
/// Distinct for every tile of a level up to z = 26; deeper levels exceed the
/// 53-bit mantissa and neighbouring tiles may share a position.
pub fn hilbert_position(coord: &GridCoordinate) -> f64 {
    let cells = 1u64 << (2 * u32::from(coord.z()));
    let position = hilbert_index(coord) as f64 / cells as f64;
    // The last cells of deep levels round up to exactly 1.0.
    position.min(LARGEST_BELOW_ONE)
}

const LARGEST_BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::tile::MAX_ZOOM;

    fn coord(x: u32, y: u32, z: u8) -> GridCoordinate {
        GridCoordinate::new(x, y, z).unwrap()
    }

    #[test]
    fn test_level_zero_is_origin() {
        assert_eq!(hilbert_index(&coord(0, 0, 0)), 0);
        assert_eq!(hilbert_position(&coord(0, 0, 0)), 0.0);
    }

    #[test]
    fn test_first_order_curve() {
        // The order-1 curve visits (0,0) -> (0,1) -> (1,1) -> (1,0).
        assert_eq!(hilbert_index(&coord(0, 0, 1)), 0);
        assert_eq!(hilbert_index(&coord(0, 1, 1)), 1);
        assert_eq!(hilbert_index(&coord(1, 1, 1)), 2);
        assert_eq!(hilbert_index(&coord(1, 0, 1)), 3);
    }

    #[test]
    fn test_position_range_and_purity() {
        for z in 0..=5u8 {
            let n = 1u32 << z;
            for y in 0..n {
                for x in 0..n {
                    let c = coord(x, y, z);
                    let p = hilbert_position(&c);
                    assert!((0.0..1.0).contains(&p), "{c} -> {p}");
                    assert_eq!(p.to_bits(), hilbert_position(&c).to_bits());
                }
            }
        }
    }

    #[test]
    fn test_injective_per_level() {
        for z in 0..=6u8 {
            let n = 1u32 << z;
            let mut seen = HashSet::new();
            for y in 0..n {
                for x in 0..n {
                    seen.insert(hilbert_position(&coord(x, y, z)).to_bits());
                }
            }
            assert_eq!(seen.len(), 1usize << (2 * z));
        }
    }

    #[test]
    fn test_consecutive_indices_are_neighbours() {
        let z = 4u8;
        let n = 1u32 << z;
        let mut by_index = vec![(0u32, 0u32); (n * n) as usize];
        for y in 0..n {
            for x in 0..n {
                by_index[hilbert_index(&coord(x, y, z)) as usize] = (x, y);
            }
        }
        for pair in by_index.windows(2) {
            let (ax, ay) = pair[0];
            let (bx, by) = pair[1];
            assert_eq!(ax.abs_diff(bx) + ay.abs_diff(by), 1);
        }
    }

    #[test]
    fn test_deepest_level_stays_in_range() {
        let max = (1u32 << MAX_ZOOM) - 1;
        let p = hilbert_position(&coord(max, 0, MAX_ZOOM));
        assert!((0.0..1.0).contains(&p));
    }
}

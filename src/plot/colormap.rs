//! Color mapping for the filled speed contour. Viridis is approximated by
//! interpolating between a handful of anchor colors, which is plenty for
//! diagnostic output.

use super::backend::Color;
use crate::Scalar;

const VIRIDIS_ANCHORS: [(Scalar, Scalar, Scalar); 5] = [
    (0.267004, 0.004874, 0.329415),
    (0.229739, 0.322361, 0.545706),
    (0.127568, 0.566949, 0.550556),
    (0.369214, 0.788888, 0.382914),
    (0.993248, 0.906157, 0.143936),
];

/// Maps a normalized value in [0, 1] to a viridis color. Out-of-range input
/// is clamped.
pub fn viridis(t: Scalar) -> Color {
    let t = t.max(0.).min(1.);

    let scaled = t * (VIRIDIS_ANCHORS.len() - 1) as Scalar;
    let segment = (scaled.floor() as usize).min(VIRIDIS_ANCHORS.len() - 2);
    let frac = scaled - segment as Scalar;

    let (r0, g0, b0) = VIRIDIS_ANCHORS[segment];
    let (r1, g1, b1) = VIRIDIS_ANCHORS[segment + 1];

    let channel = |a: Scalar, b: Scalar| ((a + frac * (b - a)) * 255.).round() as u8;
    Color::new(channel(r0, r1), channel(g0, g1), channel(b0, b1))
}

/// Normalizes `value` into [0, 1] over `[min, max]`. A degenerate range maps
/// everything to 0.
pub fn normalize(value: Scalar, min: Scalar, max: Scalar) -> Scalar {
    if max <= min {
        0.
    } else {
        ((value - min) / (max - min)).max(0.).min(1.)
    }
}

/// Bins a normalized value into one of `levels` discrete contour levels.
pub fn level_index(t: Scalar, levels: usize) -> usize {
    ((t * levels as Scalar).floor() as usize).min(levels.saturating_sub(1))
}

/// Representative normalized value (band midpoint) for a contour level.
pub fn level_value(index: usize, levels: usize) -> Scalar {
    (index as Scalar + 0.5) / levels as Scalar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(viridis(0.), Color::new(68, 1, 84));
        assert_eq!(viridis(1.), Color::new(253, 231, 37));
    }

    #[test]
    fn test_viridis_clamps() {
        assert_eq!(viridis(-3.), viridis(0.));
        assert_eq!(viridis(7.), viridis(1.));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(5., 0., 10.), 0.5);
        assert_eq!(normalize(-1., 0., 10.), 0.);
        assert_eq!(normalize(11., 0., 10.), 1.);
        // Degenerate range.
        assert_eq!(normalize(3., 2., 2.), 0.);
    }

    #[test]
    fn test_level_binning() {
        assert_eq!(level_index(0., 10), 0);
        assert_eq!(level_index(0.95, 10), 9);
        assert_eq!(level_index(1., 10), 9);
        assert_eq!(level_value(0, 10), 0.05);
        assert_eq!(level_value(9, 10), 0.95);
    }
}

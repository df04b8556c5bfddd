use crate::Scalar;
use std::ops::Range;

pub trait RangeExt {
    fn size(&self) -> Scalar;

    fn center(&self) -> Scalar;

    /// Linear interpolation: `t = 0` is the start, `t = 1` is the end.
    fn lerp(&self, t: Scalar) -> Scalar;

    fn contains_point(&self, x: Scalar) -> bool;

    fn thickened(&self, amount: Scalar) -> Self;
}

impl RangeExt for Range<Scalar> {
    fn size(&self) -> Scalar {
        self.end - self.start
    }

    fn center(&self) -> Scalar {
        0.5 * (self.start + self.end)
    }

    fn lerp(&self, t: Scalar) -> Scalar {
        self.start + t * self.size()
    }

    fn contains_point(&self, x: Scalar) -> bool {
        self.start <= x && x <= self.end
    }

    fn thickened(&self, amount: Scalar) -> Self {
        self.start - amount..self.end + amount
    }
}

/// `n` evenly spaced samples covering the range, endpoints included.
pub fn linspace(range: &Range<Scalar>, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![range.start],
        _ => (0..n)
            .map(|i| range.lerp(i as Scalar / (n - 1) as Scalar))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let samples = linspace(&(-2.0..3.0), 11);
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[0], -2.0);
        assert_eq!(samples[10], 3.0);
        assert!((samples[1] - samples[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_linspace_degenerate_counts() {
        assert!(linspace(&(0.0..1.0), 0).is_empty());
        assert_eq!(linspace(&(0.5..1.0), 1), vec![0.5]);
    }

    #[test]
    fn test_range_ext() {
        let r = 1.0..4.0;
        assert_eq!(r.size(), 3.0);
        assert_eq!(r.center(), 2.5);
        assert_eq!(r.lerp(0.5), 2.5);
        assert!(r.contains_point(1.0));
        assert!(!r.contains_point(4.5));
        assert_eq!(r.thickened(1.0), 0.0..5.0);
    }
}

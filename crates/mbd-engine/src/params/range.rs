// SPDX-License-Identifier: LGPL-3.0-or-later

//! Skewed value ranges mapping real parameter values to normalized 0..1.
//!
//! Smoothing always happens in the normalized domain so a ramp covers
//! the same perceptual distance per sample regardless of how skewed the
//! underlying range is. The skew curve is a power law: `proportion =
//! ((v - min) / (max - min))^skew`, so a skew below 1 expands the low
//! end of the range (the usual choice for frequencies and ratios).

/// A continuous parameter range with optional step and skew.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
    /// Step size for snapping; 0 disables snapping.
    pub interval: f32,
    /// Power-law skew exponent; 1 is linear.
    pub skew: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            interval: 0.0,
            skew: 1.0,
        }
    }

    pub const fn with_interval(mut self, interval: f32) -> Self {
        self.interval = interval;
        self
    }

    pub const fn with_skew(mut self, skew: f32) -> Self {
        self.skew = skew;
        self
    }

    /// Range for a boolean parameter stored as 0.0 / 1.0.
    pub const fn toggle() -> Self {
        Self::new(0.0, 1.0)
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Clamp into range and snap to the interval grid.
    pub fn snap(&self, value: f32) -> f32 {
        let v = value.clamp(self.min, self.max);
        if self.interval > 0.0 {
            let snapped = self.min + ((v - self.min) / self.interval).round() * self.interval;
            snapped.clamp(self.min, self.max)
        } else {
            v
        }
    }

    /// Map a real value into normalized 0..1, applying the skew curve.
    pub fn normalize(&self, value: f32) -> f32 {
        let proportion = ((value - self.min) / self.span()).clamp(0.0, 1.0);
        if self.skew == 1.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    /// Map a normalized 0..1 value back into the real range.
    pub fn denormalize(&self, proportion: f32) -> f32 {
        let p = proportion.clamp(0.0, 1.0);
        let p = if self.skew == 1.0 { p } else { p.powf(1.0 / self.skew) };
        self.min + self.span() * p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_normalize_round_trip() {
        let r = ValueRange::new(-60.0, 24.0);
        for &v in &[-60.0, -20.0, 0.0, 24.0] {
            let back = r.denormalize(r.normalize(v));
            assert!((back - v).abs() < 1e-4, "round trip failed for {v}: {back}");
        }
    }

    #[test]
    fn skewed_normalize_round_trip() {
        let r = ValueRange::new(20.0, 20000.0).with_skew(0.198_893_84);
        for &v in &[20.0, 100.0, 400.0, 1000.0, 10000.0, 20000.0] {
            let back = r.denormalize(r.normalize(v));
            assert!(
                (back - v).abs() / v < 1e-3,
                "round trip failed for {v}: {back}"
            );
        }
    }

    #[test]
    fn skew_expands_low_end() {
        // With a strong downward skew, the range midpoint in normalized
        // space must land far below the arithmetic midpoint.
        let r = ValueRange::new(20.0, 20000.0).with_skew(0.198_893_84);
        let mid = r.denormalize(0.5);
        assert!(
            mid < 1000.0,
            "skewed midpoint should sit in the low hundreds of Hz, got {mid}"
        );
    }

    #[test]
    fn normalize_clamps_out_of_range() {
        let r = ValueRange::new(0.0, 10.0);
        assert_eq!(r.normalize(-5.0), 0.0);
        assert_eq!(r.normalize(15.0), 1.0);
        assert_eq!(r.denormalize(-0.5), 0.0);
        assert_eq!(r.denormalize(1.5), 10.0);
    }

    #[test]
    fn snap_to_interval() {
        let r = ValueRange::new(-60.0, 24.0).with_interval(1.0);
        assert_eq!(r.snap(-19.6), -20.0);
        assert_eq!(r.snap(-19.4), -19.0);
        assert_eq!(r.snap(100.0), 24.0);
        assert_eq!(r.snap(-100.0), -60.0);
    }

    #[test]
    fn snap_without_interval_only_clamps() {
        let r = ValueRange::new(1.0, 100.0);
        assert_eq!(r.snap(33.3), 33.3);
        assert_eq!(r.snap(0.0), 1.0);
    }

    #[test]
    fn toggle_range_is_unit() {
        let r = ValueRange::toggle();
        assert_eq!(r.normalize(0.0), 0.0);
        assert_eq!(r.normalize(1.0), 1.0);
    }
}

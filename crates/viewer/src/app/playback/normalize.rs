use super::model::NormalizationRange;

/// Linear map of `x` from `[min_x, max_x]` onto `[target_min, target_max]`.
/// Values outside the source range extrapolate. A degenerate source range
/// maps everything to 0.
pub(crate) fn normalize(x: f64, min_x: f64, max_x: f64, target_min: f64, target_max: f64) -> f64 {
    if max_x == min_x {
        return 0.0;
    }
    ((x - min_x) / (max_x - min_x)) * (target_max - target_min) + target_min
}

impl NormalizationRange {
    pub(crate) fn to_visual(&self, x: f64, target: (f32, f32)) -> f32 {
        normalize(
            x,
            self.min_x,
            self.max_x,
            f64::from(target.0),
            f64::from(target.1),
        ) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_target_endpoints() {
        assert_eq!(normalize(-4.0, -4.0, 12.0, -10.0, 10.0), -10.0);
        assert_eq!(normalize(12.0, -4.0, 12.0, -10.0, 10.0), 10.0);
        assert_eq!(normalize(4.0, -4.0, 12.0, -10.0, 10.0), 0.0);
    }

    #[test]
    fn mapping_is_monotonic_and_affine() {
        let samples = [-50.0, -3.0, 0.0, 0.5, 7.0, 99.0];
        let mapped: Vec<f64> = samples
            .iter()
            .map(|x| normalize(*x, 0.0, 10.0, -6.0, 6.0))
            .collect();
        assert!(mapped.windows(2).all(|pair| pair[0] < pair[1]));

        let slope = (mapped[5] - mapped[0]) / (samples[5] - samples[0]);
        for (x, y) in samples.iter().zip(&mapped) {
            let expected = mapped[0] + slope * (x - samples[0]);
            assert!((y - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn values_outside_source_range_extrapolate() {
        assert_eq!(normalize(20.0, 0.0, 10.0, -10.0, 10.0), 30.0);
        assert_eq!(normalize(-5.0, 0.0, 10.0, -10.0, 10.0), -20.0);
    }

    #[test]
    fn degenerate_range_is_zero_for_any_target() {
        for target in [(-10.0, 10.0), (3.0, 8.0), (0.0, 0.0)] {
            assert_eq!(normalize(5.0, 5.0, 5.0, target.0, target.1), 0.0);
            assert_eq!(normalize(-1e9, 5.0, 5.0, target.0, target.1), 0.0);
        }
    }

    #[test]
    fn range_maps_into_viewport_target() {
        let range = NormalizationRange {
            min_x: 0.0,
            max_x: 10.0,
        };
        assert_eq!(range.to_visual(0.0, (-10.0, 10.0)), -10.0);
        assert_eq!(range.to_visual(10.0, (-10.0, 10.0)), 10.0);
        assert_eq!(range.to_visual(10.0, (-4.0, 4.0)), 4.0);
    }
}

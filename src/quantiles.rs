//! Percentile thresholds over a world's own land distribution
//!
//! Biome tiers are relative: a "hot" tile is hot compared to the rest of
//! the land on the same map, so thresholds are rebuilt for every world.

use crate::tilemap::ScalarField;

/// Temperature cut points (percent of land cells below each bound): 7 tiers
pub const TEMPERATURE_PERCENTILES: [u32; 6] = [5, 20, 32, 53, 68, 90];

/// Moisture cut points: 8 tiers
pub const MOISTURE_PERCENTILES: [u32; 7] = [5, 12, 30, 50, 72, 89, 97];

/// Ordered bin boundaries. `k - 1` bounds describe `k` bins.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuantileThresholds {
    bounds: Vec<f32>,
}

impl QuantileThresholds {
    /// Wrap bounds that are already sorted. Panics if they aren't.
    pub fn from_bounds(bounds: Vec<f32>) -> Self {
        assert!(
            bounds.windows(2).all(|w| w[0] <= w[1]),
            "quantile bounds must be non-decreasing"
        );
        Self { bounds }
    }

    /// Sort the values of cells where `mask(x, y)` holds and read one bound per
    /// percentile. An empty selection yields no bounds, so every value lands in
    /// bin 0.
    pub fn compute<M>(field: &ScalarField, mask: M, percentiles: &[u32]) -> Self
    where
        M: Fn(usize, usize) -> bool,
    {
        let mut values: Vec<f32> = field
            .iter()
            .filter(|&(x, y, _)| mask(x, y))
            .map(|(_, _, &v)| v)
            .collect();

        if values.is_empty() {
            return Self::default();
        }

        values.sort_by(|a, b| a.total_cmp(b));
        let len = values.len();

        let bounds = percentiles
            .iter()
            .map(|&p| {
                let rank = (p as usize * len / 100).clamp(1, len);
                values[rank - 1]
            })
            .collect();

        Self::from_bounds(bounds)
    }

    /// Number of bounds less than or equal to `value`, in `0..=len()`.
    pub fn bin_of(&self, value: f32) -> usize {
        self.bounds.partition_point(|&b| b <= value)
    }

    pub fn bounds(&self) -> &[f32] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Number of bins the bounds describe.
    pub fn bin_count(&self) -> usize {
        self.bounds.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::Tilemap;

    fn field_0_to_99() -> ScalarField {
        Tilemap::from_vec(10, 10, (0..100).map(|i| i as f32).collect())
    }

    #[test]
    fn test_percentile_ranks() {
        let field = field_0_to_99();
        let thresholds = QuantileThresholds::compute(&field, |_, _| true, &TEMPERATURE_PERCENTILES);

        // rank p * 100 / 100 - 1 on the sorted values 0..=99
        assert_eq!(thresholds.bounds(), &[4.0, 19.0, 31.0, 52.0, 67.0, 89.0]);
        assert_eq!(thresholds.bin_count(), 7);
    }

    #[test]
    fn test_mask_limits_population() {
        let field = field_0_to_99();
        // Only the bottom half (values 50..=99) counts
        let thresholds = QuantileThresholds::compute(&field, |_, y| y >= 5, &[50]);
        assert_eq!(thresholds.bounds(), &[74.0]);
    }

    #[test]
    fn test_bin_of_exact_boundaries() {
        let thresholds = QuantileThresholds::from_bounds(vec![0.2, 0.5, 0.8]);
        assert_eq!(thresholds.bin_of(0.0), 0);
        assert_eq!(thresholds.bin_of(0.19), 0);
        // A value equal to a bound belongs to the bin above it
        assert_eq!(thresholds.bin_of(0.2), 1);
        assert_eq!(thresholds.bin_of(0.5), 2);
        assert_eq!(thresholds.bin_of(0.8), 3);
        assert_eq!(thresholds.bin_of(100.0), 3);
    }

    #[test]
    fn test_bin_of_is_monotonic() {
        let field = Tilemap::from_vec(
            7,
            3,
            (0..21).map(|i| ((i * 37) % 21) as f32 / 7.0).collect(),
        );
        let thresholds = QuantileThresholds::compute(&field, |_, _| true, &MOISTURE_PERCENTILES);

        let mut previous = 0;
        for step in 0..400 {
            let v = -0.5 + step as f32 * 0.01;
            let bin = thresholds.bin_of(v);
            assert!(bin >= previous);
            assert!(bin <= thresholds.len());
            previous = bin;
        }
    }

    #[test]
    fn test_repeated_values_collapse_bins() {
        let field = Tilemap::new_with(4, 4, 0.5f32);
        let thresholds = QuantileThresholds::compute(&field, |_, _| true, &MOISTURE_PERCENTILES);
        assert!(thresholds.bounds().iter().all(|&b| b == 0.5));
        assert_eq!(thresholds.bin_of(0.49), 0);
        assert_eq!(thresholds.bin_of(0.5), 7);
    }

    #[test]
    fn test_empty_selection() {
        let field = field_0_to_99();
        let thresholds = QuantileThresholds::compute(&field, |_, _| false, &TEMPERATURE_PERCENTILES);
        assert!(thresholds.is_empty());
        assert_eq!(thresholds.bin_of(42.0), 0);
    }

    #[test]
    fn test_tiny_selection_does_not_underflow() {
        let field = field_0_to_99();
        let thresholds = QuantileThresholds::compute(&field, |x, y| x == 3 && y == 0, &[5, 97]);
        assert_eq!(thresholds.bounds(), &[3.0, 3.0]);
    }
}

use classify::bin_index;
use config::AnalysisConfig;
use std::collections::HashMap;

/// Frequency histogram over percentage values, bucketed per the
/// classifier's bin rule. Bins are keyed by their start percentage;
/// iteration order is always ascending by start, never insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: HashMap<u32, usize>,
    population: usize,
    bin_width: u32,
}

/// One point of a cumulative distribution: by the end of the bin ending
/// at `bin_end` percent, `cumulative_pct` percent of the population has
/// been seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CdfPoint {
    pub bin_end: u32,
    pub cumulative_pct: f64,
}

impl Histogram {
    pub fn from_percentages(percentages: &[f64], config: &AnalysisConfig) -> Histogram {
        let mut bins = HashMap::new();
        for &p in percentages {
            let start = bin_index(p, config) * config.bin_width;
            *bins.entry(start).or_insert(0) += 1;
        }
        Histogram {
            bins,
            population: percentages.len(),
            bin_width: config.bin_width,
        }
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn is_empty(&self) -> bool {
        self.population == 0
    }

    /// (bin_start, count) pairs, ascending by bin_start.
    pub fn sorted_bins(&self) -> Vec<(u32, usize)> {
        let mut bins: Vec<(u32, usize)> = self.bins.iter().map(|(&s, &c)| (s, c)).collect();
        bins.sort_by_key(|&(start, _)| start);
        bins
    }

    /// Running sum over the sorted bins, normalized to this histogram's
    /// own population. The final point is exactly 100.0; an empty
    /// histogram yields an empty distribution.
    pub fn cumulative_distribution(&self) -> Vec<CdfPoint> {
        if self.population == 0 {
            return Vec::new();
        }
        let mut cumulative = 0usize;
        self.sorted_bins()
            .into_iter()
            .map(|(start, count)| {
                cumulative += count;
                let end = start + self.bin_width;
                CdfPoint {
                    bin_end: if end > 100 { 100 } else { end },
                    cumulative_pct: cumulative as f64 / self.population as f64 * 100.0,
                }
            })
            .collect()
    }
}

/// Prepends the synthetic (0, 0) origin a plotted CDF starts from.
pub fn with_zero_point(cdf: &[CdfPoint]) -> Vec<CdfPoint> {
    let mut points = Vec::with_capacity(cdf.len() + 1);
    points.push(CdfPoint {
        bin_end: 0,
        cumulative_pct: 0.0,
    });
    points.extend_from_slice(cdf);
    points
}

#[test]
fn test_empty_population() {
    let config = AnalysisConfig::default();
    let histogram = Histogram::from_percentages(&[], &config);
    assert!(histogram.is_empty());
    assert!(histogram.sorted_bins().is_empty());
    assert!(histogram.cumulative_distribution().is_empty());
}

#[test]
fn test_bins_sorted_regardless_of_insertion_order() {
    let config = AnalysisConfig::default();
    let histogram = Histogram::from_percentages(&[97.0, 3.0, 50.0, 3.0, 12.0], &config);
    assert_eq!(
        histogram.sorted_bins(),
        [(0, 2), (10, 1), (50, 1), (95, 1)]
    );
    assert_eq!(histogram.population(), 5);
}

#[test]
fn test_full_segments_land_in_last_bin() {
    let config = AnalysisConfig::default();
    let histogram = Histogram::from_percentages(&[100.0, 100.0], &config);
    assert_eq!(histogram.sorted_bins(), [(95, 2)]);
}

#[test]
fn test_cdf_closure() {
    let config = AnalysisConfig::default();
    let histogram = Histogram::from_percentages(&[3.0, 12.0, 50.0, 97.0, 100.0], &config);
    let cdf = histogram.cumulative_distribution();
    assert_eq!(cdf.len(), 4);
    assert_eq!(cdf[0].bin_end, 5);
    assert_eq!(cdf[0].cumulative_pct, 20.0);
    // monotone non-decreasing
    for pair in cdf.windows(2) {
        assert!(pair[0].cumulative_pct <= pair[1].cumulative_pct);
        assert!(pair[0].bin_end < pair[1].bin_end);
    }
    // closes at exactly 100.0, and the top bin ends at 100 not 105
    assert_eq!(cdf.last().unwrap().bin_end, 100);
    assert_eq!(cdf.last().unwrap().cumulative_pct, 100.0);
}

#[test]
fn test_cdf_self_normalization() {
    // same shape at different population sizes gives identical CDFs
    let config = AnalysisConfig::default();
    let small = Histogram::from_percentages(&[10.0, 60.0], &config);
    let large =
        Histogram::from_percentages(&[10.0, 10.0, 10.0, 60.0, 60.0, 60.0], &config);
    assert_eq!(
        small.cumulative_distribution(),
        large.cumulative_distribution()
    );
}

#[test]
fn test_with_zero_point() {
    let config = AnalysisConfig::default();
    let cdf = Histogram::from_percentages(&[50.0], &config).cumulative_distribution();
    let plotted = with_zero_point(&cdf);
    assert_eq!(plotted[0].bin_end, 0);
    assert_eq!(plotted[0].cumulative_pct, 0.0);
    assert_eq!(&plotted[1..], &cdf[..]);
}

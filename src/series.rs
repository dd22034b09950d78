use classify::{classify, invalid_ratio, BlockState};
use config::AnalysisConfig;
use gc_log_parsing::{EventRecord, MetricsRow};
use itertools::Itertools;
use rayon::prelude::*;
use snapshot::latest_per_address;
use std::collections::HashMap;

/// Population split of one snapshot. The three percentages are relative
/// to the live population and sum to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateBreakdown {
    pub cold_pct: f64,
    pub zombie_pct: f64,
    pub hot_pct: f64,
    pub active: usize,
}

/// Classifies one snapshot's reduced records and computes the state
/// percentages over the live population. Dead blocks are dropped before
/// anything is counted; a snapshot with no live blocks yields None and
/// is skipped from every series rather than recorded as zero.
pub fn population_breakdown(
    reduced: &[EventRecord],
    config: &AnalysisConfig,
) -> Option<StateBreakdown> {
    let mut cold = 0usize;
    let mut zombie = 0usize;
    let mut hot = 0usize;
    for record in reduced {
        if let Some(ratio) = invalid_ratio(record) {
            match classify(ratio, config) {
                BlockState::Cold => cold += 1,
                BlockState::Zombie => zombie += 1,
                BlockState::Hot => hot += 1,
            }
        }
    }
    let active = cold + zombie + hot;
    if active == 0 {
        return None;
    }
    Some(StateBreakdown {
        cold_pct: cold as f64 / active as f64 * 100.0,
        zombie_pct: zombie as f64 / active as f64 * 100.0,
        hot_pct: hot as f64 / active as f64 * 100.0,
        active,
    })
}

/// Per-sample state percentages over time. Series are indexed by the
/// sample's rank among the qualifying samples, so gaps in the raw sample
/// numbering don't leave gaps on the x axis; `samples` keeps the raw
/// identifiers for labeling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSeries {
    pub samples: Vec<u64>,
    pub cold: Vec<f64>,
    pub zombie: Vec<f64>,
    pub hot: Vec<f64>,
    pub active: Vec<usize>,
}

impl StateSeries {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Runs reduce → classify → aggregate for every sample in ascending
/// sample order. Samples are independent, so the per-sample work runs on
/// the rayon pool; collection preserves sample order.
pub fn block_state_series(records: &[EventRecord], config: &AnalysisConfig) -> StateSeries {
    let mut by_sample: HashMap<u64, Vec<EventRecord>> = HashMap::new();
    for record in records {
        by_sample
            .entry(record.sample)
            .or_insert(Vec::new())
            .push(*record);
    }
    let samples: Vec<u64> = by_sample.keys().cloned().sorted().collect();

    let breakdowns: Vec<(u64, StateBreakdown)> = samples
        .par_iter()
        .filter_map(|sample| {
            let reduced = latest_per_address(&by_sample[sample]);
            population_breakdown(&reduced, config).map(|b| (*sample, b))
        })
        .collect();

    let mut series = StateSeries {
        samples: Vec::new(),
        cold: Vec::new(),
        zombie: Vec::new(),
        hot: Vec::new(),
        active: Vec::new(),
    };
    for (sample, breakdown) in breakdowns {
        series.samples.push(sample);
        series.cold.push(breakdown.cold_pct);
        series.zombie.push(breakdown.zombie_pct);
        series.hot.push(breakdown.hot_pct);
        series.active.push(breakdown.active);
    }
    series
}

/// Index and value of the maximum of a series. None for an empty series.
pub fn peak<T>(values: &[T]) -> Option<(usize, T)>
    where T: PartialOrd + Copy
{
    let mut best: Option<(usize, T)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if best_value >= value => {}
            _ => best = Some((index, value)),
        }
    }
    best
}

/// Column-wise view of the GC stress metrics, one entry per round in
/// file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSeries {
    pub rounds: Vec<u64>,
    pub disk_percent: Vec<u32>,
    pub dirty_segs: Vec<u64>,
    pub free_segs: Vec<u64>,
    pub gc_events: Vec<u64>,
    pub physical_mb: Vec<u64>,
}

impl MetricsSeries {
    pub fn from_rows(rows: &[MetricsRow]) -> MetricsSeries {
        let mut series = MetricsSeries {
            rounds: Vec::new(),
            disk_percent: Vec::new(),
            dirty_segs: Vec::new(),
            free_segs: Vec::new(),
            gc_events: Vec::new(),
            physical_mb: Vec::new(),
        };
        for row in rows {
            series.rounds.push(row.round);
            series.disk_percent.push(row.disk_percent);
            series.dirty_segs.push(row.dirty_segs);
            series.free_segs.push(row.free_segs);
            series.gc_events.push(row.gc_events);
            series.physical_mb.push(row.physical_mb);
        }
        series
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

#[cfg(test)]
fn record(sample: u64, blk: u32, vpc: u32, ipc: u32) -> EventRecord {
    use gc_log_parsing::Address;
    EventRecord {
        sample,
        addr: Address {
            ch: 0,
            lun: 0,
            pl: 0,
            blk,
        },
        vpc,
        ipc,
    }
}

#[test]
fn test_breakdown_one_snapshot() {
    // ratios 0.1, 0.3, 0.5, 0.9 -> cold 25%, zombie 50%, hot 25%
    let config = AnalysisConfig::default();
    let reduced = [
        record(0, 1, 9, 1),
        record(0, 2, 7, 3),
        record(0, 3, 5, 5),
        record(0, 4, 1, 9),
    ];
    let breakdown = population_breakdown(&reduced, &config).unwrap();
    assert_eq!(breakdown.cold_pct, 25.0);
    assert_eq!(breakdown.zombie_pct, 50.0);
    assert_eq!(breakdown.hot_pct, 25.0);
    assert_eq!(breakdown.active, 4);
}

#[test]
fn test_breakdown_excludes_dead_blocks() {
    let config = AnalysisConfig::default();
    let reduced = [record(0, 1, 0, 0), record(0, 2, 2, 8)];
    let breakdown = population_breakdown(&reduced, &config).unwrap();
    assert_eq!(breakdown.active, 1);
    assert_eq!(breakdown.hot_pct, 100.0);
}

#[test]
fn test_breakdown_empty_population() {
    let config = AnalysisConfig::default();
    assert_eq!(population_breakdown(&[], &config), None);
    assert_eq!(
        population_breakdown(&[record(0, 1, 0, 0)], &config),
        None
    );
}

#[test]
fn test_breakdown_percentages_sum_to_100() {
    let config = AnalysisConfig::default();
    let reduced: Vec<EventRecord> = (0..7)
        .map(|i| record(0, i, 10 - i, i))
        .collect();
    let breakdown = population_breakdown(&reduced, &config).unwrap();
    let sum = breakdown.cold_pct + breakdown.zombie_pct + breakdown.hot_pct;
    assert!((sum - 100.0).abs() < 1e-9);
}

#[test]
fn test_series_reduces_duplicates_per_sample() {
    // two rows for the same block within one sample: (vpc 0, ipc 10)
    // then (vpc 5, ipc 5); the reducer keeps the second, ratio 0.5,
    // which is a zombie
    let config = AnalysisConfig::default();
    let series = block_state_series(
        &[record(1, 7, 0, 10), record(1, 7, 5, 5)],
        &config,
    );
    assert_eq!(series.samples, [1]);
    assert_eq!(series.zombie, [100.0]);
    assert_eq!(series.active, [1]);
}

#[test]
fn test_series_skips_empty_samples_and_tolerates_gaps() {
    let config = AnalysisConfig::default();
    let series = block_state_series(
        &[
            record(3, 1, 9, 1),
            // sample 10 holds only a dead block and is skipped entirely
            record(10, 1, 0, 0),
            record(17, 1, 1, 9),
        ],
        &config,
    );
    assert_eq!(series.len(), 2);
    assert_eq!(series.samples, [3, 17]);
    assert_eq!(series.cold, [100.0, 0.0]);
    assert_eq!(series.hot, [0.0, 100.0]);
    assert_eq!(series.active, [1, 1]);
}

#[test]
fn test_series_empty_input() {
    let config = AnalysisConfig::default();
    let series = block_state_series(&[], &config);
    assert!(series.is_empty());
}

#[test]
fn test_metrics_series() {
    let rows = [
        MetricsRow {
            round: 1,
            disk_percent: 10,
            dirty_segs: 100,
            free_segs: 900,
            gc_events: 0,
            physical_mb: 512,
        },
        MetricsRow {
            round: 2,
            disk_percent: 20,
            dirty_segs: 300,
            free_segs: 700,
            gc_events: 17,
            physical_mb: 1024,
        },
    ];
    let series = MetricsSeries::from_rows(&rows);
    assert_eq!(series.rounds, [1, 2]);
    assert_eq!(series.dirty_segs, [100, 300]);
    assert_eq!(peak(&series.dirty_segs), Some((1, 300)));
    assert!(MetricsSeries::from_rows(&[]).is_empty());
}

#[test]
fn test_peak() {
    assert_eq!(peak::<f64>(&[]), None);
    assert_eq!(peak(&[4.0]), Some((0, 4.0)));
    assert_eq!(peak(&[1.0, 9.0, 9.0, 3.0]), Some((1, 9.0)));
}

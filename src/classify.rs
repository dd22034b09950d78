use config::AnalysisConfig;
use gc_log_parsing::EventRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockState {
    Cold,
    Zombie,
    Hot,
}

/// Fraction of pages that are stale, in [0, 1]. None for a dead block
/// (no valid and no invalid pages); dead blocks never enter any
/// aggregation, which is also what keeps the division well-defined.
pub fn invalid_ratio(record: &EventRecord) -> Option<f64> {
    let total = record.vpc as u64 + record.ipc as u64;
    if total == 0 {
        return None;
    }
    Some(record.ipc as f64 / total as f64)
}

/// The zombie band is inclusive on both ends: a ratio of exactly t_low
/// or t_high is a zombie, not cold/hot.
pub fn classify(ratio: f64, config: &AnalysisConfig) -> BlockState {
    if ratio < config.t_low {
        BlockState::Cold
    } else if ratio <= config.t_high {
        BlockState::Zombie
    } else {
        BlockState::Hot
    }
}

/// Histogram bucket for a percentage value. 100% goes into the last bin
/// unconditionally; floor division at the very top of the range is not
/// to be trusted with floating point input.
pub fn bin_index(percent: f64, config: &AnalysisConfig) -> u32 {
    let last = config.num_bins() - 1;
    if percent == 100.0 {
        return last;
    }
    let index = (percent / config.bin_width as f64).floor();
    if index < 0.0 {
        0
    } else if index as u32 > last {
        last
    } else {
        index as u32
    }
}

/// Valid-block percentage of a SIT entry, with the count clamped to the
/// segment capacity to tolerate corrupted captures.
pub fn vblock_percent(vblocks: u32, config: &AnalysisConfig) -> f64 {
    let clamped = if vblocks > config.max_vblocks {
        config.max_vblocks
    } else {
        vblocks
    };
    clamped as f64 / config.max_vblocks as f64 * 100.0
}

#[cfg(test)]
fn record(vpc: u32, ipc: u32) -> EventRecord {
    use gc_log_parsing::Address;
    EventRecord {
        sample: 0,
        addr: Address {
            ch: 0,
            lun: 0,
            pl: 0,
            blk: 0,
        },
        vpc,
        ipc,
    }
}

#[test]
fn test_invalid_ratio() {
    assert_eq!(invalid_ratio(&record(0, 0)), None);
    assert_eq!(invalid_ratio(&record(10, 0)), Some(0.0));
    assert_eq!(invalid_ratio(&record(0, 10)), Some(1.0));
    assert_eq!(invalid_ratio(&record(5, 5)), Some(0.5));
    let ratio = invalid_ratio(&record(96, 160)).unwrap();
    assert!(ratio >= 0.0 && ratio <= 1.0);
}

#[test]
fn test_classify_boundaries() {
    let config = AnalysisConfig::default();
    assert_eq!(classify(0.2999, &config), BlockState::Cold);
    assert_eq!(classify(0.3, &config), BlockState::Zombie);
    assert_eq!(classify(0.5, &config), BlockState::Zombie);
    assert_eq!(classify(0.7, &config), BlockState::Zombie);
    assert_eq!(classify(0.7001, &config), BlockState::Hot);
    assert_eq!(classify(0.0, &config), BlockState::Cold);
    assert_eq!(classify(1.0, &config), BlockState::Hot);
}

#[test]
fn test_classify_custom_thresholds() {
    let config = AnalysisConfig {
        t_low: 0.5,
        t_high: 0.9,
        ..AnalysisConfig::default()
    };
    assert_eq!(classify(0.4, &config), BlockState::Cold);
    assert_eq!(classify(0.5, &config), BlockState::Zombie);
    assert_eq!(classify(0.9, &config), BlockState::Zombie);
    assert_eq!(classify(0.95, &config), BlockState::Hot);
}

#[test]
fn test_bin_index() {
    let config = AnalysisConfig::default();
    assert_eq!(bin_index(0.0, &config), 0);
    assert_eq!(bin_index(4.9, &config), 0);
    assert_eq!(bin_index(5.0, &config), 1);
    assert_eq!(bin_index(97.5, &config), 19);
    // 100% lands in the last bin, not in a phantom bin 20
    assert_eq!(bin_index(100.0, &config), 19);

    let fine = AnalysisConfig {
        bin_width: 2,
        ..AnalysisConfig::default()
    };
    assert_eq!(bin_index(99.0, &fine), 49);
    assert_eq!(bin_index(100.0, &fine), 49);
}

#[test]
fn test_vblock_percent_clamps() {
    let config = AnalysisConfig::default();
    assert_eq!(vblock_percent(0, &config), 0.0);
    assert_eq!(vblock_percent(256, &config), 50.0);
    assert_eq!(vblock_percent(512, &config), 100.0);
    // out-of-range captures behave exactly like a full segment
    assert_eq!(vblock_percent(600, &config), 100.0);
    assert_eq!(
        vblock_percent(600, &config),
        vblock_percent(512, &config)
    );
}

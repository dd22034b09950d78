/// Tuning knobs for the analysis pipeline. Defaults match the values the
/// capture scripts were run with; every knob is overridable from the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Blocks with an invalid ratio below this are cold.
    pub t_low: f64,
    /// Blocks with an invalid ratio above this are hot; the inclusive band
    /// in between is the zombie band.
    pub t_high: f64,
    /// Page/block capacity of one segment. Counts above this in a capture
    /// are clamped down to it before any ratio is computed.
    pub max_vblocks: u32,
    /// Histogram partition size in percent. 100 must be divisible by it.
    pub bin_width: u32,
    /// Segment types admitted into SIT histograms. 0/1/2 are the hot, warm
    /// and cold data logs; node logs (3..=5) are excluded by default.
    pub seg_types: Vec<u32>,
    /// SIT entries qualify only when mtime > min_mtime. Entries from the
    /// old dump dialect carry no mtime and always qualify.
    pub min_mtime: u64,
}

impl Default for AnalysisConfig {
    fn default() -> AnalysisConfig {
        AnalysisConfig {
            t_low: 0.3,
            t_high: 0.7,
            max_vblocks: 512,
            bin_width: 5,
            seg_types: vec![0, 1, 2],
            min_mtime: 0,
        }
    }
}

impl AnalysisConfig {
    pub fn num_bins(&self) -> u32 {
        100 / self.bin_width
    }

    pub fn admits_seg_type(&self, seg_type: u32) -> bool {
        self.seg_types.contains(&seg_type)
    }

    pub fn admits_mtime(&self, mtime: Option<u64>) -> bool {
        match mtime {
            Some(m) => m > self.min_mtime,
            None => true,
        }
    }
}

#[test]
fn test_defaults() {
    let config = AnalysisConfig::default();
    assert_eq!(config.t_low, 0.3);
    assert_eq!(config.t_high, 0.7);
    assert_eq!(config.max_vblocks, 512);
    assert_eq!(config.num_bins(), 20);
    assert!(config.admits_seg_type(0));
    assert!(config.admits_seg_type(2));
    assert!(!config.admits_seg_type(3));
    assert!(!config.admits_mtime(Some(0)));
    assert!(config.admits_mtime(Some(1)));
    assert!(config.admits_mtime(None));
}

#[test]
fn test_bin_width_2() {
    let config = AnalysisConfig {
        bin_width: 2,
        ..AnalysisConfig::default()
    };
    assert_eq!(config.num_bins(), 50);
}

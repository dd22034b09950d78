use histogram::{with_zero_point, CdfPoint};
use series::{MetricsSeries, StateSeries};
use serde_json::{to_writer, Value};
use std::fs::File;
use std::io;

/// Writes a state-evolution series as a JSON document for the external
/// plotting scripts. Series are positionally indexed; the raw sample
/// identifiers ride along for axis labeling.
pub fn save_state_series(series: &StateSeries, filename: &str) -> Result<(), io::Error> {
    let document = json!({
        "kind": "block_state_evolution",
        "samples": series.samples,
        "series": {
            "cold_pct": series.cold,
            "zombie_pct": series.zombie,
            "hot_pct": series.hot,
            "active": series.active,
        },
    });
    write_document(&document, filename)
}

/// Writes one labeled CDF per dataset, each with the synthetic (0, 0)
/// origin prepended, ready for plotting.
pub fn save_cdf_comparison(
    distributions: &[(String, Vec<CdfPoint>)],
    filename: &str,
) -> Result<(), io::Error> {
    let datasets: Vec<Value> = distributions
        .iter()
        .map(|&(ref label, ref cdf)| {
            json!({
                "label": label,
                "cdf": with_zero_point(cdf),
            })
        })
        .collect();
    let document = json!({
        "kind": "vblock_cdf_comparison",
        "datasets": datasets,
    });
    write_document(&document, filename)
}

pub fn save_metrics_series(series: &MetricsSeries, filename: &str) -> Result<(), io::Error> {
    let document = json!({
        "kind": "gc_stress",
        "series": series,
    });
    write_document(&document, filename)
}

fn write_document(document: &Value, filename: &str) -> Result<(), io::Error> {
    let file = File::create(filename)?;
    to_writer(file, document).map_err(io::Error::from)?;
    Ok(())
}

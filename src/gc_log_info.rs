use classify::vblock_percent;
use config::AnalysisConfig;
use gc_log_parsing::{parse_event_record, parse_metrics_row, parse_segment_summary, EventRecord,
                     MetricsRow};
use histogram::{CdfPoint, Histogram};
use series::{block_state_series, peak, MetricsSeries, StateSeries};
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::iter;

quick_error! {
    #[derive(Debug)]
    pub enum LoadError {
        Io(err: io::Error) {
            from()
            display("I/O error: {}", err)
            cause(err)
        }
    }
}

/// Reads block event records from a CSV log. Lines that don't match the
/// record shape (the header line included) are skipped; a line that has
/// the right number of columns but doesn't parse gets a warning, since
/// that usually means a corrupted capture rather than chatter in the log.
pub fn load_event_records<T>(
    iter: iter::Enumerate<io::Lines<T>>,
) -> Result<(Vec<EventRecord>, usize), io::Error>
    where T: io::BufRead
{
    let mut records = Vec::new();
    let mut skipped = 0;
    for (line_index, line) in iter {
        let line = line?;
        match parse_event_record(&line) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                if line.matches(',').count() == 6 && line_index > 0 {
                    eprintln!("warning: skipping malformed row at line {}: {}",
                              line_index + 1,
                              line);
                }
            }
        }
    }
    Ok((records, skipped))
}

pub struct SitLoad {
    /// Valid-block percentage of every qualifying segment, clamped.
    pub percentages: Vec<f64>,
    pub lines_read: usize,
    pub skipped: usize,
}

/// Reads an f2fs SIT dump and keeps the valid-block percentage of every
/// segment that passes the seg_type and mtime filters. Filtered-out
/// segments never enter the histogram population.
pub fn load_segment_percentages<T>(
    iter: iter::Enumerate<io::Lines<T>>,
    config: &AnalysisConfig,
) -> Result<SitLoad, io::Error>
    where T: io::BufRead
{
    let mut percentages = Vec::new();
    let mut lines_read = 0;
    let mut skipped = 0;
    for (line_index, line) in iter {
        let line = line?;
        lines_read += 1;
        match parse_segment_summary(&line) {
            Some(summary) => {
                if config.admits_seg_type(summary.seg_type) && config.admits_mtime(summary.mtime) {
                    percentages.push(vblock_percent(summary.vblocks, config));
                }
            }
            None => {
                skipped += 1;
                if line.contains("segno:") || line.contains("Segment no.:") {
                    eprintln!("warning: skipping malformed SIT entry at line {}: {}",
                              line_index + 1,
                              line);
                }
            }
        }
    }
    Ok(SitLoad {
        percentages,
        lines_read,
        skipped,
    })
}

pub fn load_metrics_rows<T>(
    iter: iter::Enumerate<io::Lines<T>>,
) -> Result<(Vec<MetricsRow>, usize), io::Error>
    where T: io::BufRead
{
    let mut rows = Vec::new();
    let mut skipped = 0;
    for (_, line) in iter {
        match parse_metrics_row(&line?) {
            Some(row) => rows.push(row),
            // the header and the Final/HANG summary rows land here
            None => skipped += 1,
        }
    }
    Ok((rows, skipped))
}

/// Temporal evolution of block states: one cold/zombie/hot percentage
/// triple plus an active-block count per qualifying sample.
pub fn print_state_evolution<T>(
    iter: iter::Enumerate<io::Lines<T>>,
    config: &AnalysisConfig,
) -> Result<StateSeries, io::Error>
    where T: io::BufRead
{
    let (records, skipped) = load_event_records(iter)?;
    let series = block_state_series(&records, config);
    println!("{} event records, {} other lines skipped", records.len(), skipped);
    if series.is_empty() {
        println!("no sample with live blocks");
        return Ok(series);
    }
    println!("{:>8} {:>8} {:>8} {:>8} {:>8}",
             "sample", "cold%", "zombie%", "hot%", "active");
    for i in 0..series.len() {
        println!("{:>8} {:>8.1} {:>8.1} {:>8.1} {:>8}",
                 series.samples[i],
                 series.cold[i],
                 series.zombie[i],
                 series.hot[i],
                 series.active[i]);
    }
    if let Some((index, value)) = peak(&series.zombie) {
        println!("Peak zombies: {:.1}% at sample {}", value, series.samples[index]);
    }
    if let Some((index, value)) = peak(&series.active) {
        println!("Peak active blocks: {} at sample {}", value, series.samples[index]);
    }
    Ok(series)
}

fn print_bar_chart(histogram: &Histogram, bin_width: u32) {
    let bins = histogram.sorted_bins();
    let max_count = bins.iter().map(|&(_, c)| c).max().unwrap_or(0);
    if max_count == 0 {
        return;
    }
    for (start, count) in bins {
        let end = if start + bin_width > 100 { 100 } else { start + bin_width };
        let bar_len = count * 40 / max_count;
        println!("{:>3}% - {:>3}% | {:<40} {}",
                 start,
                 end,
                 "#".repeat(bar_len),
                 count);
    }
}

/// Histogram of valid-block percentages across the qualifying segments
/// of one SIT dump.
pub fn print_validity_histogram<T>(
    iter: iter::Enumerate<io::Lines<T>>,
    config: &AnalysisConfig,
) -> Result<Histogram, io::Error>
    where T: io::BufRead
{
    let load = load_segment_percentages(iter, config)?;
    println!("{} lines read, {} skipped", load.lines_read, load.skipped);
    println!("{} qualifying segments (seg_type in {:?}, mtime > {})",
             load.percentages.len(),
             config.seg_types,
             config.min_mtime);
    let histogram = Histogram::from_percentages(&load.percentages, config);
    if histogram.is_empty() {
        println!("no segments matched the filtering criteria");
        return Ok(histogram);
    }
    print_bar_chart(&histogram, config.bin_width);
    Ok(histogram)
}

fn load_sit_file(path: &str, config: &AnalysisConfig) -> Result<SitLoad, LoadError> {
    let reader = io::BufReader::new(File::open(path)?);
    let load = load_segment_percentages(reader.lines().enumerate(), config)?;
    Ok(load)
}

/// Builds one self-normalized CDF per input file so distributions of
/// different absolute size compare by shape. A file that can't be read
/// is reported and skipped; the remaining files still process.
pub fn print_cdf_comparison(
    paths: &[&str],
    config: &AnalysisConfig,
) -> Vec<(String, Vec<CdfPoint>)> {
    let mut distributions = Vec::new();
    for path in paths {
        let load = match load_sit_file(path, config) {
            Ok(load) => load,
            Err(e) => {
                eprintln!("skipping {}: {}", path, e);
                continue;
            }
        };
        let histogram = Histogram::from_percentages(&load.percentages, config);
        println!("{}: {} qualifying segments ({} lines, {} skipped)",
                 path,
                 histogram.population(),
                 load.lines_read,
                 load.skipped);
        let cdf = histogram.cumulative_distribution();
        for point in &cdf {
            println!("  up to {:>3}%: {:>6.2}% of segments", point.bin_end, point.cumulative_pct);
        }
        distributions.push((path.to_string(), cdf));
    }
    distributions
}

/// GC stress curves from the metrics CSV: fragmentation (dirty segments),
/// free-space headroom and cumulative GC events against disk utilization.
pub fn print_gc_stress<T>(
    iter: iter::Enumerate<io::Lines<T>>,
) -> Result<MetricsSeries, io::Error>
    where T: io::BufRead
{
    let (rows, skipped) = load_metrics_rows(iter)?;
    let series = MetricsSeries::from_rows(&rows);
    println!("{} rounds, {} other lines skipped", series.rounds.len(), skipped);
    if series.is_empty() {
        return Ok(series);
    }
    println!("{:>6} {:>6} {:>12} {:>12} {:>10} {:>12}",
             "round", "disk%", "dirty_segs", "free_segs", "gc_events", "physical_mb");
    for i in 0..series.rounds.len() {
        println!("{:>6} {:>6} {:>12} {:>12} {:>10} {:>12}",
                 series.rounds[i],
                 series.disk_percent[i],
                 series.dirty_segs[i],
                 series.free_segs[i],
                 series.gc_events[i],
                 series.physical_mb[i]);
    }
    if let Some((index, value)) = peak(&series.dirty_segs) {
        println!("Peak dirty segments: {} at {}% disk utilization",
                 value,
                 series.disk_percent[index]);
    }
    Ok(series)
}

#[cfg(test)]
fn lines_of(text: &str) -> iter::Enumerate<io::Lines<io::Cursor<&str>>> {
    io::Cursor::new(text).lines().enumerate()
}

#[test]
fn test_load_event_records_skips_header() {
    let (records, skipped) = load_event_records(lines_of(
        "sample,ch,lun,pl,blk,vpc,ipc\n1,0,0,0,7,5,5\n1,0,0,0,8,10,0\n",
    )).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(skipped, 1);
    assert_eq!(records[0].addr.blk, 7);
}

#[test]
fn test_load_segment_percentages_filters() {
    // seg_type 3 and mtime 0 rows never enter the population
    let config = AnalysisConfig::default();
    let load = load_segment_percentages(
        lines_of(
            "segno: 100 vblocks: 512 seg_type:1 mtime:100 sit_pack:1\n\
             segno: 400 vblocks: 50 seg_type:3 mtime:10 sit_pack:1\n\
             segno: 500 vblocks: 100 seg_type:1 mtime:0 sit_pack:1\n\
             segno: 200 vblocks: 256 seg_type:2 mtime:20 sit_pack:1\n\
             checkpoint: valid nids 230\n",
        ),
        &config,
    ).unwrap();
    assert_eq!(load.lines_read, 5);
    assert_eq!(load.skipped, 1);
    assert_eq!(load.percentages, [100.0, 50.0]);
}

#[test]
fn test_load_segment_percentages_clamps() {
    let config = AnalysisConfig::default();
    let load = load_segment_percentages(
        lines_of("segno: 1 vblocks: 600 seg_type:0 mtime:5 sit_pack:1\n"),
        &config,
    ).unwrap();
    assert_eq!(load.percentages, [100.0]);
}

#[test]
fn test_empty_file_yields_empty_results() {
    let config = AnalysisConfig::default();
    let load = load_segment_percentages(lines_of(""), &config).unwrap();
    assert!(load.percentages.is_empty());
    let histogram = Histogram::from_percentages(&load.percentages, &config);
    assert!(histogram.is_empty());
    assert!(histogram.cumulative_distribution().is_empty());
}

#[test]
fn test_load_metrics_rows() {
    let (rows, skipped) = load_metrics_rows(lines_of(
        "Round,Disk_Percent,Dirty_Segs,Free_Segs,GC_Events,Physical_MB\n\
         1,10,100(100),900,0,512\n\
         2,20,300,700(650),17,1024\n\
         Final,100,300,700,17,1024\n",
    )).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(skipped, 2);
    assert_eq!(rows[1].free_segs, 700);
}

#[test]
fn test_cdf_comparison_skips_missing_file() {
    let config = AnalysisConfig::default();
    let distributions = print_cdf_comparison(&["/nonexistent/sit_info.txt"], &config);
    assert!(distributions.is_empty());
}

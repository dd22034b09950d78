extern crate clap;
extern crate gc_log_parser;

use clap::{App, ArgMatches, SubCommand};
use gc_log_parser::config::AnalysisConfig;
use gc_log_parser::export::{save_cdf_comparison, save_metrics_series, save_state_series};
use gc_log_parser::gc_log_info::{print_cdf_comparison, print_gc_stress, print_state_evolution,
                                 print_validity_histogram};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process;

fn config_from_matches(matches: &ArgMatches) -> Result<AnalysisConfig, String> {
    let mut config = AnalysisConfig::default();
    if let Some(value) = matches.value_of("t-low") {
        config.t_low = value.parse().map_err(|_| format!("bad --t-low: {}", value))?;
    }
    if let Some(value) = matches.value_of("t-high") {
        config.t_high = value.parse().map_err(|_| format!("bad --t-high: {}", value))?;
    }
    if let Some(value) = matches.value_of("max-vblocks") {
        config.max_vblocks = value
            .parse()
            .map_err(|_| format!("bad --max-vblocks: {}", value))?;
    }
    if let Some(value) = matches.value_of("bin-width") {
        config.bin_width = value
            .parse()
            .map_err(|_| format!("bad --bin-width: {}", value))?;
        if config.bin_width == 0 || 100 % config.bin_width != 0 {
            return Err(format!("--bin-width must divide 100, got {}", config.bin_width));
        }
    }
    if let Some(values) = matches.values_of("seg-type") {
        let mut seg_types = Vec::new();
        for value in values {
            seg_types.push(value.parse().map_err(|_| format!("bad --seg-type: {}", value))?);
        }
        config.seg_types = seg_types;
    }
    if let Some(value) = matches.value_of("min-mtime") {
        config.min_mtime = value
            .parse()
            .map_err(|_| format!("bad --min-mtime: {}", value))?;
    }
    if config.t_low > config.t_high {
        return Err(format!("--t-low {} exceeds --t-high {}", config.t_low, config.t_high));
    }
    Ok(config)
}

fn open_lines(path: &str) -> std::io::Result<std::iter::Enumerate<std::io::Lines<BufReader<File>>>> {
    Ok(BufReader::new(File::open(path)?).lines().enumerate())
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    match matches.subcommand() {
        ("evolution", Some(sub)) => {
            let config = config_from_matches(sub)?;
            let input = sub.value_of("INPUT").unwrap();
            let iter = open_lines(input).map_err(|e| format!("{}: {}", input, e))?;
            let series = print_state_evolution(iter, &config).map_err(|e| e.to_string())?;
            if let Some(out) = sub.value_of("json") {
                save_state_series(&series, out).map_err(|e| e.to_string())?;
                println!("Saved: {}", out);
            }
        }
        ("histogram", Some(sub)) => {
            let config = config_from_matches(sub)?;
            let input = sub.value_of("INPUT").unwrap();
            let iter = open_lines(input).map_err(|e| format!("{}: {}", input, e))?;
            print_validity_histogram(iter, &config).map_err(|e| e.to_string())?;
        }
        ("cdf", Some(sub)) => {
            let config = config_from_matches(sub)?;
            let inputs: Vec<&str> = sub.values_of("INPUT").unwrap().collect();
            let distributions = print_cdf_comparison(&inputs, &config);
            if let Some(out) = sub.value_of("json") {
                save_cdf_comparison(&distributions, out).map_err(|e| e.to_string())?;
                println!("Saved: {}", out);
            }
        }
        ("stress", Some(sub)) => {
            let input = sub.value_of("INPUT").unwrap();
            let iter = open_lines(input).map_err(|e| format!("{}: {}", input, e))?;
            let series = print_gc_stress(iter).map_err(|e| e.to_string())?;
            if let Some(out) = sub.value_of("json") {
                save_metrics_series(&series, out).map_err(|e| e.to_string())?;
                println!("Saved: {}", out);
            }
        }
        _ => return Err("no subcommand given; try --help".to_string()),
    }
    Ok(())
}

fn main() {
    let threshold_args = [
        "--t-low [RATIO]           'Cold/zombie threshold on the invalid ratio (default 0.3)'",
        "--t-high [RATIO]          'Zombie/hot threshold on the invalid ratio (default 0.7)'",
    ];
    let sit_args = [
        "--max-vblocks [N]         'Blocks per segment, for clamping (default 512)'",
        "--bin-width [PERCENT]     'Histogram partition size in percent (default 5)'",
        "--seg-type [TYPE]...      'Admitted segment types (default 0 1 2)'",
        "--min-mtime [MTIME]       'Admit segments with mtime strictly above this (default 0)'",
    ];
    // clap borrows the usage strings for as long as the matches live, so
    // the joined strings need their own bindings
    let threshold_usage = threshold_args.join("\n");
    let sit_usage = sit_args.join("\n");
    let matches = App::new("gc-log-parser")
        .version("0.1")
        .about("Classifies flash segments by invalid-page ratio and summarizes the distributions")
        .subcommand(SubCommand::with_name("evolution")
                        .about("Cold/zombie/hot percentages over time from a block event CSV")
                        .args_from_usage("<INPUT>  'Block event CSV (sample,ch,lun,pl,blk,vpc,ipc)'")
                        .args_from_usage(&threshold_usage)
                        .args_from_usage("--json [FILE]  'Write the series as JSON'"))
        .subcommand(SubCommand::with_name("histogram")
                        .about("Valid-block percentage histogram from an f2fs SIT dump")
                        .args_from_usage("<INPUT>  'SIT dump file'")
                        .args_from_usage(&sit_usage))
        .subcommand(SubCommand::with_name("cdf")
                        .about("Valid-block CDF comparison across SIT dumps")
                        .args_from_usage("<INPUT>...  'SIT dump files to compare'")
                        .args_from_usage(&sit_usage)
                        .args_from_usage("--json [FILE]  'Write the labeled CDFs as JSON'"))
        .subcommand(SubCommand::with_name("stress")
                        .about("GC stress curves from a metrics CSV")
                        .args_from_usage("<INPUT>  'Metrics CSV'")
                        .args_from_usage("--json [FILE]  'Write the series as JSON'"))
        .get_matches();

    if let Err(message) = run(&matches) {
        eprintln!("error: {}", message);
        process::exit(1);
    }
}

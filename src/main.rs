//! Chartify Catalog - batch cleaning, statistics & chart export for a
//! movie/series catalog CSV.

use anyhow::Context;
use chartify_catalog::config::PipelineConfig;
use chartify_catalog::data::imputer::CategoricalFill;
use chartify_catalog::pipeline;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("chartify_catalog")
        .about("Clean a catalog CSV, summarise its scores and export charts")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .value_parser(value_parser!(PathBuf))
                .help("Catalog CSV to analyse"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("JSON configuration file; flags override its values"),
        )
        .arg(
            Arg::new("output_dir")
                .long("output-dir")
                .short('o')
                .value_parser(value_parser!(PathBuf))
                .help("Directory receiving the CSV, JSON and PNG outputs"),
        )
        .arg(
            Arg::new("sample_size")
                .long("sample-size")
                .value_parser(value_parser!(usize))
                .help("Rows in the random sample file"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Seed for a reproducible sample"),
        )
        .arg(
            Arg::new("fill_sentinel")
                .long("fill-sentinel")
                .help("Fill missing text with this value instead of the mode. E.g. 'Unknown'"),
        )
        .arg(
            Arg::new("no_charts")
                .long("no-charts")
                .action(ArgAction::SetTrue)
                .help("Skip PNG chart rendering"),
        )
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<PipelineConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(input) = matches.get_one::<PathBuf>("input") {
        config.input = input.clone();
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output_dir") {
        config.output_dir = dir.clone();
    }
    if let Some(size) = matches.get_one::<usize>("sample_size") {
        config.sample_size = *size;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.sample_seed = Some(*seed);
    }
    if let Some(sentinel) = matches.get_one::<String>("fill_sentinel") {
        config.categorical_fill = CategoricalFill::Sentinel(sentinel.clone());
    }
    if matches.get_flag("no_charts") {
        config.render_charts = false;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    let config = build_config(&matches)?;

    let report = pipeline::run(&config)
        .with_context(|| format!("processing {}", config.input.display()))?;

    log::info!(
        "Processed {} rows; {} file(s) written to {}; {} diagnostic(s)",
        report.rows,
        report.outputs.len(),
        config.output_dir.display(),
        report.diagnostics.len()
    );
    Ok(())
}

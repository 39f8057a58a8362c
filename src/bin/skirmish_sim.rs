//! Headless batch combat simulator
//!
//! Runs seeded scenarios through the combat engine and prints JSON or text
//! summaries for balance work. Each run gets a fresh world and engine; runs
//! are independent and execute in parallel.

use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use hexfront::core::config::CombatConfig;
use hexfront::sim::{generate, run_scenario, RunSummary, ScenarioConfig};
use hexfront::stats::{AggregatedStats, StatsTable, UnitType};

/// Headless batch combat simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish_sim")]
#[command(about = "Run seeded combat scenarios and report outcomes")]
struct Args {
    /// Number of scenario runs
    #[arg(long, default_value_t = 100)]
    runs: u64,

    /// Base seed; run N uses seed base + N
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Scenario file (TOML ScenarioConfig); defaults when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Combat tuning overrides (TOML CombatConfig)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum ticks per run before calling it a timeout
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.1)]
    tick_seconds: f64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(serde::Serialize)]
struct BatchReport {
    runs: u64,
    attacker_win_rate: f64,
    timeouts: u64,
    mean_ticks: f64,
    mean_attacker_units_left: f64,
    mean_defender_units_left: f64,
    results: Vec<RunSummary>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let base_scenario = match &args.scenario {
        Some(path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Failed to read scenario file {:?}: {}", path, e);
                std::process::exit(1);
            });
            toml::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Invalid scenario file {:?}: {}", path, e);
                std::process::exit(1);
            })
        }
        None => ScenarioConfig::default(),
    };

    let config = match &args.config {
        Some(path) => CombatConfig::from_toml_file(path).unwrap_or_else(|e| {
            eprintln!("Invalid config file {:?}: {}", path, e);
            std::process::exit(1);
        }),
        None => CombatConfig::default(),
    };

    let table = StatsTable::default();
    tracing::info!(runs = args.runs, seed = args.seed, "starting batch");

    // Independent worlds and engines per run; isolation by construction
    let results: Vec<RunSummary> = (0..args.runs)
        .into_par_iter()
        .map(|n| {
            let seed = args.seed + n;
            let scenario = generate(&ScenarioConfig {
                seed,
                ..base_scenario.clone()
            });
            run_scenario(
                scenario,
                seed,
                &config,
                &table,
                args.max_ticks,
                args.tick_seconds,
            )
        })
        .collect();

    let runs = results.len() as f64;
    let wins = results.iter().filter(|r| r.attacker_victory).count() as f64;
    let timeouts = results.iter().filter(|r| r.timed_out).count() as u64;
    let report = BatchReport {
        runs: args.runs,
        attacker_win_rate: if runs > 0.0 { wins / runs } else { 0.0 },
        timeouts,
        mean_ticks: results.iter().map(|r| r.ticks as f64).sum::<f64>() / runs.max(1.0),
        mean_attacker_units_left: results
            .iter()
            .map(|r| r.attacker_units_left as f64)
            .sum::<f64>()
            / runs.max(1.0),
        mean_defender_units_left: results
            .iter()
            .map(|r| r.defender_units_left as f64)
            .sum::<f64>()
            / runs.max(1.0),
        results,
    };

    match args.format.as_str() {
        "text" => print_text(&report),
        _ => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        },
    }
}

fn print_text(report: &BatchReport) {
    println!("Skirmish batch: {} runs", report.runs);
    println!("==========================");
    println!("Attacker win rate: {:.1}%", report.attacker_win_rate * 100.0);
    println!("Timeouts:          {}", report.timeouts);
    println!("Mean ticks:        {:.0}", report.mean_ticks);
    println!(
        "Mean units left:   attacker {:.1}, defender {:.1}",
        report.mean_attacker_units_left, report.mean_defender_units_left
    );

    // Rough per-category power reference for reading the numbers
    let infantry = [
        UnitType::Swordsman.base_stats(),
        UnitType::Spearman.base_stats(),
    ];
    let agg = AggregatedStats::from_stats(&infantry);
    println!(
        "Reference: combined infantry damage {:.1}/s",
        agg.total_damage()
    );
}

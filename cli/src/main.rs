pub mod cli;
mod scenario;
mod stats;

use std::collections::HashMap;
use std::time::Duration;

use clap::Parser;

use cli::{Cli, ScenarioChoice};
use scenario::ScenarioReport;

async fn run_once(choice: ScenarioChoice) -> Vec<ScenarioReport> {
    match choice {
        ScenarioChoice::S0 => vec![scenario::run_s0().await],
        ScenarioChoice::S1 => vec![scenario::run_s1().await],
        ScenarioChoice::S2 => vec![scenario::run_s2().await],
        ScenarioChoice::S3 => vec![scenario::run_s3().await],
        ScenarioChoice::ShutdownDemo => vec![scenario::run_shutdown_demo().await],
        ScenarioChoice::All => vec![
            scenario::run_s0().await,
            scenario::run_s1().await,
            scenario::run_s2().await,
            scenario::run_s3().await,
            scenario::run_shutdown_demo().await,
        ],
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::init_logger("sfcs");

    let cli = Cli::parse();
    tracing::info!(iterations = cli.iterations, "starting scenario driver");

    let mut samples: HashMap<&'static str, (Vec<f64>, Duration)> = HashMap::new();

    for iteration in 0..cli.iterations {
        tracing::info!(iteration, "running scenario batch");
        for report in run_once(cli.scenario).await {
            let entry = samples
                .entry(report.name)
                .or_insert_with(|| (Vec::new(), report.optimal));
            entry.0.push(report.elapsed.as_secs_f64());
        }
    }

    let mut names: Vec<&&'static str> = samples.keys().collect();
    names.sort();
    for name in names {
        let (elapsed_secs, optimal) = &samples[name];
        let (mean, stddev) = stats::mean_stddev(elapsed_secs);
        println!(
            "{name}: mean={mean:.3}s stddev={stddev:.3}s optimal={:.3}s (n={})",
            optimal.as_secs_f64(),
            elapsed_secs.len()
        );
    }

    tracing::info!("scenario driver finished");
    Ok(())
}

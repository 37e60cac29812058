use clap::{Parser, ValueEnum};

/// Which scenario(s) the driver runs. Mirrors the scenario vocabulary the
/// design lays out: S0 through S3 plus the shutdown-unblock demonstration,
/// or `all` to run every one of them in sequence.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScenarioChoice {
    /// IGW mass-production, with a mid-run CC_Task batch submitted late.
    S0,
    /// Straight-line AC pipeline: CC, then EC, then AC.
    S1,
    /// Same pipeline as S1, submitted CC, AC, then EC.
    S2,
    /// Nested holon: a recursive agent delegates CC_Task to a sub-manager.
    S3,
    /// A blocked reservation unblocks once the store is shut down.
    ShutdownDemo,
    /// Every scenario above, in order.
    All,
}

#[derive(Debug, Parser)]
#[clap(name = "sfcs", version)]
pub struct Cli {
    /// Scenario to run.
    #[clap(long, value_enum, default_value_t = ScenarioChoice::All)]
    pub scenario: ScenarioChoice,

    /// Number of times to repeat the chosen scenario(s), reporting the mean
    /// and standard deviation of the time to reach each scenario's goal.
    #[clap(long, default_value_t = 1)]
    pub iterations: usize,
}

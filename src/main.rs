use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use challenge_sim::report;
use challenge_sim::{ChallengeParams, MonteCarloEngine};

/// Monte Carlo simulation of a multi-team trading challenge.
///
/// The focal team bets on maximum variance while it is outside the top two;
/// opponents draw daily returns from distributions of varying volatility.
#[derive(Parser, Debug)]
#[command(name = "challenge-sim")]
#[command(author, version, about)]
struct Args {
    /// Annual number of days the stock exchange is open
    #[arg(long, env = "CHALLENGE_ANNUAL_TRADING_DAYS", default_value = "252")]
    annual_trading_days: u32,

    /// Maximum annual implied volatility in percent [0, 100]
    #[arg(long, env = "CHALLENGE_MAX_IMPLIED_VOL", default_value = "100.0")]
    max_implied_vol: f64,

    /// Minimum annual implied volatility in percent [0, 100]
    #[arg(long, env = "CHALLENGE_MIN_IMPLIED_VOL", default_value = "10.0")]
    min_implied_vol: f64,

    /// Opponent volatility strategy: random, low, high, mixed (1/3 avg, 1/3 high, 1/3 random) or avg
    #[arg(long, env = "CHALLENGE_OPPONENT_STRATEGY", default_value = "random")]
    opponent_strategy: String,

    /// Annual risk-free rate used for Sharpe ratios [0, 1]
    #[arg(long, env = "CHALLENGE_RISK_FREE_RETURN", default_value = "0.0248")]
    risk_free_return: f64,

    /// Number of volatility levels opponents pick from each day
    #[arg(long, env = "CHALLENGE_NUM_PORTFOLIO_RETURN_DISTRIBUTIONS", default_value = "100")]
    num_portfolio_return_distributions: usize,

    /// Average annual market growth, the penalty for holding cash [0, 1]
    #[arg(long, env = "CHALLENGE_MARKET_DRIFT", default_value = "0.06")]
    market_drift: f64,

    /// Number of competing teams, focal team included
    #[arg(long, env = "CHALLENGE_NUM_TEAMS", default_value = "61")]
    num_teams: usize,

    /// Number of trading days in one competition
    #[arg(long, env = "CHALLENGE_SIMULATION_LENGTH_DAYS", default_value = "50")]
    simulation_length_days: usize,

    /// Number of simulated competitions
    #[arg(long, env = "CHALLENGE_TRIALS", default_value = "1000")]
    trials: usize,

    /// Seed for the run's random source
    #[arg(long, env = "CHALLENGE_SEED", default_value = "97")]
    seed: u64,

    /// Directory for the run log, result dumps and histograms
    #[arg(short, long, env = "CHALLENGE_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Worker threads (0 = one per core)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Skip the text log and JSON/CSV result files
    #[arg(long)]
    no_report: bool,

    /// Skip the outcome histograms
    #[arg(long)]
    no_histograms: bool,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn params(&self) -> ChallengeParams {
        ChallengeParams {
            annual_trading_days: self.annual_trading_days,
            max_implied_vol: self.max_implied_vol,
            min_implied_vol: self.min_implied_vol,
            opponent_strategy: self.opponent_strategy.clone(),
            risk_free_return: self.risk_free_return,
            num_portfolio_return_distributions: self.num_portfolio_return_distributions,
            market_drift: self.market_drift,
            num_teams: self.num_teams,
            simulation_length_days: self.simulation_length_days,
            trials: self.trials,
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Fails on a bad strategy or range before any trial runs
    let params = args.params();
    let config = params.resolve().context("Invalid simulation settings")?;
    let strategy = config.strategy;
    let num_teams = config.num_teams;

    info!("=== TRADING CHALLENGE SIMULATION ===");
    info!(
        "Daily vol range {:.4}-{:.4}, risk-free {:.6}, drift {:.6}, seed {}",
        config.min_vol, config.max_vol, config.risk_free, config.drift, config.seed
    );

    let engine = MonteCarloEngine::new(config)?;
    let outcome = if args.threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build()?;
        pool.install(|| engine.run())?
    } else {
        engine.run()?
    };

    println!("\n{}", "=".repeat(60));
    println!("FOCAL TEAM FINALS ({} trials, {} teams, opponents {})", outcome.stats.trials, num_teams, strategy);
    println!("{}", "=".repeat(60));
    for (metric, summary) in [("Total assets", &outcome.stats.by_wealth), ("Sharpe ratio", &outcome.stats.by_sharpe)] {
        println!(
            "  {:13} {:>6} finals  {:>7.2}%  edge {:.2}x",
            metric,
            summary.frequency,
            summary.probability * 100.0,
            summary.edge
        );
    }

    if args.no_report && args.no_histograms {
        return Ok(());
    }

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", args.output_dir))?;
    let now = Local::now();
    let stamp = now.format("%m_%d_%Y_%H_%M_%S").to_string();

    if !args.no_report {
        report::append_summary(&args.output_dir.join(report::SUMMARY_FILE), &params, &outcome.stats, now)?;
        report::write_summary_json(
            &args.output_dir.join(format!("summary_{}_{}.json", strategy, stamp)),
            &params,
            &outcome.stats,
        )?;
        report::write_trial_results(
            &args.output_dir.join(format!("trials_{}_{}.csv", strategy, stamp)),
            &outcome.results,
        )?;
    }

    if !args.no_histograms {
        report::write_histograms(&args.output_dir, strategy, &stamp, &outcome.results, num_teams)?;
    }

    info!("Simulation complete!");
    Ok(())
}

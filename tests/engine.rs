use challenge_sim::simulation::{
    AggregateStatistics, ChallengeParams, CompetitionTrial, MonteCarloEngine, OpponentStrategy,
    SimulationConfig, SimulationError, VolatilityMenu,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn params(num_teams: usize, days: usize, trials: usize, strategy: &str) -> ChallengeParams {
    ChallengeParams {
        num_teams,
        simulation_length_days: days,
        trials,
        opponent_strategy: strategy.to_string(),
        ..Default::default()
    }
}

fn config(num_teams: usize, days: usize, trials: usize, strategy: &str) -> SimulationConfig {
    params(num_teams, days, trials, strategy).resolve().unwrap()
}

#[test]
fn test_same_seed_same_results() {
    let cfg = config(12, 20, 40, "mixed");
    let first = MonteCarloEngine::new(cfg.clone()).unwrap().run().unwrap();
    let second = MonteCarloEngine::new(cfg).unwrap().run().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_results_independent_of_thread_count() {
    let engine = MonteCarloEngine::new(config(10, 15, 30, "random")).unwrap();

    let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let many = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();

    let a = single.install(|| engine.run()).unwrap();
    let b = many.install(|| engine.run()).unwrap();
    assert_eq!(a.results, b.results);
}

#[test]
fn test_different_seed_different_results() {
    let mut other = config(10, 15, 30, "random");
    other.seed += 1;
    let a = MonteCarloEngine::new(config(10, 15, 30, "random")).unwrap().run().unwrap();
    let b = MonteCarloEngine::new(other).unwrap().run().unwrap();
    assert_ne!(a.results.terminal_wealth, b.results.terminal_wealth);
}

#[test]
fn test_ranks_and_wealth_in_range() {
    for strategy in ["random", "low", "high", "mixed", "avg"] {
        let outcome = MonteCarloEngine::new(config(7, 12, 25, strategy)).unwrap().run().unwrap();
        let results = &outcome.results;

        assert_eq!(results.len(), 25);
        assert!(results.ranks_by_wealth.iter().all(|r| (1..=7).contains(r)), "{}", strategy);
        assert!(results.ranks_by_sharpe.iter().all(|r| (1..=7).contains(r)), "{}", strategy);
        assert!(results.terminal_wealth.iter().all(|w| w.is_finite() && *w >= 0.0), "{}", strategy);
    }
}

#[test]
fn test_wealth_stays_finite_every_day() {
    let cfg = config(9, 30, 1, "high");
    let menu = VolatilityMenu::new(cfg.min_vol, cfg.max_vol, cfg.num_distributions);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut trial = CompetitionTrial::new(&cfg, &menu);

    while !trial.is_finished() {
        trial.play_day(&mut rng).unwrap();
        assert!(trial.wealth().iter().all(|w| w.is_finite() && *w >= 0.0));
    }
}

#[test]
fn test_single_trial_statistics() {
    let outcome = MonteCarloEngine::new(config(5, 10, 1, "random")).unwrap().run().unwrap();
    let stats = outcome.stats;

    assert_eq!(stats.trials, 1);
    assert!(stats.by_wealth.frequency <= 2);
    assert!(stats.by_sharpe.frequency <= 2);
    assert_eq!(stats.by_wealth.probability, stats.by_wealth.frequency as f64);
    assert_eq!(stats.by_sharpe.probability, stats.by_sharpe.frequency as f64);
}

#[test]
fn test_invalid_strategy_fails_before_any_trial() {
    let err = params(5, 10, 100, "yolo").resolve().unwrap_err();
    assert_eq!(err, SimulationError::InvalidStrategy("yolo".to_string()));
}

#[test]
fn test_zero_volatility_opponents_grow_by_drift() {
    let mut cfg = config(3, 5, 1, "low");
    cfg.min_vol = 0.0;
    cfg.max_vol = 0.0;
    let menu = VolatilityMenu::new(cfg.min_vol, cfg.max_vol, cfg.num_distributions);

    for seed in [0, 1, 97, 12345] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut trial = CompetitionTrial::new(&cfg, &menu);
        let mut day = 0;

        while !trial.is_finished() {
            trial.play_day(&mut rng).unwrap();
            day += 1;
            let expected = (1.0 + cfg.drift).powi(day);
            for team in 0..2 {
                assert!((trial.wealth()[team] - expected).abs() < 1e-12);
            }
        }
        assert_eq!(day, 5);
    }

    // The full engine runs on this degenerate setup too
    let outcome = MonteCarloEngine::new(cfg).unwrap().run().unwrap();
    assert!((1..=3).contains(&outcome.results.ranks_by_wealth[0]));
}

#[test]
fn test_mixed_strategy_bands() {
    let cfg = SimulationConfig {
        annual_trading_days: 252,
        min_vol: 0.01,
        max_vol: 0.05,
        strategy: OpponentStrategy::Mixed,
        risk_free: 0.0,
        num_distributions: 5,
        drift: 0.0,
        num_teams: 6,
        days: 2000,
        trials: 1,
        seed: 97,
    };
    let menu = VolatilityMenu::new(cfg.min_vol, cfg.max_vol, cfg.num_distributions);

    // Fixed bands always resolve to the same volatility; the last band varies
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut seen_random = std::collections::HashSet::new();
    for _ in 0..500 {
        for team in 0..2 {
            assert_eq!(cfg.strategy.volatility(team, 6, &menu, &mut rng), menu.mean());
        }
        for team in 2..4 {
            assert_eq!(cfg.strategy.volatility(team, 6, &menu, &mut rng), menu.max());
        }
        for team in 4..6 {
            let vol = cfg.strategy.volatility(team, 6, &menu, &mut rng);
            assert!(menu.levels().contains(&vol));
            seen_random.insert(vol.to_bits());
        }
    }
    assert_eq!(seen_random.len(), 5);

    // Realized return dispersion matches each band's volatility
    let mut trial = CompetitionTrial::new(&cfg, &menu);
    while !trial.is_finished() {
        trial.play_day(&mut rng).unwrap();
    }
    let sample_std = |team: usize| {
        let row = trial.history().row(team, cfg.days);
        let mean = row.iter().sum::<f64>() / row.len() as f64;
        (row.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (row.len() - 1) as f64).sqrt()
    };
    for team in 0..2 {
        assert!((sample_std(team) / menu.mean() - 1.0).abs() < 0.1);
    }
    for team in 2..4 {
        assert!((sample_std(team) / menu.max() - 1.0).abs() < 0.1);
    }
    // Random picks mix the menu: E[vol^2] = mean of squared levels
    let mixed = (menu.levels().iter().map(|v| v * v).sum::<f64>() / 5.0).sqrt();
    assert!((sample_std(4) / mixed - 1.0).abs() < 0.1);
}

#[test]
fn test_aggregate_round_trip() {
    let cfg = config(15, 20, 200, "avg");
    let outcome = MonteCarloEngine::new(cfg).unwrap().run().unwrap();

    let trials = outcome.results.len() as f64;
    let finals = |ranks: &[usize]| ranks.iter().filter(|&&r| r <= 2).count() as f64;

    for (ranks, summary) in [
        (&outcome.results.ranks_by_wealth, outcome.stats.by_wealth),
        (&outcome.results.ranks_by_sharpe, outcome.stats.by_sharpe),
    ] {
        let freq = finals(ranks);
        assert_eq!(summary.frequency as f64, freq);
        assert!((summary.probability - freq / trials).abs() < 1e-12);
        assert!((summary.edge - freq / ((2.0 * trials - freq) / 14.0)).abs() < 1e-12);
    }

    assert_eq!(AggregateStatistics::from_results(&outcome.results, 15), outcome.stats);
}

#[test]
fn test_focal_strategy_beats_random_chance_by_wealth() {
    // Betting maximum variance against mostly lower-variance opponents
    // lands the focal team in the finals more often than chance
    let outcome = MonteCarloEngine::new(config(20, 50, 400, "low")).unwrap().run().unwrap();
    assert!(outcome.stats.by_wealth.edge > 1.0);
}

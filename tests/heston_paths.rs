use approx::assert_relative_eq;
use heston_smile::core::SimulationConfig;
use heston_smile::mc::{generate_shocks, simulate};

fn config(n_steps: usize, n_paths: usize) -> SimulationConfig {
    SimulationConfig {
        n_steps,
        n_paths,
        ..SimulationConfig::default()
    }
}

#[test]
fn variance_is_non_negative_and_prices_positive_everywhere() {
    let cfg = SimulationConfig {
        sigma: 1.2,
        ..config(252, 2_000)
    };
    let shocks = generate_shocks(cfg.n_steps, cfg.n_paths, cfg.rho, Some(17)).unwrap();
    let paths = simulate(&cfg, &shocks).unwrap();

    assert!(paths.variances().iter().all(|&v| v >= 0.0));
    assert!(paths.prices().iter().all(|&s| s > 0.0 && s.is_finite()));
    assert!(paths.prices().row(0).iter().all(|&s| s == cfg.s0));
    assert!(paths.variances().row(0).iter().all(|&v| v == cfg.v0));
}

#[test]
fn shock_correlation_recovers_rho() {
    for rho in [-0.7, 0.0, 0.4] {
        let shocks = generate_shocks(10, 20_000, rho, Some(5)).unwrap();
        let sample = shocks.sample_correlation().unwrap();
        assert!((sample - rho).abs() < 0.02, "rho={rho} sample={sample}");
    }
}

#[test]
fn feller_violation_exercises_truncation() {
    let cfg = SimulationConfig {
        sigma: 1.5,
        ..config(252, 2_000)
    };
    assert!(!cfg.feller_condition_satisfied());

    let shocks = generate_shocks(cfg.n_steps, cfg.n_paths, cfg.rho, Some(23)).unwrap();
    let paths = simulate(&cfg, &shocks).unwrap();
    assert!(paths.truncations() > 0);
    assert!(paths.variances().iter().all(|&v| v >= 0.0));
    assert!(paths.variances().iter().any(|&v| v == 0.0));
}

#[test]
fn constant_variance_keeps_discounted_price_a_martingale() {
    let cfg = SimulationConfig {
        sigma: 0.0,
        v0: 0.04,
        theta: 0.04,
        ..config(100, 20_000)
    };
    let shocks = generate_shocks(cfg.n_steps, cfg.n_paths, cfg.rho, Some(31)).unwrap();
    let paths = simulate(&cfg, &shocks).unwrap();

    assert!(paths.variances().iter().all(|&v| (v - 0.04).abs() < 1e-15));
    assert_eq!(paths.truncations(), 0);

    let terminal = paths.terminal_prices();
    let discounted = cfg.discount_factor() * terminal.sum() / terminal.len() as f64;
    assert_relative_eq!(discounted, cfg.s0, epsilon = 0.75);
}

#[test]
fn same_seed_gives_bit_identical_paths() {
    let cfg = config(60, 500);
    let run = || {
        let shocks = generate_shocks(cfg.n_steps, cfg.n_paths, cfg.rho, Some(77)).unwrap();
        simulate(&cfg, &shocks).unwrap()
    };
    let (a, b) = (run(), run());
    assert_eq!(a.prices(), b.prices());
    assert_eq!(a.variances(), b.variances());
    assert_eq!(a.truncations(), b.truncations());
}

#[test]
fn replaying_a_recorded_seed_reproduces_an_unseeded_run() {
    let cfg = config(30, 300);
    let first = generate_shocks(cfg.n_steps, cfg.n_paths, cfg.rho, None).unwrap();
    let replay = generate_shocks(cfg.n_steps, cfg.n_paths, cfg.rho, Some(first.seed())).unwrap();
    assert_eq!(
        simulate(&cfg, &first).unwrap(),
        simulate(&cfg, &replay).unwrap()
    );
}

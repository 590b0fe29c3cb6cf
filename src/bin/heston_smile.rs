//! Runs one Heston smile and prints it.
//!
//! ```text
//! heston_smile [CONFIG.json] [--json]
//! ```
//!
//! Configuration is layered: defaults, then the optional JSON file, then
//! `HESTON_PATHS`, `HESTON_STEPS`, `HESTON_RHO` and `HESTON_SEED`.
//!
//! Calls are inverted in strict mode by default: when the sample mean of `S_T`
//! lands below its forward, the deepest in-the-money call prices below intrinsic
//! and the run fails. Set `"call_mode": "permissive"` to keep such runs.

use std::path::PathBuf;

use heston_smile::core::AppConfig;
use heston_smile::vol::implied::ImpliedVolResult;
use heston_smile::vol::smile::{HestonSmile, SmileReport};

const USAGE: &str = "usage: heston_smile [CONFIG.json] [--json]

Calls are solved in strict mode and puts in permissive mode unless the config
sets call_mode / put_mode. Under strict calls the run fails whenever a call
quote falls outside its no-arbitrage bounds; with the default 1000 paths this
happens at the deepest in-the-money strike on roughly half of all seeds.
Set \"call_mode\": \"permissive\" to report such strikes as unsolved instead.";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut json = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            _ => path = Some(PathBuf::from(arg)),
        }
    }

    let cfg = match AppConfig::load(path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let report = match HestonSmile::from_app_config(&cfg).and_then(|smile| smile.run()) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("smile run failed: {e}");
            std::process::exit(1);
        }
    };

    if json {
        match report.to_json() {
            Ok(out) => println!("{out}"),
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(1);
            }
        }
    } else {
        print_table(&report);
    }
}

fn print_table(report: &SmileReport) {
    let stats = &report.terminal;
    println!(
        "seed {}  paths {}  steps {}  truncations {}",
        report.seed, report.config.n_paths, report.config.n_steps, report.truncations
    );
    println!(
        "S_T mean {:.4}  sd {:.4}  min {:.4}  max {:.4}  discounted mean {:.4}",
        stats.mean, stats.std_dev, stats.min, stats.max, stats.discounted_mean
    );
    println!();
    println!(
        "{:>8} {:>10} {:>8} {:>10} {:>10} {:>8} {:>10}",
        "strike", "call", "stderr", "call_iv", "put", "stderr", "put_iv"
    );
    for row in report.rows() {
        println!(
            "{:>8.2} {:>10.4} {:>8.4} {:>10} {:>10.4} {:>8.4} {:>10}",
            row.strike,
            row.call.price,
            row.call.stderr,
            fmt_vol(row.call_vol),
            row.put.price,
            row.put.stderr,
            fmt_vol(row.put_vol)
        );
    }
}

fn fmt_vol(vol: &ImpliedVolResult) -> String {
    match vol {
        ImpliedVolResult::Solved { vol } => format!("{vol:.4}"),
        ImpliedVolResult::Unsolved { .. } => "-".to_string(),
    }
}

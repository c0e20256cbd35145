//! Model-Based RL Demos
//!
//! # Pendulum swing-up
//!
//! ```bash
//! # Small settings, a few minutes on CPU
//! cargo run --release -p demos -- pendulum
//!
//! # Reference hyperparameters, or your own JSON file
//! cargo run --release -p demos -- pendulum --full
//! cargo run --release -p demos -- pendulum my_config.json
//! ```
//!
//! # 2-D point mass reaching the origin
//!
//! ```bash
//! cargo run --release -p demos -- point-mass
//! ```
//!
//! A JSON config only needs the fields it changes, e.g.
//! `{ "dagger_iters": 3, "mpc_horizon": 20 }`.

mod pendulum;
mod point_mass;

use model_based_rl::{MbrlError, Result, TrainingConfig};

fn print_usage() {
    println!("Usage: demos <demo> [--full | <config.json>]");
    println!();
    println!("Demos:");
    println!("  pendulum      Pendulum swing-up with a learned model and MPC");
    println!("  point-mass    2-D double integrator reaching the origin");
    println!();
    println!("Without a second argument each demo uses its quick settings.");
}

/// Quick settings, reference defaults (`--full`) or a JSON file.
fn load_config(arg: Option<&str>, quick: fn() -> TrainingConfig) -> Result<TrainingConfig> {
    let config = match arg {
        None => quick(),
        Some("--full") => TrainingConfig::default(),
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| MbrlError::invalid_config("config", format!("cannot read {}: {}", path, e)))?;
            TrainingConfig::from_json(&json)?
        }
    };
    config.validate()?;

    if let Ok(json) = serde_json::to_string(&config) {
        println!("training config: {}", json);
    }
    Ok(config)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let config_arg = args.get(2).map(String::as_str);
    let result = match args[1].as_str() {
        "pendulum" => load_config(config_arg, pendulum::quick_config).and_then(pendulum::run),
        "point-mass" => load_config(config_arg, point_mass::quick_config).and_then(point_mass::run),
        other => {
            println!("Unknown demo: {}", other);
            println!();
            print_usage();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Training failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_quick_and_missing_file() {
        let config = load_config(None, pendulum::quick_config).unwrap();
        assert_eq!(config.dagger_iters, pendulum::quick_config().dagger_iters);

        let missing = load_config(Some("no_such_config.json"), point_mass::quick_config);
        assert!(matches!(missing, Err(MbrlError::InvalidConfig { .. })));
    }
}

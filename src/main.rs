use std::process::ExitCode;

use casematch::RuleSet;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: casematch <rules.yaml> <json>...";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let rules = match RuleSet::load(&path) {
        Ok(rules) => rules,
        Err(err) => {
            eprintln!("{path}: {err}");
            return ExitCode::from(2);
        }
    };

    let mut failed = false;
    for arg in args {
        // Arguments that are not JSON are classified as strings.
        let subject = serde_json::from_str(&arg).unwrap_or_else(|_| Value::String(arg.clone()));
        match rules.classify(subject) {
            Ok(result) => println!("{result}"),
            Err(err) => {
                eprintln!("{arg}: {err}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

use std::thread;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use env_logger::Env;

use solar_house::{SceneReport, SpaProvider, TimeSelection};

mod cli;
mod output;

use cli::Args;

// ===================== MAIN =====================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    loop {
        let now = Utc::now();
        let config = args.scene_config(now)?;
        let provider =
            SpaProvider::for_date(config.date, config.location, config.elevation_m, config.atmosphere)?;
        let report = SceneReport::compute(&config, &provider, now, args.curve)?;

        if args.json {
            output::print_json(&report)?;
        } else {
            output::print_report(&report, args.curve, args.path);
        }

        let Some(interval) = args.watch else { break };
        // A fixed time of day renders once
        if config.time != TimeSelection::Now {
            break;
        }

        log::debug!("next refresh in {}s", interval);
        thread::sleep(Duration::from_secs(interval));
        if !args.json {
            println!();
            println!("---");
        }
    }

    Ok(())
}

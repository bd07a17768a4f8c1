use classroom_insights::cli::{Args, Command};
use classroom_insights::config::StoreFactory;
use classroom_insights::error::{Error, Result};
use classroom_insights::store::EventStore;
use classroom_insights::{ranking, report};
use log::{debug, error};
use serde::Serialize;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse_args();
    if args.no_color {
        colored::control::set_override(false);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = args.store_config()?;
    let store = StoreFactory::create(&config)?;
    let now = StoreFactory::date_provider(&config).get_current_time();
    debug!("Running {:?} at {now}", args.command);

    match &args.command {
        Command::Leaderboard { limit } => {
            let board = ranking::build_leaderboard(&store, *limit, config.max_concurrency)?;
            if args.json {
                print_json(&board)
            } else {
                print!("{}", report::render_leaderboard(&board, now));
                Ok(())
            }
        }
        Command::Challenge { challenge_id, limit } => {
            let board = ranking::build_challenge_leaderboard(&store, challenge_id, *limit)?
                .ok_or_else(|| Error::InvalidInput(format!("challenge '{challenge_id}' not found")))?;
            if args.json {
                print_json(&board)
            } else {
                print!("{}", report::render_challenge_board(&board));
                Ok(())
            }
        }
        Command::Analytics { user_id, period } => {
            let dashboard = ranking::build_dashboard(&store, user_id, *period, now)?;
            if args.json {
                print_json(&dashboard)
            } else {
                print!("{}", report::render_dashboard(&dashboard));
                Ok(())
            }
        }
        Command::Summary { user_id, period } => {
            let progress = store.fetch_learning_progress(user_id)?;
            let summary = ranking::progress_summary(&progress, *period, now);
            if args.json {
                print_json(&serde_json::json!({ "userId": user_id, "period": period, "summary": summary }))
            } else {
                print!("{summary}");
                if !summary.ends_with('\n') {
                    println!();
                }
                Ok(())
            }
        }
        Command::Class { period, sort_by } => {
            let overview =
                ranking::build_class_overview(&store, *period, *sort_by, now, config.max_concurrency)?;
            if args.json {
                print_json(&overview)
            } else {
                print!("{}", report::render_class_overview(&overview));
                Ok(())
            }
        }
    }
}

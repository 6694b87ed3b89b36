//! Diagnostic entry point: reconciles one profile and prints its statistics.

use clap::Parser;
use rvsrg_stats::models::GameMode;
use rvsrg_stats::{
    Database, HttpStatsClient, OnlineContext, Profile, ProfileReconciler, StatsConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rvsrg-stats", about = "Reconcile and print player statistics")]
struct Args {
    /// Local profile id.
    profile_id: i64,

    /// Treat the profile as the online self with this server user id.
    #[arg(long)]
    online: Option<i64>,

    #[arg(long, default_value = "stats.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("MAIN: Booting rVsrg stats...");

    let args = Args::parse();

    let config = match StatsConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("MAIN: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let db = match Database::new(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("MAIN: Unable to open statistics cache: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut profile = match db.load_profile(args.profile_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            log::error!("MAIN: No local profile with id {}", args.profile_id);
            if let Ok(profiles) = db.load_profiles().await {
                for known in profiles {
                    log::info!("MAIN: Known profile #{} {}", known.id, known.username);
                }
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            log::error!("MAIN: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = match args.online {
        Some(user_id) => {
            profile.is_online = true;
            OnlineContext::connected(user_id)
        }
        None => OnlineContext::offline(),
    };

    let client = match HttpStatsClient::new(&config.online) {
        Ok(client) => client,
        Err(e) => {
            log::error!("MAIN: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let reconciler = ProfileReconciler::new(db, client, config.online.request_timeout());
    reconciler.reconcile(&mut profile, &ctx).await;
    print_profile(&profile);

    ExitCode::SUCCESS
}

fn print_profile(profile: &Profile) {
    let source = profile
        .last_updated
        .map(|f| format!("{:?} at {}", f.source, f.at.format("%Y-%m-%d %H:%M:%S")))
        .unwrap_or_else(|| "never".to_string());
    println!("{} (#{}) - updated {}", profile.username, profile.id, source);

    for mode in GameMode::ALL {
        let Some(stats) = profile.stats.get(mode) else {
            continue;
        };
        println!(
            "  [{}] #{} (country #{}) rating {:.2} acc {:.2}% score {} combo {} plays {} fails {}",
            mode,
            stats.global_rank,
            stats.country_rank,
            stats.overall_rating,
            stats.overall_accuracy,
            stats.total_score,
            stats.max_combo,
            stats.play_count,
            stats.fail_count
        );
        let counts: Vec<String> = stats
            .judgement_counts
            .iter()
            .map(|(j, c)| format!("{} {}", j.name(), c))
            .collect();
        println!("        {}", counts.join(" / "));
    }
}

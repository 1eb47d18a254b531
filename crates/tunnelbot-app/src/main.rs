// Tunnel bot entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Fix the target date for this invocation
// 4. Build the statcast source and player directory
// 5. Run the pipeline with bounded retries

use anyhow::Context;
use tracing::info;

use tunnelbot_app::{app, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Tunnel bot starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 3. Target date, computed once and passed through explicitly
    let today = chrono::Local::now().date_naive();
    let date = config.target_date(today);
    info!(
        "Scoring {} (statcast source: {:?}, player source: {:?})",
        date, config.statcast.source, config.players.source
    );

    // 4. Collaborators
    let source = app::pitch_source(&config)?;
    let directory = app::player_directory(&config)?;
    let output_dir = config.output_dir();

    // 5. Run
    match app::run_with_retries(
        &config.retry,
        date,
        source.as_ref(),
        directory.as_ref(),
        &output_dir,
    )
    .await
    {
        Some(report) => {
            info!(
                "Success: {} {:.2} ({} ranked pairs)",
                report.pitcher_name, report.tunnel_score, report.ranked_pairs
            );
            println!("{}", report.post_text);
            for url in &report.video_urls {
                println!("{url}");
            }
        }
        None => info!("No report published for {}", date),
    }

    Ok(())
}

/// Initialize tracing to log to `logs/tunnelbot.log`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("tunnelbot.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("tunnelbot=info,tunnelbot_app=info,tunnelbot_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

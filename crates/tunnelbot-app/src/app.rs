// Run orchestration: one pipeline invocation for a date, wrapped in a bounded
// retry loop.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::{error, info, warn};
use tunnelbot_core::pipeline::{annotate, select_top_pair};

use crate::config::{Config, PlayerSourceKind, RetryConfig, StatcastSourceKind};
use crate::film_room::video_search_url;
use crate::players::{PlayerDirectory, RegisterDirectory, StatsApiDirectory};
use crate::report::{compose_post, write_report, RunReport};
use crate::statcast::{CsvFileSource, PitchSource, SavantClient};

/// Build the pitch source selected in config.
pub fn pitch_source(config: &Config) -> anyhow::Result<Box<dyn PitchSource>> {
    let statcast = &config.statcast;
    let source: Box<dyn PitchSource> = match statcast.source {
        StatcastSourceKind::Savant => Box::new(
            SavantClient::new(
                statcast.base_url.clone(),
                Duration::from_secs(statcast.timeout_secs),
            )
            .context("failed to build statcast HTTP client")?,
        ),
        StatcastSourceKind::Csv => {
            let path = statcast
                .csv_path
                .as_deref()
                .context("statcast.csv_path is not set")?;
            Box::new(CsvFileSource::new(path))
        }
    };
    Ok(source)
}

/// Build the player directory selected in config.
pub fn player_directory(config: &Config) -> anyhow::Result<Box<dyn PlayerDirectory>> {
    let players = &config.players;
    let directory: Box<dyn PlayerDirectory> = match players.source {
        PlayerSourceKind::StatsApi => Box::new(StatsApiDirectory::new(players.stats_api_url.clone())),
        PlayerSourceKind::Register => {
            let path = players
                .register_path
                .as_deref()
                .context("players.register_path is not set")?;
            let register = RegisterDirectory::open(Path::new(path))
                .context("failed to load player register")?;
            info!("loaded {} players from {}", register.len(), path);
            Box::new(register)
        }
    };
    Ok(directory)
}

/// Fetch, score, name, and publish the best pitch pair for `date`.
///
/// The pipeline itself is pure, so calling this again for the same date
/// produces the same report and overwrites the same files.
pub async fn run_once(
    date: NaiveDate,
    source: &dyn PitchSource,
    directory: &dyn PlayerDirectory,
    output_dir: &Path,
) -> anyhow::Result<RunReport> {
    let pitches = source
        .fetch_pitches(date)
        .await
        .with_context(|| format!("failed to fetch pitches for {date}"))?;

    let selection = select_top_pair(date, pitches)?;
    let pitcher = selection.top.pitcher;

    let names = directory
        .resolve_names(&[pitcher])
        .await
        .with_context(|| format!("failed to look up pitcher {pitcher}"))?;
    let named = annotate(&selection, &names)?;

    let [current, previous] = named.top.situations();
    let video_urls = [video_search_url(&current), video_search_url(&previous)];

    let report = RunReport {
        date,
        pitcher_name: named.pitcher_name.clone(),
        tunnel_score: named.top.tunnel_score,
        post_text: compose_post(&named),
        top: named.top,
        plot: named.plot,
        video_urls,
        ranked_pairs: selection.table.len(),
        excluded: selection.table.excluded,
    };

    write_report(output_dir, &selection.table, &report).context("failed to write report")?;

    info!(
        %date,
        pitcher = %report.pitcher_name,
        score = report.tunnel_score,
        "selected best tunneled pitch pair"
    );
    Ok(report)
}

/// Call [`run_once`] until it succeeds, at most `max_retries + 1` times.
///
/// Every failure is logged with the number of tries left. After the last
/// failure the run is abandoned and `None` is returned.
pub async fn run_with_retries(
    retry: &RetryConfig,
    date: NaiveDate,
    source: &dyn PitchSource,
    directory: &dyn PlayerDirectory,
    output_dir: &Path,
) -> Option<RunReport> {
    let attempts = retry.max_retries + 1;
    for attempt in 1..=attempts {
        match run_once(date, source, directory, output_dir).await {
            Ok(report) => return Some(report),
            Err(e) => {
                let remaining = attempts - attempt;
                warn!(attempt, remaining, "run for {date} failed: {e:#}");
                if remaining > 0 && retry.backoff_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(retry.backoff_ms)).await;
                }
            }
        }
    }
    error!("giving up on {date} after {attempts} attempts");
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

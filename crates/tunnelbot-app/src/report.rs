// Publication artifacts for a run: the ranked table, the two-row plotting
// projection, and a JSON summary with post text and video links.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use tunnelbot_core::pipeline::NamedSelection;
use tunnelbot_core::selector::{
    ExclusionCounts, PlotPitch, RankedPitchPair, RankedTable, CANONICAL_COLUMNS,
};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a publisher needs about the day's winning pitch pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub pitcher_name: String,
    pub tunnel_score: f64,
    pub top: RankedPitchPair,
    pub plot: [PlotPitch; 2],
    /// Film Room links for the current and previous pitch.
    pub video_urls: [String; 2],
    pub post_text: String,
    pub ranked_pairs: usize,
    pub excluded: ExclusionCounts,
}

// ---------------------------------------------------------------------------
// Post text
// ---------------------------------------------------------------------------

/// Official 2024 club hashtags, keyed by statcast team code.
pub fn team_hashtag(team: &str) -> Option<&'static str> {
    let tag = match team {
        "DET" => "RepDetroit",
        "CLE" => "ForTheLand",
        "MIN" => "MNTwins",
        "KC" => "WelcomeToTheCity",
        "CWS" => "WhiteSox",
        "HOU" => "Relentless",
        "LAA" => "RepTheHalo",
        "SEA" => "TridentsUp",
        "TEX" => "StraightUpTX",
        "OAK" | "ATH" => "Athletics",
        "CIN" => "ATOBTTR",
        "STL" => "ForTheLou",
        "MIL" => "ThisIsMyCrew",
        "PIT" => "LetsGoBucs",
        "CHC" => "YouHaveToSeeIt",
        "LAD" => "LetsGoDodgers",
        "SD" => "LetsGoPadres",
        "SF" => "SFGiants",
        "AZ" | "ARI" => "DBacks",
        "COL" => "Rockies",
        "NYY" => "RepBX",
        "BOS" => "DirtyWater",
        "TOR" => "TOTHECORE",
        "TB" => "RaysUp",
        "BAL" => "Birdland",
        "ATL" => "BravesCountry",
        "NYM" => "LGM",
        "PHI" => "RingTheBell",
        "MIA" => "HomeOfBeisbol",
        "WSH" => "NATITUDE",
        _ => return None,
    };
    Some(tag)
}

/// Compose the social post for the winning pair. Hashtags for teams without
/// a known tag are left out.
pub fn compose_post(selection: &NamedSelection) -> String {
    let top = &selection.top;
    let mut text = format!(
        "Best Pitch Yesterday by Tunnel Score\n{} {:.2}\n{} then {} ({}-{}, {} {})",
        selection.pitcher_name,
        top.tunnel_score,
        top.prev_pitch_name,
        top.pitch_name,
        top.balls,
        top.strikes,
        top.inning_topbot,
        top.inning,
    );

    let tags: Vec<String> = [top.away_team.as_str(), top.home_team.as_str()]
        .iter()
        .filter_map(|team| team_hashtag(team))
        .map(|tag| format!("#{tag}"))
        .collect();
    if !tags.is_empty() {
        text.push('\n');
        text.push_str(&tags.join(" "));
    }
    text
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> ReportError + '_ {
    move |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Write the ranked table with a header taken from `CANONICAL_COLUMNS`.
pub fn write_ranked_csv(path: &Path, table: &RankedTable) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error(path))?;
    writer
        .write_record(CANONICAL_COLUMNS)
        .map_err(csv_error(path))?;
    for row in &table.rows {
        writer.serialize(row).map_err(csv_error(path))?;
    }
    writer.flush().map_err(io_error(path))?;
    Ok(())
}

pub fn write_plot_csv(path: &Path, plot: &[PlotPitch]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_error(path))?;
    for row in plot {
        writer.serialize(row).map_err(csv_error(path))?;
    }
    writer.flush().map_err(io_error(path))?;
    Ok(())
}

/// Write `ranked.csv`, `plot.csv`, and `summary.json` under
/// `output_dir/<date>/`. Returns that directory.
pub fn write_report(
    output_dir: &Path,
    table: &RankedTable,
    report: &RunReport,
) -> Result<PathBuf, ReportError> {
    let dir = output_dir.join(report.date.format("%Y-%m-%d").to_string());
    std::fs::create_dir_all(&dir).map_err(io_error(&dir))?;

    write_ranked_csv(&dir.join("ranked.csv"), table)?;
    write_plot_csv(&dir.join("plot.csv"), &report.plot)?;

    let summary_path = dir.join("summary.json");
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&summary_path, json).map_err(io_error(&summary_path))?;

    info!("wrote tunnel report to {}", dir.display());
    Ok(dir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Statcast ingestion: fetch a day's pitch-level records from Baseball Savant
// or a local CSV export.
//
// Savant's CSV export has roughly ninety columns; only the ones the tunnel
// pipeline reads are deserialized and the rest are ignored.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};
use tunnelbot_core::pitch::{PitchRecord, PlayerId};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StatcastError {
    #[error("statcast request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("statcast request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {origin}: {source}")]
    Csv { origin: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// PitchSource
// ---------------------------------------------------------------------------

/// Supplier of one day's pitch events. May return zero rows.
#[async_trait]
pub trait PitchSource: Send + Sync {
    async fn fetch_pitches(&self, date: NaiveDate) -> Result<Vec<PitchRecord>, StatcastError>;
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// One statcast CSV row. Unparseable cells (Savant writes `null` or leaves
/// them blank) become `None` instead of failing the row.
#[derive(Debug, Deserialize)]
struct RawStatcastRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pitcher: Option<PlayerId>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    batter: Option<PlayerId>,
    #[serde(default)]
    home_team: Option<String>,
    #[serde(default)]
    away_team: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    game_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    inning: Option<u8>,
    #[serde(default)]
    inning_topbot: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    balls: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    strikes: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    outs_when_up: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    at_bat_number: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pitch_number: Option<u32>,
    #[serde(default)]
    pitch_type: Option<String>,
    #[serde(default)]
    pitch_name: Option<String>,
    #[serde(default)]
    des: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    plate_x: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    plate_z: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pfx_x: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pfx_z: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_pos_x: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_pos_z: Option<f64>,
    #[serde(default)]
    p_throws: Option<String>,
    #[serde(default)]
    stand: Option<String>,
}

/// Trim text cells and treat Savant's placeholder spellings as null.
fn text(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    match trimmed {
        "" | "null" | "NULL" | "NA" | "NaN" => None,
        _ => Some(trimmed.to_string()),
    }
}

/// Non-finite measurements are as good as missing.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl From<RawStatcastRow> for PitchRecord {
    fn from(raw: RawStatcastRow) -> Self {
        PitchRecord {
            pitcher: raw.pitcher,
            batter: raw.batter,
            home_team: text(raw.home_team),
            away_team: text(raw.away_team),
            game_date: raw.game_date,
            inning: raw.inning,
            inning_topbot: text(raw.inning_topbot),
            balls: raw.balls,
            strikes: raw.strikes,
            outs_when_up: raw.outs_when_up,
            at_bat_number: raw.at_bat_number,
            pitch_number: raw.pitch_number,
            pitch_type: text(raw.pitch_type),
            pitch_name: text(raw.pitch_name),
            des: text(raw.des),
            plate_x: finite(raw.plate_x),
            plate_z: finite(raw.plate_z),
            pfx_x: finite(raw.pfx_x),
            pfx_z: finite(raw.pfx_z),
            release_pos_x: finite(raw.release_pos_x),
            release_pos_z: finite(raw.release_pos_z),
            p_throws: text(raw.p_throws),
            stand: text(raw.stand),
        }
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader
// ---------------------------------------------------------------------------

/// Parse a statcast CSV export. Rows that cannot be read at all are skipped
/// with a warning; individual bad cells become nulls.
pub fn load_pitches_from_reader<R: Read>(rdr: R) -> Result<Vec<PitchRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let mut pitches = Vec::new();
    for (line, result) in reader.deserialize::<RawStatcastRow>().enumerate() {
        match result {
            Ok(raw) => pitches.push(PitchRecord::from(raw)),
            Err(e) => warn!("skipping malformed statcast row {}: {}", line + 1, e),
        }
    }
    Ok(pitches)
}

// ---------------------------------------------------------------------------
// Baseball Savant
// ---------------------------------------------------------------------------

/// Downloads pitch-level "details" exports from the Baseball Savant statcast
/// search for a single date.
pub struct SavantClient {
    http: reqwest::Client,
    base_url: String,
}

impl SavantClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StatcastError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Query parameters for a one-day, all-players, pitch-level search
    /// covering regular season, postseason, and spring training games.
    fn query(date: NaiveDate) -> Vec<(&'static str, String)> {
        let day = date.format("%Y-%m-%d").to_string();
        vec![
            ("all", "true".into()),
            ("hfGT", "R|PO|S|".into()),
            ("player_type", "pitcher".into()),
            ("game_date_gt", day.clone()),
            ("game_date_lt", day),
            ("min_pitches", "0".into()),
            ("min_results", "0".into()),
            ("min_abs", "0".into()),
            ("group_by", "name".into()),
            ("sort_col", "pitches".into()),
            ("sort_order", "desc".into()),
            ("type", "details".into()),
        ]
    }
}

#[async_trait]
impl PitchSource for SavantClient {
    async fn fetch_pitches(&self, date: NaiveDate) -> Result<Vec<PitchRecord>, StatcastError> {
        debug!(%date, url = %self.base_url, "requesting statcast export");
        let response = self
            .http
            .get(&self.base_url)
            .query(&Self::query(date))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatcastError::Status {
                url: self.base_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let pitches =
            load_pitches_from_reader(body.as_ref()).map_err(|e| StatcastError::Csv {
                origin: self.base_url.clone(),
                source: e,
            })?;
        info!(%date, pitches = pitches.len(), "fetched statcast pitches");
        Ok(pitches)
    }
}

// ---------------------------------------------------------------------------
// Local CSV export
// ---------------------------------------------------------------------------

/// Reads a previously downloaded statcast CSV and keeps the rows for the
/// requested date.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PitchSource for CsvFileSource {
    async fn fetch_pitches(&self, date: NaiveDate) -> Result<Vec<PitchRecord>, StatcastError> {
        let file = std::fs::File::open(&self.path).map_err(|e| StatcastError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        let pitches = load_pitches_from_reader(file).map_err(|e| StatcastError::Csv {
            origin: self.path.display().to_string(),
            source: e,
        })?;
        let total = pitches.len();
        let for_date: Vec<_> = pitches
            .into_iter()
            .filter(|p| p.game_date == Some(date))
            .collect();
        info!(
            %date,
            pitches = for_date.len(),
            skipped_other_dates = total - for_date.len(),
            "loaded statcast pitches from {}",
            self.path.display()
        );
        Ok(for_date)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

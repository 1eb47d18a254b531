// Selection and projection: restrict scored pairs to the canonical column
// set, drop incomplete rows, rank by tunnel score, and expose the winner.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::pitch::PlayerId;
use crate::scorer::TunneledPitchRecord;

/// The columns of the ranked table, in output order. A scored pair missing
/// any of these is excluded from the ranking. `RankedPitchPair` declares its
/// fields in exactly this order so it serializes with this header.
pub const CANONICAL_COLUMNS: [&str; 36] = [
    "pitcher",
    "batter",
    "home_team",
    "away_team",
    "inning",
    "prev_inning",
    "balls",
    "prev_balls",
    "strikes",
    "prev_strikes",
    "outs_when_up",
    "prev_outs_when_up",
    "des",
    "prev_des",
    "pitch_type",
    "prev_pitch_type",
    "pitch_name",
    "prev_pitch_name",
    "game_date",
    "tunnel_distance",
    "actual_distance",
    "p_throws",
    "stand",
    "inning_topbot",
    "plate_x",
    "plate_z",
    "plate_z_no_movement",
    "plate_x_no_movement",
    "prev_plate_x",
    "prev_plate_z",
    "prev_plate_z_no_movement",
    "prev_plate_x_no_movement",
    "tunnel_score",
    "at_bat_number",
    "pitch_number",
    "prev_pitch_number",
];

// ---------------------------------------------------------------------------
// Exclusion
// ---------------------------------------------------------------------------

/// Why a scored pair was left out of the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// A canonical column is null. `column` is the first one, in
    /// `CANONICAL_COLUMNS` order.
    MissingData { column: &'static str },
    /// Both distances are present but their ratio is not finite.
    UndefinedScore,
}

/// Tally of excluded rows by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionCounts {
    pub missing_data: usize,
    pub undefined_score: usize,
}

impl ExclusionCounts {
    pub fn total(&self) -> usize {
        self.missing_data + self.undefined_score
    }

    fn record(&mut self, exclusion: Exclusion) {
        match exclusion {
            Exclusion::MissingData { .. } => self.missing_data += 1,
            Exclusion::UndefinedScore => self.undefined_score += 1,
        }
    }
}

fn require<T: Clone>(value: &Option<T>, column: &'static str) -> Result<T, Exclusion> {
    value.clone().ok_or(Exclusion::MissingData { column })
}

// ---------------------------------------------------------------------------
// RankedPitchPair
// ---------------------------------------------------------------------------

/// A complete, scored pitch pair restricted to the canonical columns.
///
/// Field order mirrors `CANONICAL_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPitchPair {
    pub pitcher: PlayerId,
    pub batter: PlayerId,
    pub home_team: String,
    pub away_team: String,
    pub inning: u8,
    pub prev_inning: u8,
    pub balls: u8,
    pub prev_balls: u8,
    pub strikes: u8,
    pub prev_strikes: u8,
    pub outs_when_up: u8,
    pub prev_outs_when_up: u8,
    pub des: String,
    pub prev_des: String,
    pub pitch_type: String,
    pub prev_pitch_type: String,
    pub pitch_name: String,
    pub prev_pitch_name: String,
    pub game_date: NaiveDate,
    pub tunnel_distance: f64,
    pub actual_distance: f64,
    pub p_throws: String,
    pub stand: String,
    pub inning_topbot: String,
    pub plate_x: f64,
    pub plate_z: f64,
    pub plate_z_no_movement: f64,
    pub plate_x_no_movement: f64,
    pub prev_plate_x: f64,
    pub prev_plate_z: f64,
    pub prev_plate_z_no_movement: f64,
    pub prev_plate_x_no_movement: f64,
    pub tunnel_score: f64,
    pub at_bat_number: u32,
    pub pitch_number: u32,
    pub prev_pitch_number: u32,
}

impl RankedPitchPair {
    /// Project a scored pair onto the canonical columns, or report the
    /// reason it cannot be ranked.
    pub fn from_tunneled(t: &TunneledPitchRecord) -> Result<Self, Exclusion> {
        let cur = &t.paired.current;
        let prev = t.paired.previous.clone().unwrap_or_default();

        Ok(Self {
            pitcher: require(&cur.pitcher, "pitcher")?,
            batter: require(&cur.batter, "batter")?,
            home_team: require(&cur.home_team, "home_team")?,
            away_team: require(&cur.away_team, "away_team")?,
            inning: require(&cur.inning, "inning")?,
            prev_inning: require(&prev.inning, "prev_inning")?,
            balls: require(&cur.balls, "balls")?,
            prev_balls: require(&prev.balls, "prev_balls")?,
            strikes: require(&cur.strikes, "strikes")?,
            prev_strikes: require(&prev.strikes, "prev_strikes")?,
            outs_when_up: require(&cur.outs_when_up, "outs_when_up")?,
            prev_outs_when_up: require(&prev.outs_when_up, "prev_outs_when_up")?,
            des: require(&cur.des, "des")?,
            prev_des: require(&prev.des, "prev_des")?,
            pitch_type: require(&cur.pitch_type, "pitch_type")?,
            prev_pitch_type: require(&prev.pitch_type, "prev_pitch_type")?,
            pitch_name: require(&cur.pitch_name, "pitch_name")?,
            prev_pitch_name: require(&prev.pitch_name, "prev_pitch_name")?,
            game_date: require(&cur.game_date, "game_date")?,
            tunnel_distance: require(&t.tunnel_distance, "tunnel_distance")?,
            actual_distance: require(&t.actual_distance, "actual_distance")?,
            p_throws: require(&cur.p_throws, "p_throws")?,
            stand: require(&cur.stand, "stand")?,
            inning_topbot: require(&cur.inning_topbot, "inning_topbot")?,
            plate_x: require(&cur.plate_x, "plate_x")?,
            plate_z: require(&cur.plate_z, "plate_z")?,
            plate_z_no_movement: require(&t.plate_z_no_movement, "plate_z_no_movement")?,
            plate_x_no_movement: require(&t.plate_x_no_movement, "plate_x_no_movement")?,
            prev_plate_x: require(&prev.plate_x, "prev_plate_x")?,
            prev_plate_z: require(&prev.plate_z, "prev_plate_z")?,
            prev_plate_z_no_movement: require(
                &t.prev_plate_z_no_movement,
                "prev_plate_z_no_movement",
            )?,
            prev_plate_x_no_movement: require(
                &t.prev_plate_x_no_movement,
                "prev_plate_x_no_movement",
            )?,
            // Both distances are known at this point, so a missing score
            // means the ratio itself was undefined.
            tunnel_score: t.tunnel_score.ok_or(Exclusion::UndefinedScore)?,
            at_bat_number: require(&cur.at_bat_number, "at_bat_number")?,
            pitch_number: require(&cur.pitch_number, "pitch_number")?,
            prev_pitch_number: require(&prev.pitch_number, "prev_pitch_number")?,
        })
    }

    /// Two-row tidy view for plotting: the current pitch, then the previous
    /// pitch with its `prev_` prefix dropped. Both rows share the game date
    /// and at-bat number of the current pitch, and both carry the current
    /// pitch's no-movement point.
    pub fn plot_projection(&self) -> [PlotPitch; 2] {
        let current = PlotPitch {
            game_date: self.game_date,
            at_bat_number: self.at_bat_number,
            pitch_number: self.pitch_number,
            pitch_type: self.pitch_type.clone(),
            pitch_name: self.pitch_name.clone(),
            plate_x: self.plate_x,
            plate_z: self.plate_z,
            plate_x_no_movement: self.plate_x_no_movement,
            plate_z_no_movement: self.plate_z_no_movement,
        };
        let previous = PlotPitch {
            pitch_number: self.prev_pitch_number,
            pitch_type: self.prev_pitch_type.clone(),
            pitch_name: self.prev_pitch_name.clone(),
            plate_x: self.prev_plate_x,
            plate_z: self.prev_plate_z,
            ..current.clone()
        };
        [current, previous]
    }

    /// Game situation of the current and previous pitch, in that order:
    /// the raw keys a video index can be queried by.
    pub fn situations(&self) -> [PitchSituation; 2] {
        let current = PitchSituation {
            game_date: self.game_date,
            pitcher: self.pitcher,
            inning: self.inning,
            inning_topbot: self.inning_topbot.clone(),
            outs_when_up: self.outs_when_up,
            balls: self.balls,
            strikes: self.strikes,
        };
        let previous = PitchSituation {
            inning: self.prev_inning,
            outs_when_up: self.prev_outs_when_up,
            balls: self.prev_balls,
            strikes: self.prev_strikes,
            ..current.clone()
        };
        [current, previous]
    }
}

/// One row of the tidy plotting projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPitch {
    pub game_date: NaiveDate,
    pub at_bat_number: u32,
    pub pitch_number: u32,
    pub pitch_type: String,
    pub pitch_name: String,
    pub plate_x: f64,
    pub plate_z: f64,
    pub plate_x_no_movement: f64,
    pub plate_z_no_movement: f64,
}

/// Count, inning, and pitcher for a single pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PitchSituation {
    pub game_date: NaiveDate,
    pub pitcher: PlayerId,
    pub inning: u8,
    pub inning_topbot: String,
    pub outs_when_up: u8,
    pub balls: u8,
    pub strikes: u8,
}

// ---------------------------------------------------------------------------
// RankedTable
// ---------------------------------------------------------------------------

/// Complete pitch pairs for one date, best tunnel score first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTable {
    pub date: NaiveDate,
    pub rows: Vec<RankedPitchPair>,
    pub excluded: ExclusionCounts,
}

impl RankedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The highest-scoring pair. Fails when no pair qualified.
    pub fn top(&self) -> Result<&RankedPitchPair, PipelineError> {
        self.rows
            .first()
            .ok_or(PipelineError::NoQualifyingPairs { date: self.date })
    }
}

/// Filter scored pairs down to complete rows and sort them by tunnel score,
/// descending. Ties keep their input order.
pub fn rank(date: NaiveDate, records: &[TunneledPitchRecord]) -> RankedTable {
    let mut excluded = ExclusionCounts::default();
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        match RankedPitchPair::from_tunneled(record) {
            Ok(row) => rows.push(row),
            Err(exclusion) => excluded.record(exclusion),
        }
    }

    rows.sort_by(|a, b| b.tunnel_score.total_cmp(&a.tunnel_score));

    debug!(
        missing_data = excluded.missing_data,
        undefined_score = excluded.undefined_score,
        "excluded incomplete pitch pairs"
    );
    info!(
        %date,
        ranked = rows.len(),
        excluded = excluded.total(),
        "ranked pitch pairs by tunnel score"
    );

    RankedTable {
        date,
        rows,
        excluded,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

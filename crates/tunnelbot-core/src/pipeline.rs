// Stage composition: sequence, score, rank, and pick the best pitch pair for
// one date. The date is passed in explicitly; nothing here reads a clock.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::PipelineError;
use crate::pitch::{PitchRecord, PlayerId};
use crate::scorer::score_all;
use crate::selector::{rank, PlotPitch, RankedPitchPair, RankedTable};
use crate::sequencer::pair_with_previous;

/// The ranked table for a date together with its top pair and that pair's
/// plotting projection.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelSelection {
    pub table: RankedTable,
    pub top: RankedPitchPair,
    pub plot: [PlotPitch; 2],
}

/// A selection whose winning pitcher has been given a display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSelection {
    pub pitcher_name: String,
    pub top: RankedPitchPair,
    pub plot: [PlotPitch; 2],
}

/// Run the full tunnel pipeline over one day's pitches.
pub fn rank_pitch_pairs(date: NaiveDate, records: Vec<PitchRecord>) -> RankedTable {
    let input_rows = records.len();
    let paired = pair_with_previous(records);
    let scored = score_all(paired);
    let table = rank(date, &scored);
    info!(%date, input_rows, ranked = table.len(), "tunnel pipeline complete");
    table
}

/// Rank the day's pitch pairs and select the best one.
///
/// Fails with [`PipelineError::NoQualifyingPairs`] when no pair survives
/// filtering, including when `records` is empty.
pub fn select_top_pair(
    date: NaiveDate,
    records: Vec<PitchRecord>,
) -> Result<TunnelSelection, PipelineError> {
    let table = rank_pitch_pairs(date, records);
    let top = table.top()?.clone();
    let plot = top.plot_projection();
    Ok(TunnelSelection { table, top, plot })
}

/// Attach the winning pitcher's display name from a lookup result.
pub fn annotate(
    selection: &TunnelSelection,
    names: &HashMap<PlayerId, String>,
) -> Result<NamedSelection, PipelineError> {
    let pitcher_id = selection.top.pitcher;
    let pitcher_name = names
        .get(&pitcher_id)
        .cloned()
        .ok_or(PipelineError::UnresolvedIdentity { pitcher_id })?;
    Ok(NamedSelection {
        pitcher_name,
        top: selection.top.clone(),
        plot: selection.plot.clone(),
    })
}

// Per-pitcher sequencing: sort a day's pitches chronologically and link each
// pitch to the one the same pitcher threw immediately before it.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::pitch::{PitchRecord, PlayerId};

/// A pitch together with a full copy of the previous pitch by the same
/// pitcher. `previous` is `None` for a pitcher's first pitch of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedPitchRecord {
    pub current: PitchRecord,
    pub previous: Option<PitchRecord>,
}

/// Sort `records` by (game_date, pitcher, at_bat_number, pitch_number)
/// ascending and attach to every record the record preceding it within its
/// pitcher's partition.
///
/// The sort is stable, so records sharing the full key keep their input
/// order and are linked to each other in that order. No rows are added or
/// dropped.
pub fn pair_with_previous(mut records: Vec<PitchRecord>) -> Vec<PairedPitchRecord> {
    records.sort_by(|a, b| a.sequence_key().cmp(&b.sequence_key()));

    let mut last_by_pitcher: HashMap<Option<PlayerId>, usize> = HashMap::new();
    let mut paired = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let previous = last_by_pitcher
            .insert(record.pitcher, idx)
            .map(|prev_idx| records[prev_idx].clone());
        paired.push(PairedPitchRecord {
            current: record.clone(),
            previous,
        });
    }

    debug!(
        pitches = paired.len(),
        pitchers = last_by_pitcher.len(),
        "paired pitches with their predecessors"
    );
    paired
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

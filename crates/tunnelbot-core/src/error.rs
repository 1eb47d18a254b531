// Whole-run failures of the tunnel pipeline. Per-row anomalies (missing
// measurements, undefined scores) are handled by exclusion and never appear
// here.

use chrono::NaiveDate;
use thiserror::Error;

use crate::pitch::PlayerId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("no qualifying pitch pairs for {date}")]
    NoQualifyingPairs { date: NaiveDate },

    #[error("no display name found for pitcher {pitcher_id}")]
    UnresolvedIdentity { pitcher_id: PlayerId },
}

// Library root for the tunnel-score pipeline: pitch data model, sequencing,
// scoring, and ranked selection. Pure and synchronous; all I/O lives in
// `tunnelbot-app`.

pub mod error;
pub mod pipeline;
pub mod pitch;
pub mod scorer;
pub mod selector;
pub mod sequencer;

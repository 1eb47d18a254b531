// Library root: the collaborators around the tunnel pipeline (config,
// ingestion, identity lookup, video links, report output) and the run loop.

pub mod app;
pub mod config;
pub mod film_room;
pub mod players;
pub mod report;
pub mod statcast;

// Integration tests: a full run over fixture files, with no network access.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tunnelbot_app::app::{run_once, run_with_retries};
use tunnelbot_app::config::RetryConfig;
use tunnelbot_app::players::RegisterDirectory;
use tunnelbot_app::statcast::{CsvFileSource, PitchSource};
use tunnelbot_core::selector::CANONICAL_COLUMNS;

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn fixture(name: &str) -> PathBuf {
    Path::new(FIXTURES).join(name)
}

fn output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test]
async fn fixture_day_selects_best_tunnel() {
    let source = CsvFileSource::new(fixture("statcast_sample.csv"));
    let register = RegisterDirectory::open(&fixture("people.csv")).unwrap();
    let out = output_dir("tunnelbot_integration_fixture_day");

    let report = run_once(date(), &source, &register, &out).await.unwrap();

    // Cole's slider after a fastball: tunnel distance 0.1, actual ~1.526.
    assert_eq!(report.pitcher_name, "Gerrit Cole");
    assert_eq!(report.top.pitcher, 543037);
    assert_eq!(report.top.pitch_name, "Slider");
    assert_eq!(report.top.prev_pitch_name, "4-Seam Fastball");
    assert_eq!(report.top.at_bat_number, 5);
    assert_eq!((report.top.prev_pitch_number, report.top.pitch_number), (1, 2));
    assert!((report.tunnel_score - 15.264).abs() < 0.01);

    // Only Cole's second and third pitches are complete pairs.
    assert_eq!(report.ranked_pairs, 2);
    assert_eq!(report.excluded.missing_data, 4);
    assert_eq!(report.excluded.undefined_score, 0);

    let [current, previous] = &report.plot;
    assert_eq!(current.pitch_number, 2);
    assert_eq!(previous.pitch_number, 1);
    assert_eq!(current.plate_x_no_movement, previous.plate_x_no_movement);

    assert!(report.video_urls[0].contains("PitcherId+%3D+%5B543037%5D"));
    assert!(report.video_urls[0].contains("TopBottom+%3D+%5B%22BOT%22%5D"));
    assert!(report.post_text.ends_with("#RepBX #Birdland"));

    let ranked = std::fs::read_to_string(out.join("2024-05-01").join("ranked.csv")).unwrap();
    assert_eq!(ranked.lines().next().unwrap(), CANONICAL_COLUMNS.join(","));
    assert_eq!(ranked.lines().count(), 3);

    let _ = std::fs::remove_dir_all(&out);
}

#[tokio::test]
async fn csv_source_excludes_other_dates() {
    let source = CsvFileSource::new(fixture("statcast_sample.csv"));
    let pitches = source.fetch_pitches(date()).await.unwrap();
    assert_eq!(pitches.len(), 6);
}

#[tokio::test]
async fn date_without_pitches_gives_up_after_retries() {
    let source = CsvFileSource::new(fixture("statcast_sample.csv"));
    let register = RegisterDirectory::open(&fixture("people.csv")).unwrap();
    let out = output_dir("tunnelbot_integration_no_pitches");
    let retry = RetryConfig {
        max_retries: 2,
        backoff_ms: 0,
    };

    let empty_day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let report = run_with_retries(&retry, empty_day, &source, &register, &out).await;

    assert!(report.is_none());
    assert!(!out.exists());
}

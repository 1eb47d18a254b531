// MLB Film Room search links for a single pitch.

use chrono::Datelike;
use tunnelbot_core::selector::PitchSituation;

const FILM_ROOM_URL: &str = "https://www.mlb.com/video/";

/// `Field = [value]`, URL-encoded the way Film Room writes its own queries.
fn clause(field: &str, value: impl std::fmt::Display) -> String {
    format!("{field}+%3D+%5B{value}%5D")
}

/// Quoted string values are wrapped in `%22`.
fn quoted(value: impl std::fmt::Display) -> String {
    format!("%22{value}%22")
}

/// Build a Film Room search URL that narrows to the given pitch: season,
/// date, pitcher, half inning, inning, and the count and outs at the time
/// of the pitch, newest first.
pub fn video_search_url(situation: &PitchSituation) -> String {
    let clauses = [
        clause("Season", situation.game_date.year()),
        clause("Date", quoted(situation.game_date.format("%Y-%m-%d"))),
        clause("PitcherId", situation.pitcher),
        clause("TopBottom", quoted(situation.inning_topbot.to_uppercase())),
        clause("Outs", situation.outs_when_up),
        clause("Balls", situation.balls),
        clause("Strikes", situation.strikes),
        clause("Inning", situation.inning),
    ];
    format!(
        "{FILM_ROOM_URL}?q={}+Order+By+Timestamp+DESC",
        clauses.join("+AND+")
    )
}

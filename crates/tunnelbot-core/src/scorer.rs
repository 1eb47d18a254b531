// Tunnel scoring: compare where two consecutive pitches looked like they were
// headed against where they actually finished.

use serde::Serialize;

use crate::pitch::Point;
use crate::sequencer::PairedPitchRecord;

/// A paired pitch with its derived no-movement coordinates, distances, and
/// tunnel score. Every derived field is `None` when any of its inputs is
/// null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TunneledPitchRecord {
    pub paired: PairedPitchRecord,
    pub plate_x_no_movement: Option<f64>,
    pub plate_z_no_movement: Option<f64>,
    pub prev_plate_x_no_movement: Option<f64>,
    pub prev_plate_z_no_movement: Option<f64>,
    /// Separation of the two no-movement points. Small means the pitches
    /// looked alike at the batter's decision point.
    pub tunnel_distance: Option<f64>,
    /// Separation of the two actual plate locations.
    pub actual_distance: Option<f64>,
    /// Separation of the two release points. Informational only.
    pub release_distance: Option<f64>,
    /// `actual_distance / tunnel_distance`. `None` when the ratio is not a
    /// finite number, which includes `tunnel_distance == 0`.
    pub tunnel_score: Option<f64>,
}

/// `actual / tunnel`, or `None` if that is not finite.
pub fn tunnel_score(actual_distance: f64, tunnel_distance: f64) -> Option<f64> {
    if tunnel_distance == 0.0 {
        return None;
    }
    let score = actual_distance / tunnel_distance;
    score.is_finite().then_some(score)
}

fn distance(a: Option<Point>, b: Option<Point>) -> Option<f64> {
    Some(a?.distance(&b?))
}

/// Derive no-movement points, distances, and the tunnel score for one pair.
pub fn score_pair(paired: PairedPitchRecord) -> TunneledPitchRecord {
    let current = &paired.current;
    let previous = paired.previous.as_ref();

    let no_move = current.no_movement_location();
    let prev_no_move = previous.and_then(|p| p.no_movement_location());

    let tunnel_distance = distance(no_move, prev_no_move);
    let actual_distance = distance(
        current.plate_location(),
        previous.and_then(|p| p.plate_location()),
    );
    let release_distance = distance(
        current.release_point(),
        previous.and_then(|p| p.release_point()),
    );
    let score = match (actual_distance, tunnel_distance) {
        (Some(actual), Some(tunnel)) => tunnel_score(actual, tunnel),
        _ => None,
    };

    TunneledPitchRecord {
        plate_x_no_movement: no_move.map(|p| p.x),
        plate_z_no_movement: no_move.map(|p| p.z),
        prev_plate_x_no_movement: prev_no_move.map(|p| p.x),
        prev_plate_z_no_movement: prev_no_move.map(|p| p.z),
        tunnel_distance,
        actual_distance,
        release_distance,
        tunnel_score: score,
        paired,
    }
}

/// Score every pair, preserving order.
pub fn score_all(pairs: Vec<PairedPitchRecord>) -> Vec<TunneledPitchRecord> {
    pairs.into_iter().map(score_pair).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchRecord;

    fn located(plate: (f64, f64), pfx: (f64, f64)) -> PitchRecord {
        PitchRecord {
            pitcher: Some(1),
            plate_x: Some(plate.0),
            plate_z: Some(plate.1),
            pfx_x: Some(pfx.0),
            pfx_z: Some(pfx.1),
            ..Default::default()
        }
    }

    fn pair(previous: PitchRecord, current: PitchRecord) -> PairedPitchRecord {
        PairedPitchRecord {
            current,
            previous: Some(previous),
        }
    }

    #[test]
    fn identical_tunnel_points_have_no_score() {
        // A: plate (0,2), no break. B: plate (1,2), break (1,0).
        // Both no-movement points are (0,2).
        let a = located((0.0, 2.0), (0.0, 0.0));
        let b = located((1.0, 2.0), (1.0, 0.0));
        let scored = score_pair(pair(a, b));

        assert_eq!(scored.plate_x_no_movement, Some(0.0));
        assert_eq!(scored.plate_z_no_movement, Some(2.0));
        assert_eq!(scored.prev_plate_x_no_movement, Some(0.0));
        assert_eq!(scored.prev_plate_z_no_movement, Some(2.0));
        assert_eq!(scored.tunnel_distance, Some(0.0));
        assert_eq!(scored.actual_distance, Some(1.0));
        assert!(scored.tunnel_score.is_none());
    }

    #[test]
    fn score_is_actual_over_tunnel_distance() {
        // A: no-movement (0,0), actual (0,0). B: no-movement (0,1), actual (2,2).
        let a = located((0.0, 0.0), (0.0, 0.0));
        let b = located((2.0, 2.0), (2.0, 1.0));
        let scored = score_pair(pair(a, b));

        assert!((scored.tunnel_distance.unwrap() - 1.0).abs() < 1e-12);
        assert!((scored.actual_distance.unwrap() - 8f64.sqrt()).abs() < 1e-12);
        assert!((scored.tunnel_score.unwrap() - 2.828).abs() < 1e-3);
    }

    #[test]
    fn first_pitch_has_only_its_own_derived_fields() {
        let scored = score_pair(PairedPitchRecord {
            current: located((0.5, 2.5), (0.25, 1.0)),
            previous: None,
        });
        assert_eq!(scored.plate_x_no_movement, Some(0.25));
        assert_eq!(scored.plate_z_no_movement, Some(1.5));
        assert!(scored.prev_plate_x_no_movement.is_none());
        assert!(scored.tunnel_distance.is_none());
        assert!(scored.actual_distance.is_none());
        assert!(scored.release_distance.is_none());
        assert!(scored.tunnel_score.is_none());
    }

    #[test]
    fn null_break_nulls_tunnel_but_not_actual_distance() {
        let a = located((0.0, 2.0), (0.0, 0.0));
        let mut b = located((1.0, 2.0), (0.5, 0.5));
        b.pfx_x = None;
        let scored = score_pair(pair(a, b));

        assert!(scored.plate_x_no_movement.is_none());
        assert!(scored.tunnel_distance.is_none());
        assert_eq!(scored.actual_distance, Some(1.0));
        assert!(scored.tunnel_score.is_none());
    }

    #[test]
    fn release_distance_uses_both_release_points() {
        let mut a = located((0.0, 2.0), (0.0, 0.0));
        a.release_pos_x = Some(-2.0);
        a.release_pos_z = Some(6.0);
        let mut b = located((1.0, 2.0), (0.5, 0.5));
        b.release_pos_x = Some(-2.0);
        b.release_pos_z = Some(5.5);
        let scored = score_pair(pair(a, b));

        assert!((scored.release_distance.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn release_distance_does_not_affect_score() {
        let a = located((0.0, 0.0), (0.0, 0.0));
        let b = located((2.0, 2.0), (2.0, 1.0));
        let without = score_pair(pair(a.clone(), b.clone()));

        let mut a2 = a;
        a2.release_pos_x = Some(1.0);
        a2.release_pos_z = Some(6.0);
        let mut b2 = b;
        b2.release_pos_x = Some(-3.0);
        b2.release_pos_z = Some(5.0);
        let with = score_pair(pair(a2, b2));

        assert!(without.release_distance.is_none());
        assert!(with.release_distance.is_some());
        assert_eq!(without.tunnel_score, with.tunnel_score);
    }

    #[test]
    fn tunnel_score_rejects_non_finite_ratios() {
        assert_eq!(tunnel_score(1.0, 0.0), None);
        assert_eq!(tunnel_score(0.0, 0.0), None);
        assert_eq!(tunnel_score(f64::NAN, 1.0), None);
        assert_eq!(tunnel_score(1.0, f64::MIN_POSITIVE / 1024.0), None);
        assert_eq!(tunnel_score(3.0, 2.0), Some(1.5));
    }

    #[test]
    fn score_all_preserves_order() {
        let a = located((0.0, 0.0), (0.0, 0.0));
        let b = located((2.0, 2.0), (2.0, 1.0));
        let scored = score_all(vec![
            PairedPitchRecord {
                current: a.clone(),
                previous: None,
            },
            pair(a, b.clone()),
        ]);
        assert_eq!(scored.len(), 2);
        assert!(scored[0].tunnel_score.is_none());
        assert_eq!(scored[1].paired.current, b);
    }
}

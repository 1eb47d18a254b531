// Pitch-level event records and plate geometry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// MLBAM player identifier (pitcher or batter).
pub type PlayerId = u32;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A location in the plane of home plate, in feet. `x` is horizontal from the
/// catcher's perspective, `z` is height above the ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Euclidean distance: `sqrt((x1-x2)^2 + (z1-z2)^2)`.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }
}

fn point(x: Option<f64>, z: Option<f64>) -> Option<Point> {
    Some(Point::new(x?, z?))
}

// ---------------------------------------------------------------------------
// PitchRecord
// ---------------------------------------------------------------------------

/// One pitch event as reported by statcast. Every field is nullable: a pitch
/// may be missing any measurement or bookkeeping column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchRecord {
    pub pitcher: Option<PlayerId>,
    pub batter: Option<PlayerId>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub inning: Option<u8>,
    /// "Top" or "Bot".
    pub inning_topbot: Option<String>,
    pub balls: Option<u8>,
    pub strikes: Option<u8>,
    pub outs_when_up: Option<u8>,
    pub at_bat_number: Option<u32>,
    pub pitch_number: Option<u32>,
    pub pitch_type: Option<String>,
    pub pitch_name: Option<String>,
    /// Free-text play description.
    pub des: Option<String>,
    pub plate_x: Option<f64>,
    pub plate_z: Option<f64>,
    /// Horizontal break, feet.
    pub pfx_x: Option<f64>,
    /// Vertical break, feet.
    pub pfx_z: Option<f64>,
    pub release_pos_x: Option<f64>,
    pub release_pos_z: Option<f64>,
    pub p_throws: Option<String>,
    pub stand: Option<String>,
}

impl PitchRecord {
    /// Where the pitch actually crossed the plate.
    pub fn plate_location(&self) -> Option<Point> {
        point(self.plate_x, self.plate_z)
    }

    /// Total break of the pitch relative to a straight-line path.
    pub fn movement(&self) -> Option<Point> {
        point(self.pfx_x, self.pfx_z)
    }

    /// Where the pitch would have crossed the plate with no break: the
    /// actual plate location minus the movement. This is the "tunnel point"
    /// a batter reads early in the pitch's flight.
    pub fn no_movement_location(&self) -> Option<Point> {
        let plate = self.plate_location()?;
        let movement = self.movement()?;
        Some(Point::new(plate.x - movement.x, plate.z - movement.z))
    }

    pub fn release_point(&self) -> Option<Point> {
        point(self.release_pos_x, self.release_pos_z)
    }

    /// Chronological ordering key within a day:
    /// (game_date, pitcher, at_bat_number, pitch_number). Nulls sort first.
    pub fn sequence_key(
        &self,
    ) -> (Option<NaiveDate>, Option<PlayerId>, Option<u32>, Option<u32>) {
        (
            self.game_date,
            self.pitcher,
            self.at_bat_number,
            self.pitch_number,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::error::ScorecardError;

// Home plate is 17" across and a regulation ball is ~2.87" in diameter. A
// pitch catches the plate if any part of the ball crosses it, so the
// horizontal limit extends one ball radius past each plate edge.
pub const PLATE_HALF_WIDTH_FT: f64 = 8.5 / 12.0;
pub const BALL_RADIUS_FT: f64 = 1.437 / 12.0;
pub const ZONE_HALF_WIDTH_FT: f64 = PLATE_HALF_WIDTH_FT + BALL_RADIUS_FT;

// Vertical bounds as fractions of batter height, matching the proportions
// Statcast adopts for sz_top/sz_bot.
pub const ZONE_TOP_FRAC: f64 = 0.5350;
pub const ZONE_BOT_FRAC: f64 = 0.2700;

/// Axis-aligned strike-zone rectangle in feet, centered on the plate.
/// Derived per pitch from batter height; carries no independent state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeZone {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl StrikeZone {
    pub fn for_batter(height_ft: f64) -> Result<Self, ScorecardError> {
        if !height_ft.is_finite() || height_ft <= 0.0 {
            return Err(ScorecardError::InvalidInput(format!(
                "batter height must be positive, got {height_ft}"
            )));
        }
        Ok(Self {
            left: -ZONE_HALF_WIDTH_FT,
            right: ZONE_HALF_WIDTH_FT,
            top: ZONE_TOP_FRAC * height_ft,
            bottom: ZONE_BOT_FRAC * height_ft,
        })
    }

    pub fn contains(&self, px: f64, pz: f64) -> bool {
        px >= self.left && px <= self.right && pz >= self.bottom && pz <= self.top
    }

    /// Distance from the crossing point to the nearest point on the zone
    /// boundary rectangle. Outside the zone this is the Euclidean distance
    /// to the rectangle, so a pitch a foot off the plate is never "near"
    /// the top or bottom edge no matter its height.
    pub fn edge_distance(&self, px: f64, pz: f64) -> f64 {
        let dx_out = (self.left - px).max(px - self.right).max(0.0);
        let dz_out = (self.bottom - pz).max(pz - self.top).max(0.0);
        if dx_out > 0.0 || dz_out > 0.0 {
            return (dx_out * dx_out + dz_out * dz_out).sqrt();
        }
        let dx_in = (px - self.left).min(self.right - px);
        let dz_in = (pz - self.bottom).min(self.top - pz);
        dx_in.min(dz_in)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.left + self.right) / 2.0,
            (self.bottom + self.top) / 2.0,
        )
    }
}

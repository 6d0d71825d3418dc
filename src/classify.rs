use crate::zone::StrikeZone;

// Margin of error for the Hawk-Eye pitch tracking system, around
// 0.625"-0.700" based off published tests.
pub const HAWKEYE_MARGIN_INCHES: f64 = 0.690;
pub const HAWKEYE_MARGIN_FT: f64 = HAWKEYE_MARGIN_INCHES / 12.0;

/// Geometric verdict for a taken pitch. `Borderline` means the crossing
/// point sits within the tracking margin of a zone edge, so either call
/// can be correct and the pitch is never scored as a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneVerdict {
    Ball,
    Strike,
    Borderline,
}

/// The umpire's actual call on a taken pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalledPitch {
    Ball,
    Strike,
}

impl CalledPitch {
    pub fn opposite(self) -> CalledPitch {
        match self {
            CalledPitch::Ball => CalledPitch::Strike,
            CalledPitch::Strike => CalledPitch::Ball,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CalledPitch::Ball => "ball",
            CalledPitch::Strike => "strike",
        }
    }
}

pub fn classify(px: f64, pz: f64, zone: &StrikeZone, margin_ft: f64) -> ZoneVerdict {
    if margin_ft > 0.0 && zone.edge_distance(px, pz) <= margin_ft {
        return ZoneVerdict::Borderline;
    }
    if zone.contains(px, pz) {
        ZoneVerdict::Strike
    } else {
        ZoneVerdict::Ball
    }
}

pub fn disagrees(verdict: ZoneVerdict, call: CalledPitch) -> bool {
    match verdict {
        ZoneVerdict::Borderline => false,
        ZoneVerdict::Strike => call == CalledPitch::Ball,
        ZoneVerdict::Ball => call == CalledPitch::Strike,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> StrikeZone {
        StrikeZone::for_batter(6.0).unwrap()
    }

    #[test]
    fn center_is_a_strike() {
        let z = zone();
        let (cx, cz) = z.center();
        assert_eq!(classify(cx, cz, &z, HAWKEYE_MARGIN_FT), ZoneVerdict::Strike);
    }

    #[test]
    fn far_outside_is_a_ball() {
        let z = zone();
        assert_eq!(classify(2.0, 1.0, &z, HAWKEYE_MARGIN_FT), ZoneVerdict::Ball);
    }

    #[test]
    fn near_edge_is_borderline_inside_and_out() {
        let z = zone();
        let cz = (z.top + z.bottom) / 2.0;
        let just_in = z.right - HAWKEYE_MARGIN_FT / 2.0;
        let just_out = z.right + HAWKEYE_MARGIN_FT / 2.0;
        assert_eq!(classify(just_in, cz, &z, HAWKEYE_MARGIN_FT), ZoneVerdict::Borderline);
        assert_eq!(classify(just_out, cz, &z, HAWKEYE_MARGIN_FT), ZoneVerdict::Borderline);
    }

    #[test]
    fn far_outside_at_edge_height_is_still_a_ball() {
        let z = zone();
        // A foot beyond the plate at exactly zone-top height: nowhere near
        // the boundary rectangle, so the band must not apply and a strike
        // call is a miss.
        let verdict = classify(2.0, z.top - 0.01, &z, HAWKEYE_MARGIN_FT);
        assert_eq!(verdict, ZoneVerdict::Ball);
        assert!(disagrees(verdict, CalledPitch::Strike));
    }

    #[test]
    fn borderline_never_disagrees() {
        assert!(!disagrees(ZoneVerdict::Borderline, CalledPitch::Ball));
        assert!(!disagrees(ZoneVerdict::Borderline, CalledPitch::Strike));
    }

    #[test]
    fn zero_margin_always_resolves() {
        let z = zone();
        let cz = (z.top + z.bottom) / 2.0;
        // Right on the edge: no margin means a hard ball/strike split.
        assert_eq!(classify(z.right, cz, &z, 0.0), ZoneVerdict::Strike);
        assert_eq!(classify(z.right + 1e-9, cz, &z, 0.0), ZoneVerdict::Ball);
    }

    #[test]
    fn strike_called_ball_disagrees() {
        assert!(disagrees(ZoneVerdict::Strike, CalledPitch::Ball));
        assert!(!disagrees(ZoneVerdict::Strike, CalledPitch::Strike));
        assert!(disagrees(ZoneVerdict::Ball, CalledPitch::Strike));
    }
}

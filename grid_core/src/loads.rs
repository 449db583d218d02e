//! # Load Estimator
//!
//! Rough factored load per member from its dimensions alone. This is a
//! readout for the editor, not a design check: there are no load paths,
//! tributary areas or code combinations here, just fixed unit weights and
//! a single dead/live factor pair.
//!
//! ## Formulas
//!
//! With `A = (width|breadth) x (height|depth)` in m² and a 3 m reference
//! member length:
//!
//! | Kind   | Dead (kN)               | Live (kN)        |
//! |--------|-------------------------|------------------|
//! | panel  | `A x 0.15 m x 25`       | `A x 2.5`        |
//! | column | `w x h x 3 m x 25`      | `A x 5`          |
//! | beam   | `w x depth x 3 m x 25`  | `w x 2.5`        |
//!
//! Factored load = `1.4 D + 1.6 L`, rounded to 0.01 kN. Absent fields
//! count as zero.
//!
//! ## Example
//!
//! ```rust
//! use grid_core::loads::estimate_load;
//! use grid_core::members::{MemberDimensions, MemberKind};
//!
//! let dims = MemberDimensions { width: Some(300.0), height: Some(300.0), ..Default::default() };
//! assert_eq!(estimate_load(MemberKind::Column, &dims), 10.17);
//! ```

use serde::{Deserialize, Serialize};

use crate::members::{MemberDimensions, MemberKind};
use crate::snapshot::{ElementRef, GridSnapshot};
use crate::units::{KiloNewtons, Meters, Millimeters};

/// Unit weight of reinforced concrete (kN/m³)
pub const CONCRETE_DENSITY_KN_M3: f64 = 25.0;

/// Assumed slab thickness (mm)
pub const SLAB_THICKNESS_MM: f64 = 150.0;

/// Reference length for column and beam self-weight (mm)
pub const REFERENCE_LENGTH_MM: f64 = 3000.0;

/// Dead load factor
pub const DEAD_LOAD_FACTOR: f64 = 1.4;

/// Live load factor
pub const LIVE_LOAD_FACTOR: f64 = 1.6;

/// Floor live load on slab panels (kN/m²)
const PANEL_LIVE_KN_M2: f64 = 2.5;

/// Live load carried by a column per m² of section (kN/m²)
const COLUMN_LIVE_KN_M2: f64 = 5.0;

/// Live load per meter of beam span (kN/m)
const BEAM_LIVE_KN_M: f64 = 2.5;

fn meters(mm: Option<f64>) -> f64 {
    Meters::from(Millimeters(mm.unwrap_or(0.0))).0
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Dead, live and factored load for one member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadBreakdown {
    /// Unfactored self-weight (kN)
    pub dead_kn: f64,
    /// Unfactored live load (kN)
    pub live_kn: f64,
    /// `1.4 D + 1.6 L`, rounded to 0.01 kN
    pub factored_kn: f64,
}

impl LoadBreakdown {
    pub fn factored(&self) -> KiloNewtons {
        KiloNewtons(self.factored_kn)
    }
}

/// Dead/live/factored breakdown for a member of `kind` with `dims`.
pub fn load_breakdown(kind: MemberKind, dims: &MemberDimensions) -> LoadBreakdown {
    let area_m2 = meters(dims.width.or(dims.breadth)) * meters(dims.height.or(dims.depth));
    let length_m = Meters::from(Millimeters(REFERENCE_LENGTH_MM)).0;

    let (dead_kn, live_kn) = match kind {
        MemberKind::Panel => {
            let thickness_m = Meters::from(Millimeters(SLAB_THICKNESS_MM)).0;
            let dead = area_m2 * thickness_m * CONCRETE_DENSITY_KN_M3;
            (dead, area_m2 * PANEL_LIVE_KN_M2)
        }
        MemberKind::Column => {
            let volume_m3 = meters(dims.width) * meters(dims.height) * length_m;
            (volume_m3 * CONCRETE_DENSITY_KN_M3, area_m2 * COLUMN_LIVE_KN_M2)
        }
        MemberKind::Beam => {
            // Self-weight over the reference length; breadth is not consulted.
            let volume_m3 = meters(dims.width) * meters(dims.depth) * length_m;
            (volume_m3 * CONCRETE_DENSITY_KN_M3, meters(dims.width) * BEAM_LIVE_KN_M)
        }
    };

    LoadBreakdown {
        dead_kn,
        live_kn,
        factored_kn: round_2dp(dead_kn * DEAD_LOAD_FACTOR + live_kn * LIVE_LOAD_FACTOR),
    }
}

/// Estimated factored load (kN, 2 decimals) for a member of `kind`.
pub fn estimate_load(kind: MemberKind, dims: &MemberDimensions) -> f64 {
    load_breakdown(kind, dims).factored_kn
}

/// One line of a [`LoadSchedule`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadEntry {
    pub element: ElementRef,
    pub load: LoadBreakdown,
}

/// Estimated load of every member in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSchedule {
    /// Panels, then beams, then columns; each in key order
    pub entries: Vec<LoadEntry>,
    pub panel_total_kn: f64,
    pub beam_total_kn: f64,
    pub column_total_kn: f64,
}

impl LoadSchedule {
    /// Sum of every member's factored load
    pub fn total_kn(&self) -> f64 {
        round_2dp(self.panel_total_kn + self.beam_total_kn + self.column_total_kn)
    }

    pub fn entries_of(&self, kind: MemberKind) -> impl Iterator<Item = &LoadEntry> {
        self.entries.iter().filter(move |e| e.element.kind() == kind)
    }
}

/// Build the load schedule for a snapshot.
pub fn load_schedule(snapshot: &GridSnapshot) -> LoadSchedule {
    let panels = snapshot
        .panel_dimensions
        .iter()
        .map(|(key, p)| (ElementRef::Panel(*key), MemberDimensions::from(p)));
    let beams = snapshot
        .beam_dimensions
        .iter()
        .map(|(key, b)| (ElementRef::Beam(*key), MemberDimensions::from(b)));
    let columns = snapshot
        .column_dimensions
        .iter()
        .map(|(key, c)| (ElementRef::Column(*key), MemberDimensions::from(c)));

    let entries: Vec<LoadEntry> = panels
        .chain(beams)
        .chain(columns)
        .map(|(element, dims)| LoadEntry {
            element,
            load: load_breakdown(element.kind(), &dims),
        })
        .collect();

    let total = |kind: MemberKind| {
        round_2dp(
            entries
                .iter()
                .filter(|e| e.element.kind() == kind)
                .map(|e| e.load.factored_kn)
                .sum(),
        )
    };

    LoadSchedule {
        panel_total_kn: total(MemberKind::Panel),
        beam_total_kn: total(MemberKind::Beam),
        column_total_kn: total(MemberKind::Column),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dims(
        width: Option<f64>,
        height: Option<f64>,
        depth: Option<f64>,
        breadth: Option<f64>,
    ) -> MemberDimensions {
        MemberDimensions { width, height, depth, breadth }
    }

    #[test]
    fn test_default_panel_load() {
        // A = 7.2 x 6.0 = 43.2 m²; D = 43.2 x 0.15 x 25 = 162; L = 43.2 x 2.5 = 108
        // 1.4 x 162 + 1.6 x 108 = 226.8 + 172.8 = 399.6
        let b = load_breakdown(MemberKind::Panel, &dims(Some(7200.0), Some(6000.0), None, None));
        assert_relative_eq!(b.dead_kn, 162.0, epsilon = 1e-9);
        assert_relative_eq!(b.live_kn, 108.0, epsilon = 1e-9);
        assert_relative_eq!(b.factored_kn, 399.6, epsilon = 1e-9);
    }

    #[test]
    fn test_default_column_load() {
        // V = 0.3 x 0.3 x 3 = 0.27; D = 6.75; L = 0.09 x 5 = 0.45
        let load = estimate_load(MemberKind::Column, &dims(Some(300.0), Some(300.0), None, None));
        assert_relative_eq!(load, 10.17, epsilon = 1e-9);
    }

    #[test]
    fn test_beam_ignores_breadth() {
        // V = 7.2 x 0.5 x 3 = 10.8; D = 270; L = 7.2 x 2.5 = 18
        let beam = |breadth| dims(Some(7200.0), None, Some(500.0), Some(breadth));
        let narrow = estimate_load(MemberKind::Beam, &beam(200.0));
        let wide = estimate_load(MemberKind::Beam, &beam(600.0));
        assert_relative_eq!(narrow, 406.8, epsilon = 1e-9);
        assert_eq!(narrow, wide);
    }

    #[test]
    fn test_area_falls_back_to_breadth_and_depth() {
        // Panel with breadth/depth instead of width/height
        let load = estimate_load(MemberKind::Panel, &dims(None, None, Some(6000.0), Some(7200.0)));
        assert_relative_eq!(load, 399.6, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_dimensions_are_zero() {
        for kind in MemberKind::ALL {
            assert_eq!(estimate_load(kind, &MemberDimensions::default()), 0.0);
        }
        // Column with only width: no volume, no area
        assert_eq!(estimate_load(MemberKind::Column, &dims(Some(300.0), None, None, None)), 0.0);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        let load = estimate_load(MemberKind::Column, &dims(Some(333.0), Some(333.0), None, None));
        assert_eq!(load, (load * 100.0).round() / 100.0);
    }

    #[test]
    fn test_schedule_for_default_grid() {
        let schedule = load_schedule(&GridSnapshot::new());
        assert_eq!(schedule.entries.len(), 9 + 9 + 4);
        assert_relative_eq!(schedule.panel_total_kn, 9.0 * 399.6, epsilon = 1e-6);
        assert_relative_eq!(schedule.column_total_kn, 9.0 * 10.17, epsilon = 1e-6);
        assert_relative_eq!(schedule.beam_total_kn, 4.0 * 406.8, epsilon = 1e-6);
        assert_relative_eq!(schedule.total_kn(), 3596.4 + 91.53 + 1627.2, epsilon = 1e-6);
        assert_eq!(schedule.entries_of(MemberKind::Beam).count(), 4);
        assert_eq!(schedule.entries[0].element.kind(), MemberKind::Panel);
    }
}

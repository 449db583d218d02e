//! # Unit Types
//!
//! Lightweight newtype wrappers for the handful of units the grid model
//! works in. JSON stays clean (`#[serde(transparent)]` serializes to a bare
//! number) and conversions are explicit `From` impls.
//!
//! ## SI Units
//!
//! - Member dimensions are stored in millimeters (mm)
//! - Load arithmetic runs in meters (m) and kilonewtons (kN)
//! - Column rotation is stored in degrees
//!
//! ## Example
//!
//! ```rust
//! use grid_core::units::{Meters, Millimeters};
//!
//! let span = Millimeters(7200.0);
//! let span_m: Meters = span.into();
//! assert_eq!(span_m.0, 7.2);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

// ============================================================================
// Force Units
// ============================================================================

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

impl std::fmt::Display for KiloNewtons {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kN", self.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(KiloNewtons);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millimeters_to_meters() {
        let m: Meters = Millimeters(300.0).into();
        assert_eq!(m.0, 0.3);
        let back: Millimeters = m.into();
        assert_eq!(back.0, 300.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = KiloNewtons(10.0);
        let b = KiloNewtons(2.5);
        assert_eq!((a + b).0, 12.5);
        assert_eq!((a - b).0, 7.5);
        assert_eq!((a * 1.4).0, 14.0);
        assert_eq!((a / 4.0).value(), 2.5);
    }

    #[test]
    fn test_kilonewton_display() {
        assert_eq!(KiloNewtons(10.166).to_string(), "10.17 kN");
    }

    #[test]
    fn test_serialization() {
        let mm = Millimeters(7200.0);
        let json = serde_json::to_string(&mm).unwrap();
        assert_eq!(json, "7200.0");

        let roundtrip: Millimeters = serde_json::from_str(&json).unwrap();
        assert_eq!(mm, roundtrip);
    }
}

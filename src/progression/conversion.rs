//! Points to Doubloons Conversion
//!
//! A swap burns Pirate Points and yields Doubloons minus a fee that goes to
//! the treasury. The fee is rounded up, and `doubloons_received + fee`
//! always equals the points spent.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

const BASIS_POINTS_PER_UNIT: i64 = 10_000;

/// Slack for binary representation error when reading a fraction
const FRACTION_TOLERANCE: f64 = 1e-6;

/// Fee rate held in basis points so rounding stays exact.
/// Always within `0..=10_000`, so a fee never exceeds the amount converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FeeRate {
    basis_points: u32,
}

/// Fixed conversion fee, 2%
pub const CONVERSION_FEE: FeeRate = FeeRate::checked(200);

impl FeeRate {
    const fn checked(basis_points: u32) -> Self {
        assert!(basis_points as i64 <= BASIS_POINTS_PER_UNIT);
        Self { basis_points }
    }

    /// Build from whole basis points; must lie in `0..=10_000`
    pub fn from_basis_points(basis_points: u32) -> LedgerResult<Self> {
        if basis_points as i64 > BASIS_POINTS_PER_UNIT {
            return Err(LedgerError::invalid_input(format!(
                "fee rate must be within 0..=10000 basis points, got {}",
                basis_points
            )));
        }
        Ok(Self { basis_points })
    }

    /// Build from a fraction such as `0.02`; must lie in `0.0..=1.0` and
    /// be a whole number of basis points
    pub fn from_fraction(rate: f64) -> LedgerResult<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(LedgerError::invalid_input(format!(
                "fee rate must be within 0..=1, got {}",
                rate
            )));
        }

        let scaled = rate * BASIS_POINTS_PER_UNIT as f64;
        let basis_points = scaled.round();
        if (scaled - basis_points).abs() > FRACTION_TOLERANCE {
            return Err(LedgerError::invalid_input(format!(
                "fee rate {} is finer than one basis point",
                rate
            )));
        }

        Self::from_basis_points(basis_points as u32)
    }

    pub fn basis_points(&self) -> u32 {
        self.basis_points
    }

    pub fn as_fraction(&self) -> f64 {
        self.basis_points as f64 / BASIS_POINTS_PER_UNIT as f64
    }

    /// `ceil(amount * rate)` in integer arithmetic
    pub fn fee_for(&self, amount: i64) -> i64 {
        let scaled = amount as i128 * self.basis_points as i128;
        let units = BASIS_POINTS_PER_UNIT as i128;
        ((scaled + units - 1) / units) as i64
    }
}

impl TryFrom<u32> for FeeRate {
    type Error = LedgerError;

    fn try_from(basis_points: u32) -> LedgerResult<Self> {
        Self::from_basis_points(basis_points)
    }
}

impl From<FeeRate> for u32 {
    fn from(rate: FeeRate) -> u32 {
        rate.basis_points
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        CONVERSION_FEE
    }
}

/// Outcome of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReceipt {
    pub points_spent: i64,
    pub doubloons_received: i64,
    /// Accrues to the treasury
    pub fee: i64,
}

/// Split `points_to_convert` into doubloons and fee, checking the balance
pub fn convert(
    points: i64,
    points_to_convert: i64,
    fee_rate: FeeRate,
) -> LedgerResult<ConversionReceipt> {
    if points < 0 {
        return Err(LedgerError::invalid_input(format!(
            "points must be non-negative, got {}",
            points
        )));
    }
    if points_to_convert <= 0 {
        return Err(LedgerError::invalid_input(format!(
            "amount to convert must be positive, got {}",
            points_to_convert
        )));
    }
    if points_to_convert > points {
        return Err(LedgerError::InsufficientBalance {
            requested: points_to_convert,
            available: points,
        });
    }

    let fee = fee_rate.fee_for(points_to_convert);

    Ok(ConversionReceipt {
        points_spent: points_to_convert,
        doubloons_received: points_to_convert - fee,
        fee,
    })
}

//! Funds conservation invariant checker.
//!
//! Accounting invariant enforced after every custody mutation:
//! ```text
//! ∀ listing: pot == Σ(inflows) - Σ(disbursements)
//! ```
//!
//! If this invariant ever breaks, the engine surfaces a critical error
//! instead of moving money. This is the ultimate safety net — a violation
//! means custody accounting has gone catastrophically wrong.

use std::collections::HashMap;

use deedflow_types::{AssetId, DeedflowError, Result};
use rust_decimal::Decimal;

/// Tracks per-listing inflow and disbursement totals and validates that the
/// custody pot always equals their difference.
#[derive(Debug, Default)]
pub struct FundsConservation {
    /// Total contributions per listing since the engine started.
    inflows: HashMap<AssetId, Decimal>,
    /// Total disbursements per listing since the engine started.
    disbursed: HashMap<AssetId, Decimal>,
}

impl FundsConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a custody inflow for a listing.
    pub fn record_inflow(&mut self, asset: AssetId, amount: Decimal) {
        *self.inflows.entry(asset).or_insert(Decimal::ZERO) += amount;
    }

    /// Record a disbursement out of a listing's pot.
    pub fn record_disbursement(&mut self, asset: AssetId, amount: Decimal) {
        *self.disbursed.entry(asset).or_insert(Decimal::ZERO) += amount;
    }

    /// Expected pot for a listing: inflows - disbursements.
    #[must_use]
    pub fn expected_pot(&self, asset: AssetId) -> Decimal {
        let inflow = self.inflows.get(&asset).copied().unwrap_or(Decimal::ZERO);
        let out = self.disbursed.get(&asset).copied().unwrap_or(Decimal::ZERO);
        inflow - out
    }

    /// Verify that the actual pot matches the expected pot for a listing.
    ///
    /// # Errors
    /// Returns [`DeedflowError::ConservationViolation`] if actual ≠ expected.
    pub fn verify(&self, asset: AssetId, actual_pot: Decimal) -> Result<()> {
        let expected = self.expected_pot(asset);
        if actual_pot != expected {
            return Err(DeedflowError::ConservationViolation {
                reason: format!(
                    "{asset}: actual pot {actual_pot} != expected {expected} \
                     (inflows={}, disbursed={})",
                    self.inflows.get(&asset).copied().unwrap_or(Decimal::ZERO),
                    self.disbursed.get(&asset).copied().unwrap_or(Decimal::ZERO),
                ),
            });
        }
        Ok(())
    }

    /// Total inflows for a listing.
    #[must_use]
    pub fn total_inflows(&self, asset: AssetId) -> Decimal {
        self.inflows.get(&asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total disbursements for a listing.
    #[must_use]
    pub fn total_disbursed(&self, asset: AssetId) -> Decimal {
        self.disbursed.get(&asset).copied().unwrap_or(Decimal::ZERO)
    }
}

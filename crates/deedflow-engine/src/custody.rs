//! Custody vault — the only place escrowed money lives.
//!
//! Funds are keyed **per listing**, not pooled across listings: a disbursement
//! for one sale can never touch funds contributed for another. `total_held()`
//! still reports the pooled view so single-listing observers see the same
//! numbers a pooled balance would show.
//!
//! All mutations are atomic: either the full operation succeeds or the vault
//! is unchanged.

use std::collections::HashMap;

use deedflow_types::{AssetId, DeedflowError, PartyId, Result};
use rust_decimal::Decimal;

use crate::conservation::FundsConservation;

/// Per-listing fund custody with a payout ledger.
///
/// The vault is the source of truth for all fund state. Only two call paths
/// mutate it: contributions (earnest deposits, lender funding) and
/// disbursements (finalize, cancel).
#[derive(Debug, Default)]
pub struct CustodyVault {
    /// Escrowed funds per listing.
    pots: HashMap<AssetId, Decimal>,
    /// Cumulative funds disbursed to each party.
    payouts: HashMap<PartyId, Decimal>,
    /// Accounting invariant tracker.
    conservation: FundsConservation,
}

impl CustodyVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a listing's pot.
    ///
    /// # Errors
    /// Returns [`DeedflowError::NonPositiveAmount`] for zero or negative
    /// contributions; the vault is unchanged.
    pub fn contribute(&mut self, asset: AssetId, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(DeedflowError::NonPositiveAmount(amount));
        }
        *self.pots.entry(asset).or_insert(Decimal::ZERO) += amount;
        self.conservation.record_inflow(asset, amount);
        self.verify(asset)
    }

    /// Funds currently held for a listing.
    #[must_use]
    pub fn held(&self, asset: AssetId) -> Decimal {
        self.pots.get(&asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total funds held across all listings (the pooled view).
    #[must_use]
    pub fn total_held(&self) -> Decimal {
        self.pots.values().copied().sum()
    }

    /// Move a listing's entire pot to `recipient`'s payout ledger.
    /// Returns the amount disbursed (zero for an empty pot).
    ///
    /// # Errors
    /// Returns [`DeedflowError::ConservationViolation`] if accounting no
    /// longer balances afterwards.
    pub fn disburse_all(&mut self, asset: AssetId, recipient: PartyId) -> Result<Decimal> {
        let amount = self.pots.remove(&asset).unwrap_or(Decimal::ZERO);
        if amount > Decimal::ZERO {
            *self.payouts.entry(recipient).or_insert(Decimal::ZERO) += amount;
            self.conservation.record_disbursement(asset, amount);
        }
        self.verify(asset)?;
        Ok(amount)
    }

    /// Cumulative funds disbursed to a party.
    #[must_use]
    pub fn payout_of(&self, party: PartyId) -> Decimal {
        self.payouts.get(&party).copied().unwrap_or(Decimal::ZERO)
    }

    /// Check the conservation invariant for one listing.
    pub fn verify(&self, asset: AssetId) -> Result<()> {
        self.conservation.verify(asset, self.held(asset))
    }

    /// Access the conservation tracker.
    #[must_use]
    pub fn conservation(&self) -> &FundsConservation {
        &self.conservation
    }
}

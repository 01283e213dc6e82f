//! The escrow settlement engine.
//!
//! `EscrowEngine` owns the listing table, the custody vault, and the registry
//! collaborator, and exposes the full role-gated call surface. Every mutating
//! operation takes an explicit `caller` identity and authorizes it first;
//! every failure is an atomic rejection with no partial state change.
//!
//! Finalize ordering is the atomicity guarantee: the fallible registry
//! transfer runs before any balance or status mutation, so a rejected
//! ownership transfer leaves the sale open and the pot intact.

use std::collections::HashMap;

use deedflow_registry::PropertyRegistry;
use deedflow_types::{
    ApprovalParty, AssetId, DeedflowError, Disbursement, DisbursementReceipt, InspectionVerdict,
    Listing, OpenPhase, PartyId, Result, Role, RoleSet, SettlementGate,
};
use rust_decimal::Decimal;

use crate::custody::CustodyVault;

/// Orchestrator for role-gated property-sale settlement.
pub struct EscrowEngine<R: PropertyRegistry> {
    /// The three fixed counterparties.
    roles: RoleSet,
    /// The title registry this engine settles against.
    registry: R,
    /// The engine's own identity, used as registry transfer operator.
    operator: PartyId,
    /// One listing per asset under sale.
    listings: HashMap<AssetId, Listing>,
    /// All escrowed funds.
    vault: CustodyVault,
    /// Monotonic disbursement sequence for receipt IDs.
    receipt_seq: u64,
}

impl<R: PropertyRegistry> EscrowEngine<R> {
    /// Create an engine over a registry with the given fixed roles.
    #[must_use]
    pub fn new(roles: RoleSet, registry: R) -> Self {
        Self {
            roles,
            registry,
            operator: PartyId::new(),
            listings: HashMap::new(),
            vault: CustodyVault::new(),
            receipt_seq: 0,
        }
    }

    // =====================================================================
    // Listing Registry
    // =====================================================================

    /// Put an asset up for sale. Seller only.
    ///
    /// Overwrites a terminal (settled or canceled) listing with a fresh one;
    /// rejects if an open listing already exists. Registry transfer approval
    /// is a precondition enforced only at the eventual `transfer_from`.
    ///
    /// # Errors
    /// - [`DeedflowError::Unauthorized`] if `caller` is not the seller
    /// - [`DeedflowError::ListingAlreadyActive`] if the asset has an open listing
    /// - [`DeedflowError::EscrowExceedsPurchase`] if `escrow_price > purchase_price`
    pub fn list(
        &mut self,
        caller: PartyId,
        asset: AssetId,
        escrow_price: Decimal,
        purchase_price: Decimal,
        buyer: PartyId,
    ) -> Result<()> {
        self.roles.require(caller, Role::Seller)?;
        if let Some(existing) = self.listings.get(&asset) {
            if existing.is_open() {
                return Err(DeedflowError::ListingAlreadyActive(asset));
            }
        }
        let listing = Listing::new(asset, escrow_price, purchase_price, buyer)?;
        self.listings.insert(asset, listing);
        tracing::info!(
            asset = %asset,
            escrow = %escrow_price,
            purchase = %purchase_price,
            buyer = %buyer,
            "asset listed for sale"
        );
        Ok(())
    }

    // =====================================================================
    // Deposit Custody
    // =====================================================================

    /// Deposit earnest money. The listing's buyer only.
    ///
    /// The full attached amount is credited to the listing's custody pot;
    /// repeat deposits accumulate.
    ///
    /// # Errors
    /// - [`DeedflowError::InvalidListing`] if the asset was never listed
    /// - [`DeedflowError::Unauthorized`] if `caller` is not the buyer
    /// - [`DeedflowError::AlreadySettled`] on a terminal listing
    /// - [`DeedflowError::InsufficientFunds`] if `amount < escrow_price`
    pub fn deposit_earnest(
        &mut self,
        caller: PartyId,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<()> {
        let listing = self.listing(asset)?;
        if caller != listing.buyer {
            return Err(DeedflowError::Unauthorized {
                required: Role::Buyer,
                caller,
            });
        }
        listing.ensure_open()?;
        if amount < listing.escrow_price {
            return Err(DeedflowError::InsufficientFunds {
                needed: listing.escrow_price,
                supplied: amount,
            });
        }
        self.vault.contribute(asset, amount)?;
        tracing::info!(asset = %asset, amount = %amount, "earnest deposit received");
        Ok(())
    }

    /// Credit the purchase-price remainder into custody. Lender only.
    ///
    /// # Errors
    /// - [`DeedflowError::Unauthorized`] if `caller` is not the lender
    /// - [`DeedflowError::InvalidListing`] / [`DeedflowError::AlreadySettled`]
    /// - [`DeedflowError::NonPositiveAmount`] for a zero or negative amount
    pub fn fund_settlement(
        &mut self,
        caller: PartyId,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<()> {
        self.roles.require(caller, Role::Lender)?;
        self.listing(asset)?.ensure_open()?;
        self.vault.contribute(asset, amount)?;
        tracing::info!(asset = %asset, amount = %amount, "lender funding received");
        Ok(())
    }

    // =====================================================================
    // Inspection Gate
    // =====================================================================

    /// Record the inspection verdict. Inspector only.
    ///
    /// Callable regardless of deposit state; later calls overwrite earlier
    /// verdicts. Cross-stage ordering is enforced at settlement.
    ///
    /// # Errors
    /// - [`DeedflowError::Unauthorized`] if `caller` is not the inspector
    /// - [`DeedflowError::InvalidListing`] / [`DeedflowError::AlreadySettled`]
    pub fn record_inspection(
        &mut self,
        caller: PartyId,
        asset: AssetId,
        passed: bool,
    ) -> Result<()> {
        self.roles.require(caller, Role::Inspector)?;
        let listing = self.listing_mut(asset)?;
        listing.ensure_open()?;
        listing.verdict = InspectionVerdict::from_passed(passed);
        tracing::info!(asset = %asset, verdict = %listing.verdict, "inspection recorded");
        Ok(())
    }

    // =====================================================================
    // Approval Quorum
    // =====================================================================

    /// Record a settlement vote. The listing's buyer, the seller, or the
    /// lender only.
    ///
    /// Requires a passed inspection. A `false` vote is recorded, not
    /// rejected — it is a valid state that blocks finalize. Re-voting
    /// overwrites.
    ///
    /// # Errors
    /// - [`DeedflowError::InvalidListing`] / [`DeedflowError::AlreadySettled`]
    /// - [`DeedflowError::NotACounterparty`] for any other caller
    /// - [`DeedflowError::PreconditionNotMet`] (`INSPECTION`) unless the
    ///   verdict is `Passed`
    pub fn approve_sale(&mut self, caller: PartyId, asset: AssetId, vote: bool) -> Result<()> {
        let party = {
            let listing = self.listing(asset)?;
            // The buyer is resolved per listing; seller and lender are fixed.
            if caller == listing.buyer {
                ApprovalParty::Buyer
            } else if caller == self.roles.seller() {
                ApprovalParty::Seller
            } else if caller == self.roles.lender() {
                ApprovalParty::Lender
            } else {
                return Err(DeedflowError::NotACounterparty { asset, caller });
            }
        };
        let listing = self.listing_mut(asset)?;
        listing.ensure_open()?;
        if !listing.verdict.is_passed() {
            return Err(DeedflowError::PreconditionNotMet(SettlementGate::Inspection));
        }
        listing.approvals.record(party, vote);
        tracing::info!(asset = %asset, party = %party, vote, "sale approval recorded");
        Ok(())
    }

    // =====================================================================
    // Settlement Engine
    // =====================================================================

    /// Finalize the sale. Seller only.
    ///
    /// Validates every gate, transfers deed ownership seller → buyer through
    /// the registry, disburses the full pot to the seller, and marks the
    /// listing SETTLED — in that order, so a registry rejection changes
    /// nothing.
    ///
    /// # Errors
    /// - [`DeedflowError::Unauthorized`] if `caller` is not the seller
    /// - [`DeedflowError::InvalidListing`] / [`DeedflowError::AlreadySettled`]
    /// - [`DeedflowError::PreconditionNotMet`] naming the first unmet gate
    /// - any registry error from the ownership transfer
    pub fn finalize_sale(
        &mut self,
        caller: PartyId,
        asset: AssetId,
    ) -> Result<DisbursementReceipt> {
        self.roles.require(caller, Role::Seller)?;
        let buyer = {
            let listing = self.listing(asset)?;
            listing.ensure_open()?;
            if let Err(err) = Self::check_gates(listing, self.vault.held(asset)) {
                tracing::warn!(asset = %asset, %err, "finalize rejected");
                return Err(err);
            }
            listing.buyer
        };

        // Fallible external call first; nothing below it can fail short of a
        // conservation violation, which halts settlement anyway.
        self.registry
            .transfer_from(self.operator, self.roles.seller(), buyer, asset)?;

        let amount = self.vault.disburse_all(asset, self.roles.seller())?;
        self.listing_mut(asset)?.mark_settled()?;
        let seller = self.roles.seller();
        let receipt = self.issue_receipt(asset, Disbursement::SellerProceeds, seller, amount);
        tracing::info!(
            asset = %asset,
            amount = %amount,
            buyer = %buyer,
            receipt = %receipt.id,
            "sale finalized; proceeds disbursed to seller"
        );
        Ok(receipt)
    }

    /// Cancel the sale. Seller only.
    ///
    /// Disbursement follows the verdict at cancellation time: a passed
    /// inspection sends the pot to the seller; a failed — or never
    /// recorded — inspection refunds the buyer. The listing becomes
    /// terminal either way.
    ///
    /// # Errors
    /// - [`DeedflowError::Unauthorized`] if `caller` is not the seller
    /// - [`DeedflowError::InvalidListing`] / [`DeedflowError::AlreadySettled`]
    pub fn cancel_sale(&mut self, caller: PartyId, asset: AssetId) -> Result<DisbursementReceipt> {
        self.roles.require(caller, Role::Seller)?;
        let (buyer, verdict) = {
            let listing = self.listing(asset)?;
            listing.ensure_open()?;
            (listing.buyer, listing.verdict)
        };

        let (direction, recipient) = if verdict.is_passed() {
            (Disbursement::SellerProceeds, self.roles.seller())
        } else {
            (Disbursement::BuyerRefund, buyer)
        };

        let amount = self.vault.disburse_all(asset, recipient)?;
        self.listing_mut(asset)?.mark_canceled()?;
        let receipt = self.issue_receipt(asset, direction, recipient, amount);
        tracing::info!(
            asset = %asset,
            amount = %amount,
            direction = %direction,
            receipt = %receipt.id,
            "sale canceled; pot disbursed"
        );
        Ok(receipt)
    }

    /// All finalize gates, in the order they are reported.
    fn check_gates(listing: &Listing, held: Decimal) -> Result<()> {
        if !listing.verdict.is_passed() {
            return Err(DeedflowError::PreconditionNotMet(SettlementGate::Inspection));
        }
        for party in [
            ApprovalParty::Buyer,
            ApprovalParty::Seller,
            ApprovalParty::Lender,
        ] {
            if !listing.approvals.vote(party) {
                return Err(DeedflowError::PreconditionNotMet(party.gate()));
            }
        }
        if held < listing.purchase_price {
            return Err(DeedflowError::PreconditionNotMet(SettlementGate::Funding));
        }
        Ok(())
    }

    fn issue_receipt(
        &mut self,
        asset: AssetId,
        direction: Disbursement,
        recipient: PartyId,
        amount: Decimal,
    ) -> DisbursementReceipt {
        let receipt =
            DisbursementReceipt::issue(asset, direction, recipient, amount, self.receipt_seq);
        self.receipt_seq += 1;
        receipt
    }

    fn listing(&self, asset: AssetId) -> Result<&Listing> {
        self.listings
            .get(&asset)
            .ok_or(DeedflowError::InvalidListing(asset))
    }

    fn listing_mut(&mut self, asset: AssetId) -> Result<&mut Listing> {
        self.listings
            .get_mut(&asset)
            .ok_or(DeedflowError::InvalidListing(asset))
    }

    // =====================================================================
    // Read-only accessors (unrestricted)
    // =====================================================================

    /// Whether the asset currently has an open listing.
    #[must_use]
    pub fn is_listed(&self, asset: AssetId) -> bool {
        self.listings.get(&asset).is_some_and(Listing::is_open)
    }

    #[must_use]
    pub fn escrow_price(&self, asset: AssetId) -> Option<Decimal> {
        self.listings.get(&asset).map(|l| l.escrow_price)
    }

    #[must_use]
    pub fn purchase_price(&self, asset: AssetId) -> Option<Decimal> {
        self.listings.get(&asset).map(|l| l.purchase_price)
    }

    #[must_use]
    pub fn buyer_of(&self, asset: AssetId) -> Option<PartyId> {
        self.listings.get(&asset).map(|l| l.buyer)
    }

    #[must_use]
    pub fn inspection_passed(&self, asset: AssetId) -> bool {
        self.listings
            .get(&asset)
            .is_some_and(|l| l.verdict.is_passed())
    }

    /// A party's recorded vote; `false` for anyone who never voted or is
    /// not a counterparty.
    #[must_use]
    pub fn approval_of(&self, asset: AssetId, party: PartyId) -> bool {
        self.listings.get(&asset).is_some_and(|l| {
            if party == l.buyer {
                l.approvals.vote(ApprovalParty::Buyer)
            } else if party == self.roles.seller() {
                l.approvals.vote(ApprovalParty::Seller)
            } else if party == self.roles.lender() {
                l.approvals.vote(ApprovalParty::Lender)
            } else {
                false
            }
        })
    }

    #[must_use]
    pub fn is_canceled(&self, asset: AssetId) -> bool {
        self.listings.get(&asset).is_some_and(Listing::is_canceled)
    }

    /// Derived open substate, if the asset is listed.
    #[must_use]
    pub fn phase_of(&self, asset: AssetId) -> Option<OpenPhase> {
        self.listings
            .get(&asset)
            .map(|l| l.phase(self.vault.held(asset)))
    }

    /// Total custodial balance across all listings.
    #[must_use]
    pub fn get_balance(&self) -> Decimal {
        self.vault.total_held()
    }

    /// Funds held for one listing.
    #[must_use]
    pub fn held(&self, asset: AssetId) -> Decimal {
        self.vault.held(asset)
    }

    /// Cumulative funds disbursed to a party.
    #[must_use]
    pub fn payout_of(&self, party: PartyId) -> Decimal {
        self.vault.payout_of(party)
    }

    #[must_use]
    pub fn listing_of(&self, asset: AssetId) -> Option<&Listing> {
        self.listings.get(&asset)
    }

    #[must_use]
    pub fn seller(&self) -> PartyId {
        self.roles.seller()
    }

    #[must_use]
    pub fn inspector(&self) -> PartyId {
        self.roles.inspector()
    }

    #[must_use]
    pub fn lender(&self) -> PartyId {
        self.roles.lender()
    }

    /// The identity this engine uses as registry transfer operator. The
    /// seller must `approve` it before finalize can move the deed.
    #[must_use]
    pub fn operator_id(&self) -> PartyId {
        self.operator
    }

    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    #[must_use]
    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }
}

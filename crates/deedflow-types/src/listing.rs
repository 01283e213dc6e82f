//! # Listing — the per-asset sale record and its state machine
//!
//! One `Listing` exists per deed under sale. Its lifecycle:
//!
//! ```text
//!   ┌──────────────────────────────┐  finalize   ┌─────────┐
//!   │ OPEN                         ├────────────▶│ SETTLED │
//!   │ (Listed → Deposited →        │             └─────────┘
//!   │  Inspected → Approved)       │  cancel     ┌──────────┐
//!   │                              ├────────────▶│ CANCELED │
//!   └──────────────────────────────┘             └──────────┘
//! ```
//!
//! The open substates are *derived* from the custody pot, the inspection
//! verdict, and the approval ledger; only the terminal states are stored.
//! Terminal transitions are monotonic: once SETTLED or CANCELED, a listing
//! never reopens, which is what makes double disbursement unrepresentable.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetId, DeedflowError, PartyId, Result};

/// The inspector's recorded verdict for a listing.
///
/// `Pending` means no verdict has ever been recorded — distinct from an
/// explicit `Failed`, although both block approval and settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InspectionVerdict {
    /// The inspector has not reported yet.
    Pending,
    /// Inspection passed. Approvals and settlement become possible.
    Passed,
    /// Inspection failed. Approvals and settlement are blocked.
    Failed,
}

impl InspectionVerdict {
    #[must_use]
    pub fn from_passed(passed: bool) -> Self {
        if passed { Self::Passed } else { Self::Failed }
    }

    #[must_use]
    pub fn is_passed(&self) -> bool {
        *self == Self::Passed
    }
}

impl fmt::Display for InspectionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Stored lifecycle state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleStatus {
    /// The sale is in progress; mutating operations are accepted.
    Open,
    /// Finalized. Funds disbursed to the seller, deed transferred.
    /// **Irreversible.**
    Settled,
    /// Canceled. Funds disbursed per the verdict at cancellation time.
    /// **Irreversible.**
    Canceled,
}

impl SaleStatus {
    /// Can this listing transition to the given terminal state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Settled | Self::Canceled))
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// Derived substate of an open listing, for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenPhase {
    /// Listed; earnest deposit outstanding.
    Listed,
    /// Earnest deposit received.
    Deposited,
    /// Inspection passed.
    Inspected,
    /// All three approvals recorded. Ready to finalize once funded.
    Approved,
}

impl fmt::Display for OpenPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listed => write!(f, "LISTED"),
            Self::Deposited => write!(f, "DEPOSITED"),
            Self::Inspected => write!(f, "INSPECTED"),
            Self::Approved => write!(f, "APPROVED"),
        }
    }
}

/// A settlement gate that can block `finalize_sale`, named so callers and
/// tests can assert on the exact unmet precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementGate {
    Inspection,
    BuyerApproval,
    SellerApproval,
    LenderApproval,
    /// Custody pot below the purchase price.
    Funding,
}

impl fmt::Display for SettlementGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inspection => write!(f, "INSPECTION"),
            Self::BuyerApproval => write!(f, "BUYER_APPROVAL"),
            Self::SellerApproval => write!(f, "SELLER_APPROVAL"),
            Self::LenderApproval => write!(f, "LENDER_APPROVAL"),
            Self::Funding => write!(f, "FUNDING"),
        }
    }
}

/// One of the three parties whose approval gates settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalParty {
    Buyer,
    Seller,
    Lender,
}

impl ApprovalParty {
    /// The settlement gate this party's approval controls.
    #[must_use]
    pub fn gate(&self) -> SettlementGate {
        match self {
            Self::Buyer => SettlementGate::BuyerApproval,
            Self::Seller => SettlementGate::SellerApproval,
            Self::Lender => SettlementGate::LenderApproval,
        }
    }
}

impl fmt::Display for ApprovalParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => write!(f, "BUYER"),
            Self::Seller => write!(f, "SELLER"),
            Self::Lender => write!(f, "LENDER"),
        }
    }
}

/// Per-listing approval votes.
///
/// Exactly three slots exist — buyer, seller, lender — so a vote from any
/// other identity is unrepresentable, not merely rejected. All slots start
/// `false`; re-voting overwrites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalLedger {
    buyer: bool,
    seller: bool,
    lender: bool,
}

impl ApprovalLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote. A `false` vote is a valid state that blocks finalize.
    pub fn record(&mut self, party: ApprovalParty, vote: bool) {
        match party {
            ApprovalParty::Buyer => self.buyer = vote,
            ApprovalParty::Seller => self.seller = vote,
            ApprovalParty::Lender => self.lender = vote,
        }
    }

    #[must_use]
    pub fn vote(&self, party: ApprovalParty) -> bool {
        match party {
            ApprovalParty::Buyer => self.buyer,
            ApprovalParty::Seller => self.seller,
            ApprovalParty::Lender => self.lender,
        }
    }

    /// All three parties have voted yes.
    #[must_use]
    pub fn fully_approved(&self) -> bool {
        self.buyer && self.seller && self.lender
    }

    /// The first party whose approval is missing, in gate order.
    #[must_use]
    pub fn first_missing(&self) -> Option<ApprovalParty> {
        if !self.buyer {
            Some(ApprovalParty::Buyer)
        } else if !self.seller {
            Some(ApprovalParty::Seller)
        } else if !self.lender {
            Some(ApprovalParty::Lender)
        } else {
            None
        }
    }
}

/// The per-asset sale record.
///
/// Only the engine mutates `verdict`, `approvals`, and `status`; callers act
/// through role-gated engine operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// The deed under sale.
    pub asset: AssetId,
    /// Earnest deposit required from the buyer. Never exceeds `purchase_price`.
    pub escrow_price: Decimal,
    /// Total sale price.
    pub purchase_price: Decimal,
    /// The buyer recorded for this listing.
    pub buyer: PartyId,
    /// The inspector's verdict.
    pub verdict: InspectionVerdict,
    /// Buyer / seller / lender votes.
    pub approvals: ApprovalLedger,
    /// Stored lifecycle state.
    pub status: SaleStatus,
    /// When the listing was created.
    pub listed_at: DateTime<Utc>,
}

impl Listing {
    /// Create a fresh open listing.
    ///
    /// # Errors
    /// Returns [`DeedflowError::EscrowExceedsPurchase`] if the earnest
    /// requirement exceeds the purchase price.
    pub fn new(
        asset: AssetId,
        escrow_price: Decimal,
        purchase_price: Decimal,
        buyer: PartyId,
    ) -> Result<Self> {
        if escrow_price > purchase_price {
            return Err(DeedflowError::EscrowExceedsPurchase {
                escrow: escrow_price,
                purchase: purchase_price,
            });
        }
        Ok(Self {
            asset,
            escrow_price,
            purchase_price,
            buyer,
            verdict: InspectionVerdict::Pending,
            approvals: ApprovalLedger::new(),
            status: SaleStatus::Open,
            listed_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == SaleStatus::Open
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status == SaleStatus::Settled
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.status == SaleStatus::Canceled
    }

    /// Guard for mutating operations.
    ///
    /// # Errors
    /// Returns [`DeedflowError::AlreadySettled`] on a terminal listing.
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DeedflowError::AlreadySettled(self.asset))
        }
    }

    /// Derived open substate, given the listing's current custody pot.
    #[must_use]
    pub fn phase(&self, held: Decimal) -> OpenPhase {
        if self.verdict.is_passed() && self.approvals.fully_approved() {
            OpenPhase::Approved
        } else if self.verdict.is_passed() {
            OpenPhase::Inspected
        } else if held >= self.escrow_price && !held.is_zero() {
            OpenPhase::Deposited
        } else {
            OpenPhase::Listed
        }
    }

    /// Transition to SETTLED.
    ///
    /// # Errors
    /// Returns [`DeedflowError::AlreadySettled`] if not currently open.
    pub fn mark_settled(&mut self) -> Result<()> {
        if !self.status.can_transition_to(SaleStatus::Settled) {
            return Err(DeedflowError::AlreadySettled(self.asset));
        }
        self.status = SaleStatus::Settled;
        Ok(())
    }

    /// Transition to CANCELED.
    ///
    /// # Errors
    /// Returns [`DeedflowError::AlreadySettled`] if not currently open.
    pub fn mark_canceled(&mut self) -> Result<()> {
        if !self.status.can_transition_to(SaleStatus::Canceled) {
            return Err(DeedflowError::AlreadySettled(self.asset));
        }
        self.status = SaleStatus::Canceled;
        Ok(())
    }
}

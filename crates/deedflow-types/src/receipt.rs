//! Disbursement receipts — the audit trail for every fund movement out of
//! custody.
//!
//! Exactly two operations move funds out of custody (finalize and cancel),
//! and each returns a [`DisbursementReceipt`] recording where the pot went.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetId, PartyId, ReceiptId};

/// The direction a custody pot was disbursed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disbursement {
    /// Sale finalized, or canceled after a passed inspection: pot to seller.
    SellerProceeds,
    /// Canceled with a failed or pending inspection: pot back to buyer.
    BuyerRefund,
}

impl std::fmt::Display for Disbursement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SellerProceeds => write!(f, "SELLER_PROCEEDS"),
            Self::BuyerRefund => write!(f, "BUYER_REFUND"),
        }
    }
}

/// Proof that a listing's custody pot was disbursed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisbursementReceipt {
    /// Deterministic receipt identifier.
    pub id: ReceiptId,
    /// The listing whose pot was disbursed.
    pub asset: AssetId,
    /// Which way the funds went.
    pub direction: Disbursement,
    /// The party credited.
    pub recipient: PartyId,
    /// Amount disbursed (the full pot at disbursement time).
    pub amount: Decimal,
    /// When the disbursement occurred.
    pub issued_at: DateTime<Utc>,
}

impl DisbursementReceipt {
    /// Issue a receipt for a disbursement that just occurred.
    #[must_use]
    pub fn issue(
        asset: AssetId,
        direction: Disbursement,
        recipient: PartyId,
        amount: Decimal,
        sequence: u64,
    ) -> Self {
        Self {
            id: ReceiptId::deterministic(asset, sequence),
            asset,
            direction,
            recipient,
            amount,
            issued_at: Utc::now(),
        }
    }
}

//! Error types for the Deedflow escrow engine.
//!
//! All errors use the `DF_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Listing errors
//! - 3xx: Custody / funds errors
//! - 4xx: Settlement errors
//! - 5xx: Registry errors
//! - 9xx: Configuration / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AssetId, PartyId, Role, SettlementGate};

/// Central error enum for all Deedflow operations.
///
/// Every guarded precondition produces a distinguishable failure; nothing is
/// silently swallowed, and all failures are atomic rejections.
#[derive(Debug, Error)]
pub enum DeedflowError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller does not hold the role required for the operation.
    #[error("DF_ERR_100: Unauthorized: {required} role required, caller is {caller}")]
    Unauthorized { required: Role, caller: PartyId },

    /// The caller is none of the buyer, seller, or lender for this listing.
    #[error("DF_ERR_101: {caller} is not a counterparty to the sale of {asset}")]
    NotACounterparty { asset: AssetId, caller: PartyId },

    // =================================================================
    // Listing Errors (2xx)
    // =================================================================
    /// The referenced asset was never listed.
    #[error("DF_ERR_200: No listing for {0}")]
    InvalidListing(AssetId),

    /// The asset already has an open, unsettled listing.
    #[error("DF_ERR_201: {0} is already listed and open")]
    ListingAlreadyActive(AssetId),

    /// The earnest requirement exceeds the purchase price.
    #[error("DF_ERR_202: Escrow price {escrow} exceeds purchase price {purchase}")]
    EscrowExceedsPurchase { escrow: Decimal, purchase: Decimal },

    // =================================================================
    // Custody / Funds Errors (3xx)
    // =================================================================
    /// The deposited amount is below the required earnest.
    #[error("DF_ERR_300: Insufficient earnest deposit: need {needed}, got {supplied}")]
    InsufficientFunds { needed: Decimal, supplied: Decimal },

    /// A custody inflow must be strictly positive.
    #[error("DF_ERR_301: Custody contribution must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    // =================================================================
    // Settlement Errors (4xx)
    // =================================================================
    /// A required settlement gate is unmet.
    #[error("DF_ERR_400: Settlement precondition not met: {0}")]
    PreconditionNotMet(SettlementGate),

    /// Operation attempted on a terminal (settled or canceled) listing.
    #[error("DF_ERR_401: Sale of {0} is already settled or canceled")]
    AlreadySettled(AssetId),

    /// Custody accounting no longer balances — critical safety alert.
    #[error("DF_ERR_402: Funds conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // Registry Errors (5xx)
    // =================================================================
    /// The deed does not exist in the registry.
    #[error("DF_ERR_500: {0} does not exist in the registry")]
    DeedNotFound(AssetId),

    /// The operator lacks transfer approval for the deed.
    #[error("DF_ERR_501: Operator {operator} is not approved to transfer {asset}")]
    TransferNotApproved { asset: AssetId, operator: PartyId },

    /// The deed is not owned by the expected party.
    #[error("DF_ERR_502: {asset} is owned by {actual}, not {expected}")]
    WrongOwner {
        asset: AssetId,
        expected: PartyId,
        actual: PartyId,
    },

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    /// Invalid engine configuration (duplicate roles, etc.).
    #[error("DF_ERR_900: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DeedflowError>;

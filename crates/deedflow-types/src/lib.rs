//! # deedflow-types
//!
//! Shared types, errors, and role configuration for the **Deedflow** escrow
//! settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PartyId`], [`AssetId`], [`ReceiptId`]
//! - **Role model**: [`Role`], [`RoleSet`]
//! - **Listing model**: [`Listing`], [`SaleStatus`], [`OpenPhase`],
//!   [`InspectionVerdict`], [`ApprovalLedger`], [`ApprovalParty`], [`SettlementGate`]
//! - **Receipt model**: [`DisbursementReceipt`], [`Disbursement`]
//! - **Errors**: [`DeedflowError`] with `DF_ERR_` prefix codes

pub mod constants;
pub mod error;
pub mod ids;
pub mod listing;
pub mod receipt;
pub mod roles;

// Re-export all primary types at crate root for ergonomic imports:
//   use deedflow_types::{Listing, RoleSet, DeedflowError, ...};

pub use error::*;
pub use ids::*;
pub use listing::*;
pub use receipt::*;
pub use roles::*;

// Constants are accessed via `deedflow_types::constants::FOO`
// (not re-exported to avoid name collisions).

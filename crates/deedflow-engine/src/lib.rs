//! # deedflow-engine
//!
//! The escrow settlement engine: the state machine and fund-custody logic
//! governing a role-gated property sale.
//!
//! ## Architecture
//!
//! 1. **CustodyVault**: per-listing fund pots plus a payout ledger; the only
//!    place money lives
//! 2. **FundsConservation**: accounting invariant checked after every pot
//!    mutation
//! 3. **EscrowEngine**: the orchestrator exposing the role-gated surface —
//!    `list`, `deposit_earnest`, `record_inspection`, `approve_sale`,
//!    `fund_settlement`, `finalize_sale`, `cancel_sale`
//!
//! ## Sale Flow
//!
//! ```text
//! seller.list() → buyer.deposit_earnest() → inspector.record_inspection()
//!     → {buyer,seller,lender}.approve_sale() → lender.fund_settlement()
//!     → seller.finalize_sale()   (or seller.cancel_sale() at any point)
//! ```
//!
//! Every stage reads state written by earlier stages; finalize validates all
//! of them, so none can be skipped.

pub mod conservation;
pub mod custody;
pub mod engine;

pub use conservation::FundsConservation;
pub use custody::CustodyVault;
pub use engine::EscrowEngine;

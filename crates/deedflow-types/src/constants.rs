//! System-wide constants for the Deedflow engine.

/// Number of parties whose approval gates settlement (buyer, seller, lender).
pub const APPROVING_PARTIES: usize = 3;

/// The registry assigns deed IDs sequentially starting here.
pub const FIRST_DEED_ID: u64 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Deedflow";

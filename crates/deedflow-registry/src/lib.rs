//! # deedflow-registry
//!
//! The asset-registry collaborator consumed by the escrow engine.
//!
//! The engine never owns property titles directly — it calls into a
//! [`PropertyRegistry`] to move deed ownership at settlement time. This
//! crate defines that contract plus [`DeedRegistry`], an in-memory
//! implementation with sequential token IDs, per-deed metadata URIs, and
//! per-deed operator approvals.
//!
//! ## Sale flow
//!
//! ```text
//! seller → registry.mint()               (creates the sellable deed)
//! seller → registry.approve(engine, id)  (grants the engine transfer rights)
//! engine → registry.transfer_from(seller, buyer, id)   (on finalize)
//! ```

pub mod deed;
pub mod registry;

pub use deed::DeedRegistry;
pub use registry::PropertyRegistry;

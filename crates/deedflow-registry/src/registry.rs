//! The registry contract the escrow engine settles against.

use deedflow_types::{AssetId, PartyId, Result};

/// Title registry for property deeds.
///
/// The escrow engine calls [`PropertyRegistry::transfer_from`] exactly once
/// per finalized sale, after every settlement gate has passed and before any
/// balance or status mutation — so a rejected transfer rolls the whole
/// settlement back for free.
pub trait PropertyRegistry {
    /// Mint a new deed owned by `minter`. IDs are assigned sequentially.
    fn mint(&mut self, minter: PartyId, metadata_uri: &str) -> Result<AssetId>;

    /// Grant `operator` the right to transfer `asset`. Only the current
    /// owner may approve; a later transfer clears the approval.
    ///
    /// # Errors
    /// - [`DeedNotFound`](deedflow_types::DeedflowError::DeedNotFound) if the deed does not exist
    /// - [`WrongOwner`](deedflow_types::DeedflowError::WrongOwner) if `owner` does not hold the deed
    fn approve(&mut self, owner: PartyId, operator: PartyId, asset: AssetId) -> Result<()>;

    /// Current owner of a deed.
    ///
    /// # Errors
    /// Returns [`DeedNotFound`](deedflow_types::DeedflowError::DeedNotFound)
    /// if the deed does not exist.
    fn owner_of(&self, asset: AssetId) -> Result<PartyId>;

    /// Transfer `asset` from `from` to `to` on behalf of `operator`.
    ///
    /// # Errors
    /// - [`DeedNotFound`](deedflow_types::DeedflowError::DeedNotFound) if the deed does not exist
    /// - [`WrongOwner`](deedflow_types::DeedflowError::WrongOwner) if `from` is not the owner
    /// - [`TransferNotApproved`](deedflow_types::DeedflowError::TransferNotApproved)
    ///   if `operator` is neither the owner nor approved
    fn transfer_from(
        &mut self,
        operator: PartyId,
        from: PartyId,
        to: PartyId,
        asset: AssetId,
    ) -> Result<()>;
}

//! In-memory deed registry.
//!
//! Tracks deed ownership, metadata URIs, and per-deed operator approvals.
//! Token IDs are sequential starting at [`constants::FIRST_DEED_ID`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use deedflow_types::{constants, AssetId, DeedflowError, PartyId, Result};

use crate::registry::PropertyRegistry;

/// Default collection name for a freshly constructed registry.
pub const DEFAULT_COLLECTION_NAME: &str = "Real Estate";
/// Default collection symbol.
pub const DEFAULT_COLLECTION_SYMBOL: &str = "REAL";

/// In-memory implementation of [`PropertyRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeedRegistry {
    name: String,
    symbol: String,
    /// The next deed ID to assign.
    next_id: AssetId,
    /// Current owner per deed.
    owners: HashMap<AssetId, PartyId>,
    /// Metadata URI per deed, fixed at mint.
    metadata: HashMap<AssetId, String>,
    /// Per-deed transfer approval, at most one operator at a time.
    approvals: HashMap<AssetId, PartyId>,
}

impl DeedRegistry {
    #[must_use]
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            next_id: AssetId(constants::FIRST_DEED_ID),
            owners: HashMap::new(),
            metadata: HashMap::new(),
            approvals: HashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of deeds minted so far.
    #[must_use]
    pub fn deed_count(&self) -> u64 {
        self.next_id.0 - constants::FIRST_DEED_ID
    }

    /// Metadata URI for a deed, if it exists.
    #[must_use]
    pub fn metadata_uri(&self, asset: AssetId) -> Option<&str> {
        self.metadata.get(&asset).map(String::as_str)
    }

    /// The currently approved operator for a deed, if any.
    #[must_use]
    pub fn approved_operator(&self, asset: AssetId) -> Option<PartyId> {
        self.approvals.get(&asset).copied()
    }
}

impl Default for DeedRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION_NAME, DEFAULT_COLLECTION_SYMBOL)
    }
}

impl PropertyRegistry for DeedRegistry {
    fn mint(&mut self, minter: PartyId, metadata_uri: &str) -> Result<AssetId> {
        let asset = self.next_id;
        self.next_id = self.next_id.next();
        self.owners.insert(asset, minter);
        self.metadata.insert(asset, metadata_uri.to_string());
        Ok(asset)
    }

    fn approve(&mut self, owner: PartyId, operator: PartyId, asset: AssetId) -> Result<()> {
        let actual = self.owner_of(asset)?;
        if actual != owner {
            return Err(DeedflowError::WrongOwner {
                asset,
                expected: owner,
                actual,
            });
        }
        self.approvals.insert(asset, operator);
        Ok(())
    }

    fn owner_of(&self, asset: AssetId) -> Result<PartyId> {
        self.owners
            .get(&asset)
            .copied()
            .ok_or(DeedflowError::DeedNotFound(asset))
    }

    fn transfer_from(
        &mut self,
        operator: PartyId,
        from: PartyId,
        to: PartyId,
        asset: AssetId,
    ) -> Result<()> {
        let actual = self.owner_of(asset)?;
        if actual != from {
            return Err(DeedflowError::WrongOwner {
                asset,
                expected: from,
                actual,
            });
        }
        let approved = self.approvals.get(&asset).copied();
        if operator != actual && approved != Some(operator) {
            return Err(DeedflowError::TransferNotApproved { asset, operator });
        }
        self.owners.insert(asset, to);
        // A transfer invalidates any outstanding approval.
        self.approvals.remove(&asset);
        Ok(())
    }
}

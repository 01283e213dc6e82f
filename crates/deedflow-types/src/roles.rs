//! Fixed transaction roles and the immutable role registry.
//!
//! The seller, inspector, and lender are set once at engine construction
//! and never change. The buyer is recorded per listing, not here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DeedflowError, PartyId, Result};

/// A role a caller may be required to hold for a gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Seller,
    Buyer,
    Inspector,
    Lender,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seller => write!(f, "SELLER"),
            Self::Buyer => write!(f, "BUYER"),
            Self::Inspector => write!(f, "INSPECTOR"),
            Self::Lender => write!(f, "LENDER"),
        }
    }
}

/// The three fixed counterparties, validated distinct at construction.
///
/// All role checks compare caller identity against this struct; there is
/// no ambient identity anywhere in the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoleSet {
    seller: PartyId,
    inspector: PartyId,
    lender: PartyId,
}

impl RoleSet {
    /// Create a role set.
    ///
    /// # Errors
    /// Returns [`DeedflowError::Configuration`] if any two roles share an
    /// identity.
    pub fn new(seller: PartyId, inspector: PartyId, lender: PartyId) -> Result<Self> {
        if seller == inspector || seller == lender || inspector == lender {
            return Err(DeedflowError::Configuration(
                "seller, inspector, and lender must be distinct identities".to_string(),
            ));
        }
        Ok(Self {
            seller,
            inspector,
            lender,
        })
    }

    #[must_use]
    pub fn seller(&self) -> PartyId {
        self.seller
    }

    #[must_use]
    pub fn inspector(&self) -> PartyId {
        self.inspector
    }

    #[must_use]
    pub fn lender(&self) -> PartyId {
        self.lender
    }

    /// The fixed role held by `party`, if any. Buyers are per-listing and
    /// never resolved here.
    #[must_use]
    pub fn role_of(&self, party: PartyId) -> Option<Role> {
        if party == self.seller {
            Some(Role::Seller)
        } else if party == self.inspector {
            Some(Role::Inspector)
        } else if party == self.lender {
            Some(Role::Lender)
        } else {
            None
        }
    }

    /// Guard a role-gated operation.
    ///
    /// # Errors
    /// Returns [`DeedflowError::Unauthorized`] unless `caller` holds
    /// `required`.
    pub fn require(&self, caller: PartyId, required: Role) -> Result<()> {
        let holder = match required {
            Role::Seller => self.seller,
            Role::Inspector => self.inspector,
            Role::Lender => self.lender,
            // Buyer is per-listing; the engine checks it against the listing.
            Role::Buyer => {
                return Err(DeedflowError::Unauthorized {
                    required,
                    caller,
                });
            }
        };
        if caller == holder {
            Ok(())
        } else {
            Err(DeedflowError::Unauthorized { required, caller })
        }
    }
}

//! Local identity resolution.

use crate::snapshot::Address;

/// External wallet capability deriving a public address from a stored secret
pub trait KeyDeriver: Send + Sync {
    fn public_key(&self, secret: &str) -> Result<Address, String>;
}

/// Who this client acts for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIdentity {
    /// Address used for seat lookup, legal actions and nonce refreshes
    pub address: Option<Address>,

    /// Address derived from the stored secret, when one is available
    pub public_key: Option<Address>,
}

impl LocalIdentity {
    /// Observer without an identity; never acts
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_address(address: impl AsRef<str>) -> Self {
        let address = Address::new(address);
        Self {
            address: (!address.is_empty()).then_some(address),
            public_key: None,
        }
    }

    /// Resolve the identity from stored values.
    ///
    /// The stored public address wins; without one, the address derived
    /// from the secret is used. A failed derivation is logged and leaves
    /// the public key unknown.
    pub fn resolve(
        stored_address: Option<&str>,
        stored_secret: Option<&str>,
        deriver: Option<&dyn KeyDeriver>,
    ) -> Self {
        let public_key = match (stored_secret, deriver) {
            (Some(secret), Some(deriver)) => match deriver.public_key(secret) {
                Ok(address) => Some(address),
                Err(e) => {
                    log::error!("Error calculating public key: {}", e);
                    None
                }
            },
            _ => None,
        };

        let address = stored_address
            .map(Address::new)
            .filter(|address| !address.is_empty())
            .or_else(|| public_key.clone());

        Self {
            address,
            public_key,
        }
    }

    pub fn is_known(&self) -> bool {
        self.address.is_some()
    }
}

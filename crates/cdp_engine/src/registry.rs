//! Supported collateral registry

use std::collections::HashMap;
use std::rc::Rc;

use alloy_primitives::Address;

use crate::error::{EngineError, EngineResult};
use crate::oracle::PriceOracle;
use crate::token::Token;

/// One registered collateral asset
pub struct CollateralEntry {
    pub asset: Address,
    pub token: Rc<dyn Token>,
    pub oracle: Rc<dyn PriceOracle>,
}

/// Insertion-ordered set of collateral assets, fixed at construction
pub struct CollateralRegistry {
    entries: Vec<CollateralEntry>,
    index: HashMap<Address, usize>,
}

impl CollateralRegistry {
    /// Pair `tokens[i]` with `oracles[i]`, preserving input order
    pub fn new(
        tokens: Vec<Rc<dyn Token>>,
        oracles: Vec<Rc<dyn PriceOracle>>,
    ) -> EngineResult<Self> {
        if tokens.len() != oracles.len() {
            return Err(EngineError::LengthMismatch {
                assets: tokens.len(),
                oracles: oracles.len(),
            });
        }

        let mut entries = Vec::with_capacity(tokens.len());
        let mut index = HashMap::with_capacity(tokens.len());

        for (token, oracle) in tokens.into_iter().zip(oracles) {
            let asset = token.address();
            if index.insert(asset, entries.len()).is_some() {
                return Err(EngineError::DuplicateAsset(asset));
            }
            entries.push(CollateralEntry { asset, token, oracle });
        }

        Ok(Self { entries, index })
    }

    pub fn get(&self, asset: Address) -> EngineResult<&CollateralEntry> {
        self.index
            .get(&asset)
            .map(|&i| &self.entries[i])
            .ok_or(EngineError::AssetNotSupported(asset))
    }

    pub fn contains(&self, asset: Address) -> bool {
        self.index.contains_key(&asset)
    }

    /// Assets in registration order
    pub fn assets(&self) -> Vec<Address> {
        self.entries.iter().map(|e| e.asset).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollateralEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

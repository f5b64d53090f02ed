// Bitcoin wallet cryptographic primitives library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2019-2024 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2024 LNP/BP Standards Association. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::sync::RwLock;

use bc_consensus::{Chain, Outpoint, Sats, ScriptPubkey};

/// The state of a previous transaction output as seen by the signer and
/// verifier: the amount it carries, the script that locks it, and — when
/// known — the block it confirmed in, needed for BIP68 relative locktime.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Utxo {
    pub value: Sats,
    pub script_pubkey: ScriptPubkey,
    pub block: Option<Chain>,
}

impl Utxo {
    pub fn new(value: impl Into<Sats>, script_pubkey: ScriptPubkey) -> Self {
        Utxo {
            value: value.into(),
            script_pubkey,
            block: None,
        }
    }

    pub fn at_block(mut self, block: Chain) -> Self {
        self.block = Some(block);
        self
    }
}

type Loader = dyn Fn(Outpoint) -> Option<Utxo> + Send + Sync;

/// A process-wide cache of previous-output data, consulted by the signer and
/// verifier to resolve the inputs of a transaction. Falls back to a
/// pluggable loader callback (e.g. backed by an indexer or a node's RPC)
/// when an outpoint is missing, caching whatever the loader returns.
///
/// The loader is expected to be idempotent: calling it twice for the same
/// outpoint must not observably change program state beyond the cache entry
/// it produces.
pub struct UtxoRegistry {
    utxos: RwLock<HashMap<Outpoint, Utxo>>,
    loader: RwLock<Option<Box<Loader>>>,
}

impl Default for UtxoRegistry {
    fn default() -> Self { Self::new() }
}

impl UtxoRegistry {
    pub fn new() -> Self {
        UtxoRegistry {
            utxos: RwLock::new(HashMap::new()),
            loader: RwLock::new(None),
        }
    }

    pub fn with_loader(loader: impl Fn(Outpoint) -> Option<Utxo> + Send + Sync + 'static) -> Self {
        let registry = Self::new();
        registry.set_loader(loader);
        registry
    }

    pub fn set_loader(&self, loader: impl Fn(Outpoint) -> Option<Utxo> + Send + Sync + 'static) {
        *self.loader.write().expect("lock poisoned") = Some(Box::new(loader));
    }

    /// Registers `utxo` directly, without consulting the loader.
    pub fn insert(&self, outpoint: Outpoint, utxo: Utxo) {
        self.utxos.write().expect("lock poisoned").insert(outpoint, utxo);
    }

    pub fn remove(&self, outpoint: Outpoint) -> Option<Utxo> {
        self.utxos.write().expect("lock poisoned").remove(&outpoint)
    }

    pub fn contains(&self, outpoint: Outpoint) -> bool {
        self.utxos.read().expect("lock poisoned").contains_key(&outpoint)
    }

    /// Resolves `outpoint`, consulting the cache first and the loader (if
    /// any) on a miss. A loader hit is cached for subsequent lookups.
    pub fn get(&self, outpoint: Outpoint) -> Option<Utxo> {
        if let Some(utxo) = self.utxos.read().expect("lock poisoned").get(&outpoint) {
            return Some(utxo.clone());
        }
        let loaded = self.loader.read().expect("lock poisoned").as_ref()?(outpoint)?;
        self.utxos.write().expect("lock poisoned").insert(outpoint, loaded.clone());
        Some(loaded)
    }
}

#[cfg(test)]
mod test {
    use bc_consensus::{Txid, Vout};

    use super::*;

    fn outpoint(byte: u8) -> Outpoint { Outpoint::new(Txid::from([byte; 32]), Vout::from_u32(0)) }

    #[test]
    fn insert_and_get_roundtrips() {
        let registry = UtxoRegistry::new();
        let utxo = Utxo::new(1000u64, ScriptPubkey::p2pkh([0x11u8; 20]));
        registry.insert(outpoint(1), utxo.clone());
        assert_eq!(registry.get(outpoint(1)), Some(utxo));
    }

    #[test]
    fn loader_is_consulted_on_miss_and_cached() {
        let registry = UtxoRegistry::with_loader(|op| {
            Some(Utxo::new(500u64, ScriptPubkey::p2pkh([op.vout.to_u32() as u8; 20])))
        });
        assert!(!registry.contains(outpoint(2)));
        let utxo = registry.get(outpoint(2)).unwrap();
        assert_eq!(utxo.value, Sats(500));
        assert!(registry.contains(outpoint(2)));
    }

    #[test]
    fn missing_outpoint_without_loader_is_none() {
        let registry = UtxoRegistry::new();
        assert_eq!(registry.get(outpoint(3)), None);
    }
}

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

//! A process-wide registry of chain parameters: address version bytes, the
//! WIF version byte, the Bech32 HRP (absent when the chain has no segwit
//! support), the four BIP32 extended-key version prefixes (legacy/compat/
//! segwit, private and public), and the BIP44 coin type.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Which BIP44-family purpose an extended-key version prefix belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(Debug)]
pub enum Purpose {
    /// BIP44: legacy P2PKH, `xprv`/`xpub`-style prefixes.
    Legacy,
    /// BIP49: P2SH-wrapped segwit, `yprv`/`ypub`-style prefixes.
    Compat,
    /// BIP84: native segwit, `zprv`/`zpub`-style prefixes.
    Segwit,
}

impl Purpose {
    pub const fn purpose_number(self) -> u32 {
        match self {
            Purpose::Legacy => 44,
            Purpose::Compat => 49,
            Purpose::Segwit => 84,
        }
    }

    pub const fn from_purpose_number(n: u32) -> Option<Self> {
        match n {
            44 => Some(Purpose::Legacy),
            49 => Some(Purpose::Compat),
            84 => Some(Purpose::Segwit),
            _ => None,
        }
    }
}

/// An immutable descriptor of one chain's address/key encoding parameters.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(crate = "serde_crate"))]
pub struct Network {
    pub id: String,
    pub p2pkh_version: u8,
    pub p2sh_version: u8,
    pub wif_version: u8,
    pub bech32_hrp: Option<String>,
    /// `(xprv version, xpub version)` per purpose.
    pub xkey_versions: [(u32, u32); 3],
    pub bip44_coin_type: u32,
}

impl Network {
    pub fn supports_segwit(&self) -> bool { self.bech32_hrp.is_some() }

    pub fn xprv_version(&self, purpose: Purpose) -> u32 { self.xkey_versions[purpose_index(purpose)].0 }

    pub fn xpub_version(&self, purpose: Purpose) -> u32 { self.xkey_versions[purpose_index(purpose)].1 }

    /// Looks up which purpose (and whether private or public) a raw BIP32
    /// version prefix corresponds to on this network.
    pub fn purpose_of_version(&self, version: u32) -> Option<(Purpose, bool)> {
        for (idx, (xprv, xpub)) in self.xkey_versions.iter().enumerate() {
            if *xprv == version {
                return Some((index_purpose(idx), true));
            }
            if *xpub == version {
                return Some((index_purpose(idx), false));
            }
        }
        None
    }
}

const fn purpose_index(p: Purpose) -> usize {
    match p {
        Purpose::Legacy => 0,
        Purpose::Compat => 1,
        Purpose::Segwit => 2,
    }
}

const fn index_purpose(i: usize) -> Purpose {
    match i {
        0 => Purpose::Legacy,
        1 => Purpose::Compat,
        _ => Purpose::Segwit,
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum NetworkConfigError {
    /// network identifier '{0}' is not registered.
    Unknown(String),

    /// network identifier '{0}' is already registered.
    AlreadyRegistered(String),

    /// single-network mode is active and bound to '{0}'; '{1}' was
    /// requested.
    SingleNetworkViolation(String, String),

    /// WIF version byte {0:#04x} matches no registered network.
    NoMatchingWifVersion(u8),

    /// WIF version byte {0:#04x} is ambiguous among networks: {1:?}, and
    /// none of them is the default network.
    AmbiguousWifVersion(u8, Vec<String>),

    /// BIP32 version prefix {0:#010x} matches no registered network.
    NoMatchingXkeyVersion(u32),
}

/// The process-wide network registry: built-in chains plus anything
/// registered at runtime, a selectable default, and an optional
/// single-network lockdown.
pub struct Registry {
    networks: HashMap<String, Network>,
    default_id: String,
    single_network: Option<String>,
}

impl Registry {
    fn with_builtins() -> Self {
        let mut networks = HashMap::new();
        for net in builtins() {
            networks.insert(net.id.clone(), net);
        }
        Registry { networks, default_id: "bitcoin".to_string(), single_network: None }
    }

    pub fn register(&mut self, network: Network) -> Result<(), NetworkConfigError> {
        if self.networks.contains_key(&network.id) {
            return Err(NetworkConfigError::AlreadyRegistered(network.id));
        }
        self.networks.insert(network.id.clone(), network);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Network, NetworkConfigError> {
        self.networks.get(id).cloned().ok_or_else(|| NetworkConfigError::Unknown(id.to_string()))
    }

    pub fn default_network(&self) -> Network {
        self.networks.get(&self.default_id).cloned().expect("default network is always registered")
    }

    pub fn set_default(&mut self, id: &str) -> Result<(), NetworkConfigError> {
        if !self.networks.contains_key(id) {
            return Err(NetworkConfigError::Unknown(id.to_string()));
        }
        self.default_id = id.to_string();
        Ok(())
    }

    /// Restricts object construction to a single network; any attempt to
    /// bind to a different one should surface
    /// [`NetworkConfigError::SingleNetworkViolation`] from the caller.
    pub fn set_single_network(&mut self, id: Option<&str>) -> Result<(), NetworkConfigError> {
        match id {
            None => {
                self.single_network = None;
                Ok(())
            }
            Some(id) => {
                if !self.networks.contains_key(id) {
                    return Err(NetworkConfigError::Unknown(id.to_string()));
                }
                self.single_network = Some(id.to_string());
                Ok(())
            }
        }
    }

    pub fn check_allowed(&self, id: &str) -> Result<(), NetworkConfigError> {
        match &self.single_network {
            Some(bound) if bound != id => {
                Err(NetworkConfigError::SingleNetworkViolation(bound.clone(), id.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Every registered network whose WIF version byte matches `version`.
    pub fn by_wif_version(&self, version: u8) -> Vec<Network> {
        self.networks.values().filter(|n| n.wif_version == version).cloned().collect()
    }

    /// Every registered network whose P2PKH address version byte matches
    /// `version`.
    pub fn by_p2pkh_version(&self, version: u8) -> Vec<Network> {
        self.networks.values().filter(|n| n.p2pkh_version == version).cloned().collect()
    }

    /// Every registered network whose P2SH address version byte matches
    /// `version`.
    pub fn by_p2sh_version(&self, version: u8) -> Vec<Network> {
        self.networks.values().filter(|n| n.p2sh_version == version).cloned().collect()
    }

    /// Every registered network whose Bech32 HRP matches `hrp` exactly.
    pub fn by_bech32_hrp(&self, hrp: &str) -> Vec<Network> {
        self.networks
            .values()
            .filter(|n| n.bech32_hrp.as_deref() == Some(hrp))
            .cloned()
            .collect()
    }

    /// Resolves a WIF version byte to one network, preferring the default
    /// network when several match, per `spec.md` §4.3.
    pub fn resolve_wif_version(&self, version: u8) -> Result<Network, NetworkConfigError> {
        let matches = self.by_wif_version(version);
        match matches.len() {
            0 => Err(NetworkConfigError::NoMatchingWifVersion(version)),
            1 => Ok(matches.into_iter().next().unwrap()),
            _ => {
                if let Some(net) = matches.iter().find(|n| n.id == self.default_id) {
                    Ok(net.clone())
                } else {
                    Err(NetworkConfigError::AmbiguousWifVersion(
                        version,
                        matches.into_iter().map(|n| n.id).collect(),
                    ))
                }
            }
        }
    }

    /// Every registered network whose BIP32 version prefix matches
    /// `version`, together with the purpose/private-public it denotes on
    /// that network.
    pub fn by_xkey_version(&self, version: u32) -> Vec<(Network, Purpose, bool)> {
        self.networks
            .values()
            .filter_map(|n| n.purpose_of_version(version).map(|(p, is_priv)| (n.clone(), p, is_priv)))
            .collect()
    }
}

fn global() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::with_builtins()))
}

/// Reads the process-wide registry.
pub fn registry() -> std::sync::RwLockReadGuard<'static, Registry> {
    global().read().expect("network registry lock poisoned")
}

/// Mutates the process-wide registry. Per `spec.md` §5, perform all
/// mutation before spinning worker threads: the lock only protects
/// memory safety, not the absence of races between readers observing a
/// still-being-configured registry.
pub fn registry_mut() -> std::sync::RwLockWriteGuard<'static, Registry> {
    global().write().expect("network registry lock poisoned")
}

fn builtins() -> Vec<Network> {
    vec![
        Network {
            id: "bitcoin".to_string(),
            p2pkh_version: 0x00,
            p2sh_version: 0x05,
            wif_version: 0x80,
            bech32_hrp: Some("bc".to_string()),
            xkey_versions: [
                (0x0488_ade4, 0x0488_b21e), // xprv / xpub
                (0x049d_7878, 0x049d_7cb2), // yprv / ypub
                (0x04b2_430c, 0x04b2_4746), // zprv / zpub
            ],
            bip44_coin_type: 0,
        },
        Network {
            id: "bitcoin_testnet".to_string(),
            p2pkh_version: 0x6f,
            p2sh_version: 0xc4,
            wif_version: 0xef,
            bech32_hrp: Some("tb".to_string()),
            xkey_versions: [
                (0x0435_8394, 0x0435_87cf), // tprv / tpub
                (0x044a_4e28, 0x044a_5262), // uprv / upub
                (0x045f_18bc, 0x045f_1cf6), // vprv / vpub
            ],
            bip44_coin_type: 1,
        },
        Network {
            id: "dogecoin".to_string(),
            p2pkh_version: 0x1e,
            p2sh_version: 0x16,
            wif_version: 0x9e,
            // Dogecoin mainnet never deployed segwit.
            bech32_hrp: None,
            xkey_versions: [
                (0x02fa_c398, 0x02fa_cafd), // dgpv / dgub
                (0x02fa_c398, 0x02fa_cafd),
                (0x02fa_c398, 0x02fa_cafd),
            ],
            bip44_coin_type: 3,
        },
        Network {
            id: "dogecoin_testnet".to_string(),
            p2pkh_version: 0x71,
            p2sh_version: 0xc4,
            wif_version: 0xf1,
            bech32_hrp: None,
            xkey_versions: [
                (0x0432_a243, 0x0432_a9a8), // tgpv / tgub
                (0x0432_a243, 0x0432_a9a8),
                (0x0432_a243, 0x0432_a9a8),
            ],
            bip44_coin_type: 1,
        },
        // Pepecoin mirrors Dogecoin's chain parameters (it forked from the
        // Dogecoin codebase); no independent BIP32 prefix registry is
        // publicly documented, so its extended-key versions reuse
        // Dogecoin's here as the closest known-good default. Hosts that
        // need the canonical values should `register` an updated
        // `Network` before constructing any Pepecoin objects.
        Network {
            id: "pepecoin".to_string(),
            p2pkh_version: 0x21,
            p2sh_version: 0x0a,
            wif_version: 0xb1,
            bech32_hrp: None,
            xkey_versions: [
                (0x02fa_c398, 0x02fa_cafd),
                (0x02fa_c398, 0x02fa_cafd),
                (0x02fa_c398, 0x02fa_cafd),
            ],
            bip44_coin_type: 3,
        },
        Network {
            id: "pepecoin_testnet".to_string(),
            p2pkh_version: 0x71,
            p2sh_version: 0xc4,
            wif_version: 0xf1,
            bech32_hrp: None,
            xkey_versions: [
                (0x0432_a243, 0x0432_a9a8),
                (0x0432_a243, 0x0432_a9a8),
                (0x0432_a243, 0x0432_a9a8),
            ],
            bip44_coin_type: 1,
        },
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let reg = registry();
        for id in ["bitcoin", "bitcoin_testnet", "dogecoin", "dogecoin_testnet", "pepecoin", "pepecoin_testnet"] {
            assert!(reg.get(id).is_ok(), "{id} should be registered");
        }
    }

    #[test]
    fn default_is_bitcoin() {
        assert_eq!(registry().default_network().id, "bitcoin");
    }

    #[test]
    fn wif_version_resolves_uniquely_for_mainnet() {
        let reg = registry();
        let net = reg.resolve_wif_version(0x80).unwrap();
        assert_eq!(net.id, "bitcoin");
    }

    #[test]
    fn ambiguous_wif_prefers_default_then_errors() {
        let mut reg = registry_mut();
        reg.register(Network {
            id: "custom_clone".to_string(),
            p2pkh_version: 0x00,
            p2sh_version: 0x05,
            wif_version: 0x80,
            bech32_hrp: None,
            xkey_versions: [(0, 0), (0, 0), (0, 0)],
            bip44_coin_type: 9999,
        })
        .unwrap();
        assert_eq!(reg.resolve_wif_version(0x80).unwrap().id, "bitcoin");
        reg.set_default("custom_clone").unwrap();
        assert_eq!(reg.resolve_wif_version(0x80).unwrap().id, "custom_clone");
        // restore global state so other tests sharing this process-wide
        // singleton keep observing the built-in default.
        reg.set_default("bitcoin").unwrap();
    }

    #[test]
    fn xkey_version_lookup_identifies_purpose() {
        let reg = registry();
        let net = reg.get("bitcoin").unwrap();
        assert_eq!(net.purpose_of_version(0x0488_ade4), Some((Purpose::Legacy, true)));
        assert_eq!(net.purpose_of_version(0x04b2_4746), Some((Purpose::Segwit, false)));
    }
}

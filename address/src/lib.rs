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

//! Bitcoin address encoding and decoding: Base58Check for legacy P2PKH/P2SH
//! (and P2SH-wrapped "compat" segwit), Bech32/Bech32m for native segwit
//! (BIP173/BIP350), and address-type classification.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bc_codecs::base58::Base58Error;
use bc_codecs::bech32::{self, Variant as Bech32Variant};
use bc_codecs::base58;
use bc_consensus::{PubkeyHash, ScriptHash, SegwitError, WitnessProgram, WitnessVer};
use bc_network::{registry, Network};

/// Which standard template an [`Address`] encodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(lowercase)]
pub enum AddressType {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
}

/// The decoded payload of an address, independent of its textual encoding.
#[derive(Clone, Eq, PartialEq, Hash, Debug, From)]
pub enum Payload {
    #[from]
    PubkeyHash(PubkeyHash),
    #[from]
    ScriptHash(ScriptHash),
    #[from]
    Witness(WitnessProgram),
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum AddressParseError {
    /// invalid base58 address encoding. Details: {0}
    #[from]
    Base58(Base58Error),

    /// invalid bech32/bech32m address encoding. Details: {0}
    #[from]
    Bech32(bech32::Bech32Error),

    /// invalid segwit witness program. Details: {0}
    #[from]
    Segwit(SegwitError),

    /// base58 address payload has unexpected length {0} (expected 21
    /// bytes: 1 version byte + 20-byte hash).
    InvalidBase58Length(usize),

    /// bech32 address payload is empty.
    EmptyBech32Payload,

    /// address version byte {0:#04x} matches no registered network.
    NoMatchingVersion(u8),

    /// address version byte {0:#04x} is ambiguous among networks: {1:?},
    /// and none of them is the default network.
    AmbiguousVersion(u8, Vec<String>),

    /// bech32 human-readable part '{0}' matches no registered network with
    /// segwit support.
    NoMatchingHrp(String),
}

/// A Bitcoin address: a [`Payload`] bound to the [`Network`] whose version
/// bytes/HRP it was (or will be) encoded with.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Address {
    pub payload: Payload,
    pub network: Network,
}

impl Address {
    pub fn new(payload: impl Into<Payload>, network: Network) -> Self {
        Address {
            payload: payload.into(),
            network,
        }
    }

    /// Constructs a legacy P2PKH address.
    pub fn p2pkh(hash: PubkeyHash, network: Network) -> Self { Self::new(hash, network) }

    /// Constructs a P2SH address — used both for plain legacy P2SH and for
    /// "compat" P2SH-wrapped segwit; the two are indistinguishable from the
    /// address alone, a limitation inherent to the Bitcoin address format.
    pub fn p2sh(hash: ScriptHash, network: Network) -> Self { Self::new(hash, network) }

    /// Constructs a native segwit address (v0 P2WPKH/P2WSH, v1+ P2TR/future
    /// versions), failing if `network` does not support segwit.
    pub fn segwit(program: WitnessProgram, network: Network) -> Result<Self, AddressParseError> {
        if !network.supports_segwit() {
            return Err(AddressParseError::NoMatchingHrp(network.id.clone()));
        }
        Ok(Self::new(program, network))
    }

    /// Classifies the address per the standard template its payload/program
    /// version corresponds to. `None` for witness versions 2-16, which
    /// decode but have no standard-template classification.
    pub fn address_type(&self) -> Option<AddressType> {
        match &self.payload {
            Payload::PubkeyHash(_) => Some(AddressType::P2pkh),
            Payload::ScriptHash(_) => Some(AddressType::P2sh),
            Payload::Witness(wp) => match wp.version() {
                WitnessVer::V0 if wp.program().len() == 20 => Some(AddressType::P2wpkh),
                WitnessVer::V0 => Some(AddressType::P2wsh),
                WitnessVer::V1 => Some(AddressType::P2tr),
                _ => None,
            },
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::PubkeyHash(hash) => {
                let mut data = vec![self.network.p2pkh_version];
                data.extend_from_slice(hash.as_slice());
                f.write_str(&base58::encode_check(&data))
            }
            Payload::ScriptHash(hash) => {
                let mut data = vec![self.network.p2sh_version];
                data.extend_from_slice(hash.as_slice());
                f.write_str(&base58::encode_check(&data))
            }
            Payload::Witness(wp) => {
                let hrp = self
                    .network
                    .bech32_hrp
                    .as_deref()
                    .expect("Address::segwit refuses to construct a witness address on a non-segwit network");
                let variant = match wp.version() {
                    WitnessVer::V0 => Bech32Variant::Bech32,
                    _ => Bech32Variant::Bech32m,
                };
                let mut data = vec![wp.version().version_no()];
                data.extend(bech32::convert_bits_8_to_5(wp.program()));
                let encoded = bech32::encode(hrp, &data, variant)
                    .expect("witness program HRP/data were already validated");
                f.write_str(&encoded)
            }
        }
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    /// Tries Bech32/Bech32m first (its charset and separator make it
    /// unambiguous versus Base58Check), then falls back to Base58Check.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok((hrp, data, variant)) = bech32::decode(s) {
            let networks = registry().by_bech32_hrp(&hrp);
            let network = networks
                .into_iter()
                .next()
                .ok_or_else(|| AddressParseError::NoMatchingHrp(hrp.clone()))?;
            let (&version_digit, payload) =
                data.split_first().ok_or(AddressParseError::EmptyBech32Payload)?;
            let version = WitnessVer::from_version_no(version_digit)?;
            let program_bytes = bech32::convert_bits_5_to_8(payload)?;
            let expected_variant = if version == WitnessVer::V0 {
                Bech32Variant::Bech32
            } else {
                Bech32Variant::Bech32m
            };
            if variant != expected_variant {
                return Err(AddressParseError::Bech32(bech32::Bech32Error::InvalidChecksum));
            }
            let program = WitnessProgram::new(version, program_bytes)?;
            return Ok(Address::new(program, network));
        }

        let data = base58::decode_check(s)?;
        let (&version, payload) =
            data.split_first().ok_or(AddressParseError::InvalidBase58Length(data.len()))?;
        if payload.len() != 20 {
            return Err(AddressParseError::InvalidBase58Length(data.len()));
        }
        let mut hash20 = [0u8; 20];
        hash20.copy_from_slice(payload);

        let reg = registry();
        let p2pkh_nets = reg.by_p2pkh_version(version);
        let p2sh_nets = reg.by_p2sh_version(version);
        if !p2pkh_nets.is_empty() {
            let network = pick_unambiguous(version, p2pkh_nets)?;
            return Ok(Address::p2pkh(PubkeyHash::from(hash20), network));
        }
        if !p2sh_nets.is_empty() {
            let network = pick_unambiguous(version, p2sh_nets)?;
            return Ok(Address::p2sh(ScriptHash::from(hash20), network));
        }
        Err(AddressParseError::NoMatchingVersion(version))
    }
}

fn pick_unambiguous(version: u8, matches: Vec<Network>) -> Result<Network, AddressParseError> {
    if matches.len() == 1 {
        return Ok(matches.into_iter().next().unwrap());
    }
    let default_id = registry().default_network().id;
    matches
        .iter()
        .find(|n| n.id == default_id)
        .cloned()
        .ok_or_else(|| AddressParseError::AmbiguousVersion(version, matches.into_iter().map(|n| n.id).collect()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn p2pkh_roundtrip() {
        let net = registry().get("bitcoin").unwrap();
        let addr = Address::p2pkh(PubkeyHash::from([0x11u8; 20]), net.clone());
        let s = addr.to_string();
        let reparsed: Address = s.parse().unwrap();
        assert_eq!(reparsed, addr);
        assert_eq!(reparsed.address_type(), Some(AddressType::P2pkh));
    }

    #[test]
    fn p2sh_roundtrip() {
        let net = registry().get("bitcoin").unwrap();
        let addr = Address::p2sh(ScriptHash::from([0x22u8; 20]), net);
        let s = addr.to_string();
        let reparsed: Address = s.parse().unwrap();
        assert_eq!(reparsed, addr);
        assert_eq!(reparsed.address_type(), Some(AddressType::P2sh));
    }

    #[test]
    fn segwit_v0_roundtrip() {
        let net = registry().get("bitcoin").unwrap();
        let program = WitnessProgram::new(WitnessVer::V0, vec![0x33u8; 20]).unwrap();
        let addr = Address::segwit(program, net).unwrap();
        let s = addr.to_string();
        assert!(s.starts_with("bc1q"));
        let reparsed: Address = s.parse().unwrap();
        assert_eq!(reparsed, addr);
        assert_eq!(reparsed.address_type(), Some(AddressType::P2wpkh));
    }

    #[test]
    fn taproot_v1_uses_bech32m() {
        let net = registry().get("bitcoin").unwrap();
        let program = WitnessProgram::new(WitnessVer::V1, vec![0x44u8; 32]).unwrap();
        let addr = Address::segwit(program, net).unwrap();
        let s = addr.to_string();
        assert!(s.starts_with("bc1p"));
        let reparsed: Address = s.parse().unwrap();
        assert_eq!(reparsed.address_type(), Some(AddressType::P2tr));
    }

    #[test]
    fn segwit_unsupported_network_rejected() {
        let net = registry().get("dogecoin").unwrap();
        let program = WitnessProgram::new(WitnessVer::V0, vec![0x55u8; 20]).unwrap();
        assert!(Address::segwit(program, net).is_err());
    }

    #[test]
    fn known_bip173_address_parses() {
        let addr: Address = "BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4".parse().unwrap();
        assert_eq!(addr.network.id, "bitcoin");
        assert_eq!(addr.address_type(), Some(AddressType::P2wpkh));
    }
}

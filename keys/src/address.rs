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

//! Projecting a [`PublicKey`] directly onto the address formats it can sign
//! for, without going through a `scriptPubkey` first.

use bc_address::Address;
use bc_consensus::{PubkeyHash, ScriptHash, ScriptPubkey, WitnessProgram, WitnessVer};
use bc_hashes::{hash160, sha256};
use bc_network::Network;
use secp256k1::{Scalar, SECP256K1};

use crate::{AddressGenerateError, PublicKey};

/// Tagged hash per BIP340: `SHA256(SHA256(tag) || SHA256(tag) || msg)`.
fn tagged_hash(tag: &[u8], msg: &[u8]) -> [u8; 32] {
    let tag_hash = sha256(tag);
    let mut engine = Vec::with_capacity(tag_hash.len() * 2 + msg.len());
    engine.extend_from_slice(&tag_hash);
    engine.extend_from_slice(&tag_hash);
    engine.extend_from_slice(msg);
    sha256(&engine)
}

/// Tweaks an internal key into a BIP341 key-path-only (script-less) output
/// key: `internal + tagged_hash("TapTweak", internal)·G`.
fn taproot_output_key(internal: [u8; 32]) -> [u8; 32] {
    let internal_xonly = secp256k1::XOnlyPublicKey::from_slice(&internal)
        .expect("PublicKey::x_only_bytes always serializes a valid x-only point");
    let tweak_hash = tagged_hash(b"TapTweak", &internal);
    let tweak = Scalar::from_be_bytes(tweak_hash)
        .expect("tagged hash is reduced mod the curve order with negligible failure probability");
    let (output_key, _parity) = internal_xonly
        .add_tweak(SECP256K1, &tweak)
        .expect("tweaking a valid x-only point by a valid scalar cannot fail");
    output_key.serialize()
}

/// Address formats a [`PublicKey`] can project onto directly, per the
/// standard single-key spending templates (P2PKH, P2SH-wrapped P2WPKH,
/// native P2WPKH, and P2TR key-path).
pub trait PublicKeyAddressExt {
    /// Legacy P2PKH address. Always available, even for uncompressed keys.
    fn get_legacy_address(&self, network: &Network) -> String;

    /// P2SH-wrapped P2WPKH ("nested segwit") address.
    fn get_compat_address(&self, network: &Network) -> Result<String, AddressGenerateError>;

    /// Native P2WPKH bech32 address.
    fn get_segwit_address(&self, network: &Network) -> Result<String, AddressGenerateError>;

    /// Native P2TR (key-path spend, no script path) bech32m address.
    fn get_tr_address(&self, network: &Network) -> Result<String, AddressGenerateError>;

    /// The address this key would most naturally receive to: native segwit
    /// when the key is compressed and the network supports it, legacy
    /// P2PKH otherwise.
    fn get_auto_address(&self, network: &Network) -> String;
}

impl PublicKeyAddressExt for PublicKey {
    fn get_legacy_address(&self, network: &Network) -> String {
        Address::p2pkh(PubkeyHash::from(self.to_legacy_pk()), network.clone()).to_string()
    }

    fn get_compat_address(&self, network: &Network) -> Result<String, AddressGenerateError> {
        let wpubkey_hash = self.wpubkey_hash().ok_or(AddressGenerateError::UncompressedKey)?;
        let hash_bytes: [u8; 20] = wpubkey_hash.into();
        let program = WitnessProgram::new(WitnessVer::V0, hash_bytes.to_vec())
            .expect("20-byte v0 witness program is always valid");
        let redeem_script = ScriptPubkey::from_witness_program(&program);
        let hash = hash160(redeem_script.as_script_bytes().as_slice());
        Ok(Address::p2sh(ScriptHash::from(hash), network.clone()).to_string())
    }

    fn get_segwit_address(&self, network: &Network) -> Result<String, AddressGenerateError> {
        let wpubkey_hash = self.wpubkey_hash().ok_or(AddressGenerateError::UncompressedKey)?;
        let hash_bytes: [u8; 20] = wpubkey_hash.into();
        let program = WitnessProgram::new(WitnessVer::V0, hash_bytes.to_vec())
            .expect("20-byte v0 witness program is always valid");
        Ok(Address::segwit(program, network.clone())?.to_string())
    }

    fn get_tr_address(&self, network: &Network) -> Result<String, AddressGenerateError> {
        if !self.is_compressed() {
            return Err(AddressGenerateError::UncompressedKey);
        }
        let output_key = taproot_output_key(self.x_only_bytes());
        let program =
            WitnessProgram::new(WitnessVer::V1, output_key.to_vec()).expect("32-byte v1 witness program is always valid");
        Ok(Address::segwit(program, network.clone())?.to_string())
    }

    fn get_auto_address(&self, network: &Network) -> String {
        if self.is_compressed() && network.supports_segwit() {
            self.get_segwit_address(network).expect("compressed key and segwit-capable network")
        } else {
            self.get_legacy_address(network)
        }
    }
}

#[cfg(test)]
mod test {
    use bc_network::registry;

    use super::*;
    use crate::PrivateKey;

    #[test]
    fn legacy_address_is_always_available() {
        let net = registry().get("bitcoin").unwrap();
        let uncompressed = PrivateKey::from_slice(&net, &[0x11; 32], false).unwrap().public_key();
        let addr = uncompressed.get_legacy_address(&net);
        assert_eq!(addr.chars().next(), Some('1'));
    }

    #[test]
    fn compat_and_segwit_addresses_reject_uncompressed_keys() {
        let net = registry().get("bitcoin").unwrap();
        let uncompressed = PrivateKey::from_slice(&net, &[0x22; 32], false).unwrap().public_key();
        assert_eq!(uncompressed.get_compat_address(&net), Err(AddressGenerateError::UncompressedKey));
        assert_eq!(uncompressed.get_segwit_address(&net), Err(AddressGenerateError::UncompressedKey));
        assert_eq!(uncompressed.get_tr_address(&net), Err(AddressGenerateError::UncompressedKey));
    }

    #[test]
    fn compressed_key_projects_all_address_formats() {
        let net = registry().get("bitcoin").unwrap();
        let key = PrivateKey::from_slice(&net, &[0x33; 32], true).unwrap().public_key();
        assert_eq!(key.get_legacy_address(&net).chars().next(), Some('1'));
        assert_eq!(key.get_compat_address(&net).unwrap().chars().next(), Some('3'));
        assert!(key.get_segwit_address(&net).unwrap().starts_with("bc1q"));
        assert!(key.get_tr_address(&net).unwrap().starts_with("bc1p"));
    }

    #[test]
    fn auto_address_prefers_segwit_for_compressed_keys() {
        let net = registry().get("bitcoin").unwrap();
        let compressed = PrivateKey::from_slice(&net, &[0x44; 32], true).unwrap().public_key();
        assert!(compressed.get_auto_address(&net).starts_with("bc1q"));
        let uncompressed = PrivateKey::from_slice(&net, &[0x44; 32], false).unwrap().public_key();
        assert_eq!(uncompressed.get_auto_address(&net).chars().next(), Some('1'));
    }

    #[test]
    fn taproot_output_key_differs_from_internal_key() {
        let net = registry().get("bitcoin").unwrap();
        let key = PrivateKey::from_slice(&net, &[0x55; 32], true).unwrap().public_key();
        let tweaked = taproot_output_key(key.x_only_bytes());
        assert_ne!(tweaked, key.x_only_bytes());
    }
}

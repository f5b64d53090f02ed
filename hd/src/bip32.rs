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

use std::str::FromStr;

use bc_codecs::base58;
use bc_hashes::{hash160, hmac_sha512};
use bc_network::{registry, Network, Purpose};
use bc_keys::{PrivateKey, PublicKey};
use secp256k1::{PublicKey as RawPublicKey, Scalar, SecretKey, SECP256K1};

use crate::{ChildNumber, DeriveError, XkeyParseError, HARDENED_BIT};

const SEED_KEY: &[u8] = b"Bitcoin seed";

/// An extended private key: a private scalar plus the chain code and
/// position-in-tree metadata BIP32 needs to derive children.
#[derive(Clone)]
pub struct ExtendedPrivKey {
    network: Network,
    purpose: Purpose,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
    chain_code: [u8; 32],
    private_key: SecretKey,
}

impl PartialEq for ExtendedPrivKey {
    fn eq(&self, other: &Self) -> bool {
        self.network.id == other.network.id
            && self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.child_number == other.child_number
            && self.chain_code == other.chain_code
            && self.private_key == other.private_key
    }
}
impl Eq for ExtendedPrivKey {}

impl ExtendedPrivKey {
    /// Derives the master extended private key from a BIP32 seed, per
    /// `spec.md` §4.5: `I = HMAC-SHA512("Bitcoin seed", seed)`.
    pub fn master(network: &Network, purpose: Purpose, seed: &[u8]) -> Result<Self, DeriveError> {
        let i = hmac_sha512(SEED_KEY, seed);
        let (il, ir) = i.split_at(32);
        let private_key = SecretKey::from_slice(il)?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);
        Ok(ExtendedPrivKey {
            network: network.clone(),
            purpose,
            depth: 0,
            parent_fingerprint: [0; 4],
            child_number: ChildNumber::from_raw(0),
            chain_code,
            private_key,
        })
    }

    pub fn network(&self) -> &Network { &self.network }

    pub fn depth(&self) -> u8 { self.depth }

    pub fn chain_code(&self) -> [u8; 32] { self.chain_code }

    pub fn child_number(&self) -> ChildNumber { self.child_number }

    /// The raw 32-byte private scalar.
    pub fn secret_bytes(&self) -> [u8; 32] { self.private_key.secret_bytes() }

    /// This key as a [`PrivateKey`] (always the compressed-pubkey
    /// convention, as BIP32 mandates).
    pub fn to_private_key(&self) -> PrivateKey {
        PrivateKey::from_slice(&self.network, &self.private_key.secret_bytes(), true)
            .expect("a valid BIP32 scalar is always a valid PrivateKey")
    }

    /// The corresponding compressed public key.
    pub fn public_key(&self) -> RawPublicKey { RawPublicKey::from_secret_key(SECP256K1, &self.private_key) }

    /// First 4 bytes of `hash160` of the compressed public key, identifying
    /// this key as a parent to its children.
    pub fn fingerprint(&self) -> [u8; 4] {
        let mut out = [0u8; 4];
        out.copy_from_slice(&hash160(&self.public_key().serialize())[..4]);
        out
    }

    /// Derives child `i` (`CKDpriv`). Set the hardened bit on `i` for a
    /// hardened child.
    pub fn derive_child(&self, i: u32) -> Result<Self, DeriveError> {
        if self.depth == u8::MAX {
            return Err(DeriveError::DepthExhausted);
        }
        let mut data = Vec::with_capacity(37);
        if i & HARDENED_BIT != 0 {
            data.push(0x00);
            data.extend_from_slice(&self.private_key.secret_bytes());
        } else {
            data.extend_from_slice(&self.public_key().serialize());
        }
        data.extend_from_slice(&i.to_be_bytes());

        let ihash = hmac_sha512(&self.chain_code, &data);
        let (il, ir) = ihash.split_at(32);

        let tweak = Scalar::from_be_bytes(il.try_into().expect("32 bytes")).map_err(|_| DeriveError::InvalidChildKey)?;
        let child_key = self.private_key.add_tweak(&tweak).map_err(|_| DeriveError::InvalidChildKey)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(ExtendedPrivKey {
            network: self.network.clone(),
            purpose: self.purpose,
            depth: self.depth + 1,
            parent_fingerprint: self.fingerprint(),
            child_number: ChildNumber::from_raw(i),
            chain_code,
            private_key: child_key,
        })
    }

    /// Derives along a full path, applying each segment's raw BIP32 value
    /// in turn.
    pub fn derive_path<'p>(&self, path: impl IntoIterator<Item = &'p ChildNumber>) -> Result<Self, DeriveError> {
        let mut key = self.clone();
        for segment in path {
            key = key.derive_child(segment.to_raw())?;
        }
        Ok(key)
    }

    /// Projects to the corresponding [`ExtendedPubKey`].
    pub fn to_extended_pub_key(&self) -> ExtendedPubKey {
        ExtendedPubKey {
            network: self.network.clone(),
            purpose: self.purpose,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            public_key: self.public_key(),
        }
    }

    /// Serializes the 78-byte BIP32 blob, wrapped in Base58Check.
    pub fn to_serialized(&self) -> String {
        let mut payload = Vec::with_capacity(78);
        payload.extend_from_slice(&self.network.xprv_version(self.purpose).to_be_bytes());
        payload.push(self.depth);
        payload.extend_from_slice(&self.parent_fingerprint);
        payload.extend_from_slice(&self.child_number.to_raw().to_be_bytes());
        payload.extend_from_slice(&self.chain_code);
        payload.push(0x00);
        payload.extend_from_slice(&self.private_key.secret_bytes());
        base58::encode_check(&payload)
    }
}

impl FromStr for ExtendedPrivKey {
    type Err = XkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = base58::decode_check(s)?;
        if data.len() != 78 {
            return Err(XkeyParseError::InvalidLength(data.len()));
        }
        let version = u32::from_be_bytes(data[0..4].try_into().unwrap());
        let (network, purpose, is_priv) = registry()
            .by_xkey_version(version)
            .into_iter()
            .next()
            .ok_or_else(|| XkeyParseError::UnknownVersion(bc_network::NetworkConfigError::NoMatchingXkeyVersion(version)))?;
        if !is_priv {
            return Err(XkeyParseError::WrongKeyKind(version, "public", "private"));
        }
        if data[45] != 0x00 {
            return Err(XkeyParseError::InvalidLength(78));
        }
        let private_key = SecretKey::from_slice(&data[46..78])?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let child_number = ChildNumber::from_raw(u32::from_be_bytes(data[9..13].try_into().unwrap()));
        Ok(ExtendedPrivKey {
            network,
            purpose,
            depth: data[4],
            parent_fingerprint,
            child_number,
            chain_code,
            private_key,
        })
    }
}

/// An extended public key: a curve point plus chain code and
/// position-in-tree metadata, supporting only non-hardened derivation.
#[derive(Clone)]
pub struct ExtendedPubKey {
    network: Network,
    purpose: Purpose,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
    chain_code: [u8; 32],
    public_key: RawPublicKey,
}

impl PartialEq for ExtendedPubKey {
    fn eq(&self, other: &Self) -> bool {
        self.network.id == other.network.id
            && self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.child_number == other.child_number
            && self.chain_code == other.chain_code
            && self.public_key == other.public_key
    }
}
impl Eq for ExtendedPubKey {}

impl ExtendedPubKey {
    pub fn network(&self) -> &Network { &self.network }

    pub fn depth(&self) -> u8 { self.depth }

    pub fn chain_code(&self) -> [u8; 32] { self.chain_code }

    pub fn child_number(&self) -> ChildNumber { self.child_number }

    pub fn to_public_key(&self) -> PublicKey {
        PublicKey::from_slice(&self.network, &self.public_key.serialize())
            .expect("a valid BIP32 point is always a valid PublicKey")
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        let mut out = [0u8; 4];
        out.copy_from_slice(&hash160(&self.public_key.serialize())[..4]);
        out
    }

    /// Derives child `i` (`CKDpub`). Hardened indexes (`i >= 2^31`) are
    /// rejected, since a public key carries no private scalar to mix in.
    pub fn derive_child(&self, i: u32) -> Result<Self, DeriveError> {
        if i & HARDENED_BIT != 0 {
            return Err(DeriveError::HardenedFromPublic(i));
        }
        if self.depth == u8::MAX {
            return Err(DeriveError::DepthExhausted);
        }
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&self.public_key.serialize());
        data.extend_from_slice(&i.to_be_bytes());

        let ihash = hmac_sha512(&self.chain_code, &data);
        let (il, ir) = ihash.split_at(32);

        let tweak = Scalar::from_be_bytes(il.try_into().expect("32 bytes")).map_err(|_| DeriveError::InvalidChildKey)?;
        let child_point = self
            .public_key
            .add_exp_tweak(SECP256K1, &tweak)
            .map_err(|_| DeriveError::InvalidChildPoint)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(ExtendedPubKey {
            network: self.network.clone(),
            purpose: self.purpose,
            depth: self.depth + 1,
            parent_fingerprint: self.fingerprint(),
            child_number: ChildNumber::from_raw(i),
            chain_code,
            public_key: child_point,
        })
    }

    pub fn derive_path<'p>(&self, path: impl IntoIterator<Item = &'p ChildNumber>) -> Result<Self, DeriveError> {
        let mut key = self.clone();
        for segment in path {
            key = key.derive_child(segment.to_raw())?;
        }
        Ok(key)
    }

    pub fn to_serialized(&self) -> String {
        let mut payload = Vec::with_capacity(78);
        payload.extend_from_slice(&self.network.xpub_version(self.purpose).to_be_bytes());
        payload.push(self.depth);
        payload.extend_from_slice(&self.parent_fingerprint);
        payload.extend_from_slice(&self.child_number.to_raw().to_be_bytes());
        payload.extend_from_slice(&self.chain_code);
        payload.extend_from_slice(&self.public_key.serialize());
        base58::encode_check(&payload)
    }
}

impl FromStr for ExtendedPubKey {
    type Err = XkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = base58::decode_check(s)?;
        if data.len() != 78 {
            return Err(XkeyParseError::InvalidLength(data.len()));
        }
        let version = u32::from_be_bytes(data[0..4].try_into().unwrap());
        let (network, purpose, is_priv) = registry()
            .by_xkey_version(version)
            .into_iter()
            .next()
            .ok_or_else(|| XkeyParseError::UnknownVersion(bc_network::NetworkConfigError::NoMatchingXkeyVersion(version)))?;
        if is_priv {
            return Err(XkeyParseError::WrongKeyKind(version, "private", "public"));
        }
        let public_key = RawPublicKey::from_slice(&data[45..78])?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let child_number = ChildNumber::from_raw(u32::from_be_bytes(data[9..13].try_into().unwrap()));
        Ok(ExtendedPubKey {
            network,
            purpose,
            depth: data[4],
            parent_fingerprint,
            child_number,
            chain_code,
            public_key,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn hex_decode(s: &str) -> Vec<u8> {
        (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap()).collect()
    }

    #[test]
    fn bip32_vector1_master_key() {
        let seed = hex_decode("000102030405060708090a0b0c0d0e0f");
        let net = registry().default_network();
        let master = ExtendedPrivKey::master(&net, Purpose::Legacy, &seed).unwrap();
        assert_eq!(
            master.to_serialized(),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
    }

    #[test]
    fn hardened_child_derivation_differs_from_unhardened() {
        let seed = hex_decode("000102030405060708090a0b0c0d0e0f");
        let net = registry().default_network();
        let master = ExtendedPrivKey::master(&net, Purpose::Legacy, &seed).unwrap();
        let hardened = master.derive_child(0 | HARDENED_BIT).unwrap();
        let normal = master.derive_child(0).unwrap();
        assert_ne!(hardened.secret_bytes(), normal.secret_bytes());
    }

    #[test]
    fn public_derivation_matches_private_projection() {
        let seed = hex_decode("000102030405060708090a0b0c0d0e0f");
        let net = registry().default_network();
        let master = ExtendedPrivKey::master(&net, Purpose::Legacy, &seed).unwrap();
        let child_priv = master.derive_child(0).unwrap();
        let child_pub_via_priv = child_priv.to_extended_pub_key();
        let child_pub_via_pub = master.to_extended_pub_key().derive_child(0).unwrap();
        assert_eq!(child_pub_via_priv.public_key, child_pub_via_pub.public_key);
    }

    #[test]
    fn extended_key_roundtrips_through_serialization() {
        let seed = hex_decode("000102030405060708090a0b0c0d0e0f");
        let net = registry().default_network();
        let master = ExtendedPrivKey::master(&net, Purpose::Legacy, &seed).unwrap();
        let serialized = master.to_serialized();
        let reparsed = ExtendedPrivKey::from_str(&serialized).unwrap();
        assert_eq!(reparsed, master);
    }

    #[test]
    fn public_key_rejects_hardened_child() {
        let seed = hex_decode("000102030405060708090a0b0c0d0e0f");
        let net = registry().default_network();
        let master = ExtendedPrivKey::master(&net, Purpose::Legacy, &seed).unwrap();
        let xpub = master.to_extended_pub_key();
        assert!(xpub.derive_child(HARDENED_BIT).is_err());
    }
}

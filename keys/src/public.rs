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

use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;

use amplify::hex::FromHex;
use bc_consensus::{CompressedPk, LegacyPk, PubkeyHash, WPubkeyHash};
use bc_network::{registry, Network};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use secp256k1::{Message, SECP256K1};

use crate::{message_hash, KeyParseError};

/// An EC public key: a secp256k1 curve point bound to one network,
/// remembering whether it should be serialized compressed (33 bytes) or
/// uncompressed (65 bytes).
#[derive(Clone)]
pub struct PublicKey {
    public_key: secp256k1::PublicKey,
    compressed: bool,
    network: Network,
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
            && self.compressed == other.compressed
            && self.network.id == other.network.id
    }
}
impl Eq for PublicKey {}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("network", &self.network.id)
            .field("compressed", &self.compressed)
            .field("pubkey", &self.to_hex())
            .finish()
    }
}

impl PublicKey {
    pub(crate) fn from_parts(public_key: secp256k1::PublicKey, compressed: bool, network: Network) -> Self {
        PublicKey {
            public_key,
            compressed,
            network,
        }
    }

    /// Parses a public key from its 33-byte compressed or 65-byte
    /// uncompressed serialization.
    pub fn from_slice(network: &Network, bytes: &[u8]) -> Result<Self, KeyParseError> {
        let compressed = match bytes.len() {
            33 => true,
            65 => false,
            len => return Err(KeyParseError::InvalidKeyLength(len)),
        };
        let public_key = secp256k1::PublicKey::from_slice(bytes)?;
        Ok(PublicKey {
            public_key,
            compressed,
            network: network.clone(),
        })
    }

    /// The network this key is bound to.
    pub fn network(&self) -> &Network { &self.network }

    /// Whether this key serializes compressed (33 bytes) or uncompressed
    /// (65 bytes).
    pub fn is_compressed(&self) -> bool { self.compressed }

    /// Serializes the key per [`PublicKey::is_compressed`].
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.public_key.serialize().to_vec()
        } else {
            self.public_key.serialize_uncompressed().to_vec()
        }
    }

    /// Lowercase hex of [`PublicKey::to_bytes`].
    pub fn to_hex(&self) -> String { self.to_bytes().iter().map(|b| format!("{b:02x}")).collect() }

    /// Projects onto `consensus`'s legacy pubkey newtype, which carries the
    /// same compressed/uncompressed distinction used by non-segwit script
    /// templates.
    pub fn to_legacy_pk(&self) -> LegacyPk {
        if self.compressed {
            LegacyPk::compressed(self.public_key)
        } else {
            LegacyPk::uncompressed(self.public_key)
        }
    }

    /// Projects onto the always-33-byte compressed newtype segwit
    /// templates require, or `None` if this key is uncompressed.
    pub fn to_compressed_pk(&self) -> Option<CompressedPk> {
        if !self.compressed {
            return None;
        }
        Some(
            CompressedPk::from_byte_array(self.public_key.serialize())
                .expect("secp256k1::PublicKey serializes to a valid compressed point"),
        )
    }

    /// `hash160` of the key as serialized per [`PublicKey::is_compressed`];
    /// the basis for P2PKH and P2SH-wrapped addresses.
    pub fn pubkey_hash(&self) -> PubkeyHash { PubkeyHash::from(self.to_legacy_pk()) }

    /// `hash160` of the *compressed* serialization, the basis for P2WPKH;
    /// `None` if this key is uncompressed (segwit requires compressed
    /// keys).
    pub fn wpubkey_hash(&self) -> Option<WPubkeyHash> { self.to_compressed_pk().map(WPubkeyHash::from) }

    /// The 32-byte x-only serialization (BIP340) used as a P2TR key-path
    /// output key. Taproot has no uncompressed/compressed distinction — the
    /// x coordinate is taken regardless of [`PublicKey::is_compressed`].
    pub fn x_only_bytes(&self) -> [u8; 32] { self.public_key.x_only_public_key().0.serialize() }

    /// Verifies a raw ECDSA signature over a 32-byte digest (e.g. a
    /// transaction sighash).
    pub fn verify_hash(&self, hash: [u8; 32], sig: &Signature) -> bool {
        let msg = Message::from_digest(hash);
        SECP256K1.verify_ecdsa(&msg, sig, &self.public_key).is_ok()
    }

    /// Verifies a Bitcoin "signed message" compact signature by recovering
    /// its signing key and checking it matches `self`.
    pub fn verify_message(&self, msg: &[u8], sig: &[u8]) -> bool {
        match recover_pubkey(msg, sig) {
            Ok(pk) => pk == self.public_key,
            Err(_) => false,
        }
    }
}

/// Recovers the raw curve point that produced a 65-byte compact
/// Bitcoin-signed-message signature over `msg`.
pub(crate) fn recover_pubkey(msg: &[u8], sig: &[u8]) -> Result<secp256k1::PublicKey, KeyParseError> {
    if sig.len() != 65 {
        return Err(KeyParseError::InvalidSignatureLength(sig.len()));
    }
    let header = sig[0];
    if !(27..=34).contains(&header) {
        return Err(KeyParseError::InvalidRecoveryHeader(header));
    }
    let recid_byte = ((header - 27) % 4) as i32;
    let recid = RecoveryId::from_i32(recid_byte)?;
    let recoverable = RecoverableSignature::from_compact(&sig[1..], recid)?;
    let digest = message_hash(msg);
    let message = Message::from_digest(digest);
    Ok(recoverable.recover_ecdsa(&message)?)
}

impl FromStr for PublicKey {
    type Err = KeyParseError;

    /// Parses a hex-encoded public key bound to the current default
    /// network.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = Vec::<u8>::from_hex(s)?;
        Self::from_slice(&registry().default_network(), &bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::PrivateKey;

    #[test]
    fn compressed_and_uncompressed_roundtrip() {
        let net = registry().default_network();
        let key = PrivateKey::from_slice(&net, &[0x44; 32], true).unwrap();
        let pk = key.public_key();
        assert_eq!(pk.to_bytes().len(), 33);
        let reparsed = PublicKey::from_slice(&net, &pk.to_bytes()).unwrap();
        assert_eq!(pk, reparsed);
    }

    #[test]
    fn wpubkey_hash_requires_compression() {
        let net = registry().default_network();
        let compressed = PrivateKey::from_slice(&net, &[0x55; 32], true).unwrap().public_key();
        assert!(compressed.wpubkey_hash().is_some());
        let uncompressed = PrivateKey::from_slice(&net, &[0x55; 32], false).unwrap().public_key();
        assert!(uncompressed.wpubkey_hash().is_none());
    }
}

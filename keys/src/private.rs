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
use bc_codecs::base58;
use bc_network::{registry, Network};
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, SecretKey, SECP256K1};

use crate::{message_hash, KeyParseError, PublicKey};

/// An EC private key: a 32-byte scalar strictly in `[1, n-1]`, bound to one
/// network, carrying the compressed-public-key flag it should project onto
/// its derived [`PublicKey`].
#[derive(Clone)]
pub struct PrivateKey {
    secret_key: SecretKey,
    compressed: bool,
    network: Network,
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.secret_key == other.secret_key
            && self.compressed == other.compressed
            && self.network.id == other.network.id
    }
}
impl Eq for PrivateKey {}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("network", &self.network.id)
            .field("compressed", &self.compressed)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl PrivateKey {
    /// Constructs a private key from a raw 32-byte scalar bound to
    /// `network`. Fails if the scalar is zero or not strictly less than the
    /// curve order, per `secp256k1`'s own validation.
    pub fn from_slice(network: &Network, bytes: &[u8], compressed: bool) -> Result<Self, KeyParseError> {
        if bytes.len() != 32 {
            return Err(KeyParseError::InvalidKeyLength(bytes.len()));
        }
        let secret_key = SecretKey::from_slice(bytes)?;
        Ok(PrivateKey {
            secret_key,
            compressed,
            network: network.clone(),
        })
    }

    /// Parses a Wallet Import Format string, resolving the key's network
    /// from its version byte via the process-wide [`bc_network`] registry.
    pub fn from_wif(wif: &str) -> Result<Self, KeyParseError> {
        let data = base58::decode_check(wif)?;
        let (version, rest) = data.split_first().ok_or(KeyParseError::InvalidWifLength(0))?;
        let network = registry().resolve_wif_version(*version)?;
        let (scalar, compressed) = match rest.len() {
            32 => (rest, false),
            33 if rest[32] == 0x01 => (&rest[..32], true),
            33 => return Err(KeyParseError::InvalidCompressionFlag(rest[32])),
            len => return Err(KeyParseError::InvalidWifLength(len + 1)),
        };
        let secret_key = SecretKey::from_slice(scalar)?;
        Ok(PrivateKey {
            secret_key,
            compressed,
            network,
        })
    }

    /// Serializes to Wallet Import Format: `version_byte ‖ scalar ‖ [0x01
    /// if compressed] ‖ checksum4`.
    pub fn to_wif(&self) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(self.network.wif_version);
        payload.extend_from_slice(&self.secret_key.secret_bytes());
        if self.compressed {
            payload.push(0x01);
        }
        base58::encode_check(&payload)
    }

    /// The network this key is bound to.
    pub fn network(&self) -> &Network { &self.network }

    /// Whether the derived [`PublicKey`] should be serialized compressed.
    pub fn is_compressed(&self) -> bool { self.compressed }

    /// The raw 32-byte scalar.
    pub fn secret_bytes(&self) -> [u8; 32] { self.secret_key.secret_bytes() }

    /// Derives the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        let public_key = secp256k1::PublicKey::from_secret_key(SECP256K1, &self.secret_key);
        PublicKey::from_parts(public_key, self.compressed, self.network.clone())
    }

    /// Signs a raw 32-byte digest — typically a transaction sighash — with
    /// RFC 6979 deterministic ECDSA. No ambient randomness is consulted.
    pub fn sign_hash(&self, hash: [u8; 32]) -> Signature {
        let msg = Message::from_digest(hash);
        SECP256K1.sign_ecdsa(&msg, &self.secret_key)
    }

    /// Signs `msg` per the Bitcoin "signed message" convention, returning
    /// the 65-byte `header ‖ r ‖ s` compact recoverable signature that lets
    /// [`PublicKey::verify_message`] recover the signer without being told
    /// which key signed.
    pub fn sign_message(&self, msg: &[u8]) -> Vec<u8> {
        let digest = message_hash(msg);
        let message = Message::from_digest(digest);
        let recoverable = SECP256K1.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recid, sig) = recoverable.serialize_compact();
        let header = 27 + recid.to_i32() as u8 + if self.compressed { 4 } else { 0 };
        let mut out = Vec::with_capacity(65);
        out.push(header);
        out.extend_from_slice(&sig);
        out
    }
}

impl FromStr for PrivateKey {
    type Err = KeyParseError;

    /// Accepts either a WIF string or a bare 32-byte hex scalar (bound to
    /// the current default network, compressed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(key) = Self::from_wif(s) {
            return Ok(key);
        }
        let bytes = Vec::<u8>::from_hex(s)?;
        Self::from_slice(&registry().default_network(), &bytes, true)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wif_vector_roundtrips_to_scalar() {
        let wif = "5JxsKGzCoJwaWEjQvfNqD4qPEoUQ696BUEq68Y68WQ2GNR6zrxW";
        let key = PrivateKey::from_wif(wif).unwrap();
        assert!(!key.is_compressed());
        assert_eq!(key.network().id, "bitcoin");
        assert_eq!(
            hex_of(&key.secret_bytes()),
            "972e85e7e3345cb7e6a5f812aa5f5bea82005e3ded7b32d9d56f5ab2504f1648"
        );
        assert_eq!(key.to_wif(), wif);
    }

    #[test]
    fn sign_hash_is_deterministic() {
        let net = registry().default_network();
        let key = PrivateKey::from_slice(&net, &[0x11; 32], true).unwrap();
        let hash = [0x22; 32];
        assert_eq!(key.sign_hash(hash), key.sign_hash(hash));
    }

    #[test]
    fn signed_message_verifies_against_own_public_key() {
        let net = registry().default_network();
        let key = PrivateKey::from_slice(&net, &[0x33; 32], true).unwrap();
        let sig = key.sign_message(b"hello world");
        assert_eq!(sig.len(), 65);
        assert!(key.public_key().verify_message(b"hello world", &sig));
        assert!(!key.public_key().verify_message(b"goodbye world", &sig));
    }

    fn hex_of(bytes: &[u8]) -> String { bytes.iter().map(|b| format!("{b:02x}")).collect() }
}

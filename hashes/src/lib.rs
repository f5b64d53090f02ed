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

//! Hash primitives and key-derivation functions shared by the rest of the
//! workspace: `hash160`, `hash256`, HMAC-SHA512, PBKDF2-HMAC-SHA512, and the
//! NFKD normalization step BIP39 requires before deriving a seed.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use unicode_normalization::UnicodeNormalization;

/// `RIPEMD160(SHA256(data))`, the hash used for pubkey and script hashes.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    out
}

/// `SHA256(SHA256(data))`, the hash used for txids and most Bitcoin
/// checksums.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// Single round of plain SHA256, exposed for callers (e.g. Base58Check) that
/// need the intermediate digest rather than the doubled one.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Single round of plain RIPEMD160, exposed for `OP_RIPEMD160`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let digest = Ripemd160::digest(data);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

/// HMAC-SHA512 as used by BIP32 (`I = HMAC-SHA512(key, msg)`) and BIP85.
pub fn hmac_sha512(key: &[u8], msg: &[u8]) -> [u8; 64] {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(msg);
    let result = mac.finalize().into_bytes();
    let mut out = [0u8; 64];
    out.copy_from_slice(&result);
    out
}

/// `PBKDF2-HMAC-SHA512` with the iteration count and output length BIP39
/// mandates for mnemonic-to-seed derivation.
pub fn pbkdf2_hmac_sha512(password: &[u8], salt: &[u8], iterations: u32, dk_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; dk_len];
    pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out);
    out
}

/// BIP39 mnemonic-to-seed derivation: `PBKDF2-HMAC-SHA512(password =
/// "mnemonic" + passphrase, salt = NFKD(mnemonic), iterations = 2048, dkLen =
/// 64)`. Both the mnemonic and the passphrase are Unicode-NFKD normalized
/// before being UTF-8 encoded, per BIP39.
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> [u8; 64] {
    let salt: String = mnemonic.nfkd().collect();
    let mut password = String::from("mnemonic");
    password.extend(passphrase.nfkd());
    let derived = pbkdf2_hmac_sha512(password.as_bytes(), salt.as_bytes(), 2048, 64);
    let mut out = [0u8; 64];
    out.copy_from_slice(&derived);
    out
}

/// NFKD-normalizes a string, the form BIP39 requires for mnemonic words and
/// passphrases alike.
pub fn nfkd(s: &str) -> String { s.nfkd().collect() }

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash160_known_vector() {
        // hash160("") = RIPEMD160(SHA256(""))
        let h = hash160(b"");
        assert_eq!(hex_of(&h), "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb");
    }

    #[test]
    fn hash256_known_vector() {
        let h = hash256(b"");
        assert_eq!(hex_of(&h), "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456");
    }

    #[test]
    fn mnemonic_to_seed_bip39_vector() {
        let mnemonic = "\u{308F}\u{308C}\u{308B}\u{3000}\
            \u{3044}\u{3093}\u{304B}\u{3093}\u{3000}\
            \u{3089}\u{3044}\u{3046}";
        let passphrase = "\u{3350}\u{30AC}\u{30D0}\u{30F4}\u{30A1}\u{3071}\
            \u{3070}\u{3050}\u{309E}\u{3061}\u{3062}\u{5341}\u{4EBA}\u{5341}\u{8272}";
        let seed = mnemonic_to_seed(mnemonic, passphrase);
        assert_eq!(seed.len(), 64);
        assert_eq!(hex_of(&seed)[..8], *"a44ba705");
    }

    fn hex_of(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

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

use bc_hashes::hmac_sha512;

use crate::mnemonic::entropy_to_mnemonic;
use crate::{Bip85Error, ChildNumber, DerivationPath, ExtendedPrivKey, PathParseError};

const BIP85_PURPOSE: u32 = 83696968;
const ENTROPY_KEY: &[u8] = b"bip-entropy-from-k";

/// Derives up to 64 bytes of BIP85 application entropy along `path` from
/// `master`: derive the child key, then
/// `HMAC-SHA512("bip-entropy-from-k", ser256(k_child))`, truncated to
/// `length` bytes.
pub fn derive_entropy(master: &ExtendedPrivKey, path: &DerivationPath, length: usize) -> Result<Vec<u8>, Bip85Error> {
    let child = master.derive_path(path.as_slice())?;
    let entropy = hmac_sha512(ENTROPY_KEY, &child.secret_bytes());
    Ok(entropy[..length.min(64)].to_vec())
}

/// Derives a BIP39 English mnemonic per BIP85 application `39'`, at path
/// `m/83696968'/39'/0'/{words}'/{index}'`. `words` must be 12, 18, or 24.
pub fn derive_mnemonic(master: &ExtendedPrivKey, words: u32, index: u32) -> Result<String, Bip85Error> {
    let entropy_bytes = match words {
        12 => 16,
        18 => 24,
        24 => 32,
        other => return Err(Bip85Error::UnsupportedWordCount(other as usize)),
    };

    let path = bip85_path(39, 0, words, index).expect("literal path segments are always valid");
    let entropy = derive_entropy(master, &path, entropy_bytes)?;
    Ok(entropy_to_mnemonic(&entropy).expect("entropy_bytes is always a valid BIP39 length"))
}

fn bip85_path(application: u32, language: u32, param: u32, index: u32) -> Result<DerivationPath, PathParseError> {
    Ok(DerivationPath::from_segments(vec![
        ChildNumber::hardened(BIP85_PURPOSE)?,
        ChildNumber::hardened(application)?,
        ChildNumber::hardened(language)?,
        ChildNumber::hardened(param)?,
        ChildNumber::hardened(index)?,
    ]))
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use bc_network::{registry, Purpose};

    use super::*;

    fn hex_decode(s: &str) -> Vec<u8> {
        (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap()).collect()
    }

    fn hex_encode(bytes: &[u8]) -> String { bytes.iter().map(|b| format!("{b:02x}")).collect() }

    #[test]
    fn bip85_test_vector_entropy_prefix() {
        let _ = Purpose::Legacy;
        let xprv = "xprv9s21ZrQH143K2LBWUUQRFXhucrQqBpKdRRxNVq2zBqsx8HVqFk2uYo8kmbaLLHRdqtQpUm98uKfu3vca1LqdGhUtyoFnCNkfmXRyPXLjbKb";
        let master = ExtendedPrivKey::from_str(xprv).unwrap();
        let path = DerivationPath::from_str("m/83696968'/0'/0'").unwrap();
        let entropy = derive_entropy(&master, &path, 64).unwrap();
        assert!(hex_encode(&entropy).starts_with("efecfbccffea3132"));
    }

    #[test]
    fn mnemonic_application_yields_requested_word_count() {
        let seed = hex_decode("000102030405060708090a0b0c0d0e0f");
        let net = registry().default_network();
        let master = ExtendedPrivKey::master(&net, Purpose::Legacy, &seed).unwrap();
        let phrase = derive_mnemonic(&master, 12, 0).unwrap();
        assert_eq!(phrase.split_whitespace().count(), 12);
    }

    #[test]
    fn unsupported_word_count_rejected() {
        let seed = hex_decode("000102030405060708090a0b0c0d0e0f");
        let net = registry().default_network();
        let master = ExtendedPrivKey::master(&net, Purpose::Legacy, &seed).unwrap();
        assert!(derive_mnemonic(&master, 15, 0).is_err());
    }
}

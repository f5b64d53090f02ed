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

use bc_hashes::hash256;

/// The 58-character Base58 alphabet Bitcoin uses: visually ambiguous
/// characters `0`, `O`, `I`, `l` are excluded.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum Base58Error {
    /// invalid character {0:#04x} found at position {1} of a base58 string.
    InputFormat(u8, usize),

    /// base58 string is shorter than its 4-byte checksum.
    ChecksumTooShort,

    /// base58 checksum does not match the payload.
    InputChecksum,
}

fn char_index(c: u8) -> Option<u8> { ALPHABET.iter().position(|&a| a == c).map(|i| i as u8) }

/// Encodes a byte string using plain Base58 (no checksum).
pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();

    // log(256) / log(58), rounded up, plus one for headroom.
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for &byte in data {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat('1').take(zeros));
    out.extend(digits.iter().rev().map(|&d| ALPHABET[d as usize] as char));
    out
}

/// Decodes a plain Base58 string (no checksum) back into bytes.
pub fn decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    let zeros = s.bytes().take_while(|&b| b == b'1').count();

    let mut bytes: Vec<u8> = Vec::with_capacity(s.len() * 733 / 1000 + 1);
    for (pos, c) in s.bytes().enumerate() {
        let value = char_index(c).ok_or(Base58Error::InputFormat(c, pos))?;
        let mut carry = value as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

/// Encodes `payload ‖ first_4(hash256(payload))` as Base58 (Base58Check).
pub fn encode_check(payload: &[u8]) -> String {
    let checksum = hash256(payload);
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum[..4]);
    encode(&data)
}

/// Decodes a Base58Check string, validating and stripping the 4-byte
/// checksum.
pub fn decode_check(s: &str) -> Result<Vec<u8>, Base58Error> {
    let data = decode(s)?;
    if data.len() < 4 {
        return Err(Base58Error::ChecksumTooShort);
    }
    let (payload, checksum) = data.split_at(data.len() - 4);
    let expected = hash256(payload);
    if &expected[..4] != checksum {
        return Err(Base58Error::InputChecksum);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip_plain() {
        for data in [&b""[..], b"\x00", b"\x00\x00\x01", b"hello world", b"\xff\xfe\x00"] {
            let encoded = encode(data);
            assert_eq!(decode(&encoded).unwrap(), data);
        }
    }

    #[test]
    fn leading_zeros_preserved() {
        let data = [0u8, 0, 0, 1, 2, 3];
        let encoded = encode(&data);
        assert!(encoded.starts_with("111"));
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn check_roundtrip() {
        let payload = vec![0x00u8; 21];
        let encoded = encode_check(&payload);
        assert_eq!(decode_check(&encoded).unwrap(), payload);
    }

    #[test]
    fn check_detects_corruption() {
        let payload = b"some payload bytes".to_vec();
        let mut encoded = encode_check(&payload).into_bytes();
        let last = encoded.len() - 1;
        encoded[last] = if encoded[last] == b'1' { b'2' } else { b'1' };
        let encoded = String::from_utf8(encoded).unwrap();
        assert!(matches!(decode_check(&encoded), Err(Base58Error::InputChecksum) | Err(Base58Error::InputFormat(..))));
    }

    #[test]
    fn wif_vector() {
        let wif = "5JxsKGzCoJwaWEjQvfNqD4qPEoUQ696BUEq68Y68WQ2GNR6zrxW";
        let decoded = decode_check(wif).unwrap();
        // version(1) || scalar(32), uncompressed mainnet WIF
        assert_eq!(decoded.len(), 33);
        assert_eq!(decoded[0], 0x80);
        assert_eq!(
            hex::encode(&decoded[1..]),
            "972e85e7e3345cb7e6a5f812aa5f5bea82005e3ded7b32d9d56f5ab2504f1648"
        );
    }
}

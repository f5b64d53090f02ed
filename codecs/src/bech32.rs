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

//! Bech32 (BIP173) and Bech32m (BIP350) encoding. Both share the same
//! polymod/HRP-expansion machinery; they differ only in the XOR constant
//! folded into the checksum.

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mu7l";
const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

/// Checksum constant XORed into the final polymod. Bech32 uses `1`; Bech32m
/// uses `0x2bc830a3` (BIP350).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Variant {
    Bech32,
    Bech32m,
}

impl Variant {
    const fn const_xor(self) -> u32 {
        match self {
            Variant::Bech32 => 1,
            Variant::Bech32m => 0x2bc830a3,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum Bech32Error {
    /// bech32 string exceeds the maximum length of 90 characters.
    TooLong,

    /// bech32 human-readable part must be between 1 and 83 characters.
    InvalidHrpLength,

    /// bech32 human-readable part contains a character outside the
    /// printable ASCII range 0x21..0x7e.
    InvalidHrpChar(char),

    /// bech32 string mixes upper- and lower-case characters.
    MixedCase,

    /// bech32 string is missing the '1' separator between HRP and data.
    MissingSeparator,

    /// bech32 data part must contain at least 6 characters (the checksum).
    DataTooShort,

    /// invalid bech32 data character {0:?}.
    InvalidDataChar(char),

    /// bech32 checksum does not match the expected value.
    InvalidChecksum,

    /// bech32 string uses the wrong variant (bech32 vs bech32m) checksum.
    WrongVariant,

    /// non-zero padding bits when converting between bit widths.
    InvalidPadding,
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = (chk & 0x1ff_ffff) << 5 ^ (v as u32);
        for i in 0..5 {
            if (top >> i) & 1 == 1 {
                chk ^= GENERATOR[i];
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut v: Vec<u8> = hrp.bytes().map(|b| b >> 5).collect();
    v.push(0);
    v.extend(hrp.bytes().map(|b| b & 31));
    v
}

fn create_checksum(hrp: &str, data: &[u8], variant: Variant) -> [u8; 6] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; 6]);
    let poly = polymod(&values) ^ variant.const_xor();
    let mut out = [0u8; 6];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = ((poly >> (5 * (5 - i))) & 31) as u8;
    }
    out
}

fn verify_checksum(hrp: &str, data: &[u8]) -> Option<Variant> {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    match polymod(&values) {
        1 => Some(Variant::Bech32),
        0x2bc830a3 => Some(Variant::Bech32m),
        _ => None,
    }
}

fn validate_hrp(hrp: &str) -> Result<(), Bech32Error> {
    if hrp.is_empty() || hrp.len() > 83 {
        return Err(Bech32Error::InvalidHrpLength);
    }
    let mut saw_lower = false;
    let mut saw_upper = false;
    for c in hrp.chars() {
        let b = c as u32;
        if !(0x21..=0x7e).contains(&b) {
            return Err(Bech32Error::InvalidHrpChar(c));
        }
        if c.is_ascii_lowercase() {
            saw_lower = true;
        }
        if c.is_ascii_uppercase() {
            saw_upper = true;
        }
    }
    if saw_lower && saw_upper {
        return Err(Bech32Error::MixedCase);
    }
    Ok(())
}

/// Encodes `hrp` and 5-bit `data` values (already converted from the
/// caller's byte payload) as a Bech32 or Bech32m string.
pub fn encode(hrp: &str, data: &[u8], variant: Variant) -> Result<String, Bech32Error> {
    validate_hrp(hrp)?;
    let checksum = create_checksum(hrp, data, variant);
    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + 6);
    out.push_str(&hrp.to_lowercase());
    out.push('1');
    for &d in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[d as usize] as char);
    }
    Ok(out)
}

/// Decodes a Bech32 or Bech32m string into its HRP, 5-bit data values, and
/// the variant whose checksum matched.
pub fn decode(s: &str) -> Result<(String, Vec<u8>, Variant), Bech32Error> {
    if s.len() > 90 {
        return Err(Bech32Error::TooLong);
    }
    let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Bech32Error::MixedCase);
    }
    let lowered = s.to_lowercase();

    let sep = lowered.rfind('1').ok_or(Bech32Error::MissingSeparator)?;
    let (hrp, rest) = lowered.split_at(sep);
    let data_part = &rest[1..];
    validate_hrp(hrp)?;
    if data_part.len() < 6 {
        return Err(Bech32Error::DataTooShort);
    }

    let mut data = Vec::with_capacity(data_part.len());
    for c in data_part.chars() {
        let pos = CHARSET.iter().position(|&x| x as char == c).ok_or(Bech32Error::InvalidDataChar(c))?;
        data.push(pos as u8);
    }

    let variant = verify_checksum(hrp, &data).ok_or(Bech32Error::InvalidChecksum)?;
    let payload_len = data.len() - 6;
    data.truncate(payload_len);
    Ok((hrp.to_string(), data, variant))
}

/// Re-groups an 8-bit byte slice into 5-bit groups (MSB-first), the packing
/// Bech32 data parts use.
pub fn convert_bits_8_to_5(data: &[u8]) -> Vec<u8> {
    convert_bits(data, 8, 5, true).expect("8->5 conversion with padding cannot fail")
}

/// Re-groups 5-bit values back into 8-bit bytes (MSB-first). Fails if the
/// trailing padding bits are non-zero or if there are too many padding bits.
pub fn convert_bits_5_to_8(data: &[u8]) -> Result<Vec<u8>, Bech32Error> {
    convert_bits(data, 5, 8, false)
}

/// Generic big-endian bit-width conversion, shared by the 8<->5 helpers
/// above (BIP173 "general power-of-2 base conversion").
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, Bech32Error> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    let max_acc = (1u32 << (from + to - 1)) - 1;
    for &value in data {
        if (value as u32) >> from != 0 {
            return Err(Bech32Error::InvalidDataChar(value as char));
        }
        acc = ((acc << from) | value as u32) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & ((1 << to) - 1)) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & ((1 << to) - 1)) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & ((1 << to) - 1)) != 0 {
        return Err(Bech32Error::InvalidPadding);
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bip173_vector() {
        let hrp = "bc";
        let program: [u8; 20] =
            hex_decode("751e76e8199196d454941c45d1b3a323f1433bd6")[..20].try_into().unwrap();
        let mut data = vec![0u8];
        data.extend(convert_bits_8_to_5(&program));
        let addr = encode(hrp, &data, Variant::Bech32).unwrap();
        assert_eq!(addr.to_uppercase(), "BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4");

        let (decoded_hrp, decoded_data, variant) =
            decode("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4").unwrap();
        assert_eq!(decoded_hrp, "bc");
        assert_eq!(variant, Variant::Bech32);
        assert_eq!(decoded_data[0], 0);
        let decoded_program = convert_bits_5_to_8(&decoded_data[1..]).unwrap();
        assert_eq!(decoded_program, program);
    }

    #[test]
    fn corrupt_checksum_is_rejected() {
        let addr = "BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4".to_string();
        let mut bytes = addr.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'4' { b'5' } else { b'4' };
        let addr = String::from_utf8(bytes).unwrap();
        assert!(decode(&addr).is_err());
    }

    // minimal local hex decoder to keep this module dependency-free of `hex`
    // for internal tests (the crate itself re-exports `hex` for callers).
    fn hex_decode(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }
}

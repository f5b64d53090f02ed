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

//! Byte/format codecs: hex, Base64, Base58(Check), Bech32/Bech32m, and the
//! `Format` descriptor union that lets a bytestring be accepted in any of
//! those representations.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

#[macro_use]
extern crate amplify;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

pub mod base58;
pub mod bech32;

pub use base58::Base58Error;
pub use bech32::{Bech32Error, Variant as Bech32Variant};

/// Tag identifying which textual representation a bytestring is given in;
/// a `(format_tag, string)` pair is accepted anywhere a bytestring is
/// accepted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(lowercase)]
pub enum Format {
    Bytes,
    Hex,
    Base58,
    Base64,
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum FormatError {
    /// invalid hex string. Details: {0}
    #[from]
    Hex(hex::FromHexError),

    /// invalid base64 string. Details: {0}
    #[from]
    Base64(base64::DecodeError),

    /// invalid base58 string. Details: {0}
    #[from]
    Base58(Base58Error),

    /// the `bytes` format cannot decode a textual representation; supply
    /// raw bytes directly instead.
    BytesFormatIsNotTextual,
}

/// Encodes raw bytes using the requested textual [`Format`].
///
/// `Format::Bytes` is rejected: it denotes bytes are already in their
/// native form and have no textual encoding to produce.
pub fn to_format(format: Format, data: &[u8]) -> Result<String, FormatError> {
    match format {
        Format::Bytes => Err(FormatError::BytesFormatIsNotTextual),
        Format::Hex => Ok(hex::encode(data)),
        Format::Base58 => Ok(base58::encode(data)),
        Format::Base64 => Ok(BASE64_STANDARD.encode(data)),
    }
}

/// Decodes a textual representation back into bytes, per the requested
/// [`Format`]. `Format::Bytes` treats `s` as already containing raw Latin-1
/// bytes (one byte per `char`), which is how callers pass a bytestring
/// through the same interface without encoding it first.
pub fn from_format(format: Format, s: &str) -> Result<Vec<u8>, FormatError> {
    match format {
        Format::Bytes => Ok(s.bytes().collect()),
        Format::Hex => Ok(hex::decode(s)?),
        Format::Base58 => Ok(base58::decode(s)?),
        Format::Base64 => Ok(BASE64_STANDARD.decode(s)?),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip_every_format() {
        let data = b"the quick brown fox".to_vec();
        for format in [Format::Hex, Format::Base58, Format::Base64] {
            let encoded = to_format(format, &data).unwrap();
            let decoded = from_format(format, &encoded).unwrap();
            assert_eq!(decoded, data);
        }
    }
}

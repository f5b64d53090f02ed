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

use amplify::hex;
use bc_address::AddressParseError;
use bc_codecs::base58::Base58Error;
use bc_network::NetworkConfigError;

/// Everything that can go wrong parsing or constructing a key.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum KeyParseError {
    /// invalid hex encoding. Details: {0}
    #[from]
    Hex(hex::Error),

    /// invalid base58 encoding. Details: {0}
    #[from]
    Base58(Base58Error),

    /// invalid secp256k1 key or signature material. Details: {0}
    #[from]
    Secp256k1(secp256k1::Error),

    /// key byte string must be exactly 32 bytes, found {0}.
    InvalidKeyLength(usize),

    /// WIF payload has unexpected length {0} (expected 33 or 34 bytes).
    InvalidWifLength(usize),

    /// WIF compression flag byte must be 0x01, found {0:#04x}.
    InvalidCompressionFlag(u8),

    /// recoverable signature must be 65 bytes, found {0}.
    InvalidSignatureLength(usize),

    /// recoverable signature header byte {0:#04x} is out of the valid
    /// 27..=34 range.
    InvalidRecoveryHeader(u8),

    /// {0}
    #[from]
    Network(NetworkConfigError),
}

/// Everything that can go wrong projecting a [`crate::PublicKey`] onto an
/// address string.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum AddressGenerateError {
    /// compat/segwit/taproot addresses require a compressed public key.
    UncompressedKey,

    /// {0}
    #[from]
    Address(AddressParseError),
}

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

use bc_codecs::base58::Base58Error;
use bc_network::NetworkConfigError;

/// Errors constructing or deriving a BIP39 mnemonic.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum MnemonicError {
    /// entropy length must be one of 128, 160, 192, 224, 256 bits, found {0}.
    InvalidEntropyLength(usize),

    /// mnemonic must have 12, 15, 18, 21, or 24 words, found {0}.
    InvalidWordCount(usize),

    /// word {1:?} at position {0} is not in the English wordlist.
    UnknownWord(usize, String),

    /// checksum bits do not match the recomputed checksum of the entropy.
    InvalidChecksum,
}

/// Errors deriving within the BIP32 tree.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum DeriveError {
    /// derived private scalar is zero or exceeds the curve order; the
    /// caller should retry with the next child index.
    InvalidChildKey,

    /// derived public point is the point at infinity; the caller should
    /// retry with the next child index.
    InvalidChildPoint,

    /// hardened derivation ({0:#010x}) was requested from an extended
    /// public key, which only supports non-hardened children.
    HardenedFromPublic(u32),

    /// extended key is already at the maximum BIP32 depth (255).
    DepthExhausted,

    /// {0}
    #[from]
    Secp256k1(secp256k1::Error),
}

/// Errors parsing a serialized (Base58Check) extended key.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum XkeyParseError {
    /// {0}
    #[from]
    Base58(Base58Error),

    /// serialized extended key must be exactly 78 bytes, found {0}.
    InvalidLength(usize),

    /// {0}
    #[from]
    UnknownVersion(NetworkConfigError),

    /// version prefix {0:#010x} belongs to a {1}, not a {2}.
    WrongKeyKind(u32, &'static str, &'static str),

    /// {0}
    #[from]
    Secp256k1(secp256k1::Error),
}

/// Errors parsing or applying a derivation path string.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum PathParseError {
    /// derivation path must start with 'm'.
    MissingRoot,

    /// empty path segment.
    EmptySegment,

    /// segment {0:?} is not a valid child index.
    InvalidSegment(String),

    /// child index {0} is out of the unhardened range (must be below
    /// 2^31).
    IndexOutOfRange(u32),
}

/// Errors deriving BIP85 application entropy.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum Bip85Error {
    /// {0}
    #[from]
    Derive(DeriveError),

    /// BIP85 mnemonic application only supports 12, 18, or 24 words,
    /// requested {0}.
    UnsupportedWordCount(usize),
}

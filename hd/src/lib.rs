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

//! Hierarchical deterministic wallets: BIP39 mnemonic phrases, BIP32
//! extended keys, BIP44 account paths, and BIP85 deterministic entropy.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod bip32;
mod bip85;
mod error;
mod mnemonic;
mod path;
mod wordlist;

pub use bip32::{ExtendedPrivKey, ExtendedPubKey};
pub use bip85::{derive_entropy, derive_mnemonic};
pub use error::{Bip85Error, DeriveError, MnemonicError, PathParseError, XkeyParseError};
pub use mnemonic::{entropy_to_mnemonic, mnemonic_to_entropy, Mnemonic};
pub use path::{ChildNumber, DerivationPath, HARDENED_BIT};
pub use wordlist::ENGLISH as english_wordlist;

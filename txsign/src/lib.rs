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

//! Transaction signing and verification on top of `bc_consensus` and
//! `bc_scriptexec`: a UTXO registry, legacy/BIP143 sighash preimages, a
//! per-template signer (including incremental multisig splicing), a
//! script-driven verifier, and the fee/weight/RBF surface wallets drive a
//! transaction through end to end.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

#[macro_use]
extern crate amplify;

mod checker;
mod error;
mod ext;
mod sighash;
mod signer;
mod utxo;
mod verifier;

pub use checker::TxChecker;
pub use error::{Error, ScriptPhase, VerifyWarning};
pub use ext::TxExt;
pub use sighash::{legacy_sighash, segwit_v0_sighash, tagged_hash, taproot_key_path_sighash};
pub use signer::{
    finalize_bare_multisig, finalize_p2sh_multisig, finalize_p2wsh_multisig, read_pushes, sign_nested_p2wpkh,
    sign_p2pkh, sign_p2wpkh, MultisigTemplate, PartialMultisig,
};
pub use utxo::{Utxo, UtxoRegistry};
pub use verifier::verify_transaction;

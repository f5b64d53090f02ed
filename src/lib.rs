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

//! Bitcoin wallet cryptographic primitives: consensus data types, hashing
//! and key-derivation functions, Base58/Bech32 codecs, a chain parameter
//! registry, key management, address encoding, a Script classifier and
//! interpreter, HD (BIP32/39/44/85) derivation, and transaction signing and
//! verification.
//!
//! This crate is a re-export surface over the workspace's focused
//! sub-crates; the actual implementations live there.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

#[macro_use]
extern crate amplify;

mod error;

pub use error::Error;

pub use bc_address as address;
pub use bc_codecs as codecs;
pub use bc_consensus as consensus;
pub use bc_hashes as hashes;
pub use bc_hd as hd;
pub use bc_keys as keys;
pub use bc_network as network;
pub use bc_script as script;
pub use bc_scriptexec as scriptexec;
pub use bc_txsign as txsign;

pub use bc_address::{Address, AddressParseError, AddressType};
pub use bc_consensus::{
    Chain, ChainParseError, LegacySig, LockTime, OpCode, Outpoint, RedeemScript, RelativeLockTime, Sats,
    ScriptBytes, ScriptPubkey, SegwitError, SeqNo, SigError, SigScript, SighashFlag, SighashType, Tx, TxIn,
    TxOut, TxVer, Txid, VarInt, Vout, Weight, Witness, WitnessProgram, WitnessScript, WitnessVer, Wtxid,
};
pub use bc_hd::{
    derive_entropy, derive_mnemonic, entropy_to_mnemonic, mnemonic_to_entropy, ChildNumber, DerivationPath,
    ExtendedPrivKey, ExtendedPubKey, Mnemonic,
};
pub use bc_keys::{AddressGenerateError, KeyParseError, PrivateKey, PublicKey, PublicKeyAddressExt};
pub use bc_network::{registry, registry_mut, Network, NetworkConfigError, Purpose};
pub use bc_script::{classify, from_standard, ScriptClass, StandardTemplate};
pub use bc_scriptexec::{run, ExecError, NullChecker, Runner, SignatureChecker, Stack};
pub use bc_txsign::{
    finalize_bare_multisig, finalize_p2sh_multisig, finalize_p2wsh_multisig, legacy_sighash, read_pushes,
    segwit_v0_sighash, sign_nested_p2wpkh, sign_p2pkh, sign_p2wpkh, tagged_hash, taproot_key_path_sighash,
    verify_transaction, Error as TxSignError, MultisigTemplate, PartialMultisig, ScriptPhase, TxChecker, TxExt, Utxo,
    UtxoRegistry, VerifyWarning,
};

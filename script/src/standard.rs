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

use bc_consensus::{PubkeyHash, ScriptHash, ScriptPubkey, WPubkeyHash, WScriptHash};

/// A standard output template together with the argument it is built from,
/// for use with [`from_standard`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum StandardTemplate {
    P2pk(Vec<u8>),
    P2pkh(PubkeyHash),
    P2sh(ScriptHash),
    P2wpkh(WPubkeyHash),
    P2wsh(WScriptHash),
    P2tr([u8; 32]),
    OpReturn(Vec<u8>),
}

/// Builds a `scriptPubkey` from a [`StandardTemplate`], mirroring
/// `scriptPubkey`'s own `p2pk`/`p2pkh`/... constructors one level up.
pub fn from_standard(template: StandardTemplate) -> ScriptPubkey {
    match template {
        StandardTemplate::P2pk(pubkey_bytes) => ScriptPubkey::p2pk(&pubkey_bytes),
        StandardTemplate::P2pkh(hash) => ScriptPubkey::p2pkh(hash),
        StandardTemplate::P2sh(hash) => ScriptPubkey::p2sh(hash),
        StandardTemplate::P2wpkh(hash) => ScriptPubkey::p2wpkh(hash),
        StandardTemplate::P2wsh(hash) => ScriptPubkey::p2wsh(hash),
        StandardTemplate::P2tr(output_key) => ScriptPubkey::p2tr(output_key),
        StandardTemplate::OpReturn(data) => ScriptPubkey::op_return(&data),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_p2pkh() {
        let script = from_standard(StandardTemplate::P2pkh(PubkeyHash::from([0x66u8; 20])));
        assert!(script.is_p2pkh());
    }

    #[test]
    fn builds_p2tr() {
        let script = from_standard(StandardTemplate::P2tr([0x77u8; 32]));
        assert!(script.is_p2tr());
    }
}

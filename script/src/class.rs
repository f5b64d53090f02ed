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

use bc_consensus::ScriptPubkey;

/// Which standard output template a `scriptPubkey` matches, if any.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(lowercase)]
pub enum ScriptClass {
    P2pk,
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
    P2ms,
    OpReturn,
    NonStandard,
}

/// Classifies a `scriptPubkey` per the standard output templates, checked in
/// the order the reference client itself uses (most specific shapes first).
pub fn classify(script: &ScriptPubkey) -> ScriptClass {
    if script.is_p2pkh() {
        ScriptClass::P2pkh
    } else if script.is_p2sh() {
        ScriptClass::P2sh
    } else if script.is_p2wpkh() {
        ScriptClass::P2wpkh
    } else if script.is_p2wsh() {
        ScriptClass::P2wsh
    } else if script.is_p2tr() {
        ScriptClass::P2tr
    } else if script.is_p2pk() {
        ScriptClass::P2pk
    } else if script.is_p2ms() {
        ScriptClass::P2ms
    } else if script.is_op_return() {
        ScriptClass::OpReturn
    } else {
        ScriptClass::NonStandard
    }
}

#[cfg(test)]
mod test {
    use bc_consensus::ScriptPubkey;

    use super::*;

    #[test]
    fn classifies_p2pkh() {
        let script = ScriptPubkey::p2pkh([0x11u8; 20]);
        assert_eq!(classify(&script), ScriptClass::P2pkh);
    }

    #[test]
    fn classifies_p2wsh() {
        let script = ScriptPubkey::p2wsh([0x22u8; 32]);
        assert_eq!(classify(&script), ScriptClass::P2wsh);
    }

    #[test]
    fn classifies_op_return() {
        let script = ScriptPubkey::op_return(b"hello");
        assert_eq!(classify(&script), ScriptClass::OpReturn);
    }

    #[test]
    fn empty_script_is_non_standard() {
        assert_eq!(classify(&ScriptPubkey::new()), ScriptClass::NonStandard);
    }
}

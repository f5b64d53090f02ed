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

//! Standard `scriptPubkey` template recognition/construction and the
//! script-to-address projection that is the inverse of those templates.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod class;
mod standard;

pub use class::{classify, ScriptClass};
use bc_address::Address;
use bc_consensus::{PubkeyHash, ScriptHash, ScriptPubkey, WitnessProgram, WitnessVer};
use bc_network::Network;
pub use standard::{from_standard, StandardTemplate};

/// Script-to-address projection: the inverse of the standard-template
/// constructors on [`ScriptPubkey`], parameterized by the network whose
/// version bytes/HRP the address should use.
pub trait ScriptPubkeyExt {
    /// Legacy address for a P2PKH or P2SH `scriptPubkey`, `None` for any
    /// other shape.
    fn get_legacy_address(&self, network: &Network) -> Option<Address>;

    /// P2SH-wrapped ("compat") segwit address for a native-segwit
    /// `scriptPubkey`, `None` for any other shape. The returned address is
    /// the P2SH address of a redeem script that simply pushes this
    /// `scriptPubkey`'s witness program.
    fn get_compat_address(&self, network: &Network) -> Option<Address>;

    /// Native segwit address (bech32/bech32m) for a P2WPKH/P2WSH/P2TR
    /// `scriptPubkey`, `None` for any other shape or if the network does
    /// not support segwit.
    fn get_segwit_address(&self, network: &Network) -> Option<Address>;
}

impl ScriptPubkeyExt for ScriptPubkey {
    fn get_legacy_address(&self, network: &Network) -> Option<Address> {
        let bytes = self.as_script_bytes().as_slice();
        if self.is_p2pkh() {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&bytes[3..23]);
            Some(Address::p2pkh(PubkeyHash::from(hash), network.clone()))
        } else if self.is_p2sh() {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&bytes[2..22]);
            Some(Address::p2sh(ScriptHash::from(hash), network.clone()))
        } else {
            None
        }
    }

    fn get_compat_address(&self, network: &Network) -> Option<Address> {
        witness_program(self)?;
        let redeem_script = self.as_script_bytes().as_slice();
        let hash = bc_hashes::hash160(redeem_script);
        Some(Address::p2sh(ScriptHash::from(hash), network.clone()))
    }

    fn get_segwit_address(&self, network: &Network) -> Option<Address> {
        let program = witness_program(self)?;
        Address::segwit(program, network.clone()).ok()
    }
}

/// Recovers the [`WitnessProgram`] a native-segwit `scriptPubkey` encodes,
/// `None` if it is not one of the recognized witness shapes.
fn witness_program(script: &ScriptPubkey) -> Option<WitnessProgram> {
    if script.is_p2wpkh() {
        let bytes = script.as_script_bytes().as_slice();
        WitnessProgram::new(WitnessVer::V0, bytes[2..22].to_vec()).ok()
    } else if script.is_p2wsh() {
        let bytes = script.as_script_bytes().as_slice();
        WitnessProgram::new(WitnessVer::V0, bytes[2..34].to_vec()).ok()
    } else if script.is_p2tr() {
        let bytes = script.as_script_bytes().as_slice();
        WitnessProgram::new(WitnessVer::V1, bytes[2..34].to_vec()).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use bc_network::registry;

    use super::*;

    #[test]
    fn legacy_p2pkh_projects_address() {
        let net = registry().get("bitcoin").unwrap();
        let script = ScriptPubkey::p2pkh([0x11u8; 20]);
        let addr = script.get_legacy_address(&net).unwrap();
        assert_eq!(addr.address_type(), Some(bc_address::AddressType::P2pkh));
    }

    #[test]
    fn legacy_address_none_for_segwit_script() {
        let net = registry().get("bitcoin").unwrap();
        let script = ScriptPubkey::p2wpkh([0x22u8; 20]);
        assert!(script.get_legacy_address(&net).is_none());
    }

    #[test]
    fn segwit_v0_projects_bech32_address() {
        let net = registry().get("bitcoin").unwrap();
        let script = ScriptPubkey::p2wpkh([0x33u8; 20]);
        let addr = script.get_segwit_address(&net).unwrap();
        assert!(addr.to_string().starts_with("bc1q"));
    }

    #[test]
    fn taproot_projects_bech32m_address() {
        let net = registry().get("bitcoin").unwrap();
        let script = ScriptPubkey::p2tr([0x44u8; 32]);
        let addr = script.get_segwit_address(&net).unwrap();
        assert!(addr.to_string().starts_with("bc1p"));
    }

    #[test]
    fn compat_address_wraps_witness_program_in_p2sh() {
        let net = registry().get("bitcoin").unwrap();
        let script = ScriptPubkey::p2wpkh([0x55u8; 20]);
        let addr = script.get_compat_address(&net).unwrap();
        assert_eq!(addr.address_type(), Some(bc_address::AddressType::P2sh));
    }

    #[test]
    fn compat_address_none_for_legacy_script() {
        let net = registry().get("bitcoin").unwrap();
        let script = ScriptPubkey::p2pkh([0x66u8; 20]);
        assert!(script.get_compat_address(&net).is_none());
    }
}

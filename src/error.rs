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

use bc_address::AddressParseError;
use bc_codecs::{Base58Error, Bech32Error};
use bc_consensus::{ChainParseError, SegwitError, SigError};
use bc_hd::{Bip85Error, DeriveError, MnemonicError, PathParseError, XkeyParseError};
use bc_keys::KeyParseError;
use bc_network::NetworkConfigError;
use bc_scriptexec::ExecError;
use bc_txsign::Error as TxSignError;

/// Aggregate error for every failure kind a caller working purely through
/// the root `wallet` crate can hit, unifying each sub-crate's own error
/// type behind a single `From`-convertible enum.
///
/// The [`Psbt`](Error::Psbt) variant carries no structured payload of its
/// own: PSBT parsing and role logic are out of scope for this crate, but a
/// host embedding it alongside a PSBT implementation needs a slot to
/// report that boundary through the same enum a caller already matches on.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum Error {
    /// {0}
    #[from]
    Address(AddressParseError),

    /// {0}
    #[from]
    Base58(Base58Error),

    /// {0}
    #[from]
    Bech32(Bech32Error),

    /// {0}
    #[from]
    Chain(ChainParseError),

    /// {0}
    #[from]
    Segwit(SegwitError),

    /// {0}
    #[from]
    Sig(SigError),

    /// {0}
    #[from]
    Bip85(Bip85Error),

    /// {0}
    #[from]
    Derive(DeriveError),

    /// {0}
    #[from]
    Mnemonic(MnemonicError),

    /// {0}
    #[from]
    PathParse(PathParseError),

    /// {0}
    #[from]
    XkeyParse(XkeyParseError),

    /// {0}
    #[from]
    Key(KeyParseError),

    /// {0}
    #[from]
    NetworkConfig(NetworkConfigError),

    /// {0}
    #[from]
    Script(ExecError),

    /// {0}
    #[from]
    TxSign(TxSignError),

    /// PSBT error: {0}
    Psbt(String),
}

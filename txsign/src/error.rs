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

use bc_consensus::{Outpoint, Sats};
use bc_scriptexec::ExecError;

/// Phase of per-input verification a [`TransactionScript`](Error::TransactionScript)
/// failure occurred in, mirroring the dispatch steps of [`crate::verify_transaction`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
#[display(lowercase)]
pub enum ScriptPhase {
    LockingScript,
    RedeemScript,
    SegwitLockingScript,
    SegwitRedeemScript,
}

/// Non-fatal conditions noticed while verifying a transaction: the checks
/// they describe were skipped rather than failed, for lack of enough chain
/// context to evaluate them.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
#[display(doc_comments)]
pub enum VerifyWarning {
    /// transaction sets an absolute locktime but no confirming block was
    /// supplied, so it could not be checked against the chain tip.
    LocktimeUnchecked,
}

/// Errors produced while signing or verifying a transaction.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum Error {
    /// input {0} spends an outpoint {1} absent from the UTXO registry.
    Transaction(usize, Outpoint),

    /// input {0} failed its {1} ({2}).
    TransactionScript(usize, ScriptPhase, ExecError),

    /// cannot sign input {0}: {1}
    Sign(usize, String),

    /// cannot verify input {0}: {1}
    Verify(usize, String),

    /// transaction spends {0} but only pays out {1}.
    Inflation(Sats, Sats),

    /// input {0} does not satisfy its relative locktime yet.
    Immature(usize),

    /// transaction locktime {0:?} is not yet satisfied by the chain tip.
    Premature(bc_consensus::LockTime),
}

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

//! A single-threaded Bitcoin Script stack machine: numeric encoding,
//! control flow, the full opcode executor, and the `SignatureChecker` seam
//! that lets `CHECKSIG`/`CHECKMULTISIG`/`CLTV`/`CSV` reach into transaction
//! context without this crate depending on transaction types.

#![deny(non_upper_case_globals, non_camel_case_types, non_snake_case, unused_mut, dead_code)]

#[macro_use]
extern crate amplify;

mod checker;
mod error;
mod interpreter;
mod numbers;
mod stack;

pub use checker::{NullChecker, SignatureChecker};
pub use error::ExecError;
pub use interpreter::{run, Runner};
pub use numbers::{cast_to_bool, ScriptNum};
pub use stack::Stack;

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

/// The three failure kinds a script execution can raise, each optionally
/// annotated with the byte position in the script that triggered it.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum ExecError {
    /// unknown or disabled opcode {0:#04x} at position {1}.
    ScriptOpcode(u8, usize),

    /// malformed script at position {0}: {1}.
    ScriptSyntax(usize, &'static str),

    /// script execution failed at position {0}: {1}.
    ScriptRuntime(usize, &'static str),
}

impl ExecError {
    pub(crate) fn syntax(pos: usize, msg: &'static str) -> Self { ExecError::ScriptSyntax(pos, msg) }

    pub(crate) fn runtime(pos: usize, msg: &'static str) -> Self { ExecError::ScriptRuntime(pos, msg) }

    pub(crate) fn opcode(byte: u8, pos: usize) -> Self { ExecError::ScriptOpcode(byte, pos) }
}

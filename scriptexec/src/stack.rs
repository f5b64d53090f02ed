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

use crate::ExecError;

/// A single bytestring stack, used for both the main stack and the alt
/// stack in the Script runner.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Stack(Vec<Vec<u8>>);

impl Stack {
    pub fn new() -> Self { Stack::default() }

    /// Seeds the stack with initial items, bottom-to-top.
    pub fn with_items(items: Vec<Vec<u8>>) -> Self { Stack(items) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn push(&mut self, item: Vec<u8>) { self.0.push(item) }

    pub fn pop(&mut self, pos: usize) -> Result<Vec<u8>, ExecError> {
        self.0.pop().ok_or_else(|| ExecError::runtime(pos, "pop from empty stack"))
    }

    /// Returns a reference to the `n`-th item from the top (0 = top),
    /// without removing it.
    pub fn top(&self, n: usize, pos: usize) -> Result<&Vec<u8>, ExecError> {
        let len = self.0.len();
        if n >= len {
            return Err(ExecError::runtime(pos, "stack index out of range"));
        }
        Ok(&self.0[len - 1 - n])
    }

    /// Removes and returns the `n`-th item from the top (0 = top).
    pub fn remove(&mut self, n: usize, pos: usize) -> Result<Vec<u8>, ExecError> {
        let len = self.0.len();
        if n >= len {
            return Err(ExecError::runtime(pos, "stack index out of range"));
        }
        Ok(self.0.remove(len - 1 - n))
    }

    /// Inserts `item` so that it becomes the `n`-th item from the top.
    pub fn insert(&mut self, n: usize, item: Vec<u8>, pos: usize) -> Result<(), ExecError> {
        let len = self.0.len();
        if n > len {
            return Err(ExecError::runtime(pos, "stack index out of range"));
        }
        self.0.insert(len - n, item);
        Ok(())
    }

    pub fn into_vec(self) -> Vec<Vec<u8>> { self.0 }

    pub fn as_slice(&self) -> &[Vec<u8>] { &self.0 }
}

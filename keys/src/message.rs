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

use bc_consensus::{ConsensusEncode, VarInt};
use bc_hashes::hash256;

/// Magic string prefixed to every message before hashing, so a signature
/// produced for "signed message" purposes can never be replayed as a
/// signature over a raw transaction sighash.
const MESSAGE_MAGIC: &[u8] = b"Bitcoin Signed Message:\n";

/// `hash256(varint(len(MAGIC)) ‖ MAGIC ‖ varint(len(msg)) ‖ msg)`, the
/// digest actually signed by the Bitcoin "signed message" convention.
pub fn message_hash(msg: &[u8]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(MESSAGE_MAGIC.len() + msg.len() + 18);
    push_compact_size(&mut buf, MESSAGE_MAGIC.len() as u64);
    buf.extend_from_slice(MESSAGE_MAGIC);
    push_compact_size(&mut buf, msg.len() as u64);
    buf.extend_from_slice(msg);
    hash256(&buf)
}

fn push_compact_size(buf: &mut Vec<u8>, n: u64) {
    VarInt(n).consensus_encode(buf).expect("in-memory writing can't fail");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn magic_is_prefixed() {
        let h1 = message_hash(b"hello");
        let h2 = message_hash(b"world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn empty_message_hashes_deterministically() {
        assert_eq!(message_hash(b""), message_hash(b""));
    }
}

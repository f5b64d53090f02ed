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

//! Script numeric encoding: little-endian, variable length, sign carried in
//! the top bit of the last byte. `OP_0` is the empty bytestring; the empty
//! string and "negative zero" both decode to `0`.

use crate::ExecError;

/// Bitcoin Script's 4-byte-limited signed integer, used by every arithmetic
/// and comparison opcode (CLTV/CSV relax the limit to 5 bytes).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ScriptNum(i64);

impl ScriptNum {
    pub const MAX_NUM_SIZE: usize = 4;
    pub const MAX_LOCKTIME_NUM_SIZE: usize = 5;

    pub fn new(value: i64) -> Self { ScriptNum(value) }

    pub fn value(self) -> i64 { self.0 }

    /// Decodes a script-encoded number, enforcing `max_size` (4 bytes for
    /// ordinary arithmetic, 5 for CLTV/CSV's comparands).
    pub fn decode(bytes: &[u8], max_size: usize, pos: usize) -> Result<Self, ExecError> {
        if bytes.len() > max_size {
            return Err(ExecError::syntax(pos, "script number overflows maximum size"));
        }
        if bytes.is_empty() {
            return Ok(ScriptNum(0));
        }
        let mut result: i64 = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            result |= (byte as i64) << (8 * i);
        }
        let last = bytes.len() - 1;
        if bytes[last] & 0x80 != 0 {
            result &= !(0x80i64 << (8 * last));
            result = -result;
        }
        Ok(ScriptNum(result))
    }

    /// Encodes `self` using the minimal little-endian representation with a
    /// sign bit in the top bit of the last byte.
    pub fn encode(self) -> Vec<u8> {
        if self.0 == 0 {
            return Vec::new();
        }
        let negative = self.0 < 0;
        let mut abs = self.0.unsigned_abs();
        let mut bytes = Vec::new();
        while abs > 0 {
            bytes.push((abs & 0xff) as u8);
            abs >>= 8;
        }
        if bytes.last().copied().unwrap_or(0) & 0x80 != 0 {
            bytes.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            *bytes.last_mut().unwrap() |= 0x80;
        }
        bytes
    }
}

impl From<i64> for ScriptNum {
    fn from(value: i64) -> Self { ScriptNum(value) }
}

impl From<ScriptNum> for i64 {
    fn from(num: ScriptNum) -> Self { num.0 }
}

/// Script boolean semantics: any non-empty bytestring other than "negative
/// zero" (all-zero bytes with the top bit of the last byte set) is `true`.
pub fn cast_to_bool(bytes: &[u8]) -> bool {
    for (i, &byte) in bytes.iter().enumerate() {
        if byte != 0 {
            if i == bytes.len() - 1 && byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_roundtrips_to_empty() {
        assert!(ScriptNum::new(0).encode().is_empty());
        assert_eq!(ScriptNum::decode(&[], 4, 0).unwrap().value(), 0);
    }

    #[test]
    fn positive_and_negative_roundtrip() {
        for n in [1i64, 127, 128, 255, 256, 32767, 32768, -1, -127, -128, -32768] {
            let encoded = ScriptNum::new(n).encode();
            let decoded = ScriptNum::decode(&encoded, 4, 0).unwrap();
            assert_eq!(decoded.value(), n, "roundtrip failed for {n}");
        }
    }

    #[test]
    fn oversized_number_rejected() {
        assert!(ScriptNum::decode(&[1, 2, 3, 4, 5], 4, 0).is_err());
    }

    #[test]
    fn negative_zero_is_false() {
        assert!(!cast_to_bool(&[0x80]));
        assert!(!cast_to_bool(&[0x00, 0x80]));
        assert!(cast_to_bool(&[0x01]));
    }
}

// Bitcoin protocol consensus library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2019-2025 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2025 LNP/BP Standards Association. All rights reserved.
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

//! `nLockTime` (BIP65) and per-input `nSequence` (BIP68/BIP112) timelock
//! encodings.

/// Threshold distinguishing a block-height-based [`LockTime`] from a
/// Unix-timestamp-based one: values below this are heights, values at or
/// above it are timestamps.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Disable flag (bit 31) for [`SeqNo`]: when set, the input's relative
/// locktime is not enforced and the field carries no BIP68 semantics.
const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 0x8000_0000;

/// Type flag (bit 22) for [`SeqNo`]: when set, the locked value is counted in
/// units of 512 seconds; otherwise it is a block count.
const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 0x0040_0000;

/// Mask over the low 16 bits carrying the actual relative-locktime value.
const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

/// Transaction's `nLockTime` field: either a block height or a Unix
/// timestamp, the two spaces disjoint per [`LOCKTIME_THRESHOLD`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum LockTime {
    /// No locktime constraint; the input may be mined in any block.
    #[display("0")]
    Unset,

    /// A minimum block height at or above which the transaction becomes
    /// valid.
    #[display("height({0})")]
    Height(u32),

    /// A minimum Unix timestamp at or after which the transaction becomes
    /// valid.
    #[display("timestamp({0})")]
    Timestamp(u32),
}

impl LockTime {
    /// The unconstrained (zero) locktime.
    pub const ZERO: LockTime = LockTime::Unset;

    /// Constructs a height-based locktime; `height` must be strictly less
    /// than [`LOCKTIME_THRESHOLD`], otherwise it is reinterpreted as a
    /// timestamp.
    pub fn from_height(height: u32) -> Self {
        if height == 0 {
            LockTime::Unset
        } else if height < LOCKTIME_THRESHOLD {
            LockTime::Height(height)
        } else {
            LockTime::Timestamp(height)
        }
    }

    /// Constructs a timestamp-based locktime; `timestamp` must be at or above
    /// [`LOCKTIME_THRESHOLD`], otherwise it is reinterpreted as a height.
    pub fn from_timestamp(timestamp: u32) -> Self {
        if timestamp == 0 {
            LockTime::Unset
        } else if timestamp < LOCKTIME_THRESHOLD {
            LockTime::Height(timestamp)
        } else {
            LockTime::Timestamp(timestamp)
        }
    }

    /// Constructs a [`LockTime`] from the raw consensus `u32`, classifying it
    /// by the [`LOCKTIME_THRESHOLD`] boundary. Never fails: every `u32` is a
    /// valid consensus locktime.
    pub fn from_consensus_u32(n: u32) -> Self {
        if n == 0 {
            LockTime::Unset
        } else if n < LOCKTIME_THRESHOLD {
            LockTime::Height(n)
        } else {
            LockTime::Timestamp(n)
        }
    }

    /// Returns the raw consensus `u32` representation.
    pub fn to_consensus_u32(&self) -> u32 {
        match self {
            LockTime::Unset => 0,
            LockTime::Height(n) | LockTime::Timestamp(n) => *n,
        }
    }

    /// Whether this locktime carries no constraint.
    pub fn is_unset(&self) -> bool { matches!(self, LockTime::Unset) }

    /// Returns the block height this locktime requires, if it is
    /// height-based.
    pub fn to_height(&self) -> Option<u32> {
        match self {
            LockTime::Height(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the Unix timestamp this locktime requires, if it is
    /// timestamp-based.
    pub fn to_timestamp(&self) -> Option<u32> {
        match self {
            LockTime::Timestamp(n) => Some(*n),
            _ => None,
        }
    }

    /// BIP65 `OP_CHECKLOCKTIMEVERIFY` comparison: `self` is satisfied once
    /// `chain_tip` (interpreted the same way — height or MTP-timestamp,
    /// matching `self`'s kind) reaches or exceeds the locked value. Returns
    /// `None` if the two values are of different kinds (one a height, the
    /// other a timestamp), per BIP65's "comparands differ in kind" failure.
    pub fn is_satisfied_by(&self, chain_tip: u32) -> Option<bool> {
        match self {
            LockTime::Unset => Some(true),
            LockTime::Height(n) if chain_tip < LOCKTIME_THRESHOLD => Some(chain_tip >= *n),
            LockTime::Timestamp(n) if chain_tip >= LOCKTIME_THRESHOLD => Some(chain_tip >= *n),
            _ => None,
        }
    }
}

impl Default for LockTime {
    fn default() -> Self { LockTime::Unset }
}

impl From<u32> for LockTime {
    fn from(n: u32) -> Self { LockTime::from_consensus_u32(n) }
}

impl From<LockTime> for u32 {
    fn from(lock: LockTime) -> Self { lock.to_consensus_u32() }
}

/// Relative-locktime classification of a [`SeqNo`] value, per BIP68.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RelativeLockTime {
    /// Relative locktime is disabled for this input; BIP68 does not apply.
    Disabled,
    /// Relative locktime counted in blocks (1 unit = 1 block).
    Blocks(u16),
    /// Relative locktime counted in units of 512 seconds.
    Time512Sec(u16),
}

/// Transaction input's `nSequence` field. Carries the legacy
/// replace-by-fee/finality signal in its top bit, and — when that bit is
/// clear — a BIP68 relative locktime value in its low bits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(inner)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct SeqNo(u32);

impl SeqNo {
    /// The final sequence number: disables relative locktime, signals the
    /// input accepts no further replacement, and satisfies absolute locktime
    /// checks unconditionally.
    pub const FINAL: SeqNo = SeqNo(0xFFFF_FFFF);

    /// The lowest non-final sequence number enabling opt-in replace-by-fee
    /// per BIP125 while leaving relative locktime disabled.
    pub const RBF: SeqNo = SeqNo(0xFFFF_FFFD);

    /// Zero sequence: relative locktime of zero blocks, always satisfied,
    /// and opts into replace-by-fee.
    pub const ZERO: SeqNo = SeqNo(0);

    /// Constructs a [`SeqNo`] from its raw consensus `u32`. Infallible: any
    /// bit pattern is a valid sequence number.
    pub const fn from_consensus_u32(n: u32) -> Self { SeqNo(n) }

    /// Returns the raw consensus `u32`.
    pub const fn to_consensus_u32(&self) -> u32 { self.0 }

    /// A block-count relative locktime of `blocks` (0..=0xFFFF).
    pub fn from_blocks(blocks: u16) -> Self { SeqNo(blocks as u32) }

    /// A 512-second-unit relative locktime of `units` (0..=0xFFFF).
    pub fn from_intervals(units: u16) -> Self {
        SeqNo(SEQUENCE_LOCKTIME_TYPE_FLAG | units as u32)
    }

    /// Whether replace-by-fee (BIP125) is signaled: any sequence number below
    /// [`SeqNo::RBF`]'s successor, i.e. `< 0xFFFFFFFE`.
    pub fn is_rbf(&self) -> bool { self.0 < 0xFFFF_FFFE }

    /// Whether the absolute `nLockTime` field is enforced for this input:
    /// enforced unless the sequence equals [`SeqNo::FINAL`].
    pub fn enables_locktime(&self) -> bool { *self != SeqNo::FINAL }

    /// Whether BIP68 relative locktime is disabled (the top bit is set).
    pub fn is_relative_disabled(&self) -> bool {
        self.0 & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0
    }

    /// Classifies the relative-locktime value per BIP68.
    pub fn relative_lock_time(&self) -> RelativeLockTime {
        if self.is_relative_disabled() {
            return RelativeLockTime::Disabled;
        }
        let value = (self.0 & SEQUENCE_LOCKTIME_MASK) as u16;
        if self.0 & SEQUENCE_LOCKTIME_TYPE_FLAG != 0 {
            RelativeLockTime::Time512Sec(value)
        } else {
            RelativeLockTime::Blocks(value)
        }
    }
}

impl Default for SeqNo {
    fn default() -> Self { SeqNo::FINAL }
}

impl From<u32> for SeqNo {
    fn from(n: u32) -> Self { SeqNo(n) }
}

impl From<SeqNo> for u32 {
    fn from(seq: SeqNo) -> Self { seq.0 }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn locktime_height_vs_timestamp() {
        let h = LockTime::from_consensus_u32(500_000);
        assert_eq!(h, LockTime::Height(500_000));
        let t = LockTime::from_consensus_u32(1_700_000_000);
        assert_eq!(t, LockTime::Timestamp(1_700_000_000));
        assert_eq!(LockTime::from_consensus_u32(0), LockTime::Unset);
    }

    #[test]
    fn locktime_roundtrip() {
        for n in [0u32, 1, 500_000, LOCKTIME_THRESHOLD, u32::MAX] {
            let lt = LockTime::from_consensus_u32(n);
            assert_eq!(lt.to_consensus_u32(), n);
        }
    }

    #[test]
    fn locktime_satisfaction_same_kind() {
        let height_lock = LockTime::Height(100);
        assert_eq!(height_lock.is_satisfied_by(99), Some(false));
        assert_eq!(height_lock.is_satisfied_by(100), Some(true));
        assert_eq!(height_lock.is_satisfied_by(101), Some(true));
    }

    #[test]
    fn locktime_satisfaction_mismatched_kind_is_none() {
        let height_lock = LockTime::Height(100);
        assert_eq!(height_lock.is_satisfied_by(1_700_000_000), None);
    }

    #[test]
    fn seqno_final_disables_relative_and_locktime() {
        assert!(!SeqNo::FINAL.enables_locktime());
        assert_eq!(SeqNo::FINAL.relative_lock_time(), RelativeLockTime::Disabled);
        assert!(!SeqNo::FINAL.is_rbf());
    }

    #[test]
    fn seqno_rbf_signal() {
        assert!(SeqNo::RBF.is_rbf());
        assert!(SeqNo::ZERO.is_rbf());
    }

    #[test]
    fn seqno_relative_blocks_vs_time() {
        let blocks = SeqNo::from_blocks(10);
        assert_eq!(blocks.relative_lock_time(), RelativeLockTime::Blocks(10));
        let time = SeqNo::from_intervals(5);
        assert_eq!(time.relative_lock_time(), RelativeLockTime::Time512Sec(5));
    }
}

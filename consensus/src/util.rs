// Bitcoin protocol consensus library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Designed in 2019-2025 by Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
// Written in 2024-2025 by Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2024 LNP/BP Standards Association, Switzerland.
// Copyright (C) 2024-2025 LNP/BP Labs, Institute for Distributed and Cognitive Systems (InDCS).
// Copyright (C) 2019-2025 Dr Maxim Orlovsky.
// All rights under the above copyrights are reserved.
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

use std::fmt::{Debug, Display};

/// the provided value {value} for {matter} is non-standard; while it is
/// accepted by the bitcoin consensus rules, the software prohibits from using
/// it.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub struct NonStandardValue<T: Debug + Display> {
    pub value: T,
    pub matter: &'static str,
}

impl<T: Debug + Display> NonStandardValue<T> {
    pub const fn with(value: T, matter: &'static str) -> Self { NonStandardValue { value, matter } }
}

/// Error constructing a [`Chain`] reference.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum ChainParseError {
    /// block timestamp must be strictly positive.
    ZeroTimestamp,
}

/// An opaque reference to a position in a block chain: a height, a timestamp,
/// and an optional link to the previous block's reference. Carries no header
/// fields beyond what signature-hash and locktime evaluation need.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Chain {
    height: u32,
    timestamp: u32,
    previous: Option<Box<Chain>>,
}

impl Chain {
    /// Constructs a genesis-relative chain reference with no ancestor.
    pub fn new(height: u32, timestamp: u32) -> Result<Self, ChainParseError> {
        if timestamp == 0 {
            return Err(ChainParseError::ZeroTimestamp);
        }
        Ok(Chain {
            height,
            timestamp,
            previous: None,
        })
    }

    /// Extends `previous` with one more block.
    pub fn extend(previous: Chain, height: u32, timestamp: u32) -> Result<Self, ChainParseError> {
        if timestamp == 0 {
            return Err(ChainParseError::ZeroTimestamp);
        }
        Ok(Chain {
            height,
            timestamp,
            previous: Some(Box::new(previous)),
        })
    }

    pub fn height(&self) -> u32 { self.height }

    pub fn timestamp(&self) -> u32 { self.timestamp }

    pub fn previous(&self) -> Option<&Chain> { self.previous.as_deref() }

    /// Median of this block's timestamp and up to its 10 ancestors'
    /// timestamps (11 total), per the `median-time-past` rule used by
    /// `OP_CHECKLOCKTIMEVERIFY` and BIP113.
    pub fn median_time_past(&self) -> u32 {
        let mut timestamps = Vec::with_capacity(11);
        let mut cursor = Some(self);
        while let Some(chain) = cursor {
            timestamps.push(chain.timestamp);
            if timestamps.len() == 11 {
                break;
            }
            cursor = chain.previous.as_deref();
        }
        timestamps.sort_unstable();
        timestamps[timestamps.len() / 2]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn median_time_past_single_block() {
        let chain = Chain::new(100, 1_000).unwrap();
        assert_eq!(chain.median_time_past(), 1_000);
    }

    #[test]
    fn median_time_past_over_ancestors() {
        let mut chain = Chain::new(0, 100).unwrap();
        for height in 1..11u32 {
            chain = Chain::extend(chain, height, 100 + height * 10).unwrap();
        }
        // timestamps are 100, 110, ..., 200 (11 values); median is the 6th, 150.
        assert_eq!(chain.median_time_past(), 150);
    }

    #[test]
    fn median_time_past_caps_at_eleven_ancestors() {
        let mut chain = Chain::new(0, 1).unwrap();
        for height in 1..20u32 {
            chain = Chain::extend(chain, height, height * 100).unwrap();
        }
        // Only the most recent 11 timestamps participate: 900, 1000, ..., 1900.
        let mut expected: Vec<u32> = (9..=19).map(|h| h * 100).collect();
        expected.sort_unstable();
        assert_eq!(chain.median_time_past(), expected[expected.len() / 2]);
    }

    #[test]
    fn zero_timestamp_rejected() {
        assert!(Chain::new(0, 0).is_err());
    }
}

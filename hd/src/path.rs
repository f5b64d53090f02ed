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

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bc_network::Purpose;

use crate::PathParseError;

/// The boundary between non-hardened (`< 2^31`) and hardened (`>= 2^31`)
/// child indexes.
pub const HARDENED_BIT: u32 = 0x8000_0000;

/// One segment of a derivation path: a plain `u32` index, with the top bit
/// marking hardened derivation.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct ChildNumber(u32);

impl ChildNumber {
    /// A non-hardened child at `index` (must be `< 2^31`).
    pub fn normal(index: u32) -> Result<Self, PathParseError> {
        if index >= HARDENED_BIT {
            return Err(PathParseError::IndexOutOfRange(index));
        }
        Ok(ChildNumber(index))
    }

    /// A hardened child at `index` (the caller gives the unhardened index;
    /// this sets the top bit).
    pub fn hardened(index: u32) -> Result<Self, PathParseError> {
        if index >= HARDENED_BIT {
            return Err(PathParseError::IndexOutOfRange(index));
        }
        Ok(ChildNumber(index | HARDENED_BIT))
    }

    /// Wraps a raw BIP32 derivation value (hardened bit already applied, if
    /// any).
    pub fn from_raw(value: u32) -> Self { ChildNumber(value) }

    /// The raw BIP32 derivation value, to feed `CKDpriv`/`CKDpub`.
    pub fn to_raw(self) -> u32 { self.0 }

    /// Whether this is a hardened child.
    pub fn is_hardened(self) -> bool { self.0 & HARDENED_BIT != 0 }

    /// The unhardened index, with the top bit stripped.
    pub fn index(self) -> u32 { self.0 & !HARDENED_BIT }
}

impl Display for ChildNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

impl FromStr for ChildNumber {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match s.strip_suffix(['\'', 'h', 'H']) {
            Some(stripped) => (stripped, true),
            None => (s, false),
        };
        let index: u32 = digits.parse().map_err(|_| PathParseError::InvalidSegment(s.to_string()))?;
        if hardened {
            ChildNumber::hardened(index)
        } else {
            ChildNumber::normal(index)
        }
    }
}

/// A full BIP32 derivation path, always rooted at `m`.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    pub fn new() -> Self { DerivationPath::default() }

    pub fn from_segments(segments: Vec<ChildNumber>) -> Self { DerivationPath(segments) }

    pub fn as_slice(&self) -> &[ChildNumber] { &self.0 }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn push(&mut self, child: ChildNumber) { self.0.push(child) }

    /// Appends `child` and returns `self`, for fluent path construction.
    pub fn child(mut self, child: ChildNumber) -> Self {
        self.push(child);
        self
    }

    /// The BIP44 account-level path `m / purpose' / coin_type' / account'`.
    pub fn bip44_account(purpose: Purpose, coin_type: u32, account: u32) -> Result<Self, PathParseError> {
        Ok(DerivationPath(vec![
            ChildNumber::hardened(purpose.purpose_number())?,
            ChildNumber::hardened(coin_type)?,
            ChildNumber::hardened(account)?,
        ]))
    }

    /// The full BIP44 path `m / purpose' / coin_type' / account' / change /
    /// index`.
    pub fn bip44(
        purpose: Purpose,
        coin_type: u32,
        account: u32,
        change: u32,
        index: u32,
    ) -> Result<Self, PathParseError> {
        let mut path = DerivationPath::bip44_account(purpose, coin_type, account)?;
        path.push(ChildNumber::normal(change)?);
        path.push(ChildNumber::normal(index)?);
        Ok(path)
    }

    /// Returns the path truncated to its first three segments (the
    /// account-level prefix), if this path has at least that many.
    pub fn get_account(&self) -> Option<DerivationPath> {
        if self.0.len() < 3 {
            return None;
        }
        Some(DerivationPath(self.0[..3].to_vec()))
    }

    /// Returns the path's suffix starting at the `change` segment (index 3
    /// onward), if this path has at least four segments.
    pub fn get_from_account(&self) -> Option<DerivationPath> {
        if self.0.len() < 4 {
            return None;
        }
        Some(DerivationPath(self.0[3..].to_vec()))
    }
}

impl IntoIterator for DerivationPath {
    type Item = ChildNumber;
    type IntoIter = std::vec::IntoIter<ChildNumber>;

    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'p> IntoIterator for &'p DerivationPath {
    type Item = &'p ChildNumber;
    type IntoIter = std::slice::Iter<'p, ChildNumber>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

impl Display for DerivationPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix('m').ok_or(PathParseError::MissingRoot)?;
        if rest.is_empty() {
            return Ok(DerivationPath::new());
        }
        let rest = rest.strip_prefix('/').ok_or(PathParseError::MissingRoot)?;
        let segments = rest
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(PathParseError::EmptySegment);
                }
                ChildNumber::from_str(segment)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DerivationPath(segments))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bip44_path_formats_correctly() {
        let path = DerivationPath::bip44(Purpose::Segwit, 0, 0, 0, 5).unwrap();
        assert_eq!(path.to_string(), "m/84'/0'/0'/0/5");
    }

    #[test]
    fn parses_hardened_and_plain_segments() {
        let path = DerivationPath::from_str("m/44'/0'/0'/0/12").unwrap();
        assert_eq!(path.as_slice().len(), 5);
        assert!(path.as_slice()[0].is_hardened());
        assert!(!path.as_slice()[4].is_hardened());
        assert_eq!(path.to_string(), "m/44'/0'/0'/0/12");
    }

    #[test]
    fn get_account_and_get_from_account_split_correctly() {
        let path = DerivationPath::bip44(Purpose::Legacy, 0, 7, 1, 3).unwrap();
        let account = path.get_account().unwrap();
        assert_eq!(account.to_string(), "m/44'/0'/7'");
        let suffix = path.get_from_account().unwrap();
        assert_eq!(suffix.to_string(), "m/1/3");
    }

    #[test]
    fn rejects_missing_root() {
        assert!(DerivationPath::from_str("44'/0'/0'").is_err());
    }
}

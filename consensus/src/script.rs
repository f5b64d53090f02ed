// Bitcoin protocol consensus library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2019-2023 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2023 LNP/BP Standards Association. All rights reserved.
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

use amplify::confinement;
use amplify::confinement::Confined;

use crate::opcodes::*;
use crate::{VarInt, VarIntArray};

/// The full canonical Bitcoin Script opcode table (push opcodes, numeric
/// constants, flow control, stack/bitwise/arithmetic ops, crypto ops, locktime
/// ops, and the `OP_RETURN`-equivalent reserved range).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
#[repr(u8)]
pub enum OpCode {
    PushBytes0 = OP_PUSHBYTES_0,
    PushBytes1 = OP_PUSHBYTES_1,
    PushBytes2 = OP_PUSHBYTES_2,
    PushBytes3 = OP_PUSHBYTES_3,
    PushBytes4 = OP_PUSHBYTES_4,
    PushBytes5 = OP_PUSHBYTES_5,
    PushBytes6 = OP_PUSHBYTES_6,
    PushBytes7 = OP_PUSHBYTES_7,
    PushBytes8 = OP_PUSHBYTES_8,
    PushBytes9 = OP_PUSHBYTES_9,
    PushBytes10 = OP_PUSHBYTES_10,
    PushBytes11 = OP_PUSHBYTES_11,
    PushBytes12 = OP_PUSHBYTES_12,
    PushBytes13 = OP_PUSHBYTES_13,
    PushBytes14 = OP_PUSHBYTES_14,
    PushBytes15 = OP_PUSHBYTES_15,
    PushBytes16 = OP_PUSHBYTES_16,
    PushBytes17 = OP_PUSHBYTES_17,
    PushBytes18 = OP_PUSHBYTES_18,
    PushBytes19 = OP_PUSHBYTES_19,
    PushBytes20 = OP_PUSHBYTES_20,
    PushBytes21 = OP_PUSHBYTES_21,
    PushBytes22 = OP_PUSHBYTES_22,
    PushBytes23 = OP_PUSHBYTES_23,
    PushBytes24 = OP_PUSHBYTES_24,
    PushBytes25 = OP_PUSHBYTES_25,
    PushBytes26 = OP_PUSHBYTES_26,
    PushBytes27 = OP_PUSHBYTES_27,
    PushBytes28 = OP_PUSHBYTES_28,
    PushBytes29 = OP_PUSHBYTES_29,
    PushBytes30 = OP_PUSHBYTES_30,
    PushBytes31 = OP_PUSHBYTES_31,
    PushBytes32 = OP_PUSHBYTES_32,
    PushBytes33 = OP_PUSHBYTES_33,
    PushBytes34 = OP_PUSHBYTES_34,
    PushBytes35 = OP_PUSHBYTES_35,
    PushBytes36 = OP_PUSHBYTES_36,
    PushBytes37 = OP_PUSHBYTES_37,
    PushBytes38 = OP_PUSHBYTES_38,
    PushBytes39 = OP_PUSHBYTES_39,
    PushBytes40 = OP_PUSHBYTES_40,
    PushBytes41 = OP_PUSHBYTES_41,
    PushBytes42 = OP_PUSHBYTES_42,
    PushBytes43 = OP_PUSHBYTES_43,
    PushBytes44 = OP_PUSHBYTES_44,
    PushBytes45 = OP_PUSHBYTES_45,
    PushBytes46 = OP_PUSHBYTES_46,
    PushBytes47 = OP_PUSHBYTES_47,
    PushBytes48 = OP_PUSHBYTES_48,
    PushBytes49 = OP_PUSHBYTES_49,
    PushBytes50 = OP_PUSHBYTES_50,
    PushBytes51 = OP_PUSHBYTES_51,
    PushBytes52 = OP_PUSHBYTES_52,
    PushBytes53 = OP_PUSHBYTES_53,
    PushBytes54 = OP_PUSHBYTES_54,
    PushBytes55 = OP_PUSHBYTES_55,
    PushBytes56 = OP_PUSHBYTES_56,
    PushBytes57 = OP_PUSHBYTES_57,
    PushBytes58 = OP_PUSHBYTES_58,
    PushBytes59 = OP_PUSHBYTES_59,
    PushBytes60 = OP_PUSHBYTES_60,
    PushBytes61 = OP_PUSHBYTES_61,
    PushBytes62 = OP_PUSHBYTES_62,
    PushBytes63 = OP_PUSHBYTES_63,
    PushBytes64 = OP_PUSHBYTES_64,
    PushBytes65 = OP_PUSHBYTES_65,
    PushBytes66 = OP_PUSHBYTES_66,
    PushBytes67 = OP_PUSHBYTES_67,
    PushBytes68 = OP_PUSHBYTES_68,
    PushBytes69 = OP_PUSHBYTES_69,
    PushBytes70 = OP_PUSHBYTES_70,
    PushBytes71 = OP_PUSHBYTES_71,
    PushBytes72 = OP_PUSHBYTES_72,
    PushBytes73 = OP_PUSHBYTES_73,
    PushBytes74 = OP_PUSHBYTES_74,
    PushBytes75 = OP_PUSHBYTES_75,
    PushData1 = OP_PUSHDATA1,
    PushData2 = OP_PUSHDATA2,
    PushData4 = OP_PUSHDATA4,
    PushNumNeg1 = OP_PUSHNUM_NEG1,
    Reserved = OP_RESERVED,
    PushNum1 = OP_PUSHNUM_1,
    PushNum2 = OP_PUSHNUM_2,
    PushNum3 = OP_PUSHNUM_3,
    PushNum4 = OP_PUSHNUM_4,
    PushNum5 = OP_PUSHNUM_5,
    PushNum6 = OP_PUSHNUM_6,
    PushNum7 = OP_PUSHNUM_7,
    PushNum8 = OP_PUSHNUM_8,
    PushNum9 = OP_PUSHNUM_9,
    PushNum10 = OP_PUSHNUM_10,
    PushNum11 = OP_PUSHNUM_11,
    PushNum12 = OP_PUSHNUM_12,
    PushNum13 = OP_PUSHNUM_13,
    PushNum14 = OP_PUSHNUM_14,
    PushNum15 = OP_PUSHNUM_15,
    PushNum16 = OP_PUSHNUM_16,
    Nop = OP_NOP,
    Ver = OP_VER,
    If = OP_IF,
    NotIf = OP_NOTIF,
    Verif = OP_VERIF,
    Vernotif = OP_VERNOTIF,
    Else = OP_ELSE,
    EndIf = OP_ENDIF,
    Verify = OP_VERIFY,
    Return = OP_RETURN,
    ToAltStack = OP_TOALTSTACK,
    FromAltStack = OP_FROMALTSTACK,
    TwoDrop = OP_2DROP,
    TwoDup = OP_2DUP,
    ThreeDup = OP_3DUP,
    TwoOver = OP_2OVER,
    TwoRot = OP_2ROT,
    TwoSwap = OP_2SWAP,
    IfDup = OP_IFDUP,
    Depth = OP_DEPTH,
    Drop = OP_DROP,
    Dup = OP_DUP,
    Nip = OP_NIP,
    Over = OP_OVER,
    Pick = OP_PICK,
    Roll = OP_ROLL,
    Rot = OP_ROT,
    Swap = OP_SWAP,
    Tuck = OP_TUCK,
    Cat = OP_CAT,
    Substr = OP_SUBSTR,
    Left = OP_LEFT,
    Right = OP_RIGHT,
    Size = OP_SIZE,
    Invert = OP_INVERT,
    And = OP_AND,
    Or = OP_OR,
    Xor = OP_XOR,
    Equal = OP_EQUAL,
    EqualVerify = OP_EQUALVERIFY,
    Reserved1 = OP_RESERVED1,
    Reserved2 = OP_RESERVED2,
    Add1 = OP_1ADD,
    Sub1 = OP_1SUB,
    Mul2 = OP_2MUL,
    Div2 = OP_2DIV,
    Negate = OP_NEGATE,
    Abs = OP_ABS,
    Not = OP_NOT,
    NotEqual0 = OP_0NOTEQUAL,
    Add = OP_ADD,
    Sub = OP_SUB,
    Mul = OP_MUL,
    Div = OP_DIV,
    Mod = OP_MOD,
    Lshift = OP_LSHIFT,
    Rshift = OP_RSHIFT,
    BoolAnd = OP_BOOLAND,
    BoolOr = OP_BOOLOR,
    NumEqual = OP_NUMEQUAL,
    NumEqualVerify = OP_NUMEQUALVERIFY,
    NumNotEqual = OP_NUMNOTEQUAL,
    LessThan = OP_LESSTHAN,
    GreaterThan = OP_GREATERTHAN,
    LessThanOrEqual = OP_LESSTHANOREQUAL,
    GreaterThanOrEqual = OP_GREATERTHANOREQUAL,
    Min = OP_MIN,
    Max = OP_MAX,
    Within = OP_WITHIN,
    Ripemd160 = OP_RIPEMD160,
    Sha1 = OP_SHA1,
    Sha256 = OP_SHA256,
    Hash160 = OP_HASH160,
    Hash256 = OP_HASH256,
    CodeSeparator = OP_CODESEPARATOR,
    CheckSig = OP_CHECKSIG,
    CheckSigVerify = OP_CHECKSIGVERIFY,
    CheckMultisig = OP_CHECKMULTISIG,
    CheckMultisigVerify = OP_CHECKMULTISIGVERIFY,
    Nop1 = OP_NOP1,
    Cltv = OP_CLTV,
    Csv = OP_CSV,
    Nop4 = OP_NOP4,
    Nop5 = OP_NOP5,
    Nop6 = OP_NOP6,
    Nop7 = OP_NOP7,
    Nop8 = OP_NOP8,
    Nop9 = OP_NOP9,
    Nop10 = OP_NOP10,
    CheckSigAdd = OP_CHECKSIGADD,
    InvalidOpcode = OP_INVALIDOPCODE,
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OP_{:#04x}", *self as u8)
    }
}

impl OpCode {
    /// Parses a raw byte as an opcode. Never fails: every byte value is a
    /// valid (if sometimes `OP_RETURN`-equivalent) opcode in Bitcoin Script.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            OP_PUSHBYTES_0 => OpCode::PushBytes0,
            OP_PUSHBYTES_1 => OpCode::PushBytes1,
            OP_PUSHBYTES_2 => OpCode::PushBytes2,
            OP_PUSHBYTES_3 => OpCode::PushBytes3,
            OP_PUSHBYTES_4 => OpCode::PushBytes4,
            OP_PUSHBYTES_5 => OpCode::PushBytes5,
            OP_PUSHBYTES_6 => OpCode::PushBytes6,
            OP_PUSHBYTES_7 => OpCode::PushBytes7,
            OP_PUSHBYTES_8 => OpCode::PushBytes8,
            OP_PUSHBYTES_9 => OpCode::PushBytes9,
            OP_PUSHBYTES_10 => OpCode::PushBytes10,
            OP_PUSHBYTES_11 => OpCode::PushBytes11,
            OP_PUSHBYTES_12 => OpCode::PushBytes12,
            OP_PUSHBYTES_13 => OpCode::PushBytes13,
            OP_PUSHBYTES_14 => OpCode::PushBytes14,
            OP_PUSHBYTES_15 => OpCode::PushBytes15,
            OP_PUSHBYTES_16 => OpCode::PushBytes16,
            OP_PUSHBYTES_17 => OpCode::PushBytes17,
            OP_PUSHBYTES_18 => OpCode::PushBytes18,
            OP_PUSHBYTES_19 => OpCode::PushBytes19,
            OP_PUSHBYTES_20 => OpCode::PushBytes20,
            OP_PUSHBYTES_21 => OpCode::PushBytes21,
            OP_PUSHBYTES_22 => OpCode::PushBytes22,
            OP_PUSHBYTES_23 => OpCode::PushBytes23,
            OP_PUSHBYTES_24 => OpCode::PushBytes24,
            OP_PUSHBYTES_25 => OpCode::PushBytes25,
            OP_PUSHBYTES_26 => OpCode::PushBytes26,
            OP_PUSHBYTES_27 => OpCode::PushBytes27,
            OP_PUSHBYTES_28 => OpCode::PushBytes28,
            OP_PUSHBYTES_29 => OpCode::PushBytes29,
            OP_PUSHBYTES_30 => OpCode::PushBytes30,
            OP_PUSHBYTES_31 => OpCode::PushBytes31,
            OP_PUSHBYTES_32 => OpCode::PushBytes32,
            OP_PUSHBYTES_33 => OpCode::PushBytes33,
            OP_PUSHBYTES_34 => OpCode::PushBytes34,
            OP_PUSHBYTES_35 => OpCode::PushBytes35,
            OP_PUSHBYTES_36 => OpCode::PushBytes36,
            OP_PUSHBYTES_37 => OpCode::PushBytes37,
            OP_PUSHBYTES_38 => OpCode::PushBytes38,
            OP_PUSHBYTES_39 => OpCode::PushBytes39,
            OP_PUSHBYTES_40 => OpCode::PushBytes40,
            OP_PUSHBYTES_41 => OpCode::PushBytes41,
            OP_PUSHBYTES_42 => OpCode::PushBytes42,
            OP_PUSHBYTES_43 => OpCode::PushBytes43,
            OP_PUSHBYTES_44 => OpCode::PushBytes44,
            OP_PUSHBYTES_45 => OpCode::PushBytes45,
            OP_PUSHBYTES_46 => OpCode::PushBytes46,
            OP_PUSHBYTES_47 => OpCode::PushBytes47,
            OP_PUSHBYTES_48 => OpCode::PushBytes48,
            OP_PUSHBYTES_49 => OpCode::PushBytes49,
            OP_PUSHBYTES_50 => OpCode::PushBytes50,
            OP_PUSHBYTES_51 => OpCode::PushBytes51,
            OP_PUSHBYTES_52 => OpCode::PushBytes52,
            OP_PUSHBYTES_53 => OpCode::PushBytes53,
            OP_PUSHBYTES_54 => OpCode::PushBytes54,
            OP_PUSHBYTES_55 => OpCode::PushBytes55,
            OP_PUSHBYTES_56 => OpCode::PushBytes56,
            OP_PUSHBYTES_57 => OpCode::PushBytes57,
            OP_PUSHBYTES_58 => OpCode::PushBytes58,
            OP_PUSHBYTES_59 => OpCode::PushBytes59,
            OP_PUSHBYTES_60 => OpCode::PushBytes60,
            OP_PUSHBYTES_61 => OpCode::PushBytes61,
            OP_PUSHBYTES_62 => OpCode::PushBytes62,
            OP_PUSHBYTES_63 => OpCode::PushBytes63,
            OP_PUSHBYTES_64 => OpCode::PushBytes64,
            OP_PUSHBYTES_65 => OpCode::PushBytes65,
            OP_PUSHBYTES_66 => OpCode::PushBytes66,
            OP_PUSHBYTES_67 => OpCode::PushBytes67,
            OP_PUSHBYTES_68 => OpCode::PushBytes68,
            OP_PUSHBYTES_69 => OpCode::PushBytes69,
            OP_PUSHBYTES_70 => OpCode::PushBytes70,
            OP_PUSHBYTES_71 => OpCode::PushBytes71,
            OP_PUSHBYTES_72 => OpCode::PushBytes72,
            OP_PUSHBYTES_73 => OpCode::PushBytes73,
            OP_PUSHBYTES_74 => OpCode::PushBytes74,
            OP_PUSHBYTES_75 => OpCode::PushBytes75,
            OP_PUSHDATA1 => OpCode::PushData1,
            OP_PUSHDATA2 => OpCode::PushData2,
            OP_PUSHDATA4 => OpCode::PushData4,
            OP_PUSHNUM_NEG1 => OpCode::PushNumNeg1,
            OP_RESERVED => OpCode::Reserved,
            OP_PUSHNUM_1 => OpCode::PushNum1,
            OP_PUSHNUM_2 => OpCode::PushNum2,
            OP_PUSHNUM_3 => OpCode::PushNum3,
            OP_PUSHNUM_4 => OpCode::PushNum4,
            OP_PUSHNUM_5 => OpCode::PushNum5,
            OP_PUSHNUM_6 => OpCode::PushNum6,
            OP_PUSHNUM_7 => OpCode::PushNum7,
            OP_PUSHNUM_8 => OpCode::PushNum8,
            OP_PUSHNUM_9 => OpCode::PushNum9,
            OP_PUSHNUM_10 => OpCode::PushNum10,
            OP_PUSHNUM_11 => OpCode::PushNum11,
            OP_PUSHNUM_12 => OpCode::PushNum12,
            OP_PUSHNUM_13 => OpCode::PushNum13,
            OP_PUSHNUM_14 => OpCode::PushNum14,
            OP_PUSHNUM_15 => OpCode::PushNum15,
            OP_PUSHNUM_16 => OpCode::PushNum16,
            // SAFETY: Nop..Nop10 are assigned discriminants 0x61, 0xb0..=0xb9 — but this arm
            // only ever sees 0x61 (OP_NOP); the rest are matched below.
            OP_NOP => OpCode::Nop,
            OP_VER => OpCode::Ver,
            OP_IF => OpCode::If,
            OP_NOTIF => OpCode::NotIf,
            OP_VERIF => OpCode::Verif,
            OP_VERNOTIF => OpCode::Vernotif,
            OP_ELSE => OpCode::Else,
            OP_ENDIF => OpCode::EndIf,
            OP_VERIFY => OpCode::Verify,
            OP_RETURN => OpCode::Return,
            OP_TOALTSTACK => OpCode::ToAltStack,
            OP_FROMALTSTACK => OpCode::FromAltStack,
            OP_2DROP => OpCode::TwoDrop,
            OP_2DUP => OpCode::TwoDup,
            OP_3DUP => OpCode::ThreeDup,
            OP_2OVER => OpCode::TwoOver,
            OP_2ROT => OpCode::TwoRot,
            OP_2SWAP => OpCode::TwoSwap,
            OP_IFDUP => OpCode::IfDup,
            OP_DEPTH => OpCode::Depth,
            OP_DROP => OpCode::Drop,
            OP_DUP => OpCode::Dup,
            OP_NIP => OpCode::Nip,
            OP_OVER => OpCode::Over,
            OP_PICK => OpCode::Pick,
            OP_ROLL => OpCode::Roll,
            OP_ROT => OpCode::Rot,
            OP_SWAP => OpCode::Swap,
            OP_TUCK => OpCode::Tuck,
            OP_CAT => OpCode::Cat,
            OP_SUBSTR => OpCode::Substr,
            OP_LEFT => OpCode::Left,
            OP_RIGHT => OpCode::Right,
            OP_SIZE => OpCode::Size,
            OP_INVERT => OpCode::Invert,
            OP_AND => OpCode::And,
            OP_OR => OpCode::Or,
            OP_XOR => OpCode::Xor,
            OP_EQUAL => OpCode::Equal,
            OP_EQUALVERIFY => OpCode::EqualVerify,
            OP_RESERVED1 => OpCode::Reserved1,
            OP_RESERVED2 => OpCode::Reserved2,
            OP_1ADD => OpCode::Add1,
            OP_1SUB => OpCode::Sub1,
            OP_2MUL => OpCode::Mul2,
            OP_2DIV => OpCode::Div2,
            OP_NEGATE => OpCode::Negate,
            OP_ABS => OpCode::Abs,
            OP_NOT => OpCode::Not,
            OP_0NOTEQUAL => OpCode::NotEqual0,
            OP_ADD => OpCode::Add,
            OP_SUB => OpCode::Sub,
            OP_MUL => OpCode::Mul,
            OP_DIV => OpCode::Div,
            OP_MOD => OpCode::Mod,
            OP_LSHIFT => OpCode::Lshift,
            OP_RSHIFT => OpCode::Rshift,
            OP_BOOLAND => OpCode::BoolAnd,
            OP_BOOLOR => OpCode::BoolOr,
            OP_NUMEQUAL => OpCode::NumEqual,
            OP_NUMEQUALVERIFY => OpCode::NumEqualVerify,
            OP_NUMNOTEQUAL => OpCode::NumNotEqual,
            OP_LESSTHAN => OpCode::LessThan,
            OP_GREATERTHAN => OpCode::GreaterThan,
            OP_LESSTHANOREQUAL => OpCode::LessThanOrEqual,
            OP_GREATERTHANOREQUAL => OpCode::GreaterThanOrEqual,
            OP_MIN => OpCode::Min,
            OP_MAX => OpCode::Max,
            OP_WITHIN => OpCode::Within,
            OP_RIPEMD160 => OpCode::Ripemd160,
            OP_SHA1 => OpCode::Sha1,
            OP_SHA256 => OpCode::Sha256,
            OP_HASH160 => OpCode::Hash160,
            OP_HASH256 => OpCode::Hash256,
            OP_CODESEPARATOR => OpCode::CodeSeparator,
            OP_CHECKSIG => OpCode::CheckSig,
            OP_CHECKSIGVERIFY => OpCode::CheckSigVerify,
            OP_CHECKMULTISIG => OpCode::CheckMultisig,
            OP_CHECKMULTISIGVERIFY => OpCode::CheckMultisigVerify,
            OP_NOP1 => OpCode::Nop1,
            OP_CLTV => OpCode::Cltv,
            OP_CSV => OpCode::Csv,
            OP_NOP4 => OpCode::Nop4,
            OP_NOP5 => OpCode::Nop5,
            OP_NOP6 => OpCode::Nop6,
            OP_NOP7 => OpCode::Nop7,
            OP_NOP8 => OpCode::Nop8,
            OP_NOP9 => OpCode::Nop9,
            OP_NOP10 => OpCode::Nop10,
            OP_CHECKSIGADD => OpCode::CheckSigAdd,
            _ => OpCode::InvalidOpcode,
        }
    }

    #[inline]
    pub fn into_code(self) -> u8 { self as u8 }

    /// Whether the opcode pushes literal data (`OP_PUSHBYTES_0..=75`,
    /// `OP_PUSHDATA1/2/4`).
    pub fn is_push(self) -> bool {
        matches!(self as u8, OP_PUSHBYTES_0..=OP_PUSHBYTES_75 | OP_PUSHDATA1 | OP_PUSHDATA2 | OP_PUSHDATA4)
    }
}

#[derive(Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From, Default)]
#[wrapper(Deref, AsSlice, Hex)]
#[wrapper_mut(DerefMut, AsSliceMut)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct SigScript(ScriptBytes);

impl TryFrom<Vec<u8>> for SigScript {
    type Error = confinement::Error;
    fn try_from(script_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        ScriptBytes::try_from(script_bytes).map(Self)
    }
}

impl SigScript {
    #[inline]
    pub fn empty() -> Self { SigScript::default() }

    #[inline]
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(ScriptBytes::from(Confined::with_capacity(capacity)))
    }

    /// Constructs script object assuming the script length is less than 4GB.
    /// Panics otherwise.
    #[inline]
    pub fn from_unsafe(script_bytes: Vec<u8>) -> Self {
        Self(ScriptBytes::from_unsafe(script_bytes))
    }

    #[inline]
    pub fn push_slice(&mut self, data: &[u8]) { self.0.push_slice(data) }

    #[inline]
    pub fn as_script_bytes(&self) -> &ScriptBytes { &self.0 }
}

#[derive(Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From, Default)]
#[wrapper(Deref, AsSlice, Hex)]
#[wrapper_mut(DerefMut, AsSliceMut)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct ScriptPubkey(ScriptBytes);

impl TryFrom<Vec<u8>> for ScriptPubkey {
    type Error = confinement::Error;
    fn try_from(script_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        ScriptBytes::try_from(script_bytes).map(Self)
    }
}

impl ScriptPubkey {
    #[inline]
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(ScriptBytes::from(Confined::with_capacity(capacity)))
    }

    /// Constructs script object assuming the script length is less than 4GB.
    /// Panics otherwise.
    #[inline]
    pub fn from_unsafe(script_bytes: Vec<u8>) -> Self {
        Self(ScriptBytes::from_unsafe(script_bytes))
    }

    pub fn p2pk(pubkey_bytes: &[u8]) -> Self {
        let mut script = Self::with_capacity(ScriptBytes::len_for_slice(pubkey_bytes.len()) + 1);
        script.push_slice(pubkey_bytes);
        script.push_opcode(OpCode::CheckSig);
        script
    }

    pub fn p2pkh(hash: impl Into<[u8; 20]>) -> Self {
        let mut script = Self::with_capacity(25);
        script.push_opcode(OpCode::Dup);
        script.push_opcode(OpCode::Hash160);
        script.push_slice(&hash.into());
        script.push_opcode(OpCode::EqualVerify);
        script.push_opcode(OpCode::CheckSig);
        script
    }

    pub fn p2sh(hash: impl Into<[u8; 20]>) -> Self {
        let mut script = Self::with_capacity(23);
        script.push_opcode(OpCode::Hash160);
        script.push_slice(&hash.into());
        script.push_opcode(OpCode::Equal);
        script
    }

    pub fn p2wpkh(hash: impl Into<[u8; 20]>) -> Self {
        let mut script = Self::with_capacity(22);
        script.push_opcode(OpCode::PushBytes0);
        script.push_slice(&hash.into());
        script
    }

    pub fn p2wsh(hash: impl Into<[u8; 32]>) -> Self {
        let mut script = Self::with_capacity(34);
        script.push_opcode(OpCode::PushBytes0);
        script.push_slice(&hash.into());
        script
    }

    /// Key-path-only P2TR output: `OP_1 <32-byte output key>`.
    pub fn p2tr(output_key: impl Into<[u8; 32]>) -> Self {
        let mut script = Self::with_capacity(34);
        script.push_opcode(OpCode::PushNum1);
        script.push_slice(&output_key.into());
        script
    }

    pub fn op_return(data: &[u8]) -> Self {
        let mut script = Self::with_capacity(ScriptBytes::len_for_slice(data.len()) + 1);
        script.push_opcode(OpCode::Return);
        script.push_slice(data);
        script
    }

    /// Checks whether a script pubkey is a P2PK output.
    #[inline]
    pub fn is_p2pk(&self) -> bool {
        let len = self.0.len();
        (len == 67 && self.0[0] == OP_PUSHBYTES_65 && self.0[66] == OP_CHECKSIG) ||
            (len == 35 && self.0[0] == OP_PUSHBYTES_33 && self.0[34] == OP_CHECKSIG)
    }

    /// Checks whether a script pubkey is a P2PKH output.
    #[inline]
    pub fn is_p2pkh(&self) -> bool {
        self.0.len() == 25 &&
            self.0[0] == OP_DUP &&
            self.0[1] == OP_HASH160 &&
            self.0[2] == OP_PUSHBYTES_20 &&
            self.0[23] == OP_EQUALVERIFY &&
            self.0[24] == OP_CHECKSIG
    }

    /// Checks whether a script pubkey is a P2SH output.
    #[inline]
    pub fn is_p2sh(&self) -> bool {
        self.0.len() == 23 &&
            self.0[0] == OP_HASH160 &&
            self.0[1] == OP_PUSHBYTES_20 &&
            self.0[22] == OP_EQUAL
    }

    /// Checks whether a script pubkey is a native-segwit P2WPKH output.
    #[inline]
    pub fn is_p2wpkh(&self) -> bool {
        self.0.len() == 22 && self.0[0] == OP_PUSHBYTES_0 && self.0[1] == OP_PUSHBYTES_20
    }

    /// Checks whether a script pubkey is a native-segwit P2WSH output.
    #[inline]
    pub fn is_p2wsh(&self) -> bool {
        self.0.len() == 34 && self.0[0] == OP_PUSHBYTES_0 && self.0[1] == OP_PUSHBYTES_32
    }

    /// Checks whether a script pubkey is a key-path-shaped P2TR output
    /// (`OP_1 <32 bytes>`). Does not distinguish a valid x-only point from
    /// an arbitrary 32-byte value.
    #[inline]
    pub fn is_p2tr(&self) -> bool {
        self.0.len() == 34 && self.0[0] == OP_PUSHNUM_1 && self.0[1] == OP_PUSHBYTES_32
    }

    /// Checks whether a script pubkey is a bare multisig (`P2MS`) output:
    /// `OP_m <pubkey>...<pubkey> OP_n OP_CHECKMULTISIG`.
    pub fn is_p2ms(&self) -> bool {
        let bytes = self.0.as_slice();
        if bytes.len() < 3 || *bytes.last().unwrap() != OP_CHECKMULTISIG {
            return false;
        }
        let m = match bytes[0] {
            b @ OP_PUSHNUM_1..=OP_PUSHNUM_16 => b - OP_PUSHNUM_1 + 1,
            _ => return false,
        };
        let mut pos = 1;
        let mut count = 0u8;
        while pos < bytes.len() - 2 {
            match bytes[pos] {
                OP_PUSHBYTES_33 | OP_PUSHBYTES_65 => {
                    let len = bytes[pos] as usize;
                    if pos + 1 + len > bytes.len() - 2 {
                        return false;
                    }
                    pos += 1 + len;
                    count += 1;
                }
                _ => return false,
            }
        }
        let n = match bytes[bytes.len() - 2] {
            b @ OP_PUSHNUM_1..=OP_PUSHNUM_16 => b - OP_PUSHNUM_1 + 1,
            _ => return false,
        };
        m <= n && n == count
    }

    #[inline]
    pub fn is_op_return(&self) -> bool { !self.0.is_empty() && self.0[0] == OP_RETURN }

    /// Adds a single opcode to the script.
    #[inline]
    pub fn push_opcode(&mut self, op_code: OpCode) { self.0.push(op_code as u8) }

    #[inline]
    pub fn push_slice(&mut self, data: &[u8]) { self.0.push_slice(data) }

    #[inline]
    pub fn as_script_bytes(&self) -> &ScriptBytes { &self.0 }
}

#[derive(Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From, Default)]
#[wrapper(Deref, AsSlice, Hex)]
#[wrapper_mut(DerefMut, AsSliceMut)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct RedeemScript(ScriptBytes);

impl TryFrom<Vec<u8>> for RedeemScript {
    type Error = confinement::Error;
    fn try_from(script_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        ScriptBytes::try_from(script_bytes).map(Self)
    }
}

impl RedeemScript {
    #[inline]
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(ScriptBytes::from(Confined::with_capacity(capacity)))
    }

    /// Constructs script object assuming the script length is less than 4GB.
    /// Panics otherwise.
    #[inline]
    pub fn from_unsafe(script_bytes: Vec<u8>) -> Self {
        Self(ScriptBytes::from_unsafe(script_bytes))
    }

    /// Adds a single opcode to the script.
    #[inline]
    pub fn push_opcode(&mut self, op_code: OpCode) { self.0.push(op_code as u8); }

    #[inline]
    pub fn push_slice(&mut self, data: &[u8]) { self.0.push_slice(data) }

    #[inline]
    pub fn as_script_bytes(&self) -> &ScriptBytes { &self.0 }

    /// `hash160` of this redeem script, as used to build a P2SH output.
    pub fn script_hash(&self) -> [u8; 20] { bc_hashes::hash160(self.0.as_slice()) }
}

/// A witness script, as referenced by a P2WSH output or its P2SH-wrapped
/// variant.
#[derive(Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From, Default)]
#[wrapper(Deref, AsSlice, Hex)]
#[wrapper_mut(DerefMut, AsSliceMut)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct WitnessScript(ScriptBytes);

impl TryFrom<Vec<u8>> for WitnessScript {
    type Error = confinement::Error;
    fn try_from(script_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        ScriptBytes::try_from(script_bytes).map(Self)
    }
}

impl WitnessScript {
    #[inline]
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn from_unsafe(script_bytes: Vec<u8>) -> Self { Self(ScriptBytes::from_unsafe(script_bytes)) }

    #[inline]
    pub fn as_script_bytes(&self) -> &ScriptBytes { &self.0 }

    /// `sha256` of this witness script, as used to build a P2WSH output.
    pub fn script_hash(&self) -> [u8; 32] { bc_hashes::sha256(self.0.as_slice()) }
}

#[derive(Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, From)]
#[wrapper(Deref, AsSlice, Hex)]
#[wrapper_mut(DerefMut, AsSliceMut)]
pub struct ScriptBytes(VarIntArray<u8>);

impl TryFrom<Vec<u8>> for ScriptBytes {
    type Error = confinement::Error;
    fn try_from(script_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Confined::try_from(script_bytes).map(Self)
    }
}

impl ScriptBytes {
    /// Constructs script object assuming the script length is less than 4GB.
    /// Panics otherwise.
    #[inline]
    pub fn from_unsafe(script_bytes: Vec<u8>) -> Self {
        Self(Confined::try_from(script_bytes).expect("script exceeding 4GB"))
    }

    /// Adds instructions to push some arbitrary data onto the stack,
    /// preferring the shortest push opcode (push-minimality).
    ///
    /// ## Panics
    ///
    /// The method panics if `data` length is greater or equal to
    /// 0x100000000.
    pub fn push_slice(&mut self, data: &[u8]) {
        match data.len() as u64 {
            n if n < OP_PUSHDATA1 as u64 => {
                self.push(n as u8);
            }
            n if n < 0x100 => {
                self.push(OP_PUSHDATA1);
                self.push(n as u8);
            }
            n if n < 0x10000 => {
                self.push(OP_PUSHDATA2);
                self.push((n % 0x100) as u8);
                self.push((n / 0x100) as u8);
            }
            n if n < 0x100000000 => {
                self.push(OP_PUSHDATA4);
                self.push((n % 0x100) as u8);
                self.push(((n / 0x100) % 0x100) as u8);
                self.push(((n / 0x10000) % 0x100) as u8);
                self.push((n / 0x1000000) as u8);
            }
            _ => panic!("tried to put a 4bn+ sized object into a script!"),
        }
        self.extend(data);
    }

    #[inline]
    pub(crate) fn push(&mut self, data: u8) { self.0.push(data).expect("script exceeds 4GB") }

    #[inline]
    pub(crate) fn extend(&mut self, data: &[u8]) {
        self.0
            .extend(data.iter().copied())
            .expect("script exceeds 4GB")
    }

    /// Computes the sum of `len` and the lenght of an appropriate push
    /// opcode.
    pub fn len_for_slice(len: usize) -> usize {
        len + match len {
            0..=0x4b => 1,
            0x4c..=0xff => 2,
            0x100..=0xffff => 3,
            // we don't care about oversized, the other fn will panic anyway
            _ => 5,
        }
    }

    pub fn len_var_int(&self) -> VarInt { VarInt(self.len() as u64) }

    pub fn into_vec(self) -> Vec<u8> { self.0.into_inner() }

    pub(crate) fn as_var_int_array(&self) -> &VarIntArray<u8> { &self.0 }
}

#[cfg(feature = "serde")]
mod _serde {
    use amplify::hex::{FromHex, ToHex};
    use serde::{Deserialize, Serialize};
    use serde_crate::de::Error;
    use serde_crate::{Deserializer, Serializer};

    use super::*;

    impl Serialize for ScriptBytes {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.to_hex())
            } else {
                serializer.serialize_bytes(self.as_slice())
            }
        }
    }

    impl<'de> Deserialize<'de> for ScriptBytes {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            if deserializer.is_human_readable() {
                String::deserialize(deserializer).and_then(|string| {
                    Self::from_hex(&string).map_err(|_| D::Error::custom("wrong hex data"))
                })
            } else {
                let bytes = Vec::<u8>::deserialize(deserializer)?;
                ScriptBytes::try_from(bytes)
                    .map_err(|_| D::Error::custom("invalid script length exceeding 4GB"))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn p2pkh_classifier() {
        let script = ScriptPubkey::p2pkh([0x11u8; 20]);
        assert!(script.is_p2pkh());
        assert!(!script.is_p2sh());
    }

    #[test]
    fn p2wpkh_classifier() {
        let script = ScriptPubkey::p2wpkh([0x22u8; 20]);
        assert!(script.is_p2wpkh());
        assert_eq!(script.len(), 22);
    }

    #[test]
    fn p2tr_classifier() {
        let script = ScriptPubkey::p2tr([0x33u8; 32]);
        assert!(script.is_p2tr());
        assert_eq!(script.len(), 34);
    }

    #[test]
    fn opcode_roundtrip() {
        for byte in [0x00u8, 0x4c, 0x51, 0x76, 0xa9, 0xac, 0xae, 0xb1, 0xb2] {
            let op = OpCode::from_byte(byte);
            assert_eq!(op.into_code(), byte);
        }
    }
}

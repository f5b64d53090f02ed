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

use bc_consensus::opcodes::*;
use bc_consensus::{LegacySig, OpCode, RelativeLockTime, SeqNo};

use crate::numbers::{cast_to_bool, ScriptNum};
use crate::{ExecError, SignatureChecker, Stack};

/// Result of running a script to completion: whether the top stack item was
/// truthy at the end (the usual definition of script success), together
/// with the final stack contents so a caller chaining scripts (P2SH/P2WSH)
/// can seed the next run.
pub struct Runner {
    success: bool,
    stack: Stack,
}

impl Runner {
    pub fn success(&self) -> bool { self.success }

    pub fn stack(&self) -> &Stack { &self.stack }

    pub fn into_stack(self) -> Stack { self.stack }
}

/// A balanced `IF`/`NOTIF`/`ELSE`/`ENDIF` frame on the control-flow stack.
struct Frame {
    /// Whether this branch is currently executing (all enclosing frames are
    /// also executing and no `ELSE` flip has disabled it).
    executing: bool,
    /// Whether the `ELSE` branch of this frame has already been taken.
    else_seen: bool,
}

/// Executes `script` against `initial_stack`, using `checker` to resolve
/// `CHECKSIG`/`CHECKMULTISIG`/`CLTV`/`CSV` against the transaction context.
///
/// This function only ever runs a single script body; recognizing and
/// chaining P2SH/P2WSH/P2WPKH redeem scripts is the caller's job (see the
/// transaction verifier), since doing so here would require this crate to
/// know about transaction/UTXO types.
pub fn run(script: &[u8], initial_stack: Stack, checker: &dyn SignatureChecker) -> Result<Runner, ExecError> {
    let mut stack = initial_stack;
    let mut alt_stack = Stack::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut code_separator_pos = 0usize;

    let mut pos = 0usize;
    while pos < script.len() {
        let byte = script[pos];
        let op = OpCode::from_byte(byte);
        let op_pos = pos;
        pos += 1;

        let executing = frames.iter().all(|f| f.executing);

        // Control-flow opcodes must be evaluated regardless of the current
        // execution state so that IF/ENDIF balance is always tracked, and so
        // VERIF/VERNOTIF/RESERVED* abort unconditionally per consensus rules.
        match op {
            OpCode::Verif | OpCode::Vernotif => {
                return Err(ExecError::runtime(op_pos, "OP_VERIF/OP_VERNOTIF is always invalid"));
            }
            OpCode::If | OpCode::NotIf => {
                let mut branch = false;
                if executing {
                    let top = stack.pop(op_pos)?;
                    branch = cast_to_bool(&top);
                    if op == OpCode::NotIf {
                        branch = !branch;
                    }
                }
                frames.push(Frame {
                    executing: executing && branch,
                    else_seen: false,
                });
                continue;
            }
            OpCode::Else => {
                let frame = frames
                    .last_mut()
                    .ok_or_else(|| ExecError::syntax(op_pos, "OP_ELSE without matching OP_IF"))?;
                if frame.else_seen {
                    return Err(ExecError::syntax(op_pos, "multiple OP_ELSE for one OP_IF"));
                }
                let parent_executing = frames[..frames.len() - 1].iter().all(|f| f.executing);
                let frame = frames.last_mut().unwrap();
                frame.executing = parent_executing && !frame.executing;
                frame.else_seen = true;
                continue;
            }
            OpCode::EndIf => {
                frames.pop().ok_or_else(|| ExecError::syntax(op_pos, "OP_ENDIF without matching OP_IF"))?;
                continue;
            }
            _ if !executing => continue,
            _ => {}
        }

        if op.is_push() {
            let data = read_push(script, op, op_pos, &mut pos)?;
            stack.push(data);
            continue;
        }
        if byte == OP_PUSHNUM_NEG1 {
            stack.push(ScriptNum::new(-1).encode());
            continue;
        }
        if (OP_PUSHNUM_1..=OP_PUSHNUM_16).contains(&byte) {
            let n = (byte - OP_PUSHNUM_1 + 1) as i64;
            stack.push(ScriptNum::new(n).encode());
            continue;
        }

        match op {
            OpCode::Nop
            | OpCode::Nop1
            | OpCode::Nop4
            | OpCode::Nop5
            | OpCode::Nop6
            | OpCode::Nop7
            | OpCode::Nop8
            | OpCode::Nop9
            | OpCode::Nop10 => {}

            OpCode::Verify => {
                let top = stack.pop(op_pos)?;
                if !cast_to_bool(&top) {
                    return Err(ExecError::runtime(op_pos, "OP_VERIFY failed"));
                }
            }
            OpCode::Return => return Err(ExecError::runtime(op_pos, "OP_RETURN")),

            OpCode::ToAltStack => {
                let top = stack.pop(op_pos)?;
                alt_stack.push(top);
            }
            OpCode::FromAltStack => {
                let top = alt_stack.pop(op_pos)?;
                stack.push(top);
            }
            OpCode::TwoDrop => {
                stack.pop(op_pos)?;
                stack.pop(op_pos)?;
            }
            OpCode::TwoDup => {
                let a = stack.top(1, op_pos)?.clone();
                let b = stack.top(0, op_pos)?.clone();
                stack.push(a);
                stack.push(b);
            }
            OpCode::ThreeDup => {
                let a = stack.top(2, op_pos)?.clone();
                let b = stack.top(1, op_pos)?.clone();
                let c = stack.top(0, op_pos)?.clone();
                stack.push(a);
                stack.push(b);
                stack.push(c);
            }
            OpCode::TwoOver => {
                let a = stack.top(3, op_pos)?.clone();
                let b = stack.top(2, op_pos)?.clone();
                stack.push(a);
                stack.push(b);
            }
            OpCode::TwoRot => {
                let a = stack.remove(5, op_pos)?;
                let b = stack.remove(4, op_pos)?;
                stack.push(a);
                stack.push(b);
            }
            OpCode::TwoSwap => {
                let a = stack.remove(3, op_pos)?;
                let b = stack.remove(2, op_pos)?;
                stack.push(a);
                stack.push(b);
            }
            OpCode::IfDup => {
                let top = stack.top(0, op_pos)?.clone();
                if cast_to_bool(&top) {
                    stack.push(top);
                }
            }
            OpCode::Depth => stack.push(ScriptNum::new(stack.len() as i64).encode()),
            OpCode::Drop => {
                stack.pop(op_pos)?;
            }
            OpCode::Dup => {
                let top = stack.top(0, op_pos)?.clone();
                stack.push(top);
            }
            OpCode::Nip => {
                stack.remove(1, op_pos)?;
            }
            OpCode::Over => {
                let item = stack.top(1, op_pos)?.clone();
                stack.push(item);
            }
            OpCode::Pick | OpCode::Roll => {
                let n = ScriptNum::decode(&stack.pop(op_pos)?, ScriptNum::MAX_NUM_SIZE, op_pos)?.value();
                if n < 0 {
                    return Err(ExecError::runtime(op_pos, "negative stack index"));
                }
                let item = if op == OpCode::Pick {
                    stack.top(n as usize, op_pos)?.clone()
                } else {
                    stack.remove(n as usize, op_pos)?
                };
                stack.push(item);
            }
            OpCode::Rot => {
                let item = stack.remove(2, op_pos)?;
                stack.push(item);
            }
            OpCode::Swap => {
                let item = stack.remove(1, op_pos)?;
                stack.push(item);
            }
            OpCode::Tuck => {
                let top = stack.top(0, op_pos)?.clone();
                stack.insert(2, top, op_pos)?;
            }

            OpCode::Size => {
                let len = stack.top(0, op_pos)?.len();
                stack.push(ScriptNum::new(len as i64).encode());
            }

            OpCode::Equal | OpCode::EqualVerify => {
                let b = stack.pop(op_pos)?;
                let a = stack.pop(op_pos)?;
                let eq = a == b;
                if op == OpCode::EqualVerify {
                    if !eq {
                        return Err(ExecError::runtime(op_pos, "OP_EQUALVERIFY failed"));
                    }
                } else {
                    stack.push(bool_bytes(eq));
                }
            }

            OpCode::Add1 | OpCode::Sub1 | OpCode::Negate | OpCode::Abs | OpCode::Not | OpCode::NotEqual0 => {
                let n = ScriptNum::decode(&stack.pop(op_pos)?, ScriptNum::MAX_NUM_SIZE, op_pos)?.value();
                let result = match op {
                    OpCode::Add1 => n + 1,
                    OpCode::Sub1 => n - 1,
                    OpCode::Negate => -n,
                    OpCode::Abs => n.abs(),
                    OpCode::Not => i64::from(n == 0),
                    OpCode::NotEqual0 => i64::from(n != 0),
                    _ => unreachable!(),
                };
                stack.push(ScriptNum::new(result).encode());
            }

            OpCode::Add
            | OpCode::Sub
            | OpCode::BoolAnd
            | OpCode::BoolOr
            | OpCode::NumEqual
            | OpCode::NumEqualVerify
            | OpCode::NumNotEqual
            | OpCode::LessThan
            | OpCode::GreaterThan
            | OpCode::LessThanOrEqual
            | OpCode::GreaterThanOrEqual
            | OpCode::Min
            | OpCode::Max => {
                let b = ScriptNum::decode(&stack.pop(op_pos)?, ScriptNum::MAX_NUM_SIZE, op_pos)?.value();
                let a = ScriptNum::decode(&stack.pop(op_pos)?, ScriptNum::MAX_NUM_SIZE, op_pos)?.value();
                if op == OpCode::NumEqualVerify {
                    if a != b {
                        return Err(ExecError::runtime(op_pos, "OP_NUMEQUALVERIFY failed"));
                    }
                    continue;
                }
                let result = match op {
                    OpCode::Add => ScriptNum::new(a + b).encode(),
                    OpCode::Sub => ScriptNum::new(a - b).encode(),
                    OpCode::BoolAnd => bool_bytes(a != 0 && b != 0),
                    OpCode::BoolOr => bool_bytes(a != 0 || b != 0),
                    OpCode::NumEqual => bool_bytes(a == b),
                    OpCode::NumNotEqual => bool_bytes(a != b),
                    OpCode::LessThan => bool_bytes(a < b),
                    OpCode::GreaterThan => bool_bytes(a > b),
                    OpCode::LessThanOrEqual => bool_bytes(a <= b),
                    OpCode::GreaterThanOrEqual => bool_bytes(a >= b),
                    OpCode::Min => ScriptNum::new(a.min(b)).encode(),
                    OpCode::Max => ScriptNum::new(a.max(b)).encode(),
                    _ => unreachable!(),
                };
                stack.push(result);
            }
            OpCode::Within => {
                let max = ScriptNum::decode(&stack.pop(op_pos)?, ScriptNum::MAX_NUM_SIZE, op_pos)?.value();
                let min = ScriptNum::decode(&stack.pop(op_pos)?, ScriptNum::MAX_NUM_SIZE, op_pos)?.value();
                let x = ScriptNum::decode(&stack.pop(op_pos)?, ScriptNum::MAX_NUM_SIZE, op_pos)?.value();
                stack.push(bool_bytes(x >= min && x < max));
            }

            OpCode::Ripemd160 => {
                let data = stack.pop(op_pos)?;
                stack.push(bc_hashes::ripemd160(&data).to_vec());
            }
            OpCode::Sha256 => {
                let data = stack.pop(op_pos)?;
                stack.push(bc_hashes::sha256(&data).to_vec());
            }
            OpCode::Hash160 => {
                let data = stack.pop(op_pos)?;
                stack.push(bc_hashes::hash160(&data).to_vec());
            }
            OpCode::Hash256 => {
                let data = stack.pop(op_pos)?;
                stack.push(bc_hashes::hash256(&data).to_vec());
            }
            OpCode::Sha1 => {
                return Err(ExecError::opcode(byte, op_pos));
            }
            OpCode::CodeSeparator => code_separator_pos = pos,

            OpCode::CheckSig | OpCode::CheckSigVerify => {
                let pubkey = stack.pop(op_pos)?;
                let sig_bytes = stack.pop(op_pos)?;
                let ok = check_sig(&sig_bytes, &pubkey, &script[code_separator_pos..], checker);
                if op == OpCode::CheckSigVerify {
                    if !ok {
                        return Err(ExecError::runtime(op_pos, "OP_CHECKSIGVERIFY failed"));
                    }
                } else {
                    stack.push(bool_bytes(ok));
                }
            }
            OpCode::CheckSigAdd => {
                let pubkey = stack.pop(op_pos)?;
                let n = ScriptNum::decode(&stack.pop(op_pos)?, ScriptNum::MAX_NUM_SIZE, op_pos)?.value();
                let sig_bytes = stack.pop(op_pos)?;
                let ok = check_sig(&sig_bytes, &pubkey, &script[code_separator_pos..], checker);
                stack.push(ScriptNum::new(n + ok as i64).encode());
            }

            OpCode::CheckMultisig | OpCode::CheckMultisigVerify => {
                let ok = check_multisig(&mut stack, &script[code_separator_pos..], checker, op_pos)?;
                if op == OpCode::CheckMultisigVerify {
                    if !ok {
                        return Err(ExecError::runtime(op_pos, "OP_CHECKMULTISIGVERIFY failed"));
                    }
                } else {
                    stack.push(bool_bytes(ok));
                }
            }

            OpCode::Cltv => {
                let n = ScriptNum::decode(stack.top(0, op_pos)?, ScriptNum::MAX_LOCKTIME_NUM_SIZE, op_pos)?.value();
                if n < 0 {
                    return Err(ExecError::runtime(op_pos, "OP_CHECKLOCKTIMEVERIFY: negative locktime"));
                }
                if checker.input_sequence() == SeqNo::FINAL {
                    return Err(ExecError::runtime(op_pos, "OP_CHECKLOCKTIMEVERIFY: input is final"));
                }
                let satisfied = checker
                    .tx_locktime()
                    .is_satisfied_by(n as u32)
                    .ok_or_else(|| ExecError::runtime(op_pos, "OP_CHECKLOCKTIMEVERIFY: kind mismatch"))?;
                if !satisfied {
                    return Err(ExecError::runtime(op_pos, "OP_CHECKLOCKTIMEVERIFY: not yet satisfied"));
                }
            }
            OpCode::Csv => {
                let n = ScriptNum::decode(stack.top(0, op_pos)?, ScriptNum::MAX_LOCKTIME_NUM_SIZE, op_pos)?.value();
                if n < 0 {
                    return Err(ExecError::runtime(op_pos, "OP_CHECKSEQUENCEVERIFY: negative value"));
                }
                let required = SeqNo::from_consensus_u32(n as u32);
                if required.is_relative_disabled() {
                    // BIP112: disabled comparands are always satisfied.
                } else {
                    if checker.tx_version() < 2 {
                        return Err(ExecError::runtime(op_pos, "OP_CHECKSEQUENCEVERIFY: tx version < 2"));
                    }
                    let actual = checker.input_sequence();
                    if actual.is_relative_disabled() {
                        return Err(ExecError::runtime(op_pos, "OP_CHECKSEQUENCEVERIFY: input disables relative locktime"));
                    }
                    let satisfied = match (required.relative_lock_time(), actual.relative_lock_time()) {
                        (RelativeLockTime::Blocks(req), RelativeLockTime::Blocks(got)) => got >= req,
                        (RelativeLockTime::Time512Sec(req), RelativeLockTime::Time512Sec(got)) => got >= req,
                        (RelativeLockTime::Disabled, _) | (_, RelativeLockTime::Disabled) => true,
                        _ => return Err(ExecError::runtime(op_pos, "OP_CHECKSEQUENCEVERIFY: kind mismatch")),
                    };
                    if !satisfied {
                        return Err(ExecError::runtime(op_pos, "OP_CHECKSEQUENCEVERIFY: not yet satisfied"));
                    }
                }
            }

            OpCode::Ver | OpCode::Reserved | OpCode::Reserved1 | OpCode::Reserved2 => {
                return Err(ExecError::opcode(byte, op_pos));
            }
            OpCode::Cat
            | OpCode::Substr
            | OpCode::Left
            | OpCode::Right
            | OpCode::Invert
            | OpCode::And
            | OpCode::Or
            | OpCode::Xor
            | OpCode::Mul2
            | OpCode::Div2
            | OpCode::Mul
            | OpCode::Div
            | OpCode::Mod
            | OpCode::Lshift
            | OpCode::Rshift => {
                return Err(ExecError::opcode(byte, op_pos));
            }
            // `InvalidOpcode`, and anything else not recognized above
            // (control flow and push opcodes are already handled earlier
            // in the loop and never reach this match).
            _ => return Err(ExecError::opcode(byte, op_pos)),
        }
    }

    if !frames.is_empty() {
        return Err(ExecError::syntax(script.len(), "unbalanced OP_IF/OP_ENDIF"));
    }

    let success = !stack.is_empty() && cast_to_bool(stack.top(0, script.len())?);
    Ok(Runner { success, stack })
}

fn bool_bytes(b: bool) -> Vec<u8> { if b { vec![1] } else { Vec::new() } }

fn read_push(script: &[u8], op: OpCode, op_pos: usize, pos: &mut usize) -> Result<Vec<u8>, ExecError> {
    let len = match op.into_code() {
        byte @ OP_PUSHBYTES_0..=OP_PUSHBYTES_75 => byte as usize,
        OP_PUSHDATA1 => {
            let n = *script.get(*pos).ok_or_else(|| ExecError::syntax(op_pos, "OP_PUSHDATA1 truncated"))? as usize;
            *pos += 1;
            n
        }
        OP_PUSHDATA2 => {
            let bytes = script
                .get(*pos..*pos + 2)
                .ok_or_else(|| ExecError::syntax(op_pos, "OP_PUSHDATA2 truncated"))?;
            *pos += 2;
            u16::from_le_bytes([bytes[0], bytes[1]]) as usize
        }
        OP_PUSHDATA4 => {
            let bytes = script
                .get(*pos..*pos + 4)
                .ok_or_else(|| ExecError::syntax(op_pos, "OP_PUSHDATA4 truncated"))?;
            *pos += 4;
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
        }
        _ => unreachable!("read_push called with a non-push opcode"),
    };
    let data = script
        .get(*pos..*pos + len)
        .ok_or_else(|| ExecError::syntax(op_pos, "push opcode data truncated"))?
        .to_vec();
    *pos += len;
    Ok(data)
}

fn check_sig(sig_bytes: &[u8], pubkey: &[u8], subscript: &[u8], checker: &dyn SignatureChecker) -> bool {
    if sig_bytes.is_empty() {
        return false;
    }
    let sig = match LegacySig::from_bytes(sig_bytes) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    let digest = checker.digest(sig.sighash_type, subscript);
    checker.verify_signature(digest, pubkey, &sig.sig)
}

/// `OP_CHECKMULTISIG`/`OP_CHECKMULTISIGVERIFY`: pops `n` pubkeys, `m`
/// required signatures, and `m` signatures (plus the historical off-by-one
/// dummy element consumed due to a reference-client bug), verifying that
/// the signatures match an ordered, non-repeating subsequence of the
/// pubkeys.
fn check_multisig(
    stack: &mut Stack,
    subscript: &[u8],
    checker: &dyn SignatureChecker,
    pos: usize,
) -> Result<bool, ExecError> {
    let n = ScriptNum::decode(&stack.pop(pos)?, ScriptNum::MAX_NUM_SIZE, pos)?.value();
    if !(0..=16).contains(&n) {
        return Err(ExecError::runtime(pos, "OP_CHECKMULTISIG: invalid pubkey count"));
    }
    let mut pubkeys = Vec::with_capacity(n as usize);
    for _ in 0..n {
        pubkeys.push(stack.pop(pos)?);
    }
    let m = ScriptNum::decode(&stack.pop(pos)?, ScriptNum::MAX_NUM_SIZE, pos)?.value();
    if m < 0 || m > n {
        return Err(ExecError::runtime(pos, "OP_CHECKMULTISIG: invalid signature count"));
    }
    let mut sigs = Vec::with_capacity(m as usize);
    for _ in 0..m {
        sigs.push(stack.pop(pos)?);
    }
    // Historical off-by-one bug in the reference client: one extra item is
    // always popped and ignored.
    stack.pop(pos)?;

    let mut pubkey_idx = 0usize;
    let mut all_matched = true;
    for sig in sigs.iter().rev() {
        let mut matched = false;
        while pubkey_idx < pubkeys.len() {
            let candidate = &pubkeys[pubkeys.len() - 1 - pubkey_idx];
            pubkey_idx += 1;
            if check_sig(sig, candidate, subscript, checker) {
                matched = true;
                break;
            }
        }
        if !matched {
            all_matched = false;
            break;
        }
    }
    Ok(m == 0 || all_matched)
}

#[cfg(test)]
mod test {
    use bc_consensus::SighashType;

    use super::*;
    use crate::checker::NullChecker;

    #[test]
    fn simple_equal_succeeds() {
        let script = [OP_PUSHBYTES_1, 0x01, OP_PUSHBYTES_1, 0x01, OP_EQUAL];
        let runner = run(&script, Stack::new(), &NullChecker).unwrap();
        assert!(runner.success());
    }

    #[test]
    fn unequal_fails() {
        let script = [OP_PUSHBYTES_1, 0x01, OP_PUSHBYTES_1, 0x02, OP_EQUAL];
        let runner = run(&script, Stack::new(), &NullChecker).unwrap();
        assert!(!runner.success());
    }

    #[test]
    fn if_else_endif_selects_branch() {
        // push 1, IF push 0xAA ELSE push 0xBB ENDIF
        let script = [
            OP_PUSHNUM_1,
            OP_IF,
            OP_PUSHBYTES_1,
            0xaa,
            OP_ELSE,
            OP_PUSHBYTES_1,
            0xbb,
            OP_ENDIF,
        ];
        let runner = run(&script, Stack::new(), &NullChecker).unwrap();
        assert_eq!(runner.stack().as_slice(), &[vec![0xaa]]);
    }

    #[test]
    fn unbalanced_if_is_rejected() {
        let script = [OP_PUSHNUM_1, OP_IF];
        assert!(run(&script, Stack::new(), &NullChecker).is_err());
    }

    #[test]
    fn hash160_matches_consensus_hash() {
        let script = [OP_PUSHBYTES_3, b'a', b'b', b'c', OP_HASH160];
        let runner = run(&script, Stack::new(), &NullChecker).unwrap();
        assert_eq!(runner.stack().as_slice()[0], bc_hashes::hash160(b"abc").to_vec());
    }

    #[test]
    fn dup_and_drop_stack_ops() {
        let script = [OP_PUSHBYTES_1, 0x07, OP_DUP, OP_DROP];
        let runner = run(&script, Stack::new(), &NullChecker).unwrap();
        assert_eq!(runner.stack().as_slice(), &[vec![0x07]]);
    }

    #[test]
    fn disabled_opcode_rejected() {
        let script = [OP_CAT];
        assert!(run(&script, Stack::new(), &NullChecker).is_err());
    }

    #[test]
    fn checksig_with_null_checker_fails_closed() {
        let script = [OP_PUSHBYTES_1, 0x21, OP_PUSHBYTES_1, 0x21, OP_CHECKSIG];
        let runner = run(&script, Stack::new(), &NullChecker).unwrap();
        assert!(!runner.success());
        let _ = SighashType::all();
    }
}

// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The encoder (§4.5): for each candidate encoding registered under an
//! instruction's mnemonic, type-check the operand tuple against the
//! candidate's AOTDL list; on the first match, emit prefixes, stem,
//! ModR/M (+SIB), and trailing immediate-shaped bytes in canonical order.

use x86_codec_types::{
    CodecError, CodecResult, GroupOnePrefix, Immediate, Instruction, Operand, RegisterClass,
    Segment,
};

use crate::aot::{Aot, ImmKind};
use crate::byte_stream::MAX_INSTRUCTION_LEN;
use crate::encode_table::{self, Candidate, RegField};
use crate::modrm::{self, MemParts16, MemParts32, RegOrMem16, RegOrMem32};
use crate::typecheck::{self, TypeCheckInfo};

/// Resolves a `SizePrefix`/`AddrPrefix` AOTDL node down to the leaf that the
/// final prefix decision selects; everything else is already a leaf.
fn resolve_leaf<'a>(aot: &'a Aot, size_pfx: bool, addr_pfx: bool) -> &'a Aot {
    match aot {
        Aot::SizePrefix(yes, no) => resolve_leaf(if size_pfx { yes } else { no }, size_pfx, addr_pfx),
        Aot::AddrPrefix(yes, no) => resolve_leaf(if addr_pfx { yes } else { no }, size_pfx, addr_pfx),
        other => other,
    }
}

fn operand_ordinal(op: &Operand) -> CodecResult<u8> {
    Ok(match op {
        Operand::Gpr8(r) => r.ordinal(),
        Operand::Gpr16(r) => r.ordinal(),
        Operand::Gpr32(r) => r.ordinal(),
        Operand::Segment(r) => r.ordinal(),
        Operand::Control(r) => r.ordinal(),
        Operand::Debug(r) => r.ordinal(),
        Operand::Fpu(r) => r.ordinal(),
        Operand::Mmx(r) => r.ordinal(),
        Operand::Xmm(r) => r.ordinal(),
        _ => {
            return Err(CodecError::internal(
                "operand cannot supply a register ordinal",
            ))
        }
    })
}

fn group1_byte(p: GroupOnePrefix) -> u8 {
    match p {
        GroupOnePrefix::Lock => 0xF0,
        GroupOnePrefix::Rep => 0xF3,
        GroupOnePrefix::Repne => 0xF2,
    }
}

fn seg_override_byte(s: Segment) -> u8 {
    match s {
        Segment::Es => 0x26,
        Segment::Cs => 0x2E,
        Segment::Ss => 0x36,
        Segment::Ds => 0x3E,
        Segment::Fs => 0x64,
        Segment::Gs => 0x65,
    }
}

fn encode_rm_register(ordinal: u8, reg_field: u8) -> Vec<u8> {
    vec![0b11_000_000 | ((reg_field & 0b111) << 3) | (ordinal & 0b111)]
}

/// Builds the ModR/M (+SIB+disp) bytes for whichever operand a candidate's
/// `RmSpec` names — a register of any class, or a `Mem16`/`Mem32`.
fn build_modrm(op: &Operand, reg_field: u8) -> CodecResult<Vec<u8>> {
    match op {
        Operand::Gpr8(_)
        | Operand::Gpr16(_)
        | Operand::Gpr32(_)
        | Operand::Segment(_)
        | Operand::Control(_)
        | Operand::Debug(_)
        | Operand::Fpu(_)
        | Operand::Mmx(_)
        | Operand::Xmm(_) => Ok(encode_rm_register(operand_ordinal(op)?, reg_field)),
        Operand::Mem32(m) => {
            let parts = MemParts32 {
                base: m.base,
                index: m.index,
                scale: m.scale,
                disp: m.disp,
            };
            Ok(modrm::encode32(&RegOrMem32::Mem(parts), reg_field))
        }
        Operand::Mem16(m) => {
            let parts = MemParts16 {
                base: m.base,
                index: m.index,
                disp: m.disp,
            };
            Ok(modrm::encode16(&RegOrMem16::Mem(parts), reg_field))
        }
        _ => Err(CodecError::invalid(
            "operand cannot occupy a ModR/M r/m position",
        )),
    }
}

/// The width, in bytes, that a leaf AOTDL node contributes to the trailing
/// (post-ModR/M) byte sequence, given the operand it was checked against.
/// Needed up front so a `JccTarget` operand among the trailing operands can
/// compute its displacement against the instruction's total predicted length
/// (§4.5 "Jump-target length prediction") without a second pass.
fn trailing_width(leaf: &Aot, op: &Operand, addr_pfx: bool) -> CodecResult<u32> {
    Ok(match leaf {
        Aot::Exact(_) | Aot::ExactSeg(_) | Aot::GPart(_) | Aot::RegOrMem { .. } | Aot::Mem(_) => 0,
        Aot::Imm(kind) => kind.width_bytes(),
        Aot::SignedImm(_) => 1,
        Aot::Moffs(_) => {
            if addr_pfx {
                2
            } else {
                4
            }
        }
        Aot::FarPtr16 => 4,
        Aot::FarPtr32 => 6,
        Aot::JccTarget(kind) => kind.width_bytes(),
        Aot::SizePrefix(..) | Aot::AddrPrefix(..) => {
            return Err(CodecError::internal("trailing_width given an unresolved AOTDL node"))
        }
    })
}

fn le_bytes(value: u32, width: u32) -> Vec<u8> {
    value.to_le_bytes()[..width as usize].to_vec()
}

/// Emits the trailing bytes (everything after ModR/M: immediates, moffs
/// displacements, far pointers, jump targets) for one operand.
fn emit_trailing(
    leaf: &Aot,
    op: &Operand,
    addr_pfx: bool,
    jcc_addr_after: u32,
) -> CodecResult<Vec<u8>> {
    match leaf {
        Aot::Exact(_) | Aot::ExactSeg(_) | Aot::GPart(_) | Aot::RegOrMem { .. } | Aot::Mem(_) => {
            Ok(vec![])
        }
        Aot::Imm(_) => match op {
            Operand::Immediate(imm) => Ok(match imm {
                Immediate::Imm8(v) => vec![*v],
                Immediate::Imm16(v) => v.to_le_bytes().to_vec(),
                Immediate::Imm32(v) => v.to_le_bytes().to_vec(),
            }),
            _ => Err(CodecError::internal("Imm AOT matched a non-immediate operand")),
        },
        Aot::SignedImm(_) => match op {
            Operand::Immediate(imm) => Ok(vec![imm.as_u32() as u8]),
            _ => Err(CodecError::internal("SignedImm AOT matched a non-immediate operand")),
        },
        Aot::Moffs(_) => match op {
            Operand::Mem32(m) => Ok(le_bytes(m.disp.unwrap_or(0), 4)),
            Operand::Mem16(m) => Ok(le_bytes(m.disp.unwrap_or(0) as u32, 2)),
            _ => Err(CodecError::internal("Moffs AOT matched a non-memory operand")),
        },
        Aot::FarPtr16 => match op {
            Operand::FarPtr16(p) => {
                let mut out = p.off.to_le_bytes().to_vec();
                out.extend(p.seg.to_le_bytes());
                Ok(out)
            }
            _ => Err(CodecError::internal("FarPtr16 AOT matched a mismatched operand")),
        },
        Aot::FarPtr32 => match op {
            Operand::FarPtr32(p) => {
                let mut out = p.off.to_le_bytes().to_vec();
                out.extend(p.seg.to_le_bytes());
                Ok(out)
            }
            _ => Err(CodecError::internal("FarPtr32 AOT matched a mismatched operand")),
        },
        Aot::JccTarget(kind) => match op {
            Operand::JccTarget(t) => {
                let width = kind.width_bytes();
                // A 32-bit displacement is `taken - addr_after mod 2^32`,
                // which always fits a u32 -- no range check needed. Only
                // the narrower Jb/Jw forms can actually overflow their
                // declared width.
                if width == 4 {
                    return Ok(le_bytes(t.taken.wrapping_sub(jcc_addr_after), 4));
                }
                let disp = (t.taken as i64) - (jcc_addr_after as i64);
                let fits = match width {
                    1 => (-128..=127).contains(&disp),
                    2 => (-32768..=32767).contains(&disp),
                    _ => unreachable!(),
                };
                if !fits {
                    return Err(CodecError::invalid(format!(
                        "jump target does not fit the encoding's {width}-byte displacement"
                    )));
                }
                Ok(le_bytes(disp as u32, width))
            }
            _ => Err(CodecError::internal("JccTarget AOT matched a mismatched operand")),
        },
        Aot::SizePrefix(..) | Aot::AddrPrefix(..) => {
            Err(CodecError::internal("emit_trailing given an unresolved AOTDL node"))
        }
    }
}

/// Type-checks `instr`'s operand tuple against one candidate, returning the
/// reduced `TypeCheckInfo` on success.
fn type_check_candidate(candidate: &Candidate, instr: &Instruction) -> Option<TypeCheckInfo> {
    if candidate.aots.len() != instr.operand_count() {
        return None;
    }
    let mut infos = Vec::with_capacity(candidate.aots.len());
    for (aot, op) in candidate.aots.iter().zip(instr.operands()) {
        infos.push(typecheck::check(aot, op)?);
    }
    typecheck::reduce_infos(&infos)
}

/// Finds the first candidate (in table order, §4.5.1) whose operand tuple
/// type-checks, returning it alongside the reduced side information.
fn select_candidate(instr: &Instruction) -> CodecResult<(&'static Candidate, TypeCheckInfo)> {
    let candidates = encode_table::table().get(&instr.mnemonic).ok_or_else(|| {
        CodecError::invalid(format!("no encoding registered for {}", instr.mnemonic))
    })?;
    for candidate in candidates {
        if let Some(info) = type_check_candidate(candidate, instr) {
            return Ok((candidate, info));
        }
    }
    Err(CodecError::invalid(format!(
        "no candidate encoding matches operand tuple for `{instr}`"
    )))
}

/// Encodes one instruction at `addr` (§6). `addr` only affects how a
/// `JccTarget` operand's displacement is computed.
pub fn encode(instr: &Instruction, addr: u32) -> CodecResult<Vec<u8>> {
    let (candidate, info) = select_candidate(instr)?;
    log::debug!("encode: {} matched a {}-operand candidate", instr.mnemonic, candidate.aots.len());

    let size_pfx = info.size_override.unwrap_or(candidate.force_size_prefix);
    let addr_pfx = info.addr_override.unwrap_or(false);

    let mut out = Vec::with_capacity(8);
    if let Some(seg) = info.seg_override {
        out.push(seg_override_byte(seg));
    }
    if addr_pfx {
        out.push(0x67);
    }
    if size_pfx {
        out.push(0x66);
    }
    let group1 = candidate
        .mandatory_prefix
        .or_else(|| instr.group1_prefix.map(group1_byte));
    if let Some(b) = group1 {
        out.push(b);
    }

    let mut stem = candidate.stem.to_vec();
    if let Some(idx) = candidate.plus_r {
        let op = instr
            .operand(idx)
            .ok_or_else(|| CodecError::internal("plus_r operand index out of range"))?;
        let ordinal = operand_ordinal(op)?;
        let last = stem
            .last_mut()
            .ok_or_else(|| CodecError::internal("plus_r candidate has an empty stem"))?;
        *last += ordinal;
    }
    out.extend_from_slice(&stem);

    let reg_field_operand_index = candidate.rm.and_then(|rm| match rm.reg_field {
        RegField::Operand(idx) => Some(idx),
        RegField::Digit(_) => None,
    });

    let modrm_bytes = if let Some(rm) = candidate.rm {
        let reg_field = match rm.reg_field {
            RegField::Digit(d) => d,
            RegField::Operand(idx) => {
                let op = instr
                    .operand(idx)
                    .ok_or_else(|| CodecError::internal("reg-field operand index out of range"))?;
                operand_ordinal(op)?
            }
        };
        let op = instr
            .operand(rm.operand_index)
            .ok_or_else(|| CodecError::internal("rm operand index out of range"))?;
        build_modrm(op, reg_field)?
    } else {
        vec![]
    };
    out.extend_from_slice(&modrm_bytes);

    // Resolve each remaining operand's AOTDL leaf and pre-compute its
    // trailing byte width, so a JccTarget operand can see the instruction's
    // total predicted length before any trailing bytes are actually emitted.
    let skip = |i: usize| -> bool {
        Some(i) == candidate.rm.map(|rm| rm.operand_index)
            || Some(i) == candidate.plus_r
            || Some(i) == reg_field_operand_index
    };

    let mut leaves = Vec::with_capacity(candidate.aots.len());
    let mut trailing_len: u32 = 0;
    for (i, aot) in candidate.aots.iter().enumerate() {
        let leaf = resolve_leaf(aot, size_pfx, addr_pfx);
        if !skip(i) {
            let op = instr
                .operand(i)
                .ok_or_else(|| CodecError::internal("operand index out of range"))?;
            trailing_len += trailing_width(leaf, op, addr_pfx)?;
        }
        leaves.push(leaf);
    }

    let jcc_addr_after = addr + out.len() as u32 + trailing_len;

    for (i, leaf) in leaves.iter().enumerate() {
        if skip(i) {
            continue;
        }
        let op = instr
            .operand(i)
            .ok_or_else(|| CodecError::internal("operand index out of range"))?;
        out.extend(emit_trailing(leaf, op, addr_pfx, jcc_addr_after)?);
    }

    if out.len() as u32 > MAX_INSTRUCTION_LEN {
        return Err(CodecError::invalid(format!(
            "encoded instruction exceeds {MAX_INSTRUCTION_LEN} bytes"
        )));
    }

    Ok(out)
}

/// Encodes a sequence of instructions, advancing `addr` by each result's
/// length so that later `JccTarget` operands resolve against the right
/// address (§6).
pub fn encode_many(instrs: &[Instruction], addr: u32) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut pc = addr;
    for instr in instrs {
        let bytes = encode(instr, pc)?;
        pc += bytes.len() as u32;
        out.extend(bytes);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::byte_stream::SliceByteStream;
    use pretty_assertions::assert_eq;
    use x86_codec_types::{Gpr32, Immediate, Mnemonic};

    #[test]
    fn encodes_mov_eax_imm32() {
        let instr = Instruction::new(
            None,
            Mnemonic::Mov,
            &[Operand::Gpr32(Gpr32::Eax), Operand::Immediate(Immediate::Imm32(0x12345678))],
        );
        let bytes = encode(&instr, 0).unwrap();
        assert_eq!(bytes, vec![0xB8, 0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn encodes_xor_eax_eax_matching_scenario_one() {
        let instr = Instruction::new(
            None,
            Mnemonic::Xor,
            &[Operand::Gpr32(Gpr32::Eax), Operand::Gpr32(Gpr32::Eax)],
        );
        assert_eq!(encode(&instr, 0).unwrap(), vec![0x33, 0xC0]);
    }

    #[test]
    fn encodes_jmp_rel32_matching_scenario_four() {
        use x86_codec_types::JccTarget;
        let instr = Instruction::new(
            None,
            Mnemonic::Jmp,
            &[Operand::JccTarget(JccTarget { taken: 0x100, not_taken: 0 })],
        );
        let bytes = encode(&instr, 0).unwrap();
        assert_eq!(bytes, vec![0xE9, 0xFB, 0x00, 0x00, 0x00]);

        let mut s = SliceByteStream::new(&bytes, 0);
        let (decoded, _) = decode(&mut s, 0).unwrap();
        match decoded.operand(0) {
            Some(Operand::JccTarget(t)) => assert_eq!(t.taken, 0x100),
            other => panic!("expected JccTarget, got {other:?}"),
        }
    }

    #[test]
    fn encodes_lock_add_mem_reg_preserving_prefix() {
        use x86_codec_types::{Mem32, MemSize, Segment};
        let instr = Instruction::new(
            Some(GroupOnePrefix::Lock),
            Mnemonic::Add,
            &[
                Operand::Mem32(Mem32 {
                    seg: Segment::Ds,
                    size: MemSize::Dword,
                    base: Some(Gpr32::Eax),
                    index: None,
                    scale: 0,
                    disp: None,
                }),
                Operand::Gpr32(Gpr32::Ecx),
            ],
        );
        assert_eq!(encode(&instr, 0).unwrap(), vec![0xF0, 0x01, 0x08]);
    }

    #[test]
    fn encodes_jmp_rel32_with_wrapping_far_displacement() {
        // Decoding `E9 00 00 00 80` at addr 0 resolves taken = 0x80000005;
        // re-encoding it needs disp = 0x80000000, which is > i32::MAX but
        // still a valid mod-2^32 displacement (§4.5.1).
        use x86_codec_types::JccTarget;
        let bytes = [0xE9, 0x00, 0x00, 0x00, 0x80];
        let mut s = SliceByteStream::new(&bytes, 0);
        let (decoded, _) = decode(&mut s, 0).unwrap();
        match decoded.operand(0) {
            Some(Operand::JccTarget(t)) => assert_eq!(t.taken, 0x8000_0005),
            other => panic!("expected JccTarget, got {other:?}"),
        }
        assert_eq!(encode(&decoded, 0).unwrap(), bytes);

        let instr = Instruction::new(
            None,
            Mnemonic::Jmp,
            &[Operand::JccTarget(JccTarget { taken: 0x8000_0005, not_taken: 0 })],
        );
        assert_eq!(encode(&instr, 0).unwrap(), bytes);
    }

    #[test]
    fn rejects_an_operand_tuple_with_no_matching_candidate() {
        let instr = Instruction::new(None, Mnemonic::Cbw, &[Operand::Gpr32(Gpr32::Eax)]);
        assert!(encode(&instr, 0).is_err());
    }

    #[test]
    fn encode_decode_fixpoint_for_a_handful_of_instructions() {
        use x86_codec_types::{Gpr16, Mem16, MemSize, Segment};
        let cases = vec![
            Instruction::new(None, Mnemonic::Xor, &[Operand::Gpr32(Gpr32::Eax), Operand::Gpr32(Gpr32::Eax)]),
            Instruction::new(
                None,
                Mnemonic::Mov,
                &[Operand::Gpr16(Gpr16::Ax), Operand::Immediate(Immediate::Imm16(0x1234))],
            ),
            Instruction::new(
                None,
                Mnemonic::Mov,
                &[
                    Operand::Gpr32(Gpr32::Eax),
                    Operand::Mem16(Mem16 {
                        seg: Segment::Ds,
                        size: MemSize::Dword,
                        base: None,
                        index: Some(Gpr16::Si),
                        disp: None,
                    }),
                ],
            ),
        ];
        for instr in cases {
            let bytes = encode(&instr, 0).unwrap();
            let mut s = SliceByteStream::new(&bytes, 0);
            let (decoded, len) = decode(&mut s, 0).unwrap();
            assert_eq!(len as usize, bytes.len());
            assert_eq!(decoded, instr, "roundtrip mismatch for {instr}");
        }
    }
}

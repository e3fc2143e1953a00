// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The decode-table interpreter (§4.4): the legacy-prefix scanning loop,
//! `Group`/`RmGroup`/`Sse`/`Pred*` table-entry reduction, and operand
//! materialization from the resulting AOTDL list.

use x86_codec_types::register::{default_segment_for_gpr16, default_segment_for_gpr32};
use x86_codec_types::{
    CodecError, CodecResult, Control, DebugReg, FarPtr16, FarPtr32, Fpu, Gpr16, Gpr32, Gpr8,
    GroupOnePrefix, Immediate, Instruction, JccTarget, Mem16, Mem32, Mmx, Mnemonic, Operand,
    Segment, Xmm,
};

use crate::aot::{Aot, ImmKind, MemSizeReq, RegClass};
use crate::byte_stream::ByteStream;
use crate::decode_table::{self, DecodeEntry};
use crate::modrm::{self, MemParts16, MemParts32};

const MAX_GROUP1: usize = 8;

/// The group-1 legacy-prefix stack (§4.4, §9 "bounded array, not a dynamic
/// container"): `LOCK`/`REP`/`REPNE` bytes accumulate here in source order;
/// SSE dispatch consumes the newest `REP`/`REPNE` without disturbing `LOCK`.
#[derive(Debug, Clone, Copy)]
struct PrefixStack {
    items: [GroupOnePrefix; MAX_GROUP1],
    len: usize,
}

impl PrefixStack {
    fn new() -> PrefixStack {
        PrefixStack {
            items: [GroupOnePrefix::Lock; MAX_GROUP1],
            len: 0,
        }
    }

    fn push(&mut self, p: GroupOnePrefix) {
        if self.len < MAX_GROUP1 {
            self.items[self.len] = p;
            self.len += 1;
        }
    }

    fn top(&self) -> Option<GroupOnePrefix> {
        (self.len > 0).then(|| self.items[self.len - 1])
    }

    /// Removes and returns the newest `REP`/`REPNE` on the stack, leaving any
    /// `LOCK` entries in place (§4.4.1).
    fn take_rep_or_repne(&mut self) -> Option<GroupOnePrefix> {
        for i in (0..self.len).rev() {
            if matches!(self.items[i], GroupOnePrefix::Rep | GroupOnePrefix::Repne) {
                let p = self.items[i];
                for j in i..self.len - 1 {
                    self.items[j] = self.items[j + 1];
                }
                self.len -= 1;
                return Some(p);
            }
        }
        None
    }
}

/// The resolved ModR/M `r/m` role: either a plain register ordinal (`MOD=11`,
/// interpreted against whatever `RegClass` the calling AOT names) or a fully
/// decoded memory address, in whichever addressing width `addr_pfx` selected.
enum RmResolved {
    Reg(u8),
    Mem32(MemParts32),
    Mem16(MemParts16),
}

struct Decoder<'s> {
    stream: &'s mut dyn ByteStream,
    group1: PrefixStack,
    seg_pfx: Option<Segment>,
    size_pfx: bool,
    addr_pfx: bool,
    modrm_raw_byte: Option<u8>,
    modrm32_cache: Option<modrm::Decoded<modrm::RegOrMem32>>,
    modrm16_cache: Option<modrm::Decoded<modrm::RegOrMem16>>,
}

impl<'s> Decoder<'s> {
    fn new(stream: &'s mut dyn ByteStream) -> Decoder<'s> {
        Decoder {
            stream,
            group1: PrefixStack::new(),
            seg_pfx: None,
            size_pfx: false,
            addr_pfx: false,
            modrm_raw_byte: None,
            modrm32_cache: None,
            modrm16_cache: None,
        }
    }

    /// Scans legacy prefixes, returning the normalized opcode-table index
    /// (§4.4's `0x000..0x3FF` space) and leaving the stream positioned right
    /// after the opcode byte(s).
    fn prefix_loop(&mut self) -> CodecResult<usize> {
        loop {
            let b = self.stream.byte()?;
            match b {
                0xF0 => {
                    log::trace!("decode: LOCK prefix");
                    self.group1.push(GroupOnePrefix::Lock);
                }
                0xF2 => {
                    log::trace!("decode: REPNE prefix");
                    self.group1.push(GroupOnePrefix::Repne);
                }
                0xF3 => {
                    log::trace!("decode: REP prefix");
                    self.group1.push(GroupOnePrefix::Rep);
                }
                0x2E => self.seg_pfx = Some(Segment::Cs),
                0x36 => self.seg_pfx = Some(Segment::Ss),
                0x3E => self.seg_pfx = Some(Segment::Ds),
                0x26 => self.seg_pfx = Some(Segment::Es),
                0x64 => self.seg_pfx = Some(Segment::Fs),
                0x65 => self.seg_pfx = Some(Segment::Gs),
                0x66 => self.size_pfx = true,
                0x67 => self.addr_pfx = true,
                0x0F => {
                    let b2 = self.stream.byte()?;
                    return Ok(match b2 {
                        0x38 => 0x200 + self.stream.byte()? as usize,
                        0x3A => 0x300 + self.stream.byte()? as usize,
                        _ => 0x100 + b2 as usize,
                    });
                }
                op => return Ok(op as usize),
            }
        }
    }

    /// Walks `Group`/`RmGroup`/`Sse`/`Pred*` nodes down to a `Direct` leaf,
    /// consulting ModR/M and the prefix state as each dispatch demands it.
    fn reduce_entry(&mut self, entry: &'static DecodeEntry) -> CodecResult<(Mnemonic, &'static [Aot])> {
        match entry {
            DecodeEntry::Fatal => Err(CodecError::internal("reached a Fatal decode-table entry")),
            DecodeEntry::Invalid => Err(CodecError::invalid("undefined opcode")),
            DecodeEntry::Direct(mnemonic, aots) => Ok((*mnemonic, aots.as_slice())),
            DecodeEntry::Group(arr) => {
                let raw = self.modrm_raw()?;
                let ggg = modrm::reg_field(raw) as usize;
                self.reduce_entry(&arr[ggg])
            }
            DecodeEntry::RmGroup(arr) => {
                let raw = self.modrm_raw()?;
                if modrm::mod_field(raw) != 0b11 {
                    return Err(CodecError::invalid("RM-group opcode requires a register-form ModR/M"));
                }
                let rm = modrm::rm_field(raw) as usize;
                self.reduce_entry(&arr[rm])
            }
            DecodeEntry::Sse { no, rep, size, repne } => {
                if let Some(p) = self.group1.take_rep_or_repne() {
                    match p {
                        GroupOnePrefix::Rep => self.reduce_entry(rep),
                        GroupOnePrefix::Repne => self.reduce_entry(repne),
                        GroupOnePrefix::Lock => unreachable!("take_rep_or_repne never yields LOCK"),
                    }
                } else if self.size_pfx {
                    self.reduce_entry(size)
                } else {
                    self.reduce_entry(no)
                }
            }
            DecodeEntry::PredOpSize(yes, no) => {
                if self.size_pfx {
                    self.reduce_entry(yes)
                } else {
                    self.reduce_entry(no)
                }
            }
            DecodeEntry::PredAddrSize(yes, no) => {
                if self.addr_pfx {
                    self.reduce_entry(yes)
                } else {
                    self.reduce_entry(no)
                }
            }
            DecodeEntry::PredMod(mod11, mod_mem) => {
                let raw = self.modrm_raw()?;
                if modrm::mod_field(raw) == 0b11 {
                    self.reduce_entry(mod11)
                } else {
                    self.reduce_entry(mod_mem)
                }
            }
        }
    }

    fn modrm_raw(&mut self) -> CodecResult<u8> {
        if let Some(b) = self.modrm_raw_byte {
            return Ok(b);
        }
        let b = self.stream.byte()?;
        self.modrm_raw_byte = Some(b);
        Ok(b)
    }

    fn modrm32(&mut self) -> CodecResult<modrm::Decoded<modrm::RegOrMem32>> {
        if let Some(d) = self.modrm32_cache {
            return Ok(d);
        }
        let raw = self.modrm_raw()?;
        let d = modrm::decode32(raw, &mut *self.stream)?;
        self.modrm32_cache = Some(d);
        Ok(d)
    }

    fn modrm16(&mut self) -> CodecResult<modrm::Decoded<modrm::RegOrMem16>> {
        if let Some(d) = self.modrm16_cache {
            return Ok(d);
        }
        let raw = self.modrm_raw()?;
        let d = modrm::decode16(raw, &mut *self.stream)?;
        self.modrm16_cache = Some(d);
        Ok(d)
    }

    fn resolve_rm(&mut self) -> CodecResult<RmResolved> {
        if self.addr_pfx {
            let d = self.modrm16()?;
            Ok(match d.rm {
                modrm::RegOrMem16::Reg(r) => RmResolved::Reg(r.ordinal()),
                modrm::RegOrMem16::Mem(m) => RmResolved::Mem16(m),
            })
        } else {
            let d = self.modrm32()?;
            Ok(match d.rm {
                modrm::RegOrMem32::Reg(r) => RmResolved::Reg(r.ordinal()),
                modrm::RegOrMem32::Mem(m) => RmResolved::Mem32(m),
            })
        }
    }

    fn effective_seg(&self, default: Segment) -> Segment {
        self.seg_pfx.unwrap_or(default)
    }

    fn apply_seg_override(&self, v: Operand) -> Operand {
        match v {
            Operand::Mem16(mut m) => {
                if let Some(s) = self.seg_pfx {
                    m.seg = s;
                }
                Operand::Mem16(m)
            }
            Operand::Mem32(mut m) => {
                if let Some(s) = self.seg_pfx {
                    m.seg = s;
                }
                Operand::Mem32(m)
            }
            other => other,
        }
    }

    fn reg_operand(&self, class: RegClass, ord: u8) -> CodecResult<Operand> {
        Ok(match class {
            RegClass::Gpr8 => Operand::Gpr8(
                Gpr8::from_ordinal(ord).ok_or_else(|| CodecError::internal("bad Gpr8 ordinal"))?,
            ),
            RegClass::Gpr16 => Operand::Gpr16(
                Gpr16::from_ordinal(ord).ok_or_else(|| CodecError::internal("bad Gpr16 ordinal"))?,
            ),
            RegClass::Gpr32 => Operand::Gpr32(
                Gpr32::from_ordinal(ord).ok_or_else(|| CodecError::internal("bad Gpr32 ordinal"))?,
            ),
            RegClass::Segment => Operand::Segment(
                Segment::from_ordinal(ord).ok_or_else(|| CodecError::invalid("undefined segment register ordinal"))?,
            ),
            RegClass::Control => Operand::Control(
                Control::from_ordinal(ord).ok_or_else(|| CodecError::internal("bad control register ordinal"))?,
            ),
            RegClass::Debug => Operand::Debug(
                DebugReg::from_ordinal(ord).ok_or_else(|| CodecError::internal("bad debug register ordinal"))?,
            ),
            RegClass::Fpu => Operand::Fpu(
                Fpu::from_ordinal(ord).ok_or_else(|| CodecError::internal("bad FPU register ordinal"))?,
            ),
            RegClass::Mmx => Operand::Mmx(
                Mmx::from_ordinal(ord).ok_or_else(|| CodecError::internal("bad MMX register ordinal"))?,
            ),
            RegClass::Xmm => Operand::Xmm(
                Xmm::from_ordinal(ord).ok_or_else(|| CodecError::internal("bad XMM register ordinal"))?,
            ),
        })
    }

    fn materialize(&mut self, aots: &[Aot]) -> CodecResult<Vec<Operand>> {
        let mut out = Vec::with_capacity(aots.len());
        for aot in aots {
            out.push(self.materialize_one(aot)?);
        }
        Ok(out)
    }

    fn materialize_one(&mut self, aot: &Aot) -> CodecResult<Operand> {
        match aot {
            Aot::Exact(v) => Ok(*v),
            Aot::ExactSeg(v) => Ok(self.apply_seg_override(*v)),
            Aot::GPart(class) => {
                let raw = self.modrm_raw()?;
                let ord = modrm::reg_field(raw);
                self.reg_operand(*class, ord)
            }
            Aot::RegOrMem { reg, mem_size } => self.materialize_reg_or_mem(*reg, *mem_size),
            Aot::Mem(mem_size) => self.materialize_mem_only(*mem_size),
            Aot::Imm(kind) => self.materialize_imm(*kind),
            Aot::SignedImm(kind) => self.materialize_signed_imm(*kind),
            Aot::Moffs(size) => self.materialize_moffs(*size),
            Aot::FarPtr16 => self.materialize_far_ptr16(),
            Aot::FarPtr32 => self.materialize_far_ptr32(),
            Aot::JccTarget(kind) => self.materialize_jcc_target(*kind),
            Aot::SizePrefix(yes, no) => {
                if self.size_pfx {
                    self.materialize_one(yes)
                } else {
                    self.materialize_one(no)
                }
            }
            Aot::AddrPrefix(yes, no) => {
                if self.addr_pfx {
                    self.materialize_one(yes)
                } else {
                    self.materialize_one(no)
                }
            }
        }
    }

    fn materialize_reg_or_mem(&mut self, reg: RegClass, mem_size: MemSizeReq) -> CodecResult<Operand> {
        match self.resolve_rm()? {
            RmResolved::Reg(ord) => self.reg_operand(reg, ord),
            RmResolved::Mem32(m) => Ok(Operand::Mem32(Mem32 {
                seg: self.effective_seg(default_segment_for_gpr32(m.base)),
                size: mem_size.nominal(),
                base: m.base,
                index: m.index,
                scale: m.scale,
                disp: m.disp,
            })),
            RmResolved::Mem16(m) => Ok(Operand::Mem16(Mem16 {
                seg: self.effective_seg(default_segment_for_gpr16(m.base)),
                size: mem_size.nominal(),
                base: m.base,
                index: m.index,
                disp: m.disp,
            })),
        }
    }

    fn materialize_mem_only(&mut self, mem_size: MemSizeReq) -> CodecResult<Operand> {
        match self.resolve_rm()? {
            RmResolved::Reg(_) => Err(CodecError::invalid("opcode requires a memory operand")),
            RmResolved::Mem32(m) => Ok(Operand::Mem32(Mem32 {
                seg: self.effective_seg(default_segment_for_gpr32(m.base)),
                size: mem_size.nominal(),
                base: m.base,
                index: m.index,
                scale: m.scale,
                disp: m.disp,
            })),
            RmResolved::Mem16(m) => Ok(Operand::Mem16(Mem16 {
                seg: self.effective_seg(default_segment_for_gpr16(m.base)),
                size: mem_size.nominal(),
                base: m.base,
                index: m.index,
                disp: m.disp,
            })),
        }
    }

    fn materialize_imm(&mut self, kind: ImmKind) -> CodecResult<Operand> {
        Ok(Operand::Immediate(match kind {
            ImmKind::Ib => Immediate::Imm8(self.stream.byte()?),
            ImmKind::Iw => Immediate::Imm16(self.stream.word()?),
            ImmKind::Id => Immediate::Imm32(self.stream.dword()?),
        }))
    }

    /// The encoded byte is always a single signed 8-bit value; it is
    /// sign-extended to the archetype's declared width (§4.3 `SignedImm`).
    fn materialize_signed_imm(&mut self, kind: ImmKind) -> CodecResult<Operand> {
        let b = self.stream.byte()?;
        Ok(Operand::Immediate(match kind {
            ImmKind::Ib => Immediate::Imm8(b),
            ImmKind::Iw => Immediate::Imm16(sign_extend_8_to_16(b)),
            ImmKind::Id => Immediate::Imm32(sign_extend_8_to_32(b)),
        }))
    }

    fn materialize_moffs(&mut self, size: x86_codec_types::MemSize) -> CodecResult<Operand> {
        if self.addr_pfx {
            let disp = self.stream.word()?;
            Ok(Operand::Mem16(Mem16 {
                seg: self.effective_seg(Segment::Ds),
                size,
                base: None,
                index: None,
                disp: Some(disp),
            }))
        } else {
            let disp = self.stream.dword()?;
            Ok(Operand::Mem32(Mem32 {
                seg: self.effective_seg(Segment::Ds),
                size,
                base: None,
                index: None,
                scale: 0,
                disp: Some(disp),
            }))
        }
    }

    fn materialize_far_ptr16(&mut self) -> CodecResult<Operand> {
        let off = self.stream.word()?;
        let seg = self.stream.word()?;
        Ok(Operand::FarPtr16(FarPtr16 { seg, off }))
    }

    fn materialize_far_ptr32(&mut self) -> CodecResult<Operand> {
        let off = self.stream.dword()?;
        let seg = self.stream.word()?;
        Ok(Operand::FarPtr32(FarPtr32 { seg, off }))
    }

    fn materialize_jcc_target(&mut self, kind: ImmKind) -> CodecResult<Operand> {
        let disp: i32 = match kind {
            ImmKind::Ib => (self.stream.byte()? as i8) as i32,
            ImmKind::Iw => (self.stream.word()? as i16) as i32,
            ImmKind::Id => self.stream.dword()? as i32,
        };
        let not_taken = self.stream.pos();
        let taken = not_taken.wrapping_add(disp as u32);
        Ok(Operand::JccTarget(JccTarget { taken, not_taken }))
    }
}

fn sign_extend_8_to_16(b: u8) -> u16 {
    ((b as i8) as i16) as u16
}

fn sign_extend_8_to_32(b: u8) -> u32 {
    ((b as i8) as i32) as u32
}

/// Decodes one instruction starting at `addr` (§6). Returns the instruction
/// and the number of bytes consumed.
pub fn decode(stream: &mut dyn ByteStream, addr: u32) -> CodecResult<(Instruction, u32)> {
    stream.set_pos(addr);
    let mut d = Decoder::new(stream);
    let index = d.prefix_loop()?;
    log::trace!("decode: opcode table index {index:#05x}");
    let entry = &decode_table::table()[index];
    let (mnemonic, aots) = d.reduce_entry(entry)?;
    log::debug!("decode: dispatched to {mnemonic}");
    let operand_values = d.materialize(aots)?;
    let instr = Instruction::new(d.group1.top(), mnemonic, &operand_values);
    let consumed = d.stream.pos().wrapping_sub(addr);
    Ok((instr, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_stream::SliceByteStream;
    use pretty_assertions::assert_eq;
    use x86_codec_types::{Gpr32, MemSize};

    fn decode_bytes(bytes: &[u8]) -> (Instruction, u32) {
        let mut s = SliceByteStream::new(bytes, 0);
        decode(&mut s, 0).expect("decode should succeed")
    }

    #[test]
    fn decodes_xor_eax_eax() {
        let (instr, len) = decode_bytes(&[0x33, 0xC0]);
        assert_eq!(len, 2);
        assert_eq!(instr.mnemonic, Mnemonic::Xor);
        assert_eq!(instr.operand(0), Some(&Operand::Gpr32(Gpr32::Eax)));
        assert_eq!(instr.operand(1), Some(&Operand::Gpr32(Gpr32::Eax)));
        assert_eq!(instr.to_string(), "XOR EAX, EAX");
    }

    #[test]
    fn decodes_mov_ax_imm16_under_size_prefix() {
        let (instr, len) = decode_bytes(&[0x66, 0xB8, 0x34, 0x12]);
        assert_eq!(len, 4);
        assert_eq!(instr.mnemonic, Mnemonic::Mov);
        assert_eq!(instr.operand(0), Some(&Operand::Gpr16(Gpr16::Ax)));
        assert_eq!(instr.operand(1), Some(&Operand::Immediate(Immediate::Imm16(0x1234))));
    }

    #[test]
    fn decodes_lock_add_mem_reg() {
        let (instr, len) = decode_bytes(&[0xF0, 0x01, 0x08]);
        assert_eq!(len, 3);
        assert_eq!(instr.group1_prefix, Some(GroupOnePrefix::Lock));
        assert_eq!(instr.mnemonic, Mnemonic::Add);
        match instr.operand(0) {
            Some(Operand::Mem32(m)) => {
                assert_eq!(m.base, Some(Gpr32::Eax));
                assert_eq!(m.disp, None);
                assert_eq!(m.size, MemSize::Dword);
            }
            other => panic!("expected Mem32, got {other:?}"),
        }
        assert_eq!(instr.operand(1), Some(&Operand::Gpr32(Gpr32::Ecx)));
    }

    #[test]
    fn decodes_addr_prefix_16bit_addressing() {
        let (instr, len) = decode_bytes(&[0x67, 0x8B, 0x04]);
        assert_eq!(len, 3);
        assert_eq!(instr.mnemonic, Mnemonic::Mov);
        assert_eq!(instr.operand(0), Some(&Operand::Gpr32(Gpr32::Eax)));
        match instr.operand(1) {
            Some(Operand::Mem16(m)) => {
                assert_eq!(m.base, None);
                assert_eq!(m.index, Some(Gpr16::Si));
            }
            other => panic!("expected Mem16, got {other:?}"),
        }
    }

    #[test]
    fn decodes_fucompp_not_zero_operand_fucomp() {
        // DA E9: MOD=11,reg=101,r/m=001 is the hardcoded FUCOMPP form, not
        // the sti-operand FUCOMP reachable via DD E8..EF.
        let (instr, len) = decode_bytes(&[0xDA, 0xE9]);
        assert_eq!(len, 2);
        assert_eq!(instr.mnemonic, Mnemonic::Fucompp);
        assert_eq!(instr.operand(0), None);
    }

    #[test]
    fn decodes_jmp_rel32_and_resolves_target() {
        let (instr, len) = decode_bytes(&[0xE9, 0xFB, 0x00, 0x00, 0x00]);
        assert_eq!(len, 5);
        assert_eq!(instr.mnemonic, Mnemonic::Jmp);
        match instr.operand(0) {
            Some(Operand::JccTarget(t)) => assert_eq!(t.taken, 0x100),
            other => panic!("expected JccTarget, got {other:?}"),
        }
    }

    #[test]
    fn fatal_prefix_byte_without_prefix_loop_is_internal_error() {
        // 0x0F alone (no following byte) exhausts the stream inside the
        // escape-map read, which is reported as InvalidInstruction, not
        // InternalInvariantFailure -- the byte stream, not the table, fails.
        let bytes = [0x0F];
        let mut s = SliceByteStream::new(&bytes, 0);
        assert!(decode(&mut s, 0).is_err());
    }

    #[test]
    fn invalid_opcode_fails() {
        let bytes = [0xF1];
        let mut s = SliceByteStream::new(&bytes, 0);
        let err = decode(&mut s, 0).unwrap_err();
        assert!(matches!(err, CodecError::InvalidInstruction { .. }));
    }
}

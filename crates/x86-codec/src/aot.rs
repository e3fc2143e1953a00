// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Abstract Operand Types (AOT) and the small grammar (AOTDL) they compile
//! to (§4.3). The decode-table interpreter and the encoder's type checker
//! both walk the same `Aot` tree; decoding materializes operands from it,
//! encoding type-checks and emits against it.

use x86_codec_types::{MemSize, Operand};

/// The register class an AOT's register half ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegClass {
    Gpr8,
    Gpr16,
    Gpr32,
    Segment,
    Control,
    Debug,
    Fpu,
    Mmx,
    Xmm,
}

/// The width of an immediate/moffs/jump-target AOT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmKind {
    Ib,
    Iw,
    Id,
}

impl ImmKind {
    pub fn width_bytes(self) -> u32 {
        match self {
            ImmKind::Ib => 1,
            ImmKind::Iw => 2,
            ImmKind::Id => 4,
        }
    }
}

/// Whether a `RegOrMem` AOT requires the memory operand's size tag to match
/// exactly, or is size-lenient (FPU environment/state, SIMD state AOTs). The
/// `Lenient` tag still carries a nominal `MemSize`, used only so the decoder
/// has something concrete to stamp on the materialized operand and the
/// textual form has something to print; the type checker ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemSizeReq {
    Exact(MemSize),
    Lenient(MemSize),
}

impl MemSizeReq {
    pub fn nominal(self) -> MemSize {
        match self {
            MemSizeReq::Exact(s) => s,
            MemSizeReq::Lenient(s) => s,
        }
    }
}

/// One AOTDL node. `Aot` values are composed into the per-mnemonic operand
/// lists that both the decode table (materialization) and the encode table
/// (type-check + emission) consult.
#[derive(Debug, Clone)]
pub enum Aot {
    /// Matches iff the operand equals this exact value; no prefix effect.
    Exact(Operand),
    /// Like `Exact`, but for a memory operand differing only in segment,
    /// which is permitted and reported as a segment override.
    ExactSeg(Operand),
    /// A register of the given class occupying ModR/M `reg`.
    GPart(RegClass),
    /// A register of `reg`'s class, or a memory operand of `mem_size`;
    /// drives ModR/M `mod`/`r/m` (+SIB).
    RegOrMem { reg: RegClass, mem_size: MemSizeReq },
    /// A memory operand only, no register alternative (the `M` archetype
    /// used by `LEA`, `LGDT`/`SGDT`/`LIDT`/`SIDT`, and the descriptor-table
    /// instructions). Still drives ModR/M `mod`/`r/m` (+SIB); `MOD=11` is
    /// simply never a match.
    Mem(MemSizeReq),
    /// An immediate of the given width.
    Imm(ImmKind),
    /// An immediate that is widened to `archetype`'s width during encoding
    /// when it fits a signed 8-bit value (the narrow-form disambiguation).
    SignedImm(ImmKind),
    /// A direct-address ("moffs") operand: `AL`/`eAX` implicit accumulator
    /// paired with a bare displacement of the given size.
    Moffs(MemSize),
    /// A 16-bit segment:offset far pointer immediate.
    FarPtr16,
    /// A 32-bit segment:offset far pointer immediate.
    FarPtr32,
    /// A near jump/call target, encoded as a PC-relative displacement of
    /// the given width (always the *long* form per §4.5.1 — the width here
    /// is the encoding's own declared width, not a shortening choice).
    JccTarget(ImmKind),
    /// Branches between two whole sub-AOTDL nodes on the operand-size
    /// prefix: `yes` imposes `66`, `no` forbids it.
    SizePrefix(Box<Aot>, Box<Aot>),
    /// Branches between two whole sub-AOTDL nodes on the address-size
    /// prefix: `yes` imposes `67`, `no` forbids it.
    AddrPrefix(Box<Aot>, Box<Aot>),
}

impl Aot {
    pub fn size_prefix(yes: Aot, no: Aot) -> Aot {
        Aot::SizePrefix(Box::new(yes), Box::new(no))
    }

    pub fn addr_prefix(yes: Aot, no: Aot) -> Aot {
        Aot::AddrPrefix(Box::new(yes), Box::new(no))
    }

    /// True for the FPU-environment/state and SIMD-state AOTs, which skip
    /// the memory size comparison entirely (§4.3, §8.6).
    pub fn is_size_lenient(&self) -> bool {
        matches!(
            self,
            Aot::RegOrMem {
                mem_size: MemSizeReq::Lenient(_),
                ..
            } | Aot::Mem(MemSizeReq::Lenient(_))
        )
    }
}

/// Builder functions for the common AOT archetypes named in §4.3, mirroring
/// the original reference implementation's `X86InternalOperand` helpers
/// (`Eb`, `Gv`, `Iz`, `Jb`, `rAX`, ...). Kept free functions rather than
/// `Aot` constructors since several compose two or three primitive nodes.
pub mod archetype {
    use super::*;
    use x86_codec_types::{Fpu, Gpr16, Gpr32, Gpr8, Immediate, MemSize::*};

    pub fn eb() -> Aot {
        Aot::RegOrMem { reg: RegClass::Gpr8, mem_size: MemSizeReq::Exact(Byte) }
    }
    pub fn gb() -> Aot {
        Aot::GPart(RegClass::Gpr8)
    }
    pub fn ev() -> Aot {
        Aot::size_prefix(
            Aot::RegOrMem { reg: RegClass::Gpr16, mem_size: MemSizeReq::Exact(Word) },
            Aot::RegOrMem { reg: RegClass::Gpr32, mem_size: MemSizeReq::Exact(Dword) },
        )
    }
    pub fn gv() -> Aot {
        Aot::size_prefix(Aot::GPart(RegClass::Gpr16), Aot::GPart(RegClass::Gpr32))
    }
    pub fn ew() -> Aot {
        Aot::RegOrMem { reg: RegClass::Gpr16, mem_size: MemSizeReq::Exact(Word) }
    }
    pub fn ib() -> Aot {
        Aot::Imm(ImmKind::Ib)
    }
    pub fn iw() -> Aot {
        Aot::Imm(ImmKind::Iw)
    }
    pub fn id() -> Aot {
        Aot::Imm(ImmKind::Id)
    }
    pub fn iz() -> Aot {
        Aot::size_prefix(Aot::Imm(ImmKind::Iw), Aot::Imm(ImmKind::Id))
    }
    pub fn ib_sx_z() -> Aot {
        Aot::size_prefix(Aot::SignedImm(ImmKind::Iw), Aot::SignedImm(ImmKind::Id))
    }
    pub fn jb() -> Aot {
        Aot::JccTarget(ImmKind::Ib)
    }
    pub fn jz() -> Aot {
        Aot::size_prefix(Aot::JccTarget(ImmKind::Iw), Aot::JccTarget(ImmKind::Id))
    }
    pub fn ap() -> Aot {
        Aot::size_prefix(Aot::FarPtr16, Aot::FarPtr32)
    }
    pub fn al() -> Aot {
        Aot::Exact(Operand::Gpr8(Gpr8::Al))
    }
    pub fn cl() -> Aot {
        Aot::Exact(Operand::Gpr8(Gpr8::Cl))
    }
    pub fn dx() -> Aot {
        Aot::Exact(Operand::Gpr16(Gpr16::Dx))
    }
    pub fn one() -> Aot {
        Aot::Exact(Operand::Immediate(Immediate::one()))
    }
    pub fn rax() -> Aot {
        Aot::size_prefix(
            Aot::Exact(Operand::Gpr16(Gpr16::Ax)),
            Aot::Exact(Operand::Gpr32(Gpr32::Eax)),
        )
    }
    pub fn moffb() -> Aot {
        Aot::Moffs(Byte)
    }
    pub fn moffz() -> Aot {
        Aot::size_prefix(Aot::Moffs(Word), Aot::Moffs(Dword))
    }
    pub fn sreg() -> Aot {
        Aot::GPart(RegClass::Segment)
    }
    pub fn creg() -> Aot {
        Aot::GPart(RegClass::Control)
    }
    pub fn dreg() -> Aot {
        Aot::GPart(RegClass::Debug)
    }
    /// `ST(i)`: unlike the GPR `Gv`/`Pd`/`Vdq` archetypes, the x87 register
    /// forms carry the stack-relative register in ModR/M `r/m`, not `reg`
    /// (`reg` carries the operation selector via `Group`). So this is a
    /// `RegOrMem`, not a `GPart` — only ever reached through a `PredMod`
    /// register branch, where the `r/m` field is guaranteed to decode as a
    /// register.
    pub fn sti() -> Aot {
        Aot::RegOrMem { reg: RegClass::Fpu, mem_size: MemSizeReq::Exact(Tword) }
    }
    pub fn st0() -> Aot {
        Aot::Exact(Operand::Fpu(Fpu::St0))
    }
    pub fn mmxq() -> Aot {
        Aot::RegOrMem { reg: RegClass::Mmx, mem_size: MemSizeReq::Exact(Qword) }
    }
    pub fn mmxd() -> Aot {
        Aot::RegOrMem { reg: RegClass::Mmx, mem_size: MemSizeReq::Exact(Dword) }
    }
    pub fn xmmdq() -> Aot {
        Aot::RegOrMem { reg: RegClass::Xmm, mem_size: MemSizeReq::Exact(Dqword) }
    }
    pub fn xmmq() -> Aot {
        Aot::RegOrMem { reg: RegClass::Xmm, mem_size: MemSizeReq::Exact(Qword) }
    }
    /// `Ed`: a 32-bit GPR or a 32-bit memory operand, not size-prefix
    /// sensitive (used by the MMX/SSE `movd`, which always moves 32 bits
    /// regardless of the `66` prefix — `66` there selects MMX vs XMM, not
    /// GPR width).
    pub fn ed() -> Aot {
        Aot::RegOrMem { reg: RegClass::Gpr32, mem_size: MemSizeReq::Exact(Dword) }
    }
    /// A memory-only operand of the given size (no register alternative):
    /// `LEA`'s `M`, the descriptor-table instructions' `m16&32`, and the
    /// x87 memory-form arithmetic operands.
    pub fn mem(size: MemSize) -> Aot {
        Aot::Mem(MemSizeReq::Exact(size))
    }
    pub fn fpenv() -> Aot {
        Aot::Mem(MemSizeReq::Lenient(Tword))
    }
    pub fn simd_state() -> Aot {
        Aot::Mem(MemSizeReq::Lenient(Dqword))
    }
    /// A memory operand whose real size isn't one §3's seven tags can name
    /// (`SGDT`/`SIDT`/`LGDT`/`LIDT`'s 6-byte pseudo-descriptor, `INVLPG`'s
    /// unsized operand): lenient like `fpenv`/`simd_state`, with a caller-
    /// chosen nominal tag purely for `Display`.
    pub fn mem_lenient(nominal: MemSize) -> Aot {
        Aot::Mem(MemSizeReq::Lenient(nominal))
    }
}

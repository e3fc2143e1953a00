// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The 1,024-entry decode table (§4.4): one-byte opcodes at `0x000..0x0FF`,
//! the `0F`-escape secondary map at `0x100..0x1FF`, and the `0F 38`/`0F 3A`
//! tertiary maps at `0x200..0x2FF`/`0x300..0x3FF`. The tertiary maps carry no
//! mnemonic this table dispatches to, so both stay `Invalid` in full.
//!
//! Built once into a process-wide `Vec` behind a `OnceLock` (§5, §10.1) —
//! not `const`, since `Aot`'s `SizePrefix`/`AddrPrefix` nodes own boxed
//! children built by ordinary function calls.

use std::sync::OnceLock;

use x86_codec_types::{Gpr32, MemSize, Mnemonic, Operand};

use crate::aot::archetype::*;
use crate::aot::Aot;

/// One entry of the decode table (§4.4).
pub enum DecodeEntry {
    /// Placeholder at positions a legacy prefix byte occupies; reaching this
    /// during dispatch is an internal invariant violation, not a decode
    /// failure — the prefix loop must have already consumed the byte.
    Fatal,
    /// Undefined opcode; decode fails with `InvalidInstruction`.
    Invalid,
    /// A terminal: the mnemonic plus its AOTDL operand list, in order.
    Direct(Mnemonic, Vec<Aot>),
    /// Dispatches on ModR/M `reg` (`GGG`), one sub-entry per value 0..7.
    Group(Box<[DecodeEntry; 8]>),
    /// Dispatches on ModR/M `r/m` after confirming `MOD=11`, one sub-entry
    /// per value 0..7 (the x87 register-form opcodes that vary by `r/m`
    /// rather than carrying a uniform `ST(i)` operand across all of them).
    RmGroup(Box<[DecodeEntry; 8]>),
    /// Dispatches on the SSE prefix situation (§4.4.1): the group-1 stack is
    /// searched newest-first for `REP`/`REPNE`; absent a match, falls back
    /// to the operand-size prefix; absent that, the prefixless form.
    Sse {
        no: Box<DecodeEntry>,
        rep: Box<DecodeEntry>,
        size: Box<DecodeEntry>,
        repne: Box<DecodeEntry>,
    },
    /// Branches on the operand-size prefix: `(size_pfx_set, size_pfx_clear)`.
    PredOpSize(Box<DecodeEntry>, Box<DecodeEntry>),
    /// Branches on the address-size prefix: `(addr_pfx_set, addr_pfx_clear)`.
    PredAddrSize(Box<DecodeEntry>, Box<DecodeEntry>),
    /// Branches on ModR/M `mod`: `(mod_eq_11, mod_ne_11)`.
    PredMod(Box<DecodeEntry>, Box<DecodeEntry>),
}

fn invalid() -> DecodeEntry {
    DecodeEntry::Invalid
}

fn direct(mnem: Mnemonic, aots: Vec<Aot>) -> DecodeEntry {
    DecodeEntry::Direct(mnem, aots)
}

fn group(entries: [DecodeEntry; 8]) -> DecodeEntry {
    DecodeEntry::Group(Box::new(entries))
}

fn rm_group(entries: [DecodeEntry; 8]) -> DecodeEntry {
    DecodeEntry::RmGroup(Box::new(entries))
}

fn pred_mod(mod11: DecodeEntry, mod_mem: DecodeEntry) -> DecodeEntry {
    DecodeEntry::PredMod(Box::new(mod11), Box::new(mod_mem))
}

fn pred_op_size(size_set: DecodeEntry, size_clear: DecodeEntry) -> DecodeEntry {
    DecodeEntry::PredOpSize(Box::new(size_set), Box::new(size_clear))
}

fn sse(no: DecodeEntry, rep: DecodeEntry, size: DecodeEntry, repne: DecodeEntry) -> DecodeEntry {
    DecodeEntry::Sse {
        no: Box::new(no),
        rep: Box::new(rep),
        size: Box::new(size),
        repne: Box::new(repne),
    }
}

/// A group of 8 `Direct(ops[i], [rm, imm])` entries sharing one operand
/// shape, dispatched on ModR/M `reg` — the classic group-1/group-3 shape.
fn uniform_group(ops: [Mnemonic; 8], operands: impl Fn(usize) -> Vec<Aot>) -> DecodeEntry {
    group(std::array::from_fn(|i| direct(ops[i], operands(i))))
}

fn exact_gpr32(r: Gpr32) -> Aot {
    Aot::Exact(Operand::Gpr32(r))
}

fn exact_gpr16(r: x86_codec_types::Gpr16) -> Aot {
    Aot::Exact(Operand::Gpr16(r))
}

fn exact_gpr8(r: x86_codec_types::Gpr8) -> Aot {
    Aot::Exact(Operand::Gpr8(r))
}

/// `40+r .. 47+r`-style opcodes: the register is baked into the low 3 opcode
/// bits rather than ModR/M. `base` is the opcode's first byte (`0x40`, etc.).
fn plus_r32_entry(mnem: Mnemonic, base: u8, op: u8, other: impl Fn(Gpr32) -> Vec<Aot>) -> DecodeEntry {
    let r = Gpr32::from_ordinal(op - base).unwrap();
    direct(mnem, other(r))
}

fn plus_r8_entry(
    mnem: Mnemonic,
    base: u8,
    op: u8,
    other: impl Fn(x86_codec_types::Gpr8) -> Vec<Aot>,
) -> DecodeEntry {
    let r = x86_codec_types::Gpr8::from_ordinal(op - base).unwrap();
    direct(mnem, other(r))
}

// ---------------------------------------------------------------------
// One-byte opcode map, 0x00..0xFF
// ---------------------------------------------------------------------

fn group1(ops: [Mnemonic; 8], rm: fn() -> Aot, imm: fn() -> Aot) -> DecodeEntry {
    uniform_group(ops, |_| vec![rm(), imm()])
}

fn group2(rm: fn() -> Aot, count: fn() -> Aot) -> DecodeEntry {
    use Mnemonic::*;
    uniform_group([Rol, Ror, Rcl, Rcr, Shl, Shr, Shl, Sar], |_| vec![rm(), count()])
}

fn group3(rm: fn() -> Aot, imm: fn() -> Aot) -> DecodeEntry {
    use Mnemonic::*;
    group([
        direct(Test, vec![rm(), imm()]),
        direct(Test, vec![rm(), imm()]),
        direct(Not, vec![rm()]),
        direct(Neg, vec![rm()]),
        direct(Mul, vec![rm()]),
        direct(Imul, vec![rm()]),
        direct(Div, vec![rm()]),
        direct(Idiv, vec![rm()]),
    ])
}

fn one_byte_entry(op: u8) -> DecodeEntry {
    use Mnemonic::*;
    use x86_codec_types::{Gpr16, Gpr8};

    match op {
        0x00 => direct(Add, vec![eb(), gb()]),
        0x01 => direct(Add, vec![ev(), gv()]),
        0x02 => direct(Add, vec![gb(), eb()]),
        0x03 => direct(Add, vec![gv(), ev()]),
        0x04 => direct(Add, vec![al(), ib()]),
        0x05 => direct(Add, vec![rax(), iz()]),
        0x06 => direct(Push, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Es))]),
        0x07 => direct(Pop, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Es))]),
        0x08 => direct(Or, vec![eb(), gb()]),
        0x09 => direct(Or, vec![ev(), gv()]),
        0x0A => direct(Or, vec![gb(), eb()]),
        0x0B => direct(Or, vec![gv(), ev()]),
        0x0C => direct(Or, vec![al(), ib()]),
        0x0D => direct(Or, vec![rax(), iz()]),
        0x0E => direct(Push, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Cs))]),
        0x0F => DecodeEntry::Fatal, // escape, consumed by the prefix loop
        0x10 => direct(Adc, vec![eb(), gb()]),
        0x11 => direct(Adc, vec![ev(), gv()]),
        0x12 => direct(Adc, vec![gb(), eb()]),
        0x13 => direct(Adc, vec![gv(), ev()]),
        0x14 => direct(Adc, vec![al(), ib()]),
        0x15 => direct(Adc, vec![rax(), iz()]),
        0x16 => direct(Push, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Ss))]),
        0x17 => direct(Pop, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Ss))]),
        0x18 => direct(Sbb, vec![eb(), gb()]),
        0x19 => direct(Sbb, vec![ev(), gv()]),
        0x1A => direct(Sbb, vec![gb(), eb()]),
        0x1B => direct(Sbb, vec![gv(), ev()]),
        0x1C => direct(Sbb, vec![al(), ib()]),
        0x1D => direct(Sbb, vec![rax(), iz()]),
        0x1E => direct(Push, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Ds))]),
        0x1F => direct(Pop, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Ds))]),
        0x20 => direct(And, vec![eb(), gb()]),
        0x21 => direct(And, vec![ev(), gv()]),
        0x22 => direct(And, vec![gb(), eb()]),
        0x23 => direct(And, vec![gv(), ev()]),
        0x24 => direct(And, vec![al(), ib()]),
        0x25 => direct(And, vec![rax(), iz()]),
        0x26 => DecodeEntry::Fatal, // ES segment override
        0x27 => direct(Daa, vec![]),
        0x28 => direct(Sub, vec![eb(), gb()]),
        0x29 => direct(Sub, vec![ev(), gv()]),
        0x2A => direct(Sub, vec![gb(), eb()]),
        0x2B => direct(Sub, vec![gv(), ev()]),
        0x2C => direct(Sub, vec![al(), ib()]),
        0x2D => direct(Sub, vec![rax(), iz()]),
        0x2E => DecodeEntry::Fatal, // CS segment override
        0x2F => direct(Das, vec![]),
        0x30 => direct(Xor, vec![eb(), gb()]),
        0x31 => direct(Xor, vec![ev(), gv()]),
        0x32 => direct(Xor, vec![gb(), eb()]),
        0x33 => direct(Xor, vec![gv(), ev()]),
        0x34 => direct(Xor, vec![al(), ib()]),
        0x35 => direct(Xor, vec![rax(), iz()]),
        0x36 => DecodeEntry::Fatal, // SS segment override
        0x37 => direct(Aaa, vec![]),
        0x38 => direct(Cmp, vec![eb(), gb()]),
        0x39 => direct(Cmp, vec![ev(), gv()]),
        0x3A => direct(Cmp, vec![gb(), eb()]),
        0x3B => direct(Cmp, vec![gv(), ev()]),
        0x3C => direct(Cmp, vec![al(), ib()]),
        0x3D => direct(Cmp, vec![rax(), iz()]),
        0x3E => DecodeEntry::Fatal, // DS segment override
        0x3F => direct(Aas, vec![]),
        0x40..=0x47 => plus_r32_entry(Inc, 0x40, op, |r| vec![exact_gpr32(r)]),
        0x48..=0x4F => plus_r32_entry(Dec, 0x48, op, |r| vec![exact_gpr32(r)]),
        0x50..=0x57 => plus_r32_entry(Push, 0x50, op, |r| vec![exact_gpr32(r)]),
        0x58..=0x5F => plus_r32_entry(Pop, 0x58, op, |r| vec![exact_gpr32(r)]),
        0x60 => direct(Pusha, vec![]),
        0x61 => direct(Popa, vec![]),
        0x62 => direct(Bound, vec![gv(), mem(MemSize::Qword)]),
        0x63 => direct(Arpl, vec![ew(), Aot::GPart(crate::aot::RegClass::Gpr16)]),
        0x64 => DecodeEntry::Fatal, // FS segment override
        0x65 => DecodeEntry::Fatal, // GS segment override
        0x66 => DecodeEntry::Fatal, // operand-size prefix
        0x67 => DecodeEntry::Fatal, // address-size prefix
        0x68 => direct(Push, vec![iz()]),
        0x69 => direct(Imul, vec![gv(), ev(), iz()]),
        0x6A => direct(Push, vec![ib()]),
        0x6B => direct(Imul, vec![gv(), ev(), ib()]),
        0x6C => direct(Ins, vec![]),
        0x6D => direct(Ins, vec![]),
        0x6E => direct(Outs, vec![]),
        0x6F => direct(Outs, vec![]),
        0x70..=0x7F => jcc_short(op - 0x70),
        0x80 => group1([Add, Or, Adc, Sbb, And, Sub, Xor, Cmp], eb, ib),
        0x81 => group1([Add, Or, Adc, Sbb, And, Sub, Xor, Cmp], ev, iz),
        0x82 => group1([Add, Or, Adc, Sbb, And, Sub, Xor, Cmp], eb, ib),
        0x83 => group1([Add, Or, Adc, Sbb, And, Sub, Xor, Cmp], ev, ib_sx_z),
        0x84 => direct(Test, vec![eb(), gb()]),
        0x85 => direct(Test, vec![ev(), gv()]),
        0x86 => direct(Xchg, vec![eb(), gb()]),
        0x87 => direct(Xchg, vec![ev(), gv()]),
        0x88 => direct(Mov, vec![eb(), gb()]),
        0x89 => direct(Mov, vec![ev(), gv()]),
        0x8A => direct(Mov, vec![gb(), eb()]),
        0x8B => direct(Mov, vec![gv(), ev()]),
        0x8C => direct(Mov, vec![ev(), sreg()]),
        0x8D => direct(Lea, vec![gv(), mem_lea()]),
        0x8E => direct(Mov, vec![sreg(), ew()]),
        0x8F => group([
            direct(Pop, vec![ev()]),
            invalid(), invalid(), invalid(), invalid(), invalid(), invalid(), invalid(),
        ]),
        0x90 => direct(Nop, vec![]),
        0x91..=0x97 => {
            let ord = op - 0x90;
            pred_op_size(
                direct(Xchg, vec![exact_gpr16(Gpr16::from_ordinal(ord).unwrap()), exact_gpr16(Gpr16::Ax)]),
                direct(Xchg, vec![exact_gpr32(Gpr32::from_ordinal(ord).unwrap()), exact_gpr32(Gpr32::Eax)]),
            )
        }
        0x98 => pred_op_size(direct(Cbw, vec![]), direct(Cwde, vec![])),
        0x99 => pred_op_size(direct(Cwd, vec![]), direct(Cdq, vec![])),
        0x9A => direct(Call, vec![ap()]),
        0x9B => direct(Wait, vec![]),
        0x9C => direct(Pushf, vec![]),
        0x9D => direct(Popf, vec![]),
        0x9E => direct(Sahf, vec![]),
        0x9F => direct(Lahf, vec![]),
        0xA0 => direct(Mov, vec![al(), moffb()]),
        0xA1 => direct(Mov, vec![rax(), moffz()]),
        0xA2 => direct(Mov, vec![moffb(), al()]),
        0xA3 => direct(Mov, vec![moffz(), rax()]),
        0xA4 => direct(Movsb, vec![]),
        0xA5 => pred_op_size(direct(Movsw, vec![]), direct(Movsd, vec![])),
        0xA6 => direct(Cmpsb, vec![]),
        0xA7 => pred_op_size(direct(Cmpsw, vec![]), direct(Cmpsd, vec![])),
        0xA8 => direct(Test, vec![al(), ib()]),
        0xA9 => direct(Test, vec![rax(), iz()]),
        0xAA => direct(Stosb, vec![]),
        0xAB => pred_op_size(direct(Stosw, vec![]), direct(Stosd, vec![])),
        0xAC => direct(Lodsb, vec![]),
        0xAD => pred_op_size(direct(Lodsw, vec![]), direct(Lodsd, vec![])),
        0xAE => direct(Scasb, vec![]),
        0xAF => pred_op_size(direct(Scasw, vec![]), direct(Scasd, vec![])),
        0xB0..=0xB7 => plus_r8_entry(Mov, 0xB0, op, |r| vec![exact_gpr8(r), ib()]),
        0xB8..=0xBF => {
            let i = (op - 0xB8) as usize;
            let r32 = Gpr32::from_ordinal(i as u8).unwrap();
            let r16 = Gpr16::from_ordinal(i as u8).unwrap();
            pred_op_size(
                direct(Mov, vec![exact_gpr16(r16), iw()]),
                direct(Mov, vec![exact_gpr32(r32), id()]),
            )
        }
        0xC0 => group2(eb, ib),
        0xC1 => group2(ev, ib),
        0xC2 => direct(Ret, vec![iw()]),
        0xC3 => direct(Ret, vec![]),
        0xC4 => direct(Les, vec![gv(), mem_far_ptr()]),
        0xC5 => direct(Lds, vec![gv(), mem_far_ptr()]),
        0xC6 => group([
            direct(Mov, vec![eb(), ib()]),
            invalid(), invalid(), invalid(), invalid(), invalid(), invalid(), invalid(),
        ]),
        0xC7 => group([
            direct(Mov, vec![ev(), iz()]),
            invalid(), invalid(), invalid(), invalid(), invalid(), invalid(), invalid(),
        ]),
        0xC8 => direct(Enter, vec![iw(), ib()]),
        0xC9 => direct(Leave, vec![]),
        0xCA => direct(Retf, vec![iw()]),
        0xCB => direct(Retf, vec![]),
        0xCC => direct(Int3, vec![]),
        0xCD => direct(Int, vec![ib()]),
        0xCE => direct(Into, vec![]),
        0xCF => direct(Iret, vec![]),
        0xD0 => group2(eb, one),
        0xD1 => group2(ev, one),
        0xD2 => group2(eb, cl),
        0xD3 => group2(ev, cl),
        0xD4 => direct(Aam, vec![ib()]),
        0xD5 => direct(Aad, vec![ib()]),
        0xD6 => direct(Salc, vec![]),
        0xD7 => direct(Xlat, vec![]),
        0xD8 => fpu_d8(),
        0xD9 => fpu_d9(),
        0xDA => fpu_da(),
        0xDB => fpu_db(),
        0xDC => fpu_dc(),
        0xDD => fpu_dd(),
        0xDE => fpu_de(),
        0xDF => fpu_df(),
        0xE0 => direct(Loopne, vec![jb()]),
        0xE1 => direct(Loope, vec![jb()]),
        0xE2 => direct(Loop, vec![jb()]),
        0xE3 => direct(Jcxz, vec![jb()]),
        0xE4 => direct(In, vec![al(), ib()]),
        0xE5 => direct(In, vec![rax(), ib()]),
        0xE6 => direct(Out, vec![ib(), al()]),
        0xE7 => direct(Out, vec![ib(), rax()]),
        0xE8 => direct(Call, vec![jz()]),
        0xE9 => direct(Jmp, vec![jz()]),
        0xEA => direct(Jmp, vec![ap()]),
        0xEB => direct(Jmp, vec![jb()]),
        0xEC => direct(In, vec![al(), dx()]),
        0xED => direct(In, vec![rax(), dx()]),
        0xEE => direct(Out, vec![dx(), al()]),
        0xEF => direct(Out, vec![dx(), rax()]),
        0xF0 => DecodeEntry::Fatal, // LOCK
        0xF1 => invalid(),
        0xF2 => DecodeEntry::Fatal, // REPNE
        0xF3 => DecodeEntry::Fatal, // REP
        0xF4 => direct(Hlt, vec![]),
        0xF5 => direct(Cmc, vec![]),
        0xF6 => group3(eb, ib),
        0xF7 => group3(ev, iz),
        0xF8 => direct(Clc, vec![]),
        0xF9 => direct(Stc, vec![]),
        0xFA => direct(Cli, vec![]),
        0xFB => direct(Sti, vec![]),
        0xFC => direct(Cld, vec![]),
        0xFD => direct(Std, vec![]),
        0xFE => group([
            direct(Inc, vec![eb()]),
            direct(Dec, vec![eb()]),
            invalid(), invalid(), invalid(), invalid(), invalid(), invalid(),
        ]),
        0xFF => group([
            direct(Inc, vec![ev()]),
            direct(Dec, vec![ev()]),
            direct(Call, vec![ev()]),
            direct(Call, vec![mem_far_ptr()]),
            direct(Jmp, vec![ev()]),
            direct(Jmp, vec![mem_far_ptr()]),
            direct(Push, vec![ev()]),
            invalid(),
        ]),
    }
}

/// `LEA`'s second operand and the descriptor-table group's memory operand
/// share the `M` archetype (memory only, no declared size the type checker
/// compares — `LEA` computes an address, it never dereferences).
fn mem_lea() -> Aot {
    mem_lenient(MemSize::Dword)
}

fn mem_far_ptr() -> Aot {
    mem_lenient(MemSize::Fword)
}

fn jcc_short(cond: u8) -> DecodeEntry {
    direct(jcc_mnemonic(cond), vec![jb()])
}

fn jcc_mnemonic(cond: u8) -> Mnemonic {
    use Mnemonic::*;
    match cond {
        0x0 => Jo, 0x1 => Jno, 0x2 => Jb, 0x3 => Jae, 0x4 => Je, 0x5 => Jne,
        0x6 => Jbe, 0x7 => Ja, 0x8 => Js, 0x9 => Jns, 0xA => Jp, 0xB => Jnp,
        0xC => Jl, 0xD => Jge, 0xE => Jle, 0xF => Jg,
        _ => unreachable!("4-bit condition code"),
    }
}

fn cmovcc_mnemonic(cond: u8) -> Mnemonic {
    use Mnemonic::*;
    match cond {
        0x0 => Cmovo, 0x1 => Cmovno, 0x2 => Cmovb, 0x3 => Cmovae, 0x4 => Cmove, 0x5 => Cmovne,
        0x6 => Cmovbe, 0x7 => Cmova, 0x8 => Cmovs, 0x9 => Cmovns, 0xA => Cmovp, 0xB => Cmovnp,
        0xC => Cmovl, 0xD => Cmovge, 0xE => Cmovle, 0xF => Cmovg,
        _ => unreachable!("4-bit condition code"),
    }
}

fn setcc_mnemonic(cond: u8) -> Mnemonic {
    use Mnemonic::*;
    match cond {
        0x0 => Seto, 0x1 => Setno, 0x2 => Setb, 0x3 => Setae, 0x4 => Sete, 0x5 => Setne,
        0x6 => Setbe, 0x7 => Seta, 0x8 => Sets, 0x9 => Setns, 0xA => Setp, 0xB => Setnp,
        0xC => Setl, 0xD => Setge, 0xE => Setle, 0xF => Setg,
        _ => unreachable!("4-bit condition code"),
    }
}

// ---------------------------------------------------------------------
// x87 FPU ESC opcodes, D8..DF (§10.6 grounds these in standard Intel
// encodings rather than the Python reference, whose FPU tables this
// implementation does not transcribe line-for-line — see DESIGN.md).
// ---------------------------------------------------------------------

fn fpu_arith_mem(mnems: [Mnemonic; 8], size: MemSize) -> [DecodeEntry; 8] {
    std::array::from_fn(|i| direct(mnems[i], vec![mem(size)]))
}

/// `D8`'s register form: `ST0` is always the implicit destination; `FCOM`/
/// `FCOMP` take only the `ST(i)` operand (the comparison result lands in
/// flags, not a register).
fn fpu_d8_reg() -> [DecodeEntry; 8] {
    use Mnemonic::*;
    [
        direct(Fadd, vec![st0(), sti()]),
        direct(Fmul, vec![st0(), sti()]),
        direct(Fcom, vec![sti()]),
        direct(Fcomp, vec![sti()]),
        direct(Fsub, vec![st0(), sti()]),
        direct(Fsubr, vec![st0(), sti()]),
        direct(Fdiv, vec![st0(), sti()]),
        direct(Fdivr, vec![st0(), sti()]),
    ]
}

fn fpu_d8() -> DecodeEntry {
    use Mnemonic::*;
    let mut mem_side = fpu_arith_mem([Fadd, Fmul, Fcom, Fcomp, Fsub, Fsubr, Fdiv, Fdivr], MemSize::Dword);
    let mut reg_side = fpu_d8_reg();
    group(std::array::from_fn(|i| {
        pred_mod(take(&mut reg_side, i), take(&mut mem_side, i))
    }))
}

/// `DC`'s register form inverts `FSUB`/`FSUBR` and `FDIV`/`FDIVR` relative to
/// `D8` (a well-known x87 quirk) and reverses the operand order to
/// `ST(i), ST0`. `FCOM`/`FCOMP` have no register alias here.
fn fpu_dc() -> DecodeEntry {
    use Mnemonic::*;
    let mut mem_side = fpu_arith_mem([Fadd, Fmul, Fcom, Fcomp, Fsub, Fsubr, Fdiv, Fdivr], MemSize::Qword);
    let mut reg_side: [DecodeEntry; 8] = [
        direct(Fadd, vec![sti(), st0()]),
        direct(Fmul, vec![sti(), st0()]),
        invalid(),
        invalid(),
        direct(Fsubr, vec![sti(), st0()]),
        direct(Fsub, vec![sti(), st0()]),
        direct(Fdivr, vec![sti(), st0()]),
        direct(Fdiv, vec![sti(), st0()]),
    ];
    group(std::array::from_fn(|i| {
        pred_mod(take(&mut reg_side, i), take(&mut mem_side, i))
    }))
}

fn fpu_da() -> DecodeEntry {
    use Mnemonic::*;
    let mut mem_side = fpu_arith_mem([Fiadd, Fimul, Ficom, Ficomp, Fisub, Fisubr, Fidiv, Fidivr], MemSize::Dword);
    let mut reg_side: [DecodeEntry; 8] = [
        direct(Fcmovb, vec![st0(), sti()]),
        direct(Fcmove, vec![st0(), sti()]),
        direct(Fcmovbe, vec![st0(), sti()]),
        direct(Fcmovu, vec![st0(), sti()]),
        invalid(),
        rm_group([
            invalid(), direct(Fucompp, vec![]), invalid(), invalid(),
            invalid(), invalid(), invalid(), invalid(),
        ]),
        invalid(),
        invalid(),
    ];
    group(std::array::from_fn(|i| {
        pred_mod(take(&mut reg_side, i), take(&mut mem_side, i))
    }))
}

fn fpu_de() -> DecodeEntry {
    use Mnemonic::*;
    let mut mem_side = fpu_arith_mem([Fiadd, Fimul, Ficom, Ficomp, Fisub, Fisubr, Fidiv, Fidivr], MemSize::Word);
    let mut reg_side: [DecodeEntry; 8] = [
        direct(Faddp, vec![sti(), st0()]),
        direct(Fmulp, vec![sti(), st0()]),
        rm_group([
            invalid(), direct(Fcompp, vec![]), invalid(), invalid(),
            invalid(), invalid(), invalid(), invalid(),
        ]),
        invalid(),
        direct(Fsubrp, vec![sti(), st0()]),
        direct(Fsubp, vec![sti(), st0()]),
        direct(Fdivrp, vec![sti(), st0()]),
        direct(Fdivp, vec![sti(), st0()]),
    ];
    group(std::array::from_fn(|i| {
        pred_mod(take(&mut reg_side, i), take(&mut mem_side, i))
    }))
}

fn fpu_db() -> DecodeEntry {
    use Mnemonic::*;
    let mut mem_side: [DecodeEntry; 8] = [
        direct(Fild, vec![mem(MemSize::Dword)]),
        invalid(),
        direct(Fist, vec![mem(MemSize::Dword)]),
        direct(Fistp, vec![mem(MemSize::Dword)]),
        invalid(),
        direct(Fld, vec![mem(MemSize::Tword)]),
        invalid(),
        direct(Fstp, vec![mem(MemSize::Tword)]),
    ];
    let mut reg_side: [DecodeEntry; 8] = [
        direct(Fcmovnb, vec![st0(), sti()]),
        direct(Fcmovne, vec![st0(), sti()]),
        direct(Fcmovnbe, vec![st0(), sti()]),
        direct(Fcmovnu, vec![st0(), sti()]),
        rm_group([
            invalid(), invalid(), direct(Fnclex, vec![]), direct(Fninit, vec![]),
            invalid(), invalid(), invalid(), invalid(),
        ]),
        direct(Fucomi, vec![st0(), sti()]),
        direct(Fcomi, vec![st0(), sti()]),
        invalid(),
    ];
    group(std::array::from_fn(|i| {
        pred_mod(take(&mut reg_side, i), take(&mut mem_side, i))
    }))
}

fn fpu_dd() -> DecodeEntry {
    use Mnemonic::*;
    let mut mem_side: [DecodeEntry; 8] = [
        direct(Fld, vec![mem(MemSize::Qword)]),
        invalid(),
        direct(Fst, vec![mem(MemSize::Qword)]),
        direct(Fstp, vec![mem(MemSize::Qword)]),
        direct(Frstor, vec![fpenv()]),
        invalid(),
        direct(Fnsave, vec![fpenv()]),
        direct(Fnstsw, vec![mem(MemSize::Word)]),
    ];
    let mut reg_side: [DecodeEntry; 8] = [
        direct(Ffree, vec![sti()]),
        invalid(),
        direct(Fst, vec![sti()]),
        direct(Fstp, vec![sti()]),
        direct(Fucom, vec![sti()]),
        direct(Fucomp, vec![sti()]),
        invalid(),
        invalid(),
    ];
    group(std::array::from_fn(|i| {
        pred_mod(take(&mut reg_side, i), take(&mut mem_side, i))
    }))
}

fn fpu_df() -> DecodeEntry {
    use Mnemonic::*;
    let mut mem_side: [DecodeEntry; 8] = [
        direct(Fild, vec![mem(MemSize::Word)]),
        invalid(),
        direct(Fist, vec![mem(MemSize::Word)]),
        direct(Fistp, vec![mem(MemSize::Word)]),
        direct(Fbld, vec![mem(MemSize::Tword)]),
        direct(Fild, vec![mem(MemSize::Qword)]),
        direct(Fbstp, vec![mem(MemSize::Tword)]),
        direct(Fistp, vec![mem(MemSize::Qword)]),
    ];
    let mut reg_side: [DecodeEntry; 8] = [
        invalid(), invalid(), invalid(), invalid(),
        rm_group([
            direct(Fnstsw, vec![]), invalid(), invalid(), invalid(),
            invalid(), invalid(), invalid(), invalid(),
        ]),
        direct(Fucomip, vec![st0(), sti()]),
        direct(Fcomip, vec![st0(), sti()]),
        invalid(),
    ];
    group(std::array::from_fn(|i| {
        pred_mod(take(&mut reg_side, i), take(&mut mem_side, i))
    }))
}

fn fpu_d9() -> DecodeEntry {
    use Mnemonic::*;
    let mut mem_side: [DecodeEntry; 8] = [
        direct(Fld, vec![mem(MemSize::Dword)]),
        invalid(),
        direct(Fst, vec![mem(MemSize::Dword)]),
        direct(Fstp, vec![mem(MemSize::Dword)]),
        direct(Fldenv, vec![fpenv()]),
        direct(Fldcw, vec![mem(MemSize::Word)]),
        direct(Fnstenv, vec![fpenv()]),
        direct(Fnstcw, vec![mem(MemSize::Word)]),
    ];
    let mut reg_side: [DecodeEntry; 8] = [
        direct(Fld, vec![sti()]),
        direct(Fxch, vec![sti()]),
        rm_group([
            direct(Fnop, vec![]), invalid(), invalid(), invalid(),
            invalid(), invalid(), invalid(), invalid(),
        ]),
        invalid(),
        rm_group([
            direct(Fchs, vec![]), direct(Fabs, vec![]), invalid(), invalid(),
            direct(Ftst, vec![]), direct(Fxam, vec![]), invalid(), invalid(),
        ]),
        rm_group([
            direct(Fld1, vec![]), direct(Fldl2t, vec![]), direct(Fldl2e, vec![]), direct(Fldpi, vec![]),
            direct(Fldlg2, vec![]), direct(Fldln2, vec![]), direct(Fldz, vec![]), invalid(),
        ]),
        rm_group([
            direct(F2xm1, vec![]), direct(Fyl2x, vec![]), direct(Fptan, vec![]), direct(Fpatan, vec![]),
            direct(Fxtract, vec![]), direct(Fprem1, vec![]), direct(Fdecstp, vec![]), direct(Fincstp, vec![]),
        ]),
        rm_group([
            direct(Fprem, vec![]), direct(Fyl2xp1, vec![]), direct(Fsqrt, vec![]), direct(Fsincos, vec![]),
            direct(Frndint, vec![]), direct(Fscale, vec![]), direct(Fsin, vec![]), direct(Fcos, vec![]),
        ]),
    ];
    group(std::array::from_fn(|i| {
        pred_mod(take(&mut reg_side, i), take(&mut mem_side, i))
    }))
}

/// `[DecodeEntry; 8]` isn't `Copy`/`Clone` (its variants own `Box`es), so
/// building the per-`ggg` `PredMod` pair from two parallel arrays has to
/// destructure by index; this extracts one element, replacing it with
/// `Invalid` (never observed — each index is taken exactly once).
fn take(arr: &mut [DecodeEntry; 8], i: usize) -> DecodeEntry {
    std::mem::replace(&mut arr[i], DecodeEntry::Invalid)
}

// ---------------------------------------------------------------------
// 0F-escape secondary map, 0x100..0x1FF
// ---------------------------------------------------------------------

fn group6_0f00() -> DecodeEntry {
    use Mnemonic::*;
    group([
        direct(Sldt, vec![ew()]),
        direct(Str, vec![ew()]),
        direct(Lldt, vec![ew()]),
        direct(Ltr, vec![ew()]),
        direct(Verr, vec![ew()]),
        direct(Verw, vec![ew()]),
        invalid(),
        invalid(),
    ])
}

fn group7_0f01() -> DecodeEntry {
    use Mnemonic::*;
    group([
        direct(Sgdt, vec![mem_lenient(MemSize::Fword)]),
        direct(Sidt, vec![mem_lenient(MemSize::Fword)]),
        direct(Lgdt, vec![mem_lenient(MemSize::Fword)]),
        direct(Lidt, vec![mem_lenient(MemSize::Fword)]),
        direct(Smsw, vec![ew()]),
        invalid(),
        direct(Lmsw, vec![ew()]),
        direct(Invlpg, vec![mem_lenient(MemSize::Byte)]),
    ])
}

fn group8_0fba() -> DecodeEntry {
    use Mnemonic::*;
    group([
        invalid(), invalid(), invalid(), invalid(),
        direct(Bt, vec![ev(), ib()]),
        direct(Bts, vec![ev(), ib()]),
        direct(Btr, vec![ev(), ib()]),
        direct(Btc, vec![ev(), ib()]),
    ])
}

fn group15_0fae() -> DecodeEntry {
    use Mnemonic::*;
    group([
        direct(Fxsave, vec![simd_state()]),
        direct(Fxrstor, vec![simd_state()]),
        invalid(), invalid(), invalid(), invalid(), invalid(), invalid(),
    ])
}

fn escape0f_entry(op: u8) -> DecodeEntry {
    use Mnemonic::*;
    match op {
        0x00 => group6_0f00(),
        0x01 => group7_0f01(),
        0x02 => direct(Lar, vec![gv(), ew()]),
        0x03 => direct(Lsl, vec![gv(), ew()]),
        0x06 => direct(Clts, vec![]),
        0x08 => direct(Invd, vec![]),
        0x09 => direct(Wbinvd, vec![]),
        0x10 => sse(
            direct(MovupsSse, vec![Aot::GPart(crate::aot::RegClass::Xmm), xmmdq()]),
            direct(MovssSse, vec![Aot::GPart(crate::aot::RegClass::Xmm), xmmdq()]),
            direct(MovupdSse, vec![Aot::GPart(crate::aot::RegClass::Xmm), xmmdq()]),
            direct(MovsdSse, vec![Aot::GPart(crate::aot::RegClass::Xmm), xmmdq()]),
        ),
        0x11 => sse(
            direct(MovupsSse, vec![xmmdq(), Aot::GPart(crate::aot::RegClass::Xmm)]),
            direct(MovssSse, vec![xmmdq(), Aot::GPart(crate::aot::RegClass::Xmm)]),
            direct(MovupdSse, vec![xmmdq(), Aot::GPart(crate::aot::RegClass::Xmm)]),
            direct(MovsdSse, vec![xmmdq(), Aot::GPart(crate::aot::RegClass::Xmm)]),
        ),
        0x20 => direct(Mov, vec![ed(), creg()]),
        0x21 => direct(Mov, vec![ed(), dreg()]),
        0x22 => direct(Mov, vec![creg(), ed()]),
        0x23 => direct(Mov, vec![dreg(), ed()]),
        0x28 => sse(
            direct(MovapsSse, vec![Aot::GPart(crate::aot::RegClass::Xmm), xmmdq()]),
            invalid(),
            direct(MovapdSse, vec![Aot::GPart(crate::aot::RegClass::Xmm), xmmdq()]),
            invalid(),
        ),
        0x29 => sse(
            direct(MovapsSse, vec![xmmdq(), Aot::GPart(crate::aot::RegClass::Xmm)]),
            invalid(),
            direct(MovapdSse, vec![xmmdq(), Aot::GPart(crate::aot::RegClass::Xmm)]),
            invalid(),
        ),
        0x40..=0x4F => direct(cmovcc_mnemonic(op - 0x40), vec![gv(), ev()]),
        0x60 => direct(Punpcklbw, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxd()]),
        0x61 => direct(Punpcklwd, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxd()]),
        0x62 => direct(Punpckldq, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxd()]),
        0x63 => direct(Packsswb, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0x6E => sse(
            direct(Movd, vec![Aot::GPart(crate::aot::RegClass::Mmx), ed()]),
            invalid(),
            direct(Movd, vec![Aot::GPart(crate::aot::RegClass::Xmm), ed()]),
            invalid(),
        ),
        0x6F => direct(Movq, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0x74 => direct(Pcmpeqb, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0x75 => direct(Pcmpeqw, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0x76 => direct(Pcmpeqd, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0x7E => sse(
            direct(Movd, vec![ed(), Aot::GPart(crate::aot::RegClass::Mmx)]),
            direct(Movq, vec![Aot::GPart(crate::aot::RegClass::Xmm), xmmq()]),
            direct(Movd, vec![ed(), Aot::GPart(crate::aot::RegClass::Xmm)]),
            invalid(),
        ),
        0x7F => direct(Movq, vec![mmxq(), Aot::GPart(crate::aot::RegClass::Mmx)]),
        0x80..=0x8F => direct(jcc_mnemonic(op - 0x80), vec![jz()]),
        0x90..=0x9F => direct(setcc_mnemonic(op - 0x90), vec![eb()]),
        0xA0 => direct(Push, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Fs))]),
        0xA1 => direct(Pop, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Fs))]),
        0xA2 => direct(Cpuid, vec![]),
        0xA3 => direct(Bt, vec![ev(), gv()]),
        0xA4 => direct(Shld, vec![ev(), gv(), ib()]),
        0xA5 => direct(Shld, vec![ev(), gv(), cl()]),
        0xA8 => direct(Push, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Gs))]),
        0xA9 => direct(Pop, vec![Aot::Exact(Operand::Segment(x86_codec_types::Segment::Gs))]),
        0xAB => direct(Bts, vec![ev(), gv()]),
        0xAC => direct(Shrd, vec![ev(), gv(), ib()]),
        0xAD => direct(Shrd, vec![ev(), gv(), cl()]),
        0xAE => group15_0fae(),
        0xAF => direct(Imul, vec![gv(), ev()]),
        0xB0 => direct(Cmpxchg, vec![eb(), gb()]),
        0xB1 => direct(Cmpxchg, vec![ev(), gv()]),
        0xB2 => direct(Lss, vec![gv(), mem_far_ptr()]),
        0xB3 => direct(Btr, vec![ev(), gv()]),
        0xB4 => direct(Lfs, vec![gv(), mem_far_ptr()]),
        0xB5 => direct(Lgs, vec![gv(), mem_far_ptr()]),
        0xB6 => direct(Movzx, vec![gv(), eb()]),
        0xB7 => direct(Movzx, vec![gv(), ew()]),
        0xBA => group8_0fba(),
        0xBB => direct(Btc, vec![ev(), gv()]),
        0xBC => direct(Bsf, vec![gv(), ev()]),
        0xBD => direct(Bsr, vec![gv(), ev()]),
        0xBE => direct(Movsx, vec![gv(), eb()]),
        0xBF => direct(Movsx, vec![gv(), ew()]),
        0xC0 => direct(Xadd, vec![eb(), gb()]),
        0xC1 => direct(Xadd, vec![ev(), gv()]),
        0xC8..=0xCF => plus_r32_entry(Bswap, 0xC8, op, |r| vec![exact_gpr32(r)]),
        0xDB => direct(Pand, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xDF => direct(Pandn, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xEB => direct(Por, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xEF => direct(Pxor, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xF8 => direct(Psubb, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xF9 => direct(Psubw, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xFA => direct(Psubd, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xFC => direct(Paddb, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xFD => direct(Paddw, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        0xFE => direct(Paddd, vec![Aot::GPart(crate::aot::RegClass::Mmx), mmxq()]),
        _ => invalid(),
    }
}

/// Builds the full 1,024-entry table. `0x200..0x3FF` (the `0F 38`/`0F 3A`
/// tertiary maps) stay `Invalid` throughout: no mnemonic in this revision's
/// representative coverage dispatches through either escape.
pub fn build() -> Vec<DecodeEntry> {
    let mut table = Vec::with_capacity(1024);
    for op in 0u16..=0xFF {
        table.push(one_byte_entry(op as u8));
    }
    for op in 0u16..=0xFF {
        table.push(escape0f_entry(op as u8));
    }
    for _ in 0x200..0x400 {
        table.push(DecodeEntry::Invalid);
    }
    table
}

static TABLE: OnceLock<Vec<DecodeEntry>> = OnceLock::new();

/// The process-wide decode table, built on first use (§5, §10.1).
pub fn table() -> &'static [DecodeEntry] {
    TABLE.get_or_init(build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_1024_entries() {
        assert_eq!(table().len(), 1024);
    }

    #[test]
    fn escape_opcode_is_fatal_not_dispatched() {
        assert!(matches!(table()[0x0F], DecodeEntry::Fatal));
    }

    #[test]
    fn tertiary_maps_are_fully_invalid() {
        assert!(table()[0x200..0x400]
            .iter()
            .all(|e| matches!(e, DecodeEntry::Invalid)));
    }

    #[test]
    fn one_byte_add_is_direct() {
        assert!(matches!(table()[0x00], DecodeEntry::Direct(Mnemonic::Add, _)));
    }

    #[test]
    fn group1_opcode_is_group() {
        assert!(matches!(table()[0x80], DecodeEntry::Group(_)));
    }
}

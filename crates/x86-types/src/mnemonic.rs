// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The mnemonic vocabulary. Coverage is representative rather than
//! exhaustive: every mnemonic named here has at least one decode-table entry
//! and one encode-table candidate wired up; the general-purpose 32-bit core
//! is covered in full, with a representative slice of the x87 FPU and
//! MMX/SSE families layered on top (see the original reference
//! implementation's much larger mnemonic list, of which this is a subset).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    // Data movement
    Mov, Movsx, Movzx, Lea, Xchg, Push, Pop, Pusha, Popa, Pushf, Popf,
    Cbw, Cwde, Cwd, Cdq, Bswap, In, Out,
    // String operations (the mnemonic-exception class: zero-operand and
    // operand-bearing forms both exist)
    Movsb, Movsw, Movsd, Cmpsb, Cmpsw, Cmpsd, Stosb, Stosw, Stosd,
    Lodsb, Lodsw, Lodsd, Scasb, Scasw, Scasd, Ins, Outs,
    // Arithmetic / logic
    Add, Adc, Sub, Sbb, And, Or, Xor, Cmp, Test, Inc, Dec, Neg, Not,
    Mul, Imul, Div, Idiv, Daa, Das, Aaa, Aas, Aad, Aam,
    // Shift / rotate
    Rol, Ror, Rcl, Rcr, Shl, Sar, Shr, Shld, Shrd,
    // Bit manipulation
    Bt, Bts, Btr, Btc, Bsf, Bsr,
    // Control flow
    Jmp, Call, Ret, Retf, Int, Int3, Into, Iret, Loop, Loope, Loopne, Jcxz,
    Jo, Jno, Jb, Jae, Je, Jne, Jbe, Ja, Js, Jns, Jp, Jnp, Jl, Jge, Jle, Jg,
    Seto, Setno, Setb, Setae, Sete, Setne, Setbe, Seta, Sets, Setns, Setp,
    Setnp, Setl, Setge, Setle, Setg,
    Cmovo, Cmovno, Cmovb, Cmovae, Cmove, Cmovne, Cmovbe, Cmova, Cmovs,
    Cmovns, Cmovp, Cmovnp, Cmovl, Cmovge, Cmovle, Cmovg,
    // Flags
    Clc, Stc, Cmc, Cld, Std, Cli, Sti, Lahf, Sahf, Nop,
    // Misc system / privileged
    Hlt, Wait, Cpuid, Lgdt, Sgdt, Lidt, Sidt, Lldt, Sldt, Ltr, Str,
    Lmsw, Smsw, Clts, Invd, Invlpg, Wbinvd, Arpl, Bound, Enter, Leave,
    Xlat, Xadd, Cmpxchg, Verr, Verw, Lar, Lsl,
    Lds, Les, Lfs, Lgs, Lss, Salc,
    // x87 FPU (representative subset)
    Fld, Fst, Fstp, Fxch, Fild, Fist, Fistp, Fbld, Fbstp,
    Fadd, Faddp, Fiadd, Fsub, Fsubp, Fisub, Fsubr, Fsubrp, Fisubr,
    Fmul, Fmulp, Fimul, Fdiv, Fdivp, Fidiv, Fdivr, Fdivrp, Fidivr,
    Fcom, Fcomp, Fcompp, Fucom, Fucomp, Fucompp, Ficom, Ficomp,
    Ftst, Fxam, Fld1, Fldl2t, Fldl2e, Fldpi, Fldlg2, Fldln2, Fldz,
    F2xm1, Fyl2x, Fptan, Fpatan, Fxtract, Fprem1, Fdecstp, Fincstp,
    Fprem, Fyl2xp1, Fsqrt, Fsincos, Frndint, Fscale, Fsin, Fcos,
    Fchs, Fabs, Fninit, Fldcw, Fnstcw, Fnstenv,
    Fldenv, Fnsave, Frstor, Fnclex, Fnstsw,
    Fcmovb, Fcmove, Fcmovbe, Fcmovu, Fcmovnb, Fcmovne, Fcmovnbe, Fcmovnu,
    Fucomi, Fcomi, Fucomip, Fcomip, Ffree, Fnop,
    // MMX / SSE (representative subset)
    Movd, Movq, MovupsSse, MovapsSse, MovssSse, MovsdSse, MovupdSse, MovapdSse,
    Paddb, Paddw, Paddd, Psubb, Psubw, Psubd,
    Pand, Pandn, Por, Pxor, Pcmpeqb, Pcmpeqw, Pcmpeqd,
    Punpcklbw, Punpcklwd, Punpckldq, Packsswb,
    Fxsave, Fxrstor,
}

impl Mnemonic {
    /// The canonical uppercase text used by the textual form and the
    /// (optional) assembly-text collaborator. A handful of mnemonics that
    /// collide in assembly text with an unrelated instruction (e.g. the
    /// string instruction `MOVSD` versus the SSE scalar-double move) carry a
    /// disambiguating Rust-level name but share printed text.
    pub fn text(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Mov => "MOV", Movsx => "MOVSX", Movzx => "MOVZX", Lea => "LEA",
            Xchg => "XCHG", Push => "PUSH", Pop => "POP", Pusha => "PUSHA",
            Popa => "POPA", Pushf => "PUSHF", Popf => "POPF", Cbw => "CBW",
            Cwde => "CWDE", Cwd => "CWD", Cdq => "CDQ", Bswap => "BSWAP",
            In => "IN", Out => "OUT",
            Movsb => "MOVSB", Movsw => "MOVSW", Movsd => "MOVSD",
            Cmpsb => "CMPSB", Cmpsw => "CMPSW", Cmpsd => "CMPSD",
            Stosb => "STOSB", Stosw => "STOSW", Stosd => "STOSD",
            Lodsb => "LODSB", Lodsw => "LODSW", Lodsd => "LODSD",
            Scasb => "SCASB", Scasw => "SCASW", Scasd => "SCASD",
            Ins => "INS", Outs => "OUTS",
            Add => "ADD", Adc => "ADC", Sub => "SUB", Sbb => "SBB",
            And => "AND", Or => "OR", Xor => "XOR", Cmp => "CMP",
            Test => "TEST", Inc => "INC", Dec => "DEC", Neg => "NEG",
            Not => "NOT", Mul => "MUL", Imul => "IMUL", Div => "DIV",
            Idiv => "IDIV", Daa => "DAA", Das => "DAS", Aaa => "AAA",
            Aas => "AAS", Aad => "AAD", Aam => "AAM",
            Rol => "ROL", Ror => "ROR", Rcl => "RCL", Rcr => "RCR",
            Shl => "SHL", Sar => "SAR", Shr => "SHR", Shld => "SHLD",
            Shrd => "SHRD",
            Bt => "BT", Bts => "BTS", Btr => "BTR", Btc => "BTC",
            Bsf => "BSF", Bsr => "BSR",
            Jmp => "JMP", Call => "CALL", Ret => "RET", Retf => "RETF",
            Int => "INT", Int3 => "INT3", Into => "INTO", Iret => "IRET",
            Loop => "LOOP", Loope => "LOOPE", Loopne => "LOOPNE", Jcxz => "JCXZ",
            Jo => "JO", Jno => "JNO", Jb => "JB", Jae => "JAE", Je => "JE",
            Jne => "JNE", Jbe => "JBE", Ja => "JA", Js => "JS", Jns => "JNS",
            Jp => "JP", Jnp => "JNP", Jl => "JL", Jge => "JGE", Jle => "JLE",
            Jg => "JG",
            Seto => "SETO", Setno => "SETNO", Setb => "SETB", Setae => "SETAE",
            Sete => "SETE", Setne => "SETNE", Setbe => "SETBE", Seta => "SETA",
            Sets => "SETS", Setns => "SETNS", Setp => "SETP", Setnp => "SETNP",
            Setl => "SETL", Setge => "SETGE", Setle => "SETLE", Setg => "SETG",
            Cmovo => "CMOVO", Cmovno => "CMOVNO", Cmovb => "CMOVB",
            Cmovae => "CMOVAE", Cmove => "CMOVE", Cmovne => "CMOVNE",
            Cmovbe => "CMOVBE", Cmova => "CMOVA", Cmovs => "CMOVS",
            Cmovns => "CMOVNS", Cmovp => "CMOVP", Cmovnp => "CMOVNP",
            Cmovl => "CMOVL", Cmovge => "CMOVGE", Cmovle => "CMOVLE",
            Cmovg => "CMOVG",
            Clc => "CLC", Stc => "STC", Cmc => "CMC", Cld => "CLD",
            Std => "STD", Cli => "CLI", Sti => "STI", Lahf => "LAHF",
            Sahf => "SAHF", Nop => "NOP",
            Hlt => "HLT", Wait => "WAIT", Cpuid => "CPUID", Lgdt => "LGDT",
            Sgdt => "SGDT", Lidt => "LIDT", Sidt => "SIDT", Lldt => "LLDT",
            Sldt => "SLDT", Ltr => "LTR", Str => "STR", Lmsw => "LMSW",
            Smsw => "SMSW", Clts => "CLTS", Invd => "INVD", Invlpg => "INVLPG",
            Wbinvd => "WBINVD", Arpl => "ARPL", Bound => "BOUND",
            Enter => "ENTER", Leave => "LEAVE", Xlat => "XLAT", Xadd => "XADD",
            Cmpxchg => "CMPXCHG", Verr => "VERR", Verw => "VERW", Lar => "LAR",
            Lsl => "LSL", Lds => "LDS", Les => "LES", Lfs => "LFS", Lgs => "LGS",
            Lss => "LSS", Salc => "SALC",
            Fld => "FLD", Fst => "FST", Fstp => "FSTP", Fxch => "FXCH",
            Fild => "FILD", Fist => "FIST", Fistp => "FISTP", Fbld => "FBLD",
            Fbstp => "FBSTP",
            Fadd => "FADD", Faddp => "FADDP", Fiadd => "FIADD", Fsub => "FSUB",
            Fsubp => "FSUBP", Fisub => "FISUB", Fsubr => "FSUBR",
            Fsubrp => "FSUBRP", Fisubr => "FISUBR",
            Fmul => "FMUL", Fmulp => "FMULP", Fimul => "FIMUL", Fdiv => "FDIV",
            Fdivp => "FDIVP", Fidiv => "FIDIV", Fdivr => "FDIVR",
            Fdivrp => "FDIVRP", Fidivr => "FIDIVR",
            Fcom => "FCOM", Fcomp => "FCOMP", Fcompp => "FCOMPP",
            Fucom => "FUCOM", Fucomp => "FUCOMP", Fucompp => "FUCOMPP",
            Ficom => "FICOM", Ficomp => "FICOMP",
            Ftst => "FTST", Fxam => "FXAM", Fld1 => "FLD1", Fldl2t => "FLDL2T",
            Fldl2e => "FLDL2E", Fldpi => "FLDPI", Fldlg2 => "FLDLG2",
            Fldln2 => "FLDLN2", Fldz => "FLDZ",
            F2xm1 => "F2XM1", Fyl2x => "FYL2X", Fptan => "FPTAN",
            Fpatan => "FPATAN", Fxtract => "FXTRACT", Fprem1 => "FPREM1",
            Fdecstp => "FDECSTP", Fincstp => "FINCSTP", Fprem => "FPREM",
            Fyl2xp1 => "FYL2XP1", Fsqrt => "FSQRT", Fsincos => "FSINCOS",
            Frndint => "FRNDINT", Fscale => "FSCALE", Fsin => "FSIN",
            Fcos => "FCOS", Fchs => "FCHS", Fabs => "FABS", Fninit => "FNINIT",
            Fldcw => "FLDCW", Fnstcw => "FNSTCW",
            Fnstenv => "FNSTENV",
            Fldenv => "FLDENV", Fnsave => "FNSAVE",
            Frstor => "FRSTOR", Fnclex => "FNCLEX",
            Fnstsw => "FNSTSW",
            Fcmovb => "FCMOVB", Fcmove => "FCMOVE", Fcmovbe => "FCMOVBE",
            Fcmovu => "FCMOVU", Fcmovnb => "FCMOVNB", Fcmovne => "FCMOVNE",
            Fcmovnbe => "FCMOVNBE", Fcmovnu => "FCMOVNU",
            Fucomi => "FUCOMI", Fcomi => "FCOMI", Fucomip => "FUCOMIP",
            Fcomip => "FCOMIP", Ffree => "FFREE", Fnop => "FNOP",
            Movd => "MOVD", Movq => "MOVQ",
            MovupsSse => "MOVUPS", MovapsSse => "MOVAPS", MovssSse => "MOVSS",
            MovsdSse => "MOVSD", MovupdSse => "MOVUPD", MovapdSse => "MOVAPD",
            Paddb => "PADDB", Paddw => "PADDW", Paddd => "PADDD",
            Psubb => "PSUBB", Psubw => "PSUBW", Psubd => "PSUBD",
            Pand => "PAND", Pandn => "PANDN", Por => "POR", Pxor => "PXOR",
            Pcmpeqb => "PCMPEQB", Pcmpeqw => "PCMPEQW", Pcmpeqd => "PCMPEQD",
            Punpcklbw => "PUNPCKLBW", Punpcklwd => "PUNPCKLWD",
            Punpckldq => "PUNPCKLDQ", Packsswb => "PACKSSWB",
            Fxsave => "FXSAVE", Fxrstor => "FXRSTOR",
        }
    }

    /// True for the mnemonics that have both a zero-operand string form and
    /// an explicit-operand form; the encode∘decode fixpoint property (§8)
    /// holds for these only modulo normalization to the zero-operand form.
    pub fn is_string_exception_class(self) -> bool {
        matches!(
            self,
            Mnemonic::Das
                | Mnemonic::Aad
                | Mnemonic::Aam
                | Mnemonic::Lodsb
                | Mnemonic::Lodsw
                | Mnemonic::Lodsd
                | Mnemonic::Cmpsb
                | Mnemonic::Cmpsw
                | Mnemonic::Cmpsd
                | Mnemonic::Movsb
                | Mnemonic::Movsw
                | Mnemonic::Movsd
                | Mnemonic::Stosb
                | Mnemonic::Stosw
                | Mnemonic::Stosd
                | Mnemonic::Scasb
                | Mnemonic::Scasw
                | Mnemonic::Scasd
        )
    }
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

impl Mnemonic {
    /// The inverse of `text`, case-insensitive. `MOVSD` resolves to the
    /// string-move `Movsd`, never the SSE `MovsdSse` — the two share
    /// printed text, and the text form alone carries no operand shape to
    /// disambiguate them (a real assembler would decide from the operand
    /// list; this collaborator does not go that far).
    pub fn from_text(s: &str) -> Option<Mnemonic> {
        use Mnemonic::*;
        Some(match s.to_ascii_uppercase().as_str() {
            "MOV" => Mov, "MOVSX" => Movsx, "MOVZX" => Movzx, "LEA" => Lea,
            "XCHG" => Xchg, "PUSH" => Push, "POP" => Pop, "PUSHA" => Pusha,
            "POPA" => Popa, "PUSHF" => Pushf, "POPF" => Popf, "CBW" => Cbw,
            "CWDE" => Cwde, "CWD" => Cwd, "CDQ" => Cdq, "BSWAP" => Bswap,
            "IN" => In, "OUT" => Out,
            "MOVSB" => Movsb, "MOVSW" => Movsw, "MOVSD" => Movsd,
            "CMPSB" => Cmpsb, "CMPSW" => Cmpsw, "CMPSD" => Cmpsd,
            "STOSB" => Stosb, "STOSW" => Stosw, "STOSD" => Stosd,
            "LODSB" => Lodsb, "LODSW" => Lodsw, "LODSD" => Lodsd,
            "SCASB" => Scasb, "SCASW" => Scasw, "SCASD" => Scasd,
            "INS" => Ins, "OUTS" => Outs,
            "ADD" => Add, "ADC" => Adc, "SUB" => Sub, "SBB" => Sbb,
            "AND" => And, "OR" => Or, "XOR" => Xor, "CMP" => Cmp,
            "TEST" => Test, "INC" => Inc, "DEC" => Dec, "NEG" => Neg,
            "NOT" => Not, "MUL" => Mul, "IMUL" => Imul, "DIV" => Div,
            "IDIV" => Idiv, "DAA" => Daa, "DAS" => Das, "AAA" => Aaa,
            "AAS" => Aas, "AAD" => Aad, "AAM" => Aam,
            "ROL" => Rol, "ROR" => Ror, "RCL" => Rcl, "RCR" => Rcr,
            "SHL" => Shl, "SAR" => Sar, "SHR" => Shr, "SHLD" => Shld,
            "SHRD" => Shrd,
            "BT" => Bt, "BTS" => Bts, "BTR" => Btr, "BTC" => Btc,
            "BSF" => Bsf, "BSR" => Bsr,
            "JMP" => Jmp, "CALL" => Call, "RET" => Ret, "RETF" => Retf,
            "INT" => Int, "INT3" => Int3, "INTO" => Into, "IRET" => Iret,
            "LOOP" => Loop, "LOOPE" => Loope, "LOOPNE" => Loopne, "JCXZ" => Jcxz,
            "JO" => Jo, "JNO" => Jno, "JB" => Jb, "JAE" => Jae, "JE" => Je,
            "JNE" => Jne, "JBE" => Jbe, "JA" => Ja, "JS" => Js, "JNS" => Jns,
            "JP" => Jp, "JNP" => Jnp, "JL" => Jl, "JGE" => Jge, "JLE" => Jle,
            "JG" => Jg,
            "SETO" => Seto, "SETNO" => Setno, "SETB" => Setb, "SETAE" => Setae,
            "SETE" => Sete, "SETNE" => Setne, "SETBE" => Setbe, "SETA" => Seta,
            "SETS" => Sets, "SETNS" => Setns, "SETP" => Setp, "SETNP" => Setnp,
            "SETL" => Setl, "SETGE" => Setge, "SETLE" => Setle, "SETG" => Setg,
            "CMOVO" => Cmovo, "CMOVNO" => Cmovno, "CMOVB" => Cmovb,
            "CMOVAE" => Cmovae, "CMOVE" => Cmove, "CMOVNE" => Cmovne,
            "CMOVBE" => Cmovbe, "CMOVA" => Cmova, "CMOVS" => Cmovs,
            "CMOVNS" => Cmovns, "CMOVP" => Cmovp, "CMOVNP" => Cmovnp,
            "CMOVL" => Cmovl, "CMOVGE" => Cmovge, "CMOVLE" => Cmovle,
            "CMOVG" => Cmovg,
            "CLC" => Clc, "STC" => Stc, "CMC" => Cmc, "CLD" => Cld,
            "STD" => Std, "CLI" => Cli, "STI" => Sti, "LAHF" => Lahf,
            "SAHF" => Sahf, "NOP" => Nop,
            "HLT" => Hlt, "WAIT" => Wait, "CPUID" => Cpuid, "LGDT" => Lgdt,
            "SGDT" => Sgdt, "LIDT" => Lidt, "SIDT" => Sidt, "LLDT" => Lldt,
            "SLDT" => Sldt, "LTR" => Ltr, "STR" => Str, "LMSW" => Lmsw,
            "SMSW" => Smsw, "CLTS" => Clts, "INVD" => Invd, "INVLPG" => Invlpg,
            "WBINVD" => Wbinvd, "ARPL" => Arpl, "BOUND" => Bound,
            "ENTER" => Enter, "LEAVE" => Leave, "XLAT" => Xlat, "XADD" => Xadd,
            "CMPXCHG" => Cmpxchg, "VERR" => Verr, "VERW" => Verw, "LAR" => Lar,
            "LSL" => Lsl, "LDS" => Lds, "LES" => Les, "LFS" => Lfs, "LGS" => Lgs,
            "LSS" => Lss, "SALC" => Salc,
            "FLD" => Fld, "FST" => Fst, "FSTP" => Fstp, "FXCH" => Fxch,
            "FILD" => Fild, "FIST" => Fist, "FISTP" => Fistp, "FBLD" => Fbld,
            "FBSTP" => Fbstp,
            "FADD" => Fadd, "FADDP" => Faddp, "FIADD" => Fiadd, "FSUB" => Fsub,
            "FSUBP" => Fsubp, "FISUB" => Fisub, "FSUBR" => Fsubr,
            "FSUBRP" => Fsubrp, "FISUBR" => Fisubr,
            "FMUL" => Fmul, "FMULP" => Fmulp, "FIMUL" => Fimul, "FDIV" => Fdiv,
            "FDIVP" => Fdivp, "FIDIV" => Fidiv, "FDIVR" => Fdivr,
            "FDIVRP" => Fdivrp, "FIDIVR" => Fidivr,
            "FCOM" => Fcom, "FCOMP" => Fcomp, "FCOMPP" => Fcompp,
            "FUCOM" => Fucom, "FUCOMP" => Fucomp, "FUCOMPP" => Fucompp,
            "FICOM" => Ficom, "FICOMP" => Ficomp,
            "FTST" => Ftst, "FXAM" => Fxam, "FLD1" => Fld1, "FLDL2T" => Fldl2t,
            "FLDL2E" => Fldl2e, "FLDPI" => Fldpi, "FLDLG2" => Fldlg2,
            "FLDLN2" => Fldln2, "FLDZ" => Fldz,
            "F2XM1" => F2xm1, "FYL2X" => Fyl2x, "FPTAN" => Fptan,
            "FPATAN" => Fpatan, "FXTRACT" => Fxtract, "FPREM1" => Fprem1,
            "FDECSTP" => Fdecstp, "FINCSTP" => Fincstp, "FPREM" => Fprem,
            "FYL2XP1" => Fyl2xp1, "FSQRT" => Fsqrt, "FSINCOS" => Fsincos,
            "FRNDINT" => Frndint, "FSCALE" => Fscale, "FSIN" => Fsin,
            "FCOS" => Fcos, "FCHS" => Fchs, "FABS" => Fabs, "FNINIT" => Fninit,
            "FLDCW" => Fldcw, "FNSTCW" => Fnstcw,
            "FNSTENV" => Fnstenv,
            "FLDENV" => Fldenv, "FNSAVE" => Fnsave,
            "FRSTOR" => Frstor, "FNCLEX" => Fnclex,
            "FNSTSW" => Fnstsw,
            "FCMOVB" => Fcmovb, "FCMOVE" => Fcmove, "FCMOVBE" => Fcmovbe,
            "FCMOVU" => Fcmovu, "FCMOVNB" => Fcmovnb, "FCMOVNE" => Fcmovne,
            "FCMOVNBE" => Fcmovnbe, "FCMOVNU" => Fcmovnu,
            "FUCOMI" => Fucomi, "FCOMI" => Fcomi, "FUCOMIP" => Fucomip,
            "FCOMIP" => Fcomip, "FFREE" => Ffree, "FNOP" => Fnop,
            "MOVD" => Movd, "MOVQ" => Movq,
            "MOVUPS" => MovupsSse, "MOVAPS" => MovapsSse, "MOVSS" => MovssSse,
            "MOVUPD" => MovupdSse, "MOVAPD" => MovapdSse,
            "PADDB" => Paddb, "PADDW" => Paddw, "PADDD" => Paddd,
            "PSUBB" => Psubb, "PSUBW" => Psubw, "PSUBD" => Psubd,
            "PAND" => Pand, "PANDN" => Pandn, "POR" => Por, "PXOR" => Pxor,
            "PCMPEQB" => Pcmpeqb, "PCMPEQW" => Pcmpeqw, "PCMPEQD" => Pcmpeqd,
            "PUNPCKLBW" => Punpcklbw, "PUNPCKLWD" => Punpcklwd,
            "PUNPCKLDQ" => Punpckldq, "PACKSSWB" => Packsswb,
            "FXSAVE" => Fxsave, "FXRSTOR" => Fxrstor,
            _ => return None,
        })
    }

    /// True if this mnemonic's sole operand (when it takes one) is a
    /// PC-relative branch target materialized as `JccTarget` — the near
    /// jump/call/loop family. Used by the text collaborator to know that a
    /// bare number without `[...]` or a register name names a branch
    /// target rather than an immediate.
    pub fn takes_jcc_target(self) -> bool {
        matches!(
            self,
            Mnemonic::Jmp
                | Mnemonic::Call
                | Mnemonic::Loop
                | Mnemonic::Loope
                | Mnemonic::Loopne
                | Mnemonic::Jcxz
                | Mnemonic::Jo
                | Mnemonic::Jno
                | Mnemonic::Jb
                | Mnemonic::Jae
                | Mnemonic::Je
                | Mnemonic::Jne
                | Mnemonic::Jbe
                | Mnemonic::Ja
                | Mnemonic::Js
                | Mnemonic::Jns
                | Mnemonic::Jp
                | Mnemonic::Jnp
                | Mnemonic::Jl
                | Mnemonic::Jge
                | Mnemonic::Jle
                | Mnemonic::Jg
        )
    }
}

#[cfg(test)]
mod from_text_tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        assert_eq!(Mnemonic::from_text("mov"), Some(Mnemonic::Mov));
        assert_eq!(Mnemonic::from_text("XOR"), Some(Mnemonic::Xor));
        assert_eq!(Mnemonic::from_text("movsd"), Some(Mnemonic::Movsd));
        assert_eq!(Mnemonic::from_text("bogus"), None);
    }
}

// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::memory::{FarPtr16, FarPtr32, JccTarget, Mem16, Mem32};
use crate::register::{Control, Debug, Fpu, Gpr16, Gpr32, Gpr8, Mmx, Segment, Xmm};
use crate::Immediate;

/// The sum type of every concrete operand the codec can produce or consume.
/// Equality is fully structural, matching `Instruction`'s equality contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Gpr8(Gpr8),
    Gpr16(Gpr16),
    Gpr32(Gpr32),
    Segment(Segment),
    Control(Control),
    Debug(Debug),
    Fpu(Fpu),
    Mmx(Mmx),
    Xmm(Xmm),
    Immediate(Immediate),
    FarPtr16(FarPtr16),
    FarPtr32(FarPtr32),
    Mem16(Mem16),
    Mem32(Mem32),
    JccTarget(JccTarget),
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Gpr8(r) => write!(f, "{r}"),
            Operand::Gpr16(r) => write!(f, "{r}"),
            Operand::Gpr32(r) => write!(f, "{r}"),
            Operand::Segment(r) => write!(f, "{r}"),
            Operand::Control(r) => write!(f, "{r}"),
            Operand::Debug(r) => write!(f, "{r}"),
            Operand::Fpu(r) => write!(f, "{r}"),
            Operand::Mmx(r) => write!(f, "{r}"),
            Operand::Xmm(r) => write!(f, "{r}"),
            Operand::Immediate(i) => write!(f, "{i}"),
            Operand::FarPtr16(p) => write!(f, "{p}"),
            Operand::FarPtr32(p) => write!(f, "{p}"),
            Operand::Mem16(m) => write!(f, "{m}"),
            Operand::Mem32(m) => write!(f, "{m}"),
            Operand::JccTarget(t) => write!(f, "{}", crate::hexify::hexify(t.taken)),
        }
    }
}

/// The group-1 legacy prefix: `LOCK`, `REP`, or `REPNE`. At most one is
/// carried by a decoded or encoded instruction (the decoder keeps a stack
/// internally while scanning prefixes, but only the most recent survives
/// into the canonical `Instruction`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOnePrefix {
    Lock,
    Rep,
    Repne,
}

impl std::fmt::Display for GroupOnePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GroupOnePrefix::Lock => "LOCK",
            GroupOnePrefix::Rep => "REP",
            GroupOnePrefix::Repne => "REPNE",
        };
        f.write_str(s)
    }
}

// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The encoder's type checker (§4.5). `check` never escapes this module as
//! a public error — a rejected candidate is just `None`, and the encoder
//! tries the next one. This is the `TypeCheckMismatch` kind from §7, kept
//! fully internal.

use crate::aot::{Aot, ImmKind, MemSizeReq, RegClass};
use x86_codec_types::{Immediate, Operand, Segment};

/// The side information a matching AOT contributes: whether it imposes an
/// operand-size prefix, an address-size prefix, or a segment override.
/// Reduced across every operand in a candidate; a conflict between two
/// operands' contributions fails the whole candidate (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeCheckInfo {
    pub size_override: Option<bool>,
    pub addr_override: Option<bool>,
    pub seg_override: Option<Segment>,
}

fn merge_bool(existing: Option<bool>, new: bool) -> Option<Option<bool>> {
    match existing {
        None => Some(Some(new)),
        Some(v) if v == new => Some(Some(v)),
        Some(_) => None,
    }
}

fn merge_seg(existing: Option<Segment>, new: Segment) -> Option<Option<Segment>> {
    match existing {
        None => Some(Some(new)),
        Some(v) if v == new => Some(Some(v)),
        Some(_) => None,
    }
}

impl TypeCheckInfo {
    fn with_size(mut self, value: bool) -> Option<TypeCheckInfo> {
        self.size_override = merge_bool(self.size_override, value)?;
        Some(self)
    }

    fn with_addr(mut self, value: bool) -> Option<TypeCheckInfo> {
        self.addr_override = merge_bool(self.addr_override, value)?;
        Some(self)
    }

    fn with_seg(mut self, value: Segment) -> Option<TypeCheckInfo> {
        self.seg_override = merge_seg(self.seg_override, value)?;
        Some(self)
    }

    /// Combine this operand's info with another operand's info from the
    /// same candidate; `None` signals a conflict, which fails the candidate.
    pub fn reduce(self, other: TypeCheckInfo) -> Option<TypeCheckInfo> {
        let mut out = self;
        if let Some(v) = other.size_override {
            out = out.with_size(v)?;
        }
        if let Some(v) = other.addr_override {
            out = out.with_addr(v)?;
        }
        if let Some(v) = other.seg_override {
            out = out.with_seg(v)?;
        }
        Some(out)
    }
}

/// Reduces a candidate's per-operand infos into one, failing on any
/// conflicting field (§4.5 "Type checker contract").
pub fn reduce_infos(infos: &[TypeCheckInfo]) -> Option<TypeCheckInfo> {
    let mut acc = TypeCheckInfo::default();
    for info in infos {
        acc = acc.reduce(*info)?;
    }
    Some(acc)
}

fn reg_class_matches(class: RegClass, op: &Operand) -> bool {
    matches!(
        (class, op),
        (RegClass::Gpr8, Operand::Gpr8(_))
            | (RegClass::Gpr16, Operand::Gpr16(_))
            | (RegClass::Gpr32, Operand::Gpr32(_))
            | (RegClass::Segment, Operand::Segment(_))
            | (RegClass::Control, Operand::Control(_))
            | (RegClass::Debug, Operand::Debug(_))
            | (RegClass::Fpu, Operand::Fpu(_))
            | (RegClass::Mmx, Operand::Mmx(_))
            | (RegClass::Xmm, Operand::Xmm(_))
    )
}

fn immediate_matches_kind(imm: Immediate, kind: ImmKind) -> bool {
    matches!(
        (imm, kind),
        (Immediate::Imm8(_), ImmKind::Ib) | (Immediate::Imm16(_), ImmKind::Iw) | (Immediate::Imm32(_), ImmKind::Id)
    )
}

fn mem_size_matches(req: MemSizeReq, actual: x86_codec_types::MemSize) -> bool {
    matches!(req, MemSizeReq::Lenient(_)) || matches!(req, MemSizeReq::Exact(s) if s == actual)
}

/// Shared by `RegOrMem`'s memory branch and the memory-only `Mem` AOT:
/// checks the size tag, then reports the address-size and segment-override
/// side effects a memory operand contributes (§4.5 "Per-AOTDL-node checks").
fn check_mem(mem_size: MemSizeReq, op: &Operand) -> Option<TypeCheckInfo> {
    match op {
        Operand::Mem16(m) => {
            if !mem_size_matches(mem_size, m.size) {
                return None;
            }
            let info = TypeCheckInfo::default().with_addr(true)?;
            if m.seg == m.default_segment() {
                Some(info)
            } else {
                info.with_seg(m.seg)
            }
        }
        Operand::Mem32(m) => {
            if !mem_size_matches(mem_size, m.size) {
                return None;
            }
            let info = TypeCheckInfo::default().with_addr(false)?;
            if m.seg == m.default_segment() {
                Some(info)
            } else {
                info.with_seg(m.seg)
            }
        }
        _ => None,
    }
}

fn fits_signed_8(imm: Immediate) -> bool {
    let v = imm.as_u32();
    let width = imm.width_bytes();
    let signed = match width {
        1 => (v as u8) as i8 as i32,
        2 => (v as u16) as i16 as i32,
        4 => v as i32,
        _ => unreachable!(),
    };
    (-128..=127).contains(&signed)
}

/// Checks one AOT node against one concrete operand. Returns the side
/// information the match contributes, or `None` on a mismatch.
pub fn check(aot: &Aot, op: &Operand) -> Option<TypeCheckInfo> {
    match aot {
        Aot::Exact(v) => (op == v).then(TypeCheckInfo::default),

        Aot::ExactSeg(v) => match (v, op) {
            (Operand::Mem16(expected), Operand::Mem16(actual)) => {
                let same_shape = expected.size == actual.size
                    && expected.base == actual.base
                    && expected.index == actual.index
                    && expected.disp == actual.disp;
                if !same_shape {
                    return None;
                }
                if expected.seg == actual.seg {
                    Some(TypeCheckInfo::default())
                } else {
                    TypeCheckInfo::default().with_seg(actual.seg)
                }
            }
            (Operand::Mem32(expected), Operand::Mem32(actual)) => {
                let same_shape = expected.size == actual.size
                    && expected.base == actual.base
                    && expected.index == actual.index
                    && expected.scale == actual.scale
                    && expected.disp == actual.disp;
                if !same_shape {
                    return None;
                }
                if expected.seg == actual.seg {
                    Some(TypeCheckInfo::default())
                } else {
                    TypeCheckInfo::default().with_seg(actual.seg)
                }
            }
            _ => (op == v).then(TypeCheckInfo::default),
        },

        Aot::GPart(class) => reg_class_matches(*class, op).then(TypeCheckInfo::default),

        Aot::RegOrMem { reg, mem_size } => match op {
            Operand::Mem16(_) | Operand::Mem32(_) => check_mem(*mem_size, op),
            _ => reg_class_matches(*reg, op).then(TypeCheckInfo::default),
        },

        Aot::Mem(mem_size) => match op {
            Operand::Mem16(_) | Operand::Mem32(_) => check_mem(*mem_size, op),
            _ => None,
        },

        Aot::Imm(kind) => match op {
            Operand::Immediate(imm) if immediate_matches_kind(*imm, *kind) => {
                Some(TypeCheckInfo::default())
            }
            _ => None,
        },

        Aot::SignedImm(kind) => match op {
            Operand::Immediate(imm) if immediate_matches_kind(*imm, *kind) && fits_signed_8(*imm) => {
                Some(TypeCheckInfo::default())
            }
            _ => None,
        },

        Aot::Moffs(size) => match op {
            Operand::Mem32(m) if m.base.is_none() && m.index.is_none() && m.size == *size => {
                let info = TypeCheckInfo::default().with_addr(false)?;
                if m.seg == m.default_segment() {
                    Some(info)
                } else {
                    info.with_seg(m.seg)
                }
            }
            Operand::Mem16(m) if m.base.is_none() && m.index.is_none() && m.size == *size => {
                let info = TypeCheckInfo::default().with_addr(true)?;
                if m.seg == m.default_segment() {
                    Some(info)
                } else {
                    info.with_seg(m.seg)
                }
            }
            _ => None,
        },

        Aot::FarPtr16 => matches!(op, Operand::FarPtr16(_)).then(TypeCheckInfo::default),
        Aot::FarPtr32 => matches!(op, Operand::FarPtr32(_)).then(TypeCheckInfo::default),
        Aot::JccTarget(_) => matches!(op, Operand::JccTarget(_)).then(TypeCheckInfo::default),

        // `no` is tried first. Every `yes`/`no` pair but `JccTarget`'s is
        // mutually exclusive on the operand's own shape (Gpr16 vs Gpr32,
        // Imm16 vs Imm32, Mem16 vs Mem32, ...), so trying either side first
        // picks the same, only-possible match. `JccTarget` is the exception:
        // a materialized jump target carries no width of its own, so both
        // sides match any `Operand::JccTarget` unconditionally. Trying `no`
        // first resolves that ambiguity in favor of the unprefixed long
        // form, never the narrower `66`-prefixed one, matching §4.5.1.
        Aot::SizePrefix(yes, no) => {
            if let Some(info) = check(no, op) {
                info.with_size(false)
            } else {
                check(yes, op)?.with_size(true)
            }
        }

        Aot::AddrPrefix(yes, no) => {
            if let Some(info) = check(no, op) {
                info.with_addr(false)
            } else {
                check(yes, op)?.with_addr(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x86_codec_types::{Gpr32, MemSize, Mem32};

    #[test]
    fn exact_requires_equality() {
        let aot = Aot::Exact(Operand::Gpr32(Gpr32::Eax));
        assert!(check(&aot, &Operand::Gpr32(Gpr32::Eax)).is_some());
        assert!(check(&aot, &Operand::Gpr32(Gpr32::Ecx)).is_none());
    }

    #[test]
    fn regormem_reports_segment_override() {
        let aot = Aot::RegOrMem {
            reg: RegClass::Gpr32,
            mem_size: MemSizeReq::Exact(MemSize::Dword),
        };
        let mem = Operand::Mem32(Mem32 {
            seg: Segment::Fs,
            size: MemSize::Dword,
            base: Some(Gpr32::Eax),
            index: None,
            scale: 0,
            disp: None,
        });
        let info = check(&aot, &mem).unwrap();
        assert_eq!(info.seg_override, Some(Segment::Fs));
        assert_eq!(info.addr_override, Some(false));
    }

    #[test]
    fn size_lenient_ignores_mismatched_size() {
        let aot = Aot::RegOrMem {
            reg: RegClass::Fpu,
            mem_size: MemSizeReq::Lenient(MemSize::Tword),
        };
        let mem = Operand::Mem32(Mem32 {
            seg: Segment::Ds,
            size: MemSize::Tword,
            base: Some(Gpr32::Eax),
            index: None,
            scale: 0,
            disp: None,
        });
        assert!(check(&aot, &mem).is_some());
    }

    #[test]
    fn reduce_detects_conflicting_segment_overrides() {
        let a = TypeCheckInfo {
            seg_override: Some(Segment::Fs),
            ..Default::default()
        };
        let b = TypeCheckInfo {
            seg_override: Some(Segment::Gs),
            ..Default::default()
        };
        assert!(reduce_infos(&[a, b]).is_none());
    }
}

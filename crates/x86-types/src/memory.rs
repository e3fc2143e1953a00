// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::hexify::hexify;
use crate::register::{default_segment_for_gpr16, default_segment_for_gpr32, Gpr16, Gpr32, Segment};

/// The size tag carried by a memory operand. Most AOTs require this to match
/// the operand's declared width; a handful of size-lenient AOTs (FPU
/// environment/state, SIMD state) skip the comparison — the type checker in
/// `x86_codec` decides leniency per AOT, not per `MemSize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemSize {
    Byte,
    Word,
    Dword,
    Fword,
    Qword,
    Tword,
    Dqword,
}

impl MemSize {
    pub fn ptr_name(self) -> &'static str {
        match self {
            MemSize::Byte => "byte",
            MemSize::Word => "word",
            MemSize::Dword => "dword",
            MemSize::Fword => "fword",
            MemSize::Qword => "qword",
            MemSize::Tword => "tword",
            MemSize::Dqword => "dqword",
        }
    }
}

/// A 16-bit addressing-mode memory expression.
///
/// Invariant: `(base, index)` is one of the eight hardware-defined pairs
/// (`[BX+SI]`, `[BX+DI]`, `[BP+SI]`, `[BP+DI]`, `[SI]`, `[DI]`, `[BP]`,
/// `[BX]`) or both are `None` (pure displacement, the `MOD=00,R/M=110`
/// escape). A bare `[BP]` with no displacement is not constructible this way
/// — the ModR/M codec always attaches a (possibly zero) displacement to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mem16 {
    pub seg: Segment,
    pub size: MemSize,
    pub base: Option<Gpr16>,
    pub index: Option<Gpr16>,
    pub disp: Option<u16>,
}

impl Mem16 {
    pub fn is_valid_base_index_pair(base: Option<Gpr16>, index: Option<Gpr16>) -> bool {
        use Gpr16::*;
        matches!(
            (base, index),
            (Some(Bx), Some(Si))
                | (Some(Bx), Some(Di))
                | (Some(Bp), Some(Si))
                | (Some(Bp), Some(Di))
                | (None, Some(Si))
                | (None, Some(Di))
                | (Some(Bp), None)
                | (Some(Bx), None)
                | (None, None)
        )
    }

    pub fn default_segment(&self) -> Segment {
        default_segment_for_gpr16(self.base)
    }

    fn address_parts(&self) -> String {
        let mut parts = Vec::new();
        if let Some(b) = self.base {
            parts.push(b.to_string());
        }
        if let Some(i) = self.index {
            parts.push(i.to_string());
        }
        if let Some(d) = self.disp {
            if d != 0 || (self.base.is_none() && self.index.is_none()) {
                parts.push(hexify(d as u32));
            }
        }
        parts.join("+")
    }
}

impl std::fmt::Display for Mem16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let segstr = if self.seg == self.default_segment() {
            String::new()
        } else {
            format!("{}:", self.seg)
        };
        write!(f, "{} ptr {}[{}]", self.size.ptr_name(), segstr, self.address_parts())
    }
}

/// A 32-bit addressing-mode memory expression. `ESP` is not a valid index
/// register (it signals "no index" in the SIB byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mem32 {
    pub seg: Segment,
    pub size: MemSize,
    pub base: Option<Gpr32>,
    pub index: Option<Gpr32>,
    pub scale: u8,
    pub disp: Option<u32>,
}

impl Mem32 {
    pub fn is_valid_index(index: Option<Gpr32>) -> bool {
        !matches!(index, Some(Gpr32::Esp))
    }

    pub fn default_segment(&self) -> Segment {
        default_segment_for_gpr32(self.base)
    }

    fn address_parts(&self) -> String {
        let mut parts = Vec::new();
        if let Some(b) = self.base {
            parts.push(b.to_string());
        }
        if let Some(i) = self.index {
            let factor = 1u32 << self.scale;
            parts.push(if factor == 1 {
                i.to_string()
            } else {
                format!("{}*{}", i, factor)
            });
        }
        if let Some(d) = self.disp {
            if d != 0 || (self.base.is_none() && self.index.is_none()) {
                parts.push(hexify(d));
            }
        }
        parts.join("+")
    }
}

impl std::fmt::Display for Mem32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let segstr = if self.seg == self.default_segment() {
            String::new()
        } else {
            format!("{}:", self.seg)
        };
        write!(f, "{} ptr {}[{}]", self.size.ptr_name(), segstr, self.address_parts())
    }
}

/// A 16-bit segment:offset far pointer (`AP16`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FarPtr16 {
    pub seg: u16,
    pub off: u16,
}

/// A 32-bit segment:offset far pointer (`AP32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FarPtr32 {
    pub seg: u16,
    pub off: u32,
}

impl std::fmt::Display for FarPtr16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", hexify(self.seg as u32), hexify(self.off as u32))
    }
}

impl std::fmt::Display for FarPtr32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", hexify(self.seg as u32), hexify(self.off))
    }
}

/// A resolved branch target. Decoding a PC-relative displacement yields the
/// absolute `taken` address (wrapping mod 2^32); `not_taken` is the address
/// immediately following the instruction, kept alongside for convenience
/// when re-deriving the displacement during encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JccTarget {
    pub taken: u32,
    pub not_taken: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem16_valid_pairs() {
        assert!(Mem16::is_valid_base_index_pair(Some(Gpr16::Bx), Some(Gpr16::Si)));
        assert!(Mem16::is_valid_base_index_pair(None, None));
        assert!(!Mem16::is_valid_base_index_pair(Some(Gpr16::Ax), None));
    }

    #[test]
    fn mem32_esp_not_an_index() {
        assert!(!Mem32::is_valid_index(Some(Gpr32::Esp)));
        assert!(Mem32::is_valid_index(Some(Gpr32::Eax)));
        assert!(Mem32::is_valid_index(None));
    }

    #[test]
    fn display_omits_default_segment() {
        let m = Mem32 {
            seg: Segment::Ds,
            size: MemSize::Dword,
            base: Some(Gpr32::Eax),
            index: None,
            scale: 0,
            disp: None,
        };
        assert_eq!(m.to_string(), "dword ptr [EAX]");
    }
}

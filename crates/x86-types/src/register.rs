// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The eight closed register classes, each an eight-value enumeration whose
//! ordinal (0..7) matches the hardware field encoding used by ModR/M `reg`
//! and `r/m`, and by the opcode `+r` shorthand.

/// A register class whose members occupy a ModR/M `reg` or `r/m` field (or
/// an opcode `+r` shorthand). Generalizing over this lets the ModR/M codec
/// decode "register or memory" operands for any register class — GPRs, but
/// also FPU/MMX/XMM/control/debug registers, which share the same 0..7
/// field encoding.
pub trait RegisterClass: Copy + PartialEq + Eq {
    fn ordinal(self) -> u8;
    fn from_ordinal(ord: u8) -> Option<Self>;
}

macro_rules! register_class {
    ($name:ident { $($variant:ident = $ord:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $ord),+
        }

        impl $name {
            pub const ALL: [$name; 8] = [$($name::$variant),+];

            /// The 0..7 field encoding used by ModR/M and `+r` opcodes.
            pub fn ordinal(self) -> u8 {
                self as u8
            }

            pub fn from_ordinal(ord: u8) -> Option<$name> {
                match ord & 0b111 {
                    $($ord => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl RegisterClass for $name {
            fn ordinal(self) -> u8 {
                $name::ordinal(self)
            }
            fn from_ordinal(ord: u8) -> Option<$name> {
                $name::from_ordinal(ord)
            }
        }
    };
}

register_class!(Gpr8 {
    Al = 0, Cl = 1, Dl = 2, Bl = 3, Ah = 4, Ch = 5, Dh = 6, Bh = 7,
});

register_class!(Gpr16 {
    Ax = 0, Cx = 1, Dx = 2, Bx = 3, Sp = 4, Bp = 5, Si = 6, Di = 7,
});

register_class!(Gpr32 {
    Eax = 0, Ecx = 1, Edx = 2, Ebx = 3, Esp = 4, Ebp = 5, Esi = 6, Edi = 7,
});

register_class!(Control {
    Cr0 = 0, Cr1 = 1, Cr2 = 2, Cr3 = 3, Cr4 = 4, Cr5 = 5, Cr6 = 6, Cr7 = 7,
});

register_class!(Debug {
    Dr0 = 0, Dr1 = 1, Dr2 = 2, Dr3 = 3, Dr4 = 4, Dr5 = 5, Dr6 = 6, Dr7 = 7,
});

register_class!(Fpu {
    St0 = 0, St1 = 1, St2 = 2, St3 = 3, St4 = 4, St5 = 5, St6 = 6, St7 = 7,
});

register_class!(Mmx {
    Mm0 = 0, Mm1 = 1, Mm2 = 2, Mm3 = 3, Mm4 = 4, Mm5 = 5, Mm6 = 6, Mm7 = 7,
});

register_class!(Xmm {
    Xmm0 = 0, Xmm1 = 1, Xmm2 = 2, Xmm3 = 3, Xmm4 = 4, Xmm5 = 5, Xmm6 = 6, Xmm7 = 7,
});

/// Segment registers; only six ordinals are valid (0..5), unlike the other
/// classes which use the full 0..7 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Es = 0,
    Cs = 1,
    Ss = 2,
    Ds = 3,
    Fs = 4,
    Gs = 5,
}

impl Segment {
    pub const ALL: [Segment; 6] = [
        Segment::Es,
        Segment::Cs,
        Segment::Ss,
        Segment::Ds,
        Segment::Fs,
        Segment::Gs,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ord: u8) -> Option<Segment> {
        match ord {
            0 => Some(Segment::Es),
            1 => Some(Segment::Cs),
            2 => Some(Segment::Ss),
            3 => Some(Segment::Ds),
            4 => Some(Segment::Fs),
            5 => Some(Segment::Gs),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gpr8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Gpr8::Al => "AL", Gpr8::Cl => "CL", Gpr8::Dl => "DL", Gpr8::Bl => "BL",
            Gpr8::Ah => "AH", Gpr8::Ch => "CH", Gpr8::Dh => "DH", Gpr8::Bh => "BH",
        };
        f.write_str(name)
    }
}

impl std::fmt::Display for Gpr16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Gpr16::Ax => "AX", Gpr16::Cx => "CX", Gpr16::Dx => "DX", Gpr16::Bx => "BX",
            Gpr16::Sp => "SP", Gpr16::Bp => "BP", Gpr16::Si => "SI", Gpr16::Di => "DI",
        };
        f.write_str(name)
    }
}

impl std::fmt::Display for Gpr32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Gpr32::Eax => "EAX", Gpr32::Ecx => "ECX", Gpr32::Edx => "EDX", Gpr32::Ebx => "EBX",
            Gpr32::Esp => "ESP", Gpr32::Ebp => "EBP", Gpr32::Esi => "ESI", Gpr32::Edi => "EDI",
        };
        f.write_str(name)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Segment::Es => "ES", Segment::Cs => "CS", Segment::Ss => "SS",
            Segment::Ds => "DS", Segment::Fs => "FS", Segment::Gs => "GS",
        };
        f.write_str(name)
    }
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CR{}", self.ordinal())
    }
}

impl std::fmt::Display for Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DR{}", self.ordinal())
    }
}

impl std::fmt::Display for Fpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ST{}", self.ordinal())
    }
}

impl std::fmt::Display for Mmx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MM{}", self.ordinal())
    }
}

impl std::fmt::Display for Xmm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XMM{}", self.ordinal())
    }
}

/// `SS` when the base register is stack-related, `DS` otherwise. Used to
/// decide whether a memory operand needs an explicit segment override.
pub fn default_segment_for_gpr16(base: Option<Gpr16>) -> Segment {
    match base {
        Some(Gpr16::Sp) | Some(Gpr16::Bp) => Segment::Ss,
        _ => Segment::Ds,
    }
}

pub fn default_segment_for_gpr32(base: Option<Gpr32>) -> Segment {
    match base {
        Some(Gpr32::Esp) | Some(Gpr32::Ebp) => Segment::Ss,
        _ => Segment::Ds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_round_trip() {
        for r in Gpr32::ALL {
            assert_eq!(Gpr32::from_ordinal(r.ordinal()), Some(r));
        }
        for s in Segment::ALL {
            assert_eq!(Segment::from_ordinal(s.ordinal()), Some(s));
        }
    }

    #[test]
    fn default_segment_rules() {
        assert_eq!(default_segment_for_gpr32(Some(Gpr32::Esp)), Segment::Ss);
        assert_eq!(default_segment_for_gpr32(Some(Gpr32::Ebp)), Segment::Ss);
        assert_eq!(default_segment_for_gpr32(Some(Gpr32::Eax)), Segment::Ds);
        assert_eq!(default_segment_for_gpr32(None), Segment::Ds);
        assert_eq!(default_segment_for_gpr16(Some(Gpr16::Bp)), Segment::Ss);
        assert_eq!(default_segment_for_gpr16(Some(Gpr16::Si)), Segment::Ds);
    }
}

// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::mnemonic::Mnemonic;
use crate::operand::{GroupOnePrefix, Operand};

/// Maximum operand count of any encoding in the table (e.g. `SHLD r/m, r, Ib`
/// has three).
pub const MAX_OPERANDS: usize = 3;

/// A canonical instruction value. Instructions are immutable once built:
/// the parser and the decoder construct them, the encoder consumes them,
/// nothing mutates them in place. Equality is structural on every field,
/// which is what the encode∘decode fixpoint test (§8) checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub group1_prefix: Option<GroupOnePrefix>,
    pub mnemonic: Mnemonic,
    operands: [Option<Operand>; MAX_OPERANDS],
}

impl Instruction {
    pub fn new(
        group1_prefix: Option<GroupOnePrefix>,
        mnemonic: Mnemonic,
        operands: &[Operand],
    ) -> Instruction {
        assert!(
            operands.len() <= MAX_OPERANDS,
            "instruction has more than {MAX_OPERANDS} operands"
        );
        let mut slots = [None; MAX_OPERANDS];
        for (slot, op) in slots.iter_mut().zip(operands) {
            *slot = Some(*op);
        }
        Instruction {
            group1_prefix,
            mnemonic,
            operands: slots,
        }
    }

    pub fn operands(&self) -> impl Iterator<Item = &Operand> {
        self.operands.iter().filter_map(|o| o.as_ref())
    }

    pub fn operand_count(&self) -> usize {
        self.operands().count()
    }

    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index).and_then(|o| o.as_ref())
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(pfx) = self.group1_prefix {
            write!(f, "{pfx} ")?;
        }
        write!(f, "{}", self.mnemonic)?;
        let ops: Vec<String> = self.operands().map(|o| o.to_string()).collect();
        if !ops.is_empty() {
            write!(f, " {}", ops.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::Gpr32;

    #[test]
    fn structural_equality() {
        let a = Instruction::new(
            None,
            Mnemonic::Xor,
            &[Operand::Gpr32(Gpr32::Eax), Operand::Gpr32(Gpr32::Eax)],
        );
        let b = Instruction::new(
            None,
            Mnemonic::Xor,
            &[Operand::Gpr32(Gpr32::Eax), Operand::Gpr32(Gpr32::Eax)],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn display_matches_canonical_text() {
        let i = Instruction::new(
            None,
            Mnemonic::Xor,
            &[Operand::Gpr32(Gpr32::Eax), Operand::Gpr32(Gpr32::Eax)],
        );
        assert_eq!(i.to_string(), "XOR EAX, EAX");
    }
}

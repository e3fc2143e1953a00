// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Recursive-descent reader from canonical assembly text to `Instruction`.
//! This is the thin external collaborator: it knows nothing of encodings
//! or candidates, only the textual shape `Instruction`'s `Display` impl
//! produces (plus a couple of user-friendly numeric spellings). Ambiguities
//! the text alone cannot resolve — an immediate's width, a branch target
//! versus a bare immediate, a 16- versus 32-bit far pointer — are resolved
//! by small documented heuristics rather than by consulting the encoder.

use x86_codec_types::{
    Control, DebugReg, FarPtr16, FarPtr32, Fpu, Gpr16, Gpr32, Gpr8, GroupOnePrefix, Immediate,
    Instruction, JccTarget, Mem16, Mem32, MemSize, Mmx, Mnemonic, Operand, Segment, Xmm,
};

use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, Token};

/// Parses one instruction from its canonical (or a friendlier-numerals)
/// text form, e.g. `"MOV EAX, 12345678h"` or `"LOCK ADD dword ptr [EAX], ECX"`.
pub fn parse(text: &str) -> ParseResult<Instruction> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let instr = parser.parse_instruction()?;
    parser.expect_eof()?;
    Ok(instr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

enum GprAny {
    Bits16(Gpr16),
    Bits32(Gpr32),
}

fn lookup_gpr8(name: &str) -> Option<Gpr8> {
    use Gpr8::*;
    Some(match name.to_ascii_uppercase().as_str() {
        "AL" => Al, "CL" => Cl, "DL" => Dl, "BL" => Bl,
        "AH" => Ah, "CH" => Ch, "DH" => Dh, "BH" => Bh,
        _ => return None,
    })
}

fn lookup_gpr_any(name: &str) -> Option<GprAny> {
    use Gpr16::*;
    let upper = name.to_ascii_uppercase();
    match upper.as_str() {
        "AX" => return Some(GprAny::Bits16(Ax)),
        "CX" => return Some(GprAny::Bits16(Cx)),
        "DX" => return Some(GprAny::Bits16(Dx)),
        "BX" => return Some(GprAny::Bits16(Bx)),
        "SP" => return Some(GprAny::Bits16(Sp)),
        "BP" => return Some(GprAny::Bits16(Bp)),
        "SI" => return Some(GprAny::Bits16(Si)),
        "DI" => return Some(GprAny::Bits16(Di)),
        _ => {}
    }
    use Gpr32::*;
    Some(GprAny::Bits32(match upper.as_str() {
        "EAX" => Eax, "ECX" => Ecx, "EDX" => Edx, "EBX" => Ebx,
        "ESP" => Esp, "EBP" => Ebp, "ESI" => Esi, "EDI" => Edi,
        _ => return None,
    }))
}

fn lookup_segment(name: &str) -> Option<Segment> {
    use Segment::*;
    Some(match name.to_ascii_uppercase().as_str() {
        "ES" => Es, "CS" => Cs, "SS" => Ss, "DS" => Ds, "FS" => Fs, "GS" => Gs,
        _ => return None,
    })
}

fn lookup_indexed(name: &str, prefix: &str, max: u8) -> Option<u8> {
    let upper = name.to_ascii_uppercase();
    let rest = upper.strip_prefix(prefix)?;
    let ord: u8 = rest.parse().ok()?;
    (ord <= max).then_some(ord)
}

fn lookup_register_operand(name: &str) -> Option<Operand> {
    if let Some(r) = lookup_gpr8(name) {
        return Some(Operand::Gpr8(r));
    }
    if let Some(r) = lookup_gpr_any(name) {
        return Some(match r {
            GprAny::Bits16(r) => Operand::Gpr16(r),
            GprAny::Bits32(r) => Operand::Gpr32(r),
        });
    }
    if let Some(s) = lookup_segment(name) {
        return Some(Operand::Segment(s));
    }
    if let Some(ord) = lookup_indexed(name, "CR", 7) {
        return Some(Operand::Control(Control::from_ordinal(ord).unwrap()));
    }
    if let Some(ord) = lookup_indexed(name, "DR", 7) {
        return Some(Operand::Debug(DebugReg::from_ordinal(ord).unwrap()));
    }
    if name.eq_ignore_ascii_case("ST") {
        return Some(Operand::Fpu(Fpu::St0));
    }
    if let Some(ord) = lookup_indexed(name, "ST", 7) {
        return Some(Operand::Fpu(Fpu::from_ordinal(ord).unwrap()));
    }
    if let Some(ord) = lookup_indexed(name, "MM", 7) {
        return Some(Operand::Mmx(Mmx::from_ordinal(ord).unwrap()));
    }
    if let Some(ord) = lookup_indexed(name, "XMM", 7) {
        return Some(Operand::Xmm(Xmm::from_ordinal(ord).unwrap()));
    }
    None
}

fn mem_size_from_ident(name: &str) -> Option<MemSize> {
    use MemSize::*;
    Some(match name.to_ascii_lowercase().as_str() {
        "byte" => Byte, "word" => Word, "dword" => Dword, "fword" => Fword,
        "qword" => Qword, "tword" => Tword, "dqword" => Dqword,
        _ => return None,
    })
}

/// Picks the `Immediate` width for a bare numeral with no declared size of
/// its own, the way a person reading the other operand would: match the
/// width of the last register or memory operand already parsed in this
/// instruction, or fall back to the narrowest width the value fits in.
fn immediate_for(value: u32, prior_operands: &[Operand]) -> Immediate {
    let width_hint = prior_operands.iter().rev().find_map(|op| match op {
        Operand::Gpr8(_) => Some(1u32),
        Operand::Gpr16(_) => Some(2),
        Operand::Gpr32(_) => Some(4),
        Operand::Mem16(m) => Some(mem_size_width(m.size)),
        Operand::Mem32(m) => Some(mem_size_width(m.size)),
        _ => None,
    });
    let width = width_hint.unwrap_or_else(|| {
        if value <= 0xFF {
            1
        } else if value <= 0xFFFF {
            2
        } else {
            4
        }
    });
    match width {
        1 => Immediate::Imm8(value as u8),
        2 => Immediate::Imm16(value as u16),
        _ => Immediate::Imm32(value),
    }
}

fn mem_size_width(size: MemSize) -> u32 {
    match size {
        MemSize::Byte => 1,
        MemSize::Word => 2,
        _ => 4,
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&self) -> ParseResult<()> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(ParseError::syntax(format!(
                "unexpected trailing token {:?}",
                self.tokens[self.pos]
            )))
        }
    }

    fn expect_ident(&mut self, what: &str) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Ident(s)) => Ok(s),
            Some(other) => Err(ParseError::syntax(format!("expected {what}, found {other:?}"))),
            None => Err(ParseError::eof(what.to_string())),
        }
    }

    fn expect_number(&mut self, what: &str) -> ParseResult<u32> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(other) => Err(ParseError::syntax(format!("expected {what}, found {other:?}"))),
            None => Err(ParseError::eof(what.to_string())),
        }
    }

    fn expect_token(&mut self, expected: Token) -> ParseResult<()> {
        match self.advance() {
            Some(ref t) if *t == expected => Ok(()),
            Some(other) => Err(ParseError::syntax(format!("expected {expected:?}, found {other:?}"))),
            None => Err(ParseError::eof(format!("{expected:?}"))),
        }
    }

    fn consume_token_if(&mut self, tok: &Token) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_instruction(&mut self) -> ParseResult<Instruction> {
        let mut group1_prefix = None;
        if let Some(Token::Ident(s)) = self.peek() {
            group1_prefix = match s.to_ascii_uppercase().as_str() {
                "LOCK" => Some(GroupOnePrefix::Lock),
                "REP" | "REPE" | "REPZ" => Some(GroupOnePrefix::Rep),
                "REPNE" | "REPNZ" => Some(GroupOnePrefix::Repne),
                _ => None,
            };
            if group1_prefix.is_some() {
                self.advance();
            }
        }

        let mnemonic_text = self.expect_ident("a mnemonic")?;
        let mnemonic = Mnemonic::from_text(&mnemonic_text)
            .ok_or_else(|| ParseError::UnknownMnemonic(mnemonic_text.clone()))?;

        let mut operands = Vec::new();
        if self.peek().is_some() {
            operands.push(self.parse_operand(mnemonic, &operands)?);
            while self.consume_token_if(&Token::Comma) {
                let op = self.parse_operand(mnemonic, &operands)?;
                operands.push(op);
            }
        }

        Ok(Instruction::new(group1_prefix, mnemonic, &operands))
    }

    fn parse_operand(&mut self, mnemonic: Mnemonic, prior: &[Operand]) -> ParseResult<Operand> {
        if let Some(Token::Ident(name)) = self.peek() {
            if mem_size_from_ident(name).is_some() {
                return self.parse_memory();
            }
            let name = name.clone();
            if let Some(op) = lookup_register_operand(&name) {
                self.advance();
                return Ok(op);
            }
            return Err(ParseError::UnknownRegister(name));
        }

        if matches!(self.peek(), Some(Token::Number(_))) {
            let value = self.expect_number("an operand")?;
            if self.consume_token_if(&Token::Colon) {
                let off = self.expect_number("a far pointer offset")?;
                return Ok(if off > 0xFFFF {
                    Operand::FarPtr32(FarPtr32 {
                        seg: value as u16,
                        off,
                    })
                } else {
                    Operand::FarPtr16(FarPtr16 {
                        seg: value as u16,
                        off: off as u16,
                    })
                });
            }
            if mnemonic.takes_jcc_target() {
                return Ok(Operand::JccTarget(JccTarget {
                    taken: value,
                    not_taken: 0,
                }));
            }
            return Ok(Operand::Immediate(immediate_for(value, prior)));
        }

        match self.advance() {
            Some(tok) => Err(ParseError::syntax(format!("expected an operand, found {tok:?}"))),
            None => Err(ParseError::eof("an operand".to_string())),
        }
    }

    fn parse_memory(&mut self) -> ParseResult<Operand> {
        let size_name = self.expect_ident("a memory size")?;
        let size = mem_size_from_ident(&size_name).expect("caller already checked");

        if let Some(Token::Ident(s)) = self.peek() {
            if s.eq_ignore_ascii_case("ptr") {
                self.advance();
            }
        }

        let mut explicit_seg = None;
        if let (Some(Token::Ident(_)), Some(Token::Colon)) = (self.peek(), self.peek_at(1)) {
            let name = self.expect_ident("a segment override")?;
            explicit_seg = Some(
                lookup_segment(&name).ok_or_else(|| ParseError::UnknownRegister(name.clone()))?,
            );
            self.expect_token(Token::Colon)?;
        }

        self.expect_token(Token::LBracket)?;

        let mut regs: Vec<(GprAny, Option<u32>)> = Vec::new();
        let mut disp: i64 = 0;
        let mut disp_present = false;
        let mut sign: i64 = 1;
        if self.consume_token_if(&Token::Minus) {
            sign = -1;
        } else {
            self.consume_token_if(&Token::Plus);
        }

        loop {
            match self.peek() {
                Some(Token::Ident(name)) => {
                    let name = name.clone();
                    let reg =
                        lookup_gpr_any(&name).ok_or_else(|| ParseError::UnknownRegister(name))?;
                    self.advance();
                    let mut scale = None;
                    if self.consume_token_if(&Token::Star) {
                        let n = self.expect_number("a scale factor")?;
                        if ![1, 2, 4, 8].contains(&n) {
                            return Err(ParseError::syntax(format!("invalid scale factor {n}")));
                        }
                        scale = Some(n);
                    }
                    if regs.len() >= 2 {
                        return Err(ParseError::syntax(
                            "a memory expression takes at most two registers",
                        ));
                    }
                    regs.push((reg, scale));
                }
                Some(Token::Number(_)) => {
                    let n = self.expect_number("a displacement")? as i64;
                    disp += sign * n;
                    disp_present = true;
                }
                other => {
                    return Err(ParseError::syntax(format!(
                        "expected a register or a displacement, found {other:?}"
                    )))
                }
            }

            match self.advance() {
                Some(Token::RBracket) => break,
                Some(Token::Plus) => sign = 1,
                Some(Token::Minus) => sign = -1,
                Some(other) => {
                    return Err(ParseError::syntax(format!(
                        "expected '+', '-' or ']', found {other:?}"
                    )))
                }
                None => return Err(ParseError::eof("']'".to_string())),
            }
        }

        if regs.is_empty() && !disp_present {
            return Err(ParseError::syntax(
                "a memory expression needs a base, an index, or a displacement",
            ));
        }

        let all_16 = regs.iter().all(|(r, _)| matches!(r, GprAny::Bits16(_)));
        let all_32 = regs.iter().all(|(r, _)| matches!(r, GprAny::Bits32(_)));

        if !regs.is_empty() && all_16 {
            if regs.iter().any(|(_, scale)| scale.is_some()) {
                return Err(ParseError::syntax("16-bit addressing has no SIB scale"));
            }
            let base = regs.first().map(|(r, _)| match r {
                GprAny::Bits16(r) => *r,
                _ => unreachable!(),
            });
            let index = regs.get(1).map(|(r, _)| match r {
                GprAny::Bits16(r) => *r,
                _ => unreachable!(),
            });
            let m = Mem16 {
                seg: explicit_seg.unwrap_or_else(|| {
                    x86_codec_types::register::default_segment_for_gpr16(base)
                }),
                size,
                base,
                index,
                disp: disp_present.then_some(disp as u16),
            };
            if !Mem16::is_valid_base_index_pair(m.base, m.index) {
                return Err(ParseError::syntax(
                    "not one of the eight valid 16-bit addressing forms",
                ));
            }
            return Ok(Operand::Mem16(m));
        }

        if regs.is_empty() || all_32 {
            let base = regs.first().map(|(r, _)| match r {
                GprAny::Bits32(r) => *r,
                _ => unreachable!(),
            });
            let (index, scale_factor) = match regs.get(1) {
                Some((GprAny::Bits32(r), scale)) => (Some(*r), scale.unwrap_or(1)),
                Some(_) => unreachable!(),
                None => (None, 1),
            };
            if !Mem32::is_valid_index(index) {
                return Err(ParseError::syntax("ESP cannot be used as an index register"));
            }
            let scale = match scale_factor {
                1 => 0,
                2 => 1,
                4 => 2,
                8 => 3,
                _ => unreachable!(),
            };
            let m = Mem32 {
                seg: explicit_seg.unwrap_or_else(|| {
                    x86_codec_types::register::default_segment_for_gpr32(base)
                }),
                size,
                base,
                index,
                scale,
                disp: disp_present.then_some(disp as u32),
            };
            return Ok(Operand::Mem32(m));
        }

        Err(ParseError::syntax(
            "a memory expression cannot mix 16-bit and 32-bit registers",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_mov_eax_imm32() {
        let instr = parse("MOV EAX, 12345678h").unwrap();
        assert_eq!(
            instr,
            Instruction::new(
                None,
                Mnemonic::Mov,
                &[Operand::Gpr32(Gpr32::Eax), Operand::Immediate(Immediate::Imm32(0x12345678))],
            )
        );
    }

    #[test]
    fn parses_lock_prefixed_memory_operand() {
        let instr = parse("LOCK ADD dword ptr [EAX], ECX").unwrap();
        assert_eq!(instr.group1_prefix, Some(GroupOnePrefix::Lock));
        assert_eq!(instr.mnemonic, Mnemonic::Add);
        assert_eq!(
            instr.operand(0),
            Some(&Operand::Mem32(Mem32 {
                seg: Segment::Ds,
                size: MemSize::Dword,
                base: Some(Gpr32::Eax),
                index: None,
                scale: 0,
                disp: None,
            }))
        );
        assert_eq!(instr.operand(1), Some(&Operand::Gpr32(Gpr32::Ecx)));
    }

    #[test]
    fn parses_sib_with_scale_and_displacement() {
        let instr = parse("MOV EAX, dword ptr [EBX+ECX*4+10h]").unwrap();
        assert_eq!(
            instr.operand(1),
            Some(&Operand::Mem32(Mem32 {
                seg: Segment::Ds,
                size: MemSize::Dword,
                base: Some(Gpr32::Ebx),
                index: Some(Gpr32::Ecx),
                scale: 2,
                disp: Some(0x10),
            }))
        );
    }

    #[test]
    fn parses_a_near_jump_target() {
        let instr = parse("JMP 100h").unwrap();
        assert_eq!(
            instr.operand(0),
            Some(&Operand::JccTarget(JccTarget {
                taken: 0x100,
                not_taken: 0,
            }))
        );
    }

    #[test]
    fn parses_segment_override_memory() {
        let instr = parse("MOV EAX, dword ptr fs:[ECX]").unwrap();
        match instr.operand(1) {
            Some(Operand::Mem32(m)) => {
                assert_eq!(m.seg, Segment::Fs);
                assert_eq!(m.base, Some(Gpr32::Ecx));
            }
            other => panic!("expected Mem32, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        assert!(parse("FROBNICATE EAX").is_err());
    }

    #[test]
    fn rejects_esp_as_index() {
        assert!(parse("MOV EAX, dword ptr [EBX+ESP*2]").is_err());
    }

    #[test]
    fn infers_immediate_width_from_the_accompanying_register() {
        let instr = parse("MOV AX, 5h").unwrap();
        assert_eq!(
            instr.operand(1),
            Some(&Operand::Immediate(Immediate::Imm16(5)))
        );
    }
}

// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

/// Everything that can go wrong turning text into an `Instruction`. Kept
/// separate from `x86_codec_types::CodecError` — this crate sits outside
/// the codec core and never raises `InvalidInstruction` itself.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    #[error("unknown register '{0}'")]
    UnknownRegister(String),
}

impl ParseError {
    pub fn syntax(detail: impl Into<String>) -> ParseError {
        ParseError::Syntax(detail.into())
    }

    pub fn eof(expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedEof(expected.into())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

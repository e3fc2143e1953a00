// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Command-line front end for the codec (§6 "CLI"): `decode HEX` prints the
//! canonical text of the instruction at address 0, `encode "INSTR" [addr]`
//! parses an instruction and prints its textual form and encoded bytes.

use clap::{Parser, Subcommand};
use x86_codec::byte_stream::SliceByteStream;

#[derive(Parser)]
#[command(name = "x86codec", about = "32-bit x86 instruction codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a hex byte string into its canonical textual form.
    Decode {
        /// The instruction bytes, e.g. "33C0" or "33 C0".
        hex: String,
    },
    /// Parse an instruction's textual form and encode it.
    Encode {
        /// The instruction text, e.g. "MOV EAX, 12345678h".
        instr: String,
        /// The virtual address the instruction begins at.
        addr: Option<String>,
    },
}

fn parse_hex_bytes(hex: &str) -> Result<Vec<u8>, String> {
    let cleaned: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in '{hex}'"));
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .map_err(|_| format!("invalid hex byte '{}'", &cleaned[i..i + 2]))
        })
        .collect()
}

fn parse_addr(addr: Option<&str>) -> Result<u32, String> {
    let Some(s) = addr else {
        return Ok(0);
    };
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(rest, 16).map_err(|_| format!("invalid address '{s}'"))
    } else if let Some(rest) = s.strip_suffix('h').or_else(|| s.strip_suffix('H')) {
        u32::from_str_radix(rest, 16).map_err(|_| format!("invalid address '{s}'"))
    } else {
        s.parse::<u32>().map_err(|_| format!("invalid address '{s}'"))
    }
}

fn run_decode(hex: &str) -> Result<String, String> {
    let bytes = parse_hex_bytes(hex)?;
    let mut stream = SliceByteStream::new(&bytes, 0);
    let (instr, consumed) = x86_codec::decode(&mut stream, 0).map_err(|e| e.to_string())?;
    log::debug!("decoded {consumed} byte(s)");
    Ok(instr.to_string())
}

fn run_encode(text: &str, addr_text: Option<&str>) -> Result<String, String> {
    let addr = parse_addr(addr_text)?;
    let instr = x86_codec_text::parse(text).map_err(|e| e.to_string())?;
    let bytes = x86_codec::encode(&instr, addr).map_err(|e| e.to_string())?;
    let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
    Ok(format!("{instr}\n{}", hex.join(" ")))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Decode { hex } => run_decode(hex),
        Command::Encode { instr, addr } => run_encode(instr, addr.as_deref()),
    };

    match result {
        Ok(output) => println!("{output}"),
        Err(detail) => {
            eprintln!("error: {detail}");
            std::process::exit(exit_code_for(&detail));
        }
    }
}

/// `InvalidInstruction` is a normal rejection (§7); anything else that
/// reaches here (a malformed CLI argument, a text-parse failure) is
/// reported the same way a caller would treat `InvalidInstruction`.
fn exit_code_for(_detail: &str) -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_spaces() {
        assert_eq!(parse_hex_bytes("33C0").unwrap(), vec![0x33, 0xC0]);
        assert_eq!(parse_hex_bytes("33 C0").unwrap(), vec![0x33, 0xC0]);
    }

    #[test]
    fn rejects_odd_length_hex() {
        assert!(parse_hex_bytes("33C").is_err());
    }

    #[test]
    fn parses_addr_in_every_accepted_shape() {
        assert_eq!(parse_addr(None).unwrap(), 0);
        assert_eq!(parse_addr(Some("0x100")).unwrap(), 0x100);
        assert_eq!(parse_addr(Some("100h")).unwrap(), 0x100);
        assert_eq!(parse_addr(Some("256")).unwrap(), 256);
    }

    #[test]
    fn decodes_a_known_byte_sequence() {
        assert_eq!(run_decode("33C0").unwrap(), "XOR EAX, EAX");
    }

    #[test]
    fn encodes_a_known_instruction() {
        let out = run_encode("MOV EAX, 12345678h", None).unwrap();
        assert_eq!(out, "MOV EAX, 12345678h\nB8 78 56 34 12");
    }

    #[test]
    fn reports_an_invalid_decode_as_an_error() {
        assert!(run_decode("FF").is_err());
    }
}

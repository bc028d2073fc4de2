//! Packs an [`Instruction`] record into its machine-code bytes.
//!
//! This crate has exactly one job and no policy of its own: every bit of
//! the encoding (which registers, which immediate, whether to promote to
//! 64-bit) is already decided by the caller and carried on the
//! `Instruction`. Encoding an instruction never fails.

use sml_types::{Instruction, ModRmMode};

/// Appends the encoded bytes of `instr` to `code` and returns the byte
/// offset `code` had before the append, i.e. where `instr` begins.
///
/// Byte order, per the x86-64 instruction format: legacy prefixes (none
/// of SML's instructions need one) - REX - opcode - ModRM - SIB (SML
/// never needs one) - displacement - immediate.
pub fn encode(instr: &Instruction, code: &mut Vec<u8>) -> u32 {
    let start = code.len() as u32;

    if let Some(rex) = rex_byte(instr) {
        code.push(rex);
    }

    push_opcode(instr, code);

    if instr.use_modrm() {
        code.push(modrm_byte(instr));
    }

    if instr.use_disp() {
        code.push(instr.disp_value() as u8);
    }

    if instr.use_imm() {
        push_immediate(instr, code);
    }

    start
}

/// Builds the REX prefix byte (`0100WRXB`), or `None` if this instruction
/// needs no prefix at all. SML never indexes through SIB, so the X bit is
/// always 0.
fn rex_byte(instr: &Instruction) -> Option<u8> {
    let w = instr.wants_64bit();
    let r = instr.use_modrm() && instr.modrm_reg_is_extended();
    let b = if instr.imm_in_opcode() {
        instr.imm_dest_is_extended()
    } else {
        instr.use_modrm() && instr.modrm_rm_is_extended()
    };

    if !(w || r || b) {
        return None;
    }

    let mut byte = 0b0100_0000u8;
    if w {
        byte |= 1 << 3;
    }
    if r {
        byte |= 1 << 2;
    }
    if b {
        byte |= 1;
    }
    Some(byte)
}

fn push_opcode(instr: &Instruction, code: &mut Vec<u8>) {
    let opcode = instr.opcode();
    if opcode > 0xFF {
        code.push((opcode >> 8) as u8);
    }

    let low = opcode as u8;
    if instr.imm_in_opcode() {
        code.push(low + instr.imm_dest_low_bits());
    } else {
        code.push(low);
    }
}

fn modrm_byte(instr: &Instruction) -> u8 {
    let mode = match instr.modrm_mode() {
        ModRmMode::IndirectDisp8 => 0b01,
        ModRmMode::Direct => 0b11,
    };
    (mode << 6) | ((instr.modrm_reg_low_bits()) << 3) | instr.modrm_rm_low_bits()
}

fn push_immediate(instr: &Instruction, code: &mut Vec<u8>) {
    let bytes = instr.imm().to_le_bytes();
    code.extend_from_slice(&bytes[..instr.imm_size() as usize]);
}

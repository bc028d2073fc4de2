//! Two-pass assembler for the Source Mini-Language.
//!
//! Pass 1 ([`codegen::assemble`]) walks the source line by line, emitting
//! machine code and recording a line table plus any forward-jump
//! relocations. Pass 2 ([`linker::link`]) resolves those relocations
//! against the now-complete line table. [`compile`] runs both passes and
//! hands back the finished code buffer.

mod ast;
mod codegen;
mod linker;
mod parser;
mod register_map;

pub use ast::{ArithOp, Operand, Statement};

use sml_types::CompileError;

/// Tunables for a single compile. The only knob SML exposes is the line
/// cap; everything else about the generated function is fixed by the
/// ABI.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub max_lines: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_lines: sml_types::DEFAULT_MAX_LINES,
        }
    }
}

/// Assembles and links `source`, returning the finished machine code.
///
/// The caller owns placing this into an executable page; this crate
/// never allocates memory or touches page permissions.
#[tracing::instrument(skip(source), fields(max_lines = options.max_lines))]
pub fn compile_to_bytes(source: &str, options: CompileOptions) -> Result<Vec<u8>, CompileError> {
    let mut assembled = codegen::assemble(source, options.max_lines)?;
    tracing::debug!(bytes = assembled.code.len(), "assembly pass complete");

    linker::link(&mut assembled.code, &assembled.line_table, &assembled.relocations)?;
    tracing::debug!("link pass complete");

    Ok(assembled.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen;
    use pretty_assertions::assert_eq;

    #[test]
    fn scenario_1_returns_zero_literal() {
        let code = compile_to_bytes("ret $0\n", CompileOptions::default()).unwrap();
        let tail = &code[code.len() - 2..];
        assert_eq!(tail, &[0xC9, 0xC3]); // leave; ret
    }

    #[test]
    fn scenario_4_returns_local_literal() {
        let source = "v1: $5\nret v1\n";
        let code = compile_to_bytes(source, CompileOptions::default()).unwrap();

        // `v1: $5` must lower to the short-form 32-bit `mov ebx, 5`
        // (0xBB + imm32) with no REX prefix at all - RBX needs no REX.B,
        // and this family must never carry REX.W: that changes the
        // instruction to a 10-byte `movabs` needing a 64-bit immediate,
        // which would corrupt every instruction emitted after it.
        let assembled = codegen::assemble(source, CompileOptions::default().max_lines).unwrap();
        let attribution_offset = assembled.line_table.offset_of(1).unwrap() as usize;
        assert_eq!(
            &code[attribution_offset..attribution_offset + 5],
            &[0xBB, 0x05, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn negative_scenario_empty_file_fails() {
        assert!(compile_to_bytes("", CompileOptions::default()).is_err());
    }

    #[test]
    fn negative_scenario_no_return_fails() {
        assert!(compile_to_bytes("v1: $1\n", CompileOptions::default()).is_err());
    }

    #[test]
    fn negative_scenario_out_of_range_local_fails() {
        assert!(compile_to_bytes("v0: $1\nret v0\n", CompileOptions::default()).is_err());
        assert!(compile_to_bytes("v6: $1\nret v6\n", CompileOptions::default()).is_err());
    }

    #[test]
    fn negative_scenario_unresolved_jump_target_fails() {
        let source = "v1: p1\niflez v1 99\nret v1\n";
        assert!(compile_to_bytes(source, CompileOptions::default()).is_err());
    }

    #[test]
    fn negative_scenario_division_is_unsupported() {
        assert!(compile_to_bytes("v1 = v1 / v2\nret v1\n", CompileOptions::default()).is_err());
    }

    #[test]
    fn negative_scenario_unparsable_return_fails() {
        assert!(compile_to_bytes("ret xyz\n", CompileOptions::default()).is_err());
    }
}

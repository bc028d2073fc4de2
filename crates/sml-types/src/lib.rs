//! Shared data model for the SML (Source Mini-Language) JIT.
//!
//! This crate is the contract between the parser/codegen layer
//! (`sml-assembler`) and the instruction encoder (`sml-encoder-x86-64`): it
//! has no logic of its own beyond small constructors and accessors.

mod error;
mod instruction;
mod reg;
mod tables;

pub use error::CompileError;
pub use instruction::{Instruction, ModRmMode};
pub use reg::HwReg;
pub use tables::{LineTable, Relocation, RelocationTable};

/// Local variables `v1..v5` are the only SML locals; this is the width of
/// the callee-saved register file SML borrows for them.
pub const MAX_LOCALS: u8 = 5;

/// Parameters `p1..p3`, bound by the System V integer-argument registers
/// SML uses (RDI, RSI, RDX).
pub const MAX_PARAMS: u8 = 3;

/// Default ceiling on SML source line count (spec §9: "30 is a safe
/// default", configurable up to ~50).
pub const DEFAULT_MAX_LINES: usize = 30;

/// Number of bytes reserved below `rbp` for the callee-saved spill frame:
/// 40 bytes for RBX/R12..R15 plus 8 bytes of padding to keep the stack
/// 16-byte aligned at function entry.
pub const SPILL_FRAME_SIZE: i8 = 48;

use sml_encoder_x86_64::encode;
use sml_types::{CompileError, HwReg, Instruction, LineTable, ModRmMode, Relocation, RelocationTable};

use crate::ast::{ArithOp, Operand, Statement};
use crate::parser::parse_line;
use crate::register_map::{local_register, param_register};

/// Offsets, relative to `rbp`, of each callee-saved register's spill slot.
/// Order matches the prologue/epilogue save and restore sequence.
const SAVE_SLOTS: [(HwReg, i8); 5] = [
    (HwReg::Rbx, -8),
    (HwReg::R12, -16),
    (HwReg::R13, -24),
    (HwReg::R14, -32),
    (HwReg::R15, -40),
];

/// Result of pass 1: machine code with line offsets recorded and forward
/// jumps left as zeroed placeholders, ready for the linker.
pub struct Assembled {
    pub code: Vec<u8>,
    pub line_table: LineTable,
    pub relocations: RelocationTable,
}

/// Runs pass 1 over `source`, one line at a time.
///
/// `max_lines` bounds how many source lines are accepted; it is checked
/// against every line that isn't blank or a comment, matching the
/// behavior of skipping line-count enforcement on lines that emit
/// nothing.
pub fn assemble(source: &str, max_lines: usize) -> Result<Assembled, CompileError> {
    if source.trim().is_empty() {
        return Err(CompileError::syntax(0, "source file is empty"));
    }

    let mut code = Vec::new();
    let mut line_table = LineTable::new(max_lines);
    let mut relocations = RelocationTable::new();
    let mut ret_seen = false;
    let mut last_line_no = 0u32;

    emit_prologue(&mut code);
    save_callee_saved(&mut code);

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('/') {
            continue;
        }

        if line_no as usize > max_lines {
            return Err(CompileError::syntax(
                line_no,
                format!("source exceeds the configured maximum of {max_lines} lines"),
            ));
        }

        let statement = parse_line(line_no, raw_line)?
            .expect("non-blank, non-comment line always yields a statement");

        last_line_no = line_no;
        line_table.record(line_no, code.len() as u32);
        emit_statement(&mut code, &mut relocations, line_no, statement, &mut ret_seen)?;
    }

    if !ret_seen {
        return Err(CompileError::syntax(
            last_line_no,
            "function did not return",
        ));
    }

    Ok(Assembled {
        code,
        line_table,
        relocations,
    })
}

fn emit_prologue(code: &mut Vec<u8>) {
    code.push(0x55); // push rbp
    encode(
        &Instruction::new(0x89)
            .promote_to_64bit()
            .modrm(ModRmMode::Direct, HwReg::Rsp, HwReg::Rbp),
        code,
    ); // mov rbp, rsp
    encode(
        &Instruction::new(0x83)
            .promote_to_64bit()
            .modrm_ext(ModRmMode::Direct, 5, HwReg::Rsp)
            .imm8(sml_types::SPILL_FRAME_SIZE as i32),
        code,
    ); // sub rsp, 48
}

fn save_callee_saved(code: &mut Vec<u8>) {
    for (reg, offset) in SAVE_SLOTS {
        encode(
            &Instruction::new(0x89)
                .promote_to_64bit()
                .modrm(ModRmMode::IndirectDisp8, reg, HwReg::Rbp)
                .disp8(offset),
            code,
        );
    }
}

fn restore_callee_saved(code: &mut Vec<u8>) {
    for (reg, offset) in SAVE_SLOTS {
        encode(
            &Instruction::new(0x8B)
                .promote_to_64bit()
                .modrm(ModRmMode::IndirectDisp8, reg, HwReg::Rbp)
                .disp8(offset),
            code,
        );
    }
}

fn emit_epilogue(code: &mut Vec<u8>) {
    restore_callee_saved(code);
    code.push(0xC9); // leave
    code.push(0xC3); // ret
}

fn emit_statement(
    code: &mut Vec<u8>,
    relocations: &mut RelocationTable,
    line_no: u32,
    statement: Statement,
    ret_seen: &mut bool,
) -> Result<(), CompileError> {
    match statement {
        Statement::Return(operand) => {
            emit_return(code, line_no, operand)?;
            *ret_seen = true;
        }
        Statement::Attribution { dest, src } => emit_attribution(code, dest, src)?,
        Statement::Arithmetic {
            dest,
            left,
            op,
            right,
        } => emit_arithmetic(code, dest, left, op, right)?,
        Statement::Branch { cond, target_line } => {
            emit_branch(code, relocations, line_no, cond, target_line)?
        }
    }
    Ok(())
}

fn emit_return(code: &mut Vec<u8>, line_no: u32, operand: Operand) -> Result<(), CompileError> {
    match operand {
        Operand::Local(idx) => {
            let src = local_register(idx).expect("parser validated local index");
            encode(
                &Instruction::new(0x89)
                    .promote_to_64bit()
                    .modrm(ModRmMode::Direct, src, HwReg::Rax),
                code,
            );
        }
        Operand::Imm(value) => {
            encode(
                &Instruction::new(0xB8).imm32(value).imm_into_opcode(HwReg::Rax),
                code,
            );
        }
        Operand::Param(_) => {
            return Err(CompileError::syntax(
                line_no,
                "invalid 'ret' command: expected 'ret <vX|$int>'",
            ))
        }
    }
    emit_epilogue(code);
    Ok(())
}

fn emit_attribution(code: &mut Vec<u8>, dest: u8, src: Operand) -> Result<(), CompileError> {
    let dst_reg = local_register(dest).expect("parser validated local index");
    match src {
        Operand::Local(idx) => {
            let src_reg = local_register(idx).expect("parser validated local index");
            encode(
                &Instruction::new(0x89)
                    .promote_to_64bit()
                    .modrm(ModRmMode::Direct, src_reg, dst_reg),
                code,
            );
        }
        Operand::Param(idx) => {
            let src_reg = param_register(idx).expect("parser validated param index");
            encode(
                &Instruction::new(0x89)
                    .promote_to_64bit()
                    .modrm(ModRmMode::Direct, src_reg, dst_reg),
                code,
            );
        }
        Operand::Imm(value) => {
            encode(
                &Instruction::new(0xB8).imm32(value).imm_into_opcode(dst_reg),
                code,
            );
        }
    }
    Ok(())
}

fn emit_arithmetic(
    code: &mut Vec<u8>,
    dest: u8,
    left: Operand,
    op: ArithOp,
    right: Operand,
) -> Result<(), CompileError> {
    // Commutative swap: keep a single code path for `$n + vY` / `$n * vY`
    // by always putting the immediate on the right.
    let (left, right) = if matches!(op, ArithOp::Add | ArithOp::Mul)
        && matches!(left, Operand::Imm(_))
        && matches!(right, Operand::Local(_))
    {
        (right, left)
    } else {
        (left, right)
    };

    let dst_reg = local_register(dest).expect("parser validated local index");

    // First instruction: materialize `left` into the destination register.
    match left {
        Operand::Local(idx) => {
            let src_reg = local_register(idx).expect("parser validated local index");
            encode(
                &Instruction::new(0x89)
                    .promote_to_64bit()
                    .modrm(ModRmMode::Direct, src_reg, dst_reg),
                code,
            );
        }
        Operand::Imm(value) => {
            encode(
                &Instruction::new(0xB8).imm32(value).imm_into_opcode(dst_reg),
                code,
            );
        }
        Operand::Param(_) => unreachable!("parser rejects parameters in arithmetic expressions"),
    }

    // Second instruction: apply `op right` onto the destination register.
    match right {
        Operand::Local(idx) => {
            let src_reg = local_register(idx).expect("parser validated local index");
            match op {
                ArithOp::Add => encode(
                    &Instruction::new(0x01)
                        .promote_to_64bit()
                        .modrm(ModRmMode::Direct, src_reg, dst_reg),
                    code,
                ),
                ArithOp::Sub => encode(
                    &Instruction::new(0x29)
                        .promote_to_64bit()
                        .modrm(ModRmMode::Direct, src_reg, dst_reg),
                    code,
                ),
                // IMUL writes the product into the `reg` field rather than
                // `r/m`: swap orientation so REX.R tracks the destination
                // and REX.B the source.
                ArithOp::Mul => encode(
                    &Instruction::new(0x0FAF)
                        .promote_to_64bit()
                        .modrm(ModRmMode::Direct, dst_reg, src_reg),
                    code,
                ),
            };
        }
        Operand::Imm(value) => {
            let use_imm8 = (-128..=127).contains(&value);
            let instr = match op {
                ArithOp::Add => Instruction::new(if use_imm8 { 0x83 } else { 0x81 })
                    .promote_to_64bit()
                    .modrm_ext(ModRmMode::Direct, 0, dst_reg),
                ArithOp::Sub => Instruction::new(if use_imm8 { 0x83 } else { 0x81 })
                    .promote_to_64bit()
                    .modrm_ext(ModRmMode::Direct, 5, dst_reg),
                ArithOp::Mul => Instruction::new(if use_imm8 { 0x6B } else { 0x69 })
                    .promote_to_64bit()
                    .modrm(ModRmMode::Direct, dst_reg, dst_reg),
            };
            let instr = if use_imm8 {
                instr.imm8(value)
            } else {
                instr.imm32(value)
            };
            encode(&instr, code);
        }
        Operand::Param(_) => unreachable!("parser rejects parameters in arithmetic expressions"),
    }

    Ok(())
}

fn emit_branch(
    code: &mut Vec<u8>,
    relocations: &mut RelocationTable,
    line_no: u32,
    cond: u8,
    target_line: u32,
) -> Result<(), CompileError> {
    let reg = local_register(cond).expect("parser validated local index");

    // cmp reg, 0
    encode(
        &Instruction::new(0x83)
            .promote_to_64bit()
            .modrm_ext(ModRmMode::Direct, 7, reg)
            .imm8(0),
        code,
    );

    // jle rel32, with a zeroed placeholder for the linker to patch.
    code.push(0x0F);
    code.push(0x8E);
    let patch_offset = code.len() as u32;
    code.extend_from_slice(&[0, 0, 0, 0]);

    relocations.push(Relocation {
        patch_offset,
        source_line: line_no,
        target_line,
    });

    Ok(())
}

/// One of the three operand kinds the grammar allows: a local variable, a
/// parameter, or a decimal immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Local(u8),
    Param(u8),
    Imm(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

/// A single parsed source line. Blank lines and comments never reach
/// this far - [`crate::parser::parse_line`] returns `None` for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Return(Operand),
    Attribution {
        dest: u8,
        src: Operand,
    },
    Arithmetic {
        dest: u8,
        left: Operand,
        op: ArithOp,
        right: Operand,
    },
    Branch {
        cond: u8,
        target_line: u32,
    },
}

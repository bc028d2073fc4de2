/// A hardware x86-64 general-purpose register, addressed by its 4-bit
/// ModRM/REX index (0..15). This is the single source of truth other
/// components key off of: the register map produces these, the encoder
/// consumes them.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HwReg {
    Rax = 0,
    Rcx = 1,
    Rdx = 2,
    Rbx = 3,
    Rsp = 4,
    Rbp = 5,
    Rsi = 6,
    Rdi = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

impl HwReg {
    /// The 4-bit register index used in ModRM/REX/short-form-opcode
    /// encodings.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// True when this register requires a REX prefix to address (R8..R15).
    pub const fn is_extended(self) -> bool {
        self.index() >= 8
    }

    /// The low 3 bits of the index, as used inside a ModRM byte or folded
    /// into a short-form opcode.
    pub const fn low_bits(self) -> u8 {
        self.index() & 0x07
    }
}

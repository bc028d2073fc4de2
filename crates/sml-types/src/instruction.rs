use crate::reg::HwReg;

/// Addressing mode carried in the ModRM `mod` field. SML only ever needs
/// register-direct and register+disp8 addressing.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ModRmMode {
    /// `mod = 01`: `[reg + disp8]`
    IndirectDisp8 = 0b01,
    /// `mod = 11`: register-direct
    Direct = 0b11,
}

/// A structured description of a single x86-64 instruction, the encoder's
/// sole input. Every optional piece of the instruction format (REX,
/// ModRM, displacement, immediate, short-form `mov imm`) is a field here;
/// the encoder's job is solely to pack these bits, never to decide them.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub(crate) opcode: u16,
    pub(crate) promote_to_64bit: bool,

    pub(crate) use_modrm: bool,
    pub(crate) modrm_mode: ModRmMode,
    pub(crate) modrm_reg: u8,
    pub(crate) modrm_rm: u8,

    pub(crate) use_disp: bool,
    pub(crate) disp8: i8,

    pub(crate) use_imm: bool,
    pub(crate) imm: i32,
    pub(crate) imm_size: u8,

    pub(crate) imm_into_opcode: bool,
    pub(crate) imm_dest_reg: u8,
}

impl Instruction {
    /// Starts a new instruction record with a 1- or 2-byte opcode. A
    /// 2-byte opcode (e.g. the `0F AF` of `imul`) is passed with the `0F`
    /// prefix in the high byte.
    pub fn new(opcode: u16) -> Self {
        Self {
            opcode,
            promote_to_64bit: false,
            use_modrm: false,
            modrm_mode: ModRmMode::Direct,
            modrm_reg: 0,
            modrm_rm: 0,
            use_disp: false,
            disp8: 0,
            use_imm: false,
            imm: 0,
            imm_size: 0,
            imm_into_opcode: false,
            imm_dest_reg: 0,
        }
    }

    /// Forces REX.W, promoting the operation to 64-bit.
    pub fn promote_to_64bit(mut self) -> Self {
        self.promote_to_64bit = true;
        self
    }

    /// Attaches a ModRM byte. `reg` and `rm` are register indices 0..15;
    /// REX.R/REX.B are derived automatically from whichever of them is >= 8.
    pub fn modrm(mut self, mode: ModRmMode, reg: HwReg, rm: HwReg) -> Self {
        self.use_modrm = true;
        self.modrm_mode = mode;
        self.modrm_reg = reg.index();
        self.modrm_rm = rm.index();
        self
    }

    /// Attaches a ModRM byte whose `reg` field is an opcode extension
    /// (e.g. `/0` for ADD, `/5` for SUB, `/7` for CMP) rather than a
    /// register.
    pub fn modrm_ext(mut self, mode: ModRmMode, reg_ext: u8, rm: HwReg) -> Self {
        self.use_modrm = true;
        self.modrm_mode = mode;
        self.modrm_reg = reg_ext;
        self.modrm_rm = rm.index();
        self
    }

    /// Attaches a signed 8-bit displacement, following the ModRM byte.
    pub fn disp8(mut self, displacement: i8) -> Self {
        self.use_disp = true;
        self.disp8 = displacement;
        self
    }

    /// Attaches a signed 8-bit immediate.
    pub fn imm8(mut self, value: i32) -> Self {
        self.use_imm = true;
        self.imm = value;
        self.imm_size = 1;
        self
    }

    /// Attaches a signed 32-bit immediate.
    pub fn imm32(mut self, value: i32) -> Self {
        self.use_imm = true;
        self.imm = value;
        self.imm_size = 4;
        self
    }

    /// Selects the short-form "mov imm32 -> reg" family (`0xB8+rd`),
    /// folding the destination register into the opcode's low 3 bits and
    /// forgoing ModRM entirely.
    pub fn imm_into_opcode(mut self, dest: HwReg) -> Self {
        self.imm_into_opcode = true;
        self.imm_dest_reg = dest.index();
        self
    }
}

/// Read-only accessors for the encoder crate. Named to avoid colliding
/// with the builder methods above, which take the same field names but
/// consume `self`.
impl Instruction {
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn wants_64bit(&self) -> bool {
        self.promote_to_64bit
    }

    pub fn use_modrm(&self) -> bool {
        self.use_modrm
    }

    pub fn modrm_mode(&self) -> ModRmMode {
        self.modrm_mode
    }

    pub fn modrm_reg_low_bits(&self) -> u8 {
        self.modrm_reg & 0x07
    }

    pub fn modrm_rm_low_bits(&self) -> u8 {
        self.modrm_rm & 0x07
    }

    pub fn modrm_reg_is_extended(&self) -> bool {
        self.modrm_reg >= 8
    }

    pub fn modrm_rm_is_extended(&self) -> bool {
        self.modrm_rm >= 8
    }

    pub fn use_disp(&self) -> bool {
        self.use_disp
    }

    pub fn disp_value(&self) -> i8 {
        self.disp8
    }

    pub fn use_imm(&self) -> bool {
        self.use_imm
    }

    pub fn imm(&self) -> i32 {
        self.imm
    }

    pub fn imm_size(&self) -> u8 {
        self.imm_size
    }

    pub fn imm_in_opcode(&self) -> bool {
        self.imm_into_opcode
    }

    pub fn imm_dest_low_bits(&self) -> u8 {
        self.imm_dest_reg & 0x07
    }

    pub fn imm_dest_is_extended(&self) -> bool {
        self.imm_dest_reg >= 8
    }
}

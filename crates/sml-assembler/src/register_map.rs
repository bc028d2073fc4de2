use sml_types::HwReg;

/// Maps a local variable index (`v1..v5`) to its callee-saved home
/// register. SML borrows the five callee-saved GPRs not already spent on
/// the frame pointer: `rbx`, `r12`, `r13`, `r14`, `r15`. Keeping locals
/// pinned to callee-saved registers for the whole function body is what
/// lets a single prologue/epilogue pair save and restore them, rather
/// than spilling to the stack on every use.
pub fn local_register(idx: u8) -> Option<HwReg> {
    match idx {
        1 => Some(HwReg::Rbx),
        2 => Some(HwReg::R12),
        3 => Some(HwReg::R13),
        4 => Some(HwReg::R14),
        5 => Some(HwReg::R15),
        _ => None,
    }
}

/// Maps a parameter index (`p1..p3`) to the System V AMD64 integer
/// argument register it arrives in.
pub fn param_register(idx: u8) -> Option<HwReg> {
    match idx {
        1 => Some(HwReg::Rdi),
        2 => Some(HwReg::Rsi),
        3 => Some(HwReg::Rdx),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locals_map_to_callee_saved_registers() {
        assert_eq!(local_register(1), Some(HwReg::Rbx));
        assert_eq!(local_register(5), Some(HwReg::R15));
        assert_eq!(local_register(0), None);
        assert_eq!(local_register(6), None);
    }

    #[test]
    fn params_map_to_sysv_argument_registers() {
        assert_eq!(param_register(1), Some(HwReg::Rdi));
        assert_eq!(param_register(3), Some(HwReg::Rdx));
        assert_eq!(param_register(4), None);
    }
}

//! Verifies the universal invariant that every compiled SML function
//! preserves RBX and R12-R15 across a call, by poisoning them with known
//! values immediately before the call and reading them back immediately
//! after - both inside a single inline-asm block, so no Rust-generated
//! code runs in between and could mask a real clobber.

#![cfg(target_arch = "x86_64")]

use sml_jit::compile;
use std::arch::asm;

#[test]
fn preserves_callee_saved_registers_across_a_call() {
    let f = compile("v1: p1\nv1 = v1 + $1\nret v1\n").unwrap();
    let entry = f.as_ptr();

    let rbx_poison: u64 = 0x1111_1111_1111_1111;
    let r12_poison: u64 = 0x2222_2222_2222_2222;
    let r13_poison: u64 = 0x3333_3333_3333_3333;
    let r14_poison: u64 = 0x4444_4444_4444_4444;
    let r15_poison: u64 = 0x5555_5555_5555_5555;

    let result: i32;
    let rbx_after: u64;
    let r12_after: u64;
    let r13_after: u64;
    let r14_after: u64;
    let r15_after: u64;

    unsafe {
        asm!(
            "call {entry}",
            entry = in(reg) entry,
            inout("rbx") rbx_poison => rbx_after,
            inout("r12") r12_poison => r12_after,
            inout("r13") r13_poison => r13_after,
            inout("r14") r14_poison => r14_after,
            inout("r15") r15_poison => r15_after,
            in("edi") 41i32,
            lateout("eax") result,
            out("rcx") _,
            out("rdx") _,
            out("rsi") _,
            out("r8") _,
            out("r9") _,
            out("r10") _,
            out("r11") _,
        );
    }

    assert_eq!(result, 42);
    assert_eq!(rbx_after, rbx_poison);
    assert_eq!(r12_after, r12_poison);
    assert_eq!(r13_after, r13_poison);
    assert_eq!(r14_after, r14_poison);
    assert_eq!(r15_after, r15_poison);
}

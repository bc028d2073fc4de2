//! End-to-end scenarios: compile SML source, call the resulting
//! function, check the result. Each scenario below is written out in
//! full rather than built from a shared helper, since the whole point is
//! that a reader can see exactly what was compiled.

use sml_jit::compile;

#[test]
fn returns_a_constant_literal() {
    let f = compile("ret $0\n").unwrap();
    assert_eq!(unsafe { f.call0() }, 0);
}

#[test]
fn returns_a_larger_constant_literal() {
    let f = compile("ret $16909060\n").unwrap();
    assert_eq!(unsafe { f.call0() }, 16909060);
}

#[test]
fn returns_its_only_parameter() {
    let f = compile("v1: p1\nret v1\n").unwrap();
    assert_eq!(unsafe { f.call1(-1253512) }, -1253512);
}

#[test]
fn returns_a_local_assigned_from_a_literal() {
    let f = compile("v1: $5\nret v1\n").unwrap();
    assert_eq!(unsafe { f.call0() }, 5);
}

#[test]
fn addition_wraps_on_overflow() {
    let f = compile("v1: $2147483647\nv1 = v1 + $1\nret v1\n").unwrap();
    assert_eq!(unsafe { f.call0() }, i32::MIN);
}

#[test]
fn squares_and_subtracts_two_equal_parameters_to_zero() {
    let source = "v1: p1\nv2: p1\nv1 = v1 * v1\nv2 = v2 * v2\nv1 = v1 - v2\nret v1\n";
    let f = compile(source).unwrap();
    assert_eq!(unsafe { f.call2(7, 7) }, 0);
}

#[test]
fn computes_a_factorial_via_backward_jump() {
    // v3 is a permanent zero sentinel: `iflez v3 4` is always taken, giving
    // the unconditional backward jump SML has no dedicated opcode for.
    let source = "\
v1: $1
v2: p1
v3: $0
iflez v2 8
v1 = v1 * v2
v2 = v2 - $1
iflez v3 4
ret v1
";
    let f = compile(source).unwrap();
    assert_eq!(unsafe { f.call1(10) }, 3628800);
}

#[test]
fn skips_dead_code_on_a_taken_branch() {
    let source = "v1: p1\niflez v1 4\nret $6\nret $-775\n";
    let f = compile(source).unwrap();
    assert_eq!(unsafe { f.call1(0) }, -775);
}

#[test]
fn rejects_empty_source() {
    assert!(compile("").is_err());
}

#[test]
fn rejects_source_with_no_return() {
    assert!(compile("v1: $1\n").is_err());
}

#[test]
fn rejects_local_index_zero() {
    assert!(compile("v0: $1\nret $0\n").is_err());
}

#[test]
fn rejects_local_index_six() {
    assert!(compile("v6: $1\nret $0\n").is_err());
}

#[test]
fn rejects_jump_to_a_line_with_no_emitted_code() {
    assert!(compile("v1: p1\niflez v1 99\nret v1\n").is_err());
}

#[test]
fn rejects_division() {
    assert!(compile("v1: p1\nv2: p1\nv1 = v1 / v2\nret v1\n").is_err());
}

#[test]
fn rejects_an_unparsable_return_operand() {
    assert!(compile("ret xyz\n").is_err());
}

use crate::ast::{ArithOp, Operand, Statement};
use sml_types::{CompileError, MAX_LOCALS, MAX_PARAMS};

/// Parses a single source line.
///
/// Returns `Ok(None)` for a blank line or a comment (first non-whitespace
/// character is `/`) - these occupy a line number but emit no code and
/// leave the line table's slot unset, matching a line an `iflez` is
/// never allowed to target.
pub fn parse_line(line_no: u32, raw: &str) -> Result<Option<Statement>, CompileError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('/') {
        return Ok(None);
    }

    let mut tokens = trimmed.split_whitespace();
    let keyword = tokens.next().unwrap();

    if keyword == "ret" {
        let operand_tok = tokens.next().ok_or_else(|| {
            CompileError::syntax(line_no, "invalid 'ret' command: expected 'ret <vX|$int>'")
        })?;
        if tokens.next().is_some() {
            return Err(CompileError::syntax(
                line_no,
                "invalid 'ret' command: unexpected trailing tokens",
            ));
        }
        let operand = parse_operand(line_no, operand_tok)?;
        if matches!(operand, Operand::Param(_)) {
            return Err(CompileError::syntax(
                line_no,
                "invalid 'ret' command: expected 'ret <vX|$int>'",
            ));
        }
        return Ok(Some(Statement::Return(operand)));
    }

    if keyword == "iflez" {
        let local_tok = tokens.next().ok_or_else(|| {
            CompileError::syntax(line_no, "invalid 'iflez' command: expected 'iflez vX line'")
        })?;
        let target_tok = tokens.next().ok_or_else(|| {
            CompileError::syntax(line_no, "invalid 'iflez' command: expected 'iflez vX line'")
        })?;
        if tokens.next().is_some() {
            return Err(CompileError::syntax(
                line_no,
                "invalid 'iflez' command: unexpected trailing tokens",
            ));
        }
        let cond = parse_local(line_no, local_tok)?;
        let target_line: u32 = target_tok.parse().map_err(|_| {
            CompileError::syntax(line_no, format!("invalid jump target line '{target_tok}'"))
        })?;
        return Ok(Some(Statement::Branch { cond, target_line }));
    }

    // Only remaining grammar productions are `vX : operand` and
    // `vX = operand op operand`: find whichever separator comes first.
    let sep_idx = trimmed.find([':', '=']).ok_or_else(|| {
        CompileError::syntax(line_no, format!("unknown command: '{trimmed}'"))
    })?;
    let (dest_part, rest_part) = trimmed.split_at(sep_idx);
    let sep = rest_part.chars().next().unwrap();
    let rest_part = &rest_part[1..];

    let dest = parse_local(line_no, dest_part.trim())?;

    if sep == ':' {
        let src_tok = rest_part.trim();
        if src_tok.is_empty() {
            return Err(CompileError::syntax(
                line_no,
                "invalid attribution: expected 'vX: <vX|pX|$num>'",
            ));
        }
        let src = parse_operand(line_no, src_tok)?;
        return Ok(Some(Statement::Attribution { dest, src }));
    }

    // sep == '='
    let mut rhs = rest_part.split_whitespace();
    let left_tok = rhs.next().ok_or_else(|| {
        CompileError::syntax(
            line_no,
            "invalid arithmetic operation: expected 'vX = <vX|$num> op <vX|$num>'",
        )
    })?;
    let op_tok = rhs.next().ok_or_else(|| {
        CompileError::syntax(
            line_no,
            "invalid arithmetic operation: expected 'vX = <vX|$num> op <vX|$num>'",
        )
    })?;
    let right_tok = rhs.next().ok_or_else(|| {
        CompileError::syntax(
            line_no,
            "invalid arithmetic operation: expected 'vX = <vX|$num> op <vX|$num>'",
        )
    })?;
    if rhs.next().is_some() {
        return Err(CompileError::syntax(
            line_no,
            "invalid arithmetic operation: unexpected trailing tokens",
        ));
    }

    let left = parse_operand(line_no, left_tok)?;
    if matches!(left, Operand::Param(_)) {
        return Err(CompileError::syntax(
            line_no,
            "invalid arithmetic operation: parameters cannot appear in an arithmetic expression, assign to a local first",
        ));
    }
    let op = match op_tok {
        "+" => ArithOp::Add,
        "-" => ArithOp::Sub,
        "*" => ArithOp::Mul,
        other => {
            return Err(CompileError::syntax(
                line_no,
                format!(
                    "invalid arithmetic operator '{other}'. Only +, -, and * are supported"
                ),
            ))
        }
    };
    let right = parse_operand(line_no, right_tok)?;
    if matches!(right, Operand::Param(_)) {
        return Err(CompileError::syntax(
            line_no,
            "invalid arithmetic operation: parameters cannot appear in an arithmetic expression, assign to a local first",
        ));
    }

    Ok(Some(Statement::Arithmetic {
        dest,
        left,
        op,
        right,
    }))
}

fn parse_operand(line_no: u32, tok: &str) -> Result<Operand, CompileError> {
    let mut chars = tok.chars();
    match chars.next() {
        Some('v') => Ok(Operand::Local(parse_local(line_no, tok)?)),
        Some('p') => {
            let idx: u8 = chars.as_str().parse().map_err(|_| {
                CompileError::syntax(line_no, format!("invalid parameter designator '{tok}'"))
            })?;
            if !(1..=MAX_PARAMS).contains(&idx) {
                return Err(CompileError::syntax(
                    line_no,
                    format!("invalid parameter index {idx}. Only p1 through p3 are allowed"),
                ));
            }
            Ok(Operand::Param(idx))
        }
        Some('$') => {
            let value: i32 = chars.as_str().parse().map_err(|_| {
                CompileError::syntax(line_no, format!("invalid immediate literal '{tok}'"))
            })?;
            Ok(Operand::Imm(value))
        }
        _ => Err(CompileError::syntax(
            line_no,
            format!("invalid operand '{tok}': expected <vX|pX|$num>"),
        )),
    }
}

fn parse_local(line_no: u32, tok: &str) -> Result<u8, CompileError> {
    let digits = tok.strip_prefix('v').ok_or_else(|| {
        CompileError::syntax(line_no, format!("invalid local variable designator '{tok}'"))
    })?;
    let idx: u8 = digits.parse().map_err(|_| {
        CompileError::syntax(line_no, format!("invalid local variable designator '{tok}'"))
    })?;
    if !(1..=MAX_LOCALS).contains(&idx) {
        return Err(CompileError::syntax(
            line_no,
            format!("invalid local variable index {idx}. Only v1 through v5 are allowed"),
        ));
    }
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        assert_eq!(parse_line(1, "").unwrap(), None);
        assert_eq!(parse_line(1, "   ").unwrap(), None);
        assert_eq!(parse_line(1, "// a comment").unwrap(), None);
        assert_eq!(parse_line(1, "/ a comment").unwrap(), None);
    }

    #[test]
    fn parses_return_variants() {
        assert_eq!(
            parse_line(1, "ret v1").unwrap(),
            Some(Statement::Return(Operand::Local(1)))
        );
        assert_eq!(
            parse_line(1, "ret $-775").unwrap(),
            Some(Statement::Return(Operand::Imm(-775)))
        );
    }

    #[test]
    fn rejects_unparsable_return_operand() {
        assert!(parse_line(1, "ret xyz").is_err());
    }

    #[test]
    fn parses_attribution() {
        assert_eq!(
            parse_line(1, "v1: p1").unwrap(),
            Some(Statement::Attribution {
                dest: 1,
                src: Operand::Param(1)
            })
        );
    }

    #[test]
    fn rejects_out_of_range_local() {
        assert!(parse_line(1, "v0: $1").is_err());
        assert!(parse_line(1, "v6: $1").is_err());
    }

    #[test]
    fn parses_arithmetic() {
        assert_eq!(
            parse_line(1, "v1 = v1 * $2").unwrap(),
            Some(Statement::Arithmetic {
                dest: 1,
                left: Operand::Local(1),
                op: ArithOp::Mul,
                right: Operand::Imm(2)
            })
        );
    }

    #[test]
    fn rejects_division() {
        assert!(parse_line(1, "v1 = v1 / v2").is_err());
    }

    #[test]
    fn parses_branch() {
        assert_eq!(
            parse_line(1, "iflez v1 4").unwrap(),
            Some(Statement::Branch {
                cond: 1,
                target_line: 4
            })
        );
    }
}

use sml_types::{CompileError, LineTable, RelocationTable};

/// Pass 2: walks the relocation table recorded during assembly and
/// patches each jump's 4-byte placeholder with its resolved rel32.
///
/// `code` must already hold the bytes `assemble` produced; this function
/// only overwrites the placeholder ranges, it never resizes the buffer.
pub fn link(
    code: &mut [u8],
    line_table: &LineTable,
    relocations: &RelocationTable,
) -> Result<(), CompileError> {
    for reloc in relocations.iter() {
        let target_offset = line_table.offset_of(reloc.target_line).ok_or_else(|| {
            CompileError::link(
                reloc.source_line,
                format!(
                    "jump target is not an executable line: line {} emitted no code",
                    reloc.target_line
                ),
            )
        })?;

        let next_instruction_offset = reloc.patch_offset + 4;
        let rel32 = target_offset as i64 - next_instruction_offset as i64;
        let rel32 = rel32 as i32;

        let start = reloc.patch_offset as usize;
        code[start..start + 4].copy_from_slice(&rel32.to_le_bytes());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sml_types::Relocation;

    #[test]
    fn patches_forward_jump_offset() {
        let mut code = vec![0u8; 20];
        let mut line_table = LineTable::new(10);
        line_table.record(4, 16);

        let mut relocations = RelocationTable::new();
        relocations.push(Relocation {
            patch_offset: 8,
            source_line: 2,
            target_line: 4,
        });

        link(&mut code, &line_table, &relocations).unwrap();

        let expected: i32 = 16 - (8 + 4);
        assert_eq!(&code[8..12], &expected.to_le_bytes());
    }

    #[test]
    fn fails_when_target_line_emitted_no_code() {
        let code_len = 20;
        let mut code = vec![0u8; code_len];
        let line_table = LineTable::new(10);
        let mut relocations = RelocationTable::new();
        relocations.push(Relocation {
            patch_offset: 8,
            source_line: 2,
            target_line: 99,
        });

        assert!(link(&mut code, &line_table, &relocations).is_err());
    }
}

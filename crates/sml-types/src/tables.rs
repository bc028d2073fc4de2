/// Maps a 1-based source line number to the byte offset, inside the
/// emitted machine code, where that line's first instruction begins.
///
/// Slot `0` is a dummy: SML source lines are 1-based, so the table is
/// sized `max_lines + 1` and index `0` is never written. A jump whose
/// target line was never assembled (e.g. past the last line, or a line
/// consumed entirely by the prologue) reads back `None`.
#[derive(Debug, Clone)]
pub struct LineTable {
    offsets: Vec<Option<u32>>,
}

impl LineTable {
    /// `max_lines` is the configured line cap; the table holds one extra
    /// slot for the unused index 0.
    pub fn new(max_lines: usize) -> Self {
        Self {
            offsets: vec![None; max_lines + 1],
        }
    }

    pub fn record(&mut self, line: u32, code_offset: u32) {
        self.offsets[line as usize] = Some(code_offset);
    }

    pub fn offset_of(&self, line: u32) -> Option<u32> {
        self.offsets.get(line as usize).copied().flatten()
    }
}

/// A single forward-reference fixup: the `iflez` at `source_line` emitted
/// a placeholder rel32 at `patch_offset` and needs it replaced once the
/// address of `target_line` is known.
#[derive(Debug, Clone, Copy)]
pub struct Relocation {
    pub patch_offset: u32,
    pub source_line: u32,
    pub target_line: u32,
}

/// The set of relocations recorded during assembly, consumed wholesale by
/// the linking pass.
#[derive(Debug, Clone, Default)]
pub struct RelocationTable {
    entries: Vec<Relocation>,
}

impl RelocationTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, relocation: Relocation) {
        self.entries.push(relocation);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relocation> {
        self.entries.iter()
    }
}

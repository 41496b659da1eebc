// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source locations carried through the IR for diagnostics.

/// A byte range in the original source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Location used for compiler-generated nodes with no source counterpart.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Line lookup over one source text.
///
/// Lines and columns are 1-based; a column counts bytes.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    /// Byte offset at which each line begins.
    starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    pub fn new(source: &'src str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { source, starts }
    }

    /// Line and column of a byte offset.
    pub fn locate(&self, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let column = offset - self.starts[line - 1] + 1;
        (line as u32, column as u32)
    }

    /// Text of `line`, without its newline.
    pub fn line(&self, line: u32) -> Option<&'src str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.starts.get(index)?;
        let end = match self.starts.get(index + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        };
        self.source.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_across_lines() {
        let src = "fn f() {\n  return 1\n}";
        let lines = LineIndex::new(src);
        assert_eq!(lines.locate(0), (1, 1));
        assert_eq!(lines.locate(8), (1, 9));
        assert_eq!(lines.locate(9), (2, 1));
        assert_eq!(lines.locate(11), (2, 3));
        assert_eq!(lines.line(2), Some("  return 1"));
        assert_eq!(lines.line(3), Some("}"));
        assert_eq!(lines.line(0), None);
        assert_eq!(lines.line(4), None);
    }
}

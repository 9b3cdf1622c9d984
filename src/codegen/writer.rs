//! Line-oriented text buffer with fixed-width indentation.

/// Accumulates generated source one line at a time.
///
/// Every line is prefixed with `level * indent_width` spaces and terminated
/// with `\n`.
#[derive(Debug, Clone)]
pub(crate) struct SourceWriter {
    buf: String,
    indent_width: usize,
}

impl SourceWriter {
    pub(crate) fn new(indent_width: usize) -> Self {
        Self {
            buf: String::new(),
            indent_width,
        }
    }

    /// Append `text` as one line at nesting `level`.
    pub(crate) fn line(&mut self, level: usize, text: impl AsRef<str>) {
        let width = level * self.indent_width;
        self.buf.reserve(width + text.as_ref().len() + 1);
        self.buf.extend(std::iter::repeat(' ').take(width));
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    /// Append an empty line.
    pub(crate) fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_indented_per_level() {
        let mut w = SourceWriter::new(2);
        w.line(0, "a");
        w.line(1, "b");
        w.line(3, "c");
        w.blank();
        assert_eq!(w.into_string(), "a\n  b\n      c\n\n");
    }

    #[test]
    fn zero_width_never_indents() {
        let mut w = SourceWriter::new(0);
        w.line(5, "x");
        assert_eq!(w.into_string(), "x\n");
    }
}

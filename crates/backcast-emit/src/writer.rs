use std::fmt::Write;

///
/// SourceWriter
///
/// Line-oriented output buffer with four-space indentation levels. Every
/// rendered construct goes through here, so indentation stays uniform
/// across the emitted tree.
///

#[derive(Debug, Default)]
pub struct SourceWriter {
    buf: String,
    indent: usize,
}

impl SourceWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            indent: 0,
        }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }

        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        let _ = writeln!(self.buf, "{text}");
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }
}

//! Writer that duplicates log output to stdout and a file.

use std::io::{self, Write};

/// Writes every buffer to stdout and to the wrapped writer
#[derive(Debug)]
pub struct TeeWriter<W> {
    file: W,
}

impl<W: Write> TeeWriter<W> {
    pub const fn new(file: W) -> Self {
        Self { file }
    }

    pub fn into_inner(self) -> W {
        self.file
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A closed stdout must not stop the file log
        let _ = io::stdout().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stdout().flush();
        self.file.flush()
    }
}

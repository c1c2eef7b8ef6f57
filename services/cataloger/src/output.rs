//! JSON-lines sink for built descriptors.

use std::io::{self, Write};

use scene_catalog::OutputRecord;

/// Writes one descriptor per line.
pub struct JsonLinesWriter<W: Write> {
    inner: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_record(&mut self, record: &OutputRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.inner, &record.to_json())?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

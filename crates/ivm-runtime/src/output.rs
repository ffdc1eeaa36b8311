//! Output channel for the PRINT instruction

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Destination for printed values
pub type OutputWriter = Box<dyn Write + Send>;

/// Writer backed by the process's stdout
pub fn stdout_writer() -> OutputWriter {
    Box::new(io::stdout())
}

/// Cloneable in-memory writer
///
/// Hand one clone to the VM and keep another to read what was printed.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxed clone suitable for [`crate::vm::VM::set_output_writer`]
    pub fn writer(&self) -> OutputWriter {
        Box::new(self.clone())
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Printed values, one per line
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_contents() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.writer();
        writeln!(writer, "3").unwrap();
        writeln!(writer, "120").unwrap();

        assert_eq!(buffer.contents(), "3\n120\n");
        assert_eq!(buffer.lines(), vec!["3", "120"]);
    }
}

use std::io::{self, Write};

/// The `BrochureSink` trait is the seam through which streamed brochure
/// fragments reach a display. A sink is checked for readiness once, before
/// the streaming loop; a forward failure mid-stream downgrades the composer
/// to plain console output without aborting the stream.
pub trait BrochureSink {
    /// Reports whether this sink can display anything at all. Checked once
    /// before streaming begins.
    fn is_ready(&self) -> bool {
        true
    }

    /// Forwards one text fragment to the display.
    fn forward(&mut self, fragment: &str) -> io::Result<()>;
}

/// The plain-console sink: appends each fragment to stdout as it arrives.
/// This is also the fallback used when a caller-supplied sink fails.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl BrochureSink for ConsoleSink {
    fn forward(&mut self, fragment: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(fragment.as_bytes())?;
        stdout.flush()
    }
}

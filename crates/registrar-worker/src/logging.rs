use std::io;

use tracing::Subscriber;

/// Collects one formatted event and hands it to `emit` as a single line on drop.
pub struct LineWriter<F: Fn(&str)> {
    buf: Vec<u8>,
    emit: F,
}

impl<F: Fn(&str)> LineWriter<F> {
    pub fn new(emit: F) -> Self {
        Self {
            buf: Vec::new(),
            emit,
        }
    }
}

impl<F: Fn(&str)> io::Write for LineWriter<F> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<F: Fn(&str)> Drop for LineWriter<F> {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if !line.is_empty() {
            (self.emit)(line);
        }
    }
}

/// A `tracing` subscriber that forwards each event to `emit` as one plain-text line.
///
/// Timestamps are left out: `SystemTime::now` panics on wasm32-unknown-unknown, and the
/// Workers log stream stamps lines itself.
pub fn line_subscriber<F>(emit: F) -> impl Subscriber + Send + Sync
where
    F: Fn(&str) + Clone + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(move || LineWriter::new(emit.clone()))
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish()
}

/// A subscriber that records its lines, for asserting on log output in tests.
#[cfg(test)]
pub(crate) fn capture() -> (
    std::sync::Arc<parking_lot::Mutex<Vec<String>>>,
    impl Subscriber + Send + Sync,
) {
    let lines = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&lines);
    let subscriber = line_subscriber(move |line: &str| sink.lock().push(line.to_string()));
    (lines, subscriber)
}

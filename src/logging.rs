//! `tracing` output for the browser console.
//!
//! The subscriber is a `tracing_subscriber` registry with a level filter and a
//! `fmt` layer. Each formatted event is buffered and handed to a sink as one
//! line: in the browser that is `console.error/warn/info/debug` by level,
//! elsewhere stderr.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

/// Receives one formatted event.
pub type Sink = fn(Level, &str);

#[derive(Debug, Clone, Copy)]
pub struct ConsoleMakeWriter {
    sink: Sink,
}

impl ConsoleMakeWriter {
    pub fn new(sink: Sink) -> Self {
        Self { sink }
    }

    fn writer(&self, level: Level) -> ConsoleWriter {
        ConsoleWriter {
            level,
            buf: Vec::new(),
            sink: self.sink,
        }
    }
}

impl Default for ConsoleMakeWriter {
    fn default() -> Self {
        Self::new(platform_sink)
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(*meta.level())
    }
}

/// Buffers one event; the line goes to the sink when the writer is dropped.
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
    sink: Sink,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        if !line.is_empty() {
            (self.sink)(self.level, line);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn platform_sink(level: Level, line: &str) {
    let msg = wasm_bindgen::JsValue::from_str(line);
    if level == Level::ERROR {
        web_sys::console::error_1(&msg);
    } else if level == Level::WARN {
        web_sys::console::warn_1(&msg);
    } else if level == Level::INFO {
        web_sys::console::info_1(&msg);
    } else {
        web_sys::console::debug_1(&msg);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_sink(_level: Level, line: &str) {
    eprintln!("{}", line);
}

/// The `fmt` layer used by [`init`], writing through `make_writer`.
/// No timestamps: the std clock is unavailable on wasm32, and the console
/// stamps lines itself.
pub fn console_layer<S>(make_writer: ConsoleMakeWriter) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(make_writer)
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init(max_level: LevelFilter) -> bool {
    tracing_subscriber::registry()
        .with(max_level)
        .with(console_layer(ConsoleMakeWriter::default()))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, RecordKind, Storage};
    use std::cell::RefCell;

    thread_local! {
        static LINES: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    fn capture(level: Level, line: &str) {
        LINES.with(|l| l.borrow_mut().push((level, line.to_string())));
    }

    fn captured<F: FnOnce()>(max_level: LevelFilter, f: F) -> Vec<(Level, String)> {
        LINES.with(|l| l.borrow_mut().clear());
        let subscriber = tracing_subscriber::registry()
            .with(max_level)
            .with(console_layer(ConsoleMakeWriter::new(capture)));
        tracing::subscriber::with_default(subscriber, f);
        LINES.with(|l| l.borrow_mut().drain(..).collect())
    }

    #[test]
    fn events_below_the_filter_are_dropped() {
        let lines = captured(LevelFilter::WARN, || {
            tracing::info!("quiet");
            tracing::warn!(key = "k", "loud");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::WARN);
        assert!(lines[0].1.contains("loud"));
        assert!(lines[0].1.contains("key="));
        assert!(!lines[0].1.ends_with('\n'));
    }

    #[test]
    fn unreadable_record_is_reported() {
        let lines = captured(LevelFilter::INFO, || {
            let mut s = Storage::new(MemoryStore::new(), "t_");
            s.store_mut().set("t_gameState", "{broken").unwrap();
            assert!(s.load::<serde_json::Value>(RecordKind::GameState).is_none());
        });
        assert!(
            lines
                .iter()
                .any(|(level, line)| *level == Level::WARN && line.contains("discarding unreadable record"))
        );
    }
}

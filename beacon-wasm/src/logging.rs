//! Tracing output to the browser console

use std::io::{self, Write};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Makes one [`ConsoleLine`] per formatted event
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::default()
    }
}

/// Buffers a formatted event and logs it with `console.log` when dropped
#[derive(Debug, Default)]
pub struct ConsoleLine {
    buf: Vec<u8>,
}

impl Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&line.into());
        }
    }
}

/// Install the console subscriber
///
/// `level` is an `EnvFilter` directive such as `"info"` or
/// `"beacon_core=debug"`. Returns false if the directive is invalid or a
/// subscriber is already installed; logging then stays as it was.
pub fn init(level: &str) -> bool {
    let Ok(filter) = EnvFilter::try_new(level) else {
        web_sys::console::warn_1(&format!("beacon: invalid log level {:?}", level).into());
        return false;
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_ansi(false)
                .with_writer(ConsoleWriter),
        )
        .try_init()
        .is_ok()
}

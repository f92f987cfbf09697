//! Logging configuration and setup for the shop directory backend
//!
//! - JSON logging in Bunyan format, or human-readable text logging
//! - Auto-detection based on whether the output is a TTY (JSON if non-TTY, Text if TTY)
//! - A custom writer that replaces the "log." prefix with "backend_log." in Bunyan logs
//!   to avoid conflicts with reserved fields in log ingestion tools

use std::io::Write;

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::{config::LogFormat, constants::server::SERVICE_NAME};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "info";

struct PrefixReplacingWriter<W: Write> {
    inner: W,
}

impl<W: Write> Write for PrefixReplacingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match std::str::from_utf8(buf) {
            Ok(s) => {
                self.inner
                    .write_all(s.replace("\"log.", "\"backend_log.").as_bytes())?;
                Ok(buf.len())
            }
            Err(_) => self.inner.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

struct PrefixReplacingMakeWriter;

impl<'a> MakeWriter<'a> for PrefixReplacingMakeWriter {
    type Writer = PrefixReplacingWriter<std::io::Stdout>;

    fn make_writer(&'a self) -> Self::Writer {
        PrefixReplacingWriter {
            inner: std::io::stdout(),
        }
    }
}

/// Install the global tracing subscriber in the requested format.
///
/// The level filter comes from `RUST_LOG`, defaulting to `info`.
pub fn initialize_logging(log_format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match log_format.resolve() {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(BunyanFormattingLayer::new(
                    SERVICE_NAME.to_string(),
                    PrefixReplacingMakeWriter,
                ))
                .init();
        }
        // `resolve` never yields `Auto`
        LogFormat::Text | LogFormat::Auto => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_renames_log_fields() {
        let mut writer = PrefixReplacingWriter { inner: Vec::new() };

        writer
            .write_all(br#"{"log.target":"x","msg":"see log.keep"}"#)
            .unwrap();

        let written = String::from_utf8(writer.inner).unwrap();
        assert_eq!(written, r#"{"backend_log.target":"x","msg":"see log.keep"}"#);
    }
}

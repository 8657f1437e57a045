//! Log output for the `tax-savings` binary.
//!
//! Events go to stderr so reports on stdout can be piped. An optional log
//! file receives the same events without colour. The level filter sits
//! behind a reload layer so it can be changed once the config file has been
//! read.

use std::{
    fs::File,
    io::{self, IsTerminal},
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn level_colour(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// `<local time> <LEVEL> <file:line> <fields>`, coloured when the writer
/// supports ANSI escapes.
struct EventLine;

impl EventLine {
    fn paint(
        writer: &mut Writer<'_>,
        colour: &str,
        text: impl std::fmt::Display,
    ) -> std::fmt::Result {
        if writer.has_ansi_escapes() {
            write!(writer, "{colour}{text}{RESET} ")
        } else {
            write!(writer, "{text} ")
        }
    }
}

impl<S, N> FormatEvent<S, N> for EventLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        Self::paint(
            &mut writer,
            DIM,
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        )?;
        Self::paint(
            &mut writer,
            level_colour(meta.level()),
            format_args!("{:>5}", meta.level()),
        )?;
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            let file = file.rsplit(['/', '\\']).next().unwrap_or(file);
            Self::paint(&mut writer, CYAN, format_args!("{file}:{line}"))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Handle to the installed subscriber.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Replaces the active filter. Accepts a bare level such as `debug` or
    /// any `EnvFilter` directive.
    pub fn set_level(
        &self,
        level: &str,
    ) -> Result<()> {
        let filter = EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{level}'"))?;
        self.filter
            .reload(filter)
            .context("failed to reload log filter")
    }
}

/// Installs the global subscriber. Call once at startup.
///
/// The initial filter is `RUST_LOG` when set, otherwise `default_level`.
/// When `log_file` is given it is opened for appending and receives every
/// event that passes the filter.
pub fn init_logging(
    default_level: &str,
    log_file: Option<&Path>,
) -> Result<LogHandle> {
    let initial =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (filter_layer, filter) = reload::Layer::new(initial);

    let file_layer = match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(EventLine)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(EventLine)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")?;

    Ok(LogHandle { filter })
}

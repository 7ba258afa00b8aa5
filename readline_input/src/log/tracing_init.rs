// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DisplayPreference, TracingConfig, WriterConfig, rolling_file_appender_impl};
use miette::IntoDiagnostic;
use std::path::Path;
use tracing::subscriber::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, Registry, layer::SubscriberExt,
                         util::SubscriberInitExt};

pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
    };
}

/// Install the layers for `tracing_config` as the global default subscriber.
///
/// # Errors
///
/// If the log file can't be created, or a global subscriber is already set.
pub fn try_initialize_logging_global(tracing_config: TracingConfig) -> miette::Result<()> {
    match try_create_layers(&tracing_config)? {
        Some(layers) => tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .into_diagnostic(),
        None => Ok(()),
    }
}

/// Install the layers for `tracing_config` on the current thread only, until the
/// returned guard is dropped. Handy in tests.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_initialize_logging_thread_local(
    tracing_config: TracingConfig,
) -> miette::Result<Option<DefaultGuard>> {
    Ok(try_create_layers(&tracing_config)?
        .map(|layers| tracing::subscriber::set_default(tracing_subscriber::registry().with(layers))))
}

/// The layers for `tracing_config`, or `None` if it writes nowhere.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_create_layers(
    tracing_config: &TracingConfig,
) -> miette::Result<Option<Vec<Box<DynLayer<Registry>>>>> {
    let level_filter = tracing_config.level_filter;

    let layers = match &tracing_config.writer_config {
        WriterConfig::None => return Ok(None),
        WriterConfig::Display(preference) => {
            vec![create_display_layer(level_filter, *preference)]
        }
        WriterConfig::File(path) => vec![try_create_file_layer(level_filter, path)?],
        WriterConfig::DisplayAndFile(preference, path) => vec![
            create_display_layer(level_filter, *preference),
            try_create_file_layer(level_filter, path)?,
        ],
    };

    Ok(Some(layers))
}

fn create_display_layer(
    level_filter: LevelFilter,
    preferred_display: DisplayPreference,
) -> Box<DynLayer<Registry>> {
    let fmt_layer = create_fmt!().with_ansi(true);
    match preferred_display {
        DisplayPreference::Stdout => Box::new(
            fmt_layer
                .with_writer(std::io::stdout)
                .with_filter(level_filter),
        ),
        DisplayPreference::Stderr => Box::new(
            fmt_layer
                .with_writer(std::io::stderr)
                .with_filter(level_filter),
        ),
    }
}

fn try_create_file_layer(
    level_filter: LevelFilter,
    path: &Path,
) -> miette::Result<Box<DynLayer<Registry>>> {
    let file = rolling_file_appender_impl::try_create(path)?;
    Ok(Box::new(
        create_fmt!()
            .with_ansi(false)
            .with_writer(file)
            .with_filter(level_filter),
    ))
}

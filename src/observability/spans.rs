//! Structured span definitions for tracing.

use std::time::Instant;
use tracing::{Level, Span, field, span};

/// Tracing configuration.
#[derive(Clone, Debug, Default)]
pub struct TracingConfig {
    pub service_name: Option<String>,
    pub level: TracingLevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TracingLevel {
    #[default]
    Info,
    Debug,
    Trace,
}

impl TracingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }
}

/// Span wrapping one invocation of the monitor.
pub fn invocation_span(today: &chrono::NaiveDate) -> Span {
    span!(
        Level::INFO,
        "monitor.invoke",
        today = %today,
        regions = field::Empty,
        warnings = field::Empty,
    )
}

/// Span wrapping usage collection for one region.
pub fn region_span(region: &str) -> Span {
    span!(Level::INFO, "region.collect", region = region)
}

/// Helper for timing a single notification send within a span.
pub struct PublishSpan {
    span: Span,
    start: Instant,
}

impl PublishSpan {
    pub fn new(mode: &'static str, region: &str, target: &str) -> Self {
        let span = span!(
            Level::INFO,
            "notify.publish",
            mode = mode,
            region = region,
            target = target,
            is_error = field::Empty,
            latency_ms = field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn finish(self, is_error: bool) {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.span.record("is_error", is_error);
        self.span.record("latency_ms", latency_ms);
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

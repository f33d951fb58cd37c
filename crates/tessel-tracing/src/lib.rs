//! Shared tracing configuration for the tessel workspace.
//!
//! Binaries, integration tests and benchmarks install their `tracing`
//! subscriber through this crate so the work-division crates log the same way
//! everywhere. Library crates only emit events; they never install a
//! subscriber themselves.
//!
//! ```no_run
//! let config = tessel_tracing::TracingConfig::from_env();
//! tessel_tracing::init_global_tracing(&config)?;
//! # Ok::<(), tessel_tracing::TracingSetupError>(())
//! ```

pub mod performance;

#[macro_use]
pub mod macros;

use std::fmt;
use std::str::FromStr;

pub use tracing;
pub use tracing::{debug, error, info, trace, warn};

use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};

pub const ENV_PROFILE: &str = "TESSEL_TRACING_PROFILE";
pub const ENV_DIRECTIVES: &str = "TESSEL_TRACING_DIRECTIVES";
pub const ENV_FORMAT: &str = "TESSEL_TRACING_FORMAT";
pub const ENV_PERF_TRACING: &str = "TESSEL_PERF_TRACING";
pub const ENV_PERF_THRESHOLD_US: &str = "TESSEL_PERF_THRESHOLD_US";

/// Directives of the performance profile: every partition step and launch.
const WORKDIV_DEBUG_DIRECTIVES: &str = "tessel_workdiv=debug,tessel_backends=debug";

/// Named starting points for a [`TracingConfig`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TracingProfile {
    #[default]
    Local,
    Ci,
    Performance,
}

impl fmt::Display for TracingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TracingProfile::Local => "local",
            TracingProfile::Ci => "ci",
            TracingProfile::Performance => "performance",
        })
    }
}

impl FromStr for TracingProfile {
    type Err = TracingSetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(TracingProfile::Local),
            "ci" => Ok(TracingProfile::Ci),
            "performance" | "perf" => Ok(TracingProfile::Performance),
            other => Err(TracingSetupError::UnknownValue {
                var: ENV_PROFILE,
                value: other.to_string(),
            }),
        }
    }
}

/// Output format of the formatter layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingOutput {
    Compact,
    Pretty,
    Json,
}

impl FromStr for TracingOutput {
    type Err = TracingSetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(TracingSetupError::UnknownValue {
                var: ENV_FORMAT,
                value: other.to_string(),
            }),
        }
    }
}

/// Errors raised while configuring or installing the shared subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingSetupError {
    #[error("invalid tracing directive: {0}")]
    InvalidFilter(String),

    #[error("{var}: unrecognised value '{value}'")]
    UnknownValue { var: &'static str, value: String },

    #[error("failed to install global tracing subscriber: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
}

/// How the shared subscriber should behave.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub profile: TracingProfile,
    /// Filter directives (e.g. `tessel_workdiv=debug,info`). When absent
    /// `RUST_LOG` is used, then [`Self::default_directive`].
    pub directives: Option<String>,
    pub default_directive: String,
    /// Print event targets (module paths).
    pub include_targets: bool,
    pub ansi: bool,
    pub span_events: FmtSpan,
    pub output: TracingOutput,
    /// Report `perf_span!` timings
    pub enable_performance_tracing: bool,
    /// Spans shorter than this many microseconds are not reported
    pub performance_threshold_us: Option<u64>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_profile(TracingProfile::default())
    }
}

impl TracingConfig {
    pub fn for_profile(profile: TracingProfile) -> Self {
        let local = Self {
            profile,
            directives: None,
            default_directive: "info".to_string(),
            include_targets: true,
            ansi: true,
            span_events: FmtSpan::NONE,
            output: TracingOutput::Pretty,
            enable_performance_tracing: cfg!(debug_assertions),
            performance_threshold_us: None,
        };
        match profile {
            TracingProfile::Local => local,
            TracingProfile::Ci => Self {
                ansi: false,
                output: TracingOutput::Json,
                enable_performance_tracing: false,
                ..local
            },
            TracingProfile::Performance => Self {
                directives: Some(WORKDIV_DEBUG_DIRECTIVES.to_string()),
                ansi: false,
                span_events: FmtSpan::CLOSE,
                output: TracingOutput::Json,
                enable_performance_tracing: true,
                ..local
            },
        }
    }

    /// Pretty, coloured output for local development.
    pub fn for_local() -> Self {
        Self::for_profile(TracingProfile::Local)
    }

    /// JSON output without colour, for CI and log collectors.
    pub fn for_ci() -> Self {
        Self::for_profile(TracingProfile::Ci)
    }

    /// JSON output with span close timings and debug-level work-division events.
    pub fn for_performance() -> Self {
        Self::for_profile(TracingProfile::Performance)
    }

    /// Build a configuration from `TESSEL_TRACING_*` / `TESSEL_PERF_*`
    /// variables.
    ///
    /// Unparseable values are logged to stderr and ignored: tracing setup
    /// should never be the reason a launch fails.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok()).unwrap_or_else(|err| {
            eprintln!("tessel-tracing: {err}; falling back to the local profile");
            Self::for_local()
        })
    }

    /// Like [`Self::from_env`] with a custom variable source, reporting bad
    /// values instead of ignoring them
    ///
    /// | Variable                    | Values                                 |
    /// |-----------------------------|----------------------------------------|
    /// | `TESSEL_TRACING_PROFILE`    | `local` (default), `ci`, `performance` |
    /// | `TESSEL_TRACING_DIRECTIVES` | `EnvFilter` directives                 |
    /// | `TESSEL_TRACING_FORMAT`     | `pretty`, `compact`, `json`            |
    /// | `TESSEL_PERF_TRACING`       | `true`/`1`/`yes` or `false`/`0`/`no`   |
    /// | `TESSEL_PERF_THRESHOLD_US`  | microseconds                           |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TracingSetupError> {
        let profile = lookup(ENV_PROFILE)
            .map(|value| value.parse::<TracingProfile>())
            .transpose()?
            .unwrap_or_default();
        let mut config = Self::for_profile(profile);

        if let Some(directives) = lookup(ENV_DIRECTIVES).filter(|d| !d.trim().is_empty()) {
            config.directives = Some(directives);
        }

        if let Some(format) = lookup(ENV_FORMAT) {
            config.output = format.parse()?;
            if config.output == TracingOutput::Json {
                config.ansi = false;
            }
        }

        if let Some(flag) = lookup(ENV_PERF_TRACING) {
            config.enable_performance_tracing = parse_flag(ENV_PERF_TRACING, &flag)?;
        }

        if let Some(threshold) = lookup(ENV_PERF_THRESHOLD_US) {
            let threshold_us = threshold.trim().parse::<u64>().map_err(|_| TracingSetupError::UnknownValue {
                var: ENV_PERF_THRESHOLD_US,
                value: threshold.clone(),
            })?;
            config.performance_threshold_us = Some(threshold_us);
        }

        Ok(config)
    }

    fn resolve_filter(&self) -> Result<EnvFilter, TracingSetupError> {
        match &self.directives {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|err| TracingSetupError::InvalidFilter(err.to_string()))
            }
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_directive))),
        }
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, TracingSetupError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(TracingSetupError::UnknownValue {
            var,
            value: other.to_string(),
        }),
    }
}

/// Build a subscriber from `config` without installing it.
pub fn build_subscriber(config: &TracingConfig) -> Result<impl Subscriber + Send + Sync, TracingSetupError> {
    let filter = config.resolve_filter()?;
    let base = tracing_fmt::layer()
        .with_target(config.include_targets)
        .with_span_events(config.span_events.clone());
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.output {
        TracingOutput::Compact => Box::new(base.compact().with_ansi(config.ansi)),
        TracingOutput::Pretty => Box::new(base.pretty().with_ansi(config.ansi)),
        TracingOutput::Json => Box::new(base.json().with_ansi(false)),
    };
    Ok(Registry::default().with(layer).with(filter))
}

/// Install the configured subscriber as the process-wide default and apply
/// its performance-span settings.
pub fn init_global_tracing(config: &TracingConfig) -> Result<(), TracingSetupError> {
    build_subscriber(config)?.try_init()?;
    performance::configure(config.enable_performance_tracing, config.performance_threshold_us);
    tracing::debug!(profile = %config.profile, output = ?config.output, "tracing installed");
    Ok(())
}

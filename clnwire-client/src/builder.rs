//! Client builder and configuration
//!
//! The `ClientBuilder` configures a [`DaemonClient`] before it is attached to
//! a stream. It allows you to:
//! - Replace or extend the command catalogue
//! - Set a default per-call deadline
//! - Choose named or positional parameter encoding
//! - Configure observability (OpenTelemetry) and client metrics
//!
//! # Examples
//!
//! ```rust,no_run
//! use clnwire_client::ClientBuilder;
//! use clnwire_core::ObservabilityConfig;
//! use clnwire_schema::ParamStyle;
//! use std::time::Duration;
//!
//! # async fn example() -> clnwire_core::Result<()> {
//! let client = ClientBuilder::new()
//!     .timeout(Duration::from_secs(30))
//!     .param_style(ParamStyle::Positional)
//!     .with_observability(ObservabilityConfig::new("wallet-service"))
//!     .connect_unix("/var/lib/lightningd/bitcoin/lightning-rpc")
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::client::DaemonClient;
use crate::metrics::ClientMetrics;
use clnwire_core::{Error, ObservabilityConfig, Result};
use clnwire_schema::{Catalogue, ParamStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// Settings shared by every call on a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientConfig {
    /// Deadline applied to calls that do not set their own; `None` waits
    /// until the response arrives or the transport closes
    pub default_timeout: Option<Duration>,
    /// Layout of `params` in outgoing requests
    pub param_style: ParamStyle,
}

pub struct ClientBuilder {
    catalogue: Option<Catalogue>,
    config: ClientConfig,
    observability_config: Option<ObservabilityConfig>,
    enable_metrics: bool,
    service_name: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            catalogue: None,
            config: ClientConfig::default(),
            observability_config: None,
            enable_metrics: false,
            service_name: None,
        }
    }

    /// Use `catalogue` instead of the built-in one
    pub fn catalogue(mut self, catalogue: Catalogue) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    /// Default deadline for every call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = Some(timeout);
        self
    }

    pub fn param_style(mut self, style: ParamStyle) -> Self {
        self.config.param_style = style;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Initialize tracing and OpenTelemetry on build; implies metrics
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self.enable_metrics = true;
        self
    }

    pub fn with_default_observability(self) -> Self {
        self.with_observability(ObservabilityConfig::default())
    }

    /// Record client metrics on the global meter without initializing
    /// observability here
    pub fn with_metrics(mut self) -> Self {
        self.enable_metrics = true;
        self
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Connect to the daemon's local RPC socket
    #[cfg(unix)]
    pub async fn connect_unix(self, path: impl AsRef<std::path::Path>) -> Result<DaemonClient> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Connecting to daemon");
        let stream = tokio::net::UnixStream::connect(path)
            .await
            .map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;
        let client = self.build(stream)?;
        tracing::info!("Connected successfully");
        Ok(client)
    }

    /// Attach to an already connected stream
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build<S>(self, stream: S) -> Result<DaemonClient>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let mut service_name = self.service_name.clone();

        if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }
            service_name = Some(config.service_name.clone());

            clnwire_core::init_observability(config)
                .map_err(|e| Error::Config(format!("failed to initialize observability: {}", e)))?;
        }

        let metrics = self.enable_metrics.then(|| {
            Arc::new(ClientMetrics::new(
                service_name.unwrap_or_else(|| "clnwire".to_string()),
            ))
        });

        let catalogue = self
            .catalogue
            .unwrap_or_else(|| Catalogue::builtin().clone());

        Ok(DaemonClient::from_parts(stream, catalogue, self.config, metrics))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

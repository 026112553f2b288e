//! Connection bootstrapper.
//!
//! Obtaining a control channel goes through a fixed ladder:
//!
//! ```text
//! 1. direct         connect with the environment as it is
//! 2. variant A      resolve OpenOffice.org, mutate PATH/UNO_PATH, connect
//! 3. variant B      resolve LibreOffice,    mutate PATH/UNO_PATH, connect
//! └─ all failed  →  ConvertError::BackendUnavailable
//! ```
//!
//! A variant whose installation cannot be resolved is skipped without a
//! connection attempt. Environment changes from a failed variant are not
//! rolled back; they stay in place for the next variant and for the rest of
//! the process.
//!
//! ## Deadlines
//!
//! `Connector::connect` may block forever (a suite that is starting but
//! never accepts the connection). Each attempt therefore runs on its own
//! OS thread and the async side waits on a oneshot under
//! [`tokio::time::timeout`]. When the deadline passes the thread is simply
//! abandoned: it keeps running until `connect` returns, and its result is
//! dropped. Using `spawn_blocking` here would make runtime shutdown wait on
//! the hung call.

use crate::backend::{Connector, ControlChannel};
use crate::error::{ChannelError, ConvertError};
use office_locator::{BackendVariant, EnvironmentResolver};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Label used in logs and in [`ConvertError::BackendUnavailable`] for the
/// first, environment-as-is attempt.
pub const DIRECT_ATTEMPT: &str = "direct";

/// Builds control channels, falling back through installation variants.
pub struct Bootstrapper {
    connector: Arc<dyn Connector>,
    environment: Arc<dyn EnvironmentResolver>,
    variants: Vec<BackendVariant>,
    connect_timeout: Duration,
}

impl Bootstrapper {
    pub fn new(
        connector: Arc<dyn Connector>,
        environment: Arc<dyn EnvironmentResolver>,
        variants: Vec<BackendVariant>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            environment,
            variants,
            connect_timeout,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Run the ladder until one attempt yields a channel.
    pub async fn bootstrap(&self) -> Result<Arc<dyn ControlChannel>, ConvertError> {
        let mut attempted = vec![DIRECT_ATTEMPT.to_string()];
        if let Some(channel) = self.attempt(DIRECT_ATTEMPT).await {
            return Ok(channel);
        }

        for &variant in &self.variants {
            match self.environment.prepare(variant) {
                Ok(install) => {
                    debug!(
                        "Resolved {} at {} ({:?} root)",
                        variant,
                        install.install_path.display(),
                        install.root
                    );
                }
                Err(e) => {
                    debug!("Skipping {}: {}", variant, e);
                    continue;
                }
            }
            attempted.push(variant.name().to_string());
            if let Some(channel) = self.attempt(variant.name()).await {
                return Ok(channel);
            }
        }

        warn!("No office backend reachable (tried: {})", attempted.join(", "));
        Err(ConvertError::BackendUnavailable { attempted })
    }

    /// One connection attempt bounded by `connect_timeout`.
    ///
    /// Errors, panics and timeouts all come back as `None`.
    async fn attempt(&self, label: &str) -> Option<Arc<dyn ControlChannel>> {
        let start = Instant::now();
        let (tx, rx) = oneshot::channel::<Result<Arc<dyn ControlChannel>, ChannelError>>();
        let connector = Arc::clone(&self.connector);

        let spawned = std::thread::Builder::new()
            .name(format!("office-connect-{label}"))
            .spawn(move || {
                // The receiver may be gone after a timeout; nothing to do then.
                let _ = tx.send(connector.connect());
            });
        if let Err(e) = spawned {
            warn!("Cannot start connection thread for {}: {}", label, e);
            return None;
        }

        match tokio::time::timeout(self.connect_timeout, rx).await {
            Ok(Ok(Ok(channel))) => {
                info!(
                    "Connected via {} to {} in {}ms",
                    label,
                    channel.name(),
                    start.elapsed().as_millis()
                );
                Some(channel)
            }
            Ok(Ok(Err(e))) => {
                debug!("Connection attempt {} failed: {}", label, e);
                None
            }
            // Sender dropped without sending: the thread panicked.
            Ok(Err(_)) => {
                warn!("Connection attempt {} panicked", label);
                None
            }
            Err(_) => {
                warn!(
                    "Connection attempt {} timed out after {:?}; abandoning it",
                    label, self.connect_timeout
                );
                None
            }
        }
    }
}

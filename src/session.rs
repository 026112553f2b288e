//! The shared control-channel handle.
//!
//! A [`Session`] holds at most one live channel. It is built lazily on first
//! use and dropped when a call reports the remote side as disposed; the next
//! [`Session::channel`] then bootstraps a fresh one. The methods that build
//! or drop the channel take `&mut self`, so only the holder of the
//! executor's gate can change which channel is live. The accessors are
//! read-only.

use crate::backend::ControlChannel;
use crate::bootstrap::Bootstrapper;
use crate::error::ConvertError;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Session {
    bootstrapper: Bootstrapper,
    channel: Option<Arc<dyn ControlChannel>>,
    generation: u64,
}

impl Session {
    pub fn new(bootstrapper: Bootstrapper) -> Self {
        Self {
            bootstrapper,
            channel: None,
            generation: 0,
        }
    }

    /// Current channel, bootstrapping one if there is none.
    ///
    /// A cached channel that fails its health check is replaced before it is
    /// handed out.
    pub async fn channel(&mut self) -> Result<Arc<dyn ControlChannel>, ConvertError> {
        if let Some(channel) = &self.channel {
            if channel.is_alive() {
                return Ok(Arc::clone(channel));
            }
            debug!("Cached channel {} failed its health check", channel.name());
            self.channel = None;
        }

        let channel = self.bootstrapper.bootstrap().await?;
        self.generation += 1;
        info!("Session #{} established ({})", self.generation, channel.name());
        self.channel = Some(Arc::clone(&channel));
        Ok(channel)
    }

    /// Drop the cached channel. The next [`Session::channel`] rebuilds.
    pub fn invalidate(&mut self) {
        if let Some(channel) = self.channel.take() {
            debug!("Invalidated session #{} ({})", self.generation, channel.name());
        }
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Number of successful bootstraps so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Connector, LoadProperties, OfficeDocument};
    use crate::error::ChannelError;
    use office_locator::{BackendVariant, EnvironmentResolver, InstallationInfo, LocatorError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct FlagChannel {
        alive: Arc<AtomicBool>,
    }

    impl ControlChannel for FlagChannel {
        fn load_component_from_url(
            &self,
            _url: &str,
            _props: &LoadProperties,
        ) -> Result<Box<dyn OfficeDocument>, ChannelError> {
            Err(ChannelError::Failed("unused".into()))
        }
        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
        fn name(&self) -> &str {
            "flag"
        }
    }

    struct FlagConnector {
        alive: Arc<AtomicBool>,
        connects: AtomicUsize,
    }

    impl Connector for FlagConnector {
        fn connect(&self) -> Result<Arc<dyn ControlChannel>, ChannelError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.alive.store(true, Ordering::SeqCst);
            Ok(Arc::new(FlagChannel {
                alive: Arc::clone(&self.alive),
            }))
        }
    }

    struct NoInstall;

    impl EnvironmentResolver for NoInstall {
        fn prepare(&self, variant: BackendVariant) -> Result<InstallationInfo, LocatorError> {
            Err(LocatorError::NotFound {
                variant,
                key: String::new(),
            })
        }
    }

    fn session() -> (Session, Arc<FlagConnector>) {
        let connector = Arc::new(FlagConnector {
            alive: Arc::new(AtomicBool::new(false)),
            connects: AtomicUsize::new(0),
        });
        let b = Bootstrapper::new(
            connector.clone(),
            Arc::new(NoInstall),
            vec![],
            Duration::from_secs(5),
        );
        (Session::new(b), connector)
    }

    #[tokio::test]
    async fn built_lazily_and_reused() {
        let (mut s, connector) = session();
        assert!(!s.is_connected());
        assert_eq!(connector.connects.load(Ordering::SeqCst), 0);

        s.channel().await.unwrap();
        s.channel().await.unwrap();
        assert!(s.is_connected());
        assert_eq!(s.generation(), 1);
        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_rebuild() {
        let (mut s, connector) = session();
        s.channel().await.unwrap();
        s.invalidate();
        assert!(!s.is_connected());

        s.channel().await.unwrap();
        assert_eq!(s.generation(), 2);
        assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dead_channel_is_replaced() {
        let (mut s, connector) = session();
        s.channel().await.unwrap();
        connector.alive.store(false, Ordering::SeqCst);

        s.channel().await.unwrap();
        assert_eq!(s.generation(), 2);
    }
}

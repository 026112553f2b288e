//! Backend control-channel abstraction.
//!
//! The office suite is driven through a small remote-object surface:
//! connect, load a document from a URL, store it to a URL through a named
//! filter, close it. Everything the executor needs is expressed by the three
//! traits below; what happens on the other side of the channel is a black
//! box.
//!
//! All methods are blocking. The executor calls them from
//! `tokio::task::spawn_blocking` (channel and document calls) or from a
//! dedicated thread with a deadline (connection attempts), so an
//! implementation is free to wait on sockets or child processes.
//!
//! Disposal is reported through [`ChannelError::StaleHandle`] rather than
//! detected by inspecting some remote exception type; that single variant
//! is what triggers a session rebuild.

use crate::error::ChannelError;
use std::sync::Arc;

pub mod soffice;

pub use soffice::{SofficeChannel, SofficeConnector};

/// Options for loading a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProperties {
    /// Do not show the document interactively.
    pub hidden: bool,
}

impl LoadProperties {
    pub const HIDDEN: LoadProperties = LoadProperties { hidden: true };
}

/// Options for storing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreProperties {
    /// Export filter, e.g. `calc_pdf_Export`.
    pub filter_name: String,
}

/// Establishes a control channel. May block for a long time or forever.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn ControlChannel>, ChannelError>;
}

/// A live connection to the suite. Supports one operation at a time; the
/// executor guarantees that.
pub trait ControlChannel: Send + Sync {
    /// Open the document at `url`.
    fn load_component_from_url(
        &self,
        url: &str,
        props: &LoadProperties,
    ) -> Result<Box<dyn OfficeDocument>, ChannelError>;

    /// Health check: `false` once the remote side is known to be gone.
    fn is_alive(&self) -> bool;

    /// Identifier for logging.
    fn name(&self) -> &str;
}

/// A document opened through a [`ControlChannel`].
pub trait OfficeDocument: Send {
    fn store_to_url(&mut self, url: &str, props: &StoreProperties) -> Result<(), ChannelError>;

    /// Release the in-memory document.
    fn close(self: Box<Self>) -> Result<(), ChannelError>;
}

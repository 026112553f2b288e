//! Conversion entry points.
//!
//! ## The gate
//!
//! The backend channel supports one operation at a time, so every
//! conversion holds [`OfficeConverter`]'s gate for its whole
//! open → export → close sequence. The gate owns the [`Session`], which
//! means the lazy bootstrap and any stale-handle rebuild also happen under
//! it: two callers can never race to create two channels.
//!
//! The gated work runs in a spawned task that owns the lock guard. Dropping
//! the caller's future (a `timeout` or `select!` firing) detaches from that
//! task but cannot release the gate before the document is closed.
//!
//! ## Stale handles
//!
//! If opening reports [`ChannelError::StaleHandle`] the session is dropped,
//! rebuilt and the open retried exactly once. A second stale report, or any
//! other failure, is returned as [`ConvertError::ConversionFailed`]. Export
//! failures are never retried.

use crate::backend::{
    Connector, ControlChannel, LoadProperties, OfficeDocument, SofficeConnector, StoreProperties,
};
use crate::bootstrap::Bootstrapper;
use crate::config::ConverterConfig;
use crate::error::{ChannelError, ConvertError, Stage};
use crate::job::ConversionJob;
use crate::output::ConversionReport;
use crate::session::Session;
use office_locator::{EnvironmentResolver, Locator};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Serialised access to one office backend.
pub struct OfficeConverter {
    gate: Arc<Mutex<Session>>,
    config: ConverterConfig,
}

impl OfficeConverter {
    /// Converter backed by the installed suite's `soffice` executable,
    /// resolving installations through the platform registry.
    pub fn new(config: ConverterConfig) -> Self {
        let connector = Arc::new(SofficeConnector::new(config.soffice_path.clone()));
        Self::with_backend(connector, Arc::new(Locator::new()), config)
    }

    /// Converter over an arbitrary backend.
    pub fn with_backend(
        connector: Arc<dyn Connector>,
        environment: Arc<dyn EnvironmentResolver>,
        config: ConverterConfig,
    ) -> Self {
        let bootstrapper = Bootstrapper::new(
            connector,
            environment,
            config.variants.clone(),
            config.connect_timeout,
        );
        Self {
            gate: Arc::new(Mutex::new(Session::new(bootstrapper))),
            config,
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Establish the session now instead of on the first conversion.
    ///
    /// Returns the name the backend reported.
    pub async fn connect(&self) -> Result<String, ConvertError> {
        self.gated(|mut session| async move {
            let channel = session.channel().await?;
            Ok(channel.name().to_string())
        })
        .await
    }

    /// Number of sessions built so far. Waits for the gate.
    pub async fn session_generation(&self) -> u64 {
        self.gate.lock().await.generation()
    }

    /// Convert `source` to a PDF at `destination`.
    ///
    /// # Errors
    /// - [`ConvertError::FileNotFound`] before any backend interaction
    /// - [`ConvertError::BackendUnavailable`] when no session can be built
    /// - [`ConvertError::ConversionFailed`] when opening or exporting fails
    pub async fn convert(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> Result<ConversionReport, ConvertError> {
        let start = Instant::now();
        let job = ConversionJob::new(source.as_ref(), destination.as_ref())?;
        let profile = job.profile();
        info!(
            "Converting {} with {}",
            job.source.display(),
            profile.filter_name()
        );

        let gated_job = job.clone();
        let session_rebuilt = self
            .gated(|mut session| async move {
                let (document, rebuilt) = open(&mut session, &gated_job).await?;
                export(document, &gated_job).await?;
                Ok(rebuilt)
            })
            .await?;

        let output_bytes = tokio::fs::metadata(&job.destination)
            .await
            .map(|m| m.len())
            .map_err(|e| ConvertError::OutputReadFailed {
                path: job.destination.clone(),
                source: e,
            })?;
        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Wrote {} ({} bytes) in {}ms",
            job.destination.display(),
            output_bytes,
            duration_ms
        );

        Ok(ConversionReport {
            source: job.source,
            destination: job.destination,
            profile,
            filter: profile.filter_name().to_string(),
            output_bytes,
            duration_ms,
            session_rebuilt,
        })
    }

    /// Convert an in-memory document and return the PDF bytes.
    ///
    /// `extension` picks the export profile (`"xlsx"` or `".xlsx"`). Scratch
    /// files `Input*.<ext>` and `Output*.pdf` are created in the configured
    /// temp dir and removed only after a successful conversion. On failure
    /// they are left behind on purpose so the input can be inspected.
    pub async fn convert_bytes(
        &self,
        content: &[u8],
        extension: &str,
    ) -> Result<Vec<u8>, ConvertError> {
        let dir = self.config.scratch_dir();
        let ext = extension.trim().trim_start_matches('.');
        let input_suffix = if ext.is_empty() {
            String::new()
        } else {
            format!(".{ext}")
        };
        let input = reserve_scratch(&dir, "Input", &input_suffix)?;
        let output = reserve_scratch(&dir, "Output", ".pdf")?;

        tokio::fs::write(&input, content)
            .await
            .map_err(|e| ConvertError::ScratchFile {
                path: input.clone(),
                source: e,
            })?;

        self.convert(&input, &output).await?;

        let pdf = tokio::fs::read(&output)
            .await
            .map_err(|e| ConvertError::OutputReadFailed {
                path: output.clone(),
                source: e,
            })?;
        for path in [&input, &output] {
            if let Err(e) = tokio::fs::remove_file(path).await {
                debug!("Could not remove scratch file {}: {}", path.display(), e);
            }
        }
        Ok(pdf)
    }

    /// Run `work` with exclusive access to the session.
    ///
    /// The guard is taken here and moved into a spawned task, so it is
    /// released only when `work` has finished, even if the caller stops
    /// waiting.
    async fn gated<T, F, Fut>(&self, work: F) -> Result<T, ConvertError>
    where
        F: FnOnce(OwnedMutexGuard<Session>) -> Fut,
        Fut: Future<Output = Result<T, ConvertError>> + Send + 'static,
        T: Send + 'static,
    {
        let session = Arc::clone(&self.gate).lock_owned().await;
        tokio::spawn(work(session))
            .await
            .map_err(|e| ConvertError::Internal(format!("Conversion task failed: {e}")))?
    }

    /// Blocking wrapper around [`OfficeConverter::convert`].
    ///
    /// Creates a temporary tokio runtime internally.
    pub fn convert_sync(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> Result<ConversionReport, ConvertError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.convert(source, destination))
    }
}

// ── Process-wide instance ────────────────────────────────────────────────

static GLOBAL: OnceLock<OfficeConverter> = OnceLock::new();

/// The process-wide converter, created with the default configuration on
/// first use.
pub fn global() -> &'static OfficeConverter {
    GLOBAL.get_or_init(|| OfficeConverter::new(ConverterConfig::default()))
}

/// Convert a file through the process-wide converter.
pub async fn convert(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<ConversionReport, ConvertError> {
    global().convert(source, destination).await
}

/// Convert in-memory content through the process-wide converter.
pub async fn convert_bytes(content: &[u8], extension: &str) -> Result<Vec<u8>, ConvertError> {
    global().convert_bytes(content, extension).await
}

/// Synchronous wrapper around [`convert`].
pub fn convert_sync(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<ConversionReport, ConvertError> {
    global().convert_sync(source, destination)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Open the job's source, rebuilding the session once on a stale handle.
///
/// The returned flag is true when a rebuild happened.
async fn open(
    session: &mut Session,
    job: &ConversionJob,
) -> Result<(Box<dyn OfficeDocument>, bool), ConvertError> {
    let channel = session.channel().await?;
    match load(channel, job.source_url()).await? {
        Ok(document) => return Ok((document, false)),
        Err(e) if e.is_stale() => {
            warn!("Control channel went stale ({}); rebuilding session", e);
            session.invalidate();
        }
        Err(e) => return Err(failed(job, Stage::Open, e)),
    }

    let channel = session.channel().await?;
    match load(channel, job.source_url()).await? {
        Ok(document) => Ok((document, true)),
        Err(e) => Err(failed(job, Stage::Open, e)),
    }
}

async fn load(
    channel: Arc<dyn ControlChannel>,
    url: String,
) -> Result<Result<Box<dyn OfficeDocument>, ChannelError>, ConvertError> {
    blocking(move || channel.load_component_from_url(&url, &LoadProperties::HIDDEN)).await
}

/// Store through the profile's filter, then close whatever happened.
async fn export(mut document: Box<dyn OfficeDocument>, job: &ConversionJob) -> Result<(), ConvertError> {
    let url = job.destination_url();
    let props = StoreProperties {
        filter_name: job.profile().filter_name().to_string(),
    };
    let (stored, closed) = blocking(move || {
        let stored = document.store_to_url(&url, &props);
        let closed = document.close();
        (stored, closed)
    })
    .await?;

    stored.map_err(|e| failed(job, Stage::Export, e))?;
    if let Err(e) = closed {
        warn!("Closing {} failed: {}", job.source.display(), e);
    }
    Ok(())
}

fn failed(job: &ConversionJob, stage: Stage, error: ChannelError) -> ConvertError {
    ConvertError::ConversionFailed {
        path: job.source.clone(),
        stage,
        detail: error.to_string(),
    }
}

async fn blocking<T, F>(f: F) -> Result<T, ConvertError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ConvertError::Internal(format!("Backend call panicked: {e}")))
}

/// Create an empty, uniquely named file that outlives its handle.
fn reserve_scratch(dir: &Path, prefix: &str, suffix: &str) -> Result<PathBuf, ConvertError> {
    tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| ConvertError::ScratchFile {
            path: dir.to_path_buf(),
            source: e,
        })?
        .into_temp_path()
        .keep()
        .map_err(|e| ConvertError::ScratchFile {
            path: e.path.to_path_buf(),
            source: e.error,
        })
}

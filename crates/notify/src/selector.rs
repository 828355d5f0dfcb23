//! Transport selection with verification, fallback and single retry.
//!
//! [`TransportSelector`] owns the one active transport slot. Acquisition
//! scans candidates in declaration order, verifying each under
//! [`SelectorConfig::verify_timeout`], and falls back to a disposable test
//! account when every candidate fails. A send that fails with a
//! connection-related [`FailureKind`](crate::FailureKind) is retried exactly
//! once on a transport reacquired from the *next* candidate index.
//!
//! The slot sits behind a `tokio` mutex that is held for the whole of an
//! acquisition or retry, so concurrent callers that find the slot empty
//! queue behind the first acquirer and reuse its result instead of racing
//! their own scans. Origin and name of the occupant are also published on
//! a `watch` channel, so [`TransportSelector::active`] never waits for an
//! acquisition or retry in progress.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::timeout;

use crate::candidate::TransportCandidate;
use crate::disposable::DisposableProvider;
use crate::error::NotifyError;
use crate::failure::TransportFailure;
use crate::message::{Delivery, EmailRequest};
use crate::transport::{MailTransport, TransportFactory};

/// Default bound on a single verification probe.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on a single send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default envelope sender.
pub const DEFAULT_FROM_ADDRESS: &str = "noreply@qa-signoff.local";

/// Selector tuning.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Address used as `From` on every message.
    pub from_address: String,
    pub verify_timeout: Duration,
    pub send_timeout: Duration,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

/// Where the active transport came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOrigin {
    /// Index into the configured candidate list.
    Candidate(usize),
    /// The disposable test-account fallback.
    Disposable,
}

/// Snapshot reported by [`TransportSelector::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStatus {
    /// Name of the active transport configuration, if any.
    pub active: Option<String>,
    pub origin: Option<TransportOrigin>,
    /// Whether the on-demand re-verification passed.
    pub verified: bool,
    pub error: Option<String>,
}

/// A transport that passed verification but is not yet in the slot.
struct Verified {
    origin: TransportOrigin,
    name: String,
    handle: Arc<dyn MailTransport>,
}

/// The occupant of the slot. `generation` tells a failing sender whether
/// someone else has already replaced the transport it used.
#[derive(Clone)]
struct ActiveTransport {
    origin: TransportOrigin,
    name: String,
    handle: Arc<dyn MailTransport>,
    generation: u64,
}

/// Origin and name of the slot's occupant, readable without the lock.
type Published = Option<(TransportOrigin, String)>;

struct Slot {
    active: Option<ActiveTransport>,
    next_generation: u64,
    published: watch::Sender<Published>,
}

impl Slot {
    fn install(&mut self, verified: Verified) -> ActiveTransport {
        let active = ActiveTransport {
            origin: verified.origin,
            name: verified.name,
            handle: verified.handle,
            generation: self.next_generation,
        };
        self.next_generation += 1;
        self.published.send_replace(Some((active.origin, active.name.clone())));
        self.active = Some(active.clone());
        active
    }

    fn clear(&mut self) {
        self.active = None;
        self.published.send_replace(None);
    }
}

/// Chooses, verifies and remembers the outbound mail transport.
pub struct TransportSelector {
    candidates: Vec<TransportCandidate>,
    factory: Arc<dyn TransportFactory>,
    disposable: Option<Arc<dyn DisposableProvider>>,
    config: SelectorConfig,
    slot: Mutex<Slot>,
    snapshot: watch::Receiver<Published>,
}

impl TransportSelector {
    pub fn new(
        candidates: Vec<TransportCandidate>,
        factory: Arc<dyn TransportFactory>,
        disposable: Option<Arc<dyn DisposableProvider>>,
        config: SelectorConfig,
    ) -> Self {
        let (published, snapshot) = watch::channel(None);
        Self {
            candidates,
            factory,
            disposable,
            config,
            slot: Mutex::new(Slot {
                active: None,
                next_generation: 0,
                published,
            }),
            snapshot,
        }
    }

    pub fn candidates(&self) -> &[TransportCandidate] {
        &self.candidates
    }

    /// Origin and name of the active transport.
    ///
    /// Reads the last published value: no network access, and no waiting on
    /// a scan or retry that holds the slot.
    pub async fn active(&self) -> Option<(TransportOrigin, String)> {
        self.snapshot.borrow().clone()
    }

    /// Return the active transport, acquiring one first if the slot is empty.
    ///
    /// An occupied slot is returned as-is; the candidate loop only runs when
    /// there is no active transport.
    pub async fn acquire(&self) -> Result<Arc<dyn MailTransport>, NotifyError> {
        Ok(self.lease().await?.handle)
    }

    /// Send `request`, retrying once on the next candidate if the failure is
    /// connection-related.
    pub async fn send(&self, request: &EmailRequest) -> Result<Delivery, NotifyError> {
        let lease = self.lease().await?;

        let first = match self.send_via(&lease.handle, request).await {
            Ok(message_id) => {
                tracing::info!(
                    to = %request.recipient,
                    transport = %lease.name,
                    message_id = %message_id,
                    "Email sent"
                );
                return Ok(Delivery {
                    message_id,
                    transport: lease.name,
                });
            }
            Err(failure) => failure,
        };

        if !first.kind.is_connection_related() {
            tracing::warn!(
                to = %request.recipient,
                transport = %lease.name,
                kind = ?first.kind,
                error = %first,
                "Email send failed"
            );
            return Err(NotifyError::DeliveryFailed {
                first: first.message,
                retry: None,
            });
        }

        tracing::warn!(
            transport = %lease.name,
            kind = ?first.kind,
            error = %first,
            "Connection issue while sending, switching to the next configuration"
        );

        let mut slot = self.slot.lock().await;

        // Someone else may already have swapped the failed transport out.
        let (replacement, reused) = match &slot.active {
            Some(current) if current.generation != lease.generation => (
                Ok(Verified {
                    origin: current.origin,
                    name: current.name.clone(),
                    handle: Arc::clone(&current.handle),
                }),
                true,
            ),
            _ => (self.scan(self.next_index(lease.origin)).await, false),
        };

        let replacement = match replacement {
            Ok(verified) => verified,
            Err(e) => {
                slot.clear();
                tracing::error!(error = %e, "No transport available for retry");
                return Err(NotifyError::DeliveryFailed {
                    first: first.message,
                    retry: Some(e.to_string()),
                });
            }
        };

        match self.send_via(&replacement.handle, request).await {
            Ok(message_id) => {
                tracing::info!(
                    to = %request.recipient,
                    transport = %replacement.name,
                    message_id = %message_id,
                    "Email sent on retry"
                );
                let transport = replacement.name.clone();
                if !reused {
                    slot.install(replacement);
                }
                Ok(Delivery {
                    message_id,
                    transport,
                })
            }
            Err(retry) => {
                slot.clear();
                tracing::error!(
                    transport = %replacement.name,
                    kind = ?retry.kind,
                    error = %retry,
                    "Email retry also failed, discarding active transport"
                );
                Err(NotifyError::DeliveryFailed {
                    first: first.message,
                    retry: Some(retry.message),
                })
            }
        }
    }

    /// Report the active transport, acquiring one if needed, and re-verify it.
    pub async fn status(&self) -> TransportStatus {
        let lease = match self.lease().await {
            Ok(lease) => lease,
            Err(e) => {
                return TransportStatus {
                    active: None,
                    origin: None,
                    verified: false,
                    error: Some(e.to_string()),
                }
            }
        };

        let result = self.verify(&lease.handle).await;
        TransportStatus {
            active: Some(lease.name),
            origin: Some(lease.origin),
            verified: result.is_ok(),
            error: result.err().map(|f| f.message),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn lease(&self) -> Result<ActiveTransport, NotifyError> {
        let mut slot = self.slot.lock().await;
        if let Some(active) = &slot.active {
            return Ok(active.clone());
        }

        tracing::info!("No active email transport, acquiring one");
        let verified = self.scan(0).await?;
        Ok(slot.install(verified))
    }

    /// Candidate index the retry path resumes from.
    fn next_index(&self, failed: TransportOrigin) -> usize {
        match failed {
            TransportOrigin::Candidate(i) if !self.candidates.is_empty() => {
                (i + 1) % self.candidates.len()
            }
            _ => 0,
        }
    }

    /// Try every candidate once, starting at `start` and wrapping, then the
    /// disposable fallback.
    async fn scan(&self, start: usize) -> Result<Verified, NotifyError> {
        let count = self.candidates.len();

        for offset in 0..count {
            let index = (start + offset) % count;
            let candidate = &self.candidates[index];
            tracing::debug!(candidate = %candidate.name, index, "Verifying email transport");

            match self.build_verified(candidate).await {
                Ok(handle) => {
                    tracing::info!(candidate = %candidate.name, index, "Email transport verified");
                    return Ok(Verified {
                        origin: TransportOrigin::Candidate(index),
                        name: candidate.name.clone(),
                        handle,
                    });
                }
                Err(failure) => tracing::warn!(
                    candidate = %candidate.name,
                    index,
                    kind = ?failure.kind,
                    hint = failure.kind.hint(),
                    error = %failure,
                    "Email transport verification failed"
                ),
            }
        }

        if count > 0 {
            tracing::warn!(count, "All configured email transports failed verification");
        }

        if let Some(provider) = &self.disposable {
            tracing::info!("Trying disposable test account");
            let verified = match provider.provision().await {
                Ok(candidate) => self
                    .build_verified(&candidate)
                    .await
                    .map(|handle| (candidate.name, handle)),
                Err(failure) => Err(failure),
            };
            match verified {
                Ok((name, handle)) => {
                    tracing::info!(candidate = %name, "Disposable test account verified");
                    return Ok(Verified {
                        origin: TransportOrigin::Disposable,
                        name,
                        handle,
                    });
                }
                Err(failure) => tracing::error!(
                    kind = ?failure.kind,
                    error = %failure,
                    "Disposable test account fallback failed"
                ),
            }
        }

        Err(NotifyError::TransportUnavailable)
    }

    async fn build_verified(
        &self,
        candidate: &TransportCandidate,
    ) -> Result<Arc<dyn MailTransport>, TransportFailure> {
        let handle = self.factory.build(candidate)?;
        self.verify(&handle).await?;
        Ok(handle)
    }

    async fn verify(&self, handle: &Arc<dyn MailTransport>) -> Result<(), TransportFailure> {
        match timeout(self.config.verify_timeout, handle.verify()).await {
            Ok(result) => result,
            Err(_) => Err(TransportFailure::deadline(
                "Connection verification",
                self.config.verify_timeout,
            )),
        }
    }

    async fn send_via(
        &self,
        handle: &Arc<dyn MailTransport>,
        request: &EmailRequest,
    ) -> Result<String, TransportFailure> {
        match timeout(
            self.config.send_timeout,
            handle.send(&self.config.from_address, request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportFailure::deadline(
                "Email send",
                self.config.send_timeout,
            )),
        }
    }
}

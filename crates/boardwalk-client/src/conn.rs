use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use boardwalk_proto::{encode_frame, FrameBuffer, FrameError, Request, Response};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::trace;

/// Unsolicited frames queue here until a subscriber drains them; anything
/// beyond this is dropped.
const UNSOLICITED_BUFFER: usize = 32;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<Response>>>>;

/// Why the reader task stopped. Cloneable so every pending waiter can
/// surface the same cause.
#[derive(Debug, Clone)]
enum ConnFailure {
    Io(io::ErrorKind, String),
    Decode(String),
    Closed,
}

impl ConnFailure {
    fn to_error(&self) -> ClientError {
        match self {
            ConnFailure::Io(kind, message) => {
                ClientError::Read(io::Error::new(*kind, message.clone()))
            }
            ConnFailure::Decode(message) => ClientError::Decode(message.clone()),
            ConnFailure::Closed => ClientError::ConnectionClosed,
        }
    }
}

/// One duplex connection with a dispatcher task owning the read side.
///
/// Every in-flight request registers a completion slot keyed by its
/// correlation tag; each decoded frame either fulfills its slot or flows to
/// the unsolicited channel, so concurrent callers never consume each
/// other's responses. A connection is bound to one trust profile and
/// discarded when its workflow ends.
pub struct Connection {
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: PendingMap,
    unsolicited: tokio::sync::Mutex<mpsc::Receiver<Response>>,
    last_unmatched: Arc<Mutex<Option<String>>>,
    failure: Arc<Mutex<Option<ConnFailure>>>,
    reader: JoinHandle<()>,
    config: ClientConfig,
}

impl Connection {
    /// Take ownership of an established duplex stream and start the
    /// dispatcher over it.
    pub fn spawn<S>(stream: S, config: ClientConfig) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let pending: PendingMap = Arc::default();
        let (unsolicited_tx, unsolicited_rx) = mpsc::channel(UNSOLICITED_BUFFER);
        let last_unmatched = Arc::new(Mutex::new(None));
        let failure = Arc::new(Mutex::new(None));

        let reader = tokio::spawn(read_loop(
            read_half,
            pending.clone(),
            unsolicited_tx,
            last_unmatched.clone(),
            failure.clone(),
            config.trace_wire,
        ));

        Self {
            writer: tokio::sync::Mutex::new(Box::new(write_half)),
            pending,
            unsolicited: tokio::sync::Mutex::new(unsolicited_rx),
            last_unmatched,
            failure,
            reader,
            config,
        }
    }

    /// Send one request and wait for the response bearing its tag.
    ///
    /// The correlation tag is freshly generated here, overwriting anything
    /// the caller set. The write and the wait each get their own deadline
    /// derived from [`ClientConfig::request_timeout`]; a timeout on either
    /// side is reported distinctly.
    pub async fn send_request(&self, mut request: Request) -> Result<Response, ClientError> {
        let tag = Uuid::new_v4().to_string();
        request.header.client_tag = Some(tag.clone());
        let url = request.header.url.clone();

        let frame = encode_frame(&request).map_err(|err| ClientError::Encode(err.to_string()))?;
        trace::outbound(&request, self.config.trace_wire);

        let (slot_tx, slot_rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(tag.clone(), slot_tx);

        let write = async {
            let mut writer = self.writer.lock().await;
            writer.write_all(&frame).await?;
            writer.flush().await
        };
        match timeout(self.config.request_timeout, write).await {
            Err(_) => {
                self.forget(&tag);
                return Err(ClientError::WriteTimeout { url });
            }
            Ok(Err(err)) => {
                self.forget(&tag);
                return Err(ClientError::Write(err));
            }
            Ok(Ok(())) => {}
        }

        match timeout(self.config.request_timeout, slot_rx).await {
            Ok(Ok(response)) => {
                debug!(tag = %tag, url = %url, "response matches request tag");
                trace::inbound(&response, self.config.trace_wire);
                Ok(response)
            }
            // The reader dropped our slot: surface whatever stopped it.
            Ok(Err(_)) => Err(self.failure_error()),
            Err(_) => {
                self.forget(&tag);
                Err(ClientError::RequestTimeout {
                    url,
                    timeout: self.config.request_timeout,
                    last_status: self.last_unmatched.lock().unwrap().clone(),
                })
            }
        }
    }

    /// Borrow the stream of frames that matched no in-flight request. The
    /// pairing confirmation phase filters this by content.
    pub async fn unsolicited(&self) -> tokio::sync::MutexGuard<'_, mpsc::Receiver<Response>> {
        self.unsolicited.lock().await
    }

    /// The failure recorded by the reader task, if it has stopped.
    pub fn failure_error(&self) -> ClientError {
        self.failure
            .lock()
            .unwrap()
            .as_ref()
            .map(ConnFailure::to_error)
            .unwrap_or(ClientError::ConnectionClosed)
    }

    fn forget(&self, tag: &str) {
        self.pending.lock().unwrap().remove(tag);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop<R>(
    mut reader: R,
    pending: PendingMap,
    unsolicited: mpsc::Sender<Response>,
    last_unmatched: Arc<Mutex<Option<String>>>,
    failure: Arc<Mutex<Option<ConnFailure>>>,
    trace_wire: bool,
) where
    R: AsyncRead + Send + Unpin,
{
    let mut frames = FrameBuffer::new();
    let mut chunk = [0u8; 4096];

    let outcome = 'read: loop {
        loop {
            match frames.next_frame::<Response>() {
                Ok(Some(response)) => {
                    dispatch(response, &pending, &unsolicited, &last_unmatched, trace_wire)
                }
                Ok(None) => break,
                Err(FrameError::Decode(err)) => {
                    warn!(error = %err, "malformed frame, aborting connection");
                    break 'read ConnFailure::Decode(err.to_string());
                }
                Err(err) => break 'read ConnFailure::Decode(err.to_string()),
            }
        }
        match reader.read(&mut chunk).await {
            Ok(0) => break 'read ConnFailure::Closed,
            Ok(n) => frames.extend(&chunk[..n]),
            Err(err) => break 'read ConnFailure::Io(err.kind(), err.to_string()),
        }
    };

    *failure.lock().unwrap() = Some(outcome);
    // Dropping the slots wakes every in-flight caller.
    pending.lock().unwrap().clear();
}

fn dispatch(
    response: Response,
    pending: &PendingMap,
    unsolicited: &mpsc::Sender<Response>,
    last_unmatched: &Arc<Mutex<Option<String>>>,
    trace_wire: bool,
) {
    let slot = response
        .header
        .client_tag
        .as_ref()
        .and_then(|tag| pending.lock().unwrap().remove(tag));

    match slot {
        Some(slot) => {
            if slot.send(response).is_err() {
                debug!("matched response arrived after its caller gave up");
            }
        }
        None => {
            trace::inbound(&response, trace_wire);
            if let Some(status) = response.header.status_code.clone() {
                *last_unmatched.lock().unwrap() = Some(status);
            }
            match unsolicited.try_send(response) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!("unsolicited frame dropped, buffer full")
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }
}

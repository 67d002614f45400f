use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, SendTimeoutError, TryRecvError, TrySendError};

use crate::feedback::QueueError;

/// How long a blocking enqueue waits for queue space before the frame is
/// counted as lost.
pub const ENQUEUE_WAIT: Duration = Duration::from_secs(1);

/// Selects one of the two FIFOs of an [`Interface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone)]
struct Fifo {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl Fifo {
    fn new(capacity: usize) -> Self {
        let (tx, rx) = if capacity == 0 {
            unbounded()
        } else {
            bounded(capacity)
        };
        Self { tx, rx }
    }

    fn push(&self, frame: String) -> Result<(), QueueError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Disconnected(_) => QueueError::Closed,
        })
    }

    fn push_wait(&self, frame: String) -> Result<(), QueueError> {
        self.tx.send_timeout(frame, ENQUEUE_WAIT).map_err(|e| match e {
            SendTimeoutError::Timeout(_) => QueueError::Full,
            SendTimeoutError::Disconnected(_) => QueueError::Closed,
        })
    }

    fn pop(&self) -> Result<Option<String>, QueueError> {
        match self.rx.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(QueueError::Closed),
        }
    }
}

/// A network-facing port of a node: a pair of FIFOs of raw wire frames.
///
/// The owning node consumes `Inbound` and produces `Outbound`; the link layer
/// holds a clone of the handle and does the opposite. Each FIFO is safe under
/// one concurrent producer and one concurrent consumer.
///
/// `capacity` of 0 means unbounded.
#[derive(Debug, Clone)]
pub struct Interface {
    inbound: Fifo,
    outbound: Fifo,
}

impl Interface {
    pub fn new(capacity: usize) -> Self {
        Self {
            inbound: Fifo::new(capacity),
            outbound: Fifo::new(capacity),
        }
    }

    /// Pushes a frame onto the chosen FIFO.
    ///
    /// Non-blocking enqueues fail with [`QueueError::Full`] at capacity.
    /// Blocking enqueues suspend the caller until space frees, up to
    /// [`ENQUEUE_WAIT`], after which the frame counts as lost.
    pub fn enqueue(&self, end: End, frame: String, blocking: bool) -> Result<(), QueueError> {
        let fifo = self.fifo(end);
        if blocking {
            fifo.push_wait(frame)
        } else {
            fifo.push(frame)
        }
    }

    /// Non-blocking pop. Returns `None` rather than suspending when the FIFO
    /// is empty or closed, so polling loops stay responsive.
    pub fn dequeue(&self, end: End) -> Option<String> {
        self.fifo(end).pop().ok().flatten()
    }

    fn fifo(&self, end: End) -> &Fifo {
        match end {
            End::Inbound => &self.inbound,
            End::Outbound => &self.outbound,
        }
    }
}

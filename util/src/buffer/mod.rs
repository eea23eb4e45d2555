
use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Duration;

use crate::error::{Error, Result};

// Packets above this size are rejected outright rather than buffered.
const MAX_PACKET_SIZE: usize = 0xFFFF;

#[derive(Default)]
struct BufferInner {
    packets: VecDeque<Vec<u8>>,
    size: usize,
    closed: bool,

    limit_count: usize,
    limit_size: usize,
}

/// Buffer is an async packet queue between a socket reader task and a
/// `recv` caller. Unlike a byte buffer it never coalesces writes: every
/// `write` is returned by exactly one `read`.
#[derive(Clone)]
pub struct Buffer {
    inner: Arc<Mutex<BufferInner>>,
    notify: Arc<Notify>,
}

impl Buffer {
    /// Creates a buffer. A zero `limit_count` or `limit_size` disables
    /// that limit.
    pub fn new(limit_count: usize, limit_size: usize) -> Self {
        Buffer {
            inner: Arc::new(Mutex::new(BufferInner {
                limit_count,
                limit_size,
                ..BufferInner::default()
            })),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Appends a copy of `packet`, returning `Error::BufferFull` if a
    /// limit would be exceeded.
    pub fn write(&self, packet: &[u8]) -> Result<usize> {
        if packet.len() > MAX_PACKET_SIZE {
            return Err(Error::PacketTooBig);
        }

        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(Error::BufferClosed);
            }

            if (inner.limit_count > 0 && inner.packets.len() >= inner.limit_count)
                || (inner.limit_size > 0 && inner.size + packet.len() > inner.limit_size)
            {
                return Err(Error::BufferFull);
            }

            inner.size += packet.len();
            inner.packets.push_back(packet.to_vec());
        }

        self.notify.notify_waiters();
        Ok(packet.len())
    }

    /// Pops the oldest packet into `packet`, blocking until one arrives,
    /// the optional `duration` expires, or the buffer is closed.
    pub async fn read(&self, packet: &mut [u8], duration: Option<Duration>) -> Result<usize> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);

            {
                let mut inner = self.inner.lock();
                if let Some(p) = inner.packets.pop_front() {
                    inner.size -= p.len();
                    if p.len() > packet.len() {
                        return Err(Error::BufferShort);
                    }
                    packet[..p.len()].copy_from_slice(&p);
                    return Ok(p.len());
                }

                if inner.closed {
                    return Err(Error::BufferClosed);
                }

                // Register for wakeup while still holding the lock so a
                // write between unlock and await cannot be missed.
                notified.as_mut().enable();
            }

            if let Some(d) = duration {
                if tokio::time::timeout(d, notified).await.is_err() {
                    return Err(Error::Timeout);
                }
            } else {
                notified.await;
            }
        }
    }

    /// Unblocks all readers and rejects future writes. Buffered packets
    /// can still be drained; a drained closed buffer reports
    /// `Error::BufferClosed`.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        drop(inner);

        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Number of buffered packets.
    pub fn count(&self) -> usize {
        self.inner.lock().packets.len()
    }

    /// Total byte size of buffered packets.
    pub fn size(&self) -> usize {
        self.inner.lock().size
    }

    pub fn set_limit_count(&self, limit: usize) {
        self.inner.lock().limit_count = limit;
    }

    pub fn set_limit_size(&self, limit: usize) {
        self.inner.lock().limit_size = limit;
    }
}

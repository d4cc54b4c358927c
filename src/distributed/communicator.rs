//! In-process point-to-point message passing between ranks.
//!
//! Every rank owns one inbox and a sender to every other rank. Sends never
//! block. Receives match on `(source, tag)`: messages that arrive for a
//! different pair are parked in a mailbox until asked for, so the order in
//! which peers' messages interleave does not matter. Messages from one
//! source with one tag are delivered in the order they were sent.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::CommunicationError;
use crate::types::RankId;

/// A tagged payload in flight.
#[derive(Debug)]
pub struct Message {
    pub source: RankId,
    pub tag: u64,
    pub payload: Vec<f64>,
}

/// One rank's endpoint.
#[derive(Debug)]
pub struct Communicator {
    rank: RankId,
    peers: Vec<Option<Sender<Message>>>,
    inbox: Mutex<Receiver<Message>>,
    mailbox: Mutex<HashMap<(RankId, u64), VecDeque<Vec<f64>>>>,
}

impl Communicator {
    /// Connected endpoints for `size` ranks, index `r` belonging to rank `r`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use fv_ocean::distributed::Communicator;
    /// use fv_ocean::types::RankId;
    ///
    /// let world = Communicator::world(2);
    /// world[0].send(RankId::new(1), 7, vec![1.0, 2.0])?;
    /// let got = world[1].recv(RankId::new(0), 7, Duration::from_secs(1))?;
    /// assert_eq!(got, vec![1.0, 2.0]);
    /// # Ok::<(), fv_ocean::CommunicationError>(())
    /// ```
    pub fn world(size: usize) -> Vec<Self> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| mpsc::channel()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| Self {
                rank: RankId::new(rank),
                peers: senders
                    .iter()
                    .enumerate()
                    .map(|(peer, tx)| (peer != rank).then(|| tx.clone()))
                    .collect(),
                inbox: Mutex::new(inbox),
                mailbox: Mutex::new(HashMap::new()),
            })
            .collect()
    }

    /// The endpoint of a single-rank world.
    pub fn serial() -> Self {
        let (_tx, inbox) = mpsc::channel();
        Self {
            rank: RankId::new(0),
            peers: vec![None],
            inbox: Mutex::new(inbox),
            mailbox: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn rank(&self) -> RankId {
        self.rank
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.peers.len()
    }

    fn sender(&self, peer: RankId) -> Result<&Sender<Message>, CommunicationError> {
        match self.peers.get(peer.get()) {
            Some(Some(tx)) => Ok(tx),
            _ => Err(CommunicationError::UnknownRank {
                rank: peer.get(),
                size: self.size(),
            }),
        }
    }

    /// Post `payload` to `peer`. Never blocks.
    pub fn send(&self, peer: RankId, tag: u64, payload: Vec<f64>) -> Result<(), CommunicationError> {
        let tx = self.sender(peer)?;
        trace!(rank = self.rank.get(), peer = peer.get(), tag, len = payload.len(), "send");
        tx.send(Message {
            source: self.rank,
            tag,
            payload,
        })
        .map_err(|_| CommunicationError::PeerDisconnected {
            rank: self.rank.get(),
            peer: peer.get(),
        })
    }

    fn take_parked(&self, peer: RankId, tag: u64) -> Option<Vec<f64>> {
        let mut mailbox = self.mailbox.lock();
        let queue = mailbox.get_mut(&(peer, tag))?;
        let payload = queue.pop_front();
        if queue.is_empty() {
            mailbox.remove(&(peer, tag));
        }
        payload
    }

    /// Wait up to `timeout` for the next message from `peer` with `tag`.
    pub fn recv(&self, peer: RankId, tag: u64, timeout: Duration) -> Result<Vec<f64>, CommunicationError> {
        if peer.get() >= self.size() || peer == self.rank {
            return Err(CommunicationError::UnknownRank {
                rank: peer.get(),
                size: self.size(),
            });
        }
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(payload) = self.take_parked(peer, tag) {
                trace!(rank = self.rank.get(), peer = peer.get(), tag, "received parked message");
                return Ok(payload);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            let message = self.inbox.lock().recv_timeout(remaining);
            match message {
                Ok(m) if m.source == peer && m.tag == tag => {
                    trace!(rank = self.rank.get(), peer = peer.get(), tag, "received");
                    return Ok(m.payload);
                }
                Ok(m) => {
                    trace!(rank = self.rank.get(), source = m.source.get(), tag = m.tag, "parked");
                    self.mailbox.lock().entry((m.source, m.tag)).or_default().push_back(m.payload);
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(CommunicationError::Timeout {
                        rank: self.rank.get(),
                        peer: peer.get(),
                        tag,
                        waited: timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CommunicationError::PeerDisconnected {
                        rank: self.rank.get(),
                        peer: peer.get(),
                    });
                }
            }
        }
    }

    /// Fail if any message is parked or still queued.
    pub fn check_drained(&self) -> Result<(), CommunicationError> {
        let unexpected = |source: RankId, tag: u64| CommunicationError::UnexpectedMessage {
            rank: self.rank.get(),
            peer: source.get(),
            tag,
        };
        if let Some(&(source, tag)) = self.mailbox.lock().keys().min() {
            return Err(unexpected(source, tag));
        }
        if let Ok(m) = self.inbox.lock().try_recv() {
            return Err(unexpected(m.source, m.tag));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_tags() {
        let world = Communicator::world(3);
        world[0].send(RankId::new(2), 1, vec![1.0]).unwrap();
        world[1].send(RankId::new(2), 2, vec![2.0]).unwrap();
        world[0].send(RankId::new(2), 2, vec![3.0]).unwrap();
        let timeout = Duration::from_millis(500);
        assert_eq!(world[2].recv(RankId::new(0), 2, timeout).unwrap(), vec![3.0]);
        assert_eq!(world[2].recv(RankId::new(1), 2, timeout).unwrap(), vec![2.0]);
        assert!(world[2].check_drained().is_err());
        assert_eq!(world[2].recv(RankId::new(0), 1, timeout).unwrap(), vec![1.0]);
        assert!(world[2].check_drained().is_ok());
    }

    #[test]
    fn test_same_tag_is_fifo() {
        let world = Communicator::world(2);
        for n in 0..4 {
            world[1].send(RankId::new(0), 9, vec![n as f64]).unwrap();
        }
        for n in 0..4 {
            let got = world[0].recv(RankId::new(1), 9, Duration::from_millis(100)).unwrap();
            assert_eq!(got, vec![n as f64]);
        }
    }

    #[test]
    fn test_timeout_is_reported() {
        let world = Communicator::world(2);
        let err = world[0].recv(RankId::new(1), 3, Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, CommunicationError::Timeout { rank: 0, peer: 1, tag: 3, .. }));
    }

    #[test]
    fn test_dropped_peer() {
        let mut world = Communicator::world(2);
        let second = world.pop().unwrap();
        drop(world);
        assert!(matches!(
            second.send(RankId::new(0), 0, vec![]),
            Err(CommunicationError::PeerDisconnected { .. })
        ));
        assert!(matches!(
            second.recv(RankId::new(0), 0, Duration::from_millis(10)),
            Err(CommunicationError::PeerDisconnected { .. })
        ));
    }

    #[test]
    fn test_unknown_rank() {
        let world = Communicator::world(2);
        assert!(matches!(
            world[0].send(RankId::new(5), 0, vec![]),
            Err(CommunicationError::UnknownRank { rank: 5, size: 2 })
        ));
    }
}

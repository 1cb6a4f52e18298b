use super::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug)]
struct Message {
    source: usize,
    tag: Tag,
    payload: Vec<f64>,
}

#[derive(Debug)]
enum Envelope {
    Message(Message),
    /// Last envelope an endpoint sends to each peer, on drop.
    Gone { source: usize },
}

/// Builds a set of connected `ThreadComm` endpoints, one per rank.
/// Move each endpoint into the thread that plays that rank.
pub struct ThreadWorld;

impl ThreadWorld {
    pub fn create(size: usize) -> Vec<ThreadComm> {
        let (senders, receivers): (Vec<Sender<Envelope>>, Vec<Receiver<Envelope>>) =
            (0..size).map(|_| unbounded()).unzip();

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| {
                let peers = senders
                    .iter()
                    .enumerate()
                    .map(|(peer, s)| (peer != rank).then(|| s.clone()))
                    .collect();
                ThreadComm {
                    rank,
                    size,
                    peers,
                    inbox,
                    stash: RefCell::new(VecDeque::new()),
                    gone: RefCell::new(vec![false; size]),
                }
            })
            .collect()
    }
}

/// One rank's endpoint in a `ThreadWorld`.
///
/// Dropping an endpoint, on return or while a panic unwinds, tells every
/// peer it is gone. A receive from a gone peer first drains what that peer
/// sent before leaving and then fails with `CommError::Disconnected`.
pub struct ThreadComm {
    rank: usize,
    size: usize,
    peers: Vec<Option<Sender<Envelope>>>,
    inbox: Receiver<Envelope>,
    stash: RefCell<VecDeque<Message>>,
    gone: RefCell<Vec<bool>>,
}

impl ThreadComm {
    fn take_matching(&self, source: usize, tag: Tag) -> Result<Message, CommError> {
        let mut stash = self.stash.borrow_mut();
        if let Some(position) = stash
            .iter()
            .position(|m| m.source == source && m.tag == tag)
        {
            if let Some(message) = stash.remove(position) {
                return Ok(message);
            }
        }
        // Per sender the channel is FIFO, so nothing follows a `Gone`.
        if self.gone.borrow()[source] {
            return Err(CommError::Disconnected { peer: source });
        }

        loop {
            let envelope = self
                .inbox
                .recv()
                .map_err(|_| CommError::Disconnected { peer: source })?;
            match envelope {
                Envelope::Message(message) => {
                    if message.source == source && message.tag == tag {
                        return Ok(message);
                    }
                    stash.push_back(message);
                }
                Envelope::Gone { source: peer } => {
                    self.gone.borrow_mut()[peer] = true;
                    if peer == source {
                        return Err(CommError::Disconnected { peer });
                    }
                }
            }
        }
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        for peer in self.peers.iter().flatten() {
            // A peer that is already gone has nobody left to tell.
            let _ = peer.send(Envelope::Gone { source: self.rank });
        }
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(
        &self,
        dest: usize,
        tag: Tag,
        data: &[f64],
    ) -> Result<SendRequest, CommError> {
        let peer = self
            .peers
            .get(dest)
            .and_then(|p| p.as_ref())
            .ok_or(CommError::InvalidRank {
                rank: dest,
                size: self.size,
            })?;
        peer.send(Envelope::Message(Message {
            source: self.rank,
            tag,
            payload: data.to_vec(),
        }))
        .map_err(|_| CommError::Disconnected { peer: dest })?;
        Ok(SendRequest { dest, tag })
    }

    fn wait(&self, request: RecvRequest) -> Result<Vec<f64>, CommError> {
        if request.source >= self.size || request.source == self.rank {
            return Err(CommError::InvalidRank {
                rank: request.source,
                size: self.size,
            });
        }
        let message = self.take_matching(request.source, request.tag)?;
        if message.payload.len() != request.len {
            return Err(CommError::SizeMismatch {
                peer: request.source,
                tag: request.tag,
                expected: request.len,
                actual: message.payload.len(),
            });
        }
        Ok(message.payload)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn single_rank_collectives() {
        let mut world = ThreadWorld::create(1);
        let comm = world.pop().unwrap();
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert_eq!(comm.all_reduce(42.0, ReduceOp::Sum).unwrap(), 42.0);
        assert!(comm.all_reduce_and(true).unwrap());
        assert!(!comm.all_reduce_and(false).unwrap());
        comm.barrier().unwrap();
    }

    #[test]
    fn matching_by_tag_keeps_order() {
        let world = ThreadWorld::create(2);
        let (a, b) = (&world[0], &world[1]);
        a.isend(1, Tag::PipelineCell, &[1.0]).unwrap();
        a.isend(1, Tag::PipelineRow, &[10.0, 11.0]).unwrap();
        a.isend(1, Tag::PipelineCell, &[2.0]).unwrap();

        // Row first even though it arrived second.
        let row = b.wait(b.irecv(0, Tag::PipelineRow, 2)).unwrap();
        assert_eq!(row, vec![10.0, 11.0]);
        let mut cell = [0.0];
        b.recv_into(0, Tag::PipelineCell, &mut cell).unwrap();
        assert_eq!(cell, [1.0]);
        b.recv_into(0, Tag::PipelineCell, &mut cell).unwrap();
        assert_eq!(cell, [2.0]);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let world = ThreadWorld::create(2);
        world[1].isend(0, Tag::Gather, &[1.0, 2.0]).unwrap();
        let result = world[0].wait(world[0].irecv(1, Tag::Gather, 3));
        assert!(matches!(
            result,
            Err(CommError::SizeMismatch {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn invalid_ranks_are_rejected() {
        let world = ThreadWorld::create(2);
        assert!(world[0].isend(0, Tag::Scatter, &[]).is_err());
        assert!(world[0].isend(2, Tag::Scatter, &[]).is_err());
    }

    #[test]
    fn dropped_peer_disconnects() {
        let mut world = ThreadWorld::create(2);
        let b = world.pop().unwrap();
        let a = world.pop().unwrap();
        drop(b);
        assert!(matches!(
            a.wait(a.irecv(1, Tag::Gather, 1)),
            Err(CommError::Disconnected { peer: 1 })
        ));
        assert!(a.isend(1, Tag::Gather, &[1.0]).is_err());
    }

    #[test]
    fn dropped_peer_disconnects_while_others_live() {
        let mut world = ThreadWorld::create(3);
        let gone = world.pop().unwrap();
        gone.isend(0, Tag::Gather, &[7.0]).unwrap();
        drop(gone);
        let (a, b) = (&world[0], &world[1]);

        // Sent before leaving, still delivered.
        assert_eq!(a.wait(a.irecv(2, Tag::Gather, 1)).unwrap(), vec![7.0]);
        assert!(matches!(
            a.wait(a.irecv(2, Tag::Gather, 1)),
            Err(CommError::Disconnected { peer: 2 })
        ));
        assert!(matches!(
            a.wait(a.irecv(2, Tag::Scatter, 1)),
            Err(CommError::Disconnected { peer: 2 })
        ));

        // The rank still alive keeps working.
        b.isend(0, Tag::Gather, &[1.0]).unwrap();
        assert_eq!(a.wait(a.irecv(1, Tag::Gather, 1)).unwrap(), vec![1.0]);
        assert!(b.isend(2, Tag::Gather, &[1.0]).is_err());
    }

    #[test]
    fn blocked_receive_wakes_when_peer_leaves() {
        let world = ThreadWorld::create(3);
        let result = std::thread::scope(|s| {
            let mut endpoints = world.into_iter();
            let a = endpoints.next().unwrap();
            let b = endpoints.next().unwrap();
            let c = endpoints.next().unwrap();
            let waiting = s.spawn(move || a.wait(a.irecv(2, Tag::Gather, 1)));
            s.spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(20));
                drop(c);
            });
            let result = waiting.join().unwrap();
            drop(b);
            result
        });
        assert!(matches!(result, Err(CommError::Disconnected { peer: 2 })));
    }

    #[test]
    fn all_reduce_across_threads() {
        let world = ThreadWorld::create(4);
        let results: Vec<(f64, f64, bool)> = std::thread::scope(|s| {
            let handles: Vec<_> = world
                .into_iter()
                .map(|comm| {
                    s.spawn(move || {
                        let r = comm.rank() as f64;
                        let max = comm.all_reduce(r, ReduceOp::Max).unwrap();
                        let sum = comm.all_reduce(r, ReduceOp::Sum).unwrap();
                        let and = comm.all_reduce_and(comm.rank() != 2).unwrap();
                        comm.barrier().unwrap();
                        (max, sum, and)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (max, sum, and) in results {
            assert_eq!(max, 3.0);
            assert_eq!(sum, 6.0);
            assert!(!and);
        }
    }
}

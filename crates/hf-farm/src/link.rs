//! Transport between the coordinator and its workers.
//!
//! The farm logic only sees these traits; [`channel_links`] wires them over
//! in-process channels. Each worker inbox holds at most one message.

use crate::error::{FarmResult, ProtocolViolation};
use crate::message::{CoordinatorMessage, WorkerMessage};
use hf_core::{WorkerId, worker_ids};
use std::sync::mpsc::{Receiver, Sender, SyncSender, channel, sync_channel};

/// Coordinator side: addressed sends, receive-from-any.
pub trait CoordinatorLink {
    fn worker_count(&self) -> usize;
    fn send(&mut self, worker: WorkerId, message: WorkerMessage) -> FarmResult<()>;
    fn recv_any(&mut self) -> FarmResult<CoordinatorMessage>;
}

/// Worker side: one inbox, one outbox.
pub trait WorkerLink {
    fn id(&self) -> WorkerId;
    fn recv(&mut self) -> FarmResult<WorkerMessage>;
    fn send(&mut self, message: CoordinatorMessage) -> FarmResult<()>;
}

pub struct ChannelCoordinator {
    inboxes: Vec<SyncSender<WorkerMessage>>,
    results: Receiver<CoordinatorMessage>,
}

pub struct ChannelWorker {
    id: WorkerId,
    inbox: Receiver<WorkerMessage>,
    results: Sender<CoordinatorMessage>,
}

/// Build a coordinator link and `count` worker links, in rank order.
pub fn channel_links(count: usize) -> (ChannelCoordinator, Vec<ChannelWorker>) {
    let (result_tx, result_rx) = channel();
    let mut inboxes = Vec::with_capacity(count);
    let mut workers = Vec::with_capacity(count);
    for id in worker_ids(count) {
        let (tx, rx) = sync_channel(1);
        inboxes.push(tx);
        workers.push(ChannelWorker {
            id,
            inbox: rx,
            results: result_tx.clone(),
        });
    }
    let coordinator = ChannelCoordinator {
        inboxes,
        results: result_rx,
    };
    (coordinator, workers)
}

fn disconnected(peer: impl ToString) -> ProtocolViolation {
    ProtocolViolation::Disconnected {
        peer: peer.to_string(),
    }
}

impl CoordinatorLink for ChannelCoordinator {
    fn worker_count(&self) -> usize {
        self.inboxes.len()
    }

    fn send(&mut self, worker: WorkerId, message: WorkerMessage) -> FarmResult<()> {
        let inbox = self
            .inboxes
            .get(worker.index())
            .ok_or(ProtocolViolation::UnknownWorker { worker })?;
        inbox.send(message).map_err(|_| disconnected(worker))?;
        Ok(())
    }

    fn recv_any(&mut self) -> FarmResult<CoordinatorMessage> {
        Ok(self.results.recv().map_err(|_| disconnected("all workers"))?)
    }
}

impl WorkerLink for ChannelWorker {
    fn id(&self) -> WorkerId {
        self.id
    }

    fn recv(&mut self) -> FarmResult<WorkerMessage> {
        Ok(self.inbox.recv().map_err(|_| disconnected("coordinator"))?)
    }

    fn send(&mut self, message: CoordinatorMessage) -> FarmResult<()> {
        self.results
            .send(message)
            .map_err(|_| disconnected("coordinator"))?;
        Ok(())
    }
}

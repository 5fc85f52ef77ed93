//! Patch-to-patch message passing for ghost zones and flux corrections.
//!
//! Every message carries a [`MessageTag`] (step, stage, kind) plus the
//! sender and the direction it came from, so a receive only ever matches
//! the one message meant for it. Messages that arrive before anyone asks
//! for them (a neighbour running a stage ahead) are stashed.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use grmhd_core::{PatchId, StepId};
use grmhd_mesh::{Neighbor, NeighborOffset};
use tracing::trace;

use crate::error::TaskFault;

/// What a message carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Fluxes on a shared patch face.
    FluxCorrection,
    /// A ghost-zone slab of the new stage state.
    Boundary,
}

/// Identifies the exchange a message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageTag {
    /// Step the exchange belongs to.
    pub step: StepId,
    /// 1-based integrator stage; `0` for the initial fill.
    pub stage: usize,
    /// Payload kind.
    pub kind: MessageKind,
}

/// A message in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Exchange tag.
    pub tag: MessageTag,
    /// Sending patch.
    pub from: PatchId,
    /// Offset from the receiver to the sender.
    pub offset: NeighborOffset,
    /// Packed values.
    pub payload: Vec<f64>,
}

impl Message {
    fn matches(&self, tag: MessageTag, from: &Neighbor) -> bool {
        self.tag == tag && self.from == from.patch && self.offset == from.offset
    }
}

/// Non-blocking transport between neighbouring patches.
///
/// `send` never waits. `try_receive` returns `None` until the matching
/// message is available; callers poll it from an incomplete task.
pub trait BoundaryExchange: Send {
    /// Send `payload` to the neighbour `to` (offset seen from the sender).
    ///
    /// # Errors
    ///
    /// [`TaskFault::Disconnected`] if the neighbour can no longer receive.
    fn send(&mut self, tag: MessageTag, to: &Neighbor, payload: Vec<f64>) -> Result<(), TaskFault>;

    /// Take the message tagged `tag` from `from` (offset seen from the
    /// receiver), if it has arrived.
    fn try_receive(&mut self, tag: MessageTag, from: &Neighbor) -> Option<Vec<f64>>;
}

/// [`BoundaryExchange`] over unbounded crossbeam channels, one inbox per
/// patch.
pub struct ChannelExchange {
    me: PatchId,
    inbox: Receiver<Message>,
    outboxes: Arc<[Sender<Message>]>,
    stash: Vec<Message>,
}

impl ChannelExchange {
    /// Fully connected endpoints for patches `0..n`, in patch order.
    pub fn network(n: usize) -> Vec<ChannelExchange> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..n).map(|_| crossbeam_channel::unbounded()).unzip();
        let outboxes: Arc<[Sender<Message>]> = senders.into();
        receivers
            .into_iter()
            .enumerate()
            .map(|(n, inbox)| ChannelExchange {
                me: PatchId(n as u32),
                inbox,
                outboxes: Arc::clone(&outboxes),
                stash: Vec::new(),
            })
            .collect()
    }

    /// The patch this endpoint belongs to.
    pub fn patch(&self) -> PatchId {
        self.me
    }

    /// Messages received but not yet claimed.
    pub fn stashed(&self) -> usize {
        self.stash.len()
    }
}

impl BoundaryExchange for ChannelExchange {
    fn send(&mut self, tag: MessageTag, to: &Neighbor, payload: Vec<f64>) -> Result<(), TaskFault> {
        let outbox = self
            .outboxes
            .get(to.patch.0 as usize)
            .ok_or(TaskFault::Disconnected { peer: to.patch })?;
        let msg = Message {
            tag,
            from: self.me,
            offset: to.offset.reverse(),
            payload,
        };
        outbox
            .send(msg)
            .map_err(|_| TaskFault::Disconnected { peer: to.patch })
    }

    fn try_receive(&mut self, tag: MessageTag, from: &Neighbor) -> Option<Vec<f64>> {
        self.stash.extend(self.inbox.try_iter());
        let n = self.stash.iter().position(|m| m.matches(tag, from))?;
        trace!(patch = %self.me, from = %from.patch, stage = tag.stage, "message received");
        Some(self.stash.swap_remove(n).payload)
    }
}

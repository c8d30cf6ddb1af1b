//! Holding area for events raised where immediate dispatch isn't wanted.
//!
//! At most one event per kind is outstanding. Pushing sets a bit, so pushing the
//! same kind twice before the next drain has no further effect. The drain order is
//! fixed by [`EVENTS_PRIORITY_QUEUE`], not by the order of the pushes.
use super::rx_sm::Event;
use crate::error::{Result, RxError};
use bitflags::bitflags;
use std::sync::atomic::{AtomicU16, Ordering};

/// Queueable events, highest priority first. Bit `i` of the mask holds entry `i`.
pub const EVENTS_PRIORITY_QUEUE: [Event; 5] = [
    Event::Disconnected,
    Event::Connected,
    Event::StreamInit,
    Event::StreamUp,
    Event::StreamDown,
];

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventMask: u16 {
        const DISCONNECTED = 1 << 0;
        const CONNECTED = 1 << 1;
        const STREAM_INIT = 1 << 2;
        const STREAM_UP = 1 << 3;
        const STREAM_DOWN = 1 << 4;
    }
}

impl EventMask {
    /// Bit of a queueable event, `None` for the kinds that are only dispatched directly.
    pub fn for_event(event: Event) -> Option<EventMask> {
        EVENTS_PRIORITY_QUEUE
            .iter()
            .position(|e| *e == event)
            .map(|i| EventMask::from_bits_truncate(1 << i))
    }
}

/// Pending-event mask. Pushing only needs a shared reference. The controller keeps
/// it behind an `Arc`, handed out by `RxController::pending_handle`, so an
/// interrupt handler can record events while the poll loop owns the controller.
#[derive(Debug, Default)]
pub struct PendingEvents(AtomicU16);

impl PendingEvents {
    pub fn push(&self, event: Event) -> Result<()> {
        let bit = EventMask::for_event(event).ok_or(RxError::EventNotQueueable(event))?;
        self.0.fetch_or(bit.bits(), Ordering::AcqRel);
        Ok(())
    }

    pub fn pending(&self) -> EventMask {
        EventMask::from_bits_truncate(self.0.load(Ordering::Acquire))
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    pub(crate) fn clear(&self, mask: EventMask) {
        self.0.fetch_and(!mask.bits(), Ordering::AcqRel);
    }

    pub(crate) fn clear_all(&self) {
        self.0.store(0, Ordering::Release);
    }
}

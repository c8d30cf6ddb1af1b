//! Application callbacks fired on receiver transitions and pass-through interrupts.
use crate::error::RxError;
use std::fmt;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumIter, EnumCountMacro)]
pub enum TriggerHandler {
    ConnectionChange = 0,
    StreamOff = 1,
    StreamOn = 2,
    AudioConfig = 3,
    AuxEvent = 4,
    ClkSrcConfig = 5,
    ClkSrcSel = 6,
    VrrVfpEvent = 7,
    VtemEvent = 8,
    DynHdrEvent = 9,
    HdcpSetContentStreamType = 10,
    HdcpForceBlanking = 11,
}

impl TriggerHandler {
    pub fn is_hdcp(self) -> bool {
        matches!(
            self,
            TriggerHandler::HdcpSetContentStreamType | TriggerHandler::HdcpForceBlanking
        )
    }
}

impl TryFrom<u32> for TriggerHandler {
    type Error = RxError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        TriggerHandler::iter()
            .find(|h| *h as u32 == raw)
            .ok_or_else(|| RxError::InvalidParameter(format!("unknown trigger handler {}", raw)))
    }
}

/// A registered callback. Whatever context it needs is captured by the closure.
pub type TriggerCallback = Box<dyn FnMut() + Send>;

/// One slot per [`TriggerHandler`]. Registering overwrites the slot; firing an
/// empty slot does nothing.
pub struct TriggerCallbacks {
    slots: [Option<TriggerCallback>; TriggerHandler::COUNT],
}

impl TriggerCallbacks {
    pub fn new() -> Self {
        TriggerCallbacks {
            slots: std::array::from_fn(|_| None),
        }
    }

    pub(crate) fn set(&mut self, handler: TriggerHandler, callback: TriggerCallback) {
        self.slots[handler as usize] = Some(callback);
    }

    pub fn is_registered(&self, handler: TriggerHandler) -> bool {
        self.slots[handler as usize].is_some()
    }

    /// Fires the callback of `handler`. Returns `false` when none is registered.
    pub(crate) fn fire(&mut self, handler: TriggerHandler) -> bool {
        match self.slots[handler as usize].as_mut() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Default for TriggerCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TriggerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(TriggerHandler::iter().filter(|h| self.is_registered(*h)))
            .finish()
    }
}

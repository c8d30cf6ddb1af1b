pub mod rx_api;
pub mod rx_audio;
pub mod rx_cfg;
pub mod rx_edid;
pub mod rx_queue;
pub mod rx_sm;
pub mod rx_trigger;

pub use rx_api::*;
pub use rx_audio::{AcrValues, FrlCharRate, SamplingFrequency};
pub use rx_cfg::{Board, DispatchMode, ErrorStats, HdcpConfig, RxConfig};
pub use rx_edid::{Edid, EDID_SIZE, MAX_FRL_RATE};
pub use rx_queue::{EventMask, PendingEvents, EVENTS_PRIORITY_QUEUE};
pub use rx_sm::{Event, State, StateInfo};
pub use rx_trigger::{TriggerCallback, TriggerHandler};

use crate::{driver_client::HdcpStreamType, utils::RetryPolicy};
use strum_macros::EnumString;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString)]
pub enum Board {
    /// GTYE4 transceivers, needs the LPM/DFE switch for FRL.
    #[strum(serialize = "VCU118")]
    Vcu118,
    #[strum(serialize = "ZCU106")]
    Zcu106,
    #[strum(serialize = "VCK190")]
    Vck190,
}

/// How interrupt adapters hand state events to the state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, EnumString)]
pub enum DispatchMode {
    /// Dispatch inside the interrupt adapter.
    #[default]
    Immediate,
    /// Queueable events wait in the pending mask until the next poll. The others
    /// are still dispatched inside the adapter, so a non-queueable event can take
    /// effect before a queueable one that arrived earlier. Hardware arrival order
    /// is not kept across the two paths.
    Deferred,
}

#[derive(Debug, Copy, Clone)]
pub struct RxConfig {
    pub dispatch_mode: DispatchMode,
    /// Budget for waiting on the GT after a PHY reset pulse.
    pub phy_lock_retry: RetryPolicy,
    pub hdcp_enabled: bool,
    /// Select LPM below 12 Gbps and DFE at 12 Gbps when configuring FRL.
    pub frl_equalization_switch: bool,
    pub debug_prints: bool,
    pub trace_transitions: bool,
}

impl RxConfig {
    pub fn rx_cfg(board: Board) -> Self {
        match board {
            Board::Vcu118 => vcu118_cfg(),
            Board::Zcu106 | Board::Vck190 => default_cfg(),
        }
    }
}

impl Default for RxConfig {
    fn default() -> Self {
        default_cfg()
    }
}

fn default_cfg() -> RxConfig {
    RxConfig {
        dispatch_mode: DispatchMode::Immediate,
        phy_lock_retry: RetryPolicy::default(),
        hdcp_enabled: true,
        frl_equalization_switch: false,
        debug_prints: false,
        trace_transitions: false,
    }
}

fn vcu118_cfg() -> RxConfig {
    RxConfig {
        frl_equalization_switch: true,
        ..default_cfg()
    }
}

/// Upstream HDCP bookkeeping shared with a repeater topology.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct HdcpConfig {
    pub is_ready: bool,
    pub upstream_instance_binded: u8,
    pub upstream_instance_connected: bool,
    pub upstream_instance_stream_up: bool,
    pub is_repeater: bool,
    pub stream_type: HdcpStreamType,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ErrorStats {
    pub brdg_overflow_cnt: u32,
}

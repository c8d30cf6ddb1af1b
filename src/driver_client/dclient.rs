//! This module describes the drivers the receiver controller sits on top of.
//!
//! The HDMI RX subsystem, the video PHY and the interrupt controller are owned by
//! their own drivers. The controller only needs the handful of operations listed
//! here, so each one is a trait and the controller is generic over them. A board
//! support package implements them on top of its register accessors; tests
//! implement them with recording mocks.
//!
use super::dclient_code::*;
use crate::error::Result;

/// Attributes of the video stream the RX subsystem locked onto.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VideoStream {
    pub color_format: ColorFormat,
    pub color_depth: ColorDepth,
}

/// Operations of the HDMI RX subsystem used by the receiver controller.
pub trait RxSubsystem {
    /// Looks up the subsystem config for `dev_id` and initializes all sub-cores.
    fn cfg_initialize(&mut self, dev_id: u32) -> Result<()>;

    /// Cable state reported with the connect interrupt.
    fn is_stream_connected(&self) -> bool;
    fn set_hpd(&mut self, asserted: bool);
    /// Drops HPD long enough for the upstream source to notice, then raises it again.
    fn toggle_hpd(&mut self);
    fn set_edid(&mut self, edid: &[u8]);
    /// Highest FRL rate the core was built for, `0` meaning TMDS only.
    fn max_frl_rate(&self) -> u8;

    fn video_stream(&self) -> VideoStream;
    fn core_ppc(&self) -> PixelsPerClock;
    fn is_frl(&self) -> bool;
    /// FRL line rate in Gbps per lane.
    fn frl_line_rate(&self) -> u8;
    fn frl_lanes(&self) -> u8;
    fn tmds_clock_ratio(&self) -> u8;
    fn ref_clock_change_init(&mut self);
    fn set_stream(&mut self, ref_clk_hz: u32, line_rate_mbps: u64);
    fn is_link_status_err_max(&self) -> bool;
    fn set_frl_vclk_vcke_ratio(&mut self, ratio: u8);

    // Audio clock recovery
    fn audio_acr_cts(&self) -> u32;
    fn audio_acr_n(&self) -> u32;

    // HDCP
    fn hdcp_poll(&mut self);
    fn hdcp_set_capability(&mut self, protocol: HdcpProtocol);
    fn hdcp_protocol(&self) -> HdcpProtocol;
    fn hdcp_content_stream_type(&self) -> HdcpStreamType;
}

/// Operations of the video PHY used by the receiver controller.
pub trait VideoPhy {
    /// `true` once another owner (usually the transmitter) already brought the PHY up.
    fn is_ready(&self) -> bool;
    fn cfg_initialize(&mut self, dev_id: u32) -> Result<()>;

    fn ibufds_enable(&mut self, dir: Direction, enable: bool);
    fn mmcm_power_down(&mut self, dir: Direction, hold: bool);
    fn clkout1_obuftds_enable(&mut self, dir: Direction, enable: bool);
    /// Computes MMCM multiply/divide values for the negotiated timing.
    fn calc_mmcm_param(
        &mut self,
        ch: ChannelId,
        dir: Direction,
        ppc: PixelsPerClock,
        bpc: ColorDepth,
    ) -> Result<()>;
    fn mmcm_start(&mut self, dir: Direction);

    fn reset_gt_tx_rx(&mut self, ch: ChannelId, dir: Direction, hold: bool);
    fn is_rx_reset_done(&self) -> bool;

    fn hdmi21_config(&mut self, dir: Direction, line_rate_hz: u64, lanes: u8);
    fn hdmi20_config(&mut self, dir: Direction);
    fn rx_ref_clk_sel(&self) -> u8;
    fn rx_frl_ref_clk_sel(&self) -> u8;
    /// `true` selects LPM equalization, `false` selects DFE.
    fn set_rx_lpm(&mut self, ch: ChannelId, dir: Direction, lpm: bool);

    fn pll_type(&self, dir: Direction, ch: ChannelId) -> PllType;
    fn line_rate_hz(&self, ch: ChannelId) -> u64;
    fn rx_ref_clk_hz(&self) -> u32;
    fn set_rx_tmds_clock_ratio(&mut self, ratio: u8);
    fn rx_pll_state(&self) -> GtState;
    fn clk_det_freq_reset(&mut self, dir: Direction);
}

/// Attaches interrupt lines to their handlers.
pub trait InterruptController {
    fn connect(&mut self, vec_id: u32, irq: IrqSource) -> Result<()>;
    fn enable(&mut self, vec_id: u32);
}

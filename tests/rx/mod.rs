#![allow(dead_code)]

use std::{
    cell::Cell,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use xv_hdmi_rx::{
    driver_client::*,
    error::{Result, RxError},
    hdmi_rx::*,
};

pub type Controller = RxController<MockRxSs, MockPhy>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxSsCall {
    CfgInitialize(u32),
    SetHpd(bool),
    ToggleHpd,
    SetEdid(Vec<u8>),
    RefClockChangeInit,
    SetStream(u32, u64),
    SetFrlVclkVckeRatio(u8),
    HdcpPoll,
    HdcpSetCapability(HdcpProtocol),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhyCall {
    CfgInitialize(u32),
    IbufdsEnable(bool),
    MmcmPowerDown(bool),
    Clkout1Enable(bool),
    CalcMmcmParam(PixelsPerClock, ColorDepth),
    MmcmStart,
    ResetGt(ChannelId, bool),
    Hdmi21Config(u64, u8),
    Hdmi20Config,
    SetRxLpm(bool),
    SetTmdsClockRatio(u8),
    ClkDetFreqReset,
}

pub struct MockRxSs {
    pub init_fails: bool,
    pub connected: bool,
    pub stream: VideoStream,
    pub ppc: PixelsPerClock,
    pub frl: bool,
    pub frl_line_rate: u8,
    pub frl_lanes: u8,
    pub tmds_clock_ratio: u8,
    pub max_frl_rate: u8,
    pub link_err_max: bool,
    pub acr_n: u32,
    pub acr_cts: u32,
    pub hdcp_protocol: HdcpProtocol,
    pub hdcp_stream_type: HdcpStreamType,
    pub calls: Vec<RxSsCall>,
}

impl Default for MockRxSs {
    fn default() -> Self {
        MockRxSs {
            init_fails: false,
            connected: true,
            stream: VideoStream {
                color_format: ColorFormat::Rgb,
                color_depth: ColorDepth::Bpc10,
            },
            ppc: PixelsPerClock::Ppc4,
            frl: false,
            frl_line_rate: 6,
            frl_lanes: 4,
            tmds_clock_ratio: 0,
            max_frl_rate: 6,
            link_err_max: false,
            acr_n: 6144,
            acr_cts: 148_500,
            hdcp_protocol: HdcpProtocol::None,
            hdcp_stream_type: HdcpStreamType::Type0,
            calls: Vec::new(),
        }
    }
}

impl RxSubsystem for MockRxSs {
    fn cfg_initialize(&mut self, dev_id: u32) -> Result<()> {
        self.calls.push(RxSsCall::CfgInitialize(dev_id));
        if self.init_fails {
            return Err(RxError::InitFailed("mock rx subsystem"));
        }
        Ok(())
    }

    fn is_stream_connected(&self) -> bool {
        self.connected
    }

    fn set_hpd(&mut self, asserted: bool) {
        self.calls.push(RxSsCall::SetHpd(asserted));
    }

    fn toggle_hpd(&mut self) {
        self.calls.push(RxSsCall::ToggleHpd);
    }

    fn set_edid(&mut self, edid: &[u8]) {
        self.calls.push(RxSsCall::SetEdid(edid.to_vec()));
    }

    fn max_frl_rate(&self) -> u8 {
        self.max_frl_rate
    }

    fn video_stream(&self) -> VideoStream {
        self.stream
    }

    fn core_ppc(&self) -> PixelsPerClock {
        self.ppc
    }

    fn is_frl(&self) -> bool {
        self.frl
    }

    fn frl_line_rate(&self) -> u8 {
        self.frl_line_rate
    }

    fn frl_lanes(&self) -> u8 {
        self.frl_lanes
    }

    fn tmds_clock_ratio(&self) -> u8 {
        self.tmds_clock_ratio
    }

    fn ref_clock_change_init(&mut self) {
        self.calls.push(RxSsCall::RefClockChangeInit);
    }

    fn set_stream(&mut self, ref_clk_hz: u32, line_rate_mbps: u64) {
        self.calls.push(RxSsCall::SetStream(ref_clk_hz, line_rate_mbps));
    }

    fn is_link_status_err_max(&self) -> bool {
        self.link_err_max
    }

    fn set_frl_vclk_vcke_ratio(&mut self, ratio: u8) {
        self.calls.push(RxSsCall::SetFrlVclkVckeRatio(ratio));
    }

    fn audio_acr_cts(&self) -> u32 {
        self.acr_cts
    }

    fn audio_acr_n(&self) -> u32 {
        self.acr_n
    }

    fn hdcp_poll(&mut self) {
        self.calls.push(RxSsCall::HdcpPoll);
    }

    fn hdcp_set_capability(&mut self, protocol: HdcpProtocol) {
        self.calls.push(RxSsCall::HdcpSetCapability(protocol));
    }

    fn hdcp_protocol(&self) -> HdcpProtocol {
        self.hdcp_protocol
    }

    fn hdcp_content_stream_type(&self) -> HdcpStreamType {
        self.hdcp_stream_type
    }
}

pub struct MockPhy {
    pub ready: bool,
    pub init_fails: bool,
    pub mmcm_fails: bool,
    pub reset_done: bool,
    pub reset_polls: Cell<usize>,
    pub ref_clk_sel: u8,
    pub frl_ref_clk_sel: u8,
    pub pll_type: PllType,
    pub ch1_line_rate_hz: u64,
    pub cmn0_line_rate_hz: u64,
    pub ref_clk_hz: u32,
    pub pll_state: GtState,
    pub calls: Vec<PhyCall>,
}

impl Default for MockPhy {
    fn default() -> Self {
        MockPhy {
            ready: false,
            init_fails: false,
            mmcm_fails: false,
            reset_done: true,
            reset_polls: Cell::new(0),
            ref_clk_sel: 0,
            frl_ref_clk_sel: 0,
            pll_type: PllType::Cpll,
            ch1_line_rate_hz: 2_970_000_000,
            cmn0_line_rate_hz: 5_940_000_000,
            ref_clk_hz: 148_500_000,
            pll_state: GtState::Ready,
            calls: Vec::new(),
        }
    }
}

impl VideoPhy for MockPhy {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn cfg_initialize(&mut self, dev_id: u32) -> Result<()> {
        self.calls.push(PhyCall::CfgInitialize(dev_id));
        if self.init_fails {
            return Err(RxError::InitFailed("mock video phy"));
        }
        Ok(())
    }

    fn ibufds_enable(&mut self, _dir: Direction, enable: bool) {
        self.calls.push(PhyCall::IbufdsEnable(enable));
    }

    fn mmcm_power_down(&mut self, _dir: Direction, hold: bool) {
        self.calls.push(PhyCall::MmcmPowerDown(hold));
    }

    fn clkout1_obuftds_enable(&mut self, _dir: Direction, enable: bool) {
        self.calls.push(PhyCall::Clkout1Enable(enable));
    }

    fn calc_mmcm_param(
        &mut self,
        _ch: ChannelId,
        _dir: Direction,
        ppc: PixelsPerClock,
        bpc: ColorDepth,
    ) -> Result<()> {
        self.calls.push(PhyCall::CalcMmcmParam(ppc, bpc));
        if self.mmcm_fails {
            return Err(RxError::MmcmConfig);
        }
        Ok(())
    }

    fn mmcm_start(&mut self, _dir: Direction) {
        self.calls.push(PhyCall::MmcmStart);
    }

    fn reset_gt_tx_rx(&mut self, ch: ChannelId, _dir: Direction, hold: bool) {
        self.calls.push(PhyCall::ResetGt(ch, hold));
    }

    fn is_rx_reset_done(&self) -> bool {
        self.reset_polls.set(self.reset_polls.get() + 1);
        self.reset_done
    }

    fn hdmi21_config(&mut self, _dir: Direction, line_rate_hz: u64, lanes: u8) {
        self.calls.push(PhyCall::Hdmi21Config(line_rate_hz, lanes));
    }

    fn hdmi20_config(&mut self, _dir: Direction) {
        self.calls.push(PhyCall::Hdmi20Config);
    }

    fn rx_ref_clk_sel(&self) -> u8 {
        self.ref_clk_sel
    }

    fn rx_frl_ref_clk_sel(&self) -> u8 {
        self.frl_ref_clk_sel
    }

    fn set_rx_lpm(&mut self, _ch: ChannelId, _dir: Direction, lpm: bool) {
        self.calls.push(PhyCall::SetRxLpm(lpm));
    }

    fn pll_type(&self, _dir: Direction, _ch: ChannelId) -> PllType {
        self.pll_type
    }

    fn line_rate_hz(&self, ch: ChannelId) -> u64 {
        match ch {
            ChannelId::Cmn0 => self.cmn0_line_rate_hz,
            _ => self.ch1_line_rate_hz,
        }
    }

    fn rx_ref_clk_hz(&self) -> u32 {
        self.ref_clk_hz
    }

    fn set_rx_tmds_clock_ratio(&mut self, ratio: u8) {
        self.calls.push(PhyCall::SetTmdsClockRatio(ratio));
    }

    fn rx_pll_state(&self) -> GtState {
        self.pll_state
    }

    fn clk_det_freq_reset(&mut self, _dir: Direction) {
        self.calls.push(PhyCall::ClkDetFreqReset);
    }
}

#[derive(Default)]
pub struct MockIntc {
    pub fail_vec: Option<u32>,
    pub connected: Vec<(u32, IrqSource)>,
    pub enabled: Vec<u32>,
}

impl InterruptController for MockIntc {
    fn connect(&mut self, vec_id: u32, irq: IrqSource) -> Result<()> {
        if self.fail_vec == Some(vec_id) {
            return Err(RxError::InvalidParameter(format!("vector {}", vec_id)));
        }
        self.connected.push((vec_id, irq));
        Ok(())
    }

    fn enable(&mut self, vec_id: u32) {
        self.enabled.push(vec_id);
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn controller() -> Controller {
    controller_with(RxConfig::default())
}

pub fn controller_with(cfg: RxConfig) -> Controller {
    init_logger();
    RxController::new(MockRxSs::default(), MockPhy::default(), cfg)
}

/// Registers a callback on `handler` that counts its invocations.
pub fn count_trigger(ctrl: &mut Controller, handler: TriggerHandler) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let ctx = count.clone();
    ctrl.set_trigger_callback(handler, move || {
        ctx.fetch_add(1, Ordering::SeqCst);
    })
    .expect("register trigger");
    count
}

/// Registers callbacks on every `handlers` entry that append the handler to one log.
pub fn log_triggers(
    ctrl: &mut Controller,
    handlers: &[TriggerHandler],
) -> Arc<Mutex<Vec<TriggerHandler>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for handler in handlers {
        let ctx = log.clone();
        let h = *handler;
        ctrl.set_trigger_callback(h, move || ctx.lock().unwrap().push(h))
            .expect("register trigger");
    }
    log
}

/// Events leading from a fresh controller to `state`. `NoStream` has no path.
pub fn path_to(state: State) -> Option<Vec<Event>> {
    let path = match state {
        State::Disconnected => vec![],
        State::Connected => vec![Event::Connected],
        State::NoStream => return None,
        State::StreamInitialized => vec![Event::Connected, Event::StreamInit],
        State::StreamOn => vec![Event::Connected, Event::StreamUp],
        State::StreamOff => vec![Event::Connected, Event::StreamDown],
        State::PhyReset => vec![Event::Connected, Event::PhyReset],
        State::FrlConfig => vec![Event::Connected, Event::FrlConfig],
        State::FrlStart => vec![Event::Connected, Event::FrlStart],
        State::TmdsConfig => vec![Event::Connected, Event::TmdsConfig],
    };
    Some(path)
}

pub fn drive_to(ctrl: &mut Controller, state: State) {
    let path = path_to(state).expect("state reachable by events");
    path.into_iter().for_each(|e| ctrl.send_event(e));
    assert_eq!(ctrl.current_state(), state);
    ctrl.phy_mut().calls.clear();
    ctrl.rx_ss_mut().calls.clear();
}

pub fn phy_calls(ctrl: &Controller) -> Vec<PhyCall> {
    ctrl.phy().calls.clone()
}

pub fn rx_ss_calls(ctrl: &Controller) -> Vec<RxSsCall> {
    ctrl.rx_ss().calls.clone()
}

/// State whose entry action produced `call`, for the calls that identify one.
pub fn entered_by(call: &PhyCall) -> Option<State> {
    match call {
        PhyCall::IbufdsEnable(false) => Some(State::Disconnected),
        PhyCall::IbufdsEnable(true) => Some(State::Connected),
        PhyCall::CalcMmcmParam(..) => Some(State::StreamInitialized),
        PhyCall::Clkout1Enable(true) => Some(State::StreamOn),
        PhyCall::MmcmPowerDown(_) => Some(State::StreamOff),
        PhyCall::ResetGt(..) => Some(State::PhyReset),
        PhyCall::Hdmi21Config(..) => Some(State::FrlConfig),
        PhyCall::Hdmi20Config => Some(State::TmdsConfig),
        _ => None,
    }
}

pub fn entered_states(ctrl: &Controller) -> Vec<State> {
    ctrl.phy().calls.iter().filter_map(entered_by).collect()
}

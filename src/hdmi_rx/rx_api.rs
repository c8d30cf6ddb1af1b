use super::{rx_audio::*, rx_cfg::*, rx_edid::Edid, rx_queue::*, rx_sm::*, rx_trigger::*};
use crate::{
    driver_client::*,
    error::*,
    rx_log, sm_log,
    utils::{wait_until, SM_LOG_TARGET},
};
use std::sync::Arc;

/// Receiver controller of one HDMI RX core.
///
/// Owns the RX subsystem and video PHY drivers and sequences them through the
/// receiver state machine. Interrupt service routines forward hardware events with
/// [`RxController::handle_rx_ss_event`] and [`RxController::handle_phy_event`]; the
/// main loop calls [`RxController::poll`]. A context that cannot borrow the
/// controller queues events through [`RxController::pending_handle`].
pub struct RxController<S: RxSubsystem, P: VideoPhy> {
    rx_ss: S,
    phy: P,
    cfg: RxConfig,
    state_info: StateInfo,
    pending: Arc<PendingEvents>,
    stream_init_fail: bool,
    triggers: TriggerCallbacks,
    hdcp: HdcpConfig,
    error_stats: ErrorStats,
    acr: AcrValues,
    edid: Option<Edid>,
}

impl<S: RxSubsystem, P: VideoPhy> RxController<S, P> {
    /// Builds a controller in the Disconnected state. Nothing touches the hardware
    /// until [`RxController::initialize`] runs.
    pub fn new(rx_ss: S, phy: P, cfg: RxConfig) -> Self {
        RxController {
            rx_ss,
            phy,
            cfg,
            state_info: StateInfo::default(),
            pending: Arc::new(PendingEvents::default()),
            stream_init_fail: false,
            triggers: TriggerCallbacks::new(),
            hdcp: HdcpConfig::default(),
            error_stats: ErrorStats::default(),
            acr: AcrValues::default(),
            edid: None,
        }
    }

    /// EDID pushed to the RX subsystem by [`RxController::initialize`], after its
    /// Max_FRL_Rate is patched to what the core supports.
    pub fn set_edid(&mut self, edid: Edid) {
        self.edid = Some(edid);
    }

    /// EDID as last patched by [`RxController::initialize`].
    pub fn edid(&self) -> Option<&Edid> {
        self.edid.as_ref()
    }

    /// Brings up the receiver.
    ///
    /// Initializes the RX subsystem, connects and enables its interrupt vector and,
    /// with HDCP enabled, the HDCP vectors present in `dcfg`. A supplied EDID is
    /// patched with the core's Max_FRL_Rate and pushed to the subsystem. The video
    /// PHY is only initialized (and its vector connected) when it isn't ready yet,
    /// since a transmitter may share it.
    ///
    /// Leaves the state machine in Disconnected with nothing pending.
    ///
    /// # Errors
    /// * [`RxError::DeviceNotFound`] when the RX subsystem fails to initialize.
    /// * [`RxError::InterruptSetup`] when a vector can't be connected.
    /// * [`RxError::InitFailed`] when the video PHY fails to initialize.
    pub fn initialize<I: InterruptController>(
        &mut self,
        dcfg: &DriverConfig,
        intc: &mut I,
    ) -> Result<()> {
        log::info!("Initializing HDMI RX subsystem {}", dcfg.rx_ss_dev_id);
        self.rx_ss.cfg_initialize(dcfg.rx_ss_dev_id).map_err(|e| {
            log::error!("HDMI RX subsystem initialization failed: {}", e);
            RxError::DeviceNotFound {
                device: "HDMI RX subsystem",
                id: dcfg.rx_ss_dev_id,
            }
        })?;

        let intr = dcfg.intr();
        let mut vectors = vec![(intr.hdmi_rx_ss, IrqSource::HdmiRxSs)];
        if self.cfg.hdcp_enabled {
            vectors.extend(
                [
                    (intr.hdcp14, IrqSource::Hdcp14),
                    (intr.hdcp14_timer, IrqSource::Hdcp14Timer),
                    (intr.hdcp22_timer, IrqSource::Hdcp22Timer),
                ]
                .into_iter()
                .filter_map(|(vec_id, irq)| vec_id.map(|id| (id, irq))),
            );
        }
        for (vec_id, irq) in vectors.iter() {
            log::debug!("Connect {:?} to vector {:#X}", irq, vec_id);
            intc.connect(*vec_id, *irq)
                .map_err(|_| RxError::InterruptSetup {
                    vec_id: *vec_id,
                    irq: *irq,
                })?;
        }
        vectors.iter().for_each(|(vec_id, _)| intc.enable(*vec_id));

        if let Some(edid) = self.edid.as_mut() {
            edid.set_max_frl_rate(self.rx_ss.max_frl_rate())?;
            self.rx_ss.set_edid(edid.as_bytes());
        }

        if !self.phy.is_ready() {
            log::info!("Initializing video PHY {}", dcfg.vphy_dev_id);
            intc.connect(intr.video_phy, IrqSource::VideoPhy)
                .map_err(|_| RxError::InterruptSetup {
                    vec_id: intr.video_phy,
                    irq: IrqSource::VideoPhy,
                })?;
            self.phy.cfg_initialize(dcfg.vphy_dev_id).map_err(|e| {
                log::error!("Video PHY initialization failed: {}", e);
                RxError::InitFailed("video PHY")
            })?;
            intc.enable(intr.video_phy);
        } else {
            log::info!("Video PHY is already ready, skipping its initialization");
        }

        if self.cfg.hdcp_enabled {
            log::info!("Initializing HDCP for the receiver");
            self.hdcp = HdcpConfig::default();
            self.hdcp.upstream_instance_binded += 1;
            self.hdcp.is_ready = true;
        }

        self.stream_init_fail = false;
        self.state_info.reset();
        self.pending.clear_all();

        Ok(())
    }

    /// Registers `callback` for `handler`, replacing any earlier registration.
    ///
    /// The closure carries its own context. It runs on the thread that dispatches
    /// the triggering event, so it must not call back into the controller.
    ///
    /// # Errors
    /// [`RxError::InvalidParameter`] for an HDCP handler while HDCP is disabled.
    pub fn set_trigger_callback<F>(&mut self, handler: TriggerHandler, callback: F) -> Result<()>
    where
        F: FnMut() + Send + 'static,
    {
        if handler.is_hdcp() && !self.cfg.hdcp_enabled {
            return Err(RxError::InvalidParameter(format!(
                "{} needs HDCP to be enabled",
                handler
            )));
        }
        self.triggers.set(handler, Box::new(callback));
        Ok(())
    }

    /// `true` when a callback is installed for `handler`.
    pub fn is_trigger_registered(&self, handler: TriggerHandler) -> bool {
        self.triggers.is_registered(handler)
    }

    // ==== events ====

    /// Dispatches `event` right away.
    pub fn send_event(&mut self, event: Event) {
        self.process_event(event);
    }

    /// Records `event` for the next [`RxController::poll`].
    ///
    /// # Errors
    /// [`RxError::EventNotQueueable`] for kinds outside [`EVENTS_PRIORITY_QUEUE`].
    pub fn push_event(&self, event: Event) -> Result<()> {
        self.pending.push(event)
    }

    /// Shared handle on the pending-event mask. Events pushed through it are
    /// dispatched by the next [`RxController::poll`], so an interrupt context can
    /// queue events while the main loop holds the controller.
    pub fn pending_handle(&self) -> Arc<PendingEvents> {
        Arc::clone(&self.pending)
    }

    /// Main loop tick: drains the pending events in priority order.
    pub fn poll(&mut self) {
        self.process_pending_events();
    }

    /// Dispatches every pending event once, in [`EVENTS_PRIORITY_QUEUE`] order.
    pub fn process_pending_events(&mut self) {
        for (i, event) in EVENTS_PRIORITY_QUEUE.iter().enumerate() {
            let bit = EventMask::from_bits_truncate(1 << i);
            if self.pending.pending().contains(bit) {
                self.process_event(*event);
                self.pending.clear(bit);
            }
        }
    }

    /// Events queued and not yet dispatched.
    pub fn pending_events(&self) -> EventMask {
        self.pending.pending()
    }

    fn route_event(&mut self, event: Event) {
        if self.cfg.dispatch_mode == DispatchMode::Deferred && self.pending.push(event).is_ok() {
            return;
        }
        self.process_event(event);
    }

    fn process_event(&mut self, event: Event) {
        let current = self.state_info.current;
        let next = match current.next_state(event) {
            Some(next) => next,
            None => {
                log::trace!(target: SM_LOG_TARGET, "Event {} ignored in state {}", event, current);
                return;
            }
        };

        sm_log!(self.cfg.trace_transitions, event, current, next);
        self.state_info.previous = current;
        let entered = self.enter_state(next);
        if next == State::StreamInitialized {
            self.stream_init_fail = entered.is_err();
        }
        self.state_info.current = match entered {
            Ok(()) => next,
            Err(e) => {
                log::warn!("Entering state {} failed: {}, state set to {}", next, e, State::StreamOff);
                State::StreamOff
            }
        };
    }

    fn enter_state(&mut self, state: State) -> Result<()> {
        match state {
            State::Disconnected => self.enter_disconnected(),
            State::Connected => self.enter_connected(),
            State::NoStream => {}
            State::StreamInitialized => return self.enter_stream_initialized(),
            State::StreamOn => self.enter_stream_on(),
            State::StreamOff => self.enter_stream_off(),
            State::PhyReset => self.enter_phy_reset(),
            State::FrlConfig => self.enter_frl_config(),
            State::FrlStart => rx_log!(self.cfg.debug_prints, "Hdmi Rx : Frl Start"),
            State::TmdsConfig => self.enter_tmds_config(),
        }
        Ok(())
    }

    fn enter_disconnected(&mut self) {
        self.phy.set_rx_tmds_clock_ratio(0);
        self.phy.ibufds_enable(Direction::Rx, false);
        self.triggers.fire(TriggerHandler::ConnectionChange);
        if self.cfg.hdcp_enabled {
            self.hdcp.upstream_instance_connected = false;
            self.hdcp.upstream_instance_stream_up = false;
        }
    }

    fn enter_connected(&mut self) {
        self.phy.ibufds_enable(Direction::Rx, true);
        self.triggers.fire(TriggerHandler::ConnectionChange);
        if self.cfg.hdcp_enabled {
            self.hdcp.upstream_instance_connected = true;
        }
    }

    fn enter_stream_initialized(&mut self) -> Result<()> {
        let stream = self.rx_ss.video_stream();
        // YUV 4:2:2 is carried over 8 bits whatever the stream depth.
        let bpc = match stream.color_format {
            ColorFormat::YCrCb422 => ColorDepth::Bpc8,
            _ => stream.color_depth,
        };
        self.phy
            .calc_mmcm_param(ChannelId::Ch1, Direction::Rx, self.rx_ss.core_ppc(), bpc)
            .map_err(|e| {
                rx_log!(self.cfg.debug_prints, "MMCM configuration failed: {}", e);
                RxError::MmcmConfig
            })?;
        self.phy.mmcm_start(Direction::Rx);
        Ok(())
    }

    fn enter_stream_on(&mut self) {
        if !self.rx_ss.is_frl() {
            self.phy.clkout1_obuftds_enable(Direction::Rx, true);
        }
        self.triggers.fire(TriggerHandler::StreamOn);
        if self.cfg.hdcp_enabled {
            self.hdcp.upstream_instance_stream_up = true;
        }
    }

    fn enter_stream_off(&mut self) {
        if !self.rx_ss.is_frl() {
            self.phy.mmcm_power_down(Direction::Rx, false);
            self.phy.clkout1_obuftds_enable(Direction::Rx, false);
        }
        self.error_stats.brdg_overflow_cnt = 0;
        self.triggers.fire(TriggerHandler::StreamOff);
        if self.cfg.hdcp_enabled {
            self.hdcp.upstream_instance_stream_up = false;
        }
    }

    fn enter_phy_reset(&mut self) {
        rx_log!(self.cfg.debug_prints, "Hdmi Rx : PhyReset");
        self.phy.reset_gt_tx_rx(ChannelId::Cha, Direction::Rx, false);

        let phy = &self.phy;
        match wait_until(self.cfg.phy_lock_retry, || phy.is_rx_reset_done()) {
            Ok(attempts) => log::trace!("RX GT reset done after {} polls", attempts),
            Err(_) => log::warn!(
                "{}",
                RxError::PhyLockTimeout {
                    attempts: self.cfg.phy_lock_retry.max_attempts
                }
            ),
        }
    }

    fn enter_frl_config(&mut self) {
        let rate = self.rx_ss.frl_line_rate();
        let lanes = self.rx_ss.frl_lanes();
        rx_log!(
            self.cfg.debug_prints,
            "Hdmi Rx : FrlConfig {} Gbps x {} lanes",
            rate,
            lanes
        );

        self.triggers.fire(TriggerHandler::ClkSrcConfig);
        if self.phy.rx_ref_clk_sel() != self.phy.rx_frl_ref_clk_sel() {
            self.phy.ibufds_enable(Direction::Rx, true);
        }
        if self.cfg.frl_equalization_switch {
            // LPM below 12 Gbps, DFE at 12 Gbps
            self.phy.set_rx_lpm(ChannelId::Cha, Direction::Rx, rate != 12);
        }
        self.phy
            .hdmi21_config(Direction::Rx, rate as u64 * 1_000_000_000, lanes);
        self.triggers.fire(TriggerHandler::ClkSrcSel);
    }

    fn enter_tmds_config(&mut self) {
        self.triggers.fire(TriggerHandler::ClkSrcConfig);
        self.phy.hdmi20_config(Direction::Rx);
        self.triggers.fire(TriggerHandler::ClkSrcSel);
        self.rx_ss.set_frl_vclk_vcke_ratio(0);
    }

    // ==== interrupt routing ====

    /// Entry point for the RX subsystem interrupt callbacks.
    ///
    /// State interrupts (connect, stream, PHY reset, FRL and TMDS config) go to the
    /// state machine as selected by [`RxConfig::dispatch_mode`]. The others update
    /// counters, pulse the PLL reset, run HDCP bookkeeping or fire their trigger
    /// callback directly.
    pub fn handle_rx_ss_event(&mut self, handler: RxSsHandler) {
        match handler {
            RxSsHandler::Connect => self.on_connect(),
            RxSsHandler::BrdgOverflow => {
                self.error_stats.brdg_overflow_cnt =
                    self.error_stats.brdg_overflow_cnt.wrapping_add(1);
            }
            RxSsHandler::Aux => {
                self.triggers.fire(TriggerHandler::AuxEvent);
            }
            RxSsHandler::Aud => {
                rx_log!(self.cfg.debug_prints, "RX Audio Event");
                self.triggers.fire(TriggerHandler::AudioConfig);
            }
            RxSsHandler::LinkStatus => {
                rx_log!(self.cfg.debug_prints, "Link Status");
                if self.state_info.current != State::Disconnected {
                    if let Err(e) = self.pulse_pll_reset() {
                        log::trace!("{}", e);
                    }
                }
            }
            RxSsHandler::Ddc => rx_log!(self.cfg.debug_prints, "Rx Ddc Event"),
            RxSsHandler::StreamDown => self.on_state_event(Event::StreamDown),
            RxSsHandler::StreamInit => self.on_state_event(Event::StreamInit),
            RxSsHandler::StreamUp => self.on_state_event(Event::StreamUp),
            RxSsHandler::PhyReset => self.on_state_event(Event::PhyReset),
            RxSsHandler::FrlConfig => self.on_state_event(Event::FrlConfig),
            RxSsHandler::FrlStart => self.on_state_event(Event::FrlStart),
            RxSsHandler::TmdsConfig => self.on_state_event(Event::TmdsConfig),
            RxSsHandler::VfpChange => {
                self.triggers.fire(TriggerHandler::VrrVfpEvent);
            }
            RxSsHandler::VrrReady => {
                self.triggers.fire(TriggerHandler::VtemEvent);
            }
            RxSsHandler::DynHdr => {
                self.triggers.fire(TriggerHandler::DynHdrEvent);
            }
            RxSsHandler::HdcpStreamManageRequest
            | RxSsHandler::HdcpAuthenticated
            | RxSsHandler::HdcpUnauthenticated
            | RxSsHandler::HdcpEncryptionUpdate => self.on_hdcp_event(handler),
        }
    }

    /// Entry point for the video PHY callbacks of the receive side.
    ///
    /// RX init restarts the reference clock detection and hands the TMDS clock
    /// ratio to the PHY. RX ready reports the reference clock and line rate (in
    /// Mbps) to the RX subsystem.
    pub fn handle_phy_event(&mut self, handler: PhyHandler) {
        match handler {
            PhyHandler::RxInit => {
                rx_log!(self.cfg.debug_prints, "PHY RX init");
                self.rx_ss.ref_clock_change_init();
                self.phy.set_rx_tmds_clock_ratio(self.rx_ss.tmds_clock_ratio());
            }
            PhyHandler::RxReady => {
                let ref_clk = self.phy.rx_ref_clk_hz();
                let line_rate = self.line_rate();
                rx_log!(self.cfg.debug_prints, "PHY RX ready, ref clk {} Hz", ref_clk);
                self.rx_ss.set_stream(ref_clk, line_rate / 1_000_000);
            }
        }
    }

    fn on_connect(&mut self) {
        if self.rx_ss.is_stream_connected() {
            rx_log!(self.cfg.debug_prints, "Connected");
            self.route_event(Event::Connected);
        } else {
            rx_log!(self.cfg.debug_prints, "Disconnected");
            self.error_stats.brdg_overflow_cnt = 0;
            self.route_event(Event::Disconnected);
        }
    }

    fn on_state_event(&mut self, event: Event) {
        rx_log!(
            self.cfg.debug_prints,
            "Rx {}, State: {}",
            event,
            self.state_info.current
        );
        self.route_event(event);
    }

    fn on_hdcp_event(&mut self, handler: RxSsHandler) {
        if !self.cfg.hdcp_enabled {
            log::trace!("{:?} ignored, HDCP disabled", handler);
            return;
        }
        match handler {
            RxSsHandler::HdcpStreamManageRequest => {
                self.hdcp.stream_type = self.rx_ss.hdcp_content_stream_type();
                rx_log!(
                    self.cfg.debug_prints,
                    "Stream-Manage-Req (Stream = {:?})",
                    self.hdcp.stream_type
                );
                self.triggers.fire(TriggerHandler::HdcpSetContentStreamType);
            }
            RxSsHandler::HdcpAuthenticated => {
                match self.rx_ss.hdcp_protocol() {
                    HdcpProtocol::Hdcp22 => log::info!("HDCP 2.2 upstream authenticated"),
                    HdcpProtocol::Hdcp14 => log::info!("HDCP 1.4 upstream authenticated"),
                    _ => {}
                }
                self.hdcp.stream_type = self.rx_ss.hdcp_content_stream_type();
                self.triggers.fire(TriggerHandler::HdcpForceBlanking);
            }
            RxSsHandler::HdcpUnauthenticated => {
                rx_log!(self.cfg.debug_prints, "Hdcp-Unauthenticated");
                self.hdcp.stream_type = HdcpStreamType::Type0;
                self.triggers.fire(TriggerHandler::HdcpForceBlanking);
            }
            RxSsHandler::HdcpEncryptionUpdate => {
                rx_log!(self.cfg.debug_prints, "Hdcp-Encryption-Update");
                self.hdcp.stream_type = self.rx_ss.hdcp_content_stream_type();
                self.triggers.fire(TriggerHandler::HdcpForceBlanking);
            }
            _ => {}
        }
    }

    // ==== HDCP ====

    /// Runs the HDCP state machines of the RX subsystem. Call from the main loop.
    pub fn hdcp_poll(&mut self) {
        if self.cfg.hdcp_enabled {
            self.rx_ss.hdcp_poll();
        }
    }

    /// Sets the upstream HDCP capability and toggles HPD so the source notices.
    /// Does nothing until HDCP is initialized.
    pub fn hdcp_set_capability(&mut self, protocol: HdcpProtocol) {
        if self.hdcp.is_ready {
            self.rx_ss.hdcp_set_capability(protocol);
            self.rx_ss.toggle_hpd();
        }
    }

    /// Content stream type from the last HDCP update.
    pub fn hdcp_stream_type(&self) -> HdcpStreamType {
        self.hdcp.stream_type
    }

    // ==== actions ====

    /// Drives the hot-plug detect line.
    ///
    /// Asserting raises HPD and enables the RX input clock buffer. Deasserting
    /// powers the MMCM down and stops clock forwarding and the input buffer before
    /// HPD drops.
    pub fn set_hpd(&mut self, asserted: bool) {
        if asserted {
            self.rx_ss.set_hpd(true);
            self.phy.ibufds_enable(Direction::Rx, true);
        } else {
            self.phy.mmcm_power_down(Direction::Rx, false);
            self.phy.clkout1_obuftds_enable(Direction::Rx, false);
            self.phy.ibufds_enable(Direction::Rx, false);
            self.rx_ss.set_hpd(false);
        }
    }

    /// Pulses the RX PLL reset once the link error counter saturated.
    ///
    /// # Errors
    /// [`RxError::PllResetRejected`] while the counter is below its maximum or the
    /// RX GT is not ready.
    pub fn pulse_pll_reset(&mut self) -> Result<()> {
        if self.rx_ss.is_link_status_err_max() && self.phy.rx_pll_state() == GtState::Ready {
            self.phy.clk_det_freq_reset(Direction::Rx);
            Ok(())
        } else {
            Err(RxError::PllResetRejected)
        }
    }

    /// Forwards (or stops forwarding) the TMDS clock on CLKOUT1.
    pub fn tmds_clk_enable(&mut self, enable: bool) {
        self.phy.clkout1_obuftds_enable(Direction::Rx, enable);
    }

    // ==== queries ====

    pub fn is_stream_on(&self) -> bool {
        self.state_info.current == State::StreamOn
    }

    pub fn is_connected(&self) -> bool {
        self.state_info.current != State::Disconnected
    }

    /// RX line rate in Hz, read from the PLL that clocks channel 1.
    pub fn line_rate(&self) -> u64 {
        let ch = match self.phy.pll_type(Direction::Rx, ChannelId::Ch1) {
            PllType::Cpll => ChannelId::Ch1,
            _ => ChannelId::Cmn0,
        };
        self.phy.line_rate_hz(ch)
    }

    fn read_acr(&mut self) -> AcrValues {
        self.acr = AcrValues {
            n: self.rx_ss.audio_acr_n(),
            cts: self.rx_ss.audio_acr_cts(),
        };
        self.acr
    }

    /// Audio sample frequency of an FRL stream, `Unknown` in TMDS mode.
    pub fn frl_audio_sample_frequency(&mut self) -> SamplingFrequency {
        let acr = self.read_acr();
        if !self.rx_ss.is_frl() {
            return SamplingFrequency::Unknown;
        }
        frl_sample_frequency(FrlCharRate::from_line_rate(self.rx_ss.frl_line_rate()), acr)
    }

    /// Audio sample frequency of a TMDS stream, `Unknown` in FRL mode.
    pub fn tmds_audio_sample_frequency(&mut self) -> SamplingFrequency {
        let acr = self.read_acr();
        if self.rx_ss.is_frl() {
            return SamplingFrequency::Unknown;
        }
        tmds_sample_frequency(
            self.phy.rx_ref_clk_hz(),
            self.rx_ss.tmds_clock_ratio() != 0,
            acr,
        )
    }

    /// `true` when the source changed N since the last read, caching the new value.
    pub fn acr_n_changed(&mut self) -> bool {
        let n = self.rx_ss.audio_acr_n();
        if n != self.acr.n {
            self.acr.n = n;
            return true;
        }
        false
    }

    pub fn current_state(&self) -> State {
        self.state_info.current()
    }

    pub fn previous_state(&self) -> State {
        self.state_info.previous()
    }

    pub fn state_info(&self) -> StateInfo {
        self.state_info
    }

    /// `true` when the last stream init failed its MMCM setup.
    pub fn stream_init_failed(&self) -> bool {
        self.stream_init_fail
    }

    pub fn error_stats(&self) -> ErrorStats {
        self.error_stats
    }

    pub fn hdcp_config(&self) -> HdcpConfig {
        self.hdcp
    }

    pub fn config(&self) -> &RxConfig {
        &self.cfg
    }

    pub fn rx_ss(&self) -> &S {
        &self.rx_ss
    }

    pub fn rx_ss_mut(&mut self) -> &mut S {
        &mut self.rx_ss
    }

    pub fn phy(&self) -> &P {
        &self.phy
    }

    pub fn phy_mut(&mut self) -> &mut P {
        &mut self.phy
    }
}

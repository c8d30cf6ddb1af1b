//! This module provides the hardware codes shared by the receiver controller and the
//! RX subsystem / video PHY drivers it talks to.
use strum_macros::{EnumCount, EnumIter};

/// Transceiver direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Rx,
    Tx,
}

/// GT channel selector. `Cha` addresses all data channels at once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelId {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
    Cha,
    Cmn0,
    Cmn1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PllType {
    Cpll,
    Qpll0,
    Qpll1,
    Lcpll,
    Rpll,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GtState {
    Idle,
    Reset,
    Lock,
    Ready,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorFormat {
    Rgb,
    YCrCb444,
    YCrCb422,
    YCrCb420,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorDepth {
    Bpc8 = 8,
    Bpc10 = 10,
    Bpc12 = 12,
    Bpc16 = 16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelsPerClock {
    Ppc1 = 1,
    Ppc2 = 2,
    Ppc4 = 4,
    Ppc8 = 8,
}

/// Interrupt lines the controller attaches during initialization.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IrqSource {
    HdmiRxSs,
    Hdcp14,
    Hdcp14Timer,
    Hdcp22Timer,
    VideoPhy,
}

/// Interrupt callbacks raised by the HDMI RX subsystem.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, EnumCount)]
pub enum RxSsHandler {
    Connect,
    BrdgOverflow,
    Aux,
    Aud,
    LinkStatus,
    Ddc,
    StreamDown,
    StreamInit,
    StreamUp,
    PhyReset,
    FrlConfig,
    FrlStart,
    TmdsConfig,
    VfpChange,
    VrrReady,
    DynHdr,
    HdcpStreamManageRequest,
    HdcpAuthenticated,
    HdcpUnauthenticated,
    HdcpEncryptionUpdate,
}

/// Interrupt callbacks raised by the video PHY for the receive side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
pub enum PhyHandler {
    RxInit,
    RxReady,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HdcpProtocol {
    None,
    Hdcp14,
    Hdcp22,
    Both,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HdcpStreamType {
    #[default]
    Type0,
    Type1,
}

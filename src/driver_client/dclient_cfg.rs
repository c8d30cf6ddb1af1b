/// Interrupt vector ids wired to the receiver. HDCP vectors are absent when the
/// corresponding cipher isn't instantiated in the design.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IntrVecIds {
    pub hdmi_rx_ss: u32,
    pub hdcp14: Option<u32>,
    pub hdcp14_timer: Option<u32>,
    pub hdcp22_timer: Option<u32>,
    pub video_phy: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Platform {
    /// Zynq UltraScale+ with the GIC.
    Zcu106,
    /// MicroBlaze with the AXI INTC.
    Vcu118,
}

/// The [`DriverConfig`] binds one receiver to its RX subsystem, video PHY and
/// interrupt lines.
#[derive(Copy, Clone, Debug)]
pub struct DriverConfig {
    pub(crate) rx_ss_dev_id: u32,
    pub(crate) vphy_dev_id: u32,
    pub(crate) intr: IntrVecIds,
}

impl DriverConfig {
    /// Create a new driver config.
    pub fn driver_client_cfg(platform: Platform) -> Self {
        match platform {
            Platform::Zcu106 => zcu106_cfg(),
            Platform::Vcu118 => vcu118_cfg(),
        }
    }

    /// Config for designs whose ids don't follow a reference platform.
    pub fn custom(rx_ss_dev_id: u32, vphy_dev_id: u32, intr: IntrVecIds) -> Self {
        DriverConfig {
            rx_ss_dev_id,
            vphy_dev_id,
            intr,
        }
    }

    pub fn intr(&self) -> IntrVecIds {
        self.intr
    }
}

fn zcu106_cfg() -> DriverConfig {
    DriverConfig {
        rx_ss_dev_id: 0,
        vphy_dev_id: 0,
        intr: IntrVecIds {
            hdmi_rx_ss: 0x5A,
            hdcp14: Some(0x5B),
            hdcp14_timer: Some(0x5C),
            hdcp22_timer: Some(0x5D),
            video_phy: 0x59,
        },
    }
}

fn vcu118_cfg() -> DriverConfig {
    DriverConfig {
        rx_ss_dev_id: 0,
        vphy_dev_id: 0,
        intr: IntrVecIds {
            hdmi_rx_ss: 2,
            hdcp14: None,
            hdcp14_timer: None,
            hdcp22_timer: Some(3),
            video_phy: 1,
        },
    }
}

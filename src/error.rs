use crate::{driver_client::IrqSource, hdmi_rx::Event};
use packed_struct::PackingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RxError>;

#[derive(Error, Debug)]
pub enum RxError {
    #[error("{device} device with id {id} not found")]
    DeviceNotFound { device: &'static str, id: u32 },
    #[error("failed to initialize {0}")]
    InitFailed(&'static str),
    #[error("failed to connect interrupt vector {vec_id:#X?} for {irq:?}")]
    InterruptSetup { vec_id: u32, irq: IrqSource },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("event {0} can't be queued, dispatch it directly")]
    EventNotQueueable(Event),
    #[error("mmcm configuration failed")]
    MmcmConfig,
    #[error("phy didn't lock after {attempts} attempts")]
    PhyLockTimeout { attempts: usize },
    #[error("pll reset rejected: link error not at max or rx gt not ready")]
    PllResetRejected,
    #[error("edid must be 256 bytes, got {0}")]
    InvalidEdidLength(usize),
    #[error("failed to pack edid field")]
    Packing(#[from] PackingError),
}

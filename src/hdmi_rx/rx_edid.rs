use crate::error::{Result, RxError};
use packed_struct::prelude::*;

pub const EDID_BLOCK_SIZE: usize = 128;
pub const EDID_SIZE: usize = 2 * EDID_BLOCK_SIZE;

/// Byte of the HDMI Forum data block in the extension block carrying Max_FRL_Rate.
const MAX_FRL_RATE_OFFSET: usize = 189;
/// Highest Max_FRL_Rate code: 12 Gbps on 4 lanes.
pub const MAX_FRL_RATE: u8 = 6;

/// Max_FRL_Rate byte of the HDMI Forum data block.
#[derive(PackedStruct, Debug, Copy, Clone)]
#[packed_struct(bit_numbering = "msb0")]
pub struct FrlRateField {
    #[packed_field(bits = "0..=3")]
    pub max_frl_rate: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "4..=7")]
    pub flags: Integer<u8, packed_bits::Bits<4>>,
}

/// Base block plus one CTA extension block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edid([u8; EDID_SIZE]);

impl Edid {
    pub fn new(bytes: [u8; EDID_SIZE]) -> Self {
        Edid(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; EDID_SIZE] = bytes
            .try_into()
            .map_err(|_| RxError::InvalidEdidLength(bytes.len()))?;
        Ok(Edid(arr))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn max_frl_rate(&self) -> Result<u8> {
        let field = FrlRateField::unpack(&[self.0[MAX_FRL_RATE_OFFSET]])?;
        Ok(*field.max_frl_rate)
    }

    /// Advertises `rate` (`0` = TMDS only, `6` = 12 Gbps on 4 lanes) and refreshes
    /// the extension block checksum. Rates above the maximum are clamped.
    pub fn set_max_frl_rate(&mut self, rate: u8) -> Result<()> {
        let mut field = FrlRateField::unpack(&[self.0[MAX_FRL_RATE_OFFSET]])?;
        field.max_frl_rate = rate.min(MAX_FRL_RATE).into();
        self.0[MAX_FRL_RATE_OFFSET] = field.pack()?[0];
        self.update_checksum(1);
        log::debug!(
            "EDID max FRL rate {} (byte {:#04X}, checksum {:#04X})",
            rate.min(MAX_FRL_RATE),
            self.0[MAX_FRL_RATE_OFFSET],
            self.0[EDID_SIZE - 1]
        );
        Ok(())
    }

    pub fn is_checksum_valid(&self, block: usize) -> bool {
        self.block(block)
            .iter()
            .fold(0u8, |acc, b| acc.wrapping_add(*b))
            == 0
    }

    fn block(&self, block: usize) -> &[u8] {
        &self.0[block * EDID_BLOCK_SIZE..(block + 1) * EDID_BLOCK_SIZE]
    }

    fn update_checksum(&mut self, block: usize) {
        let last = (block + 1) * EDID_BLOCK_SIZE - 1;
        let sum = self.0[block * EDID_BLOCK_SIZE..last]
            .iter()
            .fold(0u8, |acc, b| acc.wrapping_add(*b));
        self.0[last] = 0u8.wrapping_sub(sum);
    }
}

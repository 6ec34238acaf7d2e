use crate::addressing::{Rate, addressed_indices, capacity_units};
use crate::carrier::Carrier;
use crate::error::Result;
use crate::framing::frame;

use super::{Codec, ensure_capacity, extract_lsb};

/// LSB 替换：把目标比特直接写入被寻址单元的最低有效位。
#[derive(Debug, Clone, Copy, Default)]
pub struct LsbReplacement {
    rate: Rate,
}

impl LsbReplacement {
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl Codec for LsbReplacement {
    fn embed(&mut self, carrier: &mut Carrier, payload: &[u8]) -> Result<()> {
        let bits = frame(payload)?;
        ensure_capacity(bits.len(), self.capacity_bits(carrier))?;

        let indices = addressed_indices(carrier.len(), carrier.header_len(), self.rate);
        let header_len = carrier.header_len();
        let units = carrier.units_mut();
        for (index, &bit) in indices.zip(&bits) {
            let unit = &mut units[index - header_len];
            *unit = (*unit & 0xFE) | bit;
        }

        tracing::debug!(bits = bits.len(), step = self.rate.step(), "LSB-R embed finished");
        Ok(())
    }

    fn extract(&self, carrier: &Carrier) -> Result<Vec<u8>> {
        extract_lsb(carrier, self.rate)
    }

    fn capacity_bits(&self, carrier: &Carrier) -> usize {
        capacity_units(carrier.len(), carrier.header_len(), self.rate)
    }
}

use rand::Rng;
use rand::rngs::ThreadRng;

use crate::addressing::{Rate, addressed_indices, capacity_units};
use crate::carrier::Carrier;
use crate::error::Result;
use crate::framing::frame;

use super::{Codec, ensure_capacity, extract_lsb};

/// LSB 匹配：LSB 与目标比特不符时，把单元值随机加 1 或减 1。
///
/// 任意整数加减 1 都会翻转最低位，因此两种选择都能写入目标比特；
/// 随机方向只影响像素值的统计分布，不影响提取。随机源可通过 [`LsbMatching::with_rng`] 注入。
#[derive(Debug, Clone)]
pub struct LsbMatching<R = ThreadRng> {
    rate: Rate,
    rng: R,
}

impl LsbMatching<ThreadRng> {
    /// 使用线程本地随机数生成器。
    pub fn new(rate: Rate) -> Self {
        Self::with_rng(rate, rand::rng())
    }
}

impl<R: Rng> LsbMatching<R> {
    pub fn with_rng(rate: Rate, rng: R) -> Self {
        Self { rate, rng }
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }
}

/// 计算写入 `bit` 后的单元值。
///
/// LSB 已相符时原样返回；0 只能加 1，255 只能减 1，其余情况随机选择方向。
pub fn match_unit<R: Rng + ?Sized>(value: u8, bit: u8, rng: &mut R) -> u8 {
    if value & 1 == bit & 1 {
        return value;
    }

    match value {
        0 => 1,
        u8::MAX => u8::MAX - 1,
        _ if rng.random_bool(0.5) => value + 1,
        _ => value - 1,
    }
}

impl<R: Rng> Codec for LsbMatching<R> {
    fn embed(&mut self, carrier: &mut Carrier, payload: &[u8]) -> Result<()> {
        let bits = frame(payload)?;
        ensure_capacity(bits.len(), self.capacity_bits(carrier))?;

        let indices = addressed_indices(carrier.len(), carrier.header_len(), self.rate);
        let header_len = carrier.header_len();
        let units = carrier.units_mut();
        let mut changed = 0usize;
        for (index, &bit) in indices.zip(&bits) {
            let unit = &mut units[index - header_len];
            let matched = match_unit(*unit, bit, &mut self.rng);
            if matched != *unit {
                changed += 1;
            }
            *unit = matched;
        }

        tracing::debug!(bits = bits.len(), changed, step = self.rate.step(), "LSB-M embed finished");
        Ok(())
    }

    fn extract(&self, carrier: &Carrier) -> Result<Vec<u8>> {
        extract_lsb(carrier, self.rate)
    }

    fn capacity_bits(&self, carrier: &Carrier) -> usize {
        capacity_units(carrier.len(), carrier.header_len(), self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BMP_HEADER_SIZE;
    use crate::error::StegoError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn carrier_with(units: &[u8]) -> Carrier {
        let mut bytes = vec![0u8; BMP_HEADER_SIZE];
        bytes[..2].copy_from_slice(b"BM");
        bytes.extend_from_slice(units);
        Carrier::new(bytes).unwrap()
    }

    #[test]
    fn zero_unit_can_only_go_up() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(match_unit(0, 1, &mut rng), 1);
        }
    }

    #[test]
    fn max_unit_can_only_go_down() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(match_unit(255, 0, &mut rng), 254);
        }
    }

    #[test]
    fn matching_lsb_is_left_alone() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(match_unit(128, 0, &mut rng), 128);
        assert_eq!(match_unit(77, 1, &mut rng), 77);
    }

    #[test]
    fn every_value_gets_target_parity_within_one_step() {
        let mut rng = StdRng::seed_from_u64(42);
        for value in 0..=u8::MAX {
            for bit in [0u8, 1] {
                let out = match_unit(value, bit, &mut rng);
                assert_eq!(out & 1, bit);
                assert!(value.abs_diff(out) <= 1);
            }
        }
    }

    #[test]
    fn both_directions_are_used() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcomes: Vec<u8> = (0..64).map(|_| match_unit(100, 1, &mut rng)).collect();
        assert!(outcomes.contains(&99));
        assert!(outcomes.contains(&101));
    }

    #[test]
    fn seeded_embed_is_reproducible_and_round_trips() {
        let units: Vec<u8> = (0..400u32).map(|i| (i * 37 % 256) as u8).collect();
        let rate = Rate::new(0.5).unwrap();

        let mut first = carrier_with(&units);
        let mut second = carrier_with(&units);
        LsbMatching::with_rng(rate, StdRng::seed_from_u64(9))
            .embed(&mut first, b"matching")
            .unwrap();
        let mut codec = LsbMatching::with_rng(rate, StdRng::seed_from_u64(9));
        codec.embed(&mut second, b"matching").unwrap();

        assert_eq!(first, second);
        assert_eq!(codec.extract(&first).unwrap(), b"matching");
    }

    #[test]
    fn capacity_failure_leaves_carrier_untouched() {
        let mut carrier = carrier_with(&[9; 39]);
        let before = carrier.clone();
        let result = LsbMatching::new(Rate::FULL).embed(&mut carrier, b"a");
        assert_eq!(
            result,
            Err(StegoError::CapacityExceeded {
                required: 40,
                available: 39
            })
        );
        assert_eq!(carrier, before);
    }
}

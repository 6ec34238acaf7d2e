//! (15,11) 汉明码矩阵嵌入。
//!
//! 每 15 个连续载体单元的 LSB 组成向量 `C`，其校验子 `H · C (mod 2)` 就是该分组承载的 4 个比特。
//! 嵌入时计算 `i = (H · C) ⊕ m`，若 `i != 0` 则翻转分组内第 `i` 个单元的 LSB：
//! `H` 的第 `i` 列恰好是 `i` 的二进制表示，翻转后校验子变为 `m`。

use crate::carrier::Carrier;
use crate::constants::{HAMMING_BLOCK_BITS, HAMMING_BLOCK_UNITS};
use crate::error::Result;
use crate::framing::{collect_frame, frame};

use super::{Codec, ensure_capacity};

/// 校验矩阵 `H`：第 `j` 列 (从 1 开始) 为 `j` 的二进制表示，第 0 行对应最低位。
pub const PARITY_CHECK: [[u8; HAMMING_BLOCK_UNITS]; HAMMING_BLOCK_BITS] = [
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
    [0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1],
    [0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 1, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// GF(2) 上的矩阵-向量乘法。分组不足 15 个单元时，缺失的单元按 0 计。
fn syndrome(block: &[u8]) -> [u8; HAMMING_BLOCK_BITS] {
    let mut s = [0u8; HAMMING_BLOCK_BITS];
    for (row, out) in PARITY_CHECK.iter().zip(s.iter_mut()) {
        *out = row
            .iter()
            .zip(block)
            .fold(0, |acc, (&h, &unit)| acc ^ (h & unit & 1));
    }
    s
}

/// 把 4 比特向量解释为整数，`v[0]` 为最低位。
fn position(v: [u8; HAMMING_BLOCK_BITS]) -> usize {
    v.iter()
        .rev()
        .fold(0, |acc, &bit| (acc << 1) | usize::from(bit & 1))
}

/// 汉明矩阵嵌入。码率固定为 4/15，没有嵌入率参数，分组从头部之后连续排列。
#[derive(Debug, Clone, Copy, Default)]
pub struct HammingMatrix;

impl HammingMatrix {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for HammingMatrix {
    fn embed(&mut self, carrier: &mut Carrier, payload: &[u8]) -> Result<()> {
        let bits = frame(payload)?;
        ensure_capacity(bits.len(), self.capacity_bits(carrier))?;

        let mut flipped = 0usize;
        let blocks = carrier.units_mut().chunks_mut(HAMMING_BLOCK_UNITS);
        for (block, group) in blocks.zip(bits.chunks(HAMMING_BLOCK_BITS)) {
            let mut m = [0u8; HAMMING_BLOCK_BITS];
            m[..group.len()].copy_from_slice(group);

            let s = syndrome(block);
            let target = std::array::from_fn(|k| s[k] ^ m[k]);
            let i = position(target);
            if let Some(unit) = i.checked_sub(1).and_then(|offset| block.get_mut(offset)) {
                *unit ^= 1;
                flipped += 1;
            }
        }

        tracing::debug!(bits = bits.len(), flipped, "Hamming embed finished");
        Ok(())
    }

    fn extract(&self, carrier: &Carrier) -> Result<Vec<u8>> {
        let bits = carrier
            .units()
            .chunks_exact(HAMMING_BLOCK_UNITS)
            .flat_map(syndrome);
        collect_frame(bits)
    }

    /// `floor(units / 15) × 4`。
    fn capacity_bits(&self, carrier: &Carrier) -> usize {
        carrier.unit_count() / HAMMING_BLOCK_UNITS * HAMMING_BLOCK_BITS
    }
}

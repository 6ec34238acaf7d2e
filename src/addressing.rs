//! # 载体寻址模块
//!
//! 根据载体长度、头部偏移与嵌入率，生成确定性的载体单元下标序列。
//! 嵌入与提取只要使用相同的嵌入率，就会得到完全相同的序列；嵌入率本身不写入载体。

use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_RATE;
use crate::error::{Result, StegoError};

/// 嵌入率：使用的载体单元比例，取值区间为 (0.0, 1.0]。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate(f64);

impl Rate {
    /// 使用全部载体单元。
    pub const FULL: Rate = Rate(DEFAULT_RATE);

    /// # Errors
    ///
    /// 取值不在 (0.0, 1.0] 内 (包括 NaN) 时返回 [`StegoError::InvalidRate`]。
    pub fn new(value: f64) -> Result<Self> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(StegoError::InvalidRate(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// 相邻两个被寻址单元之间的步长：嵌入率为 1.0 时为 1，否则为 `ceil(1 / rate)`。
    pub fn step(self) -> usize {
        if self.0 >= 1.0 {
            1
        } else {
            (1.0 / self.0).ceil() as usize
        }
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Rate {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| StegoError::InvalidRate(f64::NAN))?;
        Self::new(value)
    }
}

/// 在给定嵌入率下可用于嵌入的载体单元数 (即可嵌入的比特数)。
///
/// 取 `floor((carrier_len − header_len) × rate)`，并且不超过步长规则实际寻址到的单元数，
/// 以保证通过容量检查的消息一定能被完整写入。
pub fn capacity_units(carrier_len: usize, header_len: usize, rate: Rate) -> usize {
    let units = carrier_len.saturating_sub(header_len);
    let by_rate = (units as f64 * rate.value()).floor() as usize;
    by_rate.min(units.div_ceil(rate.step()))
}

/// 按升序返回所有被寻址的载体单元下标 (相对于整个缓冲区)。
///
/// 下标 `i` 被选中当且仅当 `(i − header_len) mod step == 0`。
pub fn addressed_indices(
    carrier_len: usize,
    header_len: usize,
    rate: Rate,
) -> impl Iterator<Item = usize> {
    (header_len..carrier_len.max(header_len)).step_by(rate.step())
}

//! # 隐写算法模块
//!
//! 三种可互换的嵌入策略，共享 [`crate::framing`] 的分帧与 [`crate::addressing`] 的寻址：
//!
//! * [`LsbReplacement`]：直接改写最低有效位 (LSB-R)。
//! * [`LsbMatching`]：LSB 不符时随机 ±1 (LSB-M)。
//! * [`HammingMatrix`]：(15,11) 汉明码校验子嵌入，每 15 个单元承载 4 比特，至多修改 1 位。

mod hamming;
mod lsb_matching;
mod lsb_replacement;

pub use hamming::{HammingMatrix, PARITY_CHECK};
pub use lsb_matching::LsbMatching;
pub use lsb_replacement::LsbReplacement;

use crate::addressing::{Rate, addressed_indices};
use crate::carrier::Carrier;
use crate::cli::Method;
use crate::error::{Result, StegoError};
use crate::framing::collect_frame;

/// 嵌入/提取策略的统一接口。
pub trait Codec {
    /// 把 `payload` 写入载体的像素区域。
    ///
    /// # Errors
    ///
    /// 容量不足时返回 [`StegoError::CapacityExceeded`]，此时载体保持原样，未被修改。
    fn embed(&mut self, carrier: &mut Carrier, payload: &[u8]) -> Result<()>;

    /// 从载体中读取消息。只读，可重复调用。
    fn extract(&self, carrier: &Carrier) -> Result<Vec<u8>>;

    /// 载体在当前参数下可容纳的分帧比特数 (含 32 位长度前缀)。
    fn capacity_bits(&self, carrier: &Carrier) -> usize;
}

/// 根据命令行选择的方法构造编解码器。汉明方法没有嵌入率参数，`rate` 被忽略。
pub fn codec_for(method: Method, rate: Rate) -> Box<dyn Codec> {
    match method {
        Method::Lsbr => Box::new(LsbReplacement::new(rate)),
        Method::Lsbm => Box::new(LsbMatching::new(rate)),
        Method::Hamming => Box::new(HammingMatrix::new()),
    }
}

/// 检查分帧后的比特数是否在容量之内。
fn ensure_capacity(required: usize, available: usize) -> Result<()> {
    if required > available {
        return Err(StegoError::CapacityExceeded {
            required,
            available,
        });
    }
    Ok(())
}

/// LSB-R 与 LSB-M 共用的提取逻辑：按寻址顺序读取 LSB，直到读满一帧。
fn extract_lsb(carrier: &Carrier, rate: Rate) -> Result<Vec<u8>> {
    let bytes = carrier.as_bytes();
    collect_frame(addressed_indices(carrier.len(), carrier.header_len(), rate).map(|i| bytes[i] & 1))
}

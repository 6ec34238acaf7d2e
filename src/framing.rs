//! # 分帧模块
//!
//! 把消息编码为自描述的比特序列：4 字节大端长度前缀 + 消息本体，
//! 每个字节按最高位优先 (MSB-first) 展开。每个比特用一个取值为 0 或 1 的 `u8` 表示。

use crate::constants::LENGTH_PREFIX_BITS;
use crate::error::{Result, StegoError};

/// 分帧后消息的总比特数：`32 + 8 × len`。
pub fn frame_bit_len(payload_len: usize) -> usize {
    LENGTH_PREFIX_BITS.saturating_add(payload_len.saturating_mul(8))
}

/// 为消息加上长度前缀并展开为比特序列。
///
/// # Errors
///
/// 消息长度超过 `u32::MAX` 时返回 [`StegoError::PayloadTooLarge`]。
pub fn frame(payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len()).map_err(|_| StegoError::PayloadTooLarge(payload.len()))?;

    let mut bits = Vec::with_capacity(frame_bit_len(payload.len()));
    for byte in len.to_be_bytes().iter().chain(payload) {
        bits.extend((0..8).rev().map(|shift| (byte >> shift) & 1));
    }

    Ok(bits)
}

/// 把 MSB-first 的比特重新打包为字节。末尾不足 8 位的残余比特被丢弃。
fn pack_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |byte, &bit| (byte << 1) | (bit & 1)))
        .collect()
}

fn read_length(bits: &[u8]) -> u32 {
    bits[..LENGTH_PREFIX_BITS]
        .iter()
        .fold(0u32, |len, &bit| (len << 1) | u32::from(bit & 1))
}

/// 从比特序列中恢复消息。
///
/// 前 32 位给出长度 `L`，随后读取至多 `8 × L` 位。若比特序列提前结束，
/// 返回已完整读取的字节 (截断的消息)，并记录一条警告。
///
/// # Errors
///
/// 比特数不足 32 位时返回 [`StegoError::IncompleteExtraction`]。
pub fn unframe(bits: &[u8]) -> Result<Vec<u8>> {
    if bits.len() < LENGTH_PREFIX_BITS {
        return Err(StegoError::IncompleteExtraction {
            available: bits.len(),
        });
    }

    let len = read_length(bits) as usize;
    let end = frame_bit_len(len).min(bits.len());
    let payload = pack_bytes(&bits[LENGTH_PREFIX_BITS..end]);

    if payload.len() < len {
        tracing::warn!(
            declared = len,
            recovered = payload.len(),
            "length prefix exceeds the available bits, payload truncated"
        );
    }

    Ok(payload)
}

/// 增量收集提取出的比特，在读满 `32 + 8L` 位后告知调用方停止。
#[derive(Debug, Default)]
pub struct FrameCollector {
    bits: Vec<u8>,
    expected: Option<usize>,
}

impl FrameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个比特。返回 `true` 表示整帧已读满，后续比特无需再读取。
    pub fn push(&mut self, bit: u8) -> bool {
        self.bits.push(bit & 1);

        if self.expected.is_none() && self.bits.len() == LENGTH_PREFIX_BITS {
            self.expected = Some(frame_bit_len(read_length(&self.bits) as usize));
        }

        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.expected.is_some_and(|expected| self.bits.len() >= expected)
    }

    /// 已收集的比特数。
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// 解码已收集的比特，语义同 [`unframe`]。
    pub fn finish(self) -> Result<Vec<u8>> {
        unframe(&self.bits)
    }
}

/// 从比特流中读取一整帧并解码；帧读满后立即停止消费迭代器。
pub fn collect_frame(bits: impl IntoIterator<Item = u8>) -> Result<Vec<u8>> {
    let mut collector = FrameCollector::new();
    for bit in bits {
        if collector.push(bit) {
            break;
        }
    }

    tracing::debug!(bits = collector.len(), "collected frame bits");
    collector.finish()
}

//! # 载体模块
//!
//! [`Carrier`] 持有一份经过校验的图像字节缓冲区，并把它划分为头部与像素区域。
//! 像素区域中的每个字节都是一个“载体单元”，其最低有效位就是隐写通道。

use crate::constants::{BMP_HEADER_SIZE, BMP_MAGIC};
use crate::error::{Result, StegoError};

/// 已校验的载体缓冲区。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    bytes: Vec<u8>,
    header_len: usize,
}

impl Carrier {
    /// 以标准 54 字节 BMP 头部构造载体。
    ///
    /// # Errors
    ///
    /// 缓冲区不以 `BM` 开头，或长度不足 54 字节时返回 [`StegoError::InvalidContainerFormat`]。
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        Self::with_header_len(bytes, BMP_HEADER_SIZE)
    }

    /// 以自定义头部长度构造载体。头部长度至少要覆盖两字节魔数。
    pub fn with_header_len(bytes: Vec<u8>, header_len: usize) -> Result<Self> {
        if bytes.len() < BMP_MAGIC.len() || bytes[..BMP_MAGIC.len()] != BMP_MAGIC {
            return Err(StegoError::InvalidContainerFormat(
                "missing 'BM' signature".to_string(),
            ));
        }
        if header_len < BMP_MAGIC.len() || bytes.len() < header_len {
            return Err(StegoError::InvalidContainerFormat(format!(
                "{} bytes cannot hold a {}-byte header",
                bytes.len(),
                header_len
            )));
        }

        Ok(Self { bytes, header_len })
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// 整个缓冲区的长度 (头部 + 像素区域)。
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 像素区域中载体单元的数量。
    pub fn unit_count(&self) -> usize {
        self.bytes.len() - self.header_len
    }

    pub fn header(&self) -> &[u8] {
        &self.bytes[..self.header_len]
    }

    /// 像素区域 (只读)。
    pub fn units(&self) -> &[u8] {
        &self.bytes[self.header_len..]
    }

    /// 像素区域 (可写)。头部永远不会通过此视图暴露。
    pub fn units_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[self.header_len..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

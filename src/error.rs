//! # 错误类型模块
//!
//! [`StegoError`] 覆盖了隐写核心 (载体校验、分帧、寻址与三种编解码器) 的全部失败情形。
//! 命令处理层在此之上使用 `anyhow` 附加上下文。

/// 隐写核心可能产生的错误。
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StegoError {
    /// 载体不是预期的 BMP 格式 (魔数不符，或长度不足以容纳头部)。
    #[error("Invalid container format: {0}")]
    InvalidContainerFormat(String),

    /// 嵌入率不在 (0.0, 1.0] 区间内。
    #[error("Invalid embedding rate {0}: expected a value in (0.0, 1.0]")]
    InvalidRate(f64),

    /// 分帧后的比特数超过了载体在当前参数下的容量。
    #[error("Not enough capacity in the carrier: required {required} bits, available {available} bits")]
    CapacityExceeded { required: usize, available: usize },

    /// 消息长度无法用 32 位长度前缀表示。
    #[error("Payload of {0} bytes does not fit the 32-bit length prefix")]
    PayloadTooLarge(usize),

    /// 可读取的比特不足 32 位，无法恢复长度前缀。
    #[error("Incomplete extraction: only {available} bits available, the length prefix needs 32")]
    IncompleteExtraction { available: usize },
}

/// 隐写核心统一使用的 `Result` 别名。
pub type Result<T> = std::result::Result<T, StegoError>;

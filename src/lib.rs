//! # bmp_hide 库
//!
//! 本库包含 BMP 隐写工具的核心逻辑：分帧 ([`framing`])、载体寻址 ([`addressing`])
//! 以及三种嵌入方法 ([`steganography`])，外加命令行与命令处理层。

// 声明库包含的所有模块。

pub mod addressing;
pub mod carrier;
pub mod cli;
pub mod constants;
pub mod error;
pub mod framing;
pub mod handler;
pub mod steganography;

pub use addressing::Rate;
pub use carrier::Carrier;
pub use error::StegoError;
pub use steganography::{Codec, HammingMatrix, LsbMatching, LsbReplacement};

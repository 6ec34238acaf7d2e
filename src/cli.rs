//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{Args, Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

use crate::addressing::Rate;

/// 一款 BMP 隐写命令行工具，支持 LSB 替换、LSB 匹配与 (15,11) 汉明矩阵嵌入三种方法。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款 BMP 隐写命令行工具，在 24 位 BMP 图像的像素最低有效位中隐藏或恢复任意数据。\n支持 LSB 替换 (lsbr)、LSB 匹配 (lsbm) 与 (15,11) 汉明矩阵嵌入 (hamming) 三种方法。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量查询)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在图像中隐藏文本文件或命令行给出的文本。
    Hide(HideArgs),

    /// 从经过隐写的 BMP 图像中恢复隐藏的数据。
    Recover(RecoverArgs),

    /// 显示图像在各方法下可隐藏的最大字节数。
    Capacity(CapacityArgs),
}

/// 嵌入方法。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    /// LSB 替换：直接改写最低有效位。
    #[default]
    Lsbr,
    /// LSB 匹配：最低位不符时随机加一或减一。
    Lsbm,
    /// (15,11) 汉明码矩阵嵌入：每 15 字节承载 4 比特，至多改动 1 位。
    Hamming,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Lsbr, Method::Lsbm, Method::Hamming];

    /// 该方法是否使用嵌入率参数。
    pub fn uses_rate(self) -> bool {
        !matches!(self, Method::Hamming)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Lsbr => "lsbr",
            Method::Lsbm => "lsbm",
            Method::Hamming => "hamming",
        };
        f.write_str(name)
    }
}

/// 解析并校验嵌入率，取值区间为 (0.0, 1.0]。
pub fn parse_rate(s: &str) -> Result<Rate, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    Rate::new(value).map_err(|e| e.to_string())
}

/// 'hide' 与 'recover' 共用的方法参数。
#[derive(Args, Debug, Clone, Default)]
pub struct MethodArgs {
    /// 使用的嵌入方法。
    #[arg(short, long, value_enum, default_value_t = Method::Lsbr)]
    pub method: Method,

    /// 嵌入率 (0.0, 1.0]，即使用的像素字节比例。提取时必须与隐藏时一致；汉明方法忽略此参数。
    #[arg(short, long, value_parser = parse_rate)]
    pub rate: Option<Rate>,
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["text", "message"])))]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径。非 24 位 BMP 的无损图像会先被转换为 BMP。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的内容的文件路径。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 直接在命令行给出要隐藏的文本 (按 UTF-8 编码)。
    #[arg(long)]
    pub message: Option<String>,

    /// 隐写完成后，保存结果图像的输出路径。默认为输入图像旁的 `doctored_<name>.bmp`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    #[command(flatten)]
    pub method: MethodArgs,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,

    /// 隐藏后立即重新提取，确认数据可以完整恢复。
    #[arg(long)]
    pub verify: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的 BMP 图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复后保存内容的输出路径。默认为图像旁的 `recovered_<name>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    #[command(flatten)]
    pub method: MethodArgs,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要查询的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// LSB 方法使用的嵌入率。
    #[arg(short, long, value_parser = parse_rate)]
    pub rate: Option<Rate>,
}

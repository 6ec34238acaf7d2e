//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、载体准备、调用核心隐写算法以及向用户报告结果。

use crate::addressing::Rate;
use crate::carrier::Carrier;
use crate::cli::{CapacityArgs, HideArgs, Method, MethodArgs, RecoverArgs};
use crate::constants::{BMP_HEADER_SIZE, BMP_MAGIC, BMP_PIXEL_OFFSET_FIELD, LENGTH_PREFIX_BITS};
use crate::framing::frame_bit_len;
use crate::steganography::codec_for;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// 恢复成功后在终端预览的最大字符数。
const PREVIEW_CHARS: usize = 80;

/// 判断缓冲区是否为像素数据紧跟 54 字节头部的 BMP，可以直接作为载体使用。
fn is_plain_bmp(bytes: &[u8]) -> bool {
    let offset = bytes
        .get(BMP_PIXEL_OFFSET_FIELD..BMP_PIXEL_OFFSET_FIELD + 4)
        .and_then(|field| <[u8; 4]>::try_from(field).ok())
        .map(u32::from_le_bytes);

    bytes.starts_with(&BMP_MAGIC) && offset == Some(BMP_HEADER_SIZE as u32)
}

/// 把输入图像准备为载体缓冲区。
///
/// 像素偏移为 54 的 BMP 原样返回；其他 `image` 能解码的无损图像
/// (PNG、TIFF、WebP、QOI、带 V4/V5 头部的 BMP 等) 会被转换为 24 位 BMP。
///
/// # Errors
///
/// 图像无法解码或重新编码时返回错误。
pub fn prepare_carrier(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if is_plain_bmp(&bytes) {
        return Ok(bytes);
    }

    let picture = image::load_from_memory(&bytes)
        .context("The input is neither a 24-bit BMP nor an image format that can be converted to one")?;
    tracing::warn!(
        width = picture.width(),
        height = picture.height(),
        "converting input image to a 24-bit BMP carrier"
    );

    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(picture.to_rgb8())
        .write_to(&mut out, image::ImageFormat::Bmp)
        .context("Failed to encode the carrier as BMP")?;

    Ok(out.into_inner())
}

/// 输出文件已存在且未指定 `--force` 时拒绝继续。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// `hide` 的默认输出路径：输入图像旁的 `doctored_<name>.bmp`。
pub fn default_hidden_path(image: &Path) -> PathBuf {
    image.with_file_name(format!("doctored_{}.bmp", file_stem(image)))
}

/// `recover` 的默认输出路径：图像旁的 `recovered_<name>.txt`。
pub fn default_recovered_path(image: &Path) -> PathBuf {
    image.with_file_name(format!("recovered_{}.txt", file_stem(image)))
}

/// 取得实际使用的嵌入率；汉明方法不使用嵌入率，显式给出时记录警告。
fn resolve_rate(args: &MethodArgs) -> Rate {
    if !args.method.uses_rate() && args.rate.is_some() {
        tracing::warn!(method = %args.method, "the rate argument is ignored by this method");
    }
    args.rate.unwrap_or_default()
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和待隐藏内容、准备载体、检查隐写空间是否足够、调用所选方法嵌入数据，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与嵌入参数的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或文本文件，或图像无法转换为 BMP 载体。
/// * 图像没有足够的空间来隐藏数据。
/// * 指定 `--verify` 时重新提取的数据与原文不一致。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_hidden_path(&args.image));
    ensure_writable(&dest, args.force)?;

    let picture = prepare_carrier(read_image(&args.image)?).with_context(|| {
        format!(
            "Unable to use {} as a carrier",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let payload = match (&args.text, &args.message) {
        (Some(path), _) => fs::read(path).with_context(|| {
            format!(
                "Unable to read text file: {}",
                path.to_string_lossy().red().bold()
            )
        })?,
        (None, Some(message)) => message.clone().into_bytes(),
        (None, None) => anyhow::bail!("Nothing to hide: provide --text or --message"),
    };

    let mut carrier = Carrier::new(picture).context("The carrier is not a valid BMP image")?;

    let method = args.method.method;
    let rate = resolve_rate(&args.method);
    let mut codec = codec_for(method, rate);

    let required_space = frame_bit_len(payload.len());
    let available_space = codec.capacity_bits(&carrier);
    anyhow::ensure!(
        available_space >= required_space,
        "Not enough space in the image to hide the text. \nRequired: {} bits, Available: {} bits",
        required_space.to_string().red().bold(),
        available_space.to_string().green().bold()
    );

    codec.embed(&mut carrier, &payload).with_context(|| {
        format!(
            "Failed to hide the message with method {}.",
            method.to_string().red().bold()
        )
    })?;

    if args.verify {
        let recovered = codec
            .extract(&carrier)
            .context("Verification failed: the message could not be extracted again")?;
        anyhow::ensure!(
            recovered == payload,
            "Verification failed: the extracted message differs from the original"
        );
        tracing::info!(bytes = recovered.len(), "round-trip verification passed");
    }

    fs::write(&dest, carrier.into_bytes()).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden with {} and saved: {}",
        method.to_string().cyan(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、使用与隐藏时相同的方法和嵌入率提取数据，
/// 最后将恢复的内容写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与提取参数的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件，或图像不是 BMP。
/// * 可读取的比特不足以恢复长度前缀。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let dest = args
        .text
        .clone()
        .unwrap_or_else(|| default_recovered_path(&args.image));
    ensure_writable(&dest, args.force)?;

    let carrier = Carrier::new(read_image(&args.image)?).with_context(|| {
        format!(
            "{} is not a valid BMP image",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let method = args.method.method;
    let codec = codec_for(method, resolve_rate(&args.method));
    let text = codec.extract(&carrier).with_context(|| {
        format!(
            "Failed to recover the message from '{}'. \nThe image may not contain a hidden message, or the method/rate differs from the one used to hide it.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    fs::write(&dest, &text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    if let Ok(preview) = std::str::from_utf8(&text) {
        let shown: String = preview.chars().take(PREVIEW_CHARS).collect();
        println!("{} {}", "Recovered:".bold(), shown);
    }

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑：列出每种方法可隐藏的最大字节数 (已扣除长度前缀)。
///
/// # Errors
///
/// 无法读取图像或图像无法作为载体时返回错误。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = prepare_carrier(read_image(&args.image)?)?;
    let carrier = Carrier::new(picture).context("The carrier is not a valid BMP image")?;
    let rate = args.rate.unwrap_or_default();

    println!(
        "Carrier: {} ({} pixel bytes)",
        args.image.to_string_lossy().green().bold(),
        carrier.unit_count()
    );
    for method in Method::ALL {
        let bits = codec_for(method, rate).capacity_bits(&carrier);
        let bytes = bits.saturating_sub(LENGTH_PREFIX_BITS) / 8;
        let rate_note = if method.uses_rate() {
            format!(" (rate {rate})")
        } else {
            String::new()
        };
        println!(
            "  {:<8} {} bytes{}",
            method.to_string().cyan(),
            bytes.to_string().bold(),
            rate_note
        );
    }

    Ok(())
}

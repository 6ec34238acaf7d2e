use bmp_hide::{
    addressing::Rate,
    cli::{CapacityArgs, HideArgs, Method, MethodArgs, RecoverArgs},
    constants::BMP_HEADER_SIZE,
    handler::{handle_capacity, handle_hide, handle_recover},
};
use image::{ImageBuffer, Rgb};
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的测试图像 (格式由扩展名决定)
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(3))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgb([chunk[0], chunk[1], chunk[2]]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

fn method_args(method: Method, rate: Option<f64>) -> MethodArgs {
    MethodArgs {
        method,
        rate: rate.map(|r| Rate::new(r).expect("valid rate")),
    }
}

fn hide_args(image: PathBuf, text: PathBuf, dest: Option<PathBuf>, method: MethodArgs) -> HideArgs {
    HideArgs {
        image,
        text: Some(text),
        message: None,
        dest,
        method,
        force: false,
        verify: false,
    }
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.bmp");
    let hidden_image_path = dir.path().join("hidden.bmp");
    let source_text_path = dir.path().join("source.txt");
    let recovered_text_path = dir.path().join("recovered.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_hide
    handle_hide(hide_args(
        original_image_path.clone(),
        source_text_path.clone(),
        Some(hidden_image_path.clone()),
        MethodArgs::default(),
    ))?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    // 头部保持不变，文件长度不变
    let original = fs::read(&original_image_path)?;
    let hidden = fs::read(&hidden_image_path)?;
    assert_eq!(original.len(), hidden.len());
    assert_eq!(original[..BMP_HEADER_SIZE], hidden[..BMP_HEADER_SIZE]);

    // 3. 测试 handle_recover
    let recover_args = RecoverArgs {
        image: hidden_image_path.clone(),
        text: Some(recovered_text_path.clone()),
        method: MethodArgs::default(),
        force: false,
    };
    handle_recover(recover_args)?;
    assert!(
        recovered_text_path.exists(),
        "Recovered text file should be created."
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&recovered_text_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作 (PNG 输入会被转换为 BMP)
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let source_text_path = dir.path().join("source.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "Testing default path generation. 测试默认路径生成。";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_hide，不提供 dest 路径
    handle_hide(hide_args(
        original_image_path.clone(),
        source_text_path.clone(),
        None, // 关键：测试 None 的情况
        MethodArgs::default(),
    ))?;

    // 验证默认的隐藏图像文件是否已创建，且仍是可解码的 BMP
    let expected_hidden_path = dir.path().join("doctored_original.bmp");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );
    let decoded = image::open(&expected_hidden_path)?;
    assert_eq!((decoded.width(), decoded.height()), (100, 100));

    // 3. 测试 handle_recover，不提供 text 输出路径
    let recover_args = RecoverArgs {
        image: expected_hidden_path, // 使用上一步生成的默认文件
        text: None,                  // 关键：测试 None 的情况
        method: MethodArgs::default(),
        force: false,
    };
    handle_recover(recover_args)?;

    // 验证默认的恢复文本文件是否已创建
    let expected_recovered_path = dir.path().join("recovered_doctored_original.txt");
    assert!(
        expected_recovered_path.exists(),
        "Default recovered text file should be created at: {:?}",
        expected_recovered_path
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&expected_recovered_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text from default file must match the original."
    );

    Ok(())
}

/// 验证三种方法在各自参数下都能完成隐藏与恢复
#[test]
fn test_every_method_round_trips() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.bmp");
    create_test_image(&image_path, 64, 64);

    let cases = [
        (Method::Lsbr, Some(0.25)),
        (Method::Lsbm, Some(0.5)),
        (Method::Lsbm, None),
        (Method::Hamming, None),
    ];
    let message = "Lorem ipsum dolor sit amet, 隐写术。";

    for (i, (method, rate)) in cases.into_iter().enumerate() {
        let dest = dir.path().join(format!("stego_{i}.bmp"));
        let out = dir.path().join(format!("out_{i}.txt"));

        handle_hide(HideArgs {
            image: image_path.clone(),
            text: None,
            message: Some(message.to_string()),
            dest: Some(dest.clone()),
            method: method_args(method, rate),
            force: false,
            verify: true,
        })?;

        handle_recover(RecoverArgs {
            image: dest,
            text: Some(out.clone()),
            method: method_args(method, rate),
            force: false,
        })?;

        assert_eq!(
            fs::read_to_string(&out)?,
            message,
            "method {method} with rate {rate:?} must round-trip"
        );
    }

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.bmp");
    let text_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&image_path, 50, 50);
    fs::write(&text_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    // 先创建一个同名的目标文件，模拟“文件已存在”的场景
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    // 构建参数，不使用 --force
    let hide_args_no_force = hide_args(
        image_path.clone(),
        text_path.clone(),
        Some(dest_path.clone()),
        MethodArgs::default(),
    );

    // 执行并断言操作会失败
    let result = handle_hide(hide_args_no_force);
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let mut hide_args_with_force = hide_args(
        image_path.clone(),
        text_path.clone(),
        Some(dest_path.clone()),
        MethodArgs::default(),
    );
    hide_args_with_force.force = true;

    // 执行并断言操作会成功
    let result = handle_hide(hide_args_with_force);
    assert!(result.is_ok(), "Execution should succeed with --force when file exists.");

    // 验证文件确实被覆盖（内容不再是 "this is a dummy file..."）
    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理，且不会留下输出文件
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("small.bmp");
    let text_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.bmp");

    // 创建一个非常小的图片
    create_test_image(&image_path, 10, 10);
    // 创建一个非常大的文本
    let large_text = "a".repeat(5000);
    fs::write(&text_path, large_text)?;

    // 2. 执行并断言错误
    for method in Method::ALL {
        let result = handle_hide(hide_args(
            image_path.clone(),
            text_path.clone(),
            Some(dest_path.clone()),
            method_args(method, None),
        ));

        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Not enough space"));
        }
        assert!(!dest_path.exists(), "No output may be written on failure.");
    }

    Ok(())
}

/// 验证恢复时拒绝非 BMP 图像
#[test]
fn test_recover_rejects_non_bmp() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("plain.png");
    create_test_image(&image_path, 20, 20);

    let result = handle_recover(RecoverArgs {
        image: image_path,
        text: Some(dir.path().join("out.txt")),
        method: MethodArgs::default(),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("not a valid BMP image"));
    }

    Ok(())
}

/// 验证容量查询可以处理 BMP 与需要转换的图像
#[test]
fn test_handle_capacity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    for name in ["cover.bmp", "cover.png"] {
        let image_path = dir.path().join(name);
        create_test_image(&image_path, 32, 32);
        handle_capacity(CapacityArgs {
            image: image_path,
            rate: Some(Rate::new(0.5).expect("valid rate")),
        })?;
    }

    Ok(())
}

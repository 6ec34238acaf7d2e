/// BMP 文件开头的两字节魔数。
pub const BMP_MAGIC: [u8; 2] = *b"BM";

/// BMP 文件的标准头部大小 (字节)。
/// 14 字节文件头 + 40 字节 BITMAPINFOHEADER，隐写操作将跳过这个头部，从像素数据开始。
pub const BMP_HEADER_SIZE: usize = 54;

/// BMP 文件头中记录像素数据偏移量的字段位置 (小端 `u32`)。
pub const BMP_PIXEL_OFFSET_FIELD: usize = 10;

/// 消息长度前缀所占的字节数 (大端 `u32`)。
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// 消息长度前缀所占的比特数。
pub const LENGTH_PREFIX_BITS: usize = LENGTH_PREFIX_BYTES * 8;

/// (15,11) 汉明码的码长：每个分组占用的载体单元数。
pub const HAMMING_BLOCK_UNITS: usize = 15;

/// 每个汉明分组承载的消息比特数 (校验矩阵的行数)。
pub const HAMMING_BLOCK_BITS: usize = 4;

/// 未指定嵌入率时使用的默认值：使用全部载体单元。
pub const DEFAULT_RATE: f64 = 1.0;

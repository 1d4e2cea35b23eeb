//! Общие константы: дефолтная геометрия, тайминги, сентинелы.

// -------- Geometry defaults --------
pub const DEFAULT_SSD_SIZE: u32 = 1; // packages
pub const DEFAULT_PACKAGE_SIZE: u32 = 1; // dies per package
pub const DEFAULT_DIE_SIZE: u32 = 1; // planes per die
pub const DEFAULT_PLANE_SIZE: u32 = 64; // blocks per plane
pub const DEFAULT_BLOCK_SIZE: u32 = 16; // pages per block
pub const DEFAULT_BLOCK_ERASES: u32 = 100; // lifetime erases per block

// Процент резервных блоков. Должен давать целое число блоков
// (см. SsdConfig::validate), 25% от дефолтной геометрии — ровно 16 блоков.
pub const DEFAULT_OVERPROVISIONING: u32 = 25;

// -------- Delay defaults (abstract simulator time units) --------
pub const DEFAULT_RAM_READ_DELAY: f64 = 0.000_01;
pub const DEFAULT_RAM_WRITE_DELAY: f64 = 0.000_01;
pub const DEFAULT_BUS_CTRL_DELAY: f64 = 0.000_002;
pub const DEFAULT_BUS_DATA_DELAY: f64 = 0.000_01;
pub const DEFAULT_PAGE_READ_DELAY: f64 = 0.000_025;
pub const DEFAULT_PAGE_WRITE_DELAY: f64 = 0.000_2;
pub const DEFAULT_BLOCK_ERASE_DELAY: f64 = 0.001_5;

// -------- Bitmap --------
// Разрядность слова битовой карты «страница записана».
pub const BITMAP_WORD_BITS: u64 = 64;

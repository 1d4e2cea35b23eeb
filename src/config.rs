//! Centralized configuration for the NAND geometry and timing model.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - `SsdConfig::from_env()` reads NF_* variables; fluent `with_*` setters
//!   override specific fields (builder-style, как в остальном коде).
//! - `validate()` проверяет геометрию до того, как из неё будет построена
//!   `Geometry` и размечены таблицы FTL.
//!
//! Замечание про over-provisioning: процент обязан давать целое число
//! резервных блоков (op_pages % block_size == 0), иначе хвост пула был бы
//! невыровнен по границе блока.

use anyhow::{anyhow, Result};
use std::fmt;

use crate::consts::*;

/// Top-level configuration: hierarchy sizes, erase budget and delays.
#[derive(Clone, Debug)]
pub struct SsdConfig {
    /// Number of packages. Env: NF_SSD_SIZE
    pub ssd_size: u32,
    /// Dies per package. Env: NF_PACKAGE_SIZE
    pub package_size: u32,
    /// Planes per die. Env: NF_DIE_SIZE
    pub die_size: u32,
    /// Blocks per plane. Env: NF_PLANE_SIZE
    pub plane_size: u32,
    /// Pages per block. Env: NF_BLOCK_SIZE
    pub block_size: u32,
    /// Lifetime erases per block. Env: NF_BLOCK_ERASES
    pub block_erases: u32,
    /// Reserved blocks, percent of raw capacity. Env: NF_OVERPROVISIONING
    pub overprovisioning: u32,

    // ---------- delays (abstract time units) ----------
    pub ram_read_delay: f64,
    pub ram_write_delay: f64,
    pub bus_ctrl_delay: f64,
    pub bus_data_delay: f64,
    /// Env: NF_PAGE_READ_DELAY
    pub page_read_delay: f64,
    /// Env: NF_PAGE_WRITE_DELAY
    pub page_write_delay: f64,
    /// Env: NF_BLOCK_ERASE_DELAY
    pub block_erase_delay: f64,
}

impl Default for SsdConfig {
    fn default() -> Self {
        Self {
            ssd_size: DEFAULT_SSD_SIZE,
            package_size: DEFAULT_PACKAGE_SIZE,
            die_size: DEFAULT_DIE_SIZE,
            plane_size: DEFAULT_PLANE_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            block_erases: DEFAULT_BLOCK_ERASES,
            overprovisioning: DEFAULT_OVERPROVISIONING,

            ram_read_delay: DEFAULT_RAM_READ_DELAY,
            ram_write_delay: DEFAULT_RAM_WRITE_DELAY,
            bus_ctrl_delay: DEFAULT_BUS_CTRL_DELAY,
            bus_data_delay: DEFAULT_BUS_DATA_DELAY,
            page_read_delay: DEFAULT_PAGE_READ_DELAY,
            page_write_delay: DEFAULT_PAGE_WRITE_DELAY,
            block_erase_delay: DEFAULT_BLOCK_ERASE_DELAY,
        }
    }
}

fn env_u32(name: &str, slot: &mut u32) {
    if let Ok(v) = std::env::var(name) {
        if let Ok(n) = v.trim().parse::<u32>() {
            *slot = n;
        }
    }
}

fn env_f64(name: &str, slot: &mut f64) {
    if let Ok(v) = std::env::var(name) {
        if let Ok(n) = v.trim().parse::<f64>() {
            *slot = n;
        }
    }
}

impl SsdConfig {
    /// Load configuration from environment variables (defaults otherwise).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        env_u32("NF_SSD_SIZE", &mut cfg.ssd_size);
        env_u32("NF_PACKAGE_SIZE", &mut cfg.package_size);
        env_u32("NF_DIE_SIZE", &mut cfg.die_size);
        env_u32("NF_PLANE_SIZE", &mut cfg.plane_size);
        env_u32("NF_BLOCK_SIZE", &mut cfg.block_size);
        env_u32("NF_BLOCK_ERASES", &mut cfg.block_erases);
        env_u32("NF_OVERPROVISIONING", &mut cfg.overprovisioning);

        env_f64("NF_PAGE_READ_DELAY", &mut cfg.page_read_delay);
        env_f64("NF_PAGE_WRITE_DELAY", &mut cfg.page_write_delay);
        env_f64("NF_BLOCK_ERASE_DELAY", &mut cfg.block_erase_delay);

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_geometry(
        mut self,
        ssd_size: u32,
        package_size: u32,
        die_size: u32,
        plane_size: u32,
        block_size: u32,
    ) -> Self {
        self.ssd_size = ssd_size;
        self.package_size = package_size;
        self.die_size = die_size;
        self.plane_size = plane_size;
        self.block_size = block_size;
        self
    }

    pub fn with_block_erases(mut self, erases: u32) -> Self {
        self.block_erases = erases;
        self
    }

    pub fn with_overprovisioning(mut self, percent: u32) -> Self {
        self.overprovisioning = percent;
        self
    }

    pub fn with_page_delays(mut self, read: f64, write: f64) -> Self {
        self.page_read_delay = read;
        self.page_write_delay = write;
        self
    }

    pub fn with_erase_delay(mut self, erase: f64) -> Self {
        self.block_erase_delay = erase;
        self
    }

    // ---------- derived sizes ----------

    /// Total physical pages (raw capacity).
    pub fn raw_pages(&self) -> u64 {
        self.ssd_size as u64
            * self.package_size as u64
            * self.die_size as u64
            * self.plane_size as u64
            * self.block_size as u64
    }

    /// Pages reserved for the over-provisioning pool.
    pub fn op_pages(&self) -> u64 {
        self.raw_pages() * self.overprovisioning as u64 / 100
    }

    /// Pages visible to the host.
    pub fn usable_pages(&self) -> u64 {
        self.raw_pages() - self.op_pages()
    }

    /// Sanity-check the geometry before building tables from it.
    pub fn validate(&self) -> Result<()> {
        if self.ssd_size == 0
            || self.package_size == 0
            || self.die_size == 0
            || self.plane_size == 0
            || self.block_size == 0
        {
            return Err(anyhow!("geometry dimensions must all be non-zero"));
        }
        if self.block_erases == 0 {
            return Err(anyhow!("block_erases must be non-zero"));
        }
        if self.overprovisioning == 0 || self.overprovisioning >= 100 {
            return Err(anyhow!(
                "overprovisioning {}% out of range (1..=99)",
                self.overprovisioning
            ));
        }
        let op = self.op_pages();
        let bs = self.block_size as u64;
        if op < bs {
            return Err(anyhow!(
                "overprovisioning {}% reserves no whole block ({} pages < block of {})",
                self.overprovisioning,
                op,
                bs
            ));
        }
        // Пул должен состоять из целых блоков, иначе хвост не выровнен.
        if op % bs != 0 {
            return Err(anyhow!(
                "overprovisioning {}% must reserve whole blocks ({} pages, block is {})",
                self.overprovisioning,
                op,
                bs
            ));
        }
        if self.usable_pages() < bs {
            return Err(anyhow!("usable capacity smaller than one block"));
        }
        Ok(())
    }
}

impl fmt::Display for SsdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SsdConfig {{ \
             packages: {}, dies: {}, planes: {}, blocks/plane: {}, pages/block: {}, \
             block_erases: {}, overprovisioning: {}%, \
             page_rd/wr: {}/{}, erase: {} \
             }}",
            self.ssd_size,
            self.package_size,
            self.die_size,
            self.plane_size,
            self.block_size,
            self.block_erases,
            self.overprovisioning,
            self.page_read_delay,
            self.page_write_delay,
            self.block_erase_delay,
        )
    }
}

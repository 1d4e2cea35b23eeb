//! ftl — гибридная log-block трансляция адресов.
//!
//! Состав:
//! - `bitmap` — карта «страница записана»;
//! - `manifest` — журналы log-блоков;
//! - `tables` — смещения logical→data / data→log, стирания, пул;
//! - `translate` — вход для хостовых событий;
//! - `gc` — clean / remap_data_block / remap_log_block / shuffle_data_log.
//!
//! Всё состояние инкапсулировано в одном объекте `Ftl`, время жизни которого
//! совпадает с симулируемым устройством. Однопоточная модель: translate
//! обрабатывает события строго по одному, блокировок нет.

pub mod bitmap;
pub mod manifest;
pub mod tables;

mod gc;
mod translate;

use std::collections::HashMap;
use std::fmt;

use crate::addr::Geometry;
use bitmap::WrittenMap;
use manifest::LogManifest;
use tables::MapTables;

pub struct Ftl {
    pub(crate) geom: Geometry,
    pub(crate) tables: MapTables,
    pub(crate) written: WrittenMap,
    /// База log-блока -> журнал его страниц. Записей не больше, чем
    /// физических блоков; каждый журнал не длиннее block_size.
    pub(crate) manifests: HashMap<u64, LogManifest>,
    /// Момент подачи текущего хостового события; им датируются все
    /// физические операции, порождённые уборкой.
    pub(crate) start_time: f64,
}

impl Ftl {
    /// Разметить таблицы под геометрию. Пул получает весь резервный хвост.
    pub fn new(geom: Geometry) -> Self {
        Self {
            geom,
            tables: MapTables::new(geom),
            written: WrittenMap::new(geom.usable_pages),
            manifests: HashMap::new(),
            start_time: 0.0,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geom
    }

    // ---------- диагностика (read-only) ----------

    #[inline]
    pub fn is_written(&self, lba: u64) -> bool {
        self.written.get(lba)
    }

    #[inline]
    pub fn written_pages(&self) -> u64 {
        self.written.count_set()
    }

    /// База data-блока, обслуживающего логический адрес.
    #[inline]
    pub fn data_block_of(&self, lba: u64) -> u64 {
        self.tables.data_base_of(lba)
    }

    /// База log-блока, назначенного data-блоку.
    #[inline]
    pub fn log_block_of(&self, data_pba: u64) -> Option<u64> {
        self.tables.log_base_of(data_pba)
    }

    /// Журнал log-блока по его базе.
    pub fn manifest_of(&self, log_pba: u64) -> Option<&[u32]> {
        self.manifests.get(&log_pba).map(|m| m.as_slice())
    }

    #[inline]
    pub fn erase_count_at(&self, pba: u64) -> u32 {
        self.tables.erase_count_of(pba)
    }

    /// Снимок пула свободных блоков.
    pub fn free_pool(&self) -> &[u64] {
        self.tables.pool_slice()
    }

    /// Чистое разрешение читающего пути: физическая страница со свежей
    /// копией lba, либо None для ни разу не записанного адреса.
    pub fn resolve(&self, lba: u64) -> Option<u64> {
        if !self.written.get(lba) {
            return None;
        }
        let data_pba = self.tables.data_base_of(lba);
        let page = self.geom.page_offset(lba);
        if let Some(log_pba) = self.tables.log_base_of(data_pba) {
            if let Some(m) = self.manifests.get(&log_pba) {
                if let Some(k) = m.fetch_log_page(page) {
                    return Some(log_pba + k as u64);
                }
            }
        }
        Some(self.tables.data_page_of(lba))
    }

    /// Сводка износа (аналог периодической печати статистики).
    pub fn wear_report(&self) -> WearReport {
        let g = &self.geom;
        let cap = g.block_erases as usize;
        let mut data_hist = vec![0u64; cap + 1];
        let mut log_hist = vec![0u64; cap + 1];
        let mut empty_data_blocks = 0u64;
        let mut log_blocks_mapped = 0u64;

        for i in 0..g.num_logical_blocks {
            let logical = i * g.block_size;
            let data = self.tables.data_base_of(logical);
            if self.written.range_clear(logical, g.block_size) {
                empty_data_blocks += 1;
            }
            data_hist[self.tables.erase_count_of(data) as usize] += 1;
            if let Some(log) = self.tables.log_base_of(data) {
                log_blocks_mapped += 1;
                log_hist[self.tables.erase_count_of(log) as usize] += 1;
            }
        }

        WearReport {
            block_erases: g.block_erases,
            empty_data_blocks,
            log_blocks_mapped,
            data_erase_hist: data_hist,
            log_erase_hist: log_hist,
            pool_free: self.tables.pool_len(),
            pool_total: g.op_pages / g.block_size,
        }
    }
}

/// Распределение стираний по блокам в их текущих ролях.
#[derive(Debug, Clone)]
pub struct WearReport {
    pub block_erases: u32,
    pub empty_data_blocks: u64,
    pub log_blocks_mapped: u64,
    /// Индекс — число стираний, значение — сколько data-блоков его имеют.
    pub data_erase_hist: Vec<u64>,
    pub log_erase_hist: Vec<u64>,
    pub pool_free: usize,
    pub pool_total: u64,
}

impl fmt::Display for WearReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} empty data blocks", self.empty_data_blocks)?;
        for (n, &count) in self.data_erase_hist.iter().enumerate() {
            if count > 0 {
                writeln!(f, "{} data blocks have {} erases", count, n)?;
            }
        }
        for (n, &count) in self.log_erase_hist.iter().enumerate() {
            if count > 0 {
                writeln!(f, "{} log blocks have {} erases", count, n)?;
            }
        }
        writeln!(f, "log blocks used {}", self.log_blocks_mapped)?;
        write!(f, "free op blocks left {}/{}", self.pool_free, self.pool_total)
    }
}

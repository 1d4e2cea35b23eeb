//! device/nand — плоская модель NAND-массива.
//!
//! Иерархия package/die/plane/block/page полностью выводится из геометрии,
//! поэтому хранится плоско: состояние страницы, остаток стираний и время
//! последнего стирания на блок.
//!
//! Помимо состояний устройство ведёт карту свежести (`ref_map`): какой
//! физической странице принадлежит последняя запись каждого логического
//! адреса. Это позволяет ловить нарушения долговечности — стирание блока,
//! в котором всё ещё живёт свежая копия, — и валидировать read-путь FTL.

use std::collections::HashMap;

use log::warn;

use crate::addr::Geometry;
use crate::event::{Event, Status};

/// Состояние страницы. Запись допустима только в Empty (erase-before-write).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Empty,
    Valid,
}

pub struct Nand {
    geom: Geometry,
    pages: Vec<PageState>,
    erases_remaining: Vec<u32>,
    last_erase_time: Vec<f64>,
    page_read_delay: f64,
    page_write_delay: f64,
    block_erase_delay: f64,

    /// lba -> физическая страница последней записи.
    ref_map: HashMap<u64, u64>,
    /// Сколько свежих копий живёт в каждом блоке.
    live_count: Vec<u32>,

    total_reads: u64,
    total_writes: u64,
    total_erases: u64,
    max_erases_seen: u32,
}

impl Nand {
    pub fn new(geom: Geometry, read_delay: f64, write_delay: f64, erase_delay: f64) -> Self {
        let nblocks = geom.num_physical_blocks as usize;
        Self {
            geom,
            pages: vec![PageState::Empty; geom.raw_pages as usize],
            erases_remaining: vec![geom.block_erases; nblocks],
            last_erase_time: vec![0.0; nblocks],
            page_read_delay: read_delay,
            page_write_delay: write_delay,
            block_erase_delay: erase_delay,
            ref_map: HashMap::new(),
            live_count: vec![0; nblocks],
            total_reads: 0,
            total_writes: 0,
            total_erases: 0,
            max_erases_seen: 0,
        }
    }

    pub fn read(&mut self, event: &mut Event) -> Status {
        let Some(addr) = event.address() else {
            return Status::Failure;
        };
        if !self.geom.address_valid(&addr) {
            return Status::PageInvalid;
        }
        let pba = self.geom.linear_of(&addr);
        if self.pages[pba as usize] != PageState::Valid {
            warn!("nand: read of empty page {}", addr);
            return Status::Failure;
        }
        event.incr_time_taken(self.page_read_delay);
        self.total_reads += 1;
        Status::Success
    }

    pub fn write(&mut self, event: &mut Event) -> Status {
        let Some(addr) = event.address() else {
            return Status::Failure;
        };
        if !self.geom.address_valid(&addr) {
            return Status::PageInvalid;
        }
        let pba = self.geom.linear_of(&addr);
        if self.pages[pba as usize] != PageState::Empty {
            warn!("nand: write to non-empty page {}", addr);
            return Status::Failure;
        }
        self.pages[pba as usize] = PageState::Valid;
        event.incr_time_taken(self.page_write_delay);
        self.total_writes += 1;

        // Карта свежести: прежняя копия устаревает, новая становится живой.
        let lba = event.logical_address();
        if let Some(old) = self.ref_map.insert(lba, pba) {
            let old_block = self.geom.block_index(old) as usize;
            self.live_count[old_block] -= 1;
        }
        self.live_count[self.geom.block_index(pba) as usize] += 1;
        Status::Success
    }

    pub fn erase(&mut self, event: &mut Event) -> Status {
        let Some(addr) = event.address() else {
            return Status::Failure;
        };
        if !self.geom.address_valid(&addr) {
            return Status::BlockInvalid;
        }
        let base = self.geom.block_base(self.geom.linear_of(&addr));
        let block = self.geom.block_index(base) as usize;

        if self.erases_remaining[block] == 0 {
            warn!("nand: block {} erase budget exhausted", block);
            return Status::BlockCorrupt;
        }
        // Нарушение долговечности: в блоке ещё живут свежие копии.
        if self.live_count[block] > 0 {
            warn!(
                "nand: erase of block {} would destroy {} live pages",
                block, self.live_count[block]
            );
            return Status::Failure;
        }

        for p in base..base + self.geom.block_size {
            self.pages[p as usize] = PageState::Empty;
        }
        self.erases_remaining[block] -= 1;
        self.last_erase_time[block] = event.start_time();
        event.incr_time_taken(self.block_erase_delay);
        self.total_erases += 1;

        let performed = self.geom.block_erases - self.erases_remaining[block];
        if performed > self.max_erases_seen {
            self.max_erases_seen = performed;
        }
        Status::Success
    }

    // ---------- наблюдение (для фасада и тестов) ----------

    #[inline]
    pub fn page_state(&self, pba: u64) -> PageState {
        self.pages[pba as usize]
    }

    #[inline]
    pub fn erases_remaining_of(&self, pba: u64) -> u32 {
        self.erases_remaining[self.geom.block_index(pba) as usize]
    }

    #[inline]
    pub fn last_erase_time_of(&self, pba: u64) -> f64 {
        self.last_erase_time[self.geom.block_index(pba) as usize]
    }

    /// Свежая копия логического адреса, если он записывался.
    #[inline]
    pub fn freshest_of(&self, lba: u64) -> Option<u64> {
        self.ref_map.get(&lba).copied()
    }

    /// Держит ли данная физическая страница свежую копию lba.
    pub fn is_valid(&self, lba: u64, pba: u64) -> bool {
        self.ref_map.get(&lba) == Some(&pba)
    }

    /// Сколько логических адресов вообще достигло носителя.
    #[inline]
    pub fn distinct_lbas_written(&self) -> u64 {
        self.ref_map.len() as u64
    }

    #[inline]
    pub fn live_pages_in(&self, block_base: u64) -> u32 {
        self.live_count[self.geom.block_index(block_base) as usize]
    }

    #[inline]
    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    #[inline]
    pub fn total_writes(&self) -> u64 {
        self.total_writes
    }

    #[inline]
    pub fn total_erases(&self) -> u64 {
        self.total_erases
    }

    /// Максимум выполненных стираний среди всех блоков.
    #[inline]
    pub fn max_erases_seen(&self) -> u32 {
        self.max_erases_seen
    }
}

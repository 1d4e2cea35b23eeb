//! ftl/tables — таблицы отображений, счётчики стираний, резервный пул.
//!
//! Оба отображения хранятся как знаковые СМЕЩЕНИЯ относительно естественного
//! индекса (циклические таблицы):
//! - logical→data: запись i = физический блок − i; 0 означает identity.
//! - data→log: запись d = log-блок − d; 0 означает «log-блок не назначен»
//!   (identity здесь непредставим, но блок никогда не бывает собственным
//!   log-блоком, так что сентинел безопасен).
//!
//! Пул — стек баз резервных блоков; инициализируется хвостом [usable, raw).

use crate::addr::Geometry;

#[derive(Debug)]
pub struct MapTables {
    geom: Geometry,
    /// logical block -> data block, смещение.
    logical_to_data: Vec<i64>,
    /// data block -> log block, смещение; 0 = не назначен.
    data_to_log: Vec<i64>,
    /// Выполненные стирания по каждому физическому блоку.
    erase_count: Vec<u32>,
    /// Стек свободных блоков (базовые линейные адреса).
    op_blocks: Vec<u64>,
}

impl MapTables {
    pub fn new(geom: Geometry) -> Self {
        let mut op_blocks = Vec::with_capacity((geom.op_pages / geom.block_size) as usize);
        let mut base = geom.usable_pages;
        while base < geom.raw_pages {
            op_blocks.push(base);
            base += geom.block_size;
        }
        Self {
            geom,
            logical_to_data: vec![0; geom.num_logical_blocks as usize],
            data_to_log: vec![0; geom.num_physical_blocks as usize],
            erase_count: vec![0; geom.num_physical_blocks as usize],
            op_blocks,
        }
    }

    // ---------- logical -> data ----------

    /// Физическая страница, на которую отображён логический адрес
    /// (через смещение его логического блока).
    #[inline]
    pub fn data_page_of(&self, lba: u64) -> u64 {
        let bs = self.geom.block_size;
        let nth_logical = (lba / bs) as i64;
        let nth_physical = nth_logical + self.logical_to_data[nth_logical as usize];
        lba % bs + nth_physical as u64 * bs
    }

    /// База data-блока логического блока, которому принадлежит lba.
    #[inline]
    pub fn data_base_of(&self, lba: u64) -> u64 {
        self.geom.block_base(self.data_page_of(lba))
    }

    /// Перенаправить логический блок (по любому его адресу) на новый
    /// физический data-блок.
    pub fn remap_logical(&mut self, logical_addr: u64, new_data_pba: u64) {
        let bs = self.geom.block_size;
        let nth_logical = (logical_addr / bs) as i64;
        let nth_physical = (new_data_pba / bs) as i64;
        self.logical_to_data[nth_logical as usize] = nth_physical - nth_logical;
    }

    /// Логический блок (база), отображённый на данный data-блок, если есть.
    pub fn logical_block_of(&self, data_pba: u64) -> Option<u64> {
        let bs = self.geom.block_size;
        let target = self.geom.block_base(data_pba);
        (0..self.geom.num_logical_blocks)
            .map(|i| i * bs)
            .find(|&logical| self.data_base_of(logical) == target)
    }

    // ---------- data -> log ----------

    /// База log-блока, назначенного данному data-блоку.
    pub fn log_base_of(&self, data_pba: u64) -> Option<u64> {
        let bs = self.geom.block_size;
        let nth_data = (data_pba / bs) as i64;
        let offset = self.data_to_log[nth_data as usize];
        if offset == 0 {
            return None;
        }
        Some((nth_data + offset) as u64 * bs)
    }

    pub fn set_log_block(&mut self, data_pba: u64, log_pba: u64) {
        let bs = self.geom.block_size;
        let nth_data = (data_pba / bs) as i64;
        let nth_log = (log_pba / bs) as i64;
        self.data_to_log[nth_data as usize] = nth_log - nth_data;
    }

    /// Снять назначение (смещение 0).
    pub fn clear_log_block(&mut self, data_pba: u64) {
        let bs = self.geom.block_size;
        self.data_to_log[(data_pba / bs) as usize] = 0;
    }

    // ---------- erase counters ----------

    #[inline]
    pub fn erase_count_of(&self, pba: u64) -> u32 {
        self.erase_count[self.geom.block_index(pba) as usize]
    }

    #[inline]
    pub fn at_erase_cap(&self, pba: u64) -> bool {
        self.erase_count_of(pba) >= self.geom.block_erases
    }

    pub fn bump_erase(&mut self, pba: u64) {
        let idx = self.geom.block_index(pba) as usize;
        debug_assert!(self.erase_count[idx] < self.geom.block_erases);
        self.erase_count[idx] += 1;
    }

    // ---------- over-provisioning pool ----------

    #[inline]
    pub fn pool_is_empty(&self) -> bool {
        self.op_blocks.is_empty()
    }

    #[inline]
    pub fn pool_len(&self) -> usize {
        self.op_blocks.len()
    }

    pub fn pool_pop(&mut self) -> Option<u64> {
        self.op_blocks.pop()
    }

    pub fn pool_push(&mut self, block_base: u64) {
        debug_assert_eq!(block_base % self.geom.block_size, 0);
        self.op_blocks.push(block_base);
    }

    /// Снимок пула (для диагностики и инвариантных проверок).
    pub fn pool_slice(&self) -> &[u64] {
        &self.op_blocks
    }
}

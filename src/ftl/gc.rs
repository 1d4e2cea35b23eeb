//! ftl/gc — уборка и балансировка износа.
//!
//! Операции:
//! - `try_clean` — трёхблочное слияние data/log через пустой scratch-блок;
//! - `remap_data_block` / `remap_log_block` — вывод блока, упёршегося в
//!   лимит стираний, из активной пары;
//! - `shuffle_data_log` — обмен ролями сильно стёртого log-блока и слабо
//!   стёртого data-блока, чтобы пополнить пул;
//! - `next_unmapped_log_block` — выдача свежего блока из пула (с shuffle
//!   при пустом пуле).
//!
//! Все операции синхронны и полностью упорядочены относительно вызвавшей их
//! трансляции; физические события датируются её start_time.

use anyhow::Result;
use log::{debug, info, warn};

use crate::device::Controller;
use crate::error::FtlError;
use crate::event::{Event, EventKind, Status};
use crate::ftl::manifest::LogManifest;
use crate::ftl::Ftl;
use crate::metrics::{
    record_clean, record_pool_pop, record_pool_refill, record_remap_data, record_remap_log,
    record_shuffle,
};

impl Ftl {
    // ---------- выпуск физических операций ----------

    fn issue(&self, ctl: &mut dyn Controller, mut event: Event) -> Result<()> {
        let st = ctl.issue(&mut event);
        if st != Status::Success {
            warn!("gc: {} failed with {:?}", event, st);
            return Err(FtlError::DeviceFailure(st).into());
        }
        Ok(())
    }

    fn issue_read(&self, ctl: &mut dyn Controller, pba: u64, lba: u64) -> Result<()> {
        let mut ev = Event::new(EventKind::Read, lba, 1, self.start_time);
        ev.set_address(self.geom.page_address(pba));
        self.issue(ctl, ev)
    }

    fn issue_write(&self, ctl: &mut dyn Controller, pba: u64, lba: u64) -> Result<()> {
        let mut ev = Event::new(EventKind::Write, lba, 1, self.start_time);
        ev.set_address(self.geom.page_address(pba));
        self.issue(ctl, ev)
    }

    fn issue_erase(&self, ctl: &mut dyn Controller, block_pba: u64, lba: u64) -> Result<()> {
        let mut ev = Event::new(EventKind::Erase, lba, 1, self.start_time);
        ev.set_address(self.geom.block_address(block_pba));
        self.issue(ctl, ev)
    }

    // ---------- подбор блоков ----------

    /// Пустой data-блок с минимальным числом стираний (ниже лимита) —
    /// кандидат в scratch для уборки.
    fn find_empty_data_block_for_cleaning(&self) -> Option<u64> {
        self.find_empty_data_block().map(|(pba, _)| pba)
    }

    /// То же, но вместе с базой владеющего логического блока — для
    /// вытеснения при remap-е.
    fn find_empty_data_block_for_remapping(&self) -> Option<(u64, u64)> {
        self.find_empty_data_block()
    }

    fn find_empty_data_block(&self) -> Option<(u64, u64)> {
        let g = &self.geom;
        let mut min_count = g.block_erases + 1;
        let mut found: Option<(u64, u64)> = None;
        for i in 0..g.num_logical_blocks {
            let logical = i * g.block_size;
            if !self.written.range_clear(logical, g.block_size) {
                continue;
            }
            let data = self.tables.data_base_of(logical);
            let count = self.tables.erase_count_of(data);
            // Строгое "меньше": при равенстве побеждает первый найденный.
            if count < min_count && count < g.block_erases {
                min_count = count;
                found = Some((data, logical));
            }
        }
        found
    }

    /// Снять с пары манифест и назначение log-блока.
    fn cancel_log_block(&mut self, data_pba: u64) {
        if let Some(log_pba) = self.tables.log_base_of(data_pba) {
            self.manifests.remove(&log_pba);
        }
        self.tables.clear_log_block(data_pba);
    }

    // ---------- пул ----------

    /// Выдать свежий блок из пула. При пустом пуле сперва пытается добыть
    /// блок shuffle-ом. Блоки на лимите стираний пропускаются и из пула
    /// выбывают насовсем.
    pub(crate) fn next_unmapped_log_block(
        &mut self,
        ctl: &mut dyn Controller,
    ) -> Result<Option<u64>> {
        if self.tables.pool_is_empty() && !self.shuffle_data_log(ctl)? {
            return Ok(None);
        }
        while let Some(pba) = self.tables.pool_pop() {
            if !self.tables.at_erase_cap(pba) {
                record_pool_pop();
                return Ok(Some(pba));
            }
            debug!(
                "gc: pool block {} retired at erase cap",
                self.geom.block_index(pba)
            );
        }
        Ok(None)
    }

    // ---------- уборка ----------

    /// Трёхблочное слияние: живые страницы пары переезжают в scratch, пара
    /// стирается, данные возвращаются в data-блок, scratch стирается.
    /// Ok(false) — нет пустого data-блока под scratch.
    ///
    /// После успеха data-блок держит актуальный образ своего логического
    /// диапазона, log-блок пуст (манифест сбрасывает вызывающая сторона).
    pub(crate) fn try_clean(
        &mut self,
        logical_block: u64,
        data_pba: u64,
        log_pba: u64,
        ctl: &mut dyn Controller,
    ) -> Result<bool> {
        let g = self.geom;
        let Some(scratch) = self.find_empty_data_block_for_cleaning() else {
            warn!("clean: no empty data block left");
            return Ok(false);
        };
        debug!(
            "clean: data block {}, log block {}, scratch {}",
            g.block_index(data_pba),
            g.block_index(log_pba),
            g.block_index(scratch)
        );

        let manifest = self
            .manifests
            .get(&log_pba)
            .cloned()
            .unwrap_or_default();

        // Живые страницы — в scratch; свежая копия берётся из log-блока,
        // если офсет там отметился, иначе из data-блока.
        for i in 0..g.block_size {
            let lba = logical_block + i;
            if !self.written.get(lba) {
                continue;
            }
            let src = match manifest.fetch_log_page(i as u32) {
                Some(k) => log_pba + k as u64,
                None => data_pba + i,
            };
            self.issue_read(ctl, src, lba)?;
            self.issue_write(ctl, scratch + i, lba)?;
        }

        self.issue_erase(ctl, data_pba, logical_block)?;
        self.issue_erase(ctl, log_pba, logical_block)?;

        // Слитый образ возвращается в data-блок.
        for i in 0..g.block_size {
            let lba = logical_block + i;
            if !self.written.get(lba) {
                continue;
            }
            self.issue_read(ctl, scratch + i, lba)?;
            self.issue_write(ctl, data_pba + i, lba)?;
        }

        self.issue_erase(ctl, scratch, logical_block)?;

        self.tables.bump_erase(data_pba);
        self.tables.bump_erase(log_pba);
        self.tables.bump_erase(scratch);
        record_clean();
        Ok(true)
    }

    // ---------- remap ----------

    /// Вывести data-блок на лимите стираний из пары: живые страницы, чьих
    /// свежих копий нет в log-блоке, переезжают в новый data-блок; пара
    /// data→log переподключается. Страницы со свежей копией в log-блоке
    /// намеренно не копируются — их подберёт последующий clean.
    ///
    /// None — целевого блока не нашлось.
    pub(crate) fn remap_data_block(
        &mut self,
        logical_block: u64,
        old_data: u64,
        log_pba: u64,
        ctl: &mut dyn Controller,
    ) -> Result<Option<u64>> {
        let g = self.geom;

        let (new_data, displaced_logical) = match self.find_empty_data_block_for_remapping() {
            Some((pba, owner)) => (pba, Some(owner)),
            None => {
                warn!("remap_data_block: no empty data block left");
                match self.next_unmapped_log_block(ctl)? {
                    Some(pba) => (pba, None),
                    None => {
                        warn!("remap_data_block: no log block left");
                        return Ok(None);
                    }
                }
            }
        };

        let manifest = self
            .manifests
            .get(&log_pba)
            .cloned()
            .unwrap_or_default();
        for i in 0..g.block_size {
            let lba = logical_block + i;
            if !self.written.get(lba) {
                continue;
            }
            if manifest.fetch_log_page(i as u32).is_none() {
                self.issue_read(ctl, old_data + i, lba)?;
                self.issue_write(ctl, new_data + i, lba)?;
            }
        }
        debug!(
            "remap_data_block: moved pages to new data block {}",
            g.block_index(new_data)
        );

        // Вытесненный пустой логический блок получает старый data-блок.
        if let Some(owner) = displaced_logical {
            self.tables.remap_logical(owner, old_data);
        }
        self.tables.remap_logical(logical_block, new_data);
        self.tables.clear_log_block(old_data);
        self.tables.set_log_block(new_data, log_pba);

        record_remap_data();
        Ok(Some(new_data))
    }

    /// Вывести log-блок на лимите стираний: свежие копии переезжают в новый
    /// log-блок в порядке офсетов, строится новый манифест. Старый блок
    /// остаётся как есть — стирание ему уже запрещено, он списан.
    ///
    /// None — пул не дал нового блока.
    pub(crate) fn remap_log_block(
        &mut self,
        logical_block: u64,
        data_pba: u64,
        old_log: u64,
        ctl: &mut dyn Controller,
    ) -> Result<Option<u64>> {
        let g = self.geom;
        let Some(new_log) = self.next_unmapped_log_block(ctl)? else {
            warn!("remap_log_block: no log block left");
            return Ok(None);
        };

        let old_manifest = self
            .manifests
            .get(&old_log)
            .cloned()
            .unwrap_or_default();
        let mut new_manifest = LogManifest::new();
        let mut j = 0u64;
        for i in 0..g.block_size {
            let lba = logical_block + i;
            if !self.written.get(lba) {
                continue;
            }
            if let Some(k) = old_manifest.fetch_log_page(i as u32) {
                self.issue_read(ctl, old_log + k as u64, lba)?;
                self.issue_write(ctl, new_log + j, lba)?;
                j += 1;
                new_manifest.append(i as u32);
            }
        }
        debug!(
            "remap_log_block: moved pages to new log block {}",
            g.block_index(new_log)
        );

        self.cancel_log_block(data_pba);
        self.tables.set_log_block(data_pba, new_log);
        self.manifests.insert(new_log, new_manifest);

        record_remap_log();
        Ok(Some(new_log))
    }

    // ---------- shuffle ----------

    /// Балансировка износа при пустом пуле: самая стёртая пара сливается,
    /// её log-блок повышается до data-роли для самого свежего непарного
    /// data-блока, а тот, стёртый, уходит в пул новым log-блоком.
    pub(crate) fn shuffle_data_log(&mut self, ctl: &mut dyn Controller) -> Result<bool> {
        let g = self.geom;

        // 1. Пара с максимальной суммой стираний, оба блока ниже лимита.
        let mut max_count = 0u64;
        let mut hot: Option<(u64, u64)> = None;
        for b in 0..g.num_physical_blocks {
            let data = b * g.block_size;
            let Some(log) = self.tables.log_base_of(data) else {
                continue;
            };
            let dc = self.tables.erase_count_of(data);
            let lc = self.tables.erase_count_of(log);
            if dc != g.block_erases && lc != g.block_erases && (dc as u64 + lc as u64) >= max_count
            {
                max_count = dc as u64 + lc as u64;
                hot = Some((data, log));
            }
        }
        let Some((hot_data, hot_log)) = hot else {
            return Ok(false);
        };

        // 2. Логический блок, живущий в этой паре.
        let Some(hot_logical) = self.tables.logical_block_of(hot_data) else {
            return Ok(false);
        };

        // 3. Непарный data-блок с минимальным числом стираний. Запас в одно
        //    стирание обязателен: блок будет стёрт при передаче в пул.
        let mut min_count = g.block_erases + 1;
        let mut cold: Option<u64> = None;
        for i in 0..g.num_logical_blocks {
            let data = self.tables.data_base_of(i * g.block_size);
            if self.tables.log_base_of(data).is_some() {
                continue;
            }
            let count = self.tables.erase_count_of(data);
            if count < min_count {
                min_count = count;
                cold = Some(data);
            }
        }
        let Some(cold_data) = cold else {
            return Ok(false);
        };
        if min_count >= g.block_erases.saturating_sub(1) {
            return Ok(false);
        }

        // 4. Освободить log-блок пары и распустить её.
        if !self.try_clean(hot_logical, hot_data, hot_log, ctl)? {
            return Ok(false);
        }
        self.cancel_log_block(hot_data);

        let Some(cold_logical) = self.tables.logical_block_of(cold_data) else {
            return Ok(false);
        };

        // 5. Содержимое свежего data-блока переезжает в стёртый log-блок.
        for i in 0..g.block_size {
            let lba = cold_logical + i;
            if !self.written.get(lba) {
                continue;
            }
            self.issue_read(ctl, cold_data + i, lba)?;
            self.issue_write(ctl, hot_log + i, lba)?;
        }

        // 6. Стереть отдаваемый блок (учёт обязателен: в пул нельзя класть
        //    блок с неучтённым стиранием).
        self.issue_erase(ctl, cold_data, cold_logical)?;
        self.tables.bump_erase(cold_data);

        // 7. Обмен ролями.
        self.tables.remap_logical(cold_logical, hot_log);
        self.tables.pool_push(cold_data);
        record_pool_refill();
        record_shuffle();

        info!(
            "shuffle_data_log: log block {} -> data role, block {} -> pool",
            g.block_index(hot_log),
            g.block_index(cold_data)
        );
        Ok(true)
    }
}

//! ftl/translate — решение per-event: куда писать, откуда читать.
//!
//! Порядок правил записи (первое подошедшее выигрывает):
//! 1) первая запись адреса — identity-страница, физический ивент выпустит
//!    вызывающая сторона;
//! 2) назначенный log-блок: добавление в хвост, либо полная уборка
//!    (с remap-ами, если блоки упёрлись в лимит стираний);
//! 3) log-блока нет — выдать свежий из пула.

use anyhow::{anyhow, Result};
use log::{debug, warn};

use crate::device::Controller;
use crate::error::FtlError;
use crate::event::{Event, EventKind};
use crate::ftl::manifest::LogManifest;
use crate::ftl::Ftl;
use crate::metrics::{record_translate_read, record_translate_write};

impl Ftl {
    /// Обработать одно хостовое событие: выбрать физический адрес, при
    /// необходимости выполнить уборку. Принимаются только READ и WRITE.
    pub fn translate(&mut self, event: &mut Event, ctl: &mut dyn Controller) -> Result<()> {
        let lba = event.logical_address();
        debug!("translate: {} lba={}", event.kind(), lba);

        if lba >= self.geom.usable_pages {
            warn!(
                "translate: lba {} beyond usable capacity {}",
                lba, self.geom.usable_pages
            );
            return Err(FtlError::LogicalOutOfRange(lba).into());
        }

        // Все физические операции этой трансляции датируются моментом
        // подачи хостового события.
        self.start_time = event.start_time();

        match event.kind() {
            EventKind::Write => self.translate_write(event, ctl),
            EventKind::Read => self.translate_read(event),
            kind => Err(FtlError::UnsupportedHostOp(kind).into()),
        }
    }

    fn translate_write(&mut self, event: &mut Event, ctl: &mut dyn Controller) -> Result<()> {
        let lba = event.logical_address();
        let page = self.geom.page_offset(lba);
        let logical_block = lba - page as u64;

        // Правило 1: первая запись идёт на identity-страницу data-блока.
        if !self.written.get(lba) {
            self.written.set(lba);
            let pba = self.tables.data_page_of(lba);
            event.set_address(self.geom.page_address(pba));
            debug!("translate: first write, identity page {}", pba);
            record_translate_write();
            return Ok(());
        }

        let data_pba = self.tables.data_base_of(lba);

        // Правило 2: у data-блока уже есть log-блок.
        if let Some(log_pba) = self.tables.log_base_of(data_pba) {
            debug!(
                "translate: data block {} maps to log block {}",
                self.geom.block_index(data_pba),
                self.geom.block_index(log_pba)
            );

            let manifest = self
                .manifests
                .get_mut(&log_pba)
                .ok_or_else(|| anyhow!("mapped log block {} has no manifest", log_pba))?;
            if let Some(k) = manifest.next_free_log_page(self.geom.block_size) {
                manifest.append(page);
                event.set_address(self.geom.page_address(log_pba + k as u64));
                record_translate_write();
                return Ok(());
            }

            // Log-блок полон — пара подлежит уборке. Блоки на лимите
            // стираний сперва выводятся из пары.
            debug!("translate: log block full, cleaning required");
            let mut data_pba = data_pba;
            let mut log_pba = log_pba;

            if self.tables.at_erase_cap(data_pba) {
                match self.remap_data_block(logical_block, data_pba, log_pba, ctl)? {
                    Some(new_data) => data_pba = new_data,
                    None => {
                        warn!("translate: data block remapping failed");
                        return Err(FtlError::EraseCapReached.into());
                    }
                }
            }
            if self.tables.at_erase_cap(log_pba) {
                match self.remap_log_block(logical_block, data_pba, log_pba, ctl)? {
                    Some(new_log) => log_pba = new_log,
                    None => {
                        warn!("translate: log block remapping failed");
                        return Err(FtlError::PoolExhausted.into());
                    }
                }
            }
            if !self.try_clean(logical_block, data_pba, log_pba, ctl)? {
                warn!("translate: cleaning failed, no scratch block");
                return Err(FtlError::PoolExhausted.into());
            }

            // Свежестёртый log-блок начинается с этой страницы.
            self.manifests.insert(log_pba, LogManifest::with_first(page));
            event.set_address(self.geom.page_address(log_pba));
            record_translate_write();
            return Ok(());
        }

        // Правило 3: назначить новый log-блок из пула.
        match self.next_unmapped_log_block(ctl)? {
            Some(log_pba) => {
                // Shuffle внутри выдачи мог перекроить отображения, в том
                // числе и нашего логического блока — перечитать.
                let data_pba = self.tables.data_base_of(lba);
                debug!(
                    "translate: fresh log block {} for data block {}",
                    self.geom.block_index(log_pba),
                    self.geom.block_index(data_pba)
                );
                self.tables.set_log_block(data_pba, log_pba);
                self.manifests.insert(log_pba, LogManifest::with_first(page));
                event.set_address(self.geom.page_address(log_pba));
                record_translate_write();
                Ok(())
            }
            None => {
                warn!("translate: no free log block to assign");
                Err(FtlError::PoolExhausted.into())
            }
        }
    }

    fn translate_read(&mut self, event: &mut Event) -> Result<()> {
        let lba = event.logical_address();
        match self.resolve(lba) {
            Some(pba) => {
                event.set_address(self.geom.page_address(pba));
                record_translate_read();
                Ok(())
            }
            None => {
                warn!("translate: read of never-written lba {}", lba);
                Err(FtlError::ReadBeforeWrite(lba).into())
            }
        }
    }
}

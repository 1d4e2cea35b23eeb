//! ssd — хостовый фасад: Ftl + NandController под одной крышей.
//!
//! Поток данных: хостовое событие -> транслятор -> (возможно) сборщик
//! мусора -> физические события в контроллер -> статус обратно хосту.
//! `event_arrive` повторяет контракт внешнего драйвера: подать запрос,
//! получить время обслуживания.

use anyhow::Result;

use crate::addr::Geometry;
use crate::config::SsdConfig;
use crate::device::{Controller, Nand, NandController};
use crate::error::FtlError;
use crate::event::{Event, EventKind, Status};
use crate::ftl::{Ftl, WearReport};
use crate::metrics::record_host_failure;

pub struct Ssd {
    cfg: SsdConfig,
    geom: Geometry,
    ftl: Ftl,
    ctl: NandController,

    /// Суммарное время обслуживания всех принятых событий.
    total_time: f64,
    events_served: u64,
}

impl Ssd {
    /// Построить устройство и разметить FTL. Конфиг проверяется здесь.
    pub fn new(cfg: SsdConfig) -> Result<Self> {
        cfg.validate()?;
        let geom = Geometry::new(&cfg);
        Ok(Self {
            ftl: Ftl::new(geom),
            ctl: NandController::new(&cfg, geom),
            cfg,
            geom,
            total_time: 0.0,
            events_served: 0,
        })
    }

    /// Принять запрос хоста. Возвращает завершённое событие (время
    /// обслуживания + физический адрес) либо причину отказа.
    ///
    /// Первая запись логической страницы физически выполняется именно
    /// здесь: транслятор лишь выбирает identity-страницу, а событие в
    /// устройство выпускает фасад.
    pub fn event_arrive(&mut self, kind: EventKind, lba: u64, start_time: f64) -> Result<Event> {
        let mut event = Event::new(kind, lba, 1, start_time);

        if let Err(e) = self.ftl.translate(&mut event, &mut self.ctl) {
            record_host_failure();
            return Err(e);
        }

        // Само хостовое событие ложится на выбранный адрес.
        let st = self.ctl.issue(&mut event);
        if st != Status::Success {
            record_host_failure();
            return Err(FtlError::DeviceFailure(st).into());
        }

        self.total_time += event.time_taken();
        self.events_served += 1;
        Ok(event)
    }

    // ---------- наблюдение ----------

    #[inline]
    pub fn config(&self) -> &SsdConfig {
        &self.cfg
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geom
    }

    #[inline]
    pub fn ftl(&self) -> &Ftl {
        &self.ftl
    }

    #[inline]
    pub fn nand(&self) -> &Nand {
        self.ctl.nand()
    }

    #[inline]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    #[inline]
    pub fn events_served(&self) -> u64 {
        self.events_served
    }

    pub fn wear_report(&self) -> WearReport {
        self.ftl.wear_report()
    }
}

//! device/controller — единственная точка входа FTL в устройство.

use log::warn;

use crate::addr::Geometry;
use crate::config::SsdConfig;
use crate::event::{Event, EventKind, Status};
use crate::metrics::{record_phys_erase, record_phys_read, record_phys_write};

use super::nand::Nand;

/// Коллаборатор с фиксированным интерфейсом: выполнить физическую операцию,
/// дописать её время в событие, вернуть статус. FTL пробрасывает любой
/// не-SUCCESS наверх без повторов.
pub trait Controller {
    fn issue(&mut self, event: &mut Event) -> Status;
}

/// Контроллер поверх NAND-массива: добавляет задержки RAM и шины к
/// задержкам самого носителя.
pub struct NandController {
    nand: Nand,
    ram_read_delay: f64,
    ram_write_delay: f64,
    bus_ctrl_delay: f64,
    bus_data_delay: f64,
}

impl NandController {
    pub fn new(cfg: &SsdConfig, geom: Geometry) -> Self {
        Self {
            nand: Nand::new(
                geom,
                cfg.page_read_delay,
                cfg.page_write_delay,
                cfg.block_erase_delay,
            ),
            ram_read_delay: cfg.ram_read_delay,
            ram_write_delay: cfg.ram_write_delay,
            bus_ctrl_delay: cfg.bus_ctrl_delay,
            bus_data_delay: cfg.bus_data_delay,
        }
    }

    #[inline]
    pub fn nand(&self) -> &Nand {
        &self.nand
    }
}

impl Controller for NandController {
    fn issue(&mut self, event: &mut Event) -> Status {
        if event.address().is_none() {
            warn!("controller: {} without a physical address", event);
            return Status::Failure;
        }
        match event.kind() {
            EventKind::Read => {
                // control + data по шине, буферизация в RAM
                event.incr_time_taken(self.bus_ctrl_delay + self.bus_data_delay);
                event.incr_time_taken(self.ram_read_delay);
                record_phys_read();
                self.nand.read(event)
            }
            EventKind::Write => {
                event.incr_time_taken(self.bus_ctrl_delay + self.bus_data_delay);
                event.incr_time_taken(self.ram_write_delay);
                record_phys_write();
                self.nand.write(event)
            }
            EventKind::Erase => {
                // у стирания нет фазы данных
                event.incr_time_taken(self.bus_ctrl_delay);
                record_phys_erase();
                self.nand.erase(event)
            }
            EventKind::Merge => {
                warn!("controller: merge is not implemented by the device");
                Status::Failure
            }
        }
    }
}

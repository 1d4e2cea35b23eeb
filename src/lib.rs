#![allow(non_snake_case)]

// Базовые модули
pub mod addr;
pub mod config;
pub mod consts;
pub mod error;
pub mod event;
pub mod metrics;

// Ядро FTL (папка с mod.rs)
pub mod ftl; // src/ftl/{mod,bitmap,manifest,tables,translate,gc}.rs

// Симуляция NAND-устройства (коллаборатор с фиксированным интерфейсом)
pub mod device; // src/device/{mod,nand,controller}.rs

// Хостовый фасад: Ftl + NandController под одним event_arrive()
pub mod ssd;

// Удобные реэкспорты
pub use addr::{AddrLevel, Address, Geometry};
pub use config::SsdConfig;
pub use device::{Controller, Nand, NandController};
pub use error::FtlError;
pub use event::{Event, EventKind, Status};
pub use ftl::Ftl;
pub use ssd::Ssd;

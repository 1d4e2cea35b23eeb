//! device — симулируемое NAND-устройство.
//!
//! FTL общается с устройством через единственную операцию
//! `Controller::issue(event)`: выполнить физический READ/WRITE/ERASE,
//! дописать время обслуживания в событие и вернуть статус.

pub mod controller;
pub mod nand;

pub use controller::{Controller, NandController};
pub use nand::{Nand, PageState};

//! error — классификация отказов транслятора.
//!
//! Все fallible-API возвращают anyhow::Result; конкретный вид отказа
//! прикрепляется как `FtlError`, чтобы вызывающий код (и тесты) могли
//! различать их через `downcast_ref::<FtlError>()`.

use std::fmt;

use crate::event::{EventKind, Status};

/// Почему транслятор отказал хосту. Частичного прогресса за отказом нет:
/// таблицы остаются согласованными, решение о повторе — за хостом.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtlError {
    /// Логический адрес за пределами usable-ёмкости.
    LogicalOutOfRange(u64),
    /// Чтение страницы, которую ни разу не писали.
    ReadBeforeWrite(u64),
    /// Нет свободного log/scratch-блока и shuffle не смог его добыть.
    PoolExhausted,
    /// Единственный кандидат упёрся в лимит стираний, перенести некуда.
    EraseCapReached,
    /// Устройство вернуло не-SUCCESS.
    DeviceFailure(Status),
    /// Хост подал ERASE или MERGE; стирания FTL выполняет сам.
    UnsupportedHostOp(EventKind),
}

impl fmt::Display for FtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtlError::LogicalOutOfRange(lba) => {
                write!(f, "logical address {} out of usable range", lba)
            }
            FtlError::ReadBeforeWrite(lba) => {
                write!(f, "read of never-written logical address {}", lba)
            }
            FtlError::PoolExhausted => write!(f, "over-provisioning pool exhausted"),
            FtlError::EraseCapReached => write!(f, "erase cap reached and no remap target"),
            FtlError::DeviceFailure(st) => write!(f, "device returned {:?}", st),
            FtlError::UnsupportedHostOp(kind) => {
                write!(f, "host operation {} not supported", kind)
            }
        }
    }
}

impl std::error::Error for FtlError {}

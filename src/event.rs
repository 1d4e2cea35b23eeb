//! event — хостовые и физические события с учётом времени.

use std::fmt;

use crate::addr::Address;

/// Тип запроса. Хост подаёт Read/Write; Erase устройство получает только от
/// FTL, Merge оставлен в перечислении ради полноты интерфейса и всегда
/// отклоняется.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Read,
    Write,
    Erase,
    Merge,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Read => "READ",
            EventKind::Write => "WRITE",
            EventKind::Erase => "ERASE",
            EventKind::Merge => "MERGE",
        };
        f.write_str(s)
    }
}

/// Статус физической операции, каким его возвращает устройство.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    PageInvalid,
    BlockInvalid,
    BlockCorrupt,
}

/// Одна операция: тип, логический адрес, размер в страницах, момент подачи
/// и накопленное время обслуживания. Физический адрес выставляет транслятор.
#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    logical_address: u64,
    size: u32,
    start_time: f64,
    time_taken: f64,
    address: Option<Address>,
}

impl Event {
    pub fn new(kind: EventKind, logical_address: u64, size: u32, start_time: f64) -> Self {
        Self {
            kind,
            logical_address,
            size,
            start_time,
            time_taken: 0.0,
            address: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[inline]
    pub fn logical_address(&self) -> u64 {
        self.logical_address
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Суммарное время обслуживания, накопленное устройством.
    #[inline]
    pub fn time_taken(&self) -> f64 {
        self.time_taken
    }

    pub fn incr_time_taken(&mut self, delta: f64) -> f64 {
        self.time_taken += delta;
        self.time_taken
    }

    #[inline]
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn set_address(&mut self, address: Address) {
        self.address = Some(address);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            Some(a) => write!(
                f,
                "{} lba={} pba={} t={}",
                self.kind, self.logical_address, a, self.start_time
            ),
            None => write!(
                f,
                "{} lba={} pba=? t={}",
                self.kind, self.logical_address, self.start_time
            ),
        }
    }
}

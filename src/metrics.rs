//! Lightweight global metrics.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Translator (обслуженные READ/WRITE, отказы хосту)
//! - Garbage collector (clean / remap_data / remap_log / shuffle)
//! - Физические операции, выпущенные в контроллер
//! - Пул резервных блоков (pop / возвраты из shuffle)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Translator -----
static TRANSLATE_READS: AtomicU64 = AtomicU64::new(0);
static TRANSLATE_WRITES: AtomicU64 = AtomicU64::new(0);
static HOST_FAILURES: AtomicU64 = AtomicU64::new(0);

// ----- Garbage collector -----
static CLEANS_TOTAL: AtomicU64 = AtomicU64::new(0);
static REMAP_DATA_TOTAL: AtomicU64 = AtomicU64::new(0);
static REMAP_LOG_TOTAL: AtomicU64 = AtomicU64::new(0);
static SHUFFLES_TOTAL: AtomicU64 = AtomicU64::new(0);

// ----- Physical ops issued to the controller -----
static PHYS_READS: AtomicU64 = AtomicU64::new(0);
static PHYS_WRITES: AtomicU64 = AtomicU64::new(0);
static PHYS_ERASES: AtomicU64 = AtomicU64::new(0);

// ----- Over-provisioning pool -----
static POOL_POPS: AtomicU64 = AtomicU64::new(0);
static POOL_REFILLS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub translate_reads: u64,
    pub translate_writes: u64,
    pub host_failures: u64,

    pub cleans_total: u64,
    pub remap_data_total: u64,
    pub remap_log_total: u64,
    pub shuffles_total: u64,

    pub phys_reads: u64,
    pub phys_writes: u64,
    pub phys_erases: u64,

    pub pool_pops: u64,
    pub pool_refills: u64,
}

impl MetricsSnapshot {
    /// Во сколько физических записей обходится одна хостовая
    /// (write amplification по счётчикам).
    pub fn write_amplification(&self) -> f64 {
        if self.translate_writes == 0 {
            return 0.0;
        }
        self.phys_writes as f64 / self.translate_writes as f64
    }
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        translate_reads: TRANSLATE_READS.load(Ordering::Relaxed),
        translate_writes: TRANSLATE_WRITES.load(Ordering::Relaxed),
        host_failures: HOST_FAILURES.load(Ordering::Relaxed),

        cleans_total: CLEANS_TOTAL.load(Ordering::Relaxed),
        remap_data_total: REMAP_DATA_TOTAL.load(Ordering::Relaxed),
        remap_log_total: REMAP_LOG_TOTAL.load(Ordering::Relaxed),
        shuffles_total: SHUFFLES_TOTAL.load(Ordering::Relaxed),

        phys_reads: PHYS_READS.load(Ordering::Relaxed),
        phys_writes: PHYS_WRITES.load(Ordering::Relaxed),
        phys_erases: PHYS_ERASES.load(Ordering::Relaxed),

        pool_pops: POOL_POPS.load(Ordering::Relaxed),
        pool_refills: POOL_REFILLS.load(Ordering::Relaxed),
    }
}

/// Сбросить счётчики (для изолированных прогонов в тестах/бенчах).
pub fn reset() {
    for c in [
        &TRANSLATE_READS,
        &TRANSLATE_WRITES,
        &HOST_FAILURES,
        &CLEANS_TOTAL,
        &REMAP_DATA_TOTAL,
        &REMAP_LOG_TOTAL,
        &SHUFFLES_TOTAL,
        &PHYS_READS,
        &PHYS_WRITES,
        &PHYS_ERASES,
        &POOL_POPS,
        &POOL_REFILLS,
    ] {
        c.store(0, Ordering::Relaxed);
    }
}

// ----- record helpers -----

#[inline]
pub fn record_translate_read() {
    TRANSLATE_READS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_translate_write() {
    TRANSLATE_WRITES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_host_failure() {
    HOST_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_clean() {
    CLEANS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_remap_data() {
    REMAP_DATA_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_remap_log() {
    REMAP_LOG_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_shuffle() {
    SHUFFLES_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_phys_read() {
    PHYS_READS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_phys_write() {
    PHYS_WRITES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_phys_erase() {
    PHYS_ERASES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_pool_pop() {
    POOL_POPS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_pool_refill() {
    POOL_REFILLS.fetch_add(1, Ordering::Relaxed);
}

//! Общие помощники команд: классификация отказов и печать сводки прогона.

use serde_json::json;

use NandFTL::metrics;
use NandFTL::{FtlError, Ssd};

/// Счётчики одного прогона нагрузки.
#[derive(Debug, Default, Clone)]
pub struct RunCounters {
    pub host_reads: u64,
    pub host_writes: u64,
    pub read_failures: u64,
    pub write_failures: u64,

    // отказы по видам
    pub out_of_range: u64,
    pub read_before_write: u64,
    pub pool_exhausted: u64,
    pub erase_cap: u64,
    pub device_failures: u64,
    pub unsupported: u64,
    pub parse_errors: u64,
}

impl RunCounters {
    /// Разнести отказ по виду (через downcast к FtlError).
    pub fn classify(&mut self, err: &anyhow::Error) {
        match err.downcast_ref::<FtlError>() {
            Some(FtlError::LogicalOutOfRange(_)) => self.out_of_range += 1,
            Some(FtlError::ReadBeforeWrite(_)) => self.read_before_write += 1,
            Some(FtlError::PoolExhausted) => self.pool_exhausted += 1,
            Some(FtlError::EraseCapReached) => self.erase_cap += 1,
            Some(FtlError::DeviceFailure(_)) => self.device_failures += 1,
            Some(FtlError::UnsupportedHostOp(_)) => self.unsupported += 1,
            None => {}
        }
    }

    /// Отказ, после которого записи уже не пойдут: ресурс устройства
    /// исчерпан, продолжать прогон бессмысленно.
    pub fn is_terminal(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<FtlError>(),
            Some(FtlError::PoolExhausted) | Some(FtlError::EraseCapReached)
        )
    }
}

pub fn print_summary(ssd: &Ssd, c: &RunCounters, stopped_early: Option<&str>, json_out: bool) {
    let wear = ssd.wear_report();
    let ms = metrics::snapshot();
    let nand = ssd.nand();

    if json_out {
        let summary = json!({
            "host": {
                "reads": c.host_reads,
                "writes": c.host_writes,
                "read_failures": c.read_failures,
                "write_failures": c.write_failures,
                "stopped_early": stopped_early,
                "failures": {
                    "out_of_range": c.out_of_range,
                    "read_before_write": c.read_before_write,
                    "pool_exhausted": c.pool_exhausted,
                    "erase_cap": c.erase_cap,
                    "device": c.device_failures,
                    "unsupported": c.unsupported,
                    "parse": c.parse_errors,
                }
            },
            "device": {
                "reads": nand.total_reads(),
                "writes": nand.total_writes(),
                "erases": nand.total_erases(),
                "max_erases_seen": nand.max_erases_seen(),
            },
            "time": {
                "total": ssd.total_time(),
                "events_served": ssd.events_served(),
            },
            "wear": {
                "empty_data_blocks": wear.empty_data_blocks,
                "log_blocks_mapped": wear.log_blocks_mapped,
                "data_erase_hist": wear.data_erase_hist,
                "log_erase_hist": wear.log_erase_hist,
                "pool_free": wear.pool_free,
                "pool_total": wear.pool_total,
            },
            "metrics": {
                "translate_reads": ms.translate_reads,
                "translate_writes": ms.translate_writes,
                "host_failures": ms.host_failures,
                "cleans_total": ms.cleans_total,
                "remap_data_total": ms.remap_data_total,
                "remap_log_total": ms.remap_log_total,
                "shuffles_total": ms.shuffles_total,
                "phys_reads": ms.phys_reads,
                "phys_writes": ms.phys_writes,
                "phys_erases": ms.phys_erases,
                "pool_pops": ms.pool_pops,
                "pool_refills": ms.pool_refills,
                "write_amplification": ms.write_amplification(),
            }
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
        return;
    }

    println!("Host:");
    println!("  reads          = {}", c.host_reads);
    println!("  writes         = {}", c.host_writes);
    println!("  read_failures  = {}", c.read_failures);
    println!("  write_failures = {}", c.write_failures);
    if let Some(reason) = stopped_early {
        println!("  stopped early  : {}", reason);
    }
    if c.parse_errors > 0 {
        println!("  parse_errors   = {}", c.parse_errors);
    }
    println!("Device:");
    println!("  reads          = {}", nand.total_reads());
    println!("  writes         = {}", nand.total_writes());
    println!("  erases         = {}", nand.total_erases());
    println!("  max_erases_seen= {}", nand.max_erases_seen());
    println!("Time:");
    println!("  total          = {:.6}", ssd.total_time());
    println!("  events_served  = {}", ssd.events_served());
    println!("Wear:");
    println!("{}", wear);
    println!("Metrics snapshot:");
    println!("  translate r/w  = {}/{}", ms.translate_reads, ms.translate_writes);
    println!("  cleans         = {}", ms.cleans_total);
    println!(
        "  remaps d/l     = {}/{}",
        ms.remap_data_total, ms.remap_log_total
    );
    println!("  shuffles       = {}", ms.shuffles_total);
    println!(
        "  phys r/w/e     = {}/{}/{}",
        ms.phys_reads, ms.phys_writes, ms.phys_erases
    );
    println!(
        "  pool pop/refill= {}/{}",
        ms.pool_pops, ms.pool_refills
    );
    println!("  write_amp      = {:.2}", ms.write_amplification());
}

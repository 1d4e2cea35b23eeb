use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use NandFTL::SsdConfig;

/// CLI симулятора: прогоны нагрузки поверх гибридного log-block FTL.
#[derive(Parser, Debug)]
#[command(name = "nandftl", version, about = "Hybrid log-block FTL simulator")]
pub struct Cli {
    /// Писать диагностику в файл (по умолчанию — терминал)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Уровень диагностики: off|error|warn|info|debug|trace
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Переопределения геометрии поверх NF_* переменных окружения.
#[derive(Args, Debug, Clone)]
pub struct GeometryArgs {
    /// Packages
    #[arg(long)]
    pub ssd_size: Option<u32>,
    /// Dies per package
    #[arg(long)]
    pub package_size: Option<u32>,
    /// Planes per die
    #[arg(long)]
    pub die_size: Option<u32>,
    /// Blocks per plane
    #[arg(long)]
    pub plane_size: Option<u32>,
    /// Pages per block
    #[arg(long)]
    pub block_size: Option<u32>,
    /// Lifetime erases per block
    #[arg(long)]
    pub block_erases: Option<u32>,
    /// Reserved blocks, percent of raw capacity
    #[arg(long)]
    pub overprovisioning: Option<u32>,
}

impl GeometryArgs {
    pub fn apply(&self, mut cfg: SsdConfig) -> SsdConfig {
        if let Some(v) = self.ssd_size {
            cfg.ssd_size = v;
        }
        if let Some(v) = self.package_size {
            cfg.package_size = v;
        }
        if let Some(v) = self.die_size {
            cfg.die_size = v;
        }
        if let Some(v) = self.plane_size {
            cfg.plane_size = v;
        }
        if let Some(v) = self.block_size {
            cfg.block_size = v;
        }
        if let Some(v) = self.block_erases {
            cfg.block_erases = v;
        }
        if let Some(v) = self.overprovisioning {
            cfg.overprovisioning = v;
        }
        cfg
    }
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Seeded random workload (uniform lba, mixed reads/writes)
    Run {
        #[command(flatten)]
        geometry: GeometryArgs,
        /// How many host events to submit
        #[arg(long, default_value_t = 10_000)]
        events: u64,
        /// Probability of a write (reads pick an already-written lba)
        #[arg(long, default_value_t = 0.5)]
        write_ratio: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Replay a text trace: `<start_time> <R|W> <lba>` per line, `#` comments
    Trace {
        #[command(flatten)]
        geometry: GeometryArgs,
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the effective configuration and derived geometry
    Info {
        #[command(flatten)]
        geometry: GeometryArgs,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

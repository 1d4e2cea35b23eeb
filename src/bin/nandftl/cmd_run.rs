use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use NandFTL::{EventKind, Ssd, SsdConfig};

use crate::cli::GeometryArgs;
use crate::util::{print_summary, RunCounters};

/// Равномерная случайная нагрузка: запись в произвольный lba, чтение — из
/// уже записанных. Межсобытийный интервал фиксированный.
const ARRIVAL_STEP: f64 = 0.001;

pub fn exec(
    geometry: GeometryArgs,
    events: u64,
    write_ratio: f64,
    seed: u64,
    json: bool,
) -> Result<()> {
    if !(0.0..=1.0).contains(&write_ratio) {
        return Err(anyhow!("--write-ratio {} out of range (0..=1)", write_ratio));
    }
    let cfg = geometry.apply(SsdConfig::from_env());
    let mut ssd = Ssd::new(cfg)?;
    let usable = ssd.geometry().usable_pages;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut counters = RunCounters::default();
    let mut stopped_early: Option<String> = None;

    // Пул уже записанных адресов для выбора жертвы чтения.
    let mut written: Vec<u64> = Vec::new();
    let mut written_mark = vec![false; usable as usize];

    for n in 0..events {
        let now = n as f64 * ARRIVAL_STEP;
        let do_write = written.is_empty() || rng.gen_bool(write_ratio);

        if do_write {
            let lba = rng.gen_range(0..usable);
            match ssd.event_arrive(EventKind::Write, lba, now) {
                Ok(_) => {
                    counters.host_writes += 1;
                    if !written_mark[lba as usize] {
                        written_mark[lba as usize] = true;
                        written.push(lba);
                    }
                }
                Err(e) => {
                    counters.write_failures += 1;
                    counters.classify(&e);
                    if RunCounters::is_terminal(&e) {
                        stopped_early = Some(format!("{:#}", e));
                        break;
                    }
                }
            }
        } else {
            let lba = written[rng.gen_range(0..written.len())];
            match ssd.event_arrive(EventKind::Read, lba, now) {
                Ok(_) => counters.host_reads += 1,
                Err(e) => {
                    counters.read_failures += 1;
                    counters.classify(&e);
                }
            }
        }
    }

    print_summary(&ssd, &counters, stopped_early.as_deref(), json);
    Ok(())
}

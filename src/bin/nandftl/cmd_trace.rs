use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use NandFTL::{EventKind, Ssd, SsdConfig};

use crate::cli::GeometryArgs;
use crate::util::{print_summary, RunCounters};

/// Проиграть текстовую трассу: `<start_time> <R|W> <lba>` на строку,
/// пустые строки и `#`-комментарии пропускаются.
pub fn exec(geometry: GeometryArgs, file: PathBuf, json: bool) -> Result<()> {
    let cfg = geometry.apply(SsdConfig::from_env());
    let mut ssd = Ssd::new(cfg)?;

    let text = fs::read_to_string(&file)
        .with_context(|| format!("read trace {}", file.display()))?;

    let mut counters = RunCounters::default();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((start_time, kind, lba)) = parse_line(line) else {
            eprintln!("trace: bad line {}: {:?}", lineno + 1, line);
            counters.parse_errors += 1;
            continue;
        };

        match ssd.event_arrive(kind, lba, start_time) {
            Ok(_) => match kind {
                EventKind::Read => counters.host_reads += 1,
                _ => counters.host_writes += 1,
            },
            Err(e) => {
                match kind {
                    EventKind::Read => counters.read_failures += 1,
                    _ => counters.write_failures += 1,
                }
                counters.classify(&e);
            }
        }
    }

    print_summary(&ssd, &counters, None, json);
    Ok(())
}

fn parse_line(line: &str) -> Option<(f64, EventKind, u64)> {
    let mut it = line.split_whitespace();
    let start_time = it.next()?.parse::<f64>().ok()?;
    let kind = match it.next()? {
        "R" | "r" | "READ" | "read" => EventKind::Read,
        "W" | "w" | "WRITE" | "write" => EventKind::Write,
        _ => return None,
    };
    let lba = it.next()?.parse::<u64>().ok()?;
    Some((start_time, kind, lba))
}

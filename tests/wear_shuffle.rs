use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use NandFTL::{EventKind, FtlError, Ssd, SsdConfig};

// Балансировка износа: при пустом пуле shuffle повышает сильно стёртый
// log-блок до data-роли и отдаёт в пул слабо стёртый data-блок.

#[test]
fn pool_exhaustion_triggers_shuffle() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;
    let mut t = Clock::default();

    // Identity-записи блока 0, потом заполнение его log-блока (пул пустеет).
    for lba in 0..4 {
        ssd.event_arrive(EventKind::Write, lba, t.next())?;
    }
    for _ in 0..4 {
        ssd.event_arrive(EventKind::Write, 0, t.next())?;
    }
    ssd.event_arrive(EventKind::Write, 0, t.next())?; // clean
    assert!(ssd.ftl().free_pool().is_empty());

    // Новому логическому блоку нужен log-блок: его добывает shuffle.
    ssd.event_arrive(EventKind::Write, 4, t.next())?; // identity
    let w = ssd.event_arrive(EventKind::Write, 4, t.next())?;
    let a = w.address().unwrap();
    assert_eq!((a.block, a.page), (2, 0), "demoted block serves as the log");

    let ftl = ssd.ftl();
    // Пара (блок 0, блок 3) слита и распущена; бывший log-блок 3 стал
    // data-блоком логического блока 2; блок 2 ушёл в пул и тут же выдан
    // под log для data-блока 1.
    assert_eq!(ftl.log_block_of(0), None);
    assert_eq!(ftl.data_block_of(8), 12);
    assert_eq!(ftl.log_block_of(4), Some(8));
    assert_eq!(ftl.manifest_of(8), Some(&[0u32][..]));
    assert!(ftl.free_pool().is_empty());

    assert_eq!(ftl.erase_count_at(0), 2);
    assert_eq!(ftl.erase_count_at(4), 1);
    assert_eq!(ftl.erase_count_at(8), 2);
    assert_eq!(ftl.erase_count_at(12), 2);

    // Данные пережили обе уборки.
    for lba in [0u64, 1, 2, 3, 4] {
        let r = ssd.event_arrive(EventKind::Read, lba, t.next())?;
        let pba = ssd.geometry().linear_of(&r.address().unwrap());
        assert!(ssd.nand().is_valid(lba, pba), "stale read of lba {}", lba);
    }
    Ok(())
}

#[test]
fn lifetime_ends_with_clean_failure() -> Result<()> {
    // Крошечный ресурс: горячий логический блок 0, блоки 1/2 остаются
    // пустыми под scratch. Конец жизни — за десятки событий.
    let mut ssd = Ssd::new(reference_config())?;
    let mut t = Clock::default();
    let hot_lbas = 4u64;

    for lba in 0..hot_lbas {
        ssd.event_arrive(EventKind::Write, lba, t.next())?;
    }

    let mut rng = StdRng::seed_from_u64(7);
    let mut terminal = None;
    for _ in 0..10_000 {
        let lba = rng.gen_range(0..hot_lbas);
        match ssd.event_arrive(EventKind::Write, lba, t.next()) {
            Ok(_) => {}
            Err(e) => {
                terminal = Some(e);
                break;
            }
        }
        assert_wear_bounded(&ssd);
    }

    let err = terminal.expect("terminal failure must arrive within the bound");
    match err.downcast_ref::<FtlError>() {
        Some(FtlError::PoolExhausted) | Some(FtlError::EraseCapReached) => {}
        other => panic!("unexpected terminal failure: {:?}", other),
    }

    // Отказ чистый: инварианты стоят, чтение живых данных работает.
    assert_wear_bounded(&ssd);
    let probe = rng.gen_range(0..hot_lbas);
    let r = ssd.event_arrive(EventKind::Read, probe, t.next())?;
    let pba = ssd.geometry().linear_of(&r.address().unwrap());
    assert!(ssd.nand().is_valid(probe, pba));
    Ok(())
}

#[test]
fn wear_spread_stays_within_budget() -> Result<()> {
    let mut ssd = Ssd::new(churn_config())?;
    let mut t = Clock::default();
    // Половина логических блоков горячая, вторая остаётся scratch-резервом.
    let hot_lbas = ssd.geometry().usable_pages / 2;

    for lba in 0..hot_lbas {
        ssd.event_arrive(EventKind::Write, lba, t.next())?;
    }

    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..5_000 {
        let lba = rng.gen_range(0..hot_lbas);
        if ssd.event_arrive(EventKind::Write, lba, t.next()).is_err() {
            break;
        }
        assert_wear_bounded(&ssd);
    }
    assert_wear_bounded(&ssd);
    Ok(())
}

// max(erase_count) ≤ лимит и разброс max−min ≤ лимит — после каждого события.
fn assert_wear_bounded(ssd: &Ssd) {
    let g = ssd.geometry();
    let cap = g.block_erases;
    let counts: Vec<u32> = (0..g.num_physical_blocks)
        .map(|b| ssd.ftl().erase_count_at(b * g.block_size))
        .collect();
    let max = *counts.iter().max().unwrap();
    let min = *counts.iter().min().unwrap();
    assert!(max <= cap, "erase count {} beyond cap {}", max, cap);
    assert!(max - min <= cap, "wear spread {} beyond cap", max - min);
}

#[derive(Default)]
struct Clock(u64);

impl Clock {
    fn next(&mut self) -> f64 {
        self.0 += 1;
        self.0 as f64 * 0.001
    }
}

fn reference_config() -> SsdConfig {
    SsdConfig::default()
        .with_geometry(1, 1, 1, 4, 4)
        .with_block_erases(5)
        .with_overprovisioning(25)
}

fn churn_config() -> SsdConfig {
    SsdConfig::default()
        .with_geometry(1, 1, 1, 8, 4)
        .with_block_erases(8)
        .with_overprovisioning(25)
}

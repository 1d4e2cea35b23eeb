use anyhow::Result;

use NandFTL::{EventKind, FtlError, Ssd, SsdConfig};

// Геометрия приёмочных сценариев: 16 физических страниц, блоки по 4,
// usable 12 (логические блоки 0/1/2), пул — один блок (база 12).

#[test]
fn fresh_write_then_read_hits_identity_page() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;

    let w = ssd.event_arrive(EventKind::Write, 0, 0.0)?;
    let wa = w.address().expect("write must carry an address");
    assert_eq!(
        (wa.package, wa.die, wa.plane, wa.block, wa.page),
        (0, 0, 0, 0, 0)
    );

    let r = ssd.event_arrive(EventKind::Read, 0, 0.001)?;
    let ra = r.address().expect("read must carry an address");
    assert_eq!(ra, wa, "read must resolve to the same physical page");

    // Первая запись не выделяет log-блок.
    assert!(ssd.ftl().log_block_of(0).is_none());
    assert_eq!(ssd.ftl().free_pool(), &[12]);
    assert!(ssd.nand().is_valid(0, 0));
    Ok(())
}

#[test]
fn overwrite_allocates_log_block() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;

    ssd.event_arrive(EventKind::Write, 0, 0.0)?;
    let w = ssd.event_arrive(EventKind::Write, 0, 0.001)?;
    let a = w.address().unwrap();
    assert_eq!((a.block, a.page), (3, 0), "overwrite goes to the pool block");

    assert_eq!(ssd.ftl().log_block_of(0), Some(12));
    assert_eq!(ssd.ftl().manifest_of(12), Some(&[0u32][..]));
    assert!(ssd.ftl().free_pool().is_empty());
    Ok(())
}

#[test]
fn read_resolves_to_last_log_occurrence() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;

    ssd.event_arrive(EventKind::Write, 0, 0.0)?; // identity
    ssd.event_arrive(EventKind::Write, 0, 0.001)?; // log page 0
    ssd.event_arrive(EventKind::Write, 0, 0.002)?; // log page 1

    assert_eq!(ssd.ftl().manifest_of(12), Some(&[0u32, 0][..]));

    let r = ssd.event_arrive(EventKind::Read, 0, 0.003)?;
    let a = r.address().unwrap();
    assert_eq!((a.block, a.page), (3, 1), "freshest copy is the last append");
    assert!(ssd.nand().is_valid(0, 13));
    Ok(())
}

#[test]
fn back_to_back_reads_resolve_identically() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;

    ssd.event_arrive(EventKind::Write, 5, 0.0)?;
    ssd.event_arrive(EventKind::Write, 5, 0.001)?;

    let first = ssd.event_arrive(EventKind::Read, 5, 0.002)?.address();
    let second = ssd.event_arrive(EventKind::Read, 5, 0.003)?.address();
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn read_of_unwritten_page_fails() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;

    let err = ssd
        .event_arrive(EventKind::Read, 5, 0.0)
        .expect_err("read before write must fail");
    assert_eq!(
        err.downcast_ref::<FtlError>(),
        Some(&FtlError::ReadBeforeWrite(5))
    );
    Ok(())
}

#[test]
fn out_of_range_address_fails() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;

    let err = ssd
        .event_arrive(EventKind::Write, 12, 0.0)
        .expect_err("lba 12 is beyond usable capacity");
    assert_eq!(
        err.downcast_ref::<FtlError>(),
        Some(&FtlError::LogicalOutOfRange(12))
    );
    Ok(())
}

#[test]
fn host_erase_and_merge_are_rejected() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;
    ssd.event_arrive(EventKind::Write, 0, 0.0)?;

    for kind in [EventKind::Erase, EventKind::Merge] {
        let err = ssd
            .event_arrive(kind, 0, 0.001)
            .expect_err("host-side erase/merge must fail");
        assert_eq!(
            err.downcast_ref::<FtlError>(),
            Some(&FtlError::UnsupportedHostOp(kind))
        );
    }

    // Отказ не тронул состояние: чтение работает как прежде.
    let r = ssd.event_arrive(EventKind::Read, 0, 0.002)?;
    assert!(r.address().is_some());
    Ok(())
}

#[test]
fn service_time_accumulates() -> Result<()> {
    let mut ssd = Ssd::new(reference_config())?;

    let w = ssd.event_arrive(EventKind::Write, 0, 0.0)?;
    assert!(w.time_taken() > 0.0, "write must cost simulated time");
    let r = ssd.event_arrive(EventKind::Read, 0, 0.001)?;
    assert!(r.time_taken() > 0.0);
    assert!(ssd.total_time() >= w.time_taken() + r.time_taken());
    assert_eq!(ssd.events_served(), 2);
    Ok(())
}

fn reference_config() -> SsdConfig {
    SsdConfig::default()
        .with_geometry(1, 1, 1, 4, 4)
        .with_block_erases(5)
        .with_overprovisioning(25)
}

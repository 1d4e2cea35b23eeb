use anyhow::Result;

use NandFTL::addr::Geometry;
use NandFTL::device::{Controller, NandController, PageState};
use NandFTL::{Event, EventKind, SsdConfig, Status};

// Поведение модели устройства само по себе: erase-before-write, бюджет
// стираний, контроль долговечности при стирании.

#[test]
fn write_requires_erased_page() -> Result<()> {
    let (geom, mut ctl) = device();

    assert_eq!(issue_write(&mut ctl, &geom, 0, 0), Status::Success);
    assert_eq!(ctl.nand().page_state(0), PageState::Valid);

    // Повторная запись той же страницы без стирания запрещена.
    assert_eq!(issue_write(&mut ctl, &geom, 0, 0), Status::Failure);
    Ok(())
}

#[test]
fn read_of_empty_page_fails() -> Result<()> {
    let (geom, mut ctl) = device();

    assert_eq!(issue_read(&mut ctl, &geom, 3, 3), Status::Failure);
    assert_eq!(issue_write(&mut ctl, &geom, 3, 3), Status::Success);
    assert_eq!(issue_read(&mut ctl, &geom, 3, 3), Status::Success);
    Ok(())
}

#[test]
fn erase_budget_is_enforced() -> Result<()> {
    let (geom, mut ctl) = device_with_erases(2);

    assert_eq!(issue_erase(&mut ctl, &geom, 0), Status::Success);
    assert_eq!(issue_erase(&mut ctl, &geom, 0), Status::Success);
    assert_eq!(ctl.nand().erases_remaining_of(0), 0);
    assert_eq!(issue_erase(&mut ctl, &geom, 0), Status::BlockCorrupt);
    assert_eq!(ctl.nand().max_erases_seen(), 2);
    Ok(())
}

#[test]
fn erase_refuses_to_destroy_fresh_copies() -> Result<()> {
    let (geom, mut ctl) = device();

    // Свежая копия lba 0 живёт в блоке 0 — стирать нельзя.
    assert_eq!(issue_write(&mut ctl, &geom, 0, 0), Status::Success);
    assert_eq!(issue_erase(&mut ctl, &geom, 0), Status::Failure);

    // Копия переехала в блок 1 — теперь блок 0 стирается.
    assert_eq!(issue_write(&mut ctl, &geom, 0, 4), Status::Success);
    assert!(ctl.nand().is_valid(0, 4));
    assert_eq!(ctl.nand().live_pages_in(0), 0);
    assert_eq!(issue_erase(&mut ctl, &geom, 0), Status::Success);

    // После стирания страницы блока снова пусты.
    for pba in 0..4 {
        assert_eq!(ctl.nand().page_state(pba), PageState::Empty);
    }
    Ok(())
}

#[test]
fn merge_is_not_implemented() -> Result<()> {
    let (geom, mut ctl) = device();

    let mut ev = Event::new(EventKind::Merge, 0, 1, 0.0);
    ev.set_address(geom.page_address(0));
    assert_eq!(ctl.issue(&mut ev), Status::Failure);
    Ok(())
}

#[test]
fn delays_accumulate_into_the_event() -> Result<()> {
    let cfg = config();
    let (geom, mut ctl) = device();

    let mut w = Event::new(EventKind::Write, 0, 1, 0.0);
    w.set_address(geom.page_address(0));
    assert_eq!(ctl.issue(&mut w), Status::Success);
    assert!(w.time_taken() >= cfg.page_write_delay);

    let mut e = Event::new(EventKind::Erase, 0, 1, 0.25);
    e.set_address(geom.block_address(4));
    assert_eq!(ctl.issue(&mut e), Status::Success);
    assert!(e.time_taken() >= cfg.block_erase_delay);
    assert_eq!(ctl.nand().last_erase_time_of(4), 0.25);
    Ok(())
}

#[test]
fn missing_or_bogus_address_is_rejected() -> Result<()> {
    let (geom, mut ctl) = device();

    let mut ev = Event::new(EventKind::Read, 0, 1, 0.0);
    assert_eq!(ctl.issue(&mut ev), Status::Failure);

    let mut bad = geom.page_address(0);
    bad.page = 99;
    let mut ev = Event::new(EventKind::Read, 0, 1, 0.0);
    ev.set_address(bad);
    assert_eq!(ctl.issue(&mut ev), Status::PageInvalid);
    Ok(())
}

// ---------- helpers ----------

fn config() -> SsdConfig {
    SsdConfig::default()
        .with_geometry(1, 1, 1, 4, 4)
        .with_block_erases(5)
        .with_overprovisioning(25)
}

fn device() -> (Geometry, NandController) {
    let cfg = config();
    cfg.validate().unwrap();
    let geom = Geometry::new(&cfg);
    (geom, NandController::new(&cfg, geom))
}

fn device_with_erases(erases: u32) -> (Geometry, NandController) {
    let cfg = config().with_block_erases(erases);
    cfg.validate().unwrap();
    let geom = Geometry::new(&cfg);
    (geom, NandController::new(&cfg, geom))
}

fn issue_read(ctl: &mut NandController, geom: &Geometry, lba: u64, pba: u64) -> Status {
    let mut ev = Event::new(EventKind::Read, lba, 1, 0.0);
    ev.set_address(geom.page_address(pba));
    ctl.issue(&mut ev)
}

fn issue_write(ctl: &mut NandController, geom: &Geometry, lba: u64, pba: u64) -> Status {
    let mut ev = Event::new(EventKind::Write, lba, 1, 0.0);
    ev.set_address(geom.page_address(pba));
    ctl.issue(&mut ev)
}

fn issue_erase(ctl: &mut NandController, geom: &Geometry, block_base: u64) -> Status {
    let mut ev = Event::new(EventKind::Erase, 0, 1, 0.0);
    ev.set_address(geom.block_address(block_base));
    ctl.issue(&mut ev)
}

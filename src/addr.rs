//! addr — адресная арифметика.
//!
//! `Geometry` — выведенные из конфига размеры (raw/op/usable, число блоков)
//! плюс преобразования линейный номер страницы <-> кортеж
//! (package, die, plane, block, page). Топология статична, поэтому никаких
//! ссылок на «родителя» — только индексы.

use num_integer::div_rem;
use std::fmt;

use crate::config::SsdConfig;

/// До какого уровня в адресе заполнены поля (erase адресует блок, page-ops —
/// страницу).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AddrLevel {
    None,
    Package,
    Die,
    Plane,
    Block,
    Page,
}

/// Физический адрес в иерархии устройства.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub package: u32,
    pub die: u32,
    pub plane: u32,
    pub block: u32,
    pub page: u32,
    pub level: AddrLevel,
}

/// Размеры, выведенные из валидного `SsdConfig`.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub ssd_size: u64,
    pub package_size: u64,
    pub die_size: u64,
    pub plane_size: u64,
    pub block_size: u64,
    pub block_erases: u32,

    pub raw_pages: u64,
    pub op_pages: u64,
    pub usable_pages: u64,
    pub num_logical_blocks: u64,
    pub num_physical_blocks: u64,
}

impl Geometry {
    /// Построить из конфига. Конфиг должен быть проверен `validate()`.
    pub fn new(cfg: &SsdConfig) -> Self {
        let raw = cfg.raw_pages();
        let op = cfg.op_pages();
        let usable = cfg.usable_pages();
        let bs = cfg.block_size as u64;
        Self {
            ssd_size: cfg.ssd_size as u64,
            package_size: cfg.package_size as u64,
            die_size: cfg.die_size as u64,
            plane_size: cfg.plane_size as u64,
            block_size: bs,
            block_erases: cfg.block_erases,
            raw_pages: raw,
            op_pages: op,
            usable_pages: usable,
            num_logical_blocks: usable / bs,
            num_physical_blocks: raw / bs,
        }
    }

    /// Номер страницы внутри блока.
    #[inline]
    pub fn page_offset(&self, linear: u64) -> u32 {
        (linear % self.block_size) as u32
    }

    /// База блока (линейный адрес его нулевой страницы).
    #[inline]
    pub fn block_base(&self, linear: u64) -> u64 {
        linear - linear % self.block_size
    }

    /// Индекс физического блока.
    #[inline]
    pub fn block_index(&self, linear: u64) -> u64 {
        linear / self.block_size
    }

    /// Разложить линейный номер страницы в кортеж устройства (уровень PAGE).
    pub fn page_address(&self, linear: u64) -> Address {
        debug_assert!(linear < self.raw_pages);
        let (blocks, page) = div_rem(linear, self.block_size);
        let (planes, block) = div_rem(blocks, self.plane_size);
        let (dies, plane) = div_rem(planes, self.die_size);
        let (packages, die) = div_rem(dies, self.package_size);
        Address {
            package: (packages % self.ssd_size) as u32,
            die: die as u32,
            plane: plane as u32,
            block: block as u32,
            page: page as u32,
            level: AddrLevel::Page,
        }
    }

    /// Адрес блока (уровень BLOCK, page = 0) по любой его странице.
    pub fn block_address(&self, linear: u64) -> Address {
        let mut a = self.page_address(self.block_base(linear));
        a.level = AddrLevel::Block;
        a
    }

    /// Обратное преобразование кортежа в линейный номер страницы.
    pub fn linear_of(&self, a: &Address) -> u64 {
        let blocks = ((a.package as u64 * self.package_size + a.die as u64) * self.die_size
            + a.plane as u64)
            * self.plane_size
            + a.block as u64;
        blocks * self.block_size + a.page as u64
    }

    /// Проверка, что кортеж не выходит за пределы геометрии.
    pub fn address_valid(&self, a: &Address) -> bool {
        (a.package as u64) < self.ssd_size
            && (a.die as u64) < self.package_size
            && (a.plane as u64) < self.die_size
            && (a.block as u64) < self.plane_size
            && (a.page as u64) < self.block_size
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{},{},{})",
            self.package, self.die, self.plane, self.block, self.page
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SsdConfig;

    fn geom() -> Geometry {
        // 2 packages * 2 dies * 2 planes * 4 blocks * 4 pages = 256 страниц
        let cfg = SsdConfig::default()
            .with_geometry(2, 2, 2, 4, 4)
            .with_overprovisioning(25);
        cfg.validate().unwrap();
        Geometry::new(&cfg)
    }

    #[test]
    fn decompose_compose_roundtrip() {
        let g = geom();
        for linear in 0..g.raw_pages {
            let a = g.page_address(linear);
            assert!(g.address_valid(&a), "addr {} out of range", a);
            assert_eq!(g.linear_of(&a), linear);
        }
    }

    #[test]
    fn block_address_is_page_zero() {
        let g = geom();
        let a = g.block_address(13);
        assert_eq!(a.page, 0);
        assert_eq!(a.level, AddrLevel::Block);
        assert_eq!(g.linear_of(&a), 12);
    }

    #[test]
    fn derived_counts() {
        let g = geom();
        assert_eq!(g.raw_pages, 256);
        assert_eq!(g.op_pages, 64);
        assert_eq!(g.usable_pages, 192);
        assert_eq!(g.num_logical_blocks, 48);
        assert_eq!(g.num_physical_blocks, 64);
    }
}

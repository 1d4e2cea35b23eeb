//! ftl/manifest — журнал страниц log-блока.
//!
//! Упорядоченная последовательность page-офсетов [0, block_size): в каком
//! порядке логические страницы дописывались в log-блок. Длина списка — число
//! занятых страниц; позиция ПОСЛЕДНЕГО вхождения офсета — физическая
//! страница со свежей копией.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogManifest {
    offsets: Vec<u32>,
}

impl LogManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Манифест свежеочищенного log-блока с единственной записью.
    pub fn with_first(offset: u32) -> Self {
        Self {
            offsets: vec![offset],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.offsets
    }

    /// Дописать офсет в хвост (страница с индексом len-1 после вызова).
    pub fn append(&mut self, offset: u32) {
        self.offsets.push(offset);
    }

    /// Индекс страницы со свежей копией данного офсета: последнее вхождение.
    pub fn fetch_log_page(&self, data_page: u32) -> Option<u32> {
        self.offsets
            .iter()
            .rposition(|&o| o == data_page)
            .map(|i| i as u32)
    }

    /// Индекс следующей свободной страницы, если блок не заполнен.
    pub fn next_free_log_page(&self, block_size: u64) -> Option<u32> {
        if (self.offsets.len() as u64) < block_size {
            Some(self.offsets.len() as u32)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_occurrence_wins() {
        let mut m = LogManifest::new();
        m.append(0);
        m.append(2);
        m.append(0);
        assert_eq!(m.fetch_log_page(0), Some(2));
        assert_eq!(m.fetch_log_page(2), Some(1));
        assert_eq!(m.fetch_log_page(1), None);
    }

    #[test]
    fn next_free_until_full() {
        let mut m = LogManifest::with_first(3);
        assert_eq!(m.next_free_log_page(4), Some(1));
        m.append(3);
        m.append(3);
        assert_eq!(m.next_free_log_page(4), Some(3));
        m.append(1);
        assert_eq!(m.next_free_log_page(4), None);
    }

    #[test]
    fn empty_manifest_has_no_pages() {
        let m = LogManifest::new();
        assert_eq!(m.fetch_log_page(0), None);
        assert_eq!(m.next_free_log_page(4), Some(0));
    }
}

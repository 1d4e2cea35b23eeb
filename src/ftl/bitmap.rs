//! ftl/bitmap — битовая карта «логическая страница записана».
//!
//! Один бит на логическую страницу; бит взводится первой записью и больше
//! не сбрасывается. Чтение по сброшенному биту — отказ транслятора.

use crate::consts::BITMAP_WORD_BITS;

#[derive(Debug, Clone)]
pub struct WrittenMap {
    words: Vec<u64>,
    len: u64,
}

impl WrittenMap {
    pub fn new(len: u64) -> Self {
        let nwords = (len + BITMAP_WORD_BITS - 1) / BITMAP_WORD_BITS;
        Self {
            words: vec![0u64; nwords as usize],
            len,
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, idx: u64) -> bool {
        debug_assert!(idx < self.len);
        let word = self.words[(idx / BITMAP_WORD_BITS) as usize];
        (word >> (idx % BITMAP_WORD_BITS)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, idx: u64) {
        debug_assert!(idx < self.len);
        self.words[(idx / BITMAP_WORD_BITS) as usize] |= 1 << (idx % BITMAP_WORD_BITS);
    }

    /// Сколько страниц хоть раз записано.
    pub fn count_set(&self) -> u64 {
        self.words.iter().map(|w| w.count_ones() as u64).sum()
    }

    /// Все ли биты диапазона [start, start + count) сброшены.
    pub fn range_clear(&self, start: u64, count: u64) -> bool {
        (start..start + count).all(|i| !self.get(i))
    }
}

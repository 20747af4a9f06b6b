// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use core::fmt;

use bit_field::BitField;

/// A 36-bit machine word held in the low bits of a u64. For transfer
/// purposes a word decomposes into six 6-bit symbols, most significant
/// symbol first, one symbol per tape character frame.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Word(u64);

impl Word {
    pub const BITS: usize = 36;
    pub const SYMBOLS: usize = 6;
    pub const SYMBOL_BITS: usize = 6;

    const MASK: u64 = (1 << Word::BITS) - 1;

    pub fn from_bits(value: u64) -> Self {
        Word(value & Word::MASK)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    /// Extract the symbol at the given position, 0 being the most significant.
    pub fn symbol(self, index: usize) -> u8 {
        assert!(index < Word::SYMBOLS);
        let hi = Word::BITS - index * Word::SYMBOL_BITS;
        self.0.get_bits(hi - Word::SYMBOL_BITS..hi) as u8
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:012o}", self.0)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:012o}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bits_masks_to_36_bits() {
        let word = Word::from_bits(0xf_fff_fff_fff);
        assert_eq!(0xfff_fff_fff, word.bits());
    }

    #[test]
    fn symbol_order_is_most_significant_first() {
        let word = Word::from_bits(0o010203040506);
        assert_eq!(0o01, word.symbol(0));
        assert_eq!(0o02, word.symbol(1));
        assert_eq!(0o03, word.symbol(2));
        assert_eq!(0o04, word.symbol(3));
        assert_eq!(0o05, word.symbol(4));
        assert_eq!(0o06, word.symbol(5));
    }

    #[test]
    fn display_is_octal() {
        let word = Word::from_bits(0o123456701234);
        assert_eq!("123456701234", format!("{}", word));
    }
}

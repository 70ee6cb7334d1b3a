//! Minimal alphabet abstraction used by the alignment and search engines.
//!
//! The engines only need a symbol's rank in `[0, SIZE)`, equality and a total
//! order. Character conversion exists for printing alignments.

use std::fmt::Debug;

use crate::error::{Error, Result};

pub trait Alphabet: Copy + Eq + Ord + Debug + Send + Sync + 'static {
    /// Number of distinct symbols.
    const SIZE: usize;

    fn rank(self) -> usize;

    /// Inverse of [`Alphabet::rank`]. Ranks outside `[0, SIZE)` are clamped.
    fn from_rank(rank: usize) -> Self;

    fn to_char(self) -> char;
}

/// Nucleotide alphabet without ambiguity codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dna4 {
    A,
    C,
    G,
    T,
}

impl Dna4 {
    pub const fn from_ascii(b: u8) -> Option<Self> {
        match b {
            b'A' | b'a' => Some(Dna4::A),
            b'C' | b'c' => Some(Dna4::C),
            b'G' | b'g' => Some(Dna4::G),
            b'T' | b't' | b'U' | b'u' => Some(Dna4::T),
            _ => None,
        }
    }

    /// Encode an ASCII nucleotide string.
    pub fn encode(seq: &[u8]) -> Result<Vec<Self>> {
        seq.iter()
            .enumerate()
            .map(|(i, &b)| {
                Self::from_ascii(b).ok_or_else(|| {
                    Error::input(format!("invalid nucleotide {:?} at offset {i}", b as char))
                })
            })
            .collect()
    }
}

impl Alphabet for Dna4 {
    const SIZE: usize = 4;

    #[inline(always)]
    fn rank(self) -> usize {
        self as usize
    }

    #[inline(always)]
    fn from_rank(rank: usize) -> Self {
        match rank {
            0 => Dna4::A,
            1 => Dna4::C,
            2 => Dna4::G,
            _ => Dna4::T,
        }
    }

    fn to_char(self) -> char {
        ['A', 'C', 'G', 'T'][self as usize]
    }
}

/// Nucleotide alphabet with `N`. Anything that is not A/C/G/T/U maps to `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dna5 {
    A,
    C,
    G,
    N,
    T,
}

impl Dna5 {
    pub const fn from_ascii(b: u8) -> Self {
        match b {
            b'A' | b'a' => Dna5::A,
            b'C' | b'c' => Dna5::C,
            b'G' | b'g' => Dna5::G,
            b'T' | b't' | b'U' | b'u' => Dna5::T,
            _ => Dna5::N,
        }
    }

    pub fn encode(seq: &[u8]) -> Vec<Self> {
        seq.iter().map(|&b| Self::from_ascii(b)).collect()
    }
}

impl Alphabet for Dna5 {
    const SIZE: usize = 5;

    #[inline(always)]
    fn rank(self) -> usize {
        self as usize
    }

    #[inline(always)]
    fn from_rank(rank: usize) -> Self {
        match rank {
            0 => Dna5::A,
            1 => Dna5::C,
            2 => Dna5::G,
            3 => Dna5::N,
            _ => Dna5::T,
        }
    }

    fn to_char(self) -> char {
        ['A', 'C', 'G', 'N', 'T'][self as usize]
    }
}

/// The twenty standard amino acids, ordered by one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Aa20 {
    A,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    K,
    L,
    M,
    N,
    P,
    Q,
    R,
    S,
    T,
    V,
    W,
    Y,
}

const AA20_SYMBOLS: [Aa20; 20] = [
    Aa20::A, Aa20::C, Aa20::D, Aa20::E, Aa20::F, Aa20::G, Aa20::H, Aa20::I, Aa20::K, Aa20::L,
    Aa20::M, Aa20::N, Aa20::P, Aa20::Q, Aa20::R, Aa20::S, Aa20::T, Aa20::V, Aa20::W, Aa20::Y,
];

impl Aa20 {
    pub const fn from_ascii(b: u8) -> Option<Self> {
        match b {
            b'A' | b'a' => Some(Aa20::A),
            b'C' | b'c' => Some(Aa20::C),
            b'D' | b'd' => Some(Aa20::D),
            b'E' | b'e' => Some(Aa20::E),
            b'F' | b'f' => Some(Aa20::F),
            b'G' | b'g' => Some(Aa20::G),
            b'H' | b'h' => Some(Aa20::H),
            b'I' | b'i' => Some(Aa20::I),
            b'K' | b'k' => Some(Aa20::K),
            b'L' | b'l' => Some(Aa20::L),
            b'M' | b'm' => Some(Aa20::M),
            b'N' | b'n' => Some(Aa20::N),
            b'P' | b'p' => Some(Aa20::P),
            b'Q' | b'q' => Some(Aa20::Q),
            b'R' | b'r' => Some(Aa20::R),
            b'S' | b's' => Some(Aa20::S),
            b'T' | b't' => Some(Aa20::T),
            b'V' | b'v' => Some(Aa20::V),
            b'W' | b'w' => Some(Aa20::W),
            b'Y' | b'y' => Some(Aa20::Y),
            _ => None,
        }
    }

    /// Encode an ASCII protein string.
    pub fn encode(seq: &[u8]) -> Result<Vec<Self>> {
        seq.iter()
            .enumerate()
            .map(|(i, &b)| {
                Self::from_ascii(b).ok_or_else(|| {
                    Error::input(format!("invalid amino acid {:?} at offset {i}", b as char))
                })
            })
            .collect()
    }
}

impl Alphabet for Aa20 {
    const SIZE: usize = 20;

    #[inline(always)]
    fn rank(self) -> usize {
        self as usize
    }

    #[inline(always)]
    fn from_rank(rank: usize) -> Self {
        AA20_SYMBOLS[rank.min(Self::SIZE - 1)]
    }

    fn to_char(self) -> char {
        b"ACDEFGHIKLMNPQRSTVWY"[self as usize] as char
    }
}

/// Raw bytes, used for plain-text search.
impl Alphabet for u8 {
    const SIZE: usize = 256;

    #[inline(always)]
    fn rank(self) -> usize {
        self as usize
    }

    #[inline(always)]
    fn from_rank(rank: usize) -> Self {
        rank.min(255) as u8
    }

    fn to_char(self) -> char {
        self as char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna4_round_trips_through_rank() {
        for rank in 0..Dna4::SIZE {
            assert_eq!(Dna4::from_rank(rank).rank(), rank);
        }
        assert_eq!(Dna4::encode(b"acgu").unwrap(), vec![Dna4::A, Dna4::C, Dna4::G, Dna4::T]);
    }

    #[test]
    fn dna4_rejects_unknown_symbols() {
        let err = Dna4::encode(b"ACNT").unwrap_err();
        assert!(matches!(err, Error::Input(_)), "N is not a Dna4 symbol: {err}");
    }

    #[test]
    fn aa20_round_trips_through_rank() {
        for rank in 0..Aa20::SIZE {
            assert_eq!(Aa20::from_rank(rank).rank(), rank);
        }
        let seq = Aa20::encode(b"MkWy").unwrap();
        assert_eq!(seq, vec![Aa20::M, Aa20::K, Aa20::W, Aa20::Y]);
        assert_eq!(seq.iter().map(|a| a.to_char()).collect::<String>(), "MKWY");
        assert!(matches!(Aa20::encode(b"MXB"), Err(Error::Input(_))));
    }

    #[test]
    fn dna5_orders_by_rank() {
        let seq = Dna5::encode(b"TNA");
        assert_eq!(seq, vec![Dna5::T, Dna5::N, Dna5::A]);
        assert!(Dna5::A < Dna5::N && Dna5::N < Dna5::T);
    }
}

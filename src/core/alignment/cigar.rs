//! CIGAR rendering and parsing for pairwise alignments.
//!
//! Sequence 1 plays the reference, sequence 2 the query: `I` is a sequence 2
//! symbol against a gap, `D` a sequence 1 symbol against a gap.

use std::fmt::Write;

/// CIGAR operation type with zero-cost conversion to/from bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CigarOp {
    Eq = b'=', // Symbols equal
    X = b'X',  // Symbols differ
    I = b'I',  // Gap in sequence 1
    D = b'D',  // Gap in sequence 2
}

impl CigarOp {
    #[inline(always)]
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'=' => Some(Self::Eq),
            b'X' => Some(Self::X),
            b'I' => Some(Self::I),
            b'D' => Some(Self::D),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    #[inline(always)]
    pub const fn consumes_sequence1(self) -> bool {
        matches!(self, Self::Eq | Self::X | Self::D)
    }

    #[inline(always)]
    pub const fn consumes_sequence2(self) -> bool {
        matches!(self, Self::Eq | Self::X | Self::I)
    }
}

/// Merge adjacent identical operations in place.
///
/// E.g., `[(=, 10), (=, 5)]` → `[(=, 15)]`
#[inline]
pub fn normalize_in_place(cigar: &mut Vec<(CigarOp, u32)>) {
    if cigar.len() <= 1 {
        return;
    }

    let mut write = 0;
    for read in 1..cigar.len() {
        if cigar[read].0 == cigar[write].0 {
            cigar[write].1 += cigar[read].1;
        } else {
            write += 1;
            cigar[write] = cigar[read];
        }
    }
    cigar.truncate(write + 1);
}

/// Render as the usual `<len><op>` string; `*` when empty.
pub fn to_string(cigar: &[(CigarOp, u32)]) -> String {
    if cigar.is_empty() {
        return "*".to_string();
    }
    let mut out = String::with_capacity(cigar.len() * 4);
    for &(op, len) in cigar {
        let _ = write!(out, "{}{}", len, op.to_byte() as char);
    }
    out
}

/// Parse a string produced by [`to_string`].
pub fn parse(text: &str) -> Option<Vec<(CigarOp, u32)>> {
    if text == "*" {
        return Some(Vec::new());
    }
    let mut ops = Vec::new();
    let mut len: u32 = 0;
    let mut have_digits = false;
    for b in text.bytes() {
        if b.is_ascii_digit() {
            len = len.checked_mul(10)?.checked_add((b - b'0') as u32)?;
            have_digits = true;
        } else {
            if !have_digits {
                return None;
            }
            ops.push((CigarOp::from_byte(b)?, len));
            len = 0;
            have_digits = false;
        }
    }
    if have_digits {
        return None;
    }
    Some(ops)
}

/// Symbols of sequence 1 and sequence 2 spanned by a CIGAR.
pub fn spans(cigar: &[(CigarOp, u32)]) -> (usize, usize) {
    cigar.iter().fold((0, 0), |(s1, s2), &(op, len)| {
        (
            s1 + if op.consumes_sequence1() { len as usize } else { 0 },
            s2 + if op.consumes_sequence2() { len as usize } else { 0 },
        )
    })
}

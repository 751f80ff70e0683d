use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of nop instructions, and therefore the label alphabet size.
pub const NUM_NOPS: usize = 3;
/// Longest label a single read will collect.
pub const MAX_LABEL_SIZE: usize = 10;

/// A sequence of nop symbols used both as jump target and binding pattern.
///
/// Symbols are nop modifiers in `0..NUM_NOPS`. Pushing past
/// [`MAX_LABEL_SIZE`] is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CodeLabel {
    nops: Vec<u8>,
}

impl CodeLabel {
    #[must_use]
    pub fn new() -> Self {
        Self { nops: Vec::new() }
    }

    #[must_use]
    pub fn from_nops(nops: &[u8]) -> Self {
        let mut label = Self::new();
        for &nop in nops {
            label.push(nop);
        }
        label
    }

    pub fn push(&mut self, nop: u8) {
        debug_assert!((nop as usize) < NUM_NOPS);
        if self.nops.len() < MAX_LABEL_SIZE {
            self.nops.push(nop);
        }
    }

    pub fn clear(&mut self) {
        self.nops.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nops.is_empty()
    }

    #[must_use]
    pub fn nops(&self) -> &[u8] {
        &self.nops
    }

    /// Rotates every symbol by `rot` within an alphabet of `base` symbols.
    pub fn rotate(&mut self, rot: usize, base: usize) {
        for nop in &mut self.nops {
            *nop = ((*nop as usize + rot) % base) as u8;
        }
    }

    /// The label every binding site must spell for this label to match it.
    #[must_use]
    pub fn complement(&self) -> Self {
        let mut label = self.clone();
        label.rotate(1, NUM_NOPS);
        label
    }

    /// Reads the label as a base-`base` number, most significant symbol first.
    #[must_use]
    pub fn as_int(&self, base: usize) -> i32 {
        self.nops.iter().fold(0i32, |value, &nop| {
            value.wrapping_mul(base as i32).wrapping_add(i32::from(nop))
        })
    }

    /// Reads the label as a reflected grey code.
    #[must_use]
    pub fn as_int_grey_code(&self, base: usize) -> i32 {
        let mut value = 0i32;
        let mut odd_count = 0;
        for &nop in &self.nops {
            value = value.wrapping_mul(base as i32);
            let digit = if odd_count % 2 == 0 {
                i32::from(nop)
            } else {
                (base as i32 - 1) - i32::from(nop)
            };
            value = value.wrapping_add(digit);
            if nop % 2 == 1 {
                odd_count += 1;
            }
        }
        value
    }

    /// Reads the label least significant symbol first.
    #[must_use]
    pub fn as_int_direct(&self, base: usize) -> i32 {
        self.nops.iter().rev().fold(0i32, |value, &nop| {
            value.wrapping_mul(base as i32).wrapping_add(i32::from(nop))
        })
    }

    #[must_use]
    pub fn as_int_additive_polynomial(&self) -> i32 {
        let size = self.nops.len() as f64;
        let value: f64 = self
            .nops
            .iter()
            .enumerate()
            .map(|(i, &nop)| {
                let n = f64::from(nop) + 1.0;
                let a = n.powf(0.4 * (size - 1.0));
                let b = 0.3 * i as f64 * (size - 1.0);
                let c = 0.45 * i as f64;
                a + b + c
            })
            .sum();
        (value + 0.5) as i32
    }

    /// Weights each symbol by the Fibonacci number of its position.
    #[must_use]
    pub fn as_int_fib(&self, base: usize) -> i32 {
        if base < 3 {
            return 0;
        }
        let (mut prev, mut cur) = (0i32, 1i32);
        let mut value = 0i32;
        for (i, &nop) in self.nops.iter().enumerate() {
            let fib = if i == 0 { 0 } else { cur };
            value = value.wrapping_add(fib.wrapping_mul(i32::from(nop)));
            if i > 0 {
                let next = prev.wrapping_add(cur);
                prev = cur;
                cur = next;
            }
        }
        value
    }

    /// Evaluates the symbols as polynomial coefficients at `x = len`.
    #[must_use]
    pub fn as_int_polynomial_coefficient(&self) -> i32 {
        let x = self.nops.len() as i32;
        let mut power = 1i32;
        let mut value = 0i32;
        for &nop in &self.nops {
            value = value.wrapping_add(i32::from(nop).wrapping_mul(power));
            power = power.wrapping_mul(x);
        }
        value
    }
}

impl fmt::Display for CodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &nop in &self.nops {
            write!(f, "{}", (b'A' + nop) as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_rotates_each_symbol() {
        let label = CodeLabel::from_nops(&[0, 1, 2]);
        assert_eq!(label.complement().nops(), &[1, 2, 0]);
    }

    #[test]
    fn test_push_respects_max_size() {
        let mut label = CodeLabel::new();
        for _ in 0..(MAX_LABEL_SIZE + 5) {
            label.push(1);
        }
        assert_eq!(label.len(), MAX_LABEL_SIZE);
    }

    #[test]
    fn test_as_int_readings() {
        let label = CodeLabel::from_nops(&[1, 2]);
        assert_eq!(label.as_int(NUM_NOPS), 5);
        assert_eq!(label.as_int_direct(NUM_NOPS), 7);
        assert_eq!(CodeLabel::new().as_int(NUM_NOPS), 0);
    }

    #[test]
    fn test_grey_code_flips_after_odd_symbol() {
        // B is odd, so the digit after it is reflected: C -> A
        let label = CodeLabel::from_nops(&[1, 2]);
        assert_eq!(label.as_int_grey_code(NUM_NOPS), 3);
    }

    #[test]
    fn test_display_uses_nop_letters() {
        assert_eq!(CodeLabel::from_nops(&[0, 2, 1]).to_string(), "ACB");
    }
}

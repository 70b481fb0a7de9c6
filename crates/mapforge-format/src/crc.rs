//! CRC32 forging.
//!
//! Rewrites four bytes of a buffer so its CRC32 becomes an arbitrary value.
//! Works on bit-reversed CRC values as polynomials over GF(2) modulo the
//! CRC32 generator: the change needed at the end of the buffer is divided by
//! x^(8 * distance to the end) to get the change needed at the patch offset.

use crate::error::FormatError;

/// CRC32 generator polynomial including the x^32 term.
const POLYNOMIAL: u64 = 0x1_04C1_1DB7;

/// Standard (IEEE) CRC32 of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Patch `data[offset..offset + 4]` so that `crc32(data) == target`.
///
/// The buffer length never changes. The result is verified before returning.
pub fn forge(data: &mut [u8], offset: usize, target: u32) -> Result<(), FormatError> {
    if offset.checked_add(4).is_none_or(|end| end > data.len()) {
        return Err(FormatError::OutOfRange {
            offset,
            len: data.len(),
        });
    }

    let current = u64::from(crc32(data).reverse_bits());
    let wanted = u64::from(target.reverse_bits());
    let distance = ((data.len() - offset) as u64) * 8;

    let delta = multiply_mod(reciprocal_mod(pow_mod(2, distance))?, current ^ wanted);
    let patch = (delta as u32).reverse_bits().to_le_bytes();
    for (byte, p) in data[offset..offset + 4].iter_mut().zip(patch) {
        *byte ^= p;
    }

    let actual = crc32(data);
    if actual != target {
        return Err(FormatError::ForgeFailed {
            expected: target,
            actual,
        });
    }
    Ok(())
}

fn multiply_mod(mut x: u64, mut y: u64) -> u64 {
    let mut z = 0;
    while y != 0 {
        if y & 1 != 0 {
            z ^= x;
        }
        y >>= 1;
        x <<= 1;
        if (x >> 32) & 1 != 0 {
            x ^= POLYNOMIAL;
        }
    }
    z
}

fn pow_mod(mut x: u64, mut y: u64) -> u64 {
    let mut z = 1;
    while y != 0 {
        if y & 1 != 0 {
            z = multiply_mod(z, x);
        }
        x = multiply_mod(x, x);
        y >>= 1;
    }
    z
}

/// Polynomial division; returns (quotient, remainder). `y` must be non-zero.
fn divide_and_remainder(mut x: u64, y: u64) -> (u64, u64) {
    if x == 0 {
        return (0, 0);
    }
    let y_degree = degree(y);
    let mut z = 0;
    let x_degree = degree(x);
    if x_degree < y_degree {
        return (0, x);
    }
    for i in (0..=x_degree - y_degree).rev() {
        if (x >> (i + y_degree)) & 1 != 0 {
            x ^= y << i;
            z |= 1 << i;
        }
    }
    (z, x)
}

/// Multiplicative inverse modulo the generator (extended Euclid).
fn reciprocal_mod(value: u64) -> Result<u64, FormatError> {
    let mut x = POLYNOMIAL;
    let mut y = value;
    let mut a = 0;
    let mut b = 1;
    while y != 0 {
        let (q, r) = divide_and_remainder(x, y);
        let c = a ^ multiply_mod(q, b);
        x = y;
        y = r;
        a = b;
        b = c;
    }
    if x == 1 {
        Ok(a)
    } else {
        Err(FormatError::ForgeFailed {
            expected: 0,
            actual: x as u32,
        })
    }
}

fn degree(x: u64) -> u32 {
    63 - x.leading_zeros()
}

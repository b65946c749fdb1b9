// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// A reading cursor over a byte slice, covering the little bit of [bytes::Buf] the register
/// decoders use.
///
/// Multi-byte values on the Unit Thermal2 are always little-endian, so the getters don't carry a
/// byte order suffix. Reading past the end panics, same as `bytes`.
///
/// [bytes::Buf]: https://docs.rs/bytes/*/bytes/trait.Buf.html
pub(crate) trait Buffer {
    /// Skip over `count` bytes.
    fn advance(&mut self, count: usize);

    fn get_u8(&mut self) -> u8;

    fn get_u16(&mut self) -> u16;
}

impl Buffer for &[u8] {
    fn advance(&mut self, count: usize) {
        let remaining = &self[count..];
        *self = remaining;
    }

    fn get_u8(&mut self) -> u8 {
        let value = self[0];
        self.advance(1);
        value
    }

    fn get_u16(&mut self) -> u16 {
        let low = self.get_u8();
        let high = self.get_u8();
        u16::from_le_bytes([low, high])
    }
}

/// The writing counterpart to [`Buffer`], after [bytes::BufMut].
///
/// [bytes::BufMut]: https://docs.rs/bytes/*/bytes/trait.BufMut.html
pub(crate) trait BufferMut {
    fn put_u8(&mut self, value: u8);

    fn put_u16(&mut self, value: u16);

    fn put_slice(&mut self, values: &[u8]);
}

impl BufferMut for &mut [u8] {
    fn put_u8(&mut self, value: u8) {
        self.put_slice(&[value]);
    }

    fn put_u16(&mut self, value: u16) {
        self.put_slice(&value.to_le_bytes());
    }

    fn put_slice(&mut self, values: &[u8]) {
        // Take the slice out of self so the split halves can outlive this borrow.
        let (head, tail) = core::mem::take(self).split_at_mut(values.len());
        head.copy_from_slice(values);
        *self = tail;
    }
}

/// `true` when bit `bit` (counted from the least significant bit, starting at 0) of `flags` is 1.
pub(crate) fn is_bit_set<B>(flags: B, bit: usize) -> bool
where
    B: num_traits::PrimInt + num_traits::Unsigned,
{
    (flags >> bit) & B::one() == B::one()
}

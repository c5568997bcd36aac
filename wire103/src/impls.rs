//! Builtin implementations for various types.

use crate::{Wire103Read, Wire103Sized, Wire103Write, WireError};

macro_rules! impl_primitive_wire_field {
    ($ty:ty, $size:expr) => {
        impl Wire103Write for $ty {
            fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
                let chunk = &mut buf[0..$size];

                chunk.copy_from_slice(&self.to_le_bytes());

                chunk
            }

            fn packed_len(&self) -> usize {
                $size
            }
        }

        impl Wire103Read for $ty {
            fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
                buf.get(0..$size)
                    .ok_or(WireError::ReadBufferTooShort)
                    .and_then(|raw| raw.try_into().map_err(|_| WireError::ReadBufferTooShort))
                    .map(Self::from_le_bytes)
            }
        }

        impl Wire103Sized for $ty {
            const PACKED_LEN: usize = $size;

            type Buffer = [u8; $size];

            fn pack(&self) -> Self::Buffer {
                self.to_le_bytes()
            }

            fn buffer() -> Self::Buffer {
                [0u8; $size]
            }
        }
    };
}

impl_primitive_wire_field!(u8, 1);
impl_primitive_wire_field!(u16, 2);
impl_primitive_wire_field!(u32, 4);
impl_primitive_wire_field!(u64, 8);
impl_primitive_wire_field!(i8, 1);
impl_primitive_wire_field!(i16, 2);
impl_primitive_wire_field!(i32, 4);
impl_primitive_wire_field!(i64, 8);

impl Wire103Write for f32 {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let chunk = &mut buf[0..4];

        chunk.copy_from_slice(&self.to_le_bytes());

        chunk
    }

    fn packed_len(&self) -> usize {
        4
    }
}

impl Wire103Read for f32 {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        buf.get(0..4)
            .ok_or(WireError::ReadBufferTooShort)
            .and_then(|raw| raw.try_into().map_err(|_| WireError::ReadBufferTooShort))
            .map(Self::from_le_bytes)
    }
}

impl Wire103Sized for f32 {
    const PACKED_LEN: usize = 4;

    type Buffer = [u8; 4];

    fn pack(&self) -> Self::Buffer {
        self.to_le_bytes()
    }

    fn buffer() -> Self::Buffer {
        [0u8; 4]
    }
}

impl Wire103Write for bool {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        buf[0] = *self as u8;

        &buf[0..1]
    }

    fn packed_len(&self) -> usize {
        1
    }
}

impl Wire103Read for bool {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.is_empty() {
            return Err(WireError::ReadBufferTooShort);
        }

        Ok(buf[0] == 1)
    }
}

impl Wire103Sized for bool {
    const PACKED_LEN: usize = 1;

    type Buffer = [u8; Self::PACKED_LEN];

    fn pack(&self) -> Self::Buffer {
        [*self as u8; 1]
    }

    fn buffer() -> Self::Buffer {
        [0u8; 1]
    }
}

impl Wire103Write for () {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        &buf[0..0]
    }

    fn packed_len(&self) -> usize {
        0
    }
}

impl Wire103Read for () {
    fn unpack_from_slice(_buf: &[u8]) -> Result<Self, WireError> {
        Ok(())
    }
}

impl Wire103Sized for () {
    const PACKED_LEN: usize = 0;

    type Buffer = [u8; 0];

    fn pack(&self) -> Self::Buffer {
        [0u8; 0]
    }

    fn buffer() -> Self::Buffer {
        [0u8; 0]
    }
}

impl<const N: usize> Wire103Write for [u8; N] {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let buf = &mut buf[0..N];

        buf.copy_from_slice(self);

        buf
    }

    fn packed_len(&self) -> usize {
        N
    }
}

impl Wire103Write for &[u8] {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let buf = &mut buf[0..self.len()];

        buf.copy_from_slice(self);

        buf
    }

    fn packed_len(&self) -> usize {
        self.len()
    }
}

// Blanket impl for references
impl<T> Wire103Write for &T
where
    T: Wire103Write,
{
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        Wire103Write::pack_to_slice_unchecked(*self, buf)
    }

    fn packed_len(&self) -> usize {
        Wire103Write::packed_len(*self)
    }
}

// Blanket impl for arrays of known-sized types
impl<const N: usize, T> Wire103Read for [T; N]
where
    T: Wire103Sized,
{
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < T::PACKED_LEN * N {
            return Err(WireError::ReadBufferTooShort);
        }

        heapless::Vec::<T, N>::unpack_from_slice(buf)
            .and_then(|res| res.into_array().map_err(|_e| WireError::ReadBufferTooShort))
    }
}

// Heapless crate support
impl<const N: usize, T> Wire103Read for heapless::Vec<T, N>
where
    T: Wire103Sized,
{
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        buf.chunks_exact(T::PACKED_LEN)
            .map(T::unpack_from_slice)
            .collect::<Result<heapless::Vec<_, N>, WireError>>()
    }
}

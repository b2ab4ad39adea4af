//! Block padding for slot payloads

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// PKCS#7 pad `data` up to exactly `size` bytes
///
/// Appends `size - len` bytes, each of value `size - len`. Data that already
/// fills the block is returned unchanged instead of growing by a full extra
/// block, since the device accepts exactly one block.
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`] when `data` is longer than `size` or
/// `size` exceeds what a padding byte can express.
///
/// # Examples
///
/// ```
/// use yubihid_core::padding;
///
/// let padded = padding::pkcs7(&[0xAA; 60], 64).unwrap();
/// assert_eq!(padded.len(), 64);
/// assert_eq!(&padded[60..], &[4, 4, 4, 4]);
/// ```
pub fn pkcs7(data: &[u8], size: usize) -> Result<Bytes> {
    if data.len() > size || size > u8::MAX as usize {
        return Err(Error::PayloadTooLarge {
            size: data.len(),
            max: size.min(u8::MAX as usize),
        });
    }

    let pad = size - data.len();
    let mut buf = BytesMut::with_capacity(size);
    buf.put_slice(data);
    buf.put_bytes(pad as u8, pad);

    Ok(buf.freeze())
}

/// Zero pad `data` up to exactly `size` bytes
pub fn zeros(data: &[u8], size: usize) -> Result<Bytes> {
    if data.len() > size {
        return Err(Error::PayloadTooLarge {
            size: data.len(),
            max: size,
        });
    }

    let mut buf = BytesMut::with_capacity(size);
    buf.put_slice(data);
    buf.put_bytes(0, size - data.len());

    Ok(buf.freeze())
}

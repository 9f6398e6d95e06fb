//! Low-level reads shared by the package decoders.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use super::names::NameTable;
use super::types::{Guid, NameRef};
use crate::error::{Error, Result};

/// Decode the length-prefixed string encoding.
///
/// A positive length `L` selects the single-byte form: `L` bytes follow, the
/// last of which is a NUL that is dropped, and each byte is zero-extended to
/// a code point. A negative length selects the wide form: `-L` 16-bit code
/// units follow, again NUL-terminated. `L == 0` is a legal empty string.
pub(crate) fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_i32::<LittleEndian>()?;
    if len > 0 {
        let mut bytes = vec![0u8; len as usize];
        reader.read_exact(&mut bytes)?;
        bytes.pop();
        Ok(bytes.into_iter().map(char::from).collect())
    } else if len < 0 {
        let mut units = vec![0u16; len.unsigned_abs() as usize];
        reader.read_u16_into::<LittleEndian>(&mut units)?;
        units.pop();
        Ok(String::from_utf16_lossy(&units))
    } else {
        Ok(String::new())
    }
}

/// Read a name reference and validate its index against the name table.
///
/// An out-of-range index means the file is structurally invalid for this
/// decoder; there is no recovery.
pub(crate) fn read_name_ref<R: Read>(reader: &mut R, names: &NameTable) -> Result<NameRef> {
    let index = reader.read_i32::<LittleEndian>()?;
    if index < 0 || index as usize >= names.len() {
        return Err(Error::NameIndexOutOfRange {
            index,
            count: names.len(),
        });
    }
    let number = reader.read_i32::<LittleEndian>()?;
    Ok(NameRef {
        index: index as u32,
        number,
    })
}

/// Read four little-endian 32-bit words as a GUID.
pub(crate) fn read_guid<R: Read>(reader: &mut R) -> Result<Guid> {
    Ok(Guid {
        a: reader.read_u32::<LittleEndian>()?,
        b: reader.read_u32::<LittleEndian>()?,
        c: reader.read_u32::<LittleEndian>()?,
        d: reader.read_u32::<LittleEndian>()?,
    })
}

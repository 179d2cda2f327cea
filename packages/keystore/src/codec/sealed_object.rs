//! Boundary detection for Java-serialized JCEKS secret key entries
//!
//! JCEKS stores secret keys as a serialized `javax.crypto.SealedObject`
//! with no length prefix. The entry is kept as opaque bytes, but its end
//! has to be found by walking the object stream grammar far enough to
//! skip exactly one top-level object.

use super::data::DataReader;
use crate::error::Result;

const STREAM_MAGIC: u16 = 0xACED;
const STREAM_VERSION: u16 = 5;
const BASE_HANDLE: u32 = 0x7E_0000;

const TC_NULL: u8 = 0x70;
const TC_REFERENCE: u8 = 0x71;
const TC_CLASSDESC: u8 = 0x72;
const TC_OBJECT: u8 = 0x73;
const TC_STRING: u8 = 0x74;
const TC_ARRAY: u8 = 0x75;
const TC_BLOCKDATA: u8 = 0x77;
const TC_ENDBLOCKDATA: u8 = 0x78;
const TC_BLOCKDATALONG: u8 = 0x7A;
const TC_LONGSTRING: u8 = 0x7C;

const SC_WRITE_METHOD: u8 = 0x01;

/// Upper bound on nesting, serialized keys are a few levels deep
const MAX_DEPTH: usize = 64;

#[derive(Debug)]
struct ClassDesc {
    name: String,
    flags: u8,
    fields: Vec<char>,
    parent: Option<usize>,
}

#[derive(Debug)]
enum Handle {
    Class(ClassDesc),
    Other,
}

struct Walker<'r, 'a> {
    reader: &'r mut DataReader<'a>,
    handles: Vec<Handle>,
    depth: usize,
}

/// Consume one serialized object stream from `reader`, returning its bytes.
pub(crate) fn read_serialized_object<'a>(reader: &mut DataReader<'a>) -> Result<&'a [u8]> {
    let start = reader.position();
    if reader.u16()? != STREAM_MAGIC || reader.u16()? != STREAM_VERSION {
        return Err(reader.error("secret key entry is not a Java object stream"));
    }
    let mut walker = Walker {
        reader,
        handles: Vec::new(),
        depth: 0,
    };
    walker.content()?;
    let end = walker.reader.position();
    Ok(&walker.reader.consumed()[start..end])
}

impl Walker<'_, '_> {
    fn content(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.reader.error("serialized object nests too deeply"));
        }
        let result = self.content_inner();
        self.depth -= 1;
        result
    }

    fn content_inner(&mut self) -> Result<()> {
        match self.reader.u8()? {
            TC_NULL => Ok(()),
            TC_REFERENCE => self.reference().map(|_| ()),
            TC_CLASSDESC => self.class_desc_body().map(|_| ()),
            TC_STRING => {
                let len = usize::from(self.reader.u16()?);
                self.reader.bytes(len)?;
                self.handles.push(Handle::Other);
                Ok(())
            }
            TC_LONGSTRING => {
                let len = usize::try_from(self.reader.u64()?)
                    .map_err(|_| self.reader.error("string length overflows"))?;
                self.reader.bytes(len)?;
                self.handles.push(Handle::Other);
                Ok(())
            }
            TC_OBJECT => self.object(),
            TC_ARRAY => self.array(),
            other => Err(self
                .reader
                .error(format!("unsupported serialization type code 0x{other:02X}"))),
        }
    }

    fn reference(&mut self) -> Result<usize> {
        let handle = self.reader.u32()?;
        let index = handle
            .checked_sub(BASE_HANDLE)
            .map(|i| i as usize)
            .filter(|i| *i < self.handles.len())
            .ok_or_else(|| self.reader.error(format!("dangling handle 0x{handle:X}")))?;
        Ok(index)
    }

    /// A class descriptor position, `None` for a null descriptor
    fn class_desc(&mut self) -> Result<Option<usize>> {
        match self.reader.u8()? {
            TC_NULL => Ok(None),
            TC_REFERENCE => {
                let index = self.reference()?;
                match self.handles[index] {
                    Handle::Class(_) => Ok(Some(index)),
                    Handle::Other => Err(self.reader.error("handle is not a class descriptor")),
                }
            }
            TC_CLASSDESC => self.class_desc_body().map(Some),
            other => Err(self
                .reader
                .error(format!("expected class descriptor, found 0x{other:02X}"))),
        }
    }

    fn class_desc_body(&mut self) -> Result<usize> {
        let name = self.reader.utf()?;
        let _serial_version_uid = self.reader.u64()?;
        let index = self.handles.len();
        self.handles.push(Handle::Other);

        let flags = self.reader.u8()?;
        let count = self.reader.u16()?;
        let mut fields = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let type_code = char::from(self.reader.u8()?);
            let _field_name = self.reader.utf()?;
            if type_code == '[' || type_code == 'L' {
                // class name of the field type, a string or a back reference
                self.content()?;
            }
            fields.push(type_code);
        }
        self.annotations()?;
        let parent = self.class_desc()?;

        self.handles[index] = Handle::Class(ClassDesc {
            name,
            flags,
            fields,
            parent,
        });
        Ok(index)
    }

    fn annotations(&mut self) -> Result<()> {
        loop {
            match self.reader.peek_u8()? {
                TC_ENDBLOCKDATA => {
                    self.reader.u8()?;
                    return Ok(());
                }
                TC_BLOCKDATA => {
                    self.reader.u8()?;
                    let len = usize::from(self.reader.u8()?);
                    self.reader.bytes(len)?;
                }
                TC_BLOCKDATALONG => {
                    self.reader.u8()?;
                    let len = self.reader.u32()? as usize;
                    self.reader.bytes(len)?;
                }
                _ => self.content()?,
            }
        }
    }

    fn object(&mut self) -> Result<()> {
        let desc = self
            .class_desc()?
            .ok_or_else(|| self.reader.error("object without class descriptor"))?;
        self.handles.push(Handle::Other);

        // Field data is written from the topmost superclass down
        let mut hierarchy = Vec::new();
        let mut current = Some(desc);
        while let Some(index) = current {
            if hierarchy.len() > MAX_DEPTH {
                return Err(self.reader.error("class hierarchy is cyclic"));
            }
            let Handle::Class(class) = &self.handles[index] else {
                return Err(self.reader.error("handle is not a class descriptor"));
            };
            hierarchy.push((class.fields.clone(), class.flags));
            current = class.parent;
        }

        for (fields, flags) in hierarchy.into_iter().rev() {
            for type_code in fields {
                self.value(type_code)?;
            }
            if flags & SC_WRITE_METHOD != 0 {
                self.annotations()?;
            }
        }
        Ok(())
    }

    fn array(&mut self) -> Result<()> {
        let desc = self
            .class_desc()?
            .ok_or_else(|| self.reader.error("array without class descriptor"))?;
        self.handles.push(Handle::Other);

        let Handle::Class(class) = &self.handles[desc] else {
            return Err(self.reader.error("handle is not a class descriptor"));
        };
        let element = class
            .name
            .chars()
            .nth(1)
            .ok_or_else(|| self.reader.error("array class name is too short"))?;

        let len = self.reader.u32()? as usize;
        match primitive_size(element) {
            Some(size) => {
                let total = len
                    .checked_mul(size)
                    .ok_or_else(|| self.reader.error("array length overflows"))?;
                self.reader.bytes(total)?;
            }
            None => {
                for _ in 0..len {
                    self.content()?;
                }
            }
        }
        Ok(())
    }

    fn value(&mut self, type_code: char) -> Result<()> {
        match primitive_size(type_code) {
            Some(size) => self.reader.bytes(size).map(|_| ()),
            None => self.content(),
        }
    }
}

fn primitive_size(type_code: char) -> Option<usize> {
    match type_code {
        'B' | 'Z' => Some(1),
        'C' | 'S' => Some(2),
        'F' | 'I' => Some(4),
        'D' | 'J' => Some(8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::KeystoreFormat;

    fn utf(out: &mut Vec<u8>, s: &str) {
        out.extend_from_slice(&(s.len() as u16).to_be_bytes());
        out.extend_from_slice(s.as_bytes());
    }

    /// `new byte[] {1, 2, 3}` followed by unrelated data
    fn byte_array_stream() -> Vec<u8> {
        let mut out = vec![0xAC, 0xED, 0x00, 0x05, TC_ARRAY, TC_CLASSDESC];
        utf(&mut out, "[B");
        out.extend_from_slice(&0xACF3_17F8_0608_54E0u64.to_be_bytes());
        out.push(0x02);
        out.extend_from_slice(&0u16.to_be_bytes());
        out.push(TC_ENDBLOCKDATA);
        out.push(TC_NULL);
        out.extend_from_slice(&3u32.to_be_bytes());
        out.extend_from_slice(&[1, 2, 3]);
        out
    }

    #[test]
    fn walks_primitive_array() {
        let mut data = byte_array_stream();
        let len = data.len();
        data.extend_from_slice(&[0xDE, 0xAD]);

        let mut reader = DataReader::new(&data, KeystoreFormat::Jceks);
        let object = read_serialized_object(&mut reader).unwrap();
        assert_eq!(object.len(), len);
        assert_eq!(reader.remaining(), &[0xDE, 0xAD]);
    }

    #[test]
    fn walks_object_with_fields_and_back_reference() {
        // class Holder { String s; int i; } with s == "k", i == 7
        let mut out = vec![0xAC, 0xED, 0x00, 0x05, TC_OBJECT, TC_CLASSDESC];
        utf(&mut out, "Holder");
        out.extend_from_slice(&1u64.to_be_bytes());
        out.push(0x02);
        out.extend_from_slice(&2u16.to_be_bytes());
        out.push(b'I');
        utf(&mut out, "i");
        out.push(b'L');
        utf(&mut out, "s");
        out.push(TC_STRING);
        utf(&mut out, "Ljava/lang/String;");
        out.push(TC_ENDBLOCKDATA);
        out.push(TC_NULL);
        out.extend_from_slice(&7u32.to_be_bytes());
        // s refers back to the type name string (handle 1)
        out.push(TC_REFERENCE);
        out.extend_from_slice(&(BASE_HANDLE + 1).to_be_bytes());

        let mut reader = DataReader::new(&out, KeystoreFormat::Jceks);
        let object = read_serialized_object(&mut reader).unwrap();
        assert_eq!(object.len(), out.len());
        assert!(reader.remaining().is_empty());
    }

    #[test]
    fn rejects_non_stream() {
        let mut reader = DataReader::new(&[0x00, 0x01, 0x02, 0x03], KeystoreFormat::Jceks);
        assert!(read_serialized_object(&mut reader).is_err());
    }

    #[test]
    fn rejects_truncated_stream() {
        let data = byte_array_stream();
        let mut reader = DataReader::new(&data[..data.len() - 1], KeystoreFormat::Jceks);
        assert!(read_serialized_object(&mut reader).is_err());
    }
}

use byteorder::{ByteOrder, LittleEndian};

use crate::tags::{GlobalItemKind, ItemPrefix, ItemType, LocalItemKind, MainItemKind, LONG_ITEM_PREFIX};

/// Failure produced while decoding a byte stream into `Item`s. Carries the
/// byte offset of the prefix that triggered the failure so a caller can
/// point a user at the exact spot in the descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ItemParseError {
    /// The stream ended in the middle of an item (a prefix byte with fewer
    /// trailing payload bytes than its size code demands), or a size code
    /// maps to more bytes than remain.
    MalformedDescriptor { offset: usize },
    /// The 0xFE long-item prefix was encountered. Long items are reserved by
    /// HID 1.11 but unused in practice; this toolkit does not support them.
    UnsupportedLongItem { offset: usize },
}

/// A single HID short item: a 1-byte prefix (tag, type, size code) plus 0-4
/// payload bytes, little-endian. `data` always holds the full 32-bit
/// two's-complement pattern of the payload; `byte_count` (0, 1, 2, or 4)
/// says how many of its low bytes are actually on the wire. Unsigned callers
/// read `unsigned_value()`; signed callers (logical/physical extents) read
/// `signed_value()`, which sign-extends from `byte_count`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Item {
    pub item_type: ItemType,
    pub tag: u8,
    pub byte_count: u8,
    pub data: u32,
}

fn unsigned_byte_count(value: u32) -> u8 {
    if value == 0 {
        0
    } else if value <= 0xFF {
        1
    } else if value <= 0xFFFF {
        2
    } else {
        4
    }
}

fn signed_byte_count(value: i32) -> u8 {
    if value == 0 {
        0
    } else if value >= i8::MIN as i32 && value <= i8::MAX as i32 {
        1
    } else if value >= i16::MIN as i32 && value <= i16::MAX as i32 {
        2
    } else {
        4
    }
}

/// Maps a 2-bit size code to its payload length in bytes, per section
/// 6.2.2.2: 0 -> 0, 1 -> 1, 2 -> 2, 3 -> 4.
pub fn size_code_to_bytes(code: u8) -> u8 {
    match code {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 4,
    }
}

fn bytes_to_size_code(byte_count: u8) -> u8 {
    match byte_count {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    }
}

impl Item {
    pub fn new_unsigned(item_type: ItemType, tag: u8, value: u32) -> Self {
        Item {
            item_type,
            tag,
            byte_count: unsigned_byte_count(value),
            data: value,
        }
    }

    pub fn new_signed(item_type: ItemType, tag: u8, value: i32) -> Self {
        Item {
            item_type,
            tag,
            byte_count: signed_byte_count(value),
            data: value as u32,
        }
    }

    pub fn main(kind: MainItemKind, flags: u32) -> Self {
        Self::new_unsigned(ItemType::Main, kind.into(), flags)
    }

    pub fn global_unsigned(kind: GlobalItemKind, value: u32) -> Self {
        Self::new_unsigned(ItemType::Global, kind.into(), value)
    }

    pub fn global_signed(kind: GlobalItemKind, value: i32) -> Self {
        Self::new_signed(ItemType::Global, kind.into(), value)
    }

    pub fn local_unsigned(kind: LocalItemKind, value: u32) -> Self {
        Self::new_unsigned(ItemType::Local, kind.into(), value)
    }

    pub fn unsigned_value(&self) -> u32 {
        self.data
    }

    pub fn signed_value(&self) -> i32 {
        match self.byte_count {
            0 => 0,
            1 => (self.data as u8) as i8 as i32,
            2 => (self.data as u16) as i16 as i32,
            _ => self.data as i32,
        }
    }

    pub fn global_kind(&self) -> Option<GlobalItemKind> {
        match self.item_type {
            ItemType::Global => GlobalItemKind::from_tag(self.tag),
            _ => None,
        }
    }

    pub fn local_kind(&self) -> Option<LocalItemKind> {
        match self.item_type {
            ItemType::Local => LocalItemKind::from_tag(self.tag),
            _ => None,
        }
    }

    pub fn main_kind(&self) -> Option<MainItemKind> {
        match self.item_type {
            ItemType::Main => MainItemKind::from_tag(self.tag),
            _ => None,
        }
    }

    /// Appends this item's wire-format bytes (prefix + payload) to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut prefix = ItemPrefix(0);
        prefix.set_tag(self.tag);
        prefix.set_type(self.item_type.clone() as u8);
        prefix.set_byte_count(bytes_to_size_code(self.byte_count));
        out.push(prefix.0);
        let mut le = [0u8; 4];
        LittleEndian::write_u32(&mut le, self.data);
        out.extend_from_slice(&le[..self.byte_count as usize]);
    }

    /// Parses one item starting at `bytes[offset]`. Returns the item and the
    /// offset of the next item.
    pub fn decode(bytes: &[u8], offset: usize) -> Result<(Item, usize), ItemParseError> {
        let prefix_byte = *bytes
            .get(offset)
            .ok_or(ItemParseError::MalformedDescriptor { offset })?;
        if prefix_byte == LONG_ITEM_PREFIX {
            return Err(ItemParseError::UnsupportedLongItem { offset });
        }
        let prefix = ItemPrefix(prefix_byte);
        let byte_count = size_code_to_bytes(prefix.byte_count());
        let payload_start = offset + 1;
        let payload_end = payload_start + byte_count as usize;
        let payload = bytes
            .get(payload_start..payload_end)
            .ok_or(ItemParseError::MalformedDescriptor { offset })?;
        let mut buf = [0u8; 4];
        buf[..payload.len()].copy_from_slice(payload);
        let data = LittleEndian::read_u32(&buf);
        let item_type = ItemType::from_bits(prefix.typ())
            .ok_or(ItemParseError::MalformedDescriptor { offset })?;
        Ok((
            Item {
                item_type,
                tag: prefix.tag(),
                byte_count,
                data,
            },
            payload_end,
        ))
    }
}

/// Parses every item in `bytes`, in order. Fails on the first malformed item
/// or long-item marker, reporting its byte offset.
pub fn parse_all(bytes: &[u8]) -> Result<Vec<Item>, ItemParseError> {
    let mut items = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let (item, next) = Item::decode(bytes, offset)?;
        items.push(item);
        offset = next;
    }
    Ok(items)
}

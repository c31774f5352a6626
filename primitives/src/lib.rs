//! Low-level wire-format types for USB HID report descriptors: the short
//! item tag catalog (section 6.2.2), the 1-byte item prefix and main-item
//! flag bitfields, the `Item` wire representation and its parser, and the
//! usage page / usage ID tables a report descriptor's schema is built from.
//!
//! This crate has no opinion about Schema trees, compilation, or layouts.
//! Those live in the `hid-report-toolkit` crate that depends on this one.

mod item;
mod tags;
pub mod usage;

pub use item::{parse_all, size_code_to_bytes, Item, ItemParseError};
pub use tags::{
    CollectionKind, GlobalItemKind, ItemPrefix, ItemType, LocalItemKind, MainItemKind,
    MainItemSetting, LONG_ITEM_PREFIX,
};

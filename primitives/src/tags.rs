use bitfield::bitfield;

/// GlobalItemKind describes global item tags as described in section 6.2.2.7
/// 'Report Descriptor' of the spec, version 1.11.
#[repr(u8)]
#[allow(unused)]
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum GlobalItemKind {
    UsagePage = 0,
    LogicalMin = 1,
    LogicalMax = 2,
    PhysicalMin = 3,
    PhysicalMax = 4,
    UnitExponent = 5,
    Unit = 6,
    ReportSize = 7,
    ReportID = 8,
    ReportCount = 9,
    Push = 10,
    Pop = 11,
}

impl From<GlobalItemKind> for u8 {
    fn from(kind: GlobalItemKind) -> u8 {
        kind as u8
    }
}

impl GlobalItemKind {
    /// Recovers a GlobalItemKind from its 4-bit tag value, if known.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::UsagePage,
            1 => Self::LogicalMin,
            2 => Self::LogicalMax,
            3 => Self::PhysicalMin,
            4 => Self::PhysicalMax,
            5 => Self::UnitExponent,
            6 => Self::Unit,
            7 => Self::ReportSize,
            8 => Self::ReportID,
            9 => Self::ReportCount,
            10 => Self::Push,
            11 => Self::Pop,
            _ => return None,
        })
    }
}

/// LocalItemKind describes local item tags as described in section 6.2.2.8
/// 'Local Items' of the spec, version 1.11.
#[repr(u8)]
#[allow(unused)]
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum LocalItemKind {
    Usage = 0,
    UsageMin = 1,
    UsageMax = 2,
    DesignatorIdx = 3,
    DesignatorMin = 4,
    DesignatorMax = 5,
    StringIdx = 7,
    StringMin = 8,
    StringMax = 9,
    Delimiter = 10,
}

impl From<LocalItemKind> for u8 {
    fn from(kind: LocalItemKind) -> u8 {
        kind as u8
    }
}

impl LocalItemKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::Usage,
            1 => Self::UsageMin,
            2 => Self::UsageMax,
            3 => Self::DesignatorIdx,
            4 => Self::DesignatorMin,
            5 => Self::DesignatorMax,
            7 => Self::StringIdx,
            8 => Self::StringMin,
            9 => Self::StringMax,
            10 => Self::Delimiter,
            _ => return None,
        })
    }
}

/// MainItemKind describes main item tags as described in section 6.2.2.4
/// 'Report Descriptor' of the spec, version 1.11.
#[repr(u8)]
#[allow(unused)]
#[derive(Copy, Debug, Default, Clone, Eq, PartialEq, Hash)]
pub enum MainItemKind {
    #[default]
    Input = 0b1000,
    Output = 0b1001,
    Collection = 0b1010,
    Feature = 0b1011,
    EndCollection = 0b1100,
}

impl From<MainItemKind> for u8 {
    fn from(kind: MainItemKind) -> u8 {
        kind as u8
    }
}

impl MainItemKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0b1000 => Self::Input,
            0b1001 => Self::Output,
            0b1010 => Self::Collection,
            0b1011 => Self::Feature,
            0b1100 => Self::EndCollection,
            _ => return None,
        })
    }
}

/// ItemType describes types of items as described in section 6.2.2.7
/// 'Report Descriptor' of the spec, version 1.11.
#[repr(u8)]
#[allow(unused)]
#[derive(Copy, Debug, Default, Clone, Eq, PartialEq, Hash)]
pub enum ItemType {
    #[default]
    Main = 0,
    Global = 1,
    Local = 2,
}

impl From<ItemType> for u8 {
    fn from(kind: ItemType) -> u8 {
        kind as u8
    }
}

impl ItemType {
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0 => Self::Main,
            1 => Self::Global,
            2 => Self::Local,
            _ => return None,
        })
    }
}

/// CollectionKind enumerates the Collection main item's data values, per
/// section 6.2.2.6.
#[repr(u8)]
#[allow(unused)]
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum CollectionKind {
    Physical = 0x00,
    Application = 0x01,
    Logical = 0x02,
    Report = 0x03,
    NamedArray = 0x04,
    UsageSwitch = 0x05,
    UsageModifier = 0x06,
}

impl From<CollectionKind> for u32 {
    fn from(kind: CollectionKind) -> u32 {
        kind as u32
    }
}

impl CollectionKind {
    pub fn from_value(v: u32) -> Option<Self> {
        Some(match v {
            0x00 => Self::Physical,
            0x01 => Self::Application,
            0x02 => Self::Logical,
            0x03 => Self::Report,
            0x04 => Self::NamedArray,
            0x05 => Self::UsageSwitch,
            0x06 => Self::UsageModifier,
            _ => return None,
        })
    }
}

bitfield! {
    /// MainItemSetting describes the bits which configure invariants on a MainItem.
    #[derive(Clone,Copy,Debug,Default,Eq,PartialEq)]
    pub struct MainItemSetting(u16);
    pub is_constant, set_constant: 0;
    pub is_variable, set_variable: 1;
    pub is_relative, set_relative: 2;
    pub is_wrap, set_wrap: 3;
    pub is_non_linear, set_non_linear: 4;
    pub has_no_preferred_state, set_no_preferred_state: 5;
    pub has_null_state, set_has_null_state: 6;
    pub volatile, set_volatile: 7;
    pub buffered_bytes, set_buffered_bytes: 8;
}

bitfield! {
    /// ItemPrefix describes the 1 byte prefix describing an item in a descriptor.
    #[derive(Clone,Copy,Eq,PartialEq)]
    pub struct ItemPrefix(u8);
    impl Debug;
    pub byte_count, set_byte_count: 1, 0;
    pub typ, set_type: 3, 2;
    pub tag, set_tag: 7, 4;
}

/// The HID long-item prefix byte (section 6.2.2.3). This toolkit never emits
/// long items and rejects them on parse.
pub const LONG_ITEM_PREFIX: u8 = 0xFE;

//! Structured JSON rendering of item streams and layouts. Thin `serde_json`
//! views over [`Item`] and [`Layout`]; no parsing back from JSON is defined,
//! since these are one-directional inspection views.

use serde::Serialize;
use serde_json::Value as Json;

use hid_report_primitives::{GlobalItemKind, Item, ItemType, LocalItemKind, MainItemKind};

use crate::error::Result;
use crate::layout::Layout;

/// One item rendered for human/tool consumption: its tag's symbolic name
/// when known, and its decoded value.
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub item_type: &'static str,
    pub tag_code: u8,
    pub tag_name: Option<&'static str>,
    pub value: i64,
}

fn tag_name(item: &Item) -> Option<&'static str> {
    match item.item_type {
        ItemType::Global => item.global_kind().map(global_tag_name),
        ItemType::Local => item.local_kind().map(local_tag_name),
        ItemType::Main => item.main_kind().map(main_tag_name),
    }
}

fn global_tag_name(kind: GlobalItemKind) -> &'static str {
    match kind {
        GlobalItemKind::UsagePage => "UsagePage",
        GlobalItemKind::LogicalMin => "LogicalMinimum",
        GlobalItemKind::LogicalMax => "LogicalMaximum",
        GlobalItemKind::PhysicalMin => "PhysicalMinimum",
        GlobalItemKind::PhysicalMax => "PhysicalMaximum",
        GlobalItemKind::UnitExponent => "UnitExponent",
        GlobalItemKind::Unit => "Unit",
        GlobalItemKind::ReportSize => "ReportSize",
        GlobalItemKind::ReportID => "ReportID",
        GlobalItemKind::ReportCount => "ReportCount",
        GlobalItemKind::Push => "Push",
        GlobalItemKind::Pop => "Pop",
    }
}

fn local_tag_name(kind: LocalItemKind) -> &'static str {
    match kind {
        LocalItemKind::Usage => "Usage",
        LocalItemKind::UsageMin => "UsageMinimum",
        LocalItemKind::UsageMax => "UsageMaximum",
        LocalItemKind::DesignatorIdx => "DesignatorIndex",
        LocalItemKind::DesignatorMin => "DesignatorMinimum",
        LocalItemKind::DesignatorMax => "DesignatorMaximum",
        LocalItemKind::StringIdx => "StringIndex",
        LocalItemKind::StringMin => "StringMinimum",
        LocalItemKind::StringMax => "StringMaximum",
        LocalItemKind::Delimiter => "Delimiter",
    }
}

fn main_tag_name(kind: MainItemKind) -> &'static str {
    match kind {
        MainItemKind::Input => "Input",
        MainItemKind::Output => "Output",
        MainItemKind::Collection => "Collection",
        MainItemKind::Feature => "Feature",
        MainItemKind::EndCollection => "EndCollection",
    }
}

/// Whether a tag's payload is semantically signed (logical/physical
/// extents) or unsigned (everything else); controls which accessor renders
/// `value`.
fn is_signed_tag(item: &Item) -> bool {
    matches!(
        item.global_kind(),
        Some(
            GlobalItemKind::LogicalMin
                | GlobalItemKind::LogicalMax
                | GlobalItemKind::PhysicalMin
                | GlobalItemKind::PhysicalMax
                | GlobalItemKind::UnitExponent
        )
    )
}

/// Renders a flat item stream for inspection (the descriptor-as-items
/// view).
pub fn items_to_json(items: &[Item]) -> Result<Json> {
    let views: Vec<ItemView> = items
        .iter()
        .map(|item| ItemView {
            item_type: match item.item_type {
                ItemType::Main => "Main",
                ItemType::Global => "Global",
                ItemType::Local => "Local",
            },
            tag_code: item.tag,
            tag_name: tag_name(item),
            value: if is_signed_tag(item) {
                item.signed_value() as i64
            } else {
                item.unsigned_value() as i64
            },
        })
        .collect();
    Ok(serde_json::to_value(views)?)
}

/// Renders a [`Layout`] (reports, sections, fields) as JSON.
pub fn layout_to_json(layout: &Layout) -> Result<Json> {
    Ok(serde_json::to_value(layout)?)
}

impl From<serde_json::Error> for crate::error::Error {
    fn from(e: serde_json::Error) -> Self {
        crate::error::Error::InvalidSchema {
            reason: format!("JSON serialization failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, CompileConfig};
    use crate::schema::{Collection, Widget};
    use hid_report_primitives::CollectionKind;

    #[test]
    fn renders_item_stream_with_tag_names() {
        let schema = Collection::new(0x01, 0x02, CollectionKind::Application).child(Widget::axis(0x30, true));
        let out = compile(&schema, &CompileConfig::default()).unwrap();
        let json = items_to_json(&out.items).unwrap();
        let arr = json.as_array().unwrap();
        assert!(arr.iter().any(|v| v["tag_name"] == "UsagePage"));
        assert!(arr.iter().any(|v| v["tag_name"] == "Input"));
    }

    #[test]
    fn renders_layout_with_field_names() {
        let schema = Collection::new(0x01, 0x02, CollectionKind::Application).child(Widget::axis(0x30, true));
        let out = compile(&schema, &CompileConfig::default()).unwrap();
        let (layout, _) = crate::analyzer::analyze(&out.bytes).unwrap();
        let json = layout_to_json(&layout).unwrap();
        assert!(json["reports"].is_object());
    }
}

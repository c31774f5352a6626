//! Recovers a [`Layout`] from raw report descriptor bytes (section 4.4). A
//! forward pass over the item stream mirrors the HID parser state machine:
//! a global state table, a local-item queue consumed by the next Main item,
//! a push/pop stack for `Push`/`Pop` globals, a Collection nesting stack for
//! balance checking, and a per-`(report_id, report_type)` bit cursor.

use std::collections::HashMap;

use hid_report_primitives::{parse_all, GlobalItemKind, Item, LocalItemKind, MainItemKind};

use crate::error::{Error, Result};
use crate::layout::{Field, Layout, ReportSection, ReportType};

impl From<MainItemKind> for ReportType {
    fn from(k: MainItemKind) -> Self {
        match k {
            MainItemKind::Input => ReportType::Input,
            MainItemKind::Output => ReportType::Output,
            MainItemKind::Feature => ReportType::Feature,
            _ => unreachable!("Collection/EndCollection never carry a ReportType"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GlobalState {
    usage_page: Option<u16>,
    logical_min: Option<i64>,
    logical_max: Option<i64>,
    physical_min: Option<i64>,
    physical_max: Option<i64>,
    report_size: Option<u32>,
    report_id: Option<u8>,
    report_count: Option<u32>,
}

/// The Local item queue: usages accumulate as `Usage` items are seen, in
/// order, and are drained one-per-field for `Variable` Main items or
/// treated as a single aggregate domain for `Array` Main items (section
/// 4.4).
#[derive(Debug, Clone, Default)]
struct LocalState {
    usages: Vec<u32>,
    usage_min: Option<u32>,
    usage_max: Option<u32>,
}

impl LocalState {
    fn clear(&mut self) {
        *self = LocalState::default();
    }
}

/// Tracks how many fields with a given base name have already been emitted,
/// so repeats get `_2`, `_3`, ... suffixes (section 4.4's naming rule).
#[derive(Default)]
struct NameDisambiguator {
    seen: HashMap<String, u32>,
}

impl NameDisambiguator {
    fn disambiguate(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}_{}", base, count)
        }
    }
}

fn field_base_name(usage_page: u16, usage_id: u32) -> String {
    if usage_page == hid_report_primitives::usage::usage_page::BUTTON {
        return format!("Button_{}", usage_id);
    }
    if let Some(name) = hid_report_primitives::usage::usage_name(usage_page, usage_id) {
        return name.to_string();
    }
    format!("Usage_{:04x}_{:x}", usage_page, usage_id)
}

struct Analyzer {
    global: GlobalState,
    local: LocalState,
    push_stack: Vec<GlobalState>,
    collection_depth: u32,
    layout: Layout,
    /// Bit cursor per `(report_id, report_type)`, advanced by each Main
    /// item's total width (section 4.4, 4.6).
    cursors: HashMap<(Option<u8>, ReportType), u32>,
    names: HashMap<(Option<u8>, ReportType), NameDisambiguator>,
}

impl Analyzer {
    fn new() -> Self {
        Analyzer {
            global: GlobalState::default(),
            local: LocalState::default(),
            push_stack: Vec::new(),
            collection_depth: 0,
            layout: Layout::default(),
            cursors: HashMap::new(),
            names: HashMap::new(),
        }
    }

    fn handle_global(&mut self, item: &Item, offset: usize) -> Result<()> {
        match item.global_kind() {
            Some(GlobalItemKind::UsagePage) => self.global.usage_page = Some(item.unsigned_value() as u16),
            Some(GlobalItemKind::LogicalMin) => self.global.logical_min = Some(item.signed_value() as i64),
            Some(GlobalItemKind::LogicalMax) => self.global.logical_max = Some(item.signed_value() as i64),
            Some(GlobalItemKind::PhysicalMin) => self.global.physical_min = Some(item.signed_value() as i64),
            Some(GlobalItemKind::PhysicalMax) => self.global.physical_max = Some(item.signed_value() as i64),
            Some(GlobalItemKind::UnitExponent) | Some(GlobalItemKind::Unit) => {
                // Tracked for fidelity by re-emission tools, but Field
                // doesn't surface them (out of scope per the distilled
                // spec's Field shape).
            }
            Some(GlobalItemKind::ReportSize) => self.global.report_size = Some(item.unsigned_value()),
            Some(GlobalItemKind::ReportID) => {
                self.global.report_id = Some(item.unsigned_value() as u8);
                self.layout.uses_report_ids = true;
            }
            Some(GlobalItemKind::ReportCount) => self.global.report_count = Some(item.unsigned_value()),
            Some(GlobalItemKind::Push) => self.push_stack.push(self.global.clone()),
            Some(GlobalItemKind::Pop) => {
                self.global = self.push_stack.pop().ok_or_else(|| {
                    log::trace!("Pop at byte offset {} with an empty push stack", offset);
                    Error::StateStackUnderflow { offset }
                })?;
            }
            None => {
                log::trace!("unknown global tag {} at byte offset {}, passed through", item.tag, offset);
            }
        }
        Ok(())
    }

    fn handle_local(&mut self, item: &Item, offset: usize) {
        match item.local_kind() {
            Some(LocalItemKind::Usage) => self.local.usages.push(item.unsigned_value()),
            Some(LocalItemKind::UsageMin) => self.local.usage_min = Some(item.unsigned_value()),
            Some(LocalItemKind::UsageMax) => self.local.usage_max = Some(item.unsigned_value()),
            Some(_) => {}
            None => {
                log::trace!("unknown local tag {} at byte offset {}, passed through", item.tag, offset);
            }
        }
    }

    /// Expands the accumulated local usages into a per-field usage list: one
    /// entry per bit/array slot, falling back to the last usage (or 0) when
    /// fewer usages were declared than `report_count` demands.
    fn resolve_usages(&self, report_count: u32) -> Vec<u32> {
        if !self.local.usages.is_empty() {
            let mut out = self.local.usages.clone();
            while (out.len() as u32) < report_count {
                out.push(*out.last().unwrap());
            }
            out.truncate(report_count.max(1) as usize);
            out
        } else if let (Some(min), Some(_max)) = (self.local.usage_min, self.local.usage_max) {
            (0..report_count).map(|i| min + i).collect()
        } else {
            vec![0; report_count as usize]
        }
    }

    fn handle_main(&mut self, item: &Item, offset: usize) -> Result<()> {
        match item.main_kind() {
            Some(MainItemKind::Collection) => {
                self.collection_depth += 1;
                self.local.clear();
            }
            Some(MainItemKind::EndCollection) => {
                if self.collection_depth == 0 {
                    return Err(Error::UnbalancedCollection { offset });
                }
                self.collection_depth -= 1;
                self.local.clear();
            }
            Some(kind @ (MainItemKind::Input | MainItemKind::Output | MainItemKind::Feature)) => {
                self.emit_fields(kind, item, offset)?;
                self.local.clear();
            }
            None => {}
        }
        Ok(())
    }

    fn emit_fields(&mut self, kind: MainItemKind, item: &Item, offset: usize) -> Result<()> {
        let report_type: ReportType = kind.into();
        let report_id = self.global.report_id;
        let bit_width = self.global.report_size.unwrap_or(0);
        let report_count = self.global.report_count.unwrap_or(0);
        let usage_page = self.global.usage_page.unwrap_or(0);
        let logical_min = self.global.logical_min.unwrap_or(0);
        let logical_max = self.global.logical_max.unwrap_or(0);
        let physical_min = self.global.physical_min.unwrap_or(0);
        let physical_max = self.global.physical_max.unwrap_or(0);
        let signed = logical_min < 0;
        let settings = hid_report_primitives::MainItemSetting(item.unsigned_value() as u16);

        let cursor_key = (report_id, report_type);

        // Constant items are alignment padding (the Compiler's `Padding`
        // widget, or its own auto-pad tail): they still consume bits, but
        // they aren't named data a caller would ever read or write, so no
        // Field is recorded for them (section 8 scenario 1 calls the 5
        // padding bits out as a gap, not a field).
        if settings.is_constant() {
            let cursor = self.cursors.entry(cursor_key).or_insert(0);
            *cursor += bit_width * report_count;
            let _ = offset;
            return Ok(());
        }

        let cursor = self.cursors.entry(cursor_key).or_insert(0);
        let disambiguator = self.names.entry(cursor_key).or_default();

        if settings.is_variable() {
            let usages = self.resolve_usages(report_count);
            for i in 0..report_count {
                let usage_id = usages.get(i as usize).copied().unwrap_or(0);
                let bit_offset = *cursor;
                let base = field_base_name(usage_page, usage_id);
                let name = disambiguator.disambiguate(base);
                let field = Field {
                    name,
                    bit_offset,
                    bit_width,
                    byte_offset: bit_offset / 8,
                    mask: field_mask(bit_offset, bit_width),
                    usage_page,
                    usage_id,
                    logical_min,
                    logical_max,
                    physical_min,
                    physical_max,
                    signed,
                    report_type,
                    report_id,
                };
                self.push_field(report_id, report_type, field);
                *cursor += bit_width;
            }
        } else {
            // Array: one field spanning the full report_size*report_count
            // bits, named after the first usage (or the page itself).
            let total_bits = bit_width * report_count;
            let bit_offset = *cursor;
            let usage_id = self.local.usages.first().copied().or(self.local.usage_min).unwrap_or(0);
            let base = field_base_name(usage_page, usage_id);
            let name = disambiguator.disambiguate(base);
            let field = Field {
                name,
                bit_offset,
                bit_width: total_bits,
                byte_offset: bit_offset / 8,
                mask: field_mask(bit_offset, total_bits),
                usage_page,
                usage_id,
                logical_min,
                logical_max,
                physical_min,
                physical_max,
                signed,
                report_type,
                report_id,
            };
            self.push_field(report_id, report_type, field);
            *cursor += total_bits;
        }
        let _ = offset;
        Ok(())
    }

    fn push_field(&mut self, report_id: Option<u8>, report_type: ReportType, field: Field) {
        let sections = self.layout.reports.entry(report_id).or_default();
        sections.section_mut(report_type).fields.push(field);
    }
}

fn field_mask(bit_offset: u32, bit_width: u32) -> u64 {
    let local_bit = (bit_offset % 8) as u64;
    if bit_width >= 64 {
        u64::MAX
    } else {
        ((1u64 << bit_width) - 1) << local_bit
    }
}

/// Parses and interprets a raw report descriptor, producing its [`Layout`]
/// plus the flat item list (useful for the structural JSON view, section 6).
pub fn analyze(bytes: &[u8]) -> Result<(Layout, Vec<Item>)> {
    let items = parse_all(bytes)?;
    let mut analyzer = Analyzer::new();
    let mut offset = 0usize;
    for item in &items {
        match item.item_type {
            hid_report_primitives::ItemType::Global => analyzer.handle_global(item, offset)?,
            hid_report_primitives::ItemType::Local => analyzer.handle_local(item, offset),
            hid_report_primitives::ItemType::Main => analyzer.handle_main(item, offset)?,
        }
        offset += 1 + item.byte_count as usize;
    }
    if analyzer.collection_depth != 0 {
        return Err(Error::UnbalancedCollection { offset });
    }
    Ok((analyzer.layout, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, CompileConfig};
    use crate::schema::{Collection, ReportKind, Widget};
    use hid_report_primitives::CollectionKind;

    fn mouse_schema() -> Collection {
        Collection::new(0x01, 0x02, CollectionKind::Application).child(
            Collection::new(0x01, 0x01, CollectionKind::Physical)
                .child(Widget::button_array(3))
                .child(Widget::padding(5))
                .child(Widget::axis(0x30, true))
                .child(Widget::axis(0x31, true)),
        )
    }

    #[test]
    fn recovers_button_and_axis_fields() {
        let out = compile(&mouse_schema(), &CompileConfig::default()).unwrap();
        let (layout, _items) = analyze(&out.bytes).unwrap();
        let section = layout.section(None, ReportType::Input).unwrap();
        assert_eq!(section.field("Button_1").unwrap().bit_offset, 0);
        assert_eq!(section.field("Button_2").unwrap().bit_offset, 1);
        assert_eq!(section.field("Button_3").unwrap().bit_offset, 2);
        let x = section.field("X").unwrap();
        assert!(x.signed);
        assert_eq!(x.bit_width, 8);
        assert_eq!(x.bit_offset, 8);
        assert_eq!(section.field("Y").unwrap().bit_offset, 16);
        assert_eq!(section.size_bytes(), 3);
    }

    #[test]
    fn rejects_unbalanced_end_collection() {
        let bytes = vec![
            // EndCollection with no matching Collection.
            (MainItemKind::EndCollection as u8) << 2,
        ];
        let err = analyze(&bytes).unwrap_err();
        assert!(matches!(err, Error::UnbalancedCollection { .. }));
    }

    #[test]
    fn rejects_pop_without_push() {
        let mut bytes = Vec::new();
        Item::global_unsigned(GlobalItemKind::Pop, 0).encode(&mut bytes);
        let err = analyze(&bytes).unwrap_err();
        assert!(matches!(err, Error::StateStackUnderflow { .. }));
    }

    #[test]
    fn duplicate_field_names_get_disambiguated() {
        let schema = Collection::new(0x01, 0x04, CollectionKind::Application)
            .child(Widget::axis(0x30, true))
            .child(Widget::axis(0x30, true));
        let out = compile(&schema, &CompileConfig { auto_pad: false, ..Default::default() }).unwrap();
        let (layout, _) = analyze(&out.bytes).unwrap();
        let section = layout.section(None, ReportType::Input).unwrap();
        assert!(section.field("X").is_some());
        assert!(section.field("X_2").is_some());
    }

    #[test]
    fn local_usage_queue_does_not_bleed_across_main_items() {
        // A Usage queued before one Input item must not resolve for the
        // next Input item's usage as well (P4: the local queue is empty
        // again once a Main item consumes it).
        let mut bytes = Vec::new();
        Item::global_unsigned(GlobalItemKind::UsagePage, 0x01).encode(&mut bytes);
        Item::global_signed(GlobalItemKind::LogicalMin, 0).encode(&mut bytes);
        Item::global_signed(GlobalItemKind::LogicalMax, 1).encode(&mut bytes);
        Item::global_unsigned(GlobalItemKind::ReportSize, 1).encode(&mut bytes);
        Item::global_unsigned(GlobalItemKind::ReportCount, 1).encode(&mut bytes);
        Item::local_unsigned(LocalItemKind::Usage, 0x30).encode(&mut bytes);
        let mut settings = hid_report_primitives::MainItemSetting::default();
        settings.set_variable(true);
        Item::main(MainItemKind::Input, settings.0 as u32).encode(&mut bytes);
        // No Usage item here: if the queue leaked, this field would also
        // resolve to usage 0x30 ("X") instead of falling back to 0.
        Item::main(MainItemKind::Input, settings.0 as u32).encode(&mut bytes);

        let (layout, _) = analyze(&bytes).unwrap();
        let section = layout.section(None, ReportType::Input).unwrap();
        assert_eq!(section.fields.len(), 2);
        assert_eq!(section.fields[0].name, "X");
        assert_eq!(section.fields[0].usage_id, 0x30);
        assert_ne!(section.fields[1].name, "X");
        assert_eq!(section.fields[1].usage_id, 0);
    }

    #[test]
    fn report_ids_split_into_distinct_sections() {
        let schema = Collection::new(0x01, 0x00, CollectionKind::Application)
            .child(
                Collection::new(0x01, 0x02, CollectionKind::Report)
                    .with_report_id(1)
                    .child(Widget::axis(0x30, true)),
            )
            .child(
                Collection::new(0x01, 0x06, CollectionKind::Report)
                    .with_report_id(2)
                    .child(Widget::ButtonArray { count: 8, report_type: ReportKind::Input }),
            );
        let out = compile(&schema, &CompileConfig::default()).unwrap();
        let (layout, _) = analyze(&out.bytes).unwrap();
        assert!(layout.uses_report_ids);
        assert!(layout.section(Some(1), ReportType::Input).is_some());
        assert!(layout.section(Some(2), ReportType::Input).is_some());
    }
}

//! Lowers a Schema tree to a flat HID item stream and its encoded bytes
//! (sections 4.2 and 4.3). A `StateTracker` mirrors the HID parser's global
//! state table in reverse. It remembers the last value *emitted* for each
//! Global tag, diffs each widget's desired state against it, and emits only
//! what changed.

use std::collections::HashMap;

use hid_report_primitives::usage::usage_page;
use hid_report_primitives::{GlobalItemKind, Item, LocalItemKind, MainItemKind, MainItemSetting};

use crate::error::{Error, Result};
use crate::schema::{Collection, Node, ReportKind, UsageSelector, Widget};

/// How Report IDs are assigned across top-level collections that don't
/// declare one explicitly.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReportIdStrategy {
    /// Only schema-declared `Collection::report_id` values are used; a
    /// collection that omits one inherits its parent's (or none).
    Explicit,
    /// If any collection anywhere in the tree declares a Report ID, every
    /// other direct child collection of the root that omits one is
    /// assigned the next unused ID, in tree order. If no collection
    /// anywhere declares one, behaves exactly like `Explicit`.
    Auto,
}

/// Compilation configuration (section 4.2, 4.7).
#[derive(Debug, Clone, Copy)]
pub struct CompileConfig {
    /// Emit a final constant Input item to reach byte alignment when the
    /// last-touched Input section isn't byte-aligned (section 4.2 item 4).
    pub auto_pad: bool,
    /// Extends `auto_pad` to the last-touched Output and Feature sections
    /// too. The worked examples only pad Input; Output/Feature padding was
    /// an open question. See DESIGN.md for the recorded decision.
    /// Default: `false`.
    pub pad_outputs_and_features: bool,
    pub report_id_strategy: ReportIdStrategy,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            auto_pad: true,
            pad_outputs_and_features: false,
            report_id_strategy: ReportIdStrategy::Explicit,
        }
    }
}

/// The result of compiling a Schema tree: the structured item list (also
/// useful for structural views, section 4.4) and its encoded bytes.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub items: Vec<Item>,
    pub bytes: Vec<u8>,
}

/// A read-only view of the compiler's current global state, passed to
/// `Widget::lower` per the "Schema construction API" contract (section 6):
/// widgets may query it but must not mutate it.
pub struct LoweringContext<'a> {
    tracker: &'a StateTracker,
}

impl<'a> LoweringContext<'a> {
    pub fn usage_page(&self) -> Option<u16> {
        self.tracker.usage_page
    }
    pub fn logical_min(&self) -> Option<i32> {
        self.tracker.logical_min
    }
    pub fn logical_max(&self) -> Option<i32> {
        self.tracker.logical_max
    }
    pub fn report_size(&self) -> Option<u16> {
        self.tracker.report_size
    }
    pub fn report_count(&self) -> Option<u16> {
        self.tracker.report_count
    }
}

/// The Global state a widget wants in effect for its Main item. `None`
/// means "no opinion": the current tracked value (however it got there)
/// stays in effect, implementing the Schema tree's implicit inheritance of
/// global state across siblings.
#[derive(Debug, Clone, Default)]
pub struct DesiredGlobals {
    pub usage_page: Option<u16>,
    pub logical_min: Option<i32>,
    pub logical_max: Option<i32>,
    pub physical_min: Option<i32>,
    pub physical_max: Option<i32>,
    pub unit_exponent: Option<i32>,
    pub unit: Option<u32>,
    pub report_size: Option<u16>,
    pub report_count: Option<u16>,
}

/// What `Widget::lower` returns: desired Global state, the Local usage
/// selector, which Main tag to emit, and its settings flags.
pub struct Lowered {
    pub globals: DesiredGlobals,
    pub usages: UsageSelector,
    pub main_kind: MainItemKind,
    pub settings: MainItemSetting,
}

impl Widget {
    /// Lowers this widget to desired state, per the widget contract in
    /// section 6. Fails with `InvalidSchema` for the cases the type system
    /// can't rule out structurally (zero counts, inverted logical ranges).
    /// Unsigned-typed counts already rule out a negative count, which only
    /// matters for dynamically-typed sources.
    pub fn lower(&self, _ctx: &LoweringContext) -> Result<Lowered> {
        match self {
            Widget::ButtonArray { count, report_type } => {
                if *count == 0 {
                    return Err(Error::InvalidSchema {
                        reason: "ButtonArray count must be nonzero".into(),
                    });
                }
                let mut settings = MainItemSetting::default();
                settings.set_variable(true);
                Ok(Lowered {
                    globals: DesiredGlobals {
                        usage_page: Some(usage_page::BUTTON),
                        logical_min: Some(0),
                        logical_max: Some(1),
                        report_size: Some(1),
                        report_count: Some(*count),
                        ..Default::default()
                    },
                    usages: UsageSelector::Range(1, *count as u32),
                    main_kind: (*report_type).into(),
                    settings,
                })
            }

            Widget::Padding { bits, report_type } => {
                if *bits == 0 {
                    return Err(Error::InvalidSchema {
                        reason: "Padding bits must be nonzero".into(),
                    });
                }
                let mut settings = MainItemSetting::default();
                settings.set_constant(true);
                settings.set_variable(true);
                Ok(Lowered {
                    globals: DesiredGlobals {
                        logical_max: Some(0),
                        report_size: Some(*bits),
                        report_count: Some(1),
                        ..Default::default()
                    },
                    usages: UsageSelector::None,
                    main_kind: (*report_type).into(),
                    settings,
                })
            }

            Widget::Axis {
                usage,
                signed,
                bit_width,
                logical_min,
                logical_max,
                relative,
                report_type,
            } => {
                if logical_min > logical_max {
                    return Err(Error::InvalidSchema {
                        reason: format!(
                            "Axis logical_min {} exceeds logical_max {}",
                            logical_min, logical_max
                        ),
                    });
                }
                // The Analyzer always re-derives signedness from
                // `logical_min < 0` (it has no other signal to go on when
                // reading bytes back), so `signed` here must agree with that
                // or a caller's report would silently decode differently
                // from what they declared.
                if *signed != (*logical_min < 0) {
                    return Err(Error::InvalidSchema {
                        reason: format!(
                            "Axis signed={} disagrees with logical_min={} (signed fields need a negative logical_min, unsigned fields need logical_min >= 0)",
                            signed, logical_min
                        ),
                    });
                }
                let mut settings = MainItemSetting::default();
                settings.set_variable(true);
                settings.set_relative(*relative);
                Ok(Lowered {
                    globals: DesiredGlobals {
                        usage_page: Some(usage_page::GENERIC_DESKTOP),
                        logical_min: Some(*logical_min),
                        logical_max: Some(*logical_max),
                        report_size: Some(*bit_width),
                        report_count: Some(1),
                        ..Default::default()
                    },
                    usages: UsageSelector::List(vec![*usage]),
                    main_kind: (*report_type).into(),
                    settings,
                })
            }

            Widget::UsageArray {
                usage_page,
                usages,
                logical_min,
                logical_max,
                report_size,
                report_count,
                variable,
                relative,
                constant,
                report_type,
            } => {
                if *report_count == 0 {
                    return Err(Error::InvalidSchema {
                        reason: "UsageArray report_count must be nonzero".into(),
                    });
                }
                if logical_min > logical_max {
                    return Err(Error::InvalidSchema {
                        reason: format!(
                            "UsageArray logical_min {} exceeds logical_max {}",
                            logical_min, logical_max
                        ),
                    });
                }
                let mut settings = MainItemSetting::default();
                settings.set_constant(*constant);
                settings.set_variable(*variable);
                settings.set_relative(*relative);
                Ok(Lowered {
                    globals: DesiredGlobals {
                        usage_page: *usage_page,
                        logical_min: Some(*logical_min),
                        logical_max: Some(*logical_max),
                        report_size: Some(*report_size),
                        report_count: Some(*report_count),
                        ..Default::default()
                    },
                    usages: usages.clone(),
                    main_kind: (*report_type).into(),
                    settings,
                })
            }

            Widget::Raw {
                usage_page,
                usages,
                logical_min,
                logical_max,
                report_size,
                report_count,
                settings,
                report_type,
            } => {
                if *report_count == 0 {
                    return Err(Error::InvalidSchema {
                        reason: "Raw report_count must be nonzero".into(),
                    });
                }
                Ok(Lowered {
                    globals: DesiredGlobals {
                        usage_page: *usage_page,
                        logical_min: Some(*logical_min),
                        logical_max: Some(*logical_max),
                        report_size: Some(*report_size),
                        report_count: Some(*report_count),
                        ..Default::default()
                    },
                    usages: usages.clone(),
                    main_kind: (*report_type).into(),
                    settings: *settings,
                })
            }
        }
    }
}

#[derive(Default, Clone, Debug)]
struct StateTracker {
    usage_page: Option<u16>,
    logical_min: Option<i32>,
    logical_max: Option<i32>,
    physical_min: Option<i32>,
    physical_max: Option<i32>,
    unit_exponent: Option<i32>,
    unit: Option<u32>,
    report_size: Option<u16>,
    report_id: Option<u8>,
    report_count: Option<u16>,
}

impl StateTracker {
    /// Diffs `desired` (plus `desired_report_id`) against the tracked
    /// state, appending only the Global items that changed, in the fixed
    /// order section 4.3 mandates: UsagePage, LogicalMin, LogicalMax,
    /// PhysicalMin, PhysicalMax, UnitExponent, Unit, ReportSize, ReportID,
    /// ReportCount.
    fn diff_emit(&mut self, desired: &DesiredGlobals, desired_report_id: Option<u8>, items: &mut Vec<Item>) {
        if let Some(v) = desired.usage_page {
            if self.usage_page != Some(v) {
                items.push(Item::global_unsigned(GlobalItemKind::UsagePage, v as u32));
                self.usage_page = Some(v);
            }
        }
        if let Some(v) = desired.logical_min {
            if self.logical_min != Some(v) {
                items.push(Item::global_signed(GlobalItemKind::LogicalMin, v));
                self.logical_min = Some(v);
            }
        }
        if let Some(v) = desired.logical_max {
            if self.logical_max != Some(v) {
                items.push(Item::global_signed(GlobalItemKind::LogicalMax, v));
                self.logical_max = Some(v);
            }
        }
        if let Some(v) = desired.physical_min {
            if self.physical_min != Some(v) {
                items.push(Item::global_signed(GlobalItemKind::PhysicalMin, v));
                self.physical_min = Some(v);
            }
        }
        if let Some(v) = desired.physical_max {
            if self.physical_max != Some(v) {
                items.push(Item::global_signed(GlobalItemKind::PhysicalMax, v));
                self.physical_max = Some(v);
            }
        }
        if let Some(v) = desired.unit_exponent {
            if self.unit_exponent != Some(v) {
                items.push(Item::global_signed(GlobalItemKind::UnitExponent, v));
                self.unit_exponent = Some(v);
            }
        }
        if let Some(v) = desired.unit {
            if self.unit != Some(v) {
                items.push(Item::global_unsigned(GlobalItemKind::Unit, v));
                self.unit = Some(v);
            }
        }
        if let Some(v) = desired.report_size {
            if self.report_size != Some(v) {
                items.push(Item::global_unsigned(GlobalItemKind::ReportSize, v as u32));
                self.report_size = Some(v);
            }
        }
        if let Some(v) = desired_report_id {
            if self.report_id != Some(v) {
                items.push(Item::global_unsigned(GlobalItemKind::ReportID, v as u32));
                self.report_id = Some(v);
            }
        }
        if let Some(v) = desired.report_count {
            if self.report_count != Some(v) {
                items.push(Item::global_unsigned(GlobalItemKind::ReportCount, v as u32));
                self.report_count = Some(v);
            }
        }
    }
}

struct Compiler<'c> {
    config: &'c CompileConfig,
    tracker: StateTracker,
    items: Vec<Item>,
    bit_totals: HashMap<(Option<u8>, MainItemKind), u32>,
    touch_order: Vec<(Option<u8>, MainItemKind)>,
}

impl<'c> Compiler<'c> {
    fn walk_node(&mut self, node: &Node, inherited_report_id: Option<u8>) -> Result<()> {
        match node {
            Node::Collection(c) => self.walk_collection(c, inherited_report_id),
            Node::Widget(w) => self.emit_widget(w, inherited_report_id),
        }
    }

    fn walk_collection(&mut self, c: &Collection, inherited_report_id: Option<u8>) -> Result<()> {
        let report_id = c.report_id.or(inherited_report_id);

        // `desired_report_id: None` here means "no opinion": a collection's
        // own Usage/Collection items never carry a Report ID; only the Main
        // items its descendant widgets emit do (see `emit_widget`).
        let desired = DesiredGlobals {
            usage_page: Some(c.usage_page),
            ..Default::default()
        };
        self.tracker.diff_emit(&desired, None, &mut self.items);

        self.items.push(Item::local_unsigned(LocalItemKind::Usage, c.usage));
        self.items.push(Item::main(MainItemKind::Collection, c.kind.into()));

        for child in &c.children {
            self.walk_node(child, report_id)?;
        }

        self.items.push(Item::main(MainItemKind::EndCollection, 0));
        Ok(())
    }

    fn emit_widget(&mut self, w: &Widget, report_id: Option<u8>) -> Result<()> {
        let ctx = LoweringContext { tracker: &self.tracker };
        let lowered = w.lower(&ctx)?;

        log::trace!("lowering widget into {:?} main item, report_id={:?}", lowered.main_kind, report_id);
        self.tracker.diff_emit(&lowered.globals, report_id, &mut self.items);

        match &lowered.usages {
            UsageSelector::None => {}
            UsageSelector::List(list) => {
                for u in list {
                    self.items.push(Item::local_unsigned(LocalItemKind::Usage, *u));
                }
            }
            UsageSelector::Range(min, max) => {
                self.items.push(Item::local_unsigned(LocalItemKind::UsageMin, *min));
                self.items.push(Item::local_unsigned(LocalItemKind::UsageMax, *max));
            }
        }

        self.items.push(Item::main(lowered.main_kind, lowered.settings.0 as u32));

        let bits = self.tracker.report_size.unwrap_or(0) as u32 * self.tracker.report_count.unwrap_or(0) as u32;
        let key = (report_id, lowered.main_kind);
        *self.bit_totals.entry(key).or_insert(0) += bits;
        self.touch_order.push(key);

        Ok(())
    }

    fn apply_auto_pad(&mut self, kind: ReportKind) -> Result<()> {
        let target_kind: MainItemKind = kind.into();
        let last = self
            .touch_order
            .iter()
            .rev()
            .find(|(_, k)| *k == target_kind)
            .copied();
        let Some((report_id, main_kind)) = last else {
            return Ok(());
        };
        let total = *self.bit_totals.get(&(report_id, main_kind)).unwrap_or(&0);
        let remainder = (8 - total % 8) % 8;
        if remainder == 0 {
            return Ok(());
        }
        log::debug!("auto-padding {:?} report {:?} with {} bits", main_kind, report_id, remainder);

        let desired = DesiredGlobals {
            report_size: Some(remainder as u16),
            report_count: Some(1),
            ..Default::default()
        };
        self.tracker.diff_emit(&desired, report_id, &mut self.items);

        let mut settings = MainItemSetting::default();
        settings.set_constant(true);
        settings.set_variable(true);
        self.items.push(Item::main(main_kind, settings.0 as u32));

        *self.bit_totals.entry((report_id, main_kind)).or_insert(0) += remainder as u32;
        Ok(())
    }
}

fn collect_report_ids(c: &Collection, used: &mut Vec<u8>) {
    if let Some(id) = c.report_id {
        used.push(id);
    }
    for child in &c.children {
        if let Node::Collection(cc) = child {
            collect_report_ids(cc, used);
        }
    }
}

fn assign_missing_report_ids(c: &mut Collection, next: &mut u8) {
    for child in &mut c.children {
        if let Node::Collection(cc) = child {
            if cc.report_id.is_none() {
                cc.report_id = Some(*next);
                *next += 1;
            }
        }
    }
}

/// Compiles a Schema tree to an item stream and its encoded bytes (section
/// 4.2-4.3).
pub fn compile(root: &Collection, config: &CompileConfig) -> Result<CompileOutput> {
    let owned;
    let root_ref: &Collection = if config.report_id_strategy == ReportIdStrategy::Auto {
        let mut cloned = root.clone();
        let mut used = Vec::new();
        collect_report_ids(&cloned, &mut used);
        if !used.is_empty() {
            let mut next = used.iter().copied().max().unwrap_or(0) + 1;
            assign_missing_report_ids(&mut cloned, &mut next);
        }
        owned = cloned;
        &owned
    } else {
        root
    };

    let mut compiler = Compiler {
        config,
        tracker: StateTracker::default(),
        items: Vec::new(),
        bit_totals: HashMap::new(),
        touch_order: Vec::new(),
    };
    compiler.walk_collection(root_ref, None)?;

    if config.auto_pad {
        compiler.apply_auto_pad(ReportKind::Input)?;
        if config.pad_outputs_and_features {
            compiler.apply_auto_pad(ReportKind::Output)?;
            compiler.apply_auto_pad(ReportKind::Feature)?;
        }
    }

    let mut bytes = Vec::new();
    for item in &compiler.items {
        item.encode(&mut bytes);
    }
    Ok(CompileOutput {
        items: compiler.items,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hid_report_primitives::CollectionKind;

    fn mouse_schema() -> Collection {
        Collection::new(usage_page::GENERIC_DESKTOP, 0x02, CollectionKind::Application).child(
            Collection::new(usage_page::GENERIC_DESKTOP, 0x01, CollectionKind::Physical)
                .child(Widget::button_array(3))
                .child(Widget::padding(5))
                .child(Widget::axis(0x30, false))
                .child(Widget::axis(0x31, false))
                .child(Widget::axis(0x38, false)),
        )
    }

    #[test]
    fn compiles_without_error_and_produces_bytes() {
        let schema = mouse_schema();
        let out = compile(&schema, &CompileConfig::default()).unwrap();
        assert!(!out.bytes.is_empty());
        // Collection / EndCollection bracket the whole tree.
        assert!(matches!(out.items.first().map(|i| i.item_type), Some(hid_report_primitives::ItemType::Global)));
    }

    #[test]
    fn rejects_inverted_axis_range() {
        let bad = Widget::Axis {
            usage: 0x30,
            signed: true,
            bit_width: 8,
            logical_min: 10,
            logical_max: -10,
            relative: false,
            report_type: ReportKind::Input,
        };
        let tracker = StateTracker::default();
        let ctx = LoweringContext { tracker: &tracker };
        assert!(bad.lower(&ctx).is_err());
    }

    #[test]
    fn rejects_zero_count_button_array() {
        let bad = Widget::button_array(0);
        let tracker = StateTracker::default();
        let ctx = LoweringContext { tracker: &tracker };
        assert!(bad.lower(&ctx).is_err());
    }

    #[test]
    fn deduplicates_repeated_global_state() {
        // Two axes in a row with identical logical range/size should only
        // emit LogicalMin/Max/ReportSize once between them.
        let schema = Collection::new(usage_page::GENERIC_DESKTOP, 0x02, CollectionKind::Application)
            .child(Widget::axis(0x30, false))
            .child(Widget::axis(0x31, false));
        let out = compile(&schema, &CompileConfig { auto_pad: false, ..Default::default() }).unwrap();
        let logical_min_count = out
            .items
            .iter()
            .filter(|i| i.global_kind() == Some(GlobalItemKind::LogicalMin))
            .count();
        assert_eq!(logical_min_count, 1);
    }

    #[test]
    fn auto_pad_byte_aligns_trailing_input() {
        let schema = Collection::new(usage_page::GENERIC_DESKTOP, 0x02, CollectionKind::Application)
            .child(Widget::button_array(3));
        let out = compile(&schema, &CompileConfig::default()).unwrap();
        let total_input_bits: u32 = out
            .items
            .iter()
            .scan((None::<u16>, None::<u16>), |state, item| {
                if let Some(GlobalItemKind::ReportSize) = item.global_kind() {
                    state.0 = Some(item.unsigned_value() as u16);
                }
                if let Some(GlobalItemKind::ReportCount) = item.global_kind() {
                    state.1 = Some(item.unsigned_value() as u16);
                }
                if item.main_kind() == Some(MainItemKind::Input) {
                    let bits = state.0.unwrap_or(0) as u32 * state.1.unwrap_or(0) as u32;
                    return Some(Some(bits));
                }
                Some(None)
            })
            .flatten()
            .sum();
        assert_eq!(total_input_bits % 8, 0);
    }
}

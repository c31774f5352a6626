//! Declarative tree nodes that expand to HID item sequences. Nodes are
//! plain, immutable data: no back-edges, no interior mutability, built once
//! by external code and handed to [`crate::compiler::compile`].

use hid_report_primitives::{CollectionKind, MainItemKind};

/// A grouping construct, nestable, with a declared semantic role. Maps to a
/// `Collection`/`EndCollection` pair of Main items bracketing its children.
#[derive(Debug, Clone)]
pub struct Collection {
    pub usage_page: u16,
    pub usage: u32,
    pub kind: CollectionKind,
    /// If set, every Main item generated by this collection's subtree (that
    /// doesn't belong to a nested collection overriding it) is prefixed by
    /// this Report ID, per section 4.3's inheritance rule.
    pub report_id: Option<u8>,
    pub children: Vec<Node>,
}

impl Collection {
    pub fn new(usage_page: u16, usage: u32, kind: CollectionKind) -> Self {
        Collection {
            usage_page,
            usage,
            kind,
            report_id: None,
            children: Vec::new(),
        }
    }

    pub fn with_report_id(mut self, report_id: u8) -> Self {
        self.report_id = Some(report_id);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// A Schema tree node: either a nested grouping, or a leaf widget that
/// lowers to Global/Local/Main items.
#[derive(Debug, Clone)]
pub enum Node {
    Collection(Collection),
    Widget(Widget),
}

impl From<Collection> for Node {
    fn from(c: Collection) -> Self {
        Node::Collection(c)
    }
}

impl From<Widget> for Node {
    fn from(w: Widget) -> Self {
        Node::Widget(w)
    }
}

/// Which of the three Main item kinds a widget emits into. Deliberately
/// excludes `Collection`/`EndCollection`; those are structural, not
/// widget-produced.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReportKind {
    Input,
    Output,
    Feature,
}

impl From<ReportKind> for MainItemKind {
    fn from(k: ReportKind) -> Self {
        match k {
            ReportKind::Input => MainItemKind::Input,
            ReportKind::Output => MainItemKind::Output,
            ReportKind::Feature => MainItemKind::Feature,
        }
    }
}

/// The Local-item usage selector a widget contributes. A `Range` expands to
/// `UsageMin`/`UsageMax`; a `List` emits one `Usage` local item per entry
/// (consumed by the Analyzer in order, per section 4.4).
#[derive(Debug, Clone)]
pub enum UsageSelector {
    None,
    List(Vec<u32>),
    Range(u32, u32),
}

/// A stateless function from the current compilation context to a sequence
/// of items. The widget catalog is closed: every kind a complete report
/// descriptor needs is one of these variants.
#[derive(Debug, Clone)]
pub enum Widget {
    /// `n` one-bit buttons on the Button usage page, usage IDs `1..=n`.
    /// Section 4.2: `UsagePage=Button, LogicalMin=0, LogicalMax=1,
    /// ReportSize=1, ReportCount=n, UsageMin=1, UsageMax=n`, emitting
    /// `Input(Data,Var,Abs)`.
    ButtonArray { count: u16, report_type: ReportKind },

    /// `bits` constant padding bits with no usage.
    /// Section 4.2: `ReportSize=bits, ReportCount=1, LogicalMax=0`,
    /// emitting `Input(Const,Var,Abs)`.
    Padding { bits: u16, report_type: ReportKind },

    /// A single-usage value field. Defaults reproduce the canonical 8-bit,
    /// signed, +/-127, relative-or-absolute axis; every field is overridable
    /// via this variant's `signed`, `bit_width`, `logical_min`, and
    /// `logical_max` fields.
    Axis {
        usage: u32,
        signed: bool,
        bit_width: u16,
        logical_min: i32,
        logical_max: i32,
        relative: bool,
        report_type: ReportKind,
    },

    /// The general Variable/Array field generator behind reports like a
    /// keyboard's modifier byte, LED output byte, and keycode array.
    /// `variable = true` selects Variable (one usage consumed per field);
    /// `false` selects Array (one composite field over the whole usage
    /// domain).
    UsageArray {
        usage_page: Option<u16>,
        usages: UsageSelector,
        logical_min: i32,
        logical_max: i32,
        report_size: u16,
        report_count: u16,
        variable: bool,
        relative: bool,
        constant: bool,
        report_type: ReportKind,
    },

    /// Escape hatch for vendor-defined/raw fields whose Main-item flags
    /// don't fit the named widgets above, such as a custom 32-octet array.
    Raw {
        usage_page: Option<u16>,
        usages: UsageSelector,
        logical_min: i32,
        logical_max: i32,
        report_size: u16,
        report_count: u16,
        settings: hid_report_primitives::MainItemSetting,
        report_type: ReportKind,
    },
}

impl Widget {
    /// A default 8-bit signed relative axis (logical range +/-127, one
    /// byte, Input).
    pub fn axis(usage: u32, relative: bool) -> Self {
        Widget::Axis {
            usage,
            signed: true,
            bit_width: 8,
            logical_min: -127,
            logical_max: 127,
            relative,
            report_type: ReportKind::Input,
        }
    }

    pub fn button_array(count: u16) -> Self {
        Widget::ButtonArray {
            count,
            report_type: ReportKind::Input,
        }
    }

    pub fn padding(bits: u16) -> Self {
        Widget::Padding {
            bits,
            report_type: ReportKind::Input,
        }
    }

    pub fn report_type(&self) -> ReportKind {
        match self {
            Widget::ButtonArray { report_type, .. }
            | Widget::Padding { report_type, .. }
            | Widget::Axis { report_type, .. }
            | Widget::UsageArray { report_type, .. }
            | Widget::Raw { report_type, .. } => *report_type,
        }
    }
}

//! End-to-end scenarios exercising the public API together: Schema ->
//! Compiler -> bytes -> Analyzer -> Layout -> Codec. Mirrors the worked
//! scenarios a complete implementation of this system would ship, covering
//! compilation, analysis, encode/decode round trips, Report ID
//! multiplexing, signed clamping, and malformed-input error reporting.

use hid_report_primitives::CollectionKind;

use hid_report_toolkit::codec::{decode, encode, CodecConfig, FieldValues, Value};
use hid_report_toolkit::compiler::{compile, CompileConfig};
use hid_report_toolkit::{analyzer, Collection, ReportKind, ReportType, Widget};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Scenario 1: a three-button, three-axis relative mouse. Verified against
// structural properties (byte size, field presence, signedness) rather than
// a literal hex dump. Nesting order between semantically-equivalent emitters
// isn't pinned down, but these structural invariants are.
#[test]
fn scenario_simple_mouse_compiles_and_analyzes() {
    init_logging();
    let schema = Collection::new(0x01, 0x02, CollectionKind::Application).child(
        Collection::new(0x01, 0x01, CollectionKind::Physical)
            .child(Widget::button_array(3))
            .child(Widget::padding(5))
            .child(Widget::axis(0x30, true))
            .child(Widget::axis(0x31, true))
            .child(Widget::axis(0x38, true)),
    );

    let out = compile(&schema, &CompileConfig::default()).unwrap();
    let (layout, _items) = analyzer::analyze(&out.bytes).unwrap();
    let input = layout.section(None, ReportType::Input).unwrap();

    assert_eq!(input.size_bytes(), 4);
    for (name, offset) in [("Button_1", 0), ("Button_2", 1), ("Button_3", 2)] {
        let f = input.field(name).unwrap();
        assert_eq!(f.bit_offset, offset);
        assert_eq!(f.bit_width, 1);
    }
    let x = input.field("X").unwrap();
    assert_eq!(x.bit_offset, 8);
    assert_eq!(x.bit_width, 8);
    assert!(x.signed);
    let y = input.field("Y").unwrap();
    assert_eq!(y.bit_offset, 16);
    let wheel = input.field("Wheel").unwrap();
    assert_eq!(wheel.bit_offset, 24);
    assert_eq!(wheel.bit_width, 8);
    assert!(wheel.signed);
}

// Scenario 2: a 16-button joystick with a hat switch and three analog axes,
// built to match a known bit layout; the Analyzer must recover those exact
// offsets.
#[test]
fn scenario_joystick_analysis_recovers_expected_offsets() {
    init_logging();
    let schema = Collection::new(0x01, 0x04, CollectionKind::Application).child(
        Collection::new(0x01, 0x01, CollectionKind::Physical)
            .child(Widget::button_array(16))
            .child(Widget::UsageArray {
                usage_page: Some(0x01),
                usages: hid_report_toolkit::UsageSelector::List(vec![0x39]),
                logical_min: 0,
                logical_max: 7,
                report_size: 4,
                report_count: 1,
                variable: true,
                relative: false,
                constant: false,
                report_type: ReportKind::Input,
            })
            .child(Widget::padding(4))
            .child(Widget::UsageArray {
                usage_page: Some(0x01),
                usages: hid_report_toolkit::UsageSelector::List(vec![0x30]),
                logical_min: 0,
                logical_max: 16383,
                report_size: 14,
                report_count: 1,
                variable: true,
                relative: false,
                constant: false,
                report_type: ReportKind::Input,
            })
            .child(Widget::padding(2))
            .child(Widget::UsageArray {
                usage_page: Some(0x01),
                usages: hid_report_toolkit::UsageSelector::List(vec![0x31]),
                logical_min: 0,
                logical_max: 16383,
                report_size: 14,
                report_count: 1,
                variable: true,
                relative: false,
                constant: false,
                report_type: ReportKind::Input,
            })
            .child(Widget::padding(2))
            .child(Widget::UsageArray {
                usage_page: Some(0x01),
                usages: hid_report_toolkit::UsageSelector::List(vec![0x35]),
                logical_min: 0,
                logical_max: 255,
                report_size: 8,
                report_count: 1,
                variable: true,
                relative: false,
                constant: false,
                report_type: ReportKind::Input,
            })
            .child(Widget::UsageArray {
                usage_page: Some(0x01),
                usages: hid_report_toolkit::UsageSelector::List(vec![0x36]),
                logical_min: 0,
                logical_max: 255,
                report_size: 8,
                report_count: 1,
                variable: true,
                relative: false,
                constant: false,
                report_type: ReportKind::Input,
            })
            .child(Widget::Raw {
                usage_page: Some(0xFF00),
                usages: hid_report_toolkit::UsageSelector::None,
                logical_min: 0,
                logical_max: 255,
                report_size: 8,
                report_count: 4,
                // Array semantics (no `Variable` flag): four vendor-defined
                // bytes collapse into one 32-bit field, matching the
                // "4 x 8-bit vendor-defined fields" the worked example
                // describes as a single opaque block.
                settings: hid_report_primitives::MainItemSetting::default(),
                report_type: ReportKind::Feature,
            }),
    );

    let out = compile(&schema, &CompileConfig { auto_pad: false, ..Default::default() }).unwrap();
    let (layout, _items) = analyzer::analyze(&out.bytes).unwrap();
    let input = layout.section(None, ReportType::Input).unwrap();

    assert_eq!(input.field("Button_1").unwrap().bit_offset, 0);
    assert_eq!(input.field("Button_16").unwrap().bit_offset, 15);
    assert_eq!(input.field("Hat_Switch").unwrap().bit_offset, 16);
    let x = input.field("X").unwrap();
    assert_eq!(x.bit_offset, 24);
    assert_eq!(x.bit_width, 14);
    assert!(!x.signed);
    let y = input.field("Y").unwrap();
    assert_eq!(y.bit_offset, 40);
    assert_eq!(y.bit_width, 14);
    let rz = input.field("Rz").unwrap();
    assert_eq!(rz.bit_offset, 56);
    let slider = input.field("Slider").unwrap();
    assert_eq!(slider.bit_offset, 64);

    let feature = layout.section(None, ReportType::Feature).unwrap();
    assert_eq!(feature.fields.len(), 1);
    assert_eq!(feature.fields[0].bit_width, 32);
}

// Scenario 3: encode then decode a mouse report, round-tripping every
// field's value.
#[test]
fn scenario_encode_decode_round_trip() {
    init_logging();
    let schema = Collection::new(0x01, 0x02, CollectionKind::Application).child(
        Collection::new(0x01, 0x01, CollectionKind::Physical)
            .child(Widget::button_array(3))
            .child(Widget::padding(5))
            .child(Widget::axis(0x30, true))
            .child(Widget::axis(0x31, true))
            .child(Widget::axis(0x38, true)),
    );
    let out = compile(&schema, &CompileConfig::default()).unwrap();
    let (layout, _) = analyzer::analyze(&out.bytes).unwrap();

    let mut values = FieldValues::new();
    values.insert("Button_1".into(), Value::Unsigned(1));
    values.insert("Button_2".into(), Value::Unsigned(1));
    values.insert("Button_3".into(), Value::Unsigned(0));
    values.insert("X".into(), Value::Signed(-100));
    values.insert("Y".into(), Value::Signed(100));
    values.insert("Wheel".into(), Value::Signed(0));

    let bytes = encode(&layout, None, ReportType::Input, &values, &CodecConfig { strict: true }).unwrap();
    assert_eq!(bytes.len(), 4);
    let (report_id, decoded) = decode(&layout, ReportType::Input, &bytes).unwrap();
    assert_eq!(report_id, None);
    assert_eq!(decoded["Button_1"], Value::Unsigned(1));
    assert_eq!(decoded["Button_3"], Value::Unsigned(0));
    assert_eq!(decoded["X"], Value::Signed(-100));
    assert_eq!(decoded["Y"], Value::Signed(100));
    assert_eq!(decoded["Wheel"], Value::Signed(0));
}

// Scenario 4: two Input reports under distinct Report IDs (a 3-byte mouse
// and an 8-byte keyboard-like report) must produce two independent
// sections, each selected by its own leading ID byte.
#[test]
fn scenario_report_id_multiplexing() {
    init_logging();
    let schema = Collection::new(0x01, 0x00, CollectionKind::Application)
        .child(
            Collection::new(0x01, 0x02, CollectionKind::Report)
                .with_report_id(1)
                .child(Widget::button_array(3))
                .child(Widget::padding(5))
                .child(Widget::axis(0x30, true))
                .child(Widget::axis(0x31, true)),
        )
        .child(
            Collection::new(0x07, 0x06, CollectionKind::Report)
                .with_report_id(2)
                .child(Widget::UsageArray {
                    usage_page: Some(0x07),
                    usages: hid_report_toolkit::UsageSelector::Range(0, 255),
                    logical_min: 0,
                    logical_max: 255,
                    report_size: 8,
                    report_count: 8,
                    variable: false,
                    relative: false,
                    constant: false,
                    report_type: ReportKind::Input,
                }),
        );

    let out = compile(&schema, &CompileConfig::default()).unwrap();
    let (layout, _) = analyzer::analyze(&out.bytes).unwrap();
    assert!(layout.uses_report_ids);

    let mouse = layout.section(Some(1), ReportType::Input).unwrap();
    assert_eq!(mouse.size_bytes(), 3);
    let keyboard = layout.section(Some(2), ReportType::Input).unwrap();
    assert_eq!(keyboard.size_bytes(), 8);

    let mut mouse_values = FieldValues::new();
    mouse_values.insert("X".into(), Value::Signed(5));
    let mouse_bytes = encode(&layout, Some(1), ReportType::Input, &mouse_values, &CodecConfig { strict: true }).unwrap();
    assert_eq!(mouse_bytes[0], 0x01);

    // The Keyboard usage page (0x07) has no named-constant table entry, so
    // the Analyzer falls back to its "Usage_<page>_<id>" naming scheme.
    let mut kb_values = FieldValues::new();
    kb_values.insert("Usage_0007_0".into(), Value::Unsigned(4));
    let kb_bytes = encode(&layout, Some(2), ReportType::Input, &kb_values, &CodecConfig { strict: true }).unwrap();
    assert_eq!(kb_bytes[0], 0x02);

    let (id, _) = decode(&layout, ReportType::Input, &mouse_bytes).unwrap();
    assert_eq!(id, Some(1));
    let (id, _) = decode(&layout, ReportType::Input, &kb_bytes).unwrap();
    assert_eq!(id, Some(2));
}

// Scenario 5: signed clamping, strict vs. non-strict.
#[test]
fn scenario_signed_clamping_strict_vs_lenient() {
    init_logging();
    let schema = Collection::new(0x01, 0x02, CollectionKind::Application).child(Widget::axis(0x30, true));
    let out = compile(&schema, &CompileConfig::default()).unwrap();
    let (layout, _) = analyzer::analyze(&out.bytes).unwrap();

    let mut values = FieldValues::new();
    values.insert("X".into(), Value::Signed(-500));

    let strict_err = encode(&layout, None, ReportType::Input, &values, &CodecConfig { strict: true }).unwrap_err();
    assert!(matches!(strict_err, hid_report_toolkit::Error::FieldOverflow { .. }));

    let clamped = encode(&layout, None, ReportType::Input, &values, &CodecConfig::default()).unwrap();
    let (_, decoded) = decode(&layout, ReportType::Input, &clamped).unwrap();
    assert_eq!(decoded["X"], Value::Signed(-127));
}

// Scenario 6: a truncated descriptor (a Global item whose size code demands
// more payload bytes than remain) fails with the exact byte offset of the
// offending prefix.
#[test]
fn scenario_malformed_descriptor_reports_byte_offset() {
    init_logging();
    // UsagePage(Generic Desktop) encoded correctly, followed by a
    // LogicalMinimum item that claims a 4-byte payload but only carries 1.
    let mut bytes = Vec::new();
    hid_report_primitives::Item::global_unsigned(hid_report_primitives::GlobalItemKind::UsagePage, 0x01)
        .encode(&mut bytes);
    let truncated_offset = bytes.len();
    let mut prefix = hid_report_primitives::ItemPrefix(0);
    prefix.set_tag(hid_report_primitives::GlobalItemKind::LogicalMin.into());
    prefix.set_type(hid_report_primitives::ItemType::Global as u8);
    prefix.set_byte_count(3); // size code 3 => 4 payload bytes
    bytes.push(prefix.0);
    bytes.push(0x00); // only one payload byte follows instead of four

    let err = analyzer::analyze(&bytes).unwrap_err();
    match err {
        hid_report_toolkit::Error::MalformedDescriptor { offset } => assert_eq!(offset, truncated_offset),
        other => panic!("expected MalformedDescriptor, got {:?}", other),
    }
}

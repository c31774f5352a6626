//! HID report descriptor toolkit: compiles a declarative device schema into
//! report descriptor bytecode, analyzes descriptor bytecode back into a
//! bit-level field layout, and encodes/decodes runtime HID reports against
//! that layout.
//!
//! This crate has no opinion about USB transport. Hardware I/O against OS
//! HID device nodes is out of scope. It operates purely on byte buffers:
//! produce them with [`compiler::compile`], recover a [`layout::Layout`]
//! from them with [`analyzer::analyze`], and pack/unpack runtime reports
//! against that layout with [`codec::encode`]/[`codec::decode`].

pub mod analyzer;
pub mod codec;
pub mod compiler;
pub mod error;
pub mod json;
pub mod layout;
pub mod schema;

pub use codec::{decode, encode, CodecConfig, FieldValues, Value};
pub use compiler::{compile, CompileConfig, CompileOutput, ReportIdStrategy};
pub use error::{Error, Result};
pub use json::{items_to_json, layout_to_json};
pub use layout::{Field, Layout, ReportSection, ReportSections, ReportType};
pub use schema::{Collection, Node, ReportKind, UsageSelector, Widget};

pub use hid_report_primitives as primitives;

#[cfg(test)]
mod tests {
    use super::*;
    use hid_report_primitives::CollectionKind;

    // A three-button, three-axis mouse: the canonical worked example.
    // Exercised end-to-end in
    // `tests/end_to_end.rs`; this is a smoke test that the public re-exports
    // wire together correctly.
    #[test]
    fn compiles_and_analyzes_a_simple_mouse() {
        let schema = Collection::new(0x01, 0x02, CollectionKind::Application).child(
            Collection::new(0x01, 0x01, CollectionKind::Physical)
                .child(Widget::button_array(3))
                .child(Widget::padding(5))
                .child(Widget::axis(0x30, true))
                .child(Widget::axis(0x31, true))
                .child(Widget::axis(0x38, true)),
        );

        let out = compile(&schema, &CompileConfig::default()).expect("compiles");
        assert!(!out.bytes.is_empty());

        let (layout, _items) = analyzer::analyze(&out.bytes).expect("analyzes");
        let input = layout.section(None, ReportType::Input).unwrap();
        assert_eq!(input.size_bytes(), 4);
        assert!(input.field("Button_1").is_some());
        assert!(input.field("X").is_some());
        assert!(input.field("Y").is_some());
        assert!(input.field("Wheel").is_some());
    }
}

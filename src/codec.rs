//! Runtime report encode/decode against a [`Layout`] (section 4.5). Encoding
//! packs named field values into a byte buffer; decoding unpacks a buffer
//! back into named values. Both honor Report ID multiplexing: when
//! `Layout::uses_report_ids` is set, the wire buffer carries a leading
//! Report ID byte selecting which section applies.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::layout::{Layout, ReportSection, ReportType};

/// A decoded or to-be-encoded field value. `Field::signed` in the layout
/// determines which variant a given field is read/written as; `encode`
/// accepts either and range-checks against the field's declared logical
/// extent regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
}

impl Value {
    fn as_i64(&self) -> i64 {
        match self {
            Value::Unsigned(v) => *v as i64,
            Value::Signed(v) => *v,
        }
    }
}

/// A named-field value mapping, keyed by `Field::name`.
pub type FieldValues = HashMap<String, Value>;

/// Runtime codec configuration (section 4.5, 4.7). Controls how `encode`
/// handles values it can't place as-is: out of range against a field's
/// logical extent, or naming a field the section doesn't have.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecConfig {
    /// `true` rejects out-of-range and unknown-field values with an error.
    /// `false` clamps to `[logical_min, logical_max]` and silently skips
    /// unknown names, matching how lenient real-world HID report writers
    /// behave against devices with looser host-side validation.
    pub strict: bool,
}

fn resolve_section<'a>(layout: &'a Layout, report_id: Option<u8>, report_type: ReportType) -> Result<&'a ReportSection> {
    layout
        .section(report_id, report_type)
        .ok_or(match report_id {
            Some(id) => Error::UnknownReportID { report_id: id },
            None => Error::UnknownReportID { report_id: 0 },
        })
}

/// Encodes `values` against `layout`'s section for `(report_id,
/// report_type)`. When `config.strict`, a value outside `[logical_min,
/// logical_max]` or a name absent from the layout fails; non-strict clamps
/// out-of-range values to the nearest bound and ignores unknown names.
/// Prepends the Report ID byte when `layout.uses_report_ids`.
pub fn encode(
    layout: &Layout,
    report_id: Option<u8>,
    report_type: ReportType,
    values: &FieldValues,
    config: &CodecConfig,
) -> Result<Vec<u8>> {
    let section = resolve_section(layout, report_id, report_type)?;
    let mut buf = vec![0u8; section.size_bytes() as usize];

    for field in &section.fields {
        let value = match values.get(&field.name) {
            Some(v) => *v,
            None => {
                if config.strict {
                    return Err(Error::UnknownField {
                        field: field.name.clone(),
                        report_id,
                    });
                }
                continue;
            }
        };

        let mut raw = value.as_i64();
        if raw < field.logical_min || raw > field.logical_max {
            if config.strict {
                return Err(Error::FieldOverflow {
                    field: field.name.clone(),
                    value: raw,
                    logical_min: field.logical_min,
                    logical_max: field.logical_max,
                });
            }
            log::warn!(
                "field `{}` value {} outside logical range [{}, {}], clamping",
                field.name,
                raw,
                field.logical_min,
                field.logical_max
            );
            raw = raw.clamp(field.logical_min, field.logical_max);
        }

        write_bits(&mut buf, field.bit_offset, field.bit_width, raw as u64);
    }

    if layout.uses_report_ids {
        let id = report_id.ok_or(Error::UnknownReportID { report_id: 0 })?;
        let mut out = Vec::with_capacity(buf.len() + 1);
        out.push(id);
        out.extend_from_slice(&buf);
        Ok(out)
    } else {
        Ok(buf)
    }
}

/// Decodes `bytes` against `layout`, reading the Report ID from the leading
/// byte when `layout.uses_report_ids`, and returns every field's value for
/// the matching `(report_id, report_type)` section.
pub fn decode(layout: &Layout, report_type: ReportType, bytes: &[u8]) -> Result<(Option<u8>, FieldValues)> {
    let (report_id, body) = if layout.uses_report_ids {
        let id = *bytes.first().ok_or(Error::MalformedDescriptor { offset: 0 })?;
        (Some(id), &bytes[1..])
    } else {
        (None, bytes)
    };

    let section = resolve_section(layout, report_id, report_type)?;
    let mut values = FieldValues::new();
    for field in &section.fields {
        let raw = read_bits(body, field.bit_offset, field.bit_width);
        let value = if field.signed {
            Value::Signed(sign_extend(raw, field.bit_width))
        } else {
            Value::Unsigned(raw)
        };
        values.insert(field.name.clone(), value);
    }
    Ok((report_id, values))
}

fn write_bits(buf: &mut [u8], bit_offset: u32, bit_width: u32, value: u64) {
    for i in 0..bit_width {
        let bit = (value >> i) & 1;
        let global_bit = bit_offset + i;
        let byte_idx = (global_bit / 8) as usize;
        let bit_idx = global_bit % 8;
        if byte_idx >= buf.len() {
            break;
        }
        if bit == 1 {
            buf[byte_idx] |= 1 << bit_idx;
        } else {
            buf[byte_idx] &= !(1 << bit_idx);
        }
    }
}

fn read_bits(buf: &[u8], bit_offset: u32, bit_width: u32) -> u64 {
    let mut value = 0u64;
    for i in 0..bit_width {
        let global_bit = bit_offset + i;
        let byte_idx = (global_bit / 8) as usize;
        let bit_idx = global_bit % 8;
        let bit = buf.get(byte_idx).map(|b| (b >> bit_idx) & 1).unwrap_or(0) as u64;
        value |= bit << i;
    }
    value
}

fn sign_extend(value: u64, bit_width: u32) -> i64 {
    if bit_width == 0 || bit_width >= 64 {
        return value as i64;
    }
    let shift = 64 - bit_width;
    ((value << shift) as i64) >> shift
}

//! The Analyzer's structured output (section 3, "Layout"): a per-report,
//! per-section ordered list of bit-positioned fields. Immutable once built;
//! the Codec only reads it.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which Main-item kind a report section was built from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ReportType {
    Input,
    Output,
    Feature,
}

/// A single bit-positioned field within a report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub bit_offset: u32,
    pub bit_width: u32,
    pub byte_offset: u32,
    /// Mask of the bits this field occupies within its touched bytes,
    /// little-endian, starting at `byte_offset`.
    pub mask: u64,
    pub usage_page: u16,
    pub usage_id: u32,
    pub logical_min: i64,
    pub logical_max: i64,
    pub physical_min: i64,
    pub physical_max: i64,
    pub signed: bool,
    pub report_type: ReportType,
    pub report_id: Option<u8>,
}

/// An ordered list of fields belonging to one `(report_id, report_type)`,
/// per section 3's Layout invariants: fields ordered by `bit_offset`,
/// padded on the right to the next byte boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    pub fields: Vec<Field>,
}

impl ReportSection {
    /// `size_bytes = ceil(max(bit_offset + bit_width) / 8)`, or 0 if empty.
    pub fn size_bytes(&self) -> u32 {
        self.fields
            .iter()
            .map(|f| f.bit_offset + f.bit_width)
            .max()
            .map(|bits| (bits + 7) / 8)
            .unwrap_or(0)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The three report-type sections that may exist for one Report ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSections {
    pub input: ReportSection,
    pub output: ReportSection,
    pub feature: ReportSection,
}

impl ReportSections {
    pub fn section(&self, report_type: ReportType) -> &ReportSection {
        match report_type {
            ReportType::Input => &self.input,
            ReportType::Output => &self.output,
            ReportType::Feature => &self.feature,
        }
    }

    pub fn section_mut(&mut self, report_type: ReportType) -> &mut ReportSection {
        match report_type {
            ReportType::Input => &mut self.input,
            ReportType::Output => &mut self.output,
            ReportType::Feature => &mut self.feature,
        }
    }
}

/// `ReportID → {Input, Output, Feature} → ReportSection`. Report ID 0 (the
/// `None` key here) denotes the default/unnamed report. A descriptor that
/// never emits a `ReportID` item has exactly one entry, under `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(serialize_with = "serialize_reports", deserialize_with = "deserialize_reports")]
    pub reports: BTreeMap<Option<u8>, ReportSections>,
    /// True if any Main item in the descriptor is preceded by a `ReportID`
    /// global. Determines whether runtime reports carry an ID prefix byte.
    pub uses_report_ids: bool,
}

/// JSON object keys must be strings, but `None` (the "no Report ID"
/// descriptor) isn't one. Rendered as the sentinel key `"default"`,
/// explicit report IDs as their decimal string.
fn serialize_reports<S>(reports: &BTreeMap<Option<u8>, ReportSections>, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = ser.serialize_map(Some(reports.len()))?;
    for (k, v) in reports {
        let key = match k {
            Some(id) => id.to_string(),
            None => "default".to_string(),
        };
        map.serialize_entry(&key, v)?;
    }
    map.end()
}

fn deserialize_reports<'de, D>(de: D) -> Result<BTreeMap<Option<u8>, ReportSections>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, ReportSections> = BTreeMap::deserialize(de)?;
    let mut out = BTreeMap::new();
    for (k, v) in raw {
        let key = if k == "default" {
            None
        } else {
            Some(k.parse::<u8>().map_err(serde::de::Error::custom)?)
        };
        out.insert(key, v);
    }
    Ok(out)
}

impl Layout {
    pub fn section(&self, report_id: Option<u8>, report_type: ReportType) -> Option<&ReportSection> {
        self.reports.get(&report_id).map(|s| s.section(report_type))
    }
}

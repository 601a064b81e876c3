//! Table-driven routing of dropped files into the input slots.
//!
//! Within one drop, shapefile components are collected and applied after all
//! files were seen, so a bundle dropped together with a `.geojson` wins over
//! the GeoJSON document regardless of order. Separate drops never merge.

use plotmap_logging::plot_debug;

use crate::slots::lowercase_extension;
use crate::{InputFile, InputSlots};

/// Which slot a file extension routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Member of a multi-file shapefile bundle.
    ShapefileComponent,
    /// Self-contained GeoJSON document.
    GeoJson,
    /// Tabular sample measurements.
    SampleTable,
}

struct ExtensionRule {
    extension: &'static str,
    kind: FileKind,
    content_type: &'static str,
}

const OCTET_STREAM: &str = "application/octet-stream";

const RULES: &[ExtensionRule] = &[
    ExtensionRule {
        extension: "shp",
        kind: FileKind::ShapefileComponent,
        content_type: OCTET_STREAM,
    },
    ExtensionRule {
        extension: "dbf",
        kind: FileKind::ShapefileComponent,
        content_type: OCTET_STREAM,
    },
    ExtensionRule {
        extension: "shx",
        kind: FileKind::ShapefileComponent,
        content_type: OCTET_STREAM,
    },
    ExtensionRule {
        extension: "cpg",
        kind: FileKind::ShapefileComponent,
        content_type: OCTET_STREAM,
    },
    ExtensionRule {
        extension: "prj",
        kind: FileKind::ShapefileComponent,
        content_type: OCTET_STREAM,
    },
    ExtensionRule {
        extension: "geojson",
        kind: FileKind::GeoJson,
        content_type: "application/geo+json",
    },
    ExtensionRule {
        extension: "csv",
        kind: FileKind::SampleTable,
        content_type: "text/csv",
    },
    ExtensionRule {
        extension: "xlsx",
        kind: FileKind::SampleTable,
        content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    },
];

/// Every extension the classifier routes, with the leading dot.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    ".geojson", ".shp", ".dbf", ".shx", ".cpg", ".prj", ".csv", ".xlsx",
];

fn rule_for_name(name: &str) -> Option<&'static ExtensionRule> {
    let ext = lowercase_extension(name)?;
    RULES.iter().find(|rule| rule.extension == ext)
}

/// Slot routing for a file name, case-insensitive on the extension.
pub fn kind_for_name(name: &str) -> Option<FileKind> {
    rule_for_name(name).map(|rule| rule.kind)
}

/// MIME type used for the file's multipart part.
pub fn content_type_for_name(name: &str) -> &'static str {
    rule_for_name(name).map_or(OCTET_STREAM, |rule| rule.content_type)
}

/// What one drop event changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifyOutcome {
    pub geometry_replaced: bool,
    pub sample_replaced: bool,
    pub ignored: Vec<String>,
}

impl ClassifyOutcome {
    pub fn changed(&self) -> bool {
        self.geometry_replaced || self.sample_replaced
    }
}

/// Routes one drop event into the slots.
pub fn classify(slots: &mut InputSlots, dropped: Vec<InputFile>) -> ClassifyOutcome {
    let mut outcome = ClassifyOutcome::default();
    let mut bundle = Vec::new();

    for file in dropped {
        match kind_for_name(file.name()) {
            Some(FileKind::ShapefileComponent) => bundle.push(file),
            Some(FileKind::GeoJson) => {
                plot_debug!("geometry slot <- {}", file.name());
                slots.replace_geometry(vec![file]);
                outcome.geometry_replaced = true;
            }
            Some(FileKind::SampleTable) => {
                plot_debug!("sample slot <- {}", file.name());
                slots.replace_sample(file);
                outcome.sample_replaced = true;
            }
            None => {
                plot_debug!("ignoring unrecognized file {}", file.name());
                outcome.ignored.push(file.name().to_string());
            }
        }
    }

    if !bundle.is_empty() {
        plot_debug!("geometry slot <- {} shapefile components", bundle.len());
        slots.replace_geometry(bundle);
        outcome.geometry_replaced = true;
    }

    outcome
}

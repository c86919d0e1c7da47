//! Workbook part model and its relationship-namespace fixup.

use serde::Serialize;

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::part::serialize_part;

/// Attribute pair the serializer emits for a sheet's relationship id.
const VERBOSE_RELATIONSHIP_ID: &str = r#"xmlns:relationships="http://schemas.openxmlformats.org/officeDocument/2006/relationships" relationships:id"#;
/// Conventional prefixed form of the same attribute.
const SHORT_RELATIONSHIP_ID: &str = "r:id";
/// Root element as serialized, with only the spreadsheet namespace.
const SINGLE_NAMESPACE_ROOT: &str =
    r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#;
/// Root element carrying both the spreadsheet and relationship namespaces.
const DUAL_NAMESPACE_ROOT: &str = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#;

/// A workbook- or sheet-scoped defined name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinedName {
    /// Name, e.g. `Totals` or `_xlnm.Print_Area`
    #[serde(rename = "@name")]
    pub name: String,
    /// Zero-based index of the sheet the name is scoped to
    #[serde(rename = "@localSheetId", skip_serializing_if = "Option::is_none")]
    pub local_sheet_id: Option<u32>,
    /// Hidden from the name manager
    #[serde(rename = "@hidden", skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Formula the name refers to, e.g. `Sheet1!$A$1:$B$4`
    #[serde(rename = "$text")]
    pub reference: String,
}

impl DefinedName {
    /// Create a workbook-scoped name.
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_sheet_id: None,
            hidden: false,
            reference: reference.into(),
        }
    }

    /// Scope the name to the sheet at `index`.
    pub fn with_local_sheet_id(mut self, index: u32) -> Self {
        self.local_sheet_id = Some(index);
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Serde model of `xl/workbook.xml`.
#[derive(Debug, Serialize)]
#[serde(rename = "workbook")]
pub(crate) struct WorkbookPart<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "fileVersion")]
    file_version: FileVersion<'a>,
    #[serde(rename = "workbookPr")]
    workbook_pr: WorkbookPr,
    #[serde(rename = "bookViews")]
    book_views: BookViews,
    sheets: Sheets<'a>,
    #[serde(rename = "definedNames", skip_serializing_if = "Option::is_none")]
    defined_names: Option<DefinedNames<'a>>,
    #[serde(rename = "calcPr")]
    calc_pr: CalcPr,
}

#[derive(Debug, Serialize)]
struct FileVersion<'a> {
    #[serde(rename = "@appName")]
    app_name: &'a str,
}

#[derive(Debug, Serialize)]
struct WorkbookPr {
    #[serde(rename = "@showObjects")]
    show_objects: &'static str,
    #[serde(rename = "@date1904", skip_serializing_if = "Option::is_none")]
    date1904: Option<bool>,
}

#[derive(Debug, Serialize)]
struct BookViews {
    #[serde(rename = "workbookView")]
    workbook_view: WorkbookView,
}

#[derive(Debug, Serialize)]
struct WorkbookView {
    #[serde(rename = "@showHorizontalScroll")]
    show_horizontal_scroll: bool,
    #[serde(rename = "@showVerticalScroll")]
    show_vertical_scroll: bool,
    #[serde(rename = "@showSheetTabs")]
    show_sheet_tabs: bool,
    #[serde(rename = "@xWindow")]
    x_window: i32,
    #[serde(rename = "@yWindow")]
    y_window: i32,
    #[serde(rename = "@windowWidth")]
    window_width: u32,
    #[serde(rename = "@windowHeight")]
    window_height: u32,
    #[serde(rename = "@tabRatio")]
    tab_ratio: u32,
}

impl Default for WorkbookView {
    fn default() -> Self {
        Self {
            show_horizontal_scroll: true,
            show_vertical_scroll: true,
            show_sheet_tabs: true,
            x_window: 0,
            y_window: 0,
            window_width: 16384,
            window_height: 8192,
            tab_ratio: 204,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct Sheets<'a> {
    #[serde(rename = "sheet")]
    sheet: Vec<WorkbookSheet<'a>>,
}

#[derive(Debug, Serialize)]
struct WorkbookSheet<'a> {
    #[serde(rename = "@name")]
    name: &'a str,
    #[serde(rename = "@sheetId")]
    sheet_id: u32,
    #[serde(rename = "@xmlns:relationships")]
    xmlns_relationships: &'static str,
    #[serde(rename = "@relationships:id")]
    r_id: String,
    #[serde(rename = "@state")]
    state: &'static str,
}

#[derive(Debug, Serialize)]
struct DefinedNames<'a> {
    #[serde(rename = "definedName")]
    defined_name: &'a [DefinedName],
}

#[derive(Debug, Serialize)]
struct CalcPr {
    #[serde(rename = "@iterate")]
    iterate: bool,
    #[serde(rename = "@iterateCount")]
    iterate_count: u32,
    #[serde(rename = "@iterateDelta")]
    iterate_delta: f64,
    #[serde(rename = "@refMode")]
    ref_mode: &'static str,
}

impl Default for CalcPr {
    fn default() -> Self {
        Self {
            iterate: false,
            iterate_count: 100,
            iterate_delta: 0.001,
            ref_mode: "A1",
        }
    }
}

impl<'a> WorkbookPart<'a> {
    /// Workbook skeleton with the fixed view and calculation defaults.
    pub(crate) fn new(app_name: &'a str, date1904: bool) -> Self {
        Self {
            xmlns: namespace::SML_MAIN,
            file_version: FileVersion { app_name },
            workbook_pr: WorkbookPr {
                show_objects: "all",
                date1904: date1904.then_some(true),
            },
            book_views: BookViews {
                workbook_view: WorkbookView::default(),
            },
            sheets: Sheets::default(),
            defined_names: None,
            calc_pr: CalcPr::default(),
        }
    }

    /// Record a sheet entry pointing at relationship `r_id`.
    pub(crate) fn add_sheet(&mut self, name: &'a str, sheet_id: u32, r_id: String) {
        self.sheets.sheet.push(WorkbookSheet {
            name,
            sheet_id,
            xmlns_relationships: namespace::OFC_RELATIONSHIPS,
            r_id,
            state: "visible",
        });
    }

    pub(crate) fn set_defined_names(&mut self, names: &'a [DefinedName]) {
        self.defined_names = (!names.is_empty()).then_some(DefinedNames {
            defined_name: names,
        });
    }

    /// Serialize and patch in the `r` namespace prefix.
    pub(crate) fn to_xml(&self) -> Result<String> {
        serialize_part(self).map(|xml| fix_relationship_namespace(&xml))
    }
}

/// Rewrite the serializer's relationship attributes into the conventional `r:` form.
///
/// Every verbose `xmlns:relationships="…" relationships:id` pair becomes `r:id`,
/// and the first single-namespace `<workbook>` root gains `xmlns:r`. Input
/// without those exact substrings is returned unchanged.
pub fn fix_relationship_namespace(xml: &str) -> String {
    xml.replace(VERBOSE_RELATIONSHIP_ID, SHORT_RELATIONSHIP_ID)
        .replacen(SINGLE_NAMESPACE_ROOT, DUAL_NAMESPACE_ROOT, 1)
}

//! The document: an ordered set of sheets plus the state that must survive
//! across saves.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::ooxml::error::{Result, XlsxError};

use super::config::WriterConfig;
use super::reader::read_package;
use super::repair::{DocumentRepairer, LibreOfficeRepairer};
use super::sheet::Sheet;
use super::theme::Theme;
use super::writer::conditional::{ConditionalFormatRequest, inject_rules};
use super::writer::package::PackageWriter;
use super::writer::parts::{AssemblyContext, PartMap, WorkbookInput, assemble};
use super::writer::strings::StringInternTable;
use super::writer::styles::StyleRegistry;
use super::writer::workbook::DefinedName;

/// A spreadsheet document.
///
/// Sheets keep insertion order, which is also their tab order. The first sheet
/// added is the selected tab. The style registry is created on first use and
/// kept for the lifetime of the document so that differential-format ids stay
/// stable across saves.
///
/// # Examples
///
/// ```
/// use loquat::ooxml::xlsx::{ConditionalFormatRequest, Document};
///
/// let mut doc = Document::new();
/// let sheet = doc.add_sheet("Scores")?;
/// sheet.set_cell_value(0, 0, "Alice");
/// sheet.set_cell_value(0, 1, 72);
///
/// doc.add_conditional_formats(
///     &ConditionalFormatRequest::new().with_rule("B1", "$B$1>50", "FFFF0000"),
/// )?;
///
/// let mut bytes = Vec::new();
/// doc.write(&mut bytes)?;
/// let reopened = loquat::ooxml::xlsx::Document::open_binary(&bytes)?;
/// assert_eq!(reopened.to_grid(), vec![vec![vec!["Alice", "72"]]]);
/// # Ok::<(), loquat::ooxml::error::XlsxError>(())
/// ```
#[derive(Debug, Default)]
pub struct Document {
    sheets: Vec<Sheet>,
    sheet_index: HashMap<String, usize>,
    styles: Option<StyleRegistry>,
    theme: Option<Theme>,
    defined_names: Vec<DefinedName>,
    date1904: bool,
    config: WriterConfig,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with writer settings.
    pub fn with_config(config: WriterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Writer settings.
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Replace the writer settings.
    pub fn set_config(&mut self, config: WriterConfig) {
        self.config = config;
    }

    /// Append a sheet.
    ///
    /// Fails with [`XlsxError::DuplicateName`] if the name is taken, leaving
    /// the document unchanged.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        if self.sheet_index.contains_key(name) {
            return Err(XlsxError::DuplicateName(name.to_string()));
        }
        let position = self.sheets.len();
        self.sheets.push(Sheet::new(name.to_string(), position == 0));
        self.sheet_index.insert(name.to_string(), position);
        Ok(&mut self.sheets[position])
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheet_index.get(name).map(|&i| &self.sheets[i])
    }

    /// Look up a sheet by name for editing.
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        match self.sheet_index.get(name) {
            Some(&i) => self.sheets.get_mut(i),
            None => None,
        }
    }

    /// Sheets in tab order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Add a defined name to the workbook.
    pub fn add_defined_name(&mut self, name: DefinedName) {
        self.defined_names.push(name);
    }

    /// Defined names in insertion order.
    pub fn defined_names(&self) -> &[DefinedName] {
        &self.defined_names
    }

    /// Whether dates use the 1904 date system.
    pub fn date1904(&self) -> bool {
        self.date1904
    }

    pub fn set_date1904(&mut self, date1904: bool) {
        self.date1904 = date1904;
    }

    /// The style registry, if one has been created.
    pub fn styles(&self) -> Option<&StyleRegistry> {
        self.styles.as_ref()
    }

    /// Add a batch of expression rules with background fills to the first sheet.
    ///
    /// Each rule takes the next free priority on the sheet and the next free
    /// differential-format id. Without sheets this does nothing. A failing batch
    /// leaves the sheet and the style registry untouched.
    pub fn add_conditional_formats(&mut self, request: &ConditionalFormatRequest) -> Result<()> {
        let Some(sheet) = self.sheets.first_mut() else {
            return Ok(());
        };
        let theme = self.theme.as_ref();
        let styles = self.styles.get_or_insert_with(|| StyleRegistry::new(theme));
        inject_rules(sheet, styles, request)?;
        Ok(())
    }

    /// Build every part of the package.
    ///
    /// Shared strings are collected afresh; the style registry is created if
    /// needed and reset before the worksheets are rendered.
    pub fn assemble_parts(&mut self) -> Result<PartMap> {
        let mut strings = StringInternTable::new();
        let theme = self.theme.as_ref();
        let styles = self.styles.get_or_insert_with(|| StyleRegistry::new(theme));
        let input = WorkbookInput {
            sheets: &self.sheets,
            defined_names: &self.defined_names,
            date1904: self.date1904,
            app_name: &self.config.application_name,
        };
        let mut ctx = AssemblyContext {
            strings: &mut strings,
            styles,
        };
        assemble(&input, &mut ctx)
    }

    /// Write the package to a stream.
    pub fn write<W: Write>(&mut self, writer: W) -> Result<()> {
        let parts = self.assemble_parts()?;
        PackageWriter::write_to_stream(writer, &parts, self.config.compression)
    }

    /// Write the package to `path`, then repair it with LibreOffice if any
    /// sheet has conditional formatting.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut repairer = LibreOfficeRepairer::new();
        if let Some(timeout) = self.config.repair_timeout {
            repairer = repairer.with_timeout(timeout);
        }
        self.save_with_repairer(path, &repairer)
    }

    /// Write the package to `path`, then run `repairer` once if any sheet has
    /// conditional formatting.
    ///
    /// A repair failure is returned even though the package has been written.
    pub fn save_with_repairer<P: AsRef<Path>>(
        &mut self,
        path: P,
        repairer: &dyn DocumentRepairer,
    ) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write(BufWriter::new(file))?;

        if self.sheets.iter().any(|s| !s.conditional_formats().is_empty()) {
            repairer.repair(path)?;
        }
        Ok(())
    }

    /// Open a package from a file.
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::open_reader(BufReader::new(file))
    }

    /// Open a package held in memory.
    pub fn open_binary(bytes: &[u8]) -> Result<Self> {
        Self::open_reader(Cursor::new(bytes))
    }

    /// Open a package from any seekable source.
    pub fn open_reader<R: Read + Seek>(source: R) -> Result<Self> {
        let package = read_package(source)?;
        let mut doc = Self {
            styles: package.styles,
            theme: package.theme,
            defined_names: package.defined_names,
            date1904: package.date1904,
            ..Self::default()
        };
        for sheet in package.sheets {
            if doc.sheet_index.contains_key(sheet.name()) {
                return Err(XlsxError::DuplicateName(sheet.name().to_string()));
            }
            doc.sheet_index.insert(sheet.name().to_string(), doc.sheets.len());
            doc.sheets.push(sheet);
        }
        Ok(doc)
    }

    /// Cell values as strings, indexed by sheet, row and column.
    pub fn to_grid(&self) -> Vec<Vec<Vec<String>>> {
        self.sheets.iter().map(Sheet::to_grid).collect()
    }
}

/// Open the package at `path` and return its cell values as strings.
pub fn file_to_grid<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<Vec<String>>>> {
    Ok(Document::open_file(path)?.to_grid())
}

//! Static parts written verbatim into every package.

/// Package-level relationships (`_rels/.rels`).
pub const PACKAGE_RELS_XML: &str = include_str!("../../../resources/xlsx/rels.xml");

/// Extended document properties (`docProps/app.xml`).
pub const APP_PROPERTIES_XML: &str = include_str!("../../../resources/xlsx/app.xml");

/// Core document properties (`docProps/core.xml`).
pub const CORE_PROPERTIES_XML: &str = include_str!("../../../resources/xlsx/core.xml");

/// Office theme (`xl/theme/theme1.xml`).
pub const THEME_XML: &str = include_str!("../../../resources/xlsx/theme1.xml");

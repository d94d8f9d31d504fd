//! Moving projects and reference data in and out of the fee engine:
//! bundle import, workspace and text export, display rendering and the
//! construction-type CSV loader.

pub mod export;
pub mod import;
pub mod report;
pub mod table_loader;

pub use export::{WorkspaceExport, export_txt, txt_file_name, workspace_file_name};
pub use import::{ImportError, import_value, parse_projects};
pub use report::{Report, format_money, format_total, rewrite_legacy_line, total_header};
pub use table_loader::{ConstructionTypeLoader, ConstructionTypeLoaderError, ConstructionTypeRecord};

//! Project and entity file parsing

mod ddlproj_parser;
mod entity_source;

pub use ddlproj_parser::{parse_ddlproj, DdlProject};
pub use entity_source::{
    load_entity_file, load_entity_files, parse_entity_document, EntitySources,
};

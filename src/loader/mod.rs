//! Map parsers. Everything upstream of validation goes through [`MapSource`],
//! so the core can be driven by hand-built maps in tests.

pub mod json_loader;
pub mod tmx_loader;

use crate::error::ParseError;
use crate::ir_map::Map;
use std::path::Path;

pub use json_loader::JsonLoader;
pub use tmx_loader::TmxLoader;

/// Parses a map file into the in-memory [`Map`] model.
pub trait MapSource {
    /// Reads and parses the map at `path`.
    fn parse(&self, path: &Path) -> Result<Map, ParseError>;
}

/// Picks a parser from the file extension: `.tmx` for XML, `.json` or `.tmj` for JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLoader;

impl MapSource for DefaultLoader {
    fn parse(&self, path: &Path) -> Result<Map, ParseError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tmx") => TmxLoader.parse(path),
            Some(ext) if ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("tmj") => {
                JsonLoader.parse(path)
            }
            _ => Err(ParseError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

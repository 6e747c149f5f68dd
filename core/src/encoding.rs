use std::fmt;
use std::str::FromStr;

use crate::error::ScriptError;

/// Character encoding used to decode script content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScriptEncoding {
    Utf8,
    #[default]
    Latin1,
}

impl ScriptEncoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            ScriptEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            // ISO-8859-1 maps every byte onto the code point of the same value
            ScriptEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

impl FromStr for ScriptEncoding {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(ScriptEncoding::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(ScriptEncoding::Latin1),
            _ => Err(ScriptError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for ScriptEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptEncoding::Utf8 => f.write_str("UTF-8"),
            ScriptEncoding::Latin1 => f.write_str("ISO-8859-1"),
        }
    }
}

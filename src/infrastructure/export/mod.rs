//! Character export and import
//!
//! Three document shapes are supported:
//! - [`export_basic`]: the `Character` record on its own
//! - [`export_extended`] / [`ExtendedCharacterExport`]: a character bundled
//!   with its relationships, notes and favorite spells/monsters
//! - [`export_external`] / [`ExternalCharacterFormat`]: the nested
//!   `{name, label, value}` schema used by the Long Story Short sheet
//!
//! [`import_any`] accepts any of the three plus loosely shaped key/value
//! documents and reports which shape it recognized.

mod basic;
mod extended;
mod external;
mod importer;

use serde::Serialize;
use thiserror::Error;

use crate::domain::value_objects::Avatar;

pub use basic::export_basic;
pub use extended::{export_extended, ExtendedCharacterExport, EXTENDED_EXPORT_VERSION};
pub use external::{export_external, ExternalCharacterData, ExternalCharacterFormat};
pub use importer::{import_any, ImportedCharacter, StrategyFailure};

/// Errors raised while exporting or importing character documents
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to encode character document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Unrecognized character document: {}", describe_failures(.0))]
    Unrecognized(Vec<StrategyFailure>),
}

fn describe_failures(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.format, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Shapes a character can be exported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Basic,
    Extended,
    External,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "extended" => Some(Self::Extended),
            "external" | "lss" => Some(Self::External),
            _ => None,
        }
    }
}

/// The shape an imported document was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportFormat {
    External,
    Extended,
    Basic,
    Manual,
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::External => "external",
            Self::Extended => "extended",
            Self::Basic => "basic",
            Self::Manual => "manual",
        };
        write!(f, "{}", name)
    }
}

/// Encode `value`, and if that fails while an avatar is attached, encode
/// once more with the avatar removed.
fn encode_without_avatar_on_failure<T, F>(mut value: T, avatar: F) -> Result<String, TransferError>
where
    T: Serialize,
    F: Fn(&mut T) -> &mut Option<Avatar>,
{
    match serde_json::to_string_pretty(&value) {
        Ok(json) => Ok(json),
        Err(e) if avatar(&mut value).is_some() => {
            tracing::warn!(error = %e, "Export failed, retrying without avatar");
            *avatar(&mut value) = None;
            serde_json::to_string_pretty(&value).map_err(TransferError::Encode)
        }
        Err(e) => Err(TransferError::Encode(e)),
    }
}

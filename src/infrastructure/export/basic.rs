//! Basic export - the character record on its own

use crate::domain::entities::Character;

use super::{encode_without_avatar_on_failure, TransferError};

/// Serialize a character as pretty JSON. An avatar that cannot be encoded
/// is dropped rather than failing the export.
pub fn export_basic(character: &Character) -> Result<String, TransferError> {
    encode_without_avatar_on_failure(character.clone(), |c| &mut c.avatar)
}

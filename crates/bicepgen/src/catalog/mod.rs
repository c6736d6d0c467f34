//! resource catalog
//!
//! Typed descriptors for a handful of Azure resource types. They only use the public engine surface:
//! [crate::resource::Resource] for the lifecycle, [crate::property] for the body and [crate::value] for expressions.
//!
//! | module | resource type |
//! |---|---|
//! | [cosmos] | `Microsoft.DocumentDB/databaseAccounts` and its SQL databases, containers and role assignments |
//! | [identity] | `Microsoft.ManagedIdentity/userAssignedIdentities` |
//! | [key_vault] | `Microsoft.KeyVault/vaults` (existing only) |
//! | [authorization] | `Microsoft.Authorization/roleAssignments` |
//! | [maps] | `Microsoft.Maps/accounts` |
use crate::error::ExpressionError;
use crate::resource;
use crate::value::{InterpolatedString, Value};

/// Implements `Display` with the text each variant is emitted as
macro_rules! emitted_as {
    ($ty:ty { $($variant:ident => $text:literal),* $(,)? }) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $text),*
                })
            }
        }
    };
}

pub mod authorization;
pub mod cosmos;
pub mod identity;
pub mod key_vault;
pub mod maps;

/// `'<prefix>${uniqueString(resourceGroup().id)}'`
fn unique_name(prefix: &str) -> Result<Value, ExpressionError> {
    InterpolatedString::new()
        .literal(prefix)
        .expression(resource::unique_string())
        .build()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unique_names() {
        assert_eq!(
            unique_name("test").unwrap().to_string(),
            "'test${uniqueString(resourceGroup().id)}'"
        );
    }
}

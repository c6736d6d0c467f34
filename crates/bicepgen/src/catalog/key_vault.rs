//! key vaults
//!
//! Vaults are created elsewhere, documents only refer to them.
use crate::document::{Output, ParameterType};
use crate::error::{Result, ValidationError};
use crate::resource::{keys, Body, Resource, ResourceHeader, ResourceName};
use crate::value::Value;

pub const KEY_VAULT_TYPE: &str = "Microsoft.KeyVault/vaults@2022-07-01";

/// `Microsoft.KeyVault/vaults`, declared as `kv_<identifier>`
#[derive(Debug, Clone)]
pub struct KeyVault {
    header: ResourceHeader,
    public_name: Option<Value>,
}

impl Default for KeyVault {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyVault {
    pub fn new() -> Self {
        let name = ResourceName::trusted(format!("kv_{}", crate::identifier::allocate("kv")));
        Self {
            header: ResourceHeader::from_name(name, KEY_VAULT_TYPE),
            public_name: None,
        }
    }

    /// Refers to the vault deployed as `name`
    pub fn existing(mut self, name: impl Into<Value>) -> Self {
        self.header.set_existing(true);
        self.public_name = Some(name.into());
        self
    }

    /// `vaultUri`
    pub fn vault_uri_output(&self) -> Output {
        Output::named(
            ResourceName::trusted("vaultUri"),
            ParameterType::String,
            self.reference().member(keys::PROPERTIES).member("vaultUri"),
        )
    }
}

impl Resource for KeyVault {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !self.header.is_existing() {
            return Err(ValidationError::unsupported(
                "key vaults cannot be created, declare an existing vault instead",
            ));
        }
        if self.public_name.is_none() {
            return Err(ValidationError::missing("public_name", "for an existing vault"));
        }
        Ok(())
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        if let Some(name) = &self.public_name {
            body.add(keys::NAME, name.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::resource::ResourceExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn creation_is_rejected() {
        assert!(matches!(
            KeyVault::new().to_bicep(),
            Err(Error::Validation {
                source: ValidationError::Unsupported { .. },
                ..
            })
        ));
    }

    #[test]
    fn existing() {
        let vault = KeyVault::new().existing(Value::variable("resourceName"));
        assert_eq!(
            vault.to_bicep().unwrap(),
            "resource kv_88F2BAED 'Microsoft.KeyVault/vaults@2022-07-01' existing = {\n  name: resourceName\n}"
        );
        assert_eq!(
            vault.vault_uri_output().value.to_string(),
            "kv_88F2BAED.properties.vaultUri"
        );
    }
}

//! user assigned managed identities
use crate::document::{Output, ParameterType};
use crate::error::Result;
use crate::identifier::IdentifierAllocator;
use crate::resource::{self, keys, Body, Resource, ResourceHeader, ResourceName};
use crate::value::{InterpolatedString, Value};

pub const IDENTITY_TYPE: &str = "Microsoft.ManagedIdentity/userAssignedIdentities@2023-01-31";
pub const IDENTITY_PREFIX: &str = "uai_";

/// Deployed names are at most this long
const MAX_NAME_LENGTH: i32 = 24;

/// `Microsoft.ManagedIdentity/userAssignedIdentities`
///
/// Declared as `uai_<identifier>`, derived from the public name, so the same identity always gets the same symbol.
#[derive(Debug, Clone)]
pub struct UserAssignedIdentity {
    header: ResourceHeader,
    public_name: String,
}

impl UserAssignedIdentity {
    pub fn new(public_name: impl Into<String>) -> Self {
        let public_name = public_name.into();
        let name = ResourceName::trusted(format!(
            "{IDENTITY_PREFIX}{}",
            crate::identifier::allocate(&public_name)
        ));
        Self::named(name, public_name)
    }

    /// Like [UserAssignedIdentity::new], registering the symbol with `allocator`
    pub fn allocate(allocator: &mut IdentifierAllocator, public_name: impl Into<String>) -> Result<Self> {
        let public_name = public_name.into();
        let name = allocator.allocate_prefixed(IDENTITY_PREFIX, &public_name)?;
        Ok(Self::named(ResourceName::trusted(name), public_name))
    }

    fn named(name: ResourceName, public_name: String) -> Self {
        Self {
            header: ResourceHeader::from_name(name, IDENTITY_TYPE),
            public_name,
        }
    }

    pub fn public_name(&self) -> &str {
        &self.public_name
    }

    fn output(&self, name: &str, value: Value) -> Output {
        Output::named(ResourceName::trusted(name), ParameterType::String, value)
    }

    pub fn principal_id_output(&self) -> Output {
        self.output(
            "principalId",
            self.reference().member(keys::PROPERTIES).member("principalId"),
        )
    }

    pub fn client_id_output(&self) -> Output {
        self.output(
            "clientId",
            self.reference().member(keys::PROPERTIES).member("clientId"),
        )
    }

    pub fn resource_id_output(&self) -> Output {
        self.output("resourceId", self.reference().member("id"))
    }

    /// All outputs a host needs to attach the identity elsewhere
    pub fn outputs(&self) -> [Output; 3] {
        [
            self.principal_id_output(),
            self.client_id_output(),
            self.resource_id_output(),
        ]
    }
}

impl Resource for UserAssignedIdentity {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        let name = InterpolatedString::new()
            .literal(self.name().as_str())
            .expression(resource::unique_string())
            .build()?;

        body.add(
            keys::NAME,
            Value::call(
                "toLower",
                [Value::call("take", [name, Value::from(MAX_NAME_LENGTH)])],
            ),
        )
        .add(keys::LOCATION, resource::location());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resource::ResourceExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbol_is_derived_from_the_public_name() {
        let identity = UserAssignedIdentity::new("test");
        assert_eq!(identity.name().as_str(), "uai_A94A8FE5");
        assert_eq!(identity.public_name(), "test");
    }

    #[test]
    fn render() {
        assert_eq!(
            UserAssignedIdentity::new("test").to_bicep().unwrap(),
            "resource uai_A94A8FE5 'Microsoft.ManagedIdentity/userAssignedIdentities@2023-01-31' = {
  name: toLower(take('uai_A94A8FE5${uniqueString(resourceGroup().id)}',24))
  location: location
}"
        );
    }

    #[test]
    fn outputs() {
        let rendered: Vec<_> = UserAssignedIdentity::new("test")
            .outputs()
            .iter()
            .map(|output| output.value.to_string())
            .collect();
        assert_eq!(
            rendered,
            [
                "uai_A94A8FE5.properties.principalId",
                "uai_A94A8FE5.properties.clientId",
                "uai_A94A8FE5.id"
            ]
        );
    }

    #[test]
    fn allocation_is_registered() {
        let mut allocator = IdentifierAllocator::new();
        let identity = UserAssignedIdentity::allocate(&mut allocator, "test").unwrap();
        assert_eq!(identity.name().as_str(), "uai_A94A8FE5");
        assert_eq!(allocator.issued().collect::<Vec<_>>(), [("test", "A94A8FE5")]);
    }
}

//! azure maps accounts
use crate::catalog::unique_name;
use crate::document::{Output, ParameterType};
use crate::error::Result;
use crate::property::PropertyBag;
use crate::resource::{self, keys, Body, ExistingResource, Resource, ResourceHeader, ResourceName};
use crate::value::Value;

pub const MAPS_ACCOUNT_TYPE: &str = "Microsoft.Maps/accounts@2023-06-01";

/// `Microsoft.Maps/accounts`, declared as `mapsAccount`
#[derive(Debug, Clone)]
pub struct MapsAccount {
    header: ResourceHeader,
    account_name: String,

    pub sku: String,
    pub kind: String,
    /// Only Entra ID authentication, no shared keys
    pub disable_local_auth: bool,
}

impl MapsAccount {
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            header: ResourceHeader::from_name(ResourceName::trusted("mapsAccount"), MAPS_ACCOUNT_TYPE),
            account_name: account_name.into(),
            sku: "G2".to_string(),
            kind: "Gen2".to_string(),
            disable_local_auth: true,
        }
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// `clientId`, the id clients send in `x-ms-client-id`
    pub fn client_id_output(&self) -> Output {
        Output::named(
            ResourceName::trusted("clientId"),
            ParameterType::String,
            self.reference().member(keys::PROPERTIES).member("uniqueId"),
        )
    }
}

impl Resource for MapsAccount {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        body.add(keys::NAME, unique_name(&self.account_name.to_lowercase())?)
            .add(keys::LOCATION, resource::location())
            .add("kind", self.kind.as_str());
        body.push(PropertyBag::new("sku").with(keys::NAME, self.sku.as_str()));

        let mut properties = PropertyBag::new(keys::PROPERTIES);
        if self.disable_local_auth {
            properties.add("disableLocalAuth", true);
        }
        body.push(properties);
        Ok(())
    }

    /// Seeded by the account name, so every document referring to the same account agrees on the symbol
    fn as_existing(&self, reference: Value) -> ExistingResource {
        ExistingResource::with_seed(self.header.resource_type(), &self.account_name, reference)
    }
}

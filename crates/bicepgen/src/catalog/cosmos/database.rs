use super::{throughput_options, validate_throughput, CosmosAccount, SqlContainer, API_VERSION};
use crate::error::{NameError, Result, ValidationError};
use crate::property::PropertyBag;
use crate::resource::{self, keys, Body, Resource, ResourceHeader, ResourceName};
use crate::value::Value;

pub const DATABASE_TYPE: &str = "Microsoft.DocumentDB/databaseAccounts/sqlDatabases";

/// A SQL database of a [CosmosAccount]
///
/// The name is used as symbol and as database id.
#[derive(Debug, Clone)]
pub struct SqlDatabase {
    header: ResourceHeader,
    account: ResourceName,
    serverless: bool,
    containers: Vec<SqlContainer>,

    /// Manual throughput in RU/s, not available on serverless accounts
    pub throughput: Option<i32>,
    /// Autoscale maximum in RU/s, not available on serverless accounts
    pub autoscale_max_throughput: Option<i32>,
}

impl SqlDatabase {
    pub fn new(account: &CosmosAccount, name: &str) -> Result<Self, NameError> {
        Ok(Self {
            header: ResourceHeader::new(name, format!("{DATABASE_TYPE}@{API_VERSION}"))?,
            account: account.name().clone(),
            serverless: account.is_serverless(),
            containers: Vec::new(),
            throughput: None,
            autoscale_max_throughput: None,
        })
    }

    pub fn with_throughput(mut self, throughput: i32) -> Self {
        self.throughput = Some(throughput);
        self
    }

    pub fn with_autoscale_max_throughput(mut self, max: i32) -> Self {
        self.autoscale_max_throughput = Some(max);
        self
    }

    /// Symbol of the owning account
    pub fn account(&self) -> &ResourceName {
        &self.account
    }

    pub(super) fn set_account(&mut self, account: ResourceName) {
        for container in &mut self.containers {
            container.set_account(account.clone());
        }
        self.account = account;
    }

    pub fn is_serverless(&self) -> bool {
        self.serverless
    }

    pub(super) fn set_serverless(&mut self, serverless: bool) {
        self.serverless = serverless;
        for container in &mut self.containers {
            container.set_serverless(serverless);
        }
    }

    /// Creates a container for this database without adding it
    pub fn container(&self, name: &str) -> Result<SqlContainer, NameError> {
        SqlContainer::new(self, name)
    }

    /// Adds a container, declared right after the database
    pub fn add_container(&mut self, mut container: SqlContainer) -> &mut SqlContainer {
        container.set_database(self.account.clone(), self.header.name().clone());
        container.set_serverless(self.serverless);
        self.containers.push(container);
        let index = self.containers.len() - 1;
        &mut self.containers[index]
    }

    pub fn containers(&self) -> &[SqlContainer] {
        &self.containers
    }

    pub fn containers_mut(&mut self) -> &mut [SqlContainer] {
        &mut self.containers
    }
}

impl Resource for SqlDatabase {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_throughput(
            "database",
            self.serverless,
            self.throughput,
            self.autoscale_max_throughput,
        )
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        body.add(keys::PARENT, self.account.reference())
            .add(keys::NAME, Value::string(self.name().as_str()))
            .add(keys::LOCATION, resource::location());

        let mut properties = PropertyBag::new(keys::PROPERTIES);
        if let Some(options) = throughput_options(self.throughput, self.autoscale_max_throughput) {
            properties.add_property(options);
        }
        properties.add_property(PropertyBag::new("resource").with("id", self.name().as_str()));

        body.push(properties);
        Ok(())
    }

    fn children(&self) -> Vec<&dyn Resource> {
        self.containers
            .iter()
            .map(|container| container as &dyn Resource)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resource::ResourceExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn follows_the_account() {
        let mut account = CosmosAccount::new("test");
        let database = account.add_database(account.database("testDb").unwrap());
        assert_eq!(database.account().as_str(), "cosmosDbAccount");
        assert!(database.is_serverless());

        account.set_serverless(false);
        assert!(!account.databases()[0].is_serverless());

        let account = account.with_symbol("acct").unwrap();
        assert_eq!(account.databases()[0].account().as_str(), "acct");
    }

    #[test]
    fn throughput_needs_provisioned_account() {
        let account = CosmosAccount::new("test");
        let database = account.database("testDb").unwrap().with_throughput(400);
        assert!(matches!(
            database.to_bicep(),
            Err(crate::error::Error::Validation { .. })
        ));
    }
}

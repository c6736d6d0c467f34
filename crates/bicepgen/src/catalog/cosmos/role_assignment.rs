use super::{CosmosAccount, SqlContainer, SqlDatabase, API_VERSION};
use crate::error::{Error, NameError, Result, ValidationError};
use crate::property::PropertyBag;
use crate::resource::{keys, Body, Resource, ResourceHeader, ResourceName};
use crate::scope::ScopePath;
use crate::value::Value;

pub const ROLE_ASSIGNMENT_TYPE: &str = "Microsoft.DocumentDB/databaseAccounts/sqlRoleAssignments";
const ROLE_DEFINITION_TYPE: &str = "Microsoft.DocumentDB/databaseAccounts/sqlRoleDefinitions";

/// What a SQL role assignment grants access to
#[derive(Debug, Clone, PartialEq)]
pub enum SqlScope {
    Account {
        account: ResourceName,
    },
    Database {
        account: ResourceName,
        database: ResourceName,
    },
    Container {
        account: ResourceName,
        database: ResourceName,
        container: ResourceName,
    },
}

impl SqlScope {
    pub fn account(account: &CosmosAccount) -> Self {
        SqlScope::Account {
            account: account.name().clone(),
        }
    }

    pub fn database(database: &SqlDatabase) -> Self {
        SqlScope::Database {
            account: database.account().clone(),
            database: database.name().clone(),
        }
    }

    pub fn container(container: &SqlContainer) -> Self {
        SqlScope::Container {
            account: container.account().clone(),
            database: container.database().clone(),
            container: container.name().clone(),
        }
    }

    /// A scope from the symbols from the account down to the scoped resource
    pub fn from_ancestry(ancestry: &[ResourceName]) -> Result<Self> {
        match ancestry {
            [account] => Ok(SqlScope::Account {
                account: account.clone(),
            }),
            [account, database] => Ok(SqlScope::Database {
                account: account.clone(),
                database: database.clone(),
            }),
            [account, database, container] => Ok(SqlScope::Container {
                account: account.clone(),
                database: database.clone(),
                container: container.clone(),
            }),
            other => Err(Error::UnsupportedVariant {
                kind: "sql scope",
                variant: format!(
                    "ancestry of {} levels ({})",
                    other.len(),
                    other
                        .iter()
                        .map(ResourceName::as_str)
                        .collect::<Vec<_>>()
                        .join(" -> ")
                ),
            }),
        }
    }

    /// The account everything is granted on
    pub fn account_name(&self) -> &ResourceName {
        match self {
            SqlScope::Account { account }
            | SqlScope::Database { account, .. }
            | SqlScope::Container { account, .. } => account,
        }
    }

    pub fn path(&self) -> ScopePath {
        match self {
            SqlScope::Account { account } => ScopePath::new(account.clone()),
            SqlScope::Database { account, database } => {
                ScopePath::new(account.clone()).link("dbs", database.clone())
            }
            SqlScope::Container {
                account,
                database,
                container,
            } => ScopePath::new(account.clone())
                .link("dbs", database.clone())
                .link("colls", container.clone()),
        }
    }

    /// `acct.id`, `'${acct.id}/dbs/${db.name}'` or `'${acct.id}/dbs/${db.name}/colls/${coll.name}'`
    pub fn resolve(&self) -> Result<Value> {
        Ok(self.path().resolve()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInRole {
    Reader,
    Contributor,
}

impl BuiltInRole {
    pub fn definition_id(self) -> &'static str {
        match self {
            BuiltInRole::Reader => "00000000-0000-0000-0000-000000000001",
            BuiltInRole::Contributor => "00000000-0000-0000-0000-000000000002",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlRole {
    BuiltIn(BuiltInRole),
    /// A role definition declared in the same document
    Custom(ResourceName),
}

/// Grants a principal a SQL data plane role
#[derive(Debug, Clone)]
pub struct SqlRoleAssignment {
    header: ResourceHeader,
    pub scope: Option<SqlScope>,
    pub role: Option<SqlRole>,
    pub principal_id: Option<Value>,
}

impl SqlRoleAssignment {
    pub fn new(name: &str) -> Result<Self, NameError> {
        Ok(Self {
            header: ResourceHeader::new(name, format!("{ROLE_ASSIGNMENT_TYPE}@{API_VERSION}"))?,
            scope: None,
            role: None,
            principal_id: None,
        })
    }

    pub fn with_scope(mut self, scope: SqlScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_built_in_role(mut self, role: BuiltInRole) -> Self {
        self.role = Some(SqlRole::BuiltIn(role));
        self
    }

    pub fn with_reader_role(self) -> Self {
        self.with_built_in_role(BuiltInRole::Reader)
    }

    pub fn with_contributor_role(self) -> Self {
        self.with_built_in_role(BuiltInRole::Contributor)
    }

    pub fn with_custom_role(mut self, definition: &dyn Resource) -> Self {
        self.role = Some(SqlRole::Custom(definition.name().clone()));
        self
    }

    pub fn with_principal_id(mut self, principal_id: impl Into<Value>) -> Self {
        self.principal_id = Some(principal_id.into());
        self
    }

    /// Uses the `principalId` parameter supplied by the host
    pub fn with_default_principal_id(self) -> Self {
        self.with_principal_id(Value::variable("principalId"))
    }

    /// Scope, role and principal, the first one missing is reported
    fn assignment(&self) -> Result<(&SqlScope, &SqlRole, &Value), ValidationError> {
        let missing = |field| ValidationError::missing(field, "for a role assignment");
        let scope = self.scope.as_ref().ok_or_else(|| missing("scope"))?;
        let role = self.role.as_ref().ok_or_else(|| missing("role"))?;
        let principal_id = self
            .principal_id
            .as_ref()
            .ok_or_else(|| missing("principal_id"))?;
        Ok((scope, role, principal_id))
    }

    fn role_definition_id(role: &SqlRole, account: &ResourceName) -> Value {
        match role {
            SqlRole::BuiltIn(role) => Value::call(
                "resourceId",
                [
                    Value::string(ROLE_DEFINITION_TYPE),
                    account.reference().member("name"),
                    Value::string(role.definition_id()),
                ],
            ),
            SqlRole::Custom(definition) => definition.reference().member("id"),
        }
    }
}

impl Resource for SqlRoleAssignment {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.assignment().map(|_| ())
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        let (scope, role, principal_id) = self
            .assignment()
            .map_err(|source| Error::invalid(self.name(), source))?;

        let account = scope.account_name();
        body.add(keys::PARENT, account.reference()).add(
            keys::NAME,
            Value::call(
                "guid",
                [
                    account.reference().member("id"),
                    Value::string(self.name().as_str()),
                ],
            ),
        );

        body.push(
            PropertyBag::new(keys::PROPERTIES)
                .with("roleDefinitionId", Self::role_definition_id(role, account))
                .with(keys::SCOPE, scope.resolve()?)
                .with("principalId", principal_id.clone()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(names: &[&str]) -> Vec<ResourceName> {
        names.iter().map(|name| ResourceName::new(*name).unwrap()).collect()
    }

    #[test]
    fn scope_from_ancestry() {
        assert_eq!(
            SqlScope::from_ancestry(&names(&["acct"])).unwrap().resolve().unwrap().to_string(),
            "acct.id"
        );
        assert_eq!(
            SqlScope::from_ancestry(&names(&["acct", "db", "coll"]))
                .unwrap()
                .resolve()
                .unwrap()
                .to_string(),
            "'${acct.id}/dbs/${db.name}/colls/${coll.name}'"
        );
    }

    #[test]
    fn unknown_depth_is_rejected() {
        assert!(matches!(
            SqlScope::from_ancestry(&[]),
            Err(Error::UnsupportedVariant { kind: "sql scope", .. })
        ));
        assert!(matches!(
            SqlScope::from_ancestry(&names(&["a", "b", "c", "d"])),
            Err(Error::UnsupportedVariant { kind: "sql scope", .. })
        ));
    }

    #[test]
    fn missing_role_is_reported() {
        use crate::resource::ResourceExt;

        let account = CosmosAccount::new("test");
        let assignment = SqlRoleAssignment::new("access")
            .unwrap()
            .with_scope(SqlScope::account(&account))
            .with_default_principal_id();

        let error = assignment.to_bicep().unwrap_err();
        assert!(error.to_string().contains("`role`"), "{error}");
    }

    #[test]
    fn construct_names_the_missing_field() {
        let account = CosmosAccount::new("test");
        let assignment = SqlRoleAssignment::new("access")
            .unwrap()
            .with_scope(SqlScope::account(&account))
            .with_reader_role();

        let mut body = Body::default();
        let Err(Error::Validation { resource, source, .. }) = assignment.construct(&mut body) else {
            panic!("principal_id is missing");
        };
        assert_eq!(resource, "access");
        assert!(matches!(
            source,
            ValidationError::MissingField {
                field: "principal_id",
                ..
            }
        ));
        assert!(body.is_empty());
    }
}

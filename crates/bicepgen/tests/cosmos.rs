//! Cosmos DB renders, compared against the templates the service accepts

use bicepgen::catalog::cosmos::{
    BuiltInRole, CosmosAccount, IndexingPolicy, SqlContainer, SqlDatabase, SqlRoleAssignment,
    SqlScope, UniqueKey, VirtualNetworkRule,
};
use bicepgen::error::{Error, ValidationError};
use bicepgen::resource::{Resource, ResourceExt};
use bicepgen::value::Value;
use pretty_assertions::assert_eq;

#[test]
fn default_account() {
    let account = CosmosAccount::new("test");

    insta::assert_snapshot!(account.to_bicep().unwrap(), @r###"
    resource cosmosDbAccount 'Microsoft.DocumentDB/databaseAccounts@2023-11-15' = {
      name: 'test${uniqueString(resourceGroup().id)}'
      location: location
      properties: {
        backupPolicy: {
          type: 'Continuous'
          continuousModeProperties: {
            tier: 'Continuous7Days'
          }
        }
        capabilities: [
          'EnableServerless'
        ]
        consistencyPolicy: {
          defaultConsistencyLevel: 'Session'
        }
        locations: [
          {
            failoverPriority: 0
            locationName: location
            isZoneRedundant: false
          }
        ]
        minimumTlsVersion: 'Tls12'
        publicNetworkAccess: 'SecuredByPerimiter'
      }
    }
    "###);
}

#[test]
fn development_defaults() {
    let account = CosmosAccount::new("test").with_development_defaults();

    insta::assert_snapshot!(account.to_bicep().unwrap(), @r###"
    resource cosmosDbAccount 'Microsoft.DocumentDB/databaseAccounts@2023-11-15' = {
      name: 'test${uniqueString(resourceGroup().id)}'
      location: location
      properties: {
        backupPolicy: {
          type: 'Continuous'
          continuousModeProperties: {
            tier: 'Continuous7Days'
          }
        }
        capabilities: [
          'EnableServerless'
        ]
        consistencyPolicy: {
          defaultConsistencyLevel: 'Session'
        }
        locations: [
          {
            failoverPriority: 0
            locationName: location
            isZoneRedundant: false
          }
        ]
        minimumTlsVersion: 'Tls12'
        networkAclBypass: 'AzureServices'
        publicNetworkAccess: 'Enabled'
      }
    }
    "###);
}

#[test]
fn standard_account_has_no_capabilities() {
    let rendered = CosmosAccount::new("test").as_standard().to_bicep().unwrap();
    assert!(!rendered.contains("capabilities"), "{rendered}");
}

#[test]
fn virtual_network_rules_need_the_filter() {
    let mut account = CosmosAccount::new("test").as_standard();
    account
        .virtual_network_rules
        .push(VirtualNetworkRule::new(Value::variable("subnetId")));

    let Err(Error::Validation { source, .. }) = account.to_bicep() else {
        panic!("the network filter is disabled");
    };
    assert!(matches!(
        source,
        ValidationError::MissingField {
            field: "is_virtual_network_filter_enabled",
            ..
        }
    ));

    account.is_virtual_network_filter_enabled = true;
    let rendered = account.to_bicep().unwrap();
    assert!(rendered.contains("    isVirtualNetworkFilterEnabled: true\n"), "{rendered}");
    assert!(
        rendered.contains(
            "    virtualNetworkRules: [
      {
        id: subnetId
      }
    ]"
        ),
        "{rendered}"
    );
    assert!(!rendered.contains("ignoreMissingVNetServiceEndpoint"), "{rendered}");
}

#[test]
fn bounded_staleness_needs_both_limits() {
    use bicepgen::catalog::cosmos::ConsistencyLevel;

    let mut account = CosmosAccount::new("test");
    account.consistency_level = ConsistencyLevel::BoundedStaleness;
    account.max_staleness_prefix = Some(100);

    let Err(Error::Validation { source, .. }) = account.to_bicep() else {
        panic!("max_interval_in_seconds is missing");
    };
    assert!(matches!(
        source,
        ValidationError::MissingField {
            field: "max_interval_in_seconds",
            ..
        }
    ));

    account.max_interval_in_seconds = Some(4);
    let Err(Error::Validation { source, .. }) = account.to_bicep() else {
        panic!("max_interval_in_seconds is out of range");
    };
    assert_eq!(
        source,
        ValidationError::OutOfRange {
            field: "max_interval_in_seconds",
            value: 4,
            min: 5,
            max: 86400,
        }
    );

    account.max_interval_in_seconds = Some(300);
    let rendered = account.to_bicep().unwrap();
    assert!(rendered.contains(
        "    consistencyPolicy: {
      defaultConsistencyLevel: 'BoundedStaleness'
      maxIntervalInSeconds: 300
      maxStalenessPrefix: 100
    }"
    ));
}

#[test]
fn serverless_excludes_free_tier() {
    let mut account = CosmosAccount::new("test");
    account.enable_free_tier = true;

    let Err(Error::Validation { source, .. }) = account.to_bicep() else {
        panic!("serverless accounts have no free tier");
    };
    assert_eq!(
        source.to_string(),
        "`serverless` and `enable_free_tier` are mutually exclusive"
    );

    account.set_serverless(false);
    assert!(account.to_bicep().is_ok());
}

#[test]
fn simple_database() {
    let account = CosmosAccount::new("test");
    let database = SqlDatabase::new(&account, "testDb").unwrap();

    assert_eq!(
        database.to_bicep().unwrap(),
        "resource testDb 'Microsoft.DocumentDB/databaseAccounts/sqlDatabases@2023-11-15' = {
  parent: cosmosDbAccount
  name: 'testDb'
  location: location
  properties: {
    resource: {
      id: 'testDb'
    }
  }
}"
    );
}

#[test]
fn database_throughput() {
    let account = CosmosAccount::new("test");
    let database = SqlDatabase::new(&account, "testDb").unwrap().with_throughput(5);
    assert!(database.to_bicep().is_err());

    let account = CosmosAccount::new("test").as_standard();
    let mut database = SqlDatabase::new(&account, "testDb").unwrap().with_throughput(5);
    assert_eq!(
        database.to_bicep().unwrap(),
        "resource testDb 'Microsoft.DocumentDB/databaseAccounts/sqlDatabases@2023-11-15' = {
  parent: cosmosDbAccount
  name: 'testDb'
  location: location
  properties: {
    options: {
      throughput: 5
    }
    resource: {
      id: 'testDb'
    }
  }
}"
    );

    database.autoscale_max_throughput = Some(5);
    let Err(Error::Validation { source, .. }) = database.to_bicep() else {
        panic!("throughput and autoscale are exclusive");
    };
    assert_eq!(
        source,
        ValidationError::MutuallyExclusive {
            first: "throughput",
            second: "autoscale_max_throughput",
        }
    );

    database.throughput = None;
    assert_eq!(
        database.to_bicep().unwrap(),
        "resource testDb 'Microsoft.DocumentDB/databaseAccounts/sqlDatabases@2023-11-15' = {
  parent: cosmosDbAccount
  name: 'testDb'
  location: location
  properties: {
    options: {
      autoscaleSettings: {
        maxThroughput: 5
      }
    }
    resource: {
      id: 'testDb'
    }
  }
}"
    );
}

#[test]
fn container_partition_key() {
    let account = CosmosAccount::new("test");
    let database = SqlDatabase::new(&account, "testDb").unwrap();
    let mut container = SqlContainer::new(&database, "testCn").unwrap();

    assert!(matches!(
        container.to_bicep(),
        Err(Error::Validation {
            source: ValidationError::MissingField {
                field: "partition_key",
                ..
            },
            ..
        })
    ));

    container = container.with_partition_key(["/id"]);
    assert_eq!(
        container.to_bicep().unwrap(),
        "resource testCn 'Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers@2023-11-15' = {
  parent: testDb
  name: 'testCn'
  location: location
  properties: {
    resource: {
      id: 'testCn'
      partitionKey: {
        kind: 'Hash'
        paths: [
          '/id'
        ]
      }
    }
  }
}"
    );

    container = container.with_partition_key(["/id", "/type"]);
    assert_eq!(
        container.to_bicep().unwrap(),
        "resource testCn 'Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers@2023-11-15' = {
  parent: testDb
  name: 'testCn'
  location: location
  properties: {
    resource: {
      id: 'testCn'
      partitionKey: {
        kind: 'MultiHash'
        version: 2
        paths: [
          '/id'
          '/type'
        ]
      }
    }
  }
}"
    );
}

#[test]
fn container_policies() {
    let account = CosmosAccount::new("test");
    let database = SqlDatabase::new(&account, "testDb").unwrap();
    let mut container = SqlContainer::new(&database, "testCn")
        .unwrap()
        .with_partition_key(["/tenant"]);
    container.default_ttl = Some(3600);
    container.indexing_policy = Some(IndexingPolicy {
        excluded_paths: vec!["/\"_etag\"/?".to_string()],
        ..IndexingPolicy::default()
    });
    container.unique_keys.push(UniqueKey::new(["/email"]));

    insta::assert_snapshot!(container.to_bicep().unwrap(), @r###"
    resource testCn 'Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers@2023-11-15' = {
      parent: testDb
      name: 'testCn'
      location: location
      properties: {
        resource: {
          id: 'testCn'
          defaultTtl: 3600
          indexingPolicy: {
            indexingMode: 'consistent'
            automatic: true
            excludedPaths: [
              {
                path: '/"_etag"/?'
              }
            ]
            includedPaths: []
          }
          partitionKey: {
            kind: 'Hash'
            paths: [
              '/tenant'
            ]
          }
          uniqueKeyPolicy: {
            uniqueKeys: [
              {
                paths: [
                  '/email'
                ]
              }
            ]
          }
        }
      }
    }
    "###);
}

fn contributor(scope: SqlScope) -> SqlRoleAssignment {
    SqlRoleAssignment::new("testIdAccess")
        .unwrap()
        .with_scope(scope)
        .with_default_principal_id()
        .with_contributor_role()
}

fn role_assignment(scope: &str) -> String {
    format!(
        "resource testIdAccess 'Microsoft.DocumentDB/databaseAccounts/sqlRoleAssignments@2023-11-15' = {{
  parent: cosmosDbAccount
  name: guid(cosmosDbAccount.id,'testIdAccess')
  properties: {{
    roleDefinitionId: resourceId('Microsoft.DocumentDB/databaseAccounts/sqlRoleDefinitions',cosmosDbAccount.name,'00000000-0000-0000-0000-000000000002')
    scope: {scope}
    principalId: principalId
  }}
}}"
    )
}

#[test]
fn account_scope_role_assignment() {
    let account = CosmosAccount::new("test");
    assert_eq!(
        contributor(SqlScope::account(&account)).to_bicep().unwrap(),
        role_assignment("cosmosDbAccount.id")
    );
}

#[test]
fn database_scope_role_assignment() {
    let account = CosmosAccount::new("test");
    let database = SqlDatabase::new(&account, "testDb").unwrap();
    assert_eq!(
        contributor(SqlScope::database(&database)).to_bicep().unwrap(),
        role_assignment("'${cosmosDbAccount.id}/dbs/${testDb.name}'")
    );
}

#[test]
fn collection_scope_role_assignment() {
    let account = CosmosAccount::new("test");
    let database = SqlDatabase::new(&account, "testDb").unwrap();
    let collection = SqlContainer::new(&database, "testColl").unwrap();
    assert_eq!(
        contributor(SqlScope::container(&collection)).to_bicep().unwrap(),
        role_assignment("'${cosmosDbAccount.id}/dbs/${testDb.name}/colls/${testColl.name}'")
    );
}

#[test]
fn reader_role() {
    let account = CosmosAccount::new("test");
    let assignment = contributor(SqlScope::account(&account)).with_built_in_role(BuiltInRole::Reader);
    assert!(assignment
        .to_bicep()
        .unwrap()
        .contains("cosmosDbAccount.name,'00000000-0000-0000-0000-000000000001')"));
}

#[test]
fn renamed_account_moves_children() {
    let mut account = CosmosAccount::new("test");
    let database = account.add_database(account.database("testDb").unwrap());
    database.add_container(database.container("testCn").unwrap().with_partition_key(["/id"]));

    let account = account.with_symbol("acct").unwrap();
    let children: Vec<_> = account.children().into_iter().map(|child| child.name().to_string()).collect();
    assert_eq!(children, ["testDb"]);

    let container = &account.databases()[0].containers()[0];
    assert_eq!(container.account().as_str(), "acct");
    assert!(container.to_bicep().unwrap().contains("  parent: testDb\n"));
    assert_eq!(
        SqlScope::container(container).resolve().unwrap().to_string(),
        "'${acct.id}/dbs/${testDb.name}/colls/${testCn.name}'"
    );
}

use super::{SqlDatabase, API_VERSION, CAPABILITY_SERVERLESS};
use crate::catalog::unique_name;
use crate::document::{Output, ParameterType};
use crate::error::{NameError, Result, ValidationError};
use crate::property::{PropertyArray, PropertyBag};
use crate::resource::{self, keys, Body, Resource, ResourceHeader, ResourceName};
use crate::value::Value;

pub const ACCOUNT_TYPE: &str = "Microsoft.DocumentDB/databaseAccounts";

/// Symbol an account is declared with unless renamed
pub const DEFAULT_ACCOUNT_SYMBOL: &str = "cosmosDbAccount";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsistencyLevel {
    Eventual,
    ConsistentPrefix,
    #[default]
    Session,
    BoundedStaleness,
    Strong,
}

emitted_as!(ConsistencyLevel {
    Eventual => "Eventual",
    ConsistentPrefix => "ConsistentPrefix",
    Session => "Session",
    BoundedStaleness => "BoundedStaleness",
    Strong => "Strong",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetworkAclBypass {
    #[default]
    None,
    AzureServices,
}

emitted_as!(NetworkAclBypass {
    None => "None",
    AzureServices => "AzureServices",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublicNetworkAccess {
    Disabled,
    Enabled,
    #[default]
    SecuredByPerimeter,
}

// the service spells it "Perimiter"
emitted_as!(PublicNetworkAccess {
    Disabled => "Disabled",
    Enabled => "Enabled",
    SecuredByPerimeter => "SecuredByPerimiter",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MinimumTlsVersion {
    Tls,
    Tls11,
    #[default]
    Tls12,
}

emitted_as!(MinimumTlsVersion {
    Tls => "Tls",
    Tls11 => "Tls11",
    Tls12 => "Tls12",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContinuousTier {
    #[default]
    Continuous7Days,
    Continuous30Days,
}

emitted_as!(ContinuousTier {
    Continuous7Days => "Continuous7Days",
    Continuous30Days => "Continuous30Days",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageRedundancy {
    #[default]
    Geo,
    Local,
    Zone,
}

emitted_as!(StorageRedundancy {
    Geo => "Geo",
    Local => "Local",
    Zone => "Zone",
});

#[derive(Debug, Clone, PartialEq)]
pub enum BackupPolicy {
    Continuous {
        tier: ContinuousTier,
    },
    Periodic {
        interval_in_minutes: Option<i32>,
        retention_interval_in_minutes: Option<i32>,
        storage_redundancy: StorageRedundancy,
    },
}

impl Default for BackupPolicy {
    fn default() -> Self {
        BackupPolicy::Continuous {
            tier: ContinuousTier::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountLocation {
    pub location_name: Value,
    /// 0 is the write region
    pub failover_priority: i32,
    pub is_zone_redundant: bool,
}

impl AccountLocation {
    pub fn new(location_name: impl Into<Value>, failover_priority: i32) -> Self {
        Self {
            location_name: location_name.into(),
            failover_priority,
            is_zone_redundant: false,
        }
    }
}

impl Default for AccountLocation {
    /// The deployment's `location` as write region
    fn default() -> Self {
        Self::new(resource::location(), 0)
    }
}

#[derive(derive_new::new, Debug, Clone, PartialEq)]
pub struct VirtualNetworkRule {
    /// Resource id of the subnet
    pub id: Value,
    #[new(default)]
    pub ignore_missing_vnet_service_endpoint: bool,
}

/// `Microsoft.DocumentDB/databaseAccounts`
///
/// Serverless by default, see [CosmosAccount::as_standard].
#[derive(Debug, Clone)]
pub struct CosmosAccount {
    header: ResourceHeader,
    account_name: String,
    serverless: bool,
    databases: Vec<SqlDatabase>,

    pub consistency_level: ConsistencyLevel,
    /// Required with [ConsistencyLevel::BoundedStaleness], 1 to 2147483647
    pub max_staleness_prefix: Option<i32>,
    /// Required with [ConsistencyLevel::BoundedStaleness], 5 to 86400
    pub max_interval_in_seconds: Option<i32>,
    pub backup_policy: BackupPolicy,
    /// Maximum throughput that can be provisioned on the account
    pub total_throughput_limit: Option<i32>,
    pub locations: Vec<AccountLocation>,
    pub network_acl_bypass: NetworkAclBypass,
    pub network_acl_bypass_resource_ids: Vec<Value>,
    pub public_network_access: PublicNetworkAccess,
    pub ip_rules: Vec<Value>,
    pub is_virtual_network_filter_enabled: bool,
    pub virtual_network_rules: Vec<VirtualNetworkRule>,
    pub minimum_tls_version: MinimumTlsVersion,
    pub disable_local_auth: bool,
    pub enable_analytical_storage: bool,
    pub enable_automatic_failover: bool,
    pub enable_burst_capacity: bool,
    pub enable_free_tier: bool,
    pub enable_multiple_write_locations: bool,
    pub enable_priority_based_execution: bool,
}

impl CosmosAccount {
    /// An account whose deployed name starts with `account_name` (lowercased)
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            header: ResourceHeader::from_name(
                ResourceName::trusted(DEFAULT_ACCOUNT_SYMBOL),
                format!("{ACCOUNT_TYPE}@{API_VERSION}"),
            ),
            account_name: account_name.into(),
            serverless: true,
            databases: Vec::new(),
            consistency_level: ConsistencyLevel::default(),
            max_staleness_prefix: None,
            max_interval_in_seconds: None,
            backup_policy: BackupPolicy::default(),
            total_throughput_limit: None,
            locations: vec![AccountLocation::default()],
            network_acl_bypass: NetworkAclBypass::default(),
            network_acl_bypass_resource_ids: Vec::new(),
            public_network_access: PublicNetworkAccess::default(),
            ip_rules: Vec::new(),
            is_virtual_network_filter_enabled: false,
            virtual_network_rules: Vec::new(),
            minimum_tls_version: MinimumTlsVersion::default(),
            disable_local_auth: false,
            enable_analytical_storage: false,
            enable_automatic_failover: false,
            enable_burst_capacity: false,
            enable_free_tier: false,
            enable_multiple_write_locations: false,
            enable_priority_based_execution: false,
        }
    }

    /// Declares the account under a different symbol
    pub fn with_symbol(mut self, symbol: &str) -> Result<Self, NameError> {
        self.header.set_name(symbol)?;
        let name = self.header.name().clone();
        for database in &mut self.databases {
            database.set_account(name.clone());
        }
        Ok(self)
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn is_serverless(&self) -> bool {
        self.serverless
    }

    /// Switches between serverless and provisioned throughput, for the account and everything below it
    pub fn set_serverless(&mut self, serverless: bool) -> &mut Self {
        self.serverless = serverless;
        for database in &mut self.databases {
            database.set_serverless(serverless);
        }
        self
    }

    /// Runs the account with provisioned throughput instead of serverless
    pub fn as_standard(mut self) -> Self {
        self.set_serverless(false);
        self
    }

    /// Settings suited for development
    ///
    /// Serverless, reachable from Azure services and the public network, continuous backups for 7 days and local
    /// authentication enabled.
    pub fn with_development_defaults(mut self) -> Self {
        self.set_serverless(true);
        self.network_acl_bypass = NetworkAclBypass::AzureServices;
        self.public_network_access = PublicNetworkAccess::Enabled;
        self.backup_policy = BackupPolicy::Continuous {
            tier: ContinuousTier::Continuous7Days,
        };
        self.disable_local_auth = false;
        self
    }

    /// Creates a database for this account without adding it
    pub fn database(&self, name: &str) -> Result<SqlDatabase, NameError> {
        SqlDatabase::new(self, name)
    }

    /// Adds a database, declared right after the account
    pub fn add_database(&mut self, mut database: SqlDatabase) -> &mut SqlDatabase {
        database.set_account(self.header.name().clone());
        database.set_serverless(self.serverless);
        self.databases.push(database);
        let index = self.databases.len() - 1;
        &mut self.databases[index]
    }

    pub fn databases(&self) -> &[SqlDatabase] {
        &self.databases
    }

    pub fn databases_mut(&mut self) -> &mut [SqlDatabase] {
        &mut self.databases
    }

    /// `accountEndpoint`, the account's document endpoint
    pub fn endpoint_output(&self) -> Output {
        Output::named(
            ResourceName::trusted("accountEndpoint"),
            ParameterType::String,
            self.reference().member("properties").member("documentEndpoint"),
        )
    }

    fn backup_policy_bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new("backupPolicy");
        match &self.backup_policy {
            BackupPolicy::Continuous { tier } => {
                bag.add("type", "Continuous").add_property(
                    PropertyBag::new("continuousModeProperties").with("tier", tier.to_string()),
                );
            }
            BackupPolicy::Periodic {
                interval_in_minutes,
                retention_interval_in_minutes,
                storage_redundancy,
            } => {
                let mut periodic = PropertyBag::new("periodicModeProperties");
                if let Some(interval) = interval_in_minutes {
                    periodic.add("periodicIntervalInMinutes", *interval);
                }
                if let Some(retention) = retention_interval_in_minutes {
                    periodic.add("periodicRetentionIntervalInMinutes", *retention);
                }
                periodic.add("backupStorageRedundancy", storage_redundancy.to_string());
                bag.add("type", "Periodic").add_property(periodic);
            }
        }
        bag
    }

    fn consistency_policy_bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new("consistencyPolicy");
        bag.add("defaultConsistencyLevel", self.consistency_level.to_string());
        if self.consistency_level == ConsistencyLevel::BoundedStaleness {
            if let Some(interval) = self.max_interval_in_seconds {
                bag.add("maxIntervalInSeconds", interval);
            }
            if let Some(prefix) = self.max_staleness_prefix {
                bag.add("maxStalenessPrefix", prefix);
            }
        }
        bag
    }

    fn validate_serverless(&self) -> Result<(), ValidationError> {
        let exclusive = [
            (self.enable_free_tier, "enable_free_tier"),
            (self.enable_burst_capacity, "enable_burst_capacity"),
            (
                self.enable_multiple_write_locations,
                "enable_multiple_write_locations",
            ),
            (
                self.enable_priority_based_execution,
                "enable_priority_based_execution",
            ),
        ];
        if let Some((_, field)) = exclusive.into_iter().find(|(enabled, _)| *enabled) {
            return Err(ValidationError::MutuallyExclusive {
                first: "serverless",
                second: field,
            });
        }

        if self.locations.len() > 1 {
            return Err(ValidationError::unsupported(
                "serverless accounts support a single location, which can be zone redundant",
            ));
        }

        Ok(())
    }
}

fn check_range(field: &'static str, value: i32, min: i64, max: i64) -> Result<(), ValidationError> {
    let value = i64::from(value);
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl Resource for CosmosAccount {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.consistency_level == ConsistencyLevel::BoundedStaleness {
            let reason = "when the consistency level is BoundedStaleness";
            let prefix = self
                .max_staleness_prefix
                .ok_or_else(|| ValidationError::missing("max_staleness_prefix", reason))?;
            let interval = self
                .max_interval_in_seconds
                .ok_or_else(|| ValidationError::missing("max_interval_in_seconds", reason))?;
            check_range("max_staleness_prefix", prefix, 1, i64::from(i32::MAX))?;
            check_range("max_interval_in_seconds", interval, 5, 86400)?;
        }

        if self.locations.is_empty() {
            return Err(ValidationError::missing("locations", "for every account"));
        }

        if self.enable_automatic_failover && self.locations.len() == 1 {
            return Err(ValidationError::unsupported(
                "automatic failover needs more than one location",
            ));
        }

        if self.serverless {
            self.validate_serverless()?;
        }

        if !self.virtual_network_rules.is_empty() && !self.is_virtual_network_filter_enabled {
            return Err(ValidationError::missing(
                "is_virtual_network_filter_enabled",
                "for virtual network rules to be honoured",
            ));
        }

        match self.network_acl_bypass {
            NetworkAclBypass::None if !self.network_acl_bypass_resource_ids.is_empty() => {
                return Err(ValidationError::unsupported(
                    "network_acl_bypass_resource_ids can only be set when network_acl_bypass is AzureServices",
                ));
            }
            NetworkAclBypass::AzureServices if self.network_acl_bypass_resource_ids.is_empty() => {
                tracing::warn!(
                    account = %self.account_name,
                    "network ACL bypass is AzureServices without bypass resource ids, all Azure services can access the account"
                );
            }
            _ => {}
        }

        if let BackupPolicy::Periodic {
            interval_in_minutes,
            retention_interval_in_minutes,
            ..
        } = &self.backup_policy
        {
            let reason = "for periodic backups";
            let interval = interval_in_minutes
                .ok_or_else(|| ValidationError::missing("interval_in_minutes", reason))?;
            let retention = retention_interval_in_minutes
                .ok_or_else(|| ValidationError::missing("retention_interval_in_minutes", reason))?;
            check_range("interval_in_minutes", interval, 0, i64::from(i32::MAX))?;
            check_range(
                "retention_interval_in_minutes",
                retention,
                0,
                i64::from(i32::MAX),
            )?;
        }

        if !self.disable_local_auth {
            tracing::warn!(
                account = %self.account_name,
                "local authentication is enabled, disable it outside of development"
            );
        }

        Ok(())
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        body.add(keys::NAME, unique_name(&self.account_name.to_lowercase())?)
            .add(keys::LOCATION, resource::location());

        let mut properties = PropertyBag::new(keys::PROPERTIES);
        properties.add_property(self.backup_policy_bag());
        if self.serverless {
            properties.add_property(
                PropertyArray::new("capabilities").with_value(CAPABILITY_SERVERLESS),
            );
        }
        properties.add_property(self.consistency_policy_bag());

        if let Some(limit) = self.total_throughput_limit {
            properties.add_property(PropertyBag::new("capacity").with("totalThroughputLimit", limit));
        }

        let flags = [
            ("disableLocalAuth", self.disable_local_auth),
            ("enableAutomaticFailover", self.enable_automatic_failover),
            ("enableAnalyticalStorage", self.enable_analytical_storage),
            ("enableBurstCapacity", self.enable_burst_capacity),
            ("enableFreeTier", self.enable_free_tier),
            (
                "enableMultipleWriteLocations",
                self.enable_multiple_write_locations,
            ),
            (
                "enablePriorityBasedExecution",
                self.enable_priority_based_execution,
            ),
        ];
        for (name, enabled) in flags {
            if enabled {
                properties.add(name, true);
            }
        }

        if !self.ip_rules.is_empty() {
            properties.add_property(PropertyArray::new("ipRules").with_values(
                self.ip_rules.iter().map(|rule| {
                    PropertyBag::anonymous().with("ipAddressOrRange", rule.clone())
                }),
            ));
        }

        if self.is_virtual_network_filter_enabled {
            properties.add("isVirtualNetworkFilterEnabled", true);
        }

        properties.add_property(PropertyArray::new("locations").with_values(
            self.locations.iter().map(|location| {
                PropertyBag::anonymous()
                    .with("failoverPriority", location.failover_priority)
                    .with("locationName", location.location_name.clone())
                    .with("isZoneRedundant", location.is_zone_redundant)
            }),
        ));

        properties.add("minimumTlsVersion", self.minimum_tls_version.to_string());

        if self.network_acl_bypass != NetworkAclBypass::None {
            properties.add("networkAclBypass", self.network_acl_bypass.to_string());
            if !self.network_acl_bypass_resource_ids.is_empty() {
                properties.add_property(
                    PropertyArray::new("networkAclBypassResourceIds")
                        .with_values(self.network_acl_bypass_resource_ids.iter().cloned()),
                );
            }
        }

        properties.add("publicNetworkAccess", self.public_network_access.to_string());

        if self.is_virtual_network_filter_enabled && !self.virtual_network_rules.is_empty() {
            properties.add_property(PropertyArray::new("virtualNetworkRules").with_values(
                self.virtual_network_rules.iter().map(|rule| {
                    let mut bag = PropertyBag::anonymous().with("id", rule.id.clone());
                    if rule.ignore_missing_vnet_service_endpoint {
                        bag.add("ignoreMissingVNetServiceEndpoint", true);
                    }
                    bag
                }),
            ));
        }

        body.push(properties);
        Ok(())
    }

    fn children(&self) -> Vec<&dyn Resource> {
        self.databases
            .iter()
            .map(|database| database as &dyn Resource)
            .collect()
    }
}

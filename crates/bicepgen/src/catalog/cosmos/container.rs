use super::{throughput_options, validate_throughput, SqlDatabase, API_VERSION};
use crate::error::{Error, NameError, Result, ValidationError};
use crate::property::{PropertyArray, PropertyBag};
use crate::resource::{self, keys, Body, Resource, ResourceHeader, ResourceName};
use crate::value::Value;

pub const CONTAINER_TYPE: &str = "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers";

/// Partition key paths
///
/// A single path is hashed (`Hash`), several paths form a hierarchical key (`MultiHash`, version 2).
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionKey {
    pub paths: Vec<String>,
}

impl PartitionKey {
    pub fn new<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    fn bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new("partitionKey");
        if self.paths.len() == 1 {
            bag.add("kind", "Hash");
        } else {
            bag.add("kind", "MultiHash").add("version", 2);
        }
        bag.with_property(paths_array(&self.paths))
    }
}

/// A set of paths whose combined values must be unique within a logical partition
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueKey {
    pub paths: Vec<String>,
}

impl UniqueKey {
    pub fn new<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedProperty {
    pub name: String,
    pub query: String,
}

impl ComputedProperty {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexingMode {
    #[default]
    Consistent,
    Lazy,
    None,
}

emitted_as!(IndexingMode {
    Consistent => "consistent",
    Lazy => "lazy",
    None => "none",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

emitted_as!(SortOrder {
    Ascending => "ascending",
    Descending => "descending",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDataType {
    LineString,
    MultiPolygon,
    Number,
    Point,
    Polygon,
    String,
}

emitted_as!(IndexDataType {
    LineString => "LineString",
    MultiPolygon => "MultiPolygon",
    Number => "Number",
    Point => "Point",
    Polygon => "Polygon",
    String => "String",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Hash,
    Range,
    Spatial,
}

emitted_as!(IndexKind {
    Hash => "Hash",
    Range => "Range",
    Spatial => "Spatial",
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index {
    pub data_type: Option<IndexDataType>,
    pub kind: Option<IndexKind>,
    pub precision: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncludedPath {
    pub path: String,
    pub indexes: Vec<Index>,
}

impl IncludedPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            indexes: Vec::new(),
        }
    }

    fn bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::anonymous().with("path", self.path.as_str());
        if !self.indexes.is_empty() {
            bag.add_property(PropertyArray::new("indexes").with_values(self.indexes.iter().map(
                |index| {
                    let mut bag = PropertyBag::anonymous();
                    if let Some(data_type) = index.data_type {
                        bag.add("dataType", data_type.to_string());
                    }
                    if let Some(kind) = index.kind {
                        bag.add("kind", kind.to_string());
                    }
                    if let Some(precision) = index.precision {
                        bag.add("precision", precision);
                    }
                    bag
                },
            )));
        }
        bag
    }
}

/// Paths of a composite index, in index order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeIndex {
    pub paths: Vec<(String, SortOrder)>,
}

impl CompositeIndex {
    pub fn with_path(mut self, path: impl Into<String>, order: SortOrder) -> Self {
        self.paths.push((path.into(), order));
        self
    }
}

/// Without an indexing policy every path of every document is indexed
#[derive(Debug, Clone, PartialEq)]
pub struct IndexingPolicy {
    pub indexing_mode: IndexingMode,
    pub automatic: bool,
    pub composite_indexes: Vec<CompositeIndex>,
    pub included_paths: Vec<IncludedPath>,
    pub excluded_paths: Vec<String>,
}

impl Default for IndexingPolicy {
    fn default() -> Self {
        Self {
            indexing_mode: IndexingMode::default(),
            automatic: true,
            composite_indexes: Vec::new(),
            included_paths: Vec::new(),
            excluded_paths: Vec::new(),
        }
    }
}

impl IndexingPolicy {
    fn bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new("indexingPolicy");
        bag.add("indexingMode", self.indexing_mode.to_string())
            .add("automatic", self.automatic);

        if !self.composite_indexes.is_empty() {
            bag.add_property(PropertyArray::new("compositeIndexes").with_values(
                self.composite_indexes.iter().map(|index| {
                    PropertyBag::anonymous().with_property(
                        PropertyArray::new("paths").with_values(index.paths.iter().map(
                            |(path, order)| {
                                PropertyBag::anonymous()
                                    .with("path", path.as_str())
                                    .with("order", order.to_string())
                            },
                        )),
                    )
                }),
            ));
        }

        bag.add_property(PropertyArray::new("excludedPaths").with_values(
            self.excluded_paths
                .iter()
                .map(|path| PropertyBag::anonymous().with("path", path.as_str())),
        ));
        bag.add_property(
            PropertyArray::new("includedPaths")
                .with_values(self.included_paths.iter().map(IncludedPath::bag)),
        );
        bag
    }
}

fn paths_array(paths: &[String]) -> PropertyArray {
    PropertyArray::new("paths").with_values(paths.iter().map(String::as_str))
}

/// A SQL container of a [SqlDatabase]
///
/// The name is used as symbol and as container id.
#[derive(Debug, Clone)]
pub struct SqlContainer {
    header: ResourceHeader,
    account: ResourceName,
    database: ResourceName,
    serverless: bool,

    /// Required
    pub partition_key: Option<PartitionKey>,
    pub throughput: Option<i32>,
    pub autoscale_max_throughput: Option<i32>,
    pub analytical_storage_ttl: Option<i32>,
    pub default_ttl: Option<i32>,
    pub computed_properties: Vec<ComputedProperty>,
    pub indexing_policy: Option<IndexingPolicy>,
    pub unique_keys: Vec<UniqueKey>,
}

impl SqlContainer {
    pub fn new(database: &SqlDatabase, name: &str) -> Result<Self, NameError> {
        Ok(Self {
            header: ResourceHeader::new(name, format!("{CONTAINER_TYPE}@{API_VERSION}"))?,
            account: database.account().clone(),
            database: database.name().clone(),
            serverless: database.is_serverless(),
            partition_key: None,
            throughput: None,
            autoscale_max_throughput: None,
            analytical_storage_ttl: None,
            default_ttl: None,
            computed_properties: Vec::new(),
            indexing_policy: None,
            unique_keys: Vec::new(),
        })
    }

    pub fn with_partition_key<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.partition_key = Some(PartitionKey::new(paths));
        self
    }

    fn required_partition_key(&self) -> Result<&PartitionKey, ValidationError> {
        self.partition_key
            .as_ref()
            .ok_or_else(|| ValidationError::missing("partition_key", "for every container"))
    }

    /// Symbol of the account the database belongs to
    pub fn account(&self) -> &ResourceName {
        &self.account
    }

    /// Symbol of the owning database
    pub fn database(&self) -> &ResourceName {
        &self.database
    }

    pub(super) fn set_account(&mut self, account: ResourceName) {
        self.account = account;
    }

    pub(super) fn set_database(&mut self, account: ResourceName, database: ResourceName) {
        self.account = account;
        self.database = database;
    }

    pub fn is_serverless(&self) -> bool {
        self.serverless
    }

    pub(super) fn set_serverless(&mut self, serverless: bool) {
        self.serverless = serverless;
    }

    fn resource_bag(&self, partition_key: &PartitionKey) -> PropertyBag {
        let mut bag = PropertyBag::new("resource").with("id", self.name().as_str());

        if let Some(ttl) = self.analytical_storage_ttl {
            bag.add("analyticalStorageTtl", ttl);
        }

        if !self.computed_properties.is_empty() {
            bag.add_property(PropertyArray::new("computedProperties").with_values(
                self.computed_properties.iter().map(|property| {
                    PropertyBag::anonymous()
                        .with("name", property.name.as_str())
                        .with("query", property.query.as_str())
                }),
            ));
        }

        if let Some(ttl) = self.default_ttl {
            bag.add("defaultTtl", ttl);
        }

        if let Some(policy) = &self.indexing_policy {
            bag.add_property(policy.bag());
        }

        bag.add_property(partition_key.bag());

        if !self.unique_keys.is_empty() {
            bag.add_property(PropertyBag::new("uniqueKeyPolicy").with_property(
                PropertyArray::new("uniqueKeys").with_values(
                    self.unique_keys
                        .iter()
                        .map(|key| PropertyBag::anonymous().with_property(paths_array(&key.paths))),
                ),
            ));
        }

        bag
    }
}

impl Resource for SqlContainer {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.required_partition_key()?;

        validate_throughput(
            "container",
            self.serverless,
            self.throughput,
            self.autoscale_max_throughput,
        )
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        let partition_key = self
            .required_partition_key()
            .map_err(|source| Error::invalid(self.name(), source))?;

        body.add(keys::PARENT, self.database.reference())
            .add(keys::NAME, Value::string(self.name().as_str()))
            .add(keys::LOCATION, resource::location());

        let mut properties = PropertyBag::new(keys::PROPERTIES);
        if let Some(options) = throughput_options(self.throughput, self.autoscale_max_throughput) {
            properties.add_property(options);
        }
        properties.add_property(self.resource_bag(partition_key));

        body.push(properties);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::cosmos::CosmosAccount;
    use pretty_assertions::assert_eq;

    #[test]
    fn construct_without_partition_key() {
        let account = CosmosAccount::new("test");
        let database = account.database("testDb").unwrap();
        let container = database.container("testCn").unwrap();

        let mut body = Body::default();
        assert_eq!(
            container.construct(&mut body),
            Err(Error::invalid(
                container.name(),
                ValidationError::missing("partition_key", "for every container")
            ))
        );
        assert!(body.is_empty());

        let container = container.with_partition_key(["/id"]);
        container.construct(&mut body).unwrap();
        assert_eq!(body.len(), 4);
    }
}

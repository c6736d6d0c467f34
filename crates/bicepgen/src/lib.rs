//! # bicepgen - deterministic bicep synthesis
//!
//! ## Introduction for developers
//!
//! Read this to understand how `bicepgen` turns typed resource descriptors into bicep text.
//!
//! ### Bicep Terms
//!
//! A bicep file is a flat list of declarations:
//! ```bicep
//! targetScope = 'resourceGroup'
//!
//! @description('The location of the resource group.')
//! param location string = resourceGroup().location
//!
//! resource acct 'Microsoft.DocumentDB/databaseAccounts@2023-11-15' = {
//!   name: 'test${uniqueString(resourceGroup().id)}'
//!   location: location
//! }
//!
//! output accountEndpoint string = acct.properties.documentEndpoint
//! ```
//!
//! - a `resource` has a symbolic name (`acct`), a type string and a body
//! - a body is an object of `key: value` lines, values are literals, expressions, nested objects or arrays
//! - other declarations refer to a resource through its symbolic name
//!
//! ### Values
//!
//! see [value::Value]
//!
//! Everything that can sit on the right hand side of a `key:` is a [value::Value]: string/integer/boolean literals,
//! variables, function calls, property access chains and interpolated strings. Rendering a value is pure and never
//! fails; building an interpolated string can fail (see [value::InterpolatedString::build]).
//!
//! ### Property Tree and rendering
//!
//! Bodies are trees of [property::Property] ([property::PropertyBag] for objects, [property::PropertyArray] for
//! arrays). Nodes do not know how deep they are nested. The [render::Emitter] tracks the depth while the tree is walked
//! and indents by two spaces per level.
//!
//! ### Resources
//!
//! see [resource::Resource]
//!
//! Every resource type implements [resource::Resource]. Rendering one runs through fixed stages:
//!
//! | stage | what happens |
//! |---|---|
//! | validating | [resource::Resource::validate] checks the descriptor's own fields |
//! | constructing | [resource::Resource::construct] fills a fresh [resource::Body] |
//! | rendered | the header line and the body are written |
//!
//! Validation failures abort before anything is constructed and carry the resource name and the stage.
//! Because the body is rebuilt on every render, rendering takes `&self` and can be repeated.
//!
//! Resources nested under others (a container in a database in an account) reference their parent's symbol. Their
//! role assignment scopes are resolved from that ancestry ([scope::ScopePath]).
//!
//! ### Identifiers
//!
//! Generated symbolic names (`uai_A94A8FE5`, `er_...`) come from [identifier::allocate]: the first 8 hex digits of the
//! SHA-1 of a seed. A [identifier::IdentifierAllocator] remembers the seeds it has seen during one run and rejects a
//! second seed that maps to the same identifier.
//!
//! ### Documents
//!
//! [document::Document] collects parameters, resources (children are declared right after their parent) and outputs
//! and renders them in that order. Symbolic names must be unique within a document.
//!
//! Documents can also be described declaratively in YAML, see [manifest::Manifest].
//!
//! ### Catalog
//!
//! [catalog] holds typed descriptors for concrete Azure resource types, built only on the public API above.
//!
pub mod catalog;
pub mod document;
pub mod error;
pub mod identifier;
pub mod manifest;
pub mod property;
pub mod render;
pub mod resource;
pub mod scope;
pub mod value;

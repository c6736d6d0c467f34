//! resource declarations
//!
//! A [Resource] renders as
//!
//! ```bicep
//! resource <name> '<provider>/<kind>@<api-version>' [existing] = {
//!   <body>
//! }
//! ```
//!
//! Rendering ([ResourceExt::to_bicep]) always runs the same steps:
//! 1. a fresh, empty [Body] is created
//! 2. [Resource::validate] checks the resource's own fields
//! 3. [Resource::construct] fills the body from the current field values
//! 4. header and body are written
//!
//! A failure in any step aborts the render. Because the body is rebuilt each time, a resource can be changed and
//! rendered again.
use crate::error::{Error, NameError, Result, ValidationError};
use crate::identifier::{self, IdentifierAllocator};
use crate::property::Property;
use crate::render::{Emit, Emitter, OBJECT};
use crate::value::{self, Value};
use std::fmt::{Display, Formatter};

/// Property names shared by most resource types
pub mod keys {
    pub const NAME: &str = "name";
    pub const PARENT: &str = "parent";
    pub const SCOPE: &str = "scope";
    pub const LOCATION: &str = "location";
    pub const PROPERTIES: &str = "properties";

    /// Properties an existing resource may carry
    pub const IDENTIFYING: [&str; 3] = [NAME, PARENT, SCOPE];
}

/// Prefix of symbolic names generated by [ExistingResource]
pub const EXISTING_PREFIX: &str = "er_";

/// A validated symbolic name (`[A-Za-z0-9_]+`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NameError::Empty);
        }

        if let Some(character) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(NameError::InvalidCharacter { name, character });
        }

        Ok(Self(name))
    }

    /// A name known to be valid: constants and generated identifiers
    pub(crate) fn trusted(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(Self::new(name.as_str()).is_ok(), "invalid name `{name}`");
        Self(name)
    }

    /// `prefix` followed by the identifier allocated for `seed`
    pub fn allocated(prefix: &str, seed: &str) -> Result<Self, NameError> {
        Self::new(format!("{prefix}{}", identifier::allocate(seed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A reference to the declared symbol
    pub fn reference(&self) -> Value {
        Value::variable(self.0.as_str())
    }
}

impl Display for ResourceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ResourceName {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identity of a resource declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceHeader {
    name: ResourceName,
    resource_type: String,
    existing: bool,
}

impl ResourceHeader {
    pub fn new(name: &str, resource_type: impl Into<String>) -> Result<Self, NameError> {
        Ok(Self::from_name(ResourceName::new(name)?, resource_type))
    }

    pub fn from_name(name: ResourceName, resource_type: impl Into<String>) -> Self {
        Self {
            name,
            resource_type: resource_type.into(),
            existing: false,
        }
    }

    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    /// Renames the declaration, rejecting invalid names immediately
    pub fn set_name(&mut self, name: &str) -> Result<(), NameError> {
        self.name = ResourceName::new(name)?;
        Ok(())
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn is_existing(&self) -> bool {
        self.existing
    }

    pub fn set_existing(&mut self, existing: bool) {
        self.existing = existing;
    }
}

/// Render lifecycle of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Constructing,
    Rendered,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Validating => f.write_str("validating"),
            Stage::Constructing => f.write_str("constructing"),
            Stage::Rendered => f.write_str("rendered"),
        }
    }
}

/// The properties of a resource, rebuilt on every render
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Body {
    properties: Vec<Property>,
}

impl Body {
    pub fn push(&mut self, property: impl Into<Property>) -> &mut Self {
        self.properties.push(property.into());
        self
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(Property::new(name, value))
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A declarable resource
pub trait Resource: std::fmt::Debug {
    fn header(&self) -> &ResourceHeader;

    /// Checks the resource's own fields, before anything is constructed
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Appends the resource's properties to `body`
    ///
    /// Runs only after [Resource::validate] succeeded. Resources declared as existing must only emit what identifies
    /// them (see [keys::IDENTIFYING]).
    fn construct(&self, body: &mut Body) -> Result<()>;

    /// Resources declared right after this one
    fn children(&self) -> Vec<&dyn Resource> {
        Vec::new()
    }

    fn name(&self) -> &ResourceName {
        self.header().name()
    }

    /// A reference to this resource's symbol
    fn reference(&self) -> Value {
        self.name().reference()
    }

    /// A declaration of the same resource type that refers to a resource created elsewhere
    ///
    /// Used across separately rendered documents. `reference` is usually a parameter bound by the host; it seeds the
    /// generated symbolic name and becomes the `name` property.
    fn as_existing(&self, reference: Value) -> ExistingResource {
        ExistingResource::new(self.header().resource_type(), reference)
    }
}

pub trait ResourceExt {
    /// Validates, constructs and renders the declaration
    fn to_bicep(&self) -> Result<String>;
}

impl<R: Resource + ?Sized> ResourceExt for R {
    fn to_bicep(&self) -> Result<String> {
        let mut emitter = Emitter::new();
        emit_resource(self, &mut emitter)?;
        Ok(emitter.finish())
    }
}

#[tracing::instrument(level = "trace", skip_all, fields(resource = %resource.name()))]
pub(crate) fn emit_resource<R: Resource + ?Sized>(
    resource: &R,
    emitter: &mut Emitter,
) -> Result<()> {
    let header = resource.header();

    tracing::trace!(stage = %Stage::Validating);
    resource
        .validate()
        .map_err(|source| Error::invalid(header.name(), source))?;

    tracing::trace!(stage = %Stage::Constructing);
    let mut body = Body::default();
    resource.construct(&mut body)?;

    emitter.write("resource ");
    emitter.write(header.name().as_str());
    emitter.write(" ");
    emitter.write(&value::string_literal(header.resource_type()));
    if header.is_existing() {
        emitter.write(" existing");
    }
    emitter.write(" = ");

    if body.is_empty() {
        emitter.write("{");
        emitter.newline();
        emitter.write("}");
    } else {
        emitter.block(OBJECT, body.properties(), |property, emitter| {
            property.emit(emitter)
        });
    }

    tracing::trace!(stage = %Stage::Rendered, properties = body.len());
    Ok(())
}

/// A resource assembled from plain properties
///
/// Has no rules of its own. When declared as existing only the identifying properties are rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    header: ResourceHeader,
    properties: Vec<Property>,
}

impl Declaration {
    pub fn new(name: &str, resource_type: impl Into<String>) -> Result<Self, NameError> {
        Ok(Self {
            header: ResourceHeader::new(name, resource_type)?,
            properties: Vec::new(),
        })
    }

    pub fn existing(mut self) -> Self {
        self.header.set_existing(true);
        self
    }

    pub fn header_mut(&mut self) -> &mut ResourceHeader {
        &mut self.header
    }

    pub fn add_property(&mut self, property: impl Into<Property>) -> &mut Self {
        self.properties.push(property.into());
        self
    }

    pub fn with_property(mut self, property: impl Into<Property>) -> Self {
        self.add_property(property);
        self
    }

    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_property(Property::new(name, value))
    }
}

impl Resource for Declaration {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        let existing = self.header.is_existing();
        for property in &self.properties {
            if existing && !keys::IDENTIFYING.contains(&property.name()) {
                continue;
            }
            body.push(property.clone());
        }
        Ok(())
    }
}

/// A reference to a resource that was declared in another document
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingResource {
    header: ResourceHeader,
    reference: Value,
}

impl ExistingResource {
    /// `er_<identifier>` named reference, seeded by `reference`
    pub fn new(resource_type: impl Into<String>, reference: Value) -> Self {
        let seed = reference.seed();
        Self::with_seed(resource_type, &seed, reference)
    }

    /// `er_<identifier>` named reference, seeded by `seed` instead of the reference
    pub fn with_seed(resource_type: impl Into<String>, seed: &str, reference: Value) -> Self {
        let name = format!("{EXISTING_PREFIX}{}", identifier::allocate(seed));
        Self::named(ResourceName::trusted(name), resource_type, reference)
    }

    /// Like [ExistingResource::new], registering the identifier with `allocator`
    pub fn allocate(
        allocator: &mut IdentifierAllocator,
        resource_type: impl Into<String>,
        reference: Value,
    ) -> Result<Self> {
        let name = allocator.allocate_prefixed(EXISTING_PREFIX, &reference.seed())?;
        Ok(Self::named(ResourceName::trusted(name), resource_type, reference))
    }

    fn named(name: ResourceName, resource_type: impl Into<String>, reference: Value) -> Self {
        let mut header = ResourceHeader::from_name(name, resource_type);
        header.set_existing(true);
        Self { header, reference }
    }

    pub fn reference_value(&self) -> &Value {
        &self.reference
    }
}

impl Resource for ExistingResource {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        body.add(keys::NAME, self.reference.clone());
        Ok(())
    }
}

/// `location`, the parameter most resources are placed with
pub fn location() -> Value {
    Value::variable(keys::LOCATION)
}

/// `uniqueString(resourceGroup().id)`
pub fn unique_string() -> Value {
    Value::call(
        "uniqueString",
        [Value::call("resourceGroup", []).member("id")],
    )
}

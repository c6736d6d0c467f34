//! document assembly
//!
//! A [Document] renders its parts in a fixed order:
//!
//! ```bicep
//! targetScope = 'resourceGroup'
//!
//! @description('...')
//! param <name> <type> [= <default>]
//!
//! resource <name> '<type>' = {
//!   ...
//! }
//!
//! output <name> <type> = <path>
//! ```
//!
//! Top-level declarations are separated by one blank line, outputs are listed on consecutive lines and the text ends
//! with a single newline. Everything keeps insertion order, child resources follow directly after their parent.
use crate::error::{Error, NameError, Result};
use crate::identifier::IdentifierAllocator;
use crate::render::{Emit, Emitter};
use crate::resource::{self, ExistingResource, Resource, ResourceName};
use crate::value::{self, Value};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Deployment scope of a document
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum TargetScope {
    #[default]
    ResourceGroup,
    Subscription,
    ManagementGroup,
    Tenant,
}

impl Display for TargetScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetScope::ResourceGroup => f.write_str("resourceGroup"),
            TargetScope::Subscription => f.write_str("subscription"),
            TargetScope::ManagementGroup => f.write_str("managementGroup"),
            TargetScope::Tenant => f.write_str("tenant"),
        }
    }
}

impl FromStr for TargetScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resourceGroup" => Ok(TargetScope::ResourceGroup),
            "subscription" => Ok(TargetScope::Subscription),
            "managementGroup" => Ok(TargetScope::ManagementGroup),
            "tenant" => Ok(TargetScope::Tenant),
            other => Err(Error::UnsupportedVariant {
                kind: "target scope",
                variant: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TargetScope {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Types a parameter or output can be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum ParameterType {
    String,
    Int,
    Bool,
    Object,
    Array,
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterType::String => f.write_str("string"),
            ParameterType::Int => f.write_str("int"),
            ParameterType::Bool => f.write_str("bool"),
            ParameterType::Object => f.write_str("object"),
            ParameterType::Array => f.write_str("array"),
        }
    }
}

impl FromStr for ParameterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ParameterType::String),
            "int" => Ok(ParameterType::Int),
            "bool" => Ok(ParameterType::Bool),
            "object" => Ok(ParameterType::Object),
            "array" => Ok(ParameterType::Array),
            other => Err(Error::UnsupportedVariant {
                kind: "type",
                variant: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ParameterType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// `param <name> <type> [= <default>]`, optionally preceded by a description
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: ResourceName,
    pub parameter_type: ParameterType,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: &str, parameter_type: ParameterType) -> Result<Self, NameError> {
        Ok(Self::named(ResourceName::new(name)?, parameter_type))
    }

    pub fn named(name: ResourceName, parameter_type: ParameterType) -> Self {
        Self {
            name,
            parameter_type,
            default: None,
            description: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Emit for Parameter {
    fn emit(&self, emitter: &mut Emitter) {
        if let Some(description) = &self.description {
            emitter.write("@description(");
            emitter.write(&value::string_literal(description));
            emitter.write(")");
            emitter.newline();
        }

        emitter.write("param ");
        emitter.write(self.name.as_str());
        emitter.write(" ");
        emitter.write_display(&self.parameter_type);
        if let Some(default) = &self.default {
            emitter.write(" = ");
            emitter.write_display(default);
        }
    }
}

/// `output <name> <type> = <value>`
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub name: ResourceName,
    pub output_type: ParameterType,
    pub value: Value,
}

impl Output {
    pub fn new(name: &str, output_type: ParameterType, value: Value) -> Result<Self, NameError> {
        Ok(Self::named(ResourceName::new(name)?, output_type, value))
    }

    pub fn named(name: ResourceName, output_type: ParameterType, value: Value) -> Self {
        Self {
            name,
            output_type,
            value,
        }
    }

    /// An output whose value is a dotted property access path like `acct.properties.endpoint`
    pub fn path(name: &str, output_type: ParameterType, path: &str) -> Result<Self> {
        Ok(Self::new(name, output_type, Value::path(path)?)?)
    }
}

impl Emit for Output {
    fn emit(&self, emitter: &mut Emitter) {
        emitter.write("output ");
        emitter.write(self.name.as_str());
        emitter.write(" ");
        emitter.write_display(&self.output_type);
        emitter.write(" = ");
        emitter.write_display(&self.value);
    }
}

/// One template file
#[derive(Debug, Default)]
pub struct Document {
    target_scope: TargetScope,
    parameters: Vec<Parameter>,
    resources: Vec<Box<dyn Resource>>,
    outputs: Vec<Output>,
    allocator: IdentifierAllocator,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document with the parameters a host supplies to every template
    ///
    /// - `location`, defaulting to the resource group's location
    /// - `principalId` and `principalType` if `include_principal` is set
    pub fn with_host_parameters(include_principal: bool) -> Self {
        let mut document = Self::new();
        document.add_parameter(
            Parameter::named(ResourceName::trusted(resource::keys::LOCATION), ParameterType::String)
                .with_default(Value::call("resourceGroup", []).member("location"))
                .with_description("The location of the resource group."),
        );

        if include_principal {
            document
                .add_parameter(
                    Parameter::named(ResourceName::trusted("principalId"), ParameterType::String)
                        .with_description("Principal ID supplied by the host"),
                )
                .add_parameter(
                    Parameter::named(ResourceName::trusted("principalType"), ParameterType::String)
                        .with_description("Principal type supplied by the host"),
                );
        }

        document
    }

    pub fn target_scope(&self) -> TargetScope {
        self.target_scope
    }

    pub fn set_target_scope(&mut self, target_scope: TargetScope) -> &mut Self {
        self.target_scope = target_scope;
        self
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    pub fn add_resource(&mut self, resource: impl Resource + 'static) -> &mut Self {
        self.resources.push(Box::new(resource));
        self
    }

    pub fn add_output(&mut self, output: Output) -> &mut Self {
        self.outputs.push(output);
        self
    }

    /// Declares a reference to a resource that another document creates
    ///
    /// The generated symbol is registered with this document's allocator, so two references whose seeds share an
    /// identifier are rejected. Returns the symbol to refer to.
    pub fn add_existing(
        &mut self,
        resource_type: impl Into<String>,
        reference: Value,
    ) -> Result<Value> {
        let existing = ExistingResource::allocate(&mut self.allocator, resource_type, reference)?;
        let symbol = existing.reference();
        self.add_resource(existing);
        Ok(symbol)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn resources(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.iter().map(|resource| resource.as_ref())
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Identifier registry for everything generated into this document
    pub fn allocator_mut(&mut self) -> &mut IdentifierAllocator {
        &mut self.allocator
    }

    /// All resources in declaration order, children right after their parent
    fn declarations(&self) -> Vec<&dyn Resource> {
        fn walk<'a>(resource: &'a dyn Resource, into: &mut Vec<&'a dyn Resource>) {
            into.push(resource);
            for child in resource.children() {
                walk(child, into);
            }
        }

        let mut declarations = Vec::new();
        for resource in &self.resources {
            walk(resource.as_ref(), &mut declarations);
        }
        declarations
    }

    fn check_symbols(&self, declarations: &[&dyn Resource]) -> Result<()> {
        let mut symbols = HashSet::new();
        let names = self
            .parameters
            .iter()
            .map(|parameter| parameter.name.as_str())
            .chain(declarations.iter().map(|resource| resource.name().as_str()));
        for name in names {
            if !symbols.insert(name) {
                return Err(Error::DuplicateSymbol {
                    name: name.to_string(),
                });
            }
        }

        let mut outputs = HashSet::new();
        for output in &self.outputs {
            if !outputs.insert(output.name.as_str()) {
                return Err(Error::DuplicateSymbol {
                    name: output.name.to_string(),
                });
            }
        }

        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all, fields(parameters = self.parameters.len(), resources = self.resources.len(), outputs = self.outputs.len()))]
    pub fn render(&self) -> Result<String> {
        let declarations = self.declarations();
        self.check_symbols(&declarations)?;

        let mut blocks = Vec::with_capacity(1 + self.parameters.len() + declarations.len() + 1);
        blocks.push(format!(
            "targetScope = {}",
            value::string_literal(&self.target_scope.to_string())
        ));

        blocks.extend(self.parameters.iter().map(|parameter| parameter.render_at(0)));

        for resource in declarations {
            let mut emitter = Emitter::new();
            resource::emit_resource(resource, &mut emitter)?;
            blocks.push(emitter.finish());
        }

        if !self.outputs.is_empty() {
            let outputs: Vec<String> = self.outputs.iter().map(|output| output.render_at(0)).collect();
            blocks.push(outputs.join("\n"));
        }

        tracing::debug!(blocks = blocks.len(), "document rendered");

        let mut text = blocks.join("\n\n");
        text.push('\n');
        Ok(text)
    }
}

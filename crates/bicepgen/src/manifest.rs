//! declarative documents
//!
//! A manifest describes a [Document] in YAML (JSON works as well):
//!
//! ```yaml
//! targetScope: resourceGroup
//! parameters:
//!   - name: location
//!     type: string
//!     default: !ref resourceGroup().location
//!     description: The location of the resource group.
//! resources:
//!   - name: acct
//!     type: Provider/kind@2023-01-01
//!     properties:
//!       name: !interpolate [acct, !call { name: uniqueString, args: [!ref resourceGroup().id] }]
//!       location: !ref location
//!       sku: Standard
//! outputs:
//!   - name: endpoint
//!     type: string
//!     value: acct.properties.endpoint
//! ```
//!
//! Property values map onto the property tree:
//! - mappings become bags, sequences become arrays
//! - strings, integers and booleans become literals
//! - `!ref a.b.c` is a property access chain
//! - `!call { name, args }` is a function call
//! - `!interpolate [...]` is an interpolated string, plain strings are literal segments, everything else expressions
//!
//! Null and floating point values have no counterpart and are rejected.
use crate::document::{Document, Output, Parameter, ParameterType, TargetScope};
use crate::error::Error;
use crate::property::{Element, Property, PropertyArray, PropertyBag};
use crate::resource::Declaration;
use crate::value::{InterpolatedString, Value};
use serde_yaml::value::TaggedValue;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    YamlError(#[from] serde_yaml::Error),
    #[error("unsupported tag `{tag}` at `{path}`")]
    UnsupportedTag { path: String, tag: String },
    #[error("unsupported {kind} at `{path}`")]
    UnsupportedValue { path: String, kind: &'static str },
    #[error(transparent)]
    Engine(#[from] Error),
}

impl From<crate::error::NameError> for ManifestError {
    fn from(value: crate::error::NameError) -> Self {
        ManifestError::Engine(value.into())
    }
}

impl From<crate::error::ExpressionError> for ManifestError {
    fn from(value: crate::error::ExpressionError) -> Self {
        ManifestError::Engine(value.into())
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub target_scope: TargetScope,
    #[serde(default)]
    pub parameters: Vec<ParameterEntry>,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    #[serde(default)]
    pub outputs: Vec<OutputEntry>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub existing: bool,
    #[serde(default)]
    pub properties: serde_yaml::Mapping,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub output_type: ParameterType,
    /// dotted property access path
    pub value: String,
}

impl std::str::FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_yaml::from_str(s)?)
    }
}

impl Manifest {
    pub fn load_file(file_path: &Path) -> Result<Self, ManifestError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading manifest");

        let file_contents = std::fs::read_to_string(&file_path)?;
        file_contents.parse()
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Builds the document, converting every value into its expression
    pub fn into_document(self) -> Result<Document, ManifestError> {
        let mut document = Document::new();
        document.set_target_scope(self.target_scope);

        for entry in self.parameters {
            let mut parameter = Parameter::new(&entry.name, entry.parameter_type)?;
            if let Some(default) = &entry.default {
                let at = format!("parameters.{}.default", entry.name);
                parameter = parameter.with_default(to_value(default, &at)?);
            }
            if let Some(description) = entry.description {
                parameter = parameter.with_description(description);
            }
            document.add_parameter(parameter);
        }

        for entry in self.resources {
            let mut declaration = Declaration::new(&entry.name, entry.resource_type)?;
            for (key, value) in &entry.properties {
                let at = format!("resources.{}", entry.name);
                let name = key_name(key, &at)?;
                let at = format!("{at}.{name}");
                declaration.add_property(to_property(name, value, &at)?);
            }
            if entry.existing {
                declaration = declaration.existing();
            }
            tracing::debug!(resource = %entry.name, "resource loaded");
            document.add_resource(declaration);
        }

        for entry in self.outputs {
            let output = Output::path(&entry.name, entry.output_type, &entry.value)?;
            document.add_output(output);
        }

        Ok(document)
    }
}

fn key_name<'a>(key: &'a serde_yaml::Value, at: &str) -> Result<&'a str, ManifestError> {
    key.as_str().ok_or_else(|| ManifestError::UnsupportedValue {
        path: at.to_string(),
        kind: "non-string key",
    })
}

fn to_property(name: &str, value: &serde_yaml::Value, at: &str) -> Result<Property, ManifestError> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Mapping(mapping) => Ok(to_bag(PropertyBag::new(name), mapping, at)?.into()),
        Yaml::Sequence(sequence) => Ok(to_array(PropertyArray::new(name), sequence, at)?.into()),
        scalar => Ok(Property::new(name, to_value(scalar, at)?)),
    }
}

fn to_bag(
    mut bag: PropertyBag,
    mapping: &serde_yaml::Mapping,
    at: &str,
) -> Result<PropertyBag, ManifestError> {
    for (key, value) in mapping {
        let name = key_name(key, at)?;
        bag.add_property(to_property(name, value, &format!("{at}.{name}"))?);
    }
    Ok(bag)
}

fn to_array(
    mut array: PropertyArray,
    sequence: &[serde_yaml::Value],
    at: &str,
) -> Result<PropertyArray, ManifestError> {
    use serde_yaml::Value as Yaml;

    for (index, value) in sequence.iter().enumerate() {
        let at = format!("{at}[{index}]");
        let element: Element = match value {
            Yaml::Mapping(mapping) => to_bag(PropertyBag::anonymous(), mapping, &at)?.into(),
            Yaml::Sequence(sequence) => to_array(PropertyArray::new(""), sequence, &at)?.into(),
            scalar => to_value(scalar, &at)?.into(),
        };
        array.add_value(element);
    }
    Ok(array)
}

/// Converts a scalar or tagged expression
fn to_value(value: &serde_yaml::Value, at: &str) -> Result<Value, ManifestError> {
    use serde_yaml::Value as Yaml;

    let unsupported = |kind| ManifestError::UnsupportedValue {
        path: at.to_string(),
        kind,
    };

    match value {
        Yaml::Null => Err(unsupported("null")),
        Yaml::Bool(value) => Ok(Value::Boolean(*value)),
        Yaml::Number(number) => match number.as_i64() {
            Some(value) => Ok(Value::Integer(value)),
            None if number.is_f64() => Err(unsupported("floating point number")),
            None => Err(unsupported("integer out of range")),
        },
        Yaml::String(value) => Ok(Value::string(value.as_str())),
        Yaml::Sequence(_) => Err(unsupported("sequence in expression position")),
        Yaml::Mapping(_) => Err(unsupported("mapping in expression position")),
        Yaml::Tagged(tagged) => to_expression(tagged, at),
    }
}

fn to_expression(tagged: &TaggedValue, at: &str) -> Result<Value, ManifestError> {
    use serde_yaml::Value as Yaml;

    let unsupported = |kind| ManifestError::UnsupportedValue {
        path: at.to_string(),
        kind,
    };

    if tagged.tag == "ref" {
        let path = tagged
            .value
            .as_str()
            .ok_or_else(|| unsupported("non-string reference"))?;
        return Ok(Value::path(path)?);
    }

    if tagged.tag == "call" {
        let Yaml::Mapping(call) = &tagged.value else {
            return Err(unsupported("function call without name"));
        };
        let name = call
            .get("name")
            .and_then(Yaml::as_str)
            .ok_or_else(|| unsupported("function call without name"))?;
        let args = match call.get("args") {
            None => Vec::new(),
            Some(Yaml::Sequence(args)) => args
                .iter()
                .enumerate()
                .map(|(index, arg)| to_value(arg, &format!("{at}.args[{index}]")))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(unsupported("function arguments that are not a sequence")),
        };
        return Ok(Value::call(name, args));
    }

    if tagged.tag == "interpolate" {
        let Yaml::Sequence(segments) = &tagged.value else {
            return Err(unsupported("interpolation that is not a sequence"));
        };

        // literal segments are merged until the next expression so literals and expressions alternate
        let mut builder = InterpolatedString::new();
        let mut literal = String::new();
        for (index, segment) in segments.iter().enumerate() {
            match segment {
                Yaml::String(text) => literal.push_str(text),
                expression => {
                    let expression = to_value(expression, &format!("{at}[{index}]"))?;
                    builder = builder
                        .literal(std::mem::take(&mut literal))
                        .expression(expression);
                }
            }
        }
        return Ok(builder.literal(literal).build()?);
    }

    Err(ManifestError::UnsupportedTag {
        path: at.to_string(),
        tag: tagged.tag.to_string(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value(yaml: &str) -> Result<Value, ManifestError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        to_value(&yaml, "test")
    }

    #[test]
    fn scalars() {
        assert_eq!(value("42").unwrap(), Value::Integer(42));
        assert_eq!(value("true").unwrap(), Value::Boolean(true));
        assert_eq!(value("'text'").unwrap(), Value::string("text"));
        assert!(matches!(
            value("1.5"),
            Err(ManifestError::UnsupportedValue {
                kind: "floating point number",
                ..
            })
        ));
        assert!(matches!(
            value("18446744073709551615"),
            Err(ManifestError::UnsupportedValue {
                kind: "integer out of range",
                ..
            })
        ));
        assert!(matches!(
            value("~"),
            Err(ManifestError::UnsupportedValue { kind: "null", .. })
        ));
    }

    #[test]
    fn tags() {
        assert_eq!(
            value("!ref acct.properties.endpoint").unwrap().to_string(),
            "acct.properties.endpoint"
        );
        assert_eq!(
            value("!call { name: guid, args: [!ref acct.id, 'testIdAccess'] }")
                .unwrap()
                .to_string(),
            "guid(acct.id,'testIdAccess')"
        );
        assert_eq!(
            value("!interpolate [test, !call { name: uniqueString, args: [!ref resourceGroup().id] }]")
                .unwrap()
                .to_string(),
            "'test${uniqueString(resourceGroup().id)}'"
        );
        assert!(matches!(
            value("!env HOME"),
            Err(ManifestError::UnsupportedTag { .. })
        ));
    }

    #[test]
    fn interpolation_merges_adjacent_segments() {
        assert_eq!(
            value("!interpolate [a, b, !ref x, !ref y]").unwrap().to_string(),
            "'ab${x}${y}'"
        );
        assert_eq!(value("!interpolate [a, b]").unwrap(), Value::string("ab"));
    }

    #[test]
    fn document() {
        let manifest: Manifest = r#"
parameters:
  - name: location
    type: string
resources:
  - name: acct
    type: Provider/kind@2023-01-01
    properties:
      sku: Standard
      tags:
        azd-env-name: dev
      locations:
        - locationName: !ref location
          failoverPriority: 0
outputs:
  - name: endpoint
    type: string
    value: acct.properties.endpoint
"#
        .parse()
        .unwrap();

        let rendered = manifest.into_document().unwrap().render().unwrap();
        assert_eq!(
            rendered,
            "targetScope = 'resourceGroup'

param location string

resource acct 'Provider/kind@2023-01-01' = {
  sku: 'Standard'
  tags: {
    'azd-env-name': 'dev'
  }
  locations: [
    {
      locationName: location
      failoverPriority: 0
    }
  ]
}

output endpoint string = acct.properties.endpoint
"
        );
    }

    #[test]
    fn invalid_names_are_reported() {
        let manifest: Manifest = "resources:\n  - name: not-valid\n    type: T/t@1\n"
            .parse()
            .unwrap();
        assert!(matches!(
            manifest.into_document(),
            Err(ManifestError::Engine(Error::Name(_)))
        ));

        let manifest: Manifest = "parameters:\n  - name: not-valid\n    type: string\n"
            .parse()
            .unwrap();
        assert!(matches!(
            manifest.into_document(),
            Err(ManifestError::Engine(Error::Name(_)))
        ));

        let manifest: Manifest = "outputs:\n  - name: acct id\n    type: string\n    value: acct.id\n"
            .parse()
            .unwrap();
        assert!(matches!(
            manifest.into_document(),
            Err(ManifestError::Engine(Error::Name(_)))
        ));
    }

    #[test]
    fn unknown_types_are_rejected() {
        let error = "parameters:\n  - name: x\n    type: float\n"
            .parse::<Manifest>()
            .unwrap_err();
        assert!(error.to_string().contains("float"), "{error}");
    }
}

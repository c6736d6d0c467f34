//! property tree
//!
//! A resource body is a list of [Property] nodes:
//! - `name: value` ([Property::Value])
//! - `name: { ... }` ([PropertyBag])
//! - `name: [ ... ]` ([PropertyArray])
//!
//! Children keep insertion order. Nothing is sorted or deduplicated.
//!
//! Nodes do not know how deep they are nested. The [crate::render::Emitter] tracks depth while walking the tree, so
//! a bag can be built once and placed at any depth.
use crate::render::{Emit, Emitter, ARRAY, OBJECT};
use crate::value::{self, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Value { name: String, value: Value },
    Bag(PropertyBag),
    Array(PropertyArray),
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Property::Value {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Property::Value { name, .. } => name,
            Property::Bag(bag) => &bag.name,
            Property::Array(array) => &array.name,
        }
    }
}

impl Emit for Property {
    fn emit(&self, emitter: &mut Emitter) {
        match self {
            Property::Value { name, value } => {
                emit_key(emitter, name);
                emitter.write_display(value);
            }
            Property::Bag(bag) => bag.emit(emitter),
            Property::Array(array) => array.emit(emitter),
        }
    }
}

impl From<PropertyBag> for Property {
    fn from(value: PropertyBag) -> Self {
        Property::Bag(value)
    }
}

impl From<PropertyArray> for Property {
    fn from(value: PropertyArray) -> Self {
        Property::Array(value)
    }
}

/// An object property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBag {
    name: String,
    value_only: bool,
    properties: Vec<Property>,
}

impl PropertyBag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_only: false,
            properties: Vec::new(),
        }
    }

    /// An object without a `name:` key, for use as an array element
    pub fn anonymous() -> Self {
        Self::new("").value_only()
    }

    /// Suppresses the `name:` key
    pub fn value_only(mut self) -> Self {
        self.value_only = true;
        self
    }

    pub fn add_property(&mut self, property: impl Into<Property>) -> &mut Self {
        self.properties.push(property.into());
        self
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.add_property(Property::new(name, value))
    }

    pub fn with_property(mut self, property: impl Into<Property>) -> Self {
        self.add_property(property);
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add(name, value);
        self
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

impl Emit for PropertyBag {
    fn emit(&self, emitter: &mut Emitter) {
        if !self.value_only {
            emit_key(emitter, &self.name);
        }
        self.emit_properties(emitter);
    }
}

impl PropertyBag {
    fn emit_properties(&self, emitter: &mut Emitter) {
        emitter.block(OBJECT, &self.properties, |property, emitter| {
            property.emit(emitter)
        });
    }
}

/// An array property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyArray {
    name: String,
    elements: Vec<Element>,
}

impl PropertyArray {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    pub fn add_value(&mut self, element: impl Into<Element>) -> &mut Self {
        self.elements.push(element.into());
        self
    }

    pub fn with_value(mut self, element: impl Into<Element>) -> Self {
        self.add_value(element);
        self
    }

    pub fn with_values<E: Into<Element>>(mut self, elements: impl IntoIterator<Item = E>) -> Self {
        self.elements.extend(elements.into_iter().map(Into::into));
        self
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn emit_elements(&self, emitter: &mut Emitter) {
        emitter.block(ARRAY, &self.elements, |element, emitter| {
            element.emit(emitter)
        });
    }
}

impl Emit for PropertyArray {
    fn emit(&self, emitter: &mut Emitter) {
        emit_key(emitter, &self.name);
        self.emit_elements(emitter);
    }
}

/// An array element
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Value(Value),
    /// Always rendered without its name
    Object(PropertyBag),
    /// Always rendered without its name
    Array(PropertyArray),
}

impl Emit for Element {
    fn emit(&self, emitter: &mut Emitter) {
        match self {
            Element::Value(value) => emitter.write_display(value),
            Element::Object(bag) => bag.emit_properties(emitter),
            Element::Array(array) => array.emit_elements(emitter),
        }
    }
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Element::Value(value)
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::Value(value.into())
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::Value(value.into())
    }
}

impl From<PropertyBag> for Element {
    fn from(value: PropertyBag) -> Self {
        Element::Object(value.value_only())
    }
}

impl From<PropertyArray> for Element {
    fn from(value: PropertyArray) -> Self {
        Element::Array(value)
    }
}

/// Writes `name: `, quoting names that are not plain identifiers
fn emit_key(emitter: &mut Emitter, name: &str) {
    if value::is_identifier(name) {
        emitter.write(name);
    } else {
        emitter.write(&value::string_literal(name));
    }
    emitter.write(": ");
}

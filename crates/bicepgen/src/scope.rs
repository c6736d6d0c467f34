//! ancestry based scope resolution
//!
//! Nested resources are addressed relative to their root ancestor. For a chain `acct -> db -> coll` the scope is
//!
//! ```bicep
//! '${acct.id}/dbs/${db.name}/colls/${coll.name}'
//! ```
//!
//! while the root itself resolves to the bare `acct.id`.
use crate::error::ExpressionError;
use crate::resource::ResourceName;
use crate::value::{InterpolatedString, Value};

/// One level below the root: the literal path segment and the resource at that level
#[derive(Debug, Clone, PartialEq)]
struct ScopeLink {
    segment: String,
    name: ResourceName,
}

/// A root resource and the chain of descendants leading to the scoped resource
#[derive(Debug, Clone, PartialEq)]
pub struct ScopePath {
    root: ResourceName,
    links: Vec<ScopeLink>,
}

impl ScopePath {
    pub fn new(root: ResourceName) -> Self {
        Self {
            root,
            links: Vec::new(),
        }
    }

    /// Descends one level, addressed as `/<segment>/<name>`
    pub fn link(mut self, segment: impl Into<String>, name: ResourceName) -> Self {
        self.links.push(ScopeLink {
            segment: segment.into(),
            name,
        });
        self
    }

    pub fn root(&self) -> &ResourceName {
        &self.root
    }

    /// Number of levels below the root
    pub fn depth(&self) -> usize {
        self.links.len()
    }

    pub fn resolve(&self) -> Result<Value, ExpressionError> {
        let root = self.root.reference().member("id");
        if self.links.is_empty() {
            return Ok(root);
        }

        let mut template = InterpolatedString::new().literal("").expression(root);
        for link in &self.links {
            template = template
                .literal(format!("/{}/", link.segment))
                .expression(link.name.reference().member("name"));
        }
        template.build()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(name: &str) -> ResourceName {
        ResourceName::new(name).unwrap()
    }

    #[test]
    fn root_is_a_plain_property_access() {
        let path = ScopePath::new(name("acct"));
        assert_eq!(path.depth(), 0);
        assert_eq!(path.resolve().unwrap(), Value::variable("acct").member("id"));
        assert_eq!(path.resolve().unwrap().to_string(), "acct.id");
    }

    #[test]
    fn descendants_are_interpolated() {
        let database = ScopePath::new(name("acct")).link("dbs", name("db"));
        assert_eq!(
            database.resolve().unwrap().to_string(),
            "'${acct.id}/dbs/${db.name}'"
        );

        let container = database.link("colls", name("coll"));
        assert_eq!(container.depth(), 2);
        assert_eq!(container.root().as_str(), "acct");
        assert_eq!(
            container.resolve().unwrap().to_string(),
            "'${acct.id}/dbs/${db.name}/colls/${coll.name}'"
        );
    }
}

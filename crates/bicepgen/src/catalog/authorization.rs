//! role assignments on any resource
use crate::error::{Result, ValidationError};
use crate::identifier::IdentifierAllocator;
use crate::property::PropertyBag;
use crate::resource::{keys, Body, Resource, ResourceHeader, ResourceName};
use crate::value::Value;

pub const ROLE_ASSIGNMENT_TYPE: &str = "Microsoft.Authorization/roleAssignments@2022-04-01";
pub const ROLE_ASSIGNMENT_PREFIX: &str = "ra_";
const ROLE_DEFINITION_TYPE: &str = "Microsoft.Authorization/roleDefinitions";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrincipalType {
    User,
    Group,
    #[default]
    ServicePrincipal,
}

emitted_as!(PrincipalType {
    User => "User",
    Group => "Group",
    ServicePrincipal => "ServicePrincipal",
});

/// `Microsoft.Authorization/roleAssignments`, scoped to another resource of the same document
///
/// Declared as `ra_<identifier>`, derived from scope, role, principal and principal type. Assigning the same role to
/// the same principal twice yields the same symbol.
#[derive(Debug, Clone)]
pub struct RoleAssignment {
    header: ResourceHeader,
    scope: ResourceName,
    role_definition_id: String,
    principal_id: Value,
    principal_type: PrincipalType,
}

impl RoleAssignment {
    /// `role_definition_id` is the GUID of a subscription level role definition
    pub fn new(
        scope: &dyn Resource,
        role_definition_id: impl Into<String>,
        principal_id: impl Into<Value>,
        principal_type: PrincipalType,
    ) -> Self {
        let assignment = Self::unnamed(scope, role_definition_id, principal_id, principal_type);
        let name = format!(
            "{ROLE_ASSIGNMENT_PREFIX}{}",
            crate::identifier::allocate(&assignment.seed())
        );
        assignment.named(name)
    }

    /// Like [RoleAssignment::new], registering the symbol with `allocator`
    pub fn allocate(
        allocator: &mut IdentifierAllocator,
        scope: &dyn Resource,
        role_definition_id: impl Into<String>,
        principal_id: impl Into<Value>,
        principal_type: PrincipalType,
    ) -> Result<Self> {
        let assignment = Self::unnamed(scope, role_definition_id, principal_id, principal_type);
        let name = allocator.allocate_prefixed(ROLE_ASSIGNMENT_PREFIX, &assignment.seed())?;
        Ok(assignment.named(name))
    }

    fn unnamed(
        scope: &dyn Resource,
        role_definition_id: impl Into<String>,
        principal_id: impl Into<Value>,
        principal_type: PrincipalType,
    ) -> Self {
        Self {
            header: ResourceHeader::from_name(
                ResourceName::trusted(ROLE_ASSIGNMENT_PREFIX),
                ROLE_ASSIGNMENT_TYPE,
            ),
            scope: scope.name().clone(),
            role_definition_id: role_definition_id.into(),
            principal_id: principal_id.into(),
            principal_type,
        }
    }

    fn named(mut self, name: String) -> Self {
        self.header = ResourceHeader::from_name(ResourceName::trusted(name), ROLE_ASSIGNMENT_TYPE);
        self
    }

    fn seed(&self) -> String {
        format!(
            "{}{}{}{}",
            self.scope, self.role_definition_id, self.principal_id, self.principal_type
        )
    }

    pub fn principal_type(&self) -> PrincipalType {
        self.principal_type
    }

    /// `subscriptionResourceId('Microsoft.Authorization/roleDefinitions','<id>')`
    fn role_definition(&self) -> Value {
        Value::call(
            "subscriptionResourceId",
            [
                Value::string(ROLE_DEFINITION_TYPE),
                Value::string(self.role_definition_id.as_str()),
            ],
        )
    }
}

impl Resource for RoleAssignment {
    fn header(&self) -> &ResourceHeader {
        &self.header
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if uuid::Uuid::parse_str(&self.role_definition_id).is_err() {
            return Err(ValidationError::unsupported(format!(
                "role definition id `{}` is not a GUID",
                self.role_definition_id
            )));
        }
        Ok(())
    }

    fn construct(&self, body: &mut Body) -> Result<()> {
        body.add(keys::SCOPE, self.scope.reference()).add(
            keys::NAME,
            Value::call(
                "guid",
                [self.scope.reference().member("id"), self.role_definition()],
            ),
        );

        body.push(
            PropertyBag::new(keys::PROPERTIES)
                .with("roleDefinitionId", self.role_definition())
                .with("principalId", self.principal_id.clone())
                .with("principalType", self.principal_type.to_string()),
        );
        Ok(())
    }
}

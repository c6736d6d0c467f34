//! Cosmos DB for NoSQL
//!
//! An [CosmosAccount] owns its [SqlDatabase]s, a database owns its [SqlContainer]s. Children are declared right after
//! their parent when the account is added to a [crate::document::Document]. Whether the account is serverless is
//! copied down to every child since it decides which throughput settings the children accept.
//!
//! [SqlRoleAssignment] grants data plane access on the account, one database or one container.
use crate::error::ValidationError;
use crate::property::PropertyBag;

mod account;
mod container;
mod database;
mod role_assignment;

pub use account::*;
pub use container::*;
pub use database::*;
pub use role_assignment::*;

pub const API_VERSION: &str = "2023-11-15";

const CAPABILITY_SERVERLESS: &str = "EnableServerless";

/// Throughput rules shared by databases and containers
fn validate_throughput(
    kind: &str,
    serverless: bool,
    throughput: Option<i32>,
    autoscale_max_throughput: Option<i32>,
) -> Result<(), ValidationError> {
    if serverless {
        if throughput.is_some() || autoscale_max_throughput.is_some() {
            return Err(ValidationError::unsupported(format!(
                "throughput cannot be set on a {kind} of a serverless account"
            )));
        }
    } else if throughput.is_some() && autoscale_max_throughput.is_some() {
        return Err(ValidationError::MutuallyExclusive {
            first: "throughput",
            second: "autoscale_max_throughput",
        });
    }
    Ok(())
}

/// `options: { throughput }` or `options: { autoscaleSettings: { maxThroughput } }`
fn throughput_options(
    throughput: Option<i32>,
    autoscale_max_throughput: Option<i32>,
) -> Option<PropertyBag> {
    let options = PropertyBag::new("options");
    match (autoscale_max_throughput, throughput) {
        (Some(max), _) => Some(options.with_property(
            PropertyBag::new("autoscaleSettings").with("maxThroughput", max),
        )),
        (None, Some(throughput)) => Some(options.with("throughput", throughput)),
        (None, None) => None,
    }
}

//! Per-environment tuning table.

use agent_infra_domain::EnvironmentName;
use schemars::JsonSchema;
use serde::Serialize;

/// Settings that differ between environments.
///
/// Every field is optional; an unset field means "use the stack default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvOverrides {
    /// Number of NAT gateways in the agent VPC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_gateways: Option<u32>,
    /// Upper bound on concurrently running agent runtime instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_runtime_max_instances: Option<u32>,
    /// Protect stateful resources from stack deletion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_protection: Option<bool>,
}

impl EnvOverrides {
    /// The empty bag.
    pub const EMPTY: Self = Self {
        nat_gateways: None,
        agent_runtime_max_instances: None,
        deletion_protection: None,
    };

    /// Returns true when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nat_gateways.is_none()
            && self.agent_runtime_max_instances.is_none()
            && self.deletion_protection.is_none()
    }

    /// Set fields as `(name, value)` pairs, in declaration order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(count) = self.nat_gateways {
            entries.push(("natGateways", count.to_string()));
        }
        if let Some(max) = self.agent_runtime_max_instances {
            entries.push(("agentRuntimeMaxInstances", max.to_string()));
        }
        if let Some(enabled) = self.deletion_protection {
            entries.push(("deletionProtection", enabled.to_string()));
        }
        entries
    }
}

/// Signature of an override lookup; swapped out in tests.
pub type OverrideTable = fn(EnvironmentName) -> EnvOverrides;

/// The override bag for `name`.
///
/// The match is exhaustive, so adding an environment without an entry fails
/// to compile.
#[expect(
    clippy::match_same_arms,
    reason = "each environment keeps its own entry so tuning can diverge"
)]
#[must_use]
pub const fn overrides_for(name: EnvironmentName) -> EnvOverrides {
    match name {
        EnvironmentName::Dev => EnvOverrides::EMPTY,
        EnvironmentName::Stg => EnvOverrides::EMPTY,
        EnvironmentName::Prd => EnvOverrides::EMPTY,
    }
}

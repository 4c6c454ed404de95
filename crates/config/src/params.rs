//! Resolved deployment parameters.
//!
//! The resolver is a pure function of its inputs: the same environment name,
//! validated env, and override table always produce an identical value.

use crate::env::ValidatedEnv;
use crate::overrides::{EnvOverrides, OverrideTable};
use agent_infra_domain::EnvironmentName;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// Tag key for the project name.
pub const TAG_PROJECT: &str = "Project";
/// Tag key for the environment tag.
pub const TAG_ENVIRONMENT: &str = "Environment";
/// Tag key for the owning team.
pub const TAG_OWNER: &str = "Owner";

/// Values shared by every environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalConstants {
    /// Project name used in resource names and tags.
    pub project: &'static str,
    /// Primary deployment region.
    pub region: &'static str,
    /// Region for edge resources (CloudFront certificates, WAF).
    pub edge_region: &'static str,
    /// Owning team, applied as a tag.
    pub owner: &'static str,
}

impl GlobalConstants {
    /// Production constants.
    pub const DEFAULT: Self = Self {
        project: "genai-agent",
        region: "ap-northeast-1",
        edge_region: "us-east-1",
        owner: "platform-team",
    };
}

impl Default for GlobalConstants {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything a stack needs to deploy into one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedParameters {
    #[schemars(with = "String")]
    env_name: EnvironmentName,
    prefix: String,
    project: String,
    region: String,
    edge_region: String,
    tags: BTreeMap<String, String>,
    dotenv: ValidatedEnv,
    diff_env: EnvOverrides,
}

impl ResolvedParameters {
    /// Target environment.
    #[must_use]
    pub const fn env_name(&self) -> EnvironmentName {
        self.env_name
    }

    /// Resource name prefix (the environment tag).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Project name.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Primary region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Edge region.
    #[must_use]
    pub fn edge_region(&self) -> &str {
        &self.edge_region
    }

    /// Tags applied to every resource.
    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Validated deployment inputs.
    #[must_use]
    pub const fn dotenv(&self) -> &ValidatedEnv {
        &self.dotenv
    }

    /// Environment-specific overrides.
    #[must_use]
    pub const fn diff_env(&self) -> &EnvOverrides {
        &self.diff_env
    }

    /// Physical name for a stack component: `{prefix}-{project}-{component}`.
    ///
    /// ```
    /// # use std::collections::BTreeMap;
    /// use agent_infra_config::{ValidatedEnv, overrides_for, resolve_parameters};
    /// use agent_infra_domain::EnvironmentName;
    ///
    /// let env = ValidatedEnv::from_map(&BTreeMap::from([
    ///     ("API_KEY".to_owned(), "k".to_owned()),
    ///     ("AWS_ACCOUNT_ID".to_owned(), "123456789012".to_owned()),
    /// ]))?;
    /// let params = resolve_parameters(EnvironmentName::Stg, &env, overrides_for);
    /// assert_eq!(params.resource_name("api"), "stg-genai-agent-api");
    /// # Ok::<(), agent_infra_config::ConfigValidationError>(())
    /// ```
    #[must_use]
    pub fn resource_name(&self, component: &str) -> String {
        format!("{}-{}-{component}", self.prefix, self.project)
    }
}

/// Resolve parameters for `name` with the default constants.
#[must_use]
pub fn resolve_parameters(
    name: EnvironmentName,
    dotenv: &ValidatedEnv,
    overrides: OverrideTable,
) -> ResolvedParameters {
    resolve_parameters_with(GlobalConstants::DEFAULT, name, dotenv, overrides)
}

/// Resolve parameters for `name` with explicit constants.
#[must_use]
pub fn resolve_parameters_with(
    constants: GlobalConstants,
    name: EnvironmentName,
    dotenv: &ValidatedEnv,
    overrides: OverrideTable,
) -> ResolvedParameters {
    let tags = BTreeMap::from([
        (TAG_PROJECT.to_owned(), constants.project.to_owned()),
        (TAG_ENVIRONMENT.to_owned(), name.as_str().to_owned()),
        (TAG_OWNER.to_owned(), constants.owner.to_owned()),
    ]);

    ResolvedParameters {
        env_name: name,
        prefix: name.as_str().to_owned(),
        project: constants.project.to_owned(),
        region: constants.region.to_owned(),
        edge_region: constants.edge_region.to_owned(),
        tags,
        dotenv: dotenv.clone(),
        diff_env: overrides(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::overrides_for;
    use std::error::Error;

    fn validated() -> Result<ValidatedEnv, Box<dyn Error>> {
        Ok(ValidatedEnv::from_map(&BTreeMap::from([
            ("API_KEY".to_owned(), "sk-test".to_owned()),
            ("AWS_ACCOUNT_ID".to_owned(), "123456789012".to_owned()),
        ]))?)
    }

    #[test]
    fn prefix_and_tags_follow_environment() -> Result<(), Box<dyn Error>> {
        let env = validated()?;
        for name in EnvironmentName::ALL {
            let params = resolve_parameters(name, &env, overrides_for);
            assert_eq!(params.env_name(), name);
            assert_eq!(params.prefix(), name.as_str());
            assert_eq!(
                params.tags().get(TAG_ENVIRONMENT).map(String::as_str),
                Some(name.as_str())
            );
        }
        Ok(())
    }

    #[test]
    fn constants_flow_into_parameters() -> Result<(), Box<dyn Error>> {
        let constants = GlobalConstants {
            project: "demo",
            region: "eu-west-1",
            edge_region: "us-east-1",
            owner: "ops",
        };
        let params =
            resolve_parameters_with(constants, EnvironmentName::Dev, &validated()?, overrides_for);
        assert_eq!(params.project(), "demo");
        assert_eq!(params.region(), "eu-west-1");
        assert_eq!(params.edge_region(), "us-east-1");
        assert_eq!(params.tags().get(TAG_OWNER).map(String::as_str), Some("ops"));
        assert_eq!(params.resource_name("web"), "dev-demo-web");
        Ok(())
    }

    #[test]
    fn override_table_is_injected() -> Result<(), Box<dyn Error>> {
        fn tuned(name: EnvironmentName) -> EnvOverrides {
            EnvOverrides {
                nat_gateways: Some(if name.is_production() { 3 } else { 1 }),
                ..EnvOverrides::EMPTY
            }
        }

        let env = validated()?;
        let prd = resolve_parameters(EnvironmentName::Prd, &env, tuned);
        let dev = resolve_parameters(EnvironmentName::Dev, &env, tuned);
        assert_eq!(prd.diff_env().nat_gateways, Some(3));
        assert_eq!(dev.diff_env().nat_gateways, Some(1));
        Ok(())
    }

    #[test]
    fn wire_field_names_are_camel_case() -> Result<(), Box<dyn Error>> {
        let params = resolve_parameters(EnvironmentName::Prd, &validated()?, overrides_for);
        let value = serde_json::to_value(&params)?;
        let keys: Vec<&str> = value
            .as_object()
            .map(|object| object.keys().map(String::as_str).collect())
            .unwrap_or_default();
        for expected in [
            "envName",
            "prefix",
            "project",
            "region",
            "edgeRegion",
            "tags",
            "dotenv",
            "diffEnv",
        ] {
            assert!(keys.contains(&expected), "missing {expected}");
        }
        assert_eq!(value.get("envName").and_then(serde_json::Value::as_str), Some("prd"));
        Ok(())
    }
}

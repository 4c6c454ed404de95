//! Integration tests for environment names and primitives over serde.

use agent_infra_domain::{AccountId, CidrBlock, EnvironmentName};
use agent_infra_shared::{ErrorCode, ErrorEnvelope};
use std::error::Error;

#[test]
fn environment_names_use_lowercase_tags_on_the_wire() -> Result<(), Box<dyn Error>> {
    let encoded = serde_json::to_string(&EnvironmentName::ALL)?;
    assert_eq!(encoded, r#"["dev","stg","prd"]"#);

    let decoded: Vec<EnvironmentName> = serde_json::from_str(&encoded)?;
    assert_eq!(decoded, EnvironmentName::ALL.to_vec());
    assert!(serde_json::from_str::<EnvironmentName>("\"staging\"").is_err());
    Ok(())
}

#[test]
fn invalid_cidr_in_payload_is_rejected() {
    let result = serde_json::from_str::<Vec<CidrBlock>>(r#"["10.0.0.0/8","10.0.0.0/99"]"#);
    assert!(result.is_err());
}

#[test]
fn primitive_errors_convert_into_envelopes() {
    let envelope = AccountId::parse("not-an-account")
        .err()
        .map(ErrorEnvelope::from);
    assert_eq!(
        envelope.map(|envelope| envelope.code),
        Some(ErrorCode::new("domain", "invalid_account_id"))
    );
}

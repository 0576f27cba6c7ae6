use std::{env, time::Duration};

use secrecy::SecretString;

use crate::{
    cli::{ModelArgs, WatchArgs},
    clients::anthropic::ProviderConfig,
    pipeline::PipelineOptions,
};

pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

/// Reads the credential once at startup. An absent or blank key is kept as `None`
/// and only rejected when a generation is attempted.
pub fn api_key_from_env() -> Option<SecretString> {
    parse_api_key(env::var(API_KEY_ENV_VAR).ok())
}

fn parse_api_key(value: Option<String>) -> Option<SecretString> {
    value
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

pub fn provider_config(args: &ModelArgs, api_key: Option<SecretString>) -> ProviderConfig {
    ProviderConfig {
        api_key,
        base_url: args.api_base_url.clone(),
        model: args.model.clone(),
        max_tokens: args.max_tokens.max(1),
        timeout: Duration::from_secs(args.request_timeout_secs.max(1)),
    }
}

pub fn pipeline_options(args: &WatchArgs) -> PipelineOptions {
    PipelineOptions {
        workers: args.workers.max(1),
        settle: Duration::from_millis(args.settle_ms),
    }
}

use std::fmt;

use crate::error::{AwsError, Result};

/// AWS credentials resolved from the standard chain.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AwsCredentials {
    /// Resolve credentials from the standard chain:
    /// 1. AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY / AWS_SESSION_TOKEN
    /// 2. ~/.aws/credentials (with optional profile, default "default")
    pub fn resolve(profile: Option<&str>) -> Result<Self> {
        if let (Ok(key_id), Ok(secret)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            let session_token = std::env::var("AWS_SESSION_TOKEN").ok();
            return Ok(Self {
                access_key_id: key_id,
                secret_access_key: secret,
                session_token,
            });
        }

        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let cred_path = format!("{home}/.aws/credentials");
        let content = std::fs::read_to_string(&cred_path).map_err(|_| {
            AwsError::Credentials(
                "set AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY env vars or configure ~/.aws/credentials"
                    .into(),
            )
        })?;

        let profile = profile
            .map(String::from)
            .or_else(|| std::env::var("AWS_PROFILE").ok())
            .unwrap_or_else(|| "default".to_string());
        parse_credentials_file(&content, &profile)
    }
}

fn parse_credentials_file(content: &str, profile: &str) -> Result<AwsCredentials> {
    let mut in_profile = false;
    let mut key_id = None;
    let mut secret = None;
    let mut session_token = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_profile = line[1..line.len() - 1].trim() == profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().to_string();
            match k.trim() {
                "aws_access_key_id" => key_id = Some(v),
                "aws_secret_access_key" => secret = Some(v),
                "aws_session_token" => session_token = Some(v),
                _ => {}
            }
        }
    }

    match (key_id, secret) {
        (Some(access_key_id), Some(secret_access_key)) => Ok(AwsCredentials {
            access_key_id,
            secret_access_key,
            session_token,
        }),
        _ => Err(AwsError::Credentials(format!(
            "profile '{profile}' not found or incomplete in ~/.aws/credentials"
        ))),
    }
}

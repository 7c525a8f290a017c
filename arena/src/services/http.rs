use std::time::Duration;

use bevy::log::{debug, info};
use common::CharacterStats;
use protocol::{
    BattleEvent, CharacterDefinition, FusionRequest, GenerateRequest, NarrationRequest,
    decode_battle_script, decode_character,
};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

use super::{CreatureService, ServiceError};
use crate::settings::ServiceSettings;

/// Talks to the character service over HTTP, one blocking request per call.
pub struct HttpCreatureService {
    client: Client,
    base_url: String,
}

impl HttpCreatureService {
    pub fn new(settings: &ServiceSettings) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn post(&self, route: &str, body: &impl Serialize) -> Result<String, ServiceError> {
        let url = format!("{}/{route}", self.base_url);
        debug!("POST {url}");
        let response = self.client.post(&url).json(body).send()?;
        let status = response.status();
        let text = response.text()?;
        read_reply(status, text)
    }
}

/// Accepts any 2xx reply unless its body is an `{"error": ...}` object.
fn read_reply(status: StatusCode, text: String) -> Result<String, ServiceError> {
    if !status.is_success() {
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    if let Some(message) = remote_error(&text) {
        return Err(ServiceError::Remote(message));
    }
    Ok(text)
}

impl CreatureService for HttpCreatureService {
    fn generate(&self, request: &GenerateRequest) -> Result<CharacterDefinition, ServiceError> {
        let text = self.post("generate", request)?;
        let definition = decode_character(&text)?.into_generated(|| {
            info!("No stats in the reply for '{}', rolling them", request.prompt);
            CharacterStats::random_for(&request.prompt, &mut rand::thread_rng())
        });
        info!("Generated '{}' from '{}'", definition.stats.name, request.prompt);
        Ok(definition)
    }

    fn fuse(&self, request: &FusionRequest) -> Result<CharacterDefinition, ServiceError> {
        let text = self.post("fusion", request)?;
        Ok(decode_character(&text)?.into_fusion(request))
    }

    fn narrate(&self, request: &NarrationRequest) -> Result<Vec<BattleEvent>, ServiceError> {
        let text = self.post("battle", request)?;
        Ok(decode_battle_script(&text, request.winner)?)
    }
}

/// The message of an `{"error": "..."}` body.
pub fn remote_error(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_error_bodies() {
        assert_eq!(
            remote_error(r#"{"error":"quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(remote_error(r#"{"model":{"type":"box"}}"#), None);
        assert_eq!(remote_error("```json\n{}\n```"), None);
    }

    #[test]
    fn any_success_status_is_accepted() {
        for code in [200, 201, 202] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(read_reply(status, "{}".into()).unwrap(), "{}");
        }
        assert!(matches!(
            read_reply(StatusCode::BAD_GATEWAY, "upstream".into()),
            Err(ServiceError::Status { status: 502, .. })
        ));
        assert!(matches!(
            read_reply(StatusCode::CREATED, r#"{"error":"busy"}"#.into()),
            Err(ServiceError::Remote(message)) if message == "busy"
        ));
    }
}

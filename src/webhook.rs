//! Webhook related structures

use serde::{Deserialize, Serialize};

/// The part of the Docker Hub build webhook autodock reads.
/// Every other field of the payload is ignored; `null` fields read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerHubPayload {
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub repository: Option<DockerHubRepository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerHubRepository {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo_name: Option<String>,
}

impl DockerHubPayload {
    /// Decodes the first JSON value in `body`; anything after it is ignored.
    /// A top-level `null` is an empty payload.
    pub fn decode(body: &[u8]) -> serde_json::Result<Self> {
        match serde_json::Deserializer::from_slice(body)
            .into_iter::<Option<Self>>()
            .next()
        {
            Some(payload) => Ok(payload?.unwrap_or_default()),
            None => Err(serde::de::Error::custom("empty body")),
        }
    }

    /// Repository lookup key, empty when not supplied
    pub fn repo_name(&self) -> &str {
        self.repository
            .as_ref()
            .and_then(|repo| repo.repo_name.as_deref())
            .unwrap_or_default()
    }

    /// Callback URL, treating an empty string as absent
    pub fn callback(&self) -> Option<&str> {
        self.callback_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Recovers `callback_url` from a body that failed to decode as a payload,
/// e.g. when `repository` has the wrong shape.
pub fn salvage_callback_url(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::Deserializer::from_slice(body)
        .into_iter()
        .next()?
        .ok()?;
    value
        .get("callback_url")
        .and_then(|v| v.as_str())
        .filter(|url| !url.is_empty())
        .map(String::from)
}

/// Outcome of one webhook invocation, reported in the response body and to the callback
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvocationState {
    Success,
    Failure,
    Error,
}

impl InvocationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationState::Success => "success",
            InvocationState::Failure => "failure",
            InvocationState::Error => "error",
        }
    }
}

/// `{"state": "..."}`, used for both the response and the callback body
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateBody {
    pub state: InvocationState,
}

impl From<InvocationState> for StateBody {
    fn from(state: InvocationState) -> Self {
        Self { state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_docker_hub_payload_ignoring_extra_fields() {
        let body = br#"{
            "callback_url": "https://registry.hub.docker.com/u/acme/web/hook/abc/",
            "push_data": {"pushed_at": 1417566161, "tag": "latest"},
            "repository": {
                "name": "web",
                "namespace": "acme",
                "owner": "acme",
                "repo_name": "acme/web",
                "star_count": 2
            }
        }"#;
        let payload = DockerHubPayload::decode(body).unwrap();
        assert_eq!(payload.repo_name(), "acme/web");
        assert_eq!(
            payload.repository.as_ref().unwrap().namespace.as_deref(),
            Some("acme")
        );
        assert!(payload.callback().unwrap().ends_with("/hook/abc/"));
    }

    #[test]
    fn missing_fields_default() {
        let payload = DockerHubPayload::decode(b"{}").unwrap();
        assert_eq!(payload.repo_name(), "");
        assert_eq!(payload.callback(), None);

        let payload = DockerHubPayload::decode(br#"{"callback_url": "", "repository": {}}"#).unwrap();
        assert_eq!(payload.callback(), None);
    }

    #[test]
    fn null_fields_read_as_absent() {
        let bodies: [&[u8]; 3] = [
            br#"{"repository": null}"#,
            br#"{"repository": {"repo_name": null}, "callback_url": null}"#,
            b"null",
        ];
        for body in bodies {
            let payload = DockerHubPayload::decode(body).unwrap();
            assert_eq!(payload.repo_name(), "");
            assert_eq!(payload.callback(), None);
        }
    }

    #[test]
    fn only_first_json_value_is_read() {
        let payload =
            DockerHubPayload::decode(br#"{"repository":{"repo_name":"web"}} {"x":1}"#).unwrap();
        assert_eq!(payload.repo_name(), "web");

        let payload = DockerHubPayload::decode(br#"{"repository":{"repo_name":"web"}}trailing"#).unwrap();
        assert_eq!(payload.repo_name(), "web");
    }

    #[test]
    fn empty_or_mistyped_body_is_rejected() {
        assert!(DockerHubPayload::decode(b"").is_err());
        assert!(DockerHubPayload::decode(b"   ").is_err());
        assert!(DockerHubPayload::decode(br#"{"repository": {"repo_name": 7}}"#).is_err());
        assert!(DockerHubPayload::decode(b"[1, 2]").is_err());
    }

    #[test]
    fn callback_is_salvaged_from_wrongly_shaped_body() {
        let body = br#"{"callback_url": "http://x/cb", "repository": "oops"}"#;
        assert!(DockerHubPayload::decode(body).is_err());
        assert_eq!(salvage_callback_url(body).as_deref(), Some("http://x/cb"));
        assert_eq!(salvage_callback_url(b"not json"), None);
    }

    #[test]
    fn state_body_serializes_lowercase() {
        let json = serde_json::to_string(&StateBody::from(InvocationState::Failure)).unwrap();
        assert_eq!(json, r#"{"state":"failure"}"#);
    }
}

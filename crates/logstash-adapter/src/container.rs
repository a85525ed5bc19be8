// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Inbound log messages as handed over by the log router.

use serde::{Deserialize, Serialize};

/// Container facts attached to every log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Container {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub hostname: String,
    /// Environment as `KEY=VALUE` strings, in the order the runtime reports them.
    #[serde(default)]
    pub env: Vec<String>,
}

impl Container {
    #[must_use]
    pub fn identity(&self) -> ContainerIdentity {
        ContainerIdentity {
            name: self.name.clone(),
            id: self.id.clone(),
            image: self.image.clone(),
            hostname: self.hostname.clone(),
        }
    }
}

/// The `docker` object of an outbound record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerIdentity {
    pub name: String,
    pub id: String,
    pub image: String,
    pub hostname: String,
}

/// One captured log line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogMessage {
    pub container: Container,
    /// Raw line, possibly JSON.
    pub data: String,
    /// Stream label such as `stdout` or `stderr`.
    #[serde(default)]
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_router_message() {
        let message: LogMessage = serde_json::from_str(
            r#"{"container":{"id":"c1","name":"/web","image":"nginx:1.25","hostname":"h1","env":["A=b"]},"data":"hello","source":"stdout"}"#,
        )
        .expect("failed to parse message");

        assert_eq!(message.container.id, "c1");
        assert_eq!(message.container.env, vec!["A=b".to_string()]);
        assert_eq!(message.data, "hello");
        assert_eq!(message.source, "stdout");
    }

    #[test]
    fn test_deserialize_defaults_optional_fields() {
        let message: LogMessage =
            serde_json::from_str(r#"{"container":{"id":"c1"},"data":"x"}"#).unwrap();

        assert_eq!(message.container.name, "");
        assert!(message.container.env.is_empty());
        assert_eq!(message.source, "");
    }

    #[test]
    fn test_identity_serialization_order() {
        let container = Container {
            id: "c1".to_string(),
            name: "/web".to_string(),
            image: "nginx".to_string(),
            hostname: "h1".to_string(),
            env: vec![],
        };

        assert_eq!(
            serde_json::to_string(&container.identity()).unwrap(),
            r#"{"name":"/web","id":"c1","image":"nginx","hostname":"h1"}"#
        );
    }
}

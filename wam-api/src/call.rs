//! Wire-level call types exchanged with a [`DeviceClient`](crate::DeviceClient)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API family a call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiType {
    /// Unified interface commands, the family every logical command uses
    #[serde(rename = "UIC")]
    Uic,
}

impl ApiType {
    pub fn name(&self) -> &'static str {
        match self {
            ApiType::Uic => "UIC",
        }
    }
}

/// Encoded value of a call argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Dec(i64),
}

/// A named argument, in the order the device expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: ArgValue,
}

impl Argument {
    pub fn str(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: ArgValue::Str(value.into()),
        }
    }

    pub fn dec(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            value: ArgValue::Dec(value),
        }
    }
}

/// A fully encoded protocol call, ready to hand to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCall {
    pub api_type: ApiType,
    pub method: String,
    pub args: Vec<Argument>,
    /// Response tag to wait for; empty means any acknowledgement
    pub expected_response: String,
    pub requires_power: bool,
    /// Device asks the user to confirm before acting
    #[serde(default)]
    pub user_check: bool,
    pub timeout_multiple: u32,
}

impl ApiCall {
    /// Value of the first argument called `name`
    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.iter().find(|a| a.name == name).map(|a| &a.value)
    }
}

/// Acknowledgement returned by a client for a successful call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub method: String,
    #[serde(default)]
    pub data: Value,
}

impl Ack {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// An event reported by or about a speaker, forwarded to listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEvent {
    pub speaker_ip: String,
    pub api_type: ApiType,
    pub method: String,
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_msg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arg_values_serialize_untagged() {
        let call = ApiCall {
            api_type: ApiType::Uic,
            method: "SetVolume".to_string(),
            args: vec![Argument::dec("nVolume", 15)],
            expected_response: String::new(),
            requires_power: false,
            user_check: false,
            timeout_multiple: 1,
        };

        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["api_type"], "UIC");
        assert_eq!(value["args"][0], json!({"name": "nVolume", "value": 15}));
    }

    #[test]
    fn test_arg_lookup() {
        let call = ApiCall {
            api_type: ApiType::Uic,
            method: "SetInput".to_string(),
            args: vec![Argument::str("strSource", "BT")],
            expected_response: String::new(),
            requires_power: false,
            user_check: false,
            timeout_multiple: 1,
        };

        assert_eq!(call.arg("strSource"), Some(&ArgValue::Str("BT".to_string())));
        assert_eq!(call.arg("nVolume"), None);
    }

    #[test]
    fn test_user_check_defaults_off() {
        let call: ApiCall = serde_json::from_value(json!({
            "api_type": "UIC",
            "method": "SetPowerStatus",
            "args": [{"name": "power", "value": 1}],
            "expected_response": "PowerStatus",
            "requires_power": false,
            "timeout_multiple": 1
        }))
        .unwrap();
        assert!(!call.user_check);

        let confirmed = ApiCall {
            user_check: true,
            ..call
        };
        let value = serde_json::to_value(&confirmed).unwrap();
        assert_eq!(value["user_check"], true);
    }

    #[test]
    fn test_event_omits_missing_error() {
        let event = ApiEvent {
            speaker_ip: "10.0.0.5".to_string(),
            api_type: ApiType::Uic,
            method: "Play".to_string(),
            success: true,
            data: Value::Null,
            err_msg: None,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("err_msg").is_none());
        assert_eq!(value["method"], "Play");
    }
}

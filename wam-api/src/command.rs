//! Logical command table
//!
//! Every command a caller can name maps to exactly one [`CommandSpec`]. The
//! table is configuration data: method names, argument names and defaults must
//! match what the speaker firmware expects.

use crate::call::{ApiCall, ApiType, Argument};
use crate::eq;
use crate::error::CommandError;

/// Encoding of a single argument value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Str,
    Int,
}

/// How a command's optional caller value becomes call arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentSchema {
    /// Takes no arguments; any value is ignored
    None,
    /// One argument, with a default used when the value is missing or empty
    Single {
        name: &'static str,
        kind: ArgKind,
        default: &'static str,
    },
    /// Preset name looked up in [`eq::EQ_PRESETS`], sent as `presetindex`
    EqPreset,
    /// Eight comma-separated integers sent as `presetindex` and `eqvalue1..7`
    EqValues,
}

/// One row of the command table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub logical_name: &'static str,
    pub protocol_method: &'static str,
    pub schema: ArgumentSchema,
    pub expected_response: &'static str,
    pub requires_power: bool,
}

const fn no_args(logical_name: &'static str, protocol_method: &'static str) -> CommandSpec {
    CommandSpec {
        logical_name,
        protocol_method,
        schema: ArgumentSchema::None,
        expected_response: "",
        requires_power: false,
    }
}

const fn single(
    logical_name: &'static str,
    protocol_method: &'static str,
    name: &'static str,
    kind: ArgKind,
    default: &'static str,
) -> CommandSpec {
    CommandSpec {
        logical_name,
        protocol_method,
        schema: ArgumentSchema::Single { name, kind, default },
        expected_response: "",
        requires_power: false,
    }
}

/// All logical commands, in the order they are documented
pub static COMMANDS: &[CommandSpec] = &[
    single("power", "SetPower", "strValue", ArgKind::Str, "on"),
    single("volume", "SetVolume", "nVolume", ArgKind::Int, "10"),
    single("mute", "SetMute", "strValue", ArgKind::Str, "on"),
    no_args("play", "Play"),
    no_args("pause", "Pause"),
    no_args("stop", "Stop"),
    no_args("next", "Next"),
    no_args("prev", "Prev"),
    single("set_input", "SetInput", "strSource", ArgKind::Str, "BT"),
    CommandSpec {
        logical_name: "set_eq_preset",
        protocol_method: "Set7bandEQMode",
        schema: ArgumentSchema::EqPreset,
        expected_response: "",
        requires_power: false,
    },
    CommandSpec {
        logical_name: "set_eq_values",
        protocol_method: "Set7bandEQValue",
        schema: ArgumentSchema::EqValues,
        expected_response: "",
        requires_power: false,
    },
];

/// Find the command called `name`
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.logical_name == name)
}

/// Resolve `name` and encode `value` in one step
pub fn resolve(name: &str, value: Option<&str>) -> Result<ApiCall, CommandError> {
    lookup(name)
        .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?
        .build_call(value)
}

impl CommandSpec {
    /// Encode the caller's value into a ready-to-send call.
    ///
    /// Fails without side effects when the value cannot be encoded.
    pub fn build_call(&self, value: Option<&str>) -> Result<ApiCall, CommandError> {
        let value = value.filter(|v| !v.is_empty());

        let args = match self.schema {
            ArgumentSchema::None => Vec::new(),
            ArgumentSchema::Single { name, kind, default } => {
                let raw = value.unwrap_or(default);
                match kind {
                    ArgKind::Str => vec![Argument::str(name, raw)],
                    ArgKind::Int => {
                        let n = raw.trim().parse::<i64>().map_err(|_| {
                            CommandError::invalid(self.logical_name, raw, "expected an integer")
                        })?;
                        vec![Argument::dec(name, n)]
                    }
                }
            }
            ArgumentSchema::EqPreset => {
                vec![Argument::dec("presetindex", eq::preset_index(value.unwrap_or("Normal")))]
            }
            ArgumentSchema::EqValues => {
                let raw = value.ok_or_else(|| {
                    CommandError::invalid(self.logical_name, "", "eight comma-separated integers required")
                })?;
                eq::parse_eq_values(self.logical_name, raw)?
            }
        };

        Ok(ApiCall {
            api_type: ApiType::Uic,
            method: self.protocol_method.to_string(),
            args,
            expected_response: self.expected_response.to_string(),
            requires_power: self.requires_power,
            user_check: false,
            timeout_multiple: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::ArgValue;
    use rstest::rstest;

    #[test]
    fn test_table_names_are_unique() {
        for (i, spec) in COMMANDS.iter().enumerate() {
            assert!(
                COMMANDS[i + 1..].iter().all(|other| other.logical_name != spec.logical_name),
                "duplicate command {}",
                spec.logical_name
            );
        }
        assert_eq!(COMMANDS.len(), 11);
    }

    #[rstest]
    #[case("power", None, "SetPower", "strValue", ArgValue::Str("on".into()))]
    #[case("power", Some("off"), "SetPower", "strValue", ArgValue::Str("off".into()))]
    #[case("volume", None, "SetVolume", "nVolume", ArgValue::Dec(10))]
    #[case("volume", Some("15"), "SetVolume", "nVolume", ArgValue::Dec(15))]
    #[case("volume", Some(""), "SetVolume", "nVolume", ArgValue::Dec(10))]
    #[case("mute", Some("off"), "SetMute", "strValue", ArgValue::Str("off".into()))]
    #[case("set_input", None, "SetInput", "strSource", ArgValue::Str("BT".into()))]
    #[case("set_input", Some("optical"), "SetInput", "strSource", ArgValue::Str("optical".into()))]
    #[case("set_eq_preset", Some("Jazz"), "Set7bandEQMode", "presetindex", ArgValue::Dec(2))]
    #[case("set_eq_preset", Some("Disco"), "Set7bandEQMode", "presetindex", ArgValue::Dec(0))]
    fn test_single_argument_commands(
        #[case] name: &str,
        #[case] value: Option<&str>,
        #[case] method: &str,
        #[case] arg: &str,
        #[case] expected: ArgValue,
    ) {
        let call = resolve(name, value).unwrap();
        assert_eq!(call.method, method);
        assert_eq!(call.args.len(), 1);
        assert_eq!(call.arg(arg), Some(&expected));
    }

    #[rstest]
    #[case("play", "Play")]
    #[case("pause", "Pause")]
    #[case("stop", "Stop")]
    #[case("next", "Next")]
    #[case("prev", "Prev")]
    fn test_transport_commands_take_no_arguments(#[case] name: &str, #[case] method: &str) {
        let call = resolve(name, Some("ignored")).unwrap();
        assert_eq!(call.method, method);
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_every_call_is_uic_without_power_requirement() {
        for spec in COMMANDS {
            let value = match spec.schema {
                ArgumentSchema::EqValues => Some("0,0,0,0,0,0,0,0"),
                _ => None,
            };
            let call = spec.build_call(value).unwrap();
            assert_eq!(call.api_type, ApiType::Uic);
            assert!(!call.requires_power);
            assert!(!call.user_check);
            assert_eq!(call.expected_response, "");
            assert_eq!(call.timeout_multiple, 1);
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            resolve("rewind", None),
            Err(CommandError::UnknownCommand("rewind".to_string()))
        );
    }

    #[rstest]
    #[case("volume", "loud")]
    #[case("volume", "1.5")]
    #[case("set_eq_values", "1,2,3")]
    fn test_invalid_arguments(#[case] name: &str, #[case] value: &str) {
        assert!(matches!(
            resolve(name, Some(value)),
            Err(CommandError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_eq_values_need_a_value() {
        assert!(matches!(
            resolve("set_eq_values", None),
            Err(CommandError::InvalidArgument { .. })
        ));
    }
}

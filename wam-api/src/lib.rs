//! Command layer for Samsung WAM speakers
//!
//! This crate holds the static table that maps logical commands (`volume`,
//! `play`, `set_eq_preset`, ...) onto speaker API methods and their argument
//! encodings, plus the [`DeviceClient`] trait through which those calls reach a
//! device. It does no networking itself.
//!
//! ```rust
//! use wam_api::{command, ArgValue};
//!
//! let spec = command::lookup("volume").unwrap();
//! let call = spec.build_call(Some("15")).unwrap();
//!
//! assert_eq!(call.method, "SetVolume");
//! assert_eq!(call.args[0].name, "nVolume");
//! assert_eq!(call.args[0].value, ArgValue::Dec(15));
//! ```

pub mod call;
pub mod client;
pub mod command;
pub mod eq;
pub mod error;

pub use call::{Ack, ApiCall, ApiEvent, ApiType, ArgValue, Argument};
pub use client::{DeviceClient, PropertyMap};
pub use command::{ArgKind, ArgumentSchema, CommandSpec, COMMANDS};
pub use error::{ApiError, CommandError, Result};

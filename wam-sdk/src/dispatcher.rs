//! Command dispatch to single devices and whole groups

use std::net::IpAddr;
use std::sync::Arc;

use futures::future::join_all;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;
use wam_api::{command, Ack, ApiCall, ApiEvent, DeviceClient};
use wam_event_manager::{Notification, NotificationSink};
use wam_state::{DeviceRegistry, GroupId};

use crate::error::{Result, SdkError};

/// Whether a command targets one device or the group that device is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    #[default]
    Individual,
    Group,
}

/// Outcome of a command on one group member
///
/// Serializes as `{ip, success, ack}` or `{ip, success, error}`.
#[derive(Debug)]
pub struct MemberOutcome {
    pub ip: IpAddr,
    pub outcome: std::result::Result<Ack, SdkError>,
}

impl MemberOutcome {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Aggregated outcome of a group command.
///
/// Every member is attempted, so `success_count + fail_count` always equals the
/// number of members at dispatch time.
#[derive(Debug, Serialize)]
pub struct GroupDispatchResult {
    pub group_id: GroupId,
    pub results: Vec<MemberOutcome>,
    pub success_count: usize,
    pub fail_count: usize,
}

/// Turns logical commands into protocol calls and sends them.
///
/// Each call sent, successful or not, is also reported to the notification
/// sink as an `event`.
pub struct CommandDispatcher<C: DeviceClient> {
    registry: Arc<DeviceRegistry<C>>,
    sink: Arc<dyn NotificationSink>,
}

impl<C: DeviceClient> CommandDispatcher<C> {
    pub fn new(registry: Arc<DeviceRegistry<C>>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { registry, sink }
    }

    /// Send `command` to the device at `ip`.
    ///
    /// The command is encoded before anything else, so an unknown command or a
    /// malformed value fails without reaching the device. Client errors are
    /// returned unchanged inside [`SdkError::CommandFailed`].
    pub async fn dispatch_to_device(&self, ip: IpAddr, command: &str, value: Option<&str>) -> Result<Ack> {
        let call = command::resolve(command, value)?;
        self.send_call(ip, &call).await
    }

    /// Send `command` to every member of the group `any_member` belongs to.
    ///
    /// Members are attempted concurrently. A member failure is recorded in the
    /// result and never stops the others.
    pub async fn dispatch_to_group(
        &self,
        any_member: IpAddr,
        command: &str,
        value: Option<&str>,
    ) -> Result<GroupDispatchResult> {
        let call = command::resolve(command, value)?;
        let group_id = self
            .registry
            .group_of(any_member)
            .ok_or(SdkError::GroupNotFound(any_member))?;
        let members = self.registry.group_members(&group_id).unwrap_or_default();

        tracing::debug!("Dispatching {} to {} member(s) of {}", call.method, members.len(), group_id);

        let outcomes = join_all(members.iter().map(|ip| self.send_call(*ip, &call))).await;
        let results: Vec<MemberOutcome> = members
            .into_iter()
            .zip(outcomes)
            .map(|(ip, outcome)| MemberOutcome { ip, outcome })
            .collect();

        let success_count = results.iter().filter(|r| r.is_success()).count();
        let fail_count = results.len() - success_count;
        if fail_count > 0 {
            tracing::warn!("{} failed on {} of {} member(s) of {}", call.method, fail_count, results.len(), group_id);
        }

        Ok(GroupDispatchResult {
            group_id,
            results,
            success_count,
            fail_count,
        })
    }

    /// Send an already encoded call to the device at `ip`
    pub async fn send_call(&self, ip: IpAddr, call: &ApiCall) -> Result<Ack> {
        let handle = self.registry.handle(ip).ok_or(SdkError::DeviceNotConnected(ip))?;

        let outcome = self.registry.client().send_command(&handle, call).await;
        self.sink.publish(Notification::Event(command_event(ip, call, &outcome)));

        outcome.map_err(|source| SdkError::CommandFailed { ip, source })
    }
}

fn command_event(ip: IpAddr, call: &ApiCall, outcome: &wam_api::Result<Ack>) -> ApiEvent {
    let (success, data, err_msg) = match outcome {
        Ok(ack) => (true, ack.data.clone(), None),
        Err(e) => (false, Value::Null, Some(e.to_string())),
    };
    ApiEvent {
        speaker_ip: ip.to_string(),
        api_type: call.api_type,
        method: call.method.clone(),
        success,
        data,
        err_msg,
    }
}

impl Serialize for MemberOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MemberOutcome", 3)?;
        state.serialize_field("ip", &self.ip)?;
        match &self.outcome {
            Ok(ack) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("ack", ack)?;
            }
            Err(e) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", &e.to_string())?;
            }
        }
        state.end()
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scheduler management messages (`mngScheduler_*`).
//!
//! The daemon owns task execution. These types only describe the wire
//! shape of adding, listing, fetching and removing tasks.

use super::{Message, Validate};
use crate::error::ValidationError;
use crate::mtype::MType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Number of fields in a scheduler cron expression
/// (seconds, minutes, hours, day of month, month, day of week, year).
pub const CRON_FIELDS: usize = 7;

/// Numeric task identifier assigned by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaskId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// When a task fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpec {
    pub cron_time: Vec<String>,
    pub periodic: bool,
    /// Period in seconds when `periodic` is set.
    pub period: u32,
    pub exact_time: bool,
    /// ISO 8601 timestamp used when `exact_time` is set.
    pub start_time: String,
}

impl TimeSpec {
    /// Fire on a cron schedule, e.g. `["0", "*/5", "*", "*", "*", "*", "*"]`.
    pub fn cron<S: Into<String>>(fields: [S; CRON_FIELDS]) -> Self {
        Self {
            cron_time: fields.into_iter().map(Into::into).collect(),
            periodic: false,
            period: 0,
            exact_time: false,
            start_time: String::new(),
        }
    }

    /// Fire every `period_secs` seconds.
    pub fn periodic(period_secs: u32) -> Self {
        Self {
            cron_time: empty_cron(),
            periodic: true,
            period: period_secs,
            exact_time: false,
            start_time: String::new(),
        }
    }

    /// Fire once at `start_time`.
    pub fn exact(start_time: impl Into<String>) -> Self {
        Self {
            cron_time: empty_cron(),
            periodic: false,
            period: 0,
            exact_time: true,
            start_time: start_time.into(),
        }
    }
}

fn empty_cron() -> Vec<String> {
    vec![String::new(); CRON_FIELDS]
}

impl Validate for TimeSpec {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.cron_time.len() != CRON_FIELDS {
            return Err(ValidationError::length(
                "cronTime",
                self.cron_time.len(),
                CRON_FIELDS.to_string(),
            ));
        }
        if self.periodic && self.period == 0 {
            return Err(ValidationError::out_of_range("period", 0, 1, u32::MAX as i64));
        }
        if self.exact_time && self.start_time.is_empty() {
            return Err(ValidationError::MissingField("startTime"));
        }
        if !self.periodic && !self.exact_time && self.cron_time.iter().all(String::is_empty) {
            return Err(ValidationError::MissingField("cronTime"));
        }
        Ok(())
    }
}

/// Message resent by the daemon when the task fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    /// Messaging channel instance, e.g. `WebsocketMessaging`.
    pub messaging: String,
    /// Complete request message, `{ mType, data }`.
    pub message: Value,
}

/// One task or a list of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskSpec {
    One(ScheduledTask),
    Many(Vec<ScheduledTask>),
}

impl TaskSpec {
    pub fn tasks(&self) -> &[ScheduledTask] {
        match self {
            TaskSpec::One(t) => std::slice::from_ref(t),
            TaskSpec::Many(v) => v,
        }
    }
}

impl Validate for TaskSpec {
    fn validate(&self) -> Result<(), ValidationError> {
        let tasks = self.tasks();
        if tasks.is_empty() {
            return Err(ValidationError::MissingField("task"));
        }
        for task in tasks {
            if task.messaging.is_empty() {
                return Err(ValidationError::MissingField("messaging"));
            }
            if task.message.get("mType").and_then(Value::as_str).is_none() {
                return Err(ValidationError::MissingField("message.mType"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskRequest {
    pub client_id: String,
    pub task: TaskSpec,
    pub time_spec: TimeSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist: Option<bool>,
}

impl Validate for AddTaskRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_client(&self.client_id)?;
        self.task.validate()?;
        self.time_spec.validate()
    }
}

/// `{ clientId, taskId }`, used by GetTask and RemoveTask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub client_id: String,
    pub task_id: TaskId,
}

impl Validate for TaskRef {
    fn validate(&self) -> Result<(), ValidationError> {
        require_client(&self.client_id)
    }
}

/// `{ clientId }`, used by RemoveAll and List.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub client_id: String,
}

impl Validate for ClientRef {
    fn validate(&self) -> Result<(), ValidationError> {
        require_client(&self.client_id)
    }
}

fn require_client(client_id: &str) -> Result<(), ValidationError> {
    if client_id.is_empty() {
        return Err(ValidationError::MissingField("clientId"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTaskResponse {
    pub client_id: String,
    pub task_id: TaskId,
    pub task: TaskSpec,
    pub time_spec: TimeSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub client_id: String,
    #[serde(default)]
    pub tasks: Vec<TaskId>,
}

macro_rules! scheduler_message {
    ($name:ident, $mtype:ident, $req:ty => $rsp:ty) => {
        #[doc = concat!("`", stringify!($mtype), "`")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Message for $name {
            const M_TYPE: MType = MType::$mtype;
            type Req = $req;
            type Rsp = $rsp;
        }
    };
}

scheduler_message!(AddTask, SchedulerAddTask, AddTaskRequest => TaskRef);
scheduler_message!(GetTask, SchedulerGetTask, TaskRef => GetTaskResponse);
scheduler_message!(RemoveTask, SchedulerRemoveTask, TaskRef => TaskRef);
scheduler_message!(RemoveAll, SchedulerRemoveAll, ClientRef => ClientRef);
scheduler_message!(List, SchedulerList, ClientRef => ListResponse);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Request;
    use serde_json::json;

    fn blink_task() -> ScheduledTask {
        ScheduledTask {
            messaging: "WebsocketMessaging".into(),
            message: json!({
                "mType": "iqrfEmbedLedr_Pulse",
                "data": {"msgId": "sched", "req": {"nAdr": 1, "param": {}}}
            }),
        }
    }

    #[test]
    fn test_task_id_is_numeric_on_the_wire() {
        let req = Request::of::<RemoveTask>(
            "r",
            TaskRef {
                client_id: "app".into(),
                task_id: TaskId(2_146_077_740),
            },
        );
        let v = req.to_value().unwrap();
        assert_eq!(v["data"]["req"]["taskId"], json!(2_146_077_740u32));
    }

    #[test]
    fn test_cron_needs_seven_fields() {
        let mut spec = TimeSpec::cron(["0", "*/5", "*", "*", "*", "*", "*"]);
        spec.validate().unwrap();
        spec.cron_time.pop();
        assert!(matches!(
            spec.validate(),
            Err(ValidationError::Length { field: "cronTime", len: 6, .. })
        ));
    }

    #[test]
    fn test_periodic_and_exact_builders_validate() {
        TimeSpec::periodic(60).validate().unwrap();
        TimeSpec::exact("2026-01-01T10:00:00").validate().unwrap();
        assert!(TimeSpec::periodic(0).validate().is_err());
        assert!(TimeSpec::exact("").validate().is_err());
    }

    #[test]
    fn test_task_accepts_object_or_array() {
        let one: TaskSpec = serde_json::from_value(json!({
            "messaging": "MqttMessaging", "message": {"mType": "iqrfRaw"}
        }))
        .unwrap();
        assert_eq!(one.tasks().len(), 1);

        let many: TaskSpec = serde_json::to_value(TaskSpec::Many(vec![blink_task(), blink_task()]))
            .and_then(serde_json::from_value)
            .unwrap();
        assert_eq!(many.tasks().len(), 2);
    }

    #[test]
    fn test_add_task_requires_client_and_mtype() {
        let mut req = AddTaskRequest {
            client_id: "app".into(),
            task: TaskSpec::One(blink_task()),
            time_spec: TimeSpec::periodic(30),
            persist: None,
        };
        req.validate().unwrap();

        req.task = TaskSpec::One(ScheduledTask {
            messaging: "WebsocketMessaging".into(),
            message: json!({"data": {}}),
        });
        assert_eq!(
            req.validate(),
            Err(ValidationError::MissingField("message.mType"))
        );

        req.client_id.clear();
        assert_eq!(req.validate(), Err(ValidationError::MissingField("clientId")));
    }
}

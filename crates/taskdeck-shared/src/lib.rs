use serde::{
  Deserialize,
  Serialize
};

pub const STATUS_IN_PROGRESS: &str =
  "in-progress";
pub const STATUS_COMPLETED: &str =
  "completed";

/// Workflow state stored on a task
/// document. Unknown values are kept
/// verbatim so they survive a round
/// trip through the UI untouched.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
  InProgress,
  Completed,
  Other(String)
}

impl TaskStatus {
  pub fn from_key(key: &str) -> Self {
    match key {
      | STATUS_IN_PROGRESS => {
        Self::InProgress
      }
      | STATUS_COMPLETED => {
        Self::Completed
      }
      | other => {
        Self::Other(other.to_string())
      }
    }
  }

  pub fn as_key(&self) -> &str {
    match self {
      | Self::InProgress => {
        STATUS_IN_PROGRESS
      }
      | Self::Completed => {
        STATUS_COMPLETED
      }
      | Self::Other(value) => value
    }
  }
}

impl From<String> for TaskStatus {
  fn from(value: String) -> Self {
    Self::from_key(&value)
  }
}

impl From<TaskStatus> for String {
  fn from(value: TaskStatus) -> Self {
    match value {
      | TaskStatus::Other(value) => {
        value
      }
      | named => {
        named.as_key().to_string()
      }
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskDto {
  pub id:          String,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(
    default,
    rename = "dueDate"
  )]
  pub due_date:    String,
  pub status:      TaskStatus
}

/// One record of a collection snapshot
/// as delivered by the document store:
/// the store-assigned id plus the raw
/// field map.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskDocument {
  pub id:     String,
  #[serde(default)]
  pub fields: serde_json::Value
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub enum TaskFilter {
  #[default]
  #[serde(rename = "myTasks")]
  MyTasks,
  #[serde(rename = "inProgress")]
  InProgress,
  #[serde(rename = "completed")]
  Completed,
  #[serde(rename = "all")]
  All
}

impl TaskFilter {
  /// Filters offered as tabs, in display
  /// order. `All` is only reachable
  /// through `from_key`.
  pub const TABS: [TaskFilter; 3] = [
    TaskFilter::MyTasks,
    TaskFilter::InProgress,
    TaskFilter::Completed
  ];

  pub fn from_key(key: &str) -> Self {
    match key {
      | "myTasks" => Self::MyTasks,
      | "inProgress" => Self::InProgress,
      | "completed" => Self::Completed,
      | _ => Self::All
    }
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::MyTasks => "myTasks",
      | Self::InProgress => "inProgress",
      | Self::Completed => "completed",
      | Self::All => "all"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::MyTasks => "My Tasks",
      | Self::InProgress => "In-progress",
      | Self::Completed => "Completed",
      | Self::All => "Tasks"
    }
  }

  pub fn matches(
    self,
    status: &TaskStatus
  ) -> bool {
    match self {
      | Self::MyTasks => matches!(
        status,
        TaskStatus::InProgress
          | TaskStatus::Completed
      ),
      | Self::InProgress => {
        *status == TaskStatus::InProgress
      }
      | Self::Completed => {
        *status == TaskStatus::Completed
      }
      | Self::All => true
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
  #[serde(default)]
  pub uid:          String,
  pub display_name: Option<String>,
  pub email:        Option<String>
}

impl Principal {
  pub fn named(
    uid: &str,
    display_name: &str
  ) -> Self {
    Self {
      uid:          uid.to_string(),
      display_name: Some(
        display_name.to_string()
      ),
      email:        None
    }
  }

  /// Display name with surrounding
  /// whitespace removed; blank names
  /// count as absent.
  pub fn display_name(
    &self
  ) -> Option<&str> {
    self
      .display_name
      .as_deref()
      .map(str::trim)
      .filter(|name| !name.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn task_dto_uses_document_field_names()
  {
    let task = TaskDto {
      id:          "abc".to_string(),
      title:       "Ship".to_string(),
      description: "v1".to_string(),
      due_date:    "2026-11-01"
        .to_string(),
      status:      TaskStatus::InProgress
    };

    let value = serde_json::to_value(
      &task
    )
    .expect("serialize task");

    assert_eq!(
      value["dueDate"],
      "2026-11-01"
    );
    assert_eq!(
      value["status"],
      "in-progress"
    );
  }

  #[test]
  fn unknown_status_survives_decode() {
    let task: TaskDto =
      serde_json::from_str(
        r#"{"id":"1","status":"todo"}"#
      )
      .expect("decode task");

    assert_eq!(
      task.status,
      TaskStatus::Other(
        "todo".to_string()
      )
    );
    assert_eq!(task.status.as_key(), "todo");
    assert!(task.title.is_empty());
  }

  #[test]
  fn filter_keys_fall_back_to_all() {
    for filter in TaskFilter::TABS {
      assert_eq!(
        TaskFilter::from_key(
          filter.as_key()
        ),
        filter
      );
    }
    assert_eq!(
      TaskFilter::from_key("archived"),
      TaskFilter::All
    );
    assert_eq!(
      TaskFilter::All.label(),
      "Tasks"
    );
  }

  #[test]
  fn other_status_is_excluded_from_named_filters()
  {
    let other = TaskStatus::Other(
      "todo".to_string()
    );
    assert!(
      !TaskFilter::MyTasks.matches(&other)
    );
    assert!(
      !TaskFilter::InProgress
        .matches(&other)
    );
    assert!(
      !TaskFilter::Completed
        .matches(&other)
    );
    assert!(TaskFilter::All.matches(&other));
  }

  #[test]
  fn principal_decodes_sdk_field_names() {
    let principal: Principal =
      serde_json::from_str(
        r#"{"uid":"u1","displayName":"  ","email":null}"#
      )
      .expect("decode principal");

    assert_eq!(principal.uid, "u1");
    assert_eq!(
      principal.display_name(),
      None
    );
  }
}

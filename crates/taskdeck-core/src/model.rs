use serde_json::Value;
use taskdeck_shared::{
  TaskDocument,
  TaskDto,
  TaskStatus
};

/// Projects a raw store document onto
/// the display record. Nothing is
/// rejected: missing fields render as
/// empty text so the cached list always
/// mirrors the snapshot one-for-one.
pub fn task_from_document(
  doc: &TaskDocument
) -> TaskDto {
  TaskDto {
    id:          doc.id.clone(),
    title:       field_text(
      &doc.fields,
      "title"
    ),
    description: field_text(
      &doc.fields,
      "description"
    ),
    due_date:    field_text(
      &doc.fields,
      "dueDate"
    ),
    status:      TaskStatus::from_key(
      &field_text(&doc.fields, "status")
    )
  }
}

pub fn tasks_from_snapshot(
  docs: &[TaskDocument]
) -> Vec<TaskDto> {
  docs
    .iter()
    .map(task_from_document)
    .collect()
}

fn field_text(
  fields: &Value,
  key: &str
) -> String {
  match fields.get(key) {
    | None | Some(Value::Null) => {
      String::new()
    }
    | Some(Value::String(text)) => {
      text.clone()
    }
    | Some(other) => other.to_string()
  }
}

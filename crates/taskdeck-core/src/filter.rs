use taskdeck_shared::{
  TaskDto,
  TaskFilter
};

/// Tasks passing `filter`, in snapshot
/// order.
pub fn working_set(
  tasks: &[TaskDto],
  filter: TaskFilter
) -> Vec<TaskDto> {
  tasks
    .iter()
    .filter(|task| {
      filter.matches(&task.status)
    })
    .cloned()
    .collect()
}

pub fn section_title(
  filter: TaskFilter
) -> &'static str {
  filter.label()
}

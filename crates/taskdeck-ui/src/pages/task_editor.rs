use yew::{
  Html,
  Properties,
  function_component,
  html
};
use yew_router::prelude::Link;

use crate::navigation::AppRoute;

#[derive(Properties, PartialEq)]
pub struct TaskEditorProps {
  /// `None` when creating a task.
  pub task_id: Option<String>
}

/// Landing view for the create and edit
/// routes. The form itself lives outside
/// this app.
#[function_component(TaskEditor)]
pub fn task_editor(
  props: &TaskEditorProps
) -> Html {
  let heading = match &props.task_id {
    | Some(id) => format!("Edit task {id}"),
    | None => "Add task".to_string()
  };

  html! {
      <div class="task-page">
          <div class="greeting">{ heading }</div>
          <div class="subheading">{ "Task forms open in the task editor." }</div>
          <Link<AppRoute> to={AppRoute::Dashboard} classes="btn">
              { "Back to tasks" }
          </Link<AppRoute>>
      </div>
  }
}

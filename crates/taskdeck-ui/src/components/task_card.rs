use taskdeck_shared::{
  TaskDto,
  TaskStatus
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskCardProps {
  pub task:      TaskDto,
  pub on_select: Callback<String>,
  pub on_delete: Callback<String>
}

#[function_component(TaskCard)]
pub fn task_card(
  props: &TaskCardProps
) -> Html {
  let dot_class = match props.task.status {
    | TaskStatus::InProgress => {
      "dot in-progress"
    }
    | TaskStatus::Completed => {
      "dot completed"
    }
    | TaskStatus::Other(_) => "dot other"
  };
  let on_select = {
    let on_select =
      props.on_select.clone();
    let id = props.task.id.clone();
    Callback::from(move |_| {
      on_select.emit(id.clone())
    })
  };
  let on_delete = {
    let on_delete =
      props.on_delete.clone();
    let id = props.task.id.clone();
    Callback::from(move |e: MouseEvent| {
      e.stop_propagation();
      on_delete.emit(id.clone());
    })
  };

  html! {
      <div class="task-card" onclick={on_select}>
          <div class={dot_class}></div>
          <div class="body">
              <div>{ &props.task.title }</div>
              {
                  if props.task.due_date.is_empty() {
                      html! {}
                  } else {
                      html! { <div class="subheading">{ &props.task.due_date }</div> }
                  }
              }
          </div>
          <button class="btn danger" onclick={on_delete}>{ "Delete" }</button>
      </div>
  }
}

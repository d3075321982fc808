use taskdeck_shared::TaskDto;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

/// Keyframes rule in `styles.css`.
const MARQUEE_KEYFRAMES: &str =
  "taskdeck-marquee";

#[derive(Properties, PartialEq)]
pub struct TaskCarouselProps {
  pub tasks:     Vec<TaskDto>,
  pub animation:
    taskdeck_core::carousel::MarqueeAnimation,
  pub index:     usize,
  pub on_select: Callback<String>
}

#[function_component(TaskCarousel)]
pub fn task_carousel(
  props: &TaskCarouselProps
) -> Html {
  if props.tasks.is_empty() {
    return html! {};
  }

  let style = format!(
    "animation: {};",
    props
      .animation
      .css(MARQUEE_KEYFRAMES)
  );

  html! {
      <div class="carousel">
          <div class="carousel-track" style={style} data-index={props.index.to_string()}>
              {
                  for props.tasks.iter().map(|task| {
                      let on_select = props.on_select.clone();
                      let id = task.id.clone();
                      html! {
                          <div class="carousel-card" onclick={move |_| on_select.emit(id.clone())}>
                              <h4>{ &task.title }</h4>
                              <p>{ &task.description }</p>
                              <div class="due">{ &task.due_date }</div>
                          </div>
                      }
                  })
              }
          </div>
      </div>
  }
}

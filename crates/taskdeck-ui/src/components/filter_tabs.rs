use taskdeck_shared::TaskFilter;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct FilterTabsProps {
  pub active:    TaskFilter,
  pub on_select: Callback<TaskFilter>
}

#[function_component(FilterTabs)]
pub fn filter_tabs(
  props: &FilterTabsProps
) -> Html {
  html! {
      <div class="tabs">
          {
              for TaskFilter::TABS.into_iter().map(|filter| {
                  let on_select = props.on_select.clone();
                  html! {
                      <button
                          class={if props.active == filter { "tab active" } else { "tab" }}
                          onclick={move |_| on_select.emit(filter)}
                      >
                          { filter.label() }
                      </button>
                  }
              })
          }
      </div>
  }
}

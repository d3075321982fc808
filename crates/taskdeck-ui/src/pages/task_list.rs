use std::rc::Rc;

use taskdeck_core::TaskViewController;
use taskdeck_core::controller::{
  ControllerDeps,
  ControllerSettings
};
use taskdeck_shared::TaskFilter;
use wasm_bindgen_futures::spawn_local;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_context,
  use_effect_with,
  use_force_update,
  use_memo
};
use yew_router::prelude::use_navigator;

use super::session_for;
use crate::backend::Backend;
use crate::components::{
  FilterTabs,
  TaskCard,
  TaskCarousel
};
use crate::diagnostics::ui_debug;
use crate::navigation::RouterNavigator;
use crate::scheduler::GlooScheduler;

#[function_component(TaskListPage)]
pub fn task_list_page() -> Html {
  let backend = use_context::<Backend>();
  let navigator = use_navigator();
  let controller = use_memo(
    (backend, navigator),
    |(backend, navigator)| {
      let (Some(backend), Some(navigator)) =
        (backend, navigator)
      else {
        return None;
      };
      Some(TaskViewController::new(
        ControllerDeps {
          store:     backend.store.clone(),
          scheduler: Rc::new(GlooScheduler),
          navigator: Rc::new(
            RouterNavigator::new(
              navigator.clone()
            )
          ),
          session:   session_for(
            backend,
            navigator.clone()
          ),
          settings:  ControllerSettings::from(
            backend.config.as_ref()
          )
        }
      ))
    }
  );
  let redraw = use_force_update();

  {
    let controller = (*controller).clone();
    use_effect_with((), move |_| {
      if let Some(controller) = &controller {
        let session = controller.session();
        {
          let redraw = redraw.clone();
          session.set_listener(move || {
            redraw.force_update()
          });
        }
        controller.set_listener(move || {
          redraw.force_update()
        });
        session.mount();
        controller.mount();
      } else {
        tracing::error!(
          "task list rendered outside \
           backend or router"
        );
      }
      move || {
        if let Some(controller) = controller {
          controller.unmount();
          controller.session().unmount();
        }
      }
    });
  }

  let Some(controller) = (*controller).clone()
  else {
    return html! {
        <div class="task-page empty">{ "Tasks are unavailable." }</div>
    };
  };

  let on_filter = {
    let controller = controller.clone();
    Callback::from(move |filter: TaskFilter| {
      controller.set_filter(filter)
    })
  };
  let on_select = {
    let controller = controller.clone();
    Callback::from(move |id: String| {
      controller.select_task(&id)
    })
  };
  let on_delete = {
    let controller = controller.clone();
    Callback::from(move |id: String| {
      let controller = controller.clone();
      spawn_local(async move {
        let outcome =
          controller.delete_task(&id).await;
        ui_debug(
          "delete",
          &format!("{id}: {outcome:?}")
        );
      });
    })
  };
  let on_add = {
    let controller = controller.clone();
    Callback::from(move |_| controller.add_task())
  };

  let working = controller.working_set();

  html! {
      <div class="task-page">
          <div class="greeting">{ controller.greeting() }</div>
          <div class="subheading">{ "Have a nice day." }</div>
          <FilterTabs active={controller.active_filter()} on_select={on_filter} />
          <TaskCarousel
              tasks={controller.carousel_items()}
              animation={controller.carousel_animation()}
              index={controller.carousel_index()}
              on_select={on_select.clone()}
          />
          <div class="section-title">{ controller.section_title() }</div>
          <div class="task-stack">
              {
                  if working.is_empty() {
                      html! { <div class="empty">{ "No tasks here yet." }</div> }
                  } else {
                      html! {
                          <>
                              {
                                  for working.into_iter().map(|task| {
                                      let key = task.id.clone();
                                      html! {
                                          <TaskCard
                                              key={key}
                                              task={task}
                                              on_select={on_select.clone()}
                                              on_delete={on_delete.clone()}
                                          />
                                      }
                                  })
                              }
                          </>
                      }
                  }
              }
          </div>
          <button class="btn primary" onclick={on_add}>{ "Add task" }</button>
      </div>
  }
}

use yew::{
  ContextProvider,
  Html,
  function_component,
  html,
  use_memo
};
use yew_router::prelude::{
  BrowserRouter,
  Redirect,
  Switch
};

use crate::backend::Backend;
use crate::navigation::AppRoute;
use crate::pages::{
  TaskEditor,
  TaskListPage,
  WelcomePage
};

fn switch(route: AppRoute) -> Html {
  match route {
    | AppRoute::Welcome => {
      html! { <WelcomePage /> }
    }
    | AppRoute::Dashboard => {
      html! { <TaskListPage /> }
    }
    | AppRoute::AddTask => {
      html! { <TaskEditor task_id={None::<String>} /> }
    }
    | AppRoute::EditTask { id } => {
      html! { <TaskEditor task_id={Some(id)} /> }
    }
    | AppRoute::NotFound => {
      html! { <Redirect<AppRoute> to={AppRoute::Welcome} /> }
    }
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let backend =
    use_memo((), |_| Backend::load());

  html! {
      <ContextProvider<Backend> context={(*backend).clone()}>
          <BrowserRouter>
              <Switch<AppRoute> render={switch} />
          </BrowserRouter>
      </ContextProvider<Backend>>
  }
}

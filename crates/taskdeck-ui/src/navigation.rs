use taskdeck_core::ports::Navigator;
use taskdeck_core::route::Route;
use yew_router::Routable;

#[derive(Clone, Routable, PartialEq, Debug)]
pub enum AppRoute {
  #[at("/")]
  Welcome,
  #[at("/dashboard")]
  Dashboard,
  #[at("/add-task")]
  AddTask,
  #[at("/edit-task/:id")]
  EditTask { id: String },
  #[not_found]
  #[at("/404")]
  NotFound
}

impl From<Route> for AppRoute {
  fn from(route: Route) -> Self {
    match route {
      | Route::Welcome => Self::Welcome,
      | Route::Dashboard => Self::Dashboard,
      | Route::AddTask => Self::AddTask,
      | Route::EditTask(id) => {
        Self::EditTask { id }
      }
    }
  }
}

/// Core navigation requests pushed onto
/// the browser history.
pub struct RouterNavigator {
  navigator: yew_router::navigator::Navigator
}

impl RouterNavigator {
  pub fn new(
    navigator: yew_router::navigator::Navigator
  ) -> Self {
    Self { navigator }
  }
}

impl Navigator for RouterNavigator {
  fn navigate(&self, route: Route) {
    tracing::debug!(path = %route, "navigating");
    self
      .navigator
      .push(&AppRoute::from(route));
  }
}

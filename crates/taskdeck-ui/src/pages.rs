use std::rc::Rc;

use taskdeck_core::SessionResolver;

use crate::backend::Backend;
use crate::navigation::RouterNavigator;

mod task_editor;
mod task_list;
mod welcome;

pub use task_editor::TaskEditor;
pub use task_list::TaskListPage;
pub use welcome::WelcomePage;

fn session_for(
  backend: &Backend,
  navigator: yew_router::navigator::Navigator
) -> SessionResolver {
  SessionResolver::new(
    backend.identity.clone(),
    Rc::new(RouterNavigator::new(navigator)),
    &backend
      .config
      .session
      .fallback_display_name
  )
}

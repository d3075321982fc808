use std::fmt;

const EDIT_TASK_PREFIX: &str =
  "/edit-task/";

/// Navigation targets the controllers
/// may request. The views behind
/// `AddTask` and `EditTask` live outside
/// this crate.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash,
)]
pub enum Route {
  Welcome,
  Dashboard,
  AddTask,
  EditTask(String)
}

impl Route {
  pub fn path(&self) -> String {
    match self {
      | Self::Welcome => "/".to_string(),
      | Self::Dashboard => {
        "/dashboard".to_string()
      }
      | Self::AddTask => {
        "/add-task".to_string()
      }
      | Self::EditTask(id) => {
        format!("{EDIT_TASK_PREFIX}{id}")
      }
    }
  }

  pub fn parse(path: &str) -> Option<Self> {
    let trimmed = path.trim();
    let path = if trimmed.len() > 1 {
      trimmed.trim_end_matches('/')
    } else {
      trimmed
    };

    match path {
      | "" | "/" => Some(Self::Welcome),
      | "/dashboard" => {
        Some(Self::Dashboard)
      }
      | "/add-task" => Some(Self::AddTask),
      | other => other
        .strip_prefix(EDIT_TASK_PREFIX)
        .filter(|id| {
          !id.is_empty()
            && !id.contains('/')
        })
        .map(|id| {
          Self::EditTask(id.to_string())
        })
    }
  }
}

impl fmt::Display for Route {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.path())
  }
}

#[cfg(test)]
mod tests {
  use super::Route;

  #[test]
  fn paths_parse_back_to_routes() {
    let routes = [
      Route::Welcome,
      Route::Dashboard,
      Route::AddTask,
      Route::EditTask("k9Xq".to_string())
    ];

    for route in routes {
      assert_eq!(
        Route::parse(&route.path()),
        Some(route)
      );
    }
  }

  #[test]
  fn edit_route_requires_a_single_segment()
  {
    assert_eq!(
      Route::parse("/edit-task/"),
      None
    );
    assert_eq!(
      Route::parse("/edit-task/a/b"),
      None
    );
    assert_eq!(
      Route::parse("/dashboard/"),
      Some(Route::Dashboard)
    );
    assert_eq!(Route::parse("/nope"), None);
  }
}

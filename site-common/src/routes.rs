use crate::models::Society;
use crate::query;

/// Page of the site, as addressed by its path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Events,
    Articles,
    Membership,
    SocietiesList,
    Society(Society),
}

impl Route {
    /// Resolve a path such as `/events` or `/societies/photonics-society`.
    /// Query strings, fragments and a trailing slash are ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Some(Route::Home),
            "/about" => Some(Route::About),
            "/events" => Some(Route::Events),
            "/articles" => Some(Route::Articles),
            "/membership" => Some(Route::Membership),
            "/societies-list" => Some(Route::SocietiesList),
            other => other
                .strip_prefix("/societies/")
                .and_then(Society::from_slug)
                .map(Route::Society),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about".to_string(),
            Route::Events => "/events".to_string(),
            Route::Articles => "/articles".to_string(),
            Route::Membership => "/membership".to_string(),
            Route::SocietiesList => "/societies-list".to_string(),
            Route::Society(society) => format!("/societies/{}", society.slug()),
        }
    }

    /// Link from a society page to a list view prefiltered on that society
    pub fn filtered_by_society(&self, society: Society) -> String {
        format!("{}?{}", self.path(), query::serialize(&[("society", society.name())]))
    }

    /// Every route of the site, in navigation order
    pub fn all() -> Vec<Route> {
        let mut routes = vec![
            Route::Home,
            Route::About,
            Route::Events,
            Route::Membership,
            Route::Articles,
            Route::SocietiesList,
        ];
        routes.extend(Society::ALL.into_iter().map(Route::Society));
        routes
    }
}

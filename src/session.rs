//! Two-screen navigation: the input form at `/` and the preview at
//! `/infografia`. The raw markup travels as transient navigation state,
//! never as part of the path.

use crate::extract::ExtractPolicy;
use crate::preview::PreviewPage;
use crate::Notifier;

pub const EMPTY_INPUT_MESSAGE: &str = "Please paste the HTML exported from your design tool.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`, the input form
    Home,
    /// `/infografia`, preview and export
    Infografia,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Infografia => "/infografia",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        match path {
            "/" => Some(Route::Home),
            "/infografia" => Some(Route::Infografia),
            _ => None,
        }
    }
}

/// Payload carried from the input screen to the preview screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub html: String,
}

/// A transition to `route`, optionally carrying state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub state: Option<NavigationState>,
}

impl Navigation {
    pub fn home() -> Self {
        Self {
            route: Route::Home,
            state: None,
        }
    }
}

/// State of the `/` screen.
#[derive(Debug, Clone, Default)]
pub struct HomePage {
    html: String,
}

impl HomePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    /// Validate the input and produce the transition to the preview.
    ///
    /// Blank input raises an alert and stays on this screen.
    pub fn submit(&self, notifier: &dyn Notifier) -> Option<Navigation> {
        if self.html.trim().is_empty() {
            notifier.alert(EMPTY_INPUT_MESSAGE);
            return None;
        }
        Some(Navigation {
            route: Route::Infografia,
            state: Some(NavigationState {
                html: self.html.clone(),
            }),
        })
    }
}

/// Current screen with its page-local state.
#[derive(Debug, Clone)]
pub enum Screen {
    Home(HomePage),
    Preview(PreviewPage),
}

/// The whole application: one route at a time, state discarded on leave.
#[derive(Debug, Clone)]
pub struct App {
    policy: ExtractPolicy,
    screen: Screen,
}

impl App {
    pub fn new(policy: ExtractPolicy) -> Self {
        Self {
            policy,
            screen: Screen::Home(HomePage::new()),
        }
    }

    pub fn route(&self) -> Route {
        match self.screen {
            Screen::Home(_) => Route::Home,
            Screen::Preview(_) => Route::Infografia,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Apply a transition. Entering a screen always starts from fresh state.
    pub fn navigate(&mut self, nav: Navigation) {
        log::debug!("Navigating to {}", nav.route.path());
        self.screen = match nav.route {
            Route::Home => Screen::Home(HomePage::new()),
            Route::Infografia => Screen::Preview(PreviewPage::new(nav.state, self.policy.clone())),
        };
    }

    /// Navigate by path, as a reload or a typed URL would. Unknown paths are
    /// ignored; no state is carried.
    pub fn open_path(&mut self, path: &str) -> bool {
        match Route::from_path(path) {
            Some(route) => {
                self.navigate(Navigation { route, state: None });
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Notifier for Recorder {
        fn alert(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn routes_round_trip_paths() {
        assert_eq!(Route::from_path("/"), Some(Route::Home));
        assert_eq!(Route::from_path("/infografia"), Some(Route::Infografia));
        assert_eq!(Route::from_path("/other"), None);
        assert_eq!(Route::Infografia.path(), "/infografia");
    }

    #[test]
    fn blank_submit_alerts_and_stays() {
        let rec = Recorder::default();
        let mut home = HomePage::new();
        home.set_html("  \n ");
        assert!(home.submit(&rec).is_none());
        assert_eq!(*rec.0.lock().unwrap(), vec![EMPTY_INPUT_MESSAGE.to_string()]);
    }

    #[test]
    fn submit_carries_markup_to_preview() {
        let rec = Recorder::default();
        let mut app = App::new(ExtractPolicy::passthrough());
        let nav = match app.screen_mut() {
            Screen::Home(home) => {
                home.set_html("<p>Hi</p>");
                home.submit(&rec).unwrap()
            }
            Screen::Preview(_) => unreachable!(),
        };
        app.navigate(nav);
        assert_eq!(app.route(), Route::Infografia);
        match app.screen() {
            Screen::Preview(p) => assert!(p.extracted().unwrap().body_markup.contains("<p>Hi</p>")),
            Screen::Home(_) => panic!("expected preview"),
        }
        assert!(rec.0.lock().unwrap().is_empty());
    }

    #[test]
    fn reloading_preview_loses_payload() {
        let mut app = App::new(ExtractPolicy::default());
        assert!(app.open_path("/infografia"));
        match app.screen() {
            Screen::Preview(p) => assert!(p.is_error()),
            Screen::Home(_) => panic!("expected preview"),
        }
        assert!(!app.open_path("/nope"));
    }
}

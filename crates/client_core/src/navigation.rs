//! Route table selecting which screen stack the root view renders.

use serde::Serialize;
use shared::domain::{Session, SessionStatus};

pub const HEADER_BACKGROUND: &str = "#f4511e";
pub const HEADER_TINT: &str = "#fff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScreenName {
    SplashScreen,
    SignInScreen,
    SignUpScreen,
    Home,
    NewCategory,
    ProductsList,
    NewProduct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderAction {
    pub icon: &'static str,
    pub title: &'static str,
    pub navigate_to: ScreenName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenOptions {
    pub header_shown: bool,
    pub title: Option<&'static str>,
    pub header_background: Option<&'static str>,
    pub header_tint: Option<&'static str>,
    pub header_back_title: Option<&'static str>,
    pub header_right: Option<HeaderAction>,
}

impl ScreenOptions {
    fn hidden() -> Self {
        Self {
            header_shown: false,
            title: None,
            header_background: None,
            header_tint: None,
            header_back_title: None,
            header_right: None,
        }
    }

    fn titled(title: &'static str) -> Self {
        Self {
            header_shown: true,
            title: Some(title),
            header_background: Some(HEADER_BACKGROUND),
            header_tint: Some(HEADER_TINT),
            header_back_title: None,
            header_right: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub name: ScreenName,
    pub options: ScreenOptions,
    /// Token handed to screens that call the catalog backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenStack {
    pub initial: ScreenName,
    pub screens: Vec<Screen>,
}

impl ScreenStack {
    pub fn screen(&self, name: ScreenName) -> Option<&Screen> {
        self.screens.iter().find(|screen| screen.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tree", content = "stack", rename_all = "snake_case")]
pub enum NavigationTree {
    /// Restore still running; show a loading indicator.
    Splash,
    AuthStack(ScreenStack),
    AppStack(ScreenStack),
}

impl NavigationTree {
    pub fn for_session(session: &Session) -> Self {
        match (session.status(), session.token.as_deref()) {
            (SessionStatus::Authenticated, Some(token)) => {
                NavigationTree::AppStack(app_stack(token))
            }
            (SessionStatus::Unknown, _) => NavigationTree::Splash,
            _ => NavigationTree::AuthStack(auth_stack()),
        }
    }

    pub fn stack(&self) -> Option<&ScreenStack> {
        match self {
            NavigationTree::Splash => None,
            NavigationTree::AuthStack(stack) | NavigationTree::AppStack(stack) => Some(stack),
        }
    }
}

fn auth_stack() -> ScreenStack {
    let screen = |name| Screen {
        name,
        options: ScreenOptions::hidden(),
        user_token: None,
    };
    ScreenStack {
        initial: ScreenName::SplashScreen,
        screens: vec![
            screen(ScreenName::SplashScreen),
            screen(ScreenName::SignInScreen),
            screen(ScreenName::SignUpScreen),
        ],
    }
}

fn app_stack(token: &str) -> ScreenStack {
    let mut products_list = ScreenOptions::titled("Products List");
    products_list.header_right = Some(HeaderAction {
        icon: "ios-add",
        title: "Add",
        navigate_to: ScreenName::NewProduct,
    });

    let mut new_product = ScreenOptions::titled("Add New Product");
    new_product.header_back_title = Some("Products");

    ScreenStack {
        initial: ScreenName::Home,
        screens: vec![
            Screen {
                name: ScreenName::Home,
                options: ScreenOptions::hidden(),
                user_token: None,
            },
            Screen {
                name: ScreenName::NewCategory,
                options: ScreenOptions::titled("Add New Category"),
                user_token: Some(token.to_string()),
            },
            Screen {
                name: ScreenName::ProductsList,
                options: products_list,
                user_token: None,
            },
            Screen {
                name: ScreenName::NewProduct,
                options: new_product,
                user_token: Some(token.to_string()),
            },
        ],
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;

//! Light and dark themes built from the stock navigation and component palettes.

use serde::Serialize;

pub const LIGHT_BACKGROUND: &str = "#ffffff";
pub const LIGHT_TEXT: &str = "#333333";
pub const DARK_BACKGROUND: &str = "#333333";
pub const DARK_TEXT: &str = "#ffffff";

/// Colors the navigation container paints: headers, cards, tab bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationPalette {
    pub dark: bool,
    pub primary: &'static str,
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub notification: &'static str,
}

/// Colors and shape used by form controls and surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentPalette {
    pub dark: bool,
    pub roundness: u8,
    pub primary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub error: &'static str,
    pub text: &'static str,
    pub on_surface: &'static str,
    pub disabled: &'static str,
    pub placeholder: &'static str,
    pub backdrop: &'static str,
    pub notification: &'static str,
}

pub const NAVIGATION_LIGHT: NavigationPalette = NavigationPalette {
    dark: false,
    primary: "rgb(0, 122, 255)",
    background: "rgb(242, 242, 242)",
    card: "rgb(255, 255, 255)",
    text: "rgb(28, 28, 30)",
    border: "rgb(216, 216, 216)",
    notification: "rgb(255, 59, 48)",
};

pub const NAVIGATION_DARK: NavigationPalette = NavigationPalette {
    dark: true,
    primary: "rgb(10, 132, 255)",
    background: "rgb(1, 1, 1)",
    card: "rgb(18, 18, 18)",
    text: "rgb(229, 229, 231)",
    border: "rgb(39, 39, 41)",
    notification: "rgb(255, 69, 58)",
};

pub const COMPONENT_LIGHT: ComponentPalette = ComponentPalette {
    dark: false,
    roundness: 4,
    primary: "#6200ee",
    accent: "#03dac4",
    background: "#f6f6f6",
    surface: "#ffffff",
    error: "#B00020",
    text: "#000000",
    on_surface: "#000000",
    disabled: "rgba(0, 0, 0, 0.26)",
    placeholder: "rgba(0, 0, 0, 0.54)",
    backdrop: "rgba(0, 0, 0, 0.5)",
    notification: "#f50057",
};

pub const COMPONENT_DARK: ComponentPalette = ComponentPalette {
    dark: true,
    roundness: 4,
    primary: "#BB86FC",
    accent: "#03dac6",
    background: "#121212",
    surface: "#121212",
    error: "#CF6679",
    text: "#ffffff",
    on_surface: "#FFFFFF",
    disabled: "rgba(255, 255, 255, 0.38)",
    placeholder: "rgba(255, 255, 255, 0.54)",
    backdrop: "rgba(0, 0, 0, 0.5)",
    notification: "#ff80ab",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub primary: String,
    pub accent: String,
    pub background: String,
    pub surface: String,
    pub card: String,
    pub text: String,
    pub border: String,
    pub notification: String,
    pub error: String,
    pub on_surface: String,
    pub disabled: String,
    pub placeholder: String,
    pub backdrop: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub dark: bool,
    pub roundness: u8,
    pub colors: ThemeColors,
}

/// Merges the navigation palette with the component palette (component
/// values win where both define a color) and applies the app's own
/// background and text colors.
pub fn merge_palettes(
    navigation: &NavigationPalette,
    components: &ComponentPalette,
    background: &str,
    text: &str,
) -> Theme {
    Theme {
        dark: components.dark || navigation.dark,
        roundness: components.roundness,
        colors: ThemeColors {
            primary: components.primary.to_string(),
            accent: components.accent.to_string(),
            background: background.to_string(),
            surface: components.surface.to_string(),
            card: navigation.card.to_string(),
            text: text.to_string(),
            border: navigation.border.to_string(),
            notification: components.notification.to_string(),
            error: components.error.to_string(),
            on_surface: components.on_surface.to_string(),
            disabled: components.disabled.to_string(),
            placeholder: components.placeholder.to_string(),
            backdrop: components.backdrop.to_string(),
        },
    }
}

pub fn resolve_theme(dark: bool) -> Theme {
    if dark {
        merge_palettes(&NAVIGATION_DARK, &COMPONENT_DARK, DARK_BACKGROUND, DARK_TEXT)
    } else {
        merge_palettes(
            &NAVIGATION_LIGHT,
            &COMPONENT_LIGHT,
            LIGHT_BACKGROUND,
            LIGHT_TEXT,
        )
    }
}

#[cfg(test)]
#[path = "tests/theme_tests.rs"]
mod tests;

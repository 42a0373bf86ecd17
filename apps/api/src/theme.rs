//! Process-wide colour scheme for the preview chrome.
//!
//! Single writer (`set`), any number of subscribers. Never touches resume content
//! or exported documents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Background behind the resume card on preview pages.
    pub fn chrome_background(self) -> &'static str {
        match self {
            Theme::Light => "#f9fafb",
            Theme::Dark => "#0f172a",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Clone)]
pub struct ThemeState {
    tx: watch::Sender<Theme>,
}

impl ThemeState {
    pub fn new(initial: Theme) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> Theme {
        *self.tx.borrow()
    }

    /// Stores the theme and wakes subscribers. Returns false when nothing changed.
    pub fn set(&self, theme: Theme) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == theme {
                false
            } else {
                *current = theme;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let state = ThemeState::default();
        assert_eq!(state.get(), Theme::Light);
        assert!(state.set(Theme::Dark));
        assert_eq!(state.get(), Theme::Dark);
        assert!(!state.set(Theme::Dark));
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let state = ThemeState::default();
        let mut rx = state.subscribe();
        state.set(Theme::Dark);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Theme::Dark);
    }

    #[test]
    fn test_parse() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}

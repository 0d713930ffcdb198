#![forbid(unsafe_code)]

//! Coordinator configuration.
//!
//! Defaults match the gallery: 20 records per page, two pages fetched on
//! mount, one unit of overscan, and edge triggers 200 units from either end.
//! Each field can be overridden from the environment; unparsable values are
//! ignored and the default is kept.

use pwin_core::PageNumber;

/// Environment variable overriding [`WindowConfig::overscan`].
pub const ENV_OVERSCAN: &str = "PWIN_OVERSCAN";
/// Environment variable overriding [`WindowConfig::load_more_threshold`].
pub const ENV_LOAD_THRESHOLD: &str = "PWIN_LOAD_THRESHOLD";
/// Environment variable overriding [`WindowConfig::page_size`].
pub const ENV_PAGE_SIZE: &str = "PWIN_PAGE_SIZE";
/// Environment variable overriding [`WindowConfig::initial_pages`].
pub const ENV_INITIAL_PAGES: &str = "PWIN_INITIAL_PAGES";
/// Environment variable overriding [`WindowConfig::start_page`].
pub const ENV_START_PAGE: &str = "PWIN_START_PAGE";

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Distance from either end of the content that triggers a fetch.
pub const DEFAULT_LOAD_THRESHOLD: f64 = 200.0;
/// Viewport size assumed until the host reports one.
pub const DEFAULT_VIEWPORT_SIZE: f64 = 600.0;

/// Tuning for [`WindowCoordinator`](crate::WindowCoordinator).
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    /// Extra units kept active on each side of the visible range.
    pub overscan: usize,
    /// Edge distance at or below which the next page is requested.
    pub load_more_threshold: f64,
    /// Records per page.
    pub page_size: usize,
    /// Pages fetched one after another on mount.
    pub initial_pages: usize,
    /// First page fetched on mount.
    pub start_page: PageNumber,
    /// Viewport size before the first resize signal.
    pub viewport_size: f64,
    /// Viewport cross size before the first resize signal.
    pub cross_size: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            overscan: 1,
            load_more_threshold: DEFAULT_LOAD_THRESHOLD,
            page_size: DEFAULT_PAGE_SIZE,
            initial_pages: 2,
            start_page: PageNumber::FIRST,
            viewport_size: DEFAULT_VIEWPORT_SIZE,
            cross_size: 0.0,
        }
    }
}

impl WindowConfig {
    /// Defaults with overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from a custom lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().apply_env_with(get_env)
    }

    /// Apply environment overrides on top of `self`.
    #[must_use]
    pub fn apply_env_with<F>(mut self, get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_env::<usize, _>(&get_env, ENV_OVERSCAN) {
            self.overscan = v;
        }
        if let Some(v) = parse_env::<f64, _>(&get_env, ENV_LOAD_THRESHOLD)
            .filter(|v| v.is_finite() && *v >= 0.0)
        {
            self.load_more_threshold = v;
        }
        if let Some(v) = parse_env::<usize, _>(&get_env, ENV_PAGE_SIZE).filter(|v| *v > 0) {
            self.page_size = v;
        }
        if let Some(v) = parse_env::<usize, _>(&get_env, ENV_INITIAL_PAGES) {
            self.initial_pages = v;
        }
        if let Some(v) =
            parse_env::<u32, _>(&get_env, ENV_START_PAGE).and_then(|n| PageNumber::new(n).ok())
        {
            self.start_page = v;
        }
        self
    }

    /// Set units rendered beyond each viewport edge.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Set the distance from an edge that triggers a fetch (clamped at 0).
    #[must_use]
    pub fn with_load_more_threshold(mut self, threshold: f64) -> Self {
        self.load_more_threshold = threshold.max(0.0);
        self
    }

    /// Set records per page (at least 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set how many pages `mount` loads before edge triggers take over.
    #[must_use]
    pub fn with_initial_pages(mut self, pages: usize) -> Self {
        self.initial_pages = pages;
        self
    }

    /// Set the first page requested on mount.
    #[must_use]
    pub fn with_start_page(mut self, page: PageNumber) -> Self {
        self.start_page = page;
        self
    }

    /// Set the viewport assumed before the host reports one.
    #[must_use]
    pub fn with_viewport(mut self, size: f64, cross_size: f64) -> Self {
        self.viewport_size = size;
        self.cross_size = cross_size;
        self
    }
}

fn parse_env<T, F>(get_env: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    get_env(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn map_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn get_env<'a>(map: &'a HashMap<String, String>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = WindowConfig::default();
        assert_eq!(cfg.overscan, 1);
        assert_eq!(cfg.load_more_threshold, 200.0);
        assert_eq!(cfg.page_size, 20);
        assert_eq!(cfg.initial_pages, 2);
        assert_eq!(cfg.start_page, PageNumber::FIRST);
        assert_eq!(cfg.viewport_size, 600.0);
    }

    #[test]
    fn env_overrides_apply() {
        let env = map_env(&[
            (ENV_OVERSCAN, "3"),
            (ENV_LOAD_THRESHOLD, "450.5"),
            (ENV_PAGE_SIZE, " 50 "),
            (ENV_INITIAL_PAGES, "1"),
            (ENV_START_PAGE, "7"),
        ]);
        let cfg = WindowConfig::from_env_with(get_env(&env));
        assert_eq!(cfg.overscan, 3);
        assert_eq!(cfg.load_more_threshold, 450.5);
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.initial_pages, 1);
        assert_eq!(cfg.start_page.get(), 7);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let env = map_env(&[
            (ENV_OVERSCAN, "many"),
            (ENV_LOAD_THRESHOLD, "-10"),
            (ENV_PAGE_SIZE, "0"),
            (ENV_START_PAGE, "0"),
        ]);
        let cfg = WindowConfig::from_env_with(get_env(&env));
        assert_eq!(cfg, WindowConfig::default());
    }

    #[test]
    fn builders() {
        let cfg = WindowConfig::default()
            .with_overscan(0)
            .with_page_size(0)
            .with_load_more_threshold(-5.0)
            .with_viewport(300.0, 800.0);
        assert_eq!(cfg.overscan, 0);
        assert_eq!(cfg.page_size, 1);
        assert_eq!(cfg.load_more_threshold, 0.0);
        assert_eq!(cfg.viewport_size, 300.0);
        assert_eq!(cfg.cross_size, 800.0);
    }
}

//! Responsive and connectivity classification for a rendered view.
//!
//! Each request mounts a [`LayoutResponder`] from the viewport it reports and
//! reads back a [`LayoutState`] of derived booleans that decide what renders.
//! Later resizes and connectivity changes are handled in the browser, which
//! reads [`SMALL_SCREEN_BREAKPOINT`] from the page.

/// Widths at or below this many CSS pixels are "small screen".
pub const SMALL_SCREEN_BREAKPOINT: u32 = 1300;

/// Network reachability as last reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Online,
    Offline,
}

/// Whether a viewport width counts as small.
#[must_use]
pub const fn is_small_screen(width: u32) -> bool {
    width <= SMALL_SCREEN_BREAKPOINT
}

/// Derived view state. Templates branch on these and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutState {
    pub small_screen: bool,
    pub offline: bool,
}

/// How a view wants its create-content form shown on small screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallScreenForm {
    /// The form stays in the page and becomes an overlay on request (Stories).
    Inline,
    /// The form exists only as an overlay on request (Gallery).
    OverlayOnly,
}

/// Where a create-content form renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPresentation {
    Inline,
    /// Fullscreen overlay with a return affordance.
    Fullscreen,
    Hidden,
}

impl FormPresentation {
    #[must_use]
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Inline)
    }

    #[must_use]
    pub const fn is_fullscreen(self) -> bool {
        matches!(self, Self::Fullscreen)
    }
}

impl LayoutState {
    #[must_use]
    pub const fn show_offline_banner(&self) -> bool {
        self.offline
    }

    /// Sections that only appear in the single-column layout (About view's
    /// gallery, biography and recent stories).
    #[must_use]
    pub const fn show_compact_sections(&self) -> bool {
        self.small_screen
    }

    /// Whether the floating "Add" button renders.
    #[must_use]
    pub const fn show_add_action(&self, permitted: bool) -> bool {
        self.small_screen && permitted
    }

    /// Decide where the form goes given whether compose was requested.
    #[must_use]
    pub const fn form_presentation(
        &self,
        compose_requested: bool,
        mode: SmallScreenForm,
    ) -> FormPresentation {
        if !self.small_screen {
            return FormPresentation::Inline;
        }
        match (compose_requested, mode) {
            (true, _) => FormPresentation::Fullscreen,
            (false, SmallScreenForm::Inline) => FormPresentation::Inline,
            (false, SmallScreenForm::OverlayOnly) => FormPresentation::Hidden,
        }
    }
}

/// Layout classification for one rendered view.
#[derive(Debug, Clone)]
pub struct LayoutResponder {
    state: LayoutState,
}

impl LayoutResponder {
    /// Mount with the current width and the initial connectivity snapshot.
    ///
    /// An unknown width is treated as a large screen.
    #[must_use]
    pub const fn mount(width: Option<u32>, initial: Connectivity) -> Self {
        let small_screen = match width {
            Some(w) => is_small_screen(w),
            None => false,
        };
        Self {
            state: LayoutState {
                small_screen,
                offline: matches!(initial, Connectivity::Offline),
            },
        }
    }

    #[must_use]
    pub const fn state(&self) -> LayoutState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_is_inclusive() {
        assert!(is_small_screen(1300));
        assert!(is_small_screen(375));
        assert!(!is_small_screen(1301));
    }

    #[test]
    fn test_offline_banner_follows_connectivity() {
        let online = LayoutResponder::mount(Some(1440), Connectivity::Online);
        assert!(!online.state().show_offline_banner());

        let offline = LayoutResponder::mount(Some(1440), Connectivity::Offline);
        assert!(offline.state().show_offline_banner());
        assert!(!offline.state().small_screen);
    }

    #[test]
    fn test_mount_classifies_width() {
        let compact = |width| {
            LayoutResponder::mount(width, Connectivity::Online)
                .state()
                .show_compact_sections()
        };
        assert!(compact(Some(1300)));
        assert!(!compact(Some(1301)));
        assert!(!compact(None));
    }

    #[test]
    fn test_form_presentation() {
        let large = LayoutState {
            small_screen: false,
            offline: false,
        };
        let small = LayoutState {
            small_screen: true,
            offline: false,
        };

        assert_eq!(
            large.form_presentation(true, SmallScreenForm::OverlayOnly),
            FormPresentation::Inline
        );
        assert_eq!(
            small.form_presentation(false, SmallScreenForm::OverlayOnly),
            FormPresentation::Hidden
        );
        assert_eq!(
            small.form_presentation(false, SmallScreenForm::Inline),
            FormPresentation::Inline
        );
        assert_eq!(
            small.form_presentation(true, SmallScreenForm::Inline),
            FormPresentation::Fullscreen
        );
    }

    #[test]
    fn test_add_action_needs_small_screen_and_permission() {
        let small = LayoutState {
            small_screen: true,
            offline: false,
        };
        assert!(small.show_add_action(true));
        assert!(!small.show_add_action(false));
        assert!(!LayoutState::default().show_add_action(true));
    }
}

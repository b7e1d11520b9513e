//! Detail overlay state machine.
//!
//! The overlay moves `Closed -> Opening -> Ready -> Closed`. Opening acquires
//! the keyboard binding and the body scroll lock; every exit path releases both
//! and restores the page scroll offset captured at open time. Transitions
//! return the side effects the host has to perform, in order.

use std::str::FromStr;

use super::{error::DomainError, types::ProjectRecord};

/// Scroll offset past which the scroll-to-top control is shown.
pub const SCROLL_THRESHOLD_PX: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum OverlayPhase {
    #[default]
    Closed,
    Opening,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayTab {
    #[default]
    Overview,
    Scope,
    Gallery,
}

impl OverlayTab {
    pub const ALL: [OverlayTab; 3] = [OverlayTab::Overview, OverlayTab::Scope, OverlayTab::Gallery];

    pub fn as_str(self) -> &'static str {
        match self {
            OverlayTab::Overview => "overview",
            OverlayTab::Scope => "scope",
            OverlayTab::Gallery => "gallery",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OverlayTab::Overview => "Overview",
            OverlayTab::Scope => "Scope of Work",
            OverlayTab::Gallery => "Gallery",
        }
    }
}

impl FromStr for OverlayTab {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let token = value.trim().to_ascii_lowercase();
        OverlayTab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == token)
            .ok_or_else(|| DomainError::validation(format!("unknown overlay tab `{value}`")))
    }
}

/// Keys the overlay listens to while it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    Escape,
    ArrowLeft,
    ArrowRight,
}

impl OverlayKey {
    pub const ALL: [OverlayKey; 3] = [OverlayKey::Escape, OverlayKey::ArrowLeft, OverlayKey::ArrowRight];

    /// The DOM `KeyboardEvent.key` name.
    pub fn as_str(self) -> &'static str {
        match self {
            OverlayKey::Escape => "Escape",
            OverlayKey::ArrowLeft => "ArrowLeft",
            OverlayKey::ArrowRight => "ArrowRight",
        }
    }

    /// Map a DOM `KeyboardEvent.key` name.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Escape" | "Esc" => Some(OverlayKey::Escape),
            "ArrowLeft" | "Left" => Some(OverlayKey::ArrowLeft),
            "ArrowRight" | "Right" => Some(OverlayKey::ArrowRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPath {
    CloseButton,
    Backdrop,
    EscapeKey,
}

impl ExitPath {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitPath::CloseButton => "button",
            ExitPath::Backdrop => "backdrop",
            ExitPath::EscapeKey => "escape",
        }
    }
}

impl FromStr for ExitPath {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "button" => Ok(ExitPath::CloseButton),
            "backdrop" => Ok(ExitPath::Backdrop),
            "escape" => Ok(ExitPath::EscapeKey),
            _ => Err(DomainError::validation(format!("unknown exit path `{value}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEffect {
    LockScroll,
    AttachKeyboard,
    DetachKeyboard,
    UnlockScroll,
    RestoreScroll { offset: u32 },
}

impl OverlayEffect {
    /// Token understood by the overlay script.
    pub fn as_str(self) -> &'static str {
        match self {
            OverlayEffect::LockScroll => "lock-scroll",
            OverlayEffect::AttachKeyboard => "attach-keyboard",
            OverlayEffect::DetachKeyboard => "detach-keyboard",
            OverlayEffect::UnlockScroll => "unlock-scroll",
            OverlayEffect::RestoreScroll { .. } => "restore-scroll",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bindings {
    page_scroll: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DetailOverlay {
    phase: OverlayPhase,
    selected: Option<String>,
    image_count: usize,
    image_index: usize,
    tab: OverlayTab,
    bindings: Option<Bindings>,
    last_exit: Option<ExitPath>,
}

impl DetailOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `record`. Reopening on another record keeps the bindings but
    /// resets all per-record state.
    pub fn open(&mut self, record: &ProjectRecord, page_scroll: u32) -> Vec<OverlayEffect> {
        let mut effects = Vec::new();
        if self.bindings.is_none() {
            self.bindings = Some(Bindings { page_scroll });
            effects.push(OverlayEffect::LockScroll);
            effects.push(OverlayEffect::AttachKeyboard);
        }

        self.phase = OverlayPhase::Opening;
        self.selected = Some(record.id.clone());
        self.image_count = record.images.len();
        self.image_index = 0;
        self.tab = OverlayTab::default();
        self.last_exit = None;
        effects
    }

    pub fn mark_ready(&mut self) -> bool {
        if self.phase == OverlayPhase::Opening {
            self.phase = OverlayPhase::Ready;
            true
        } else {
            false
        }
    }

    pub fn close(&mut self, exit: ExitPath) -> Vec<OverlayEffect> {
        if !self.is_open() {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if let Some(bindings) = self.bindings.take() {
            effects.push(OverlayEffect::DetachKeyboard);
            effects.push(OverlayEffect::UnlockScroll);
            effects.push(OverlayEffect::RestoreScroll {
                offset: bindings.page_scroll,
            });
        }

        *self = Self {
            last_exit: Some(exit),
            ..Self::default()
        };
        effects
    }

    pub fn handle_key(&mut self, key: OverlayKey) -> Vec<OverlayEffect> {
        if !self.is_open() {
            return Vec::new();
        }

        match key {
            OverlayKey::Escape => self.close(ExitPath::EscapeKey),
            OverlayKey::ArrowLeft => {
                self.previous_image();
                Vec::new()
            }
            OverlayKey::ArrowRight => {
                self.next_image();
                Vec::new()
            }
        }
    }

    pub fn next_image(&mut self) -> bool {
        if !self.can_navigate() {
            return false;
        }
        self.image_index = (self.image_index + 1) % self.image_count;
        true
    }

    pub fn previous_image(&mut self) -> bool {
        if !self.can_navigate() {
            return false;
        }
        self.image_index = (self.image_index + self.image_count - 1) % self.image_count;
        true
    }

    /// Jump to `index`, wrapping past the end of the gallery.
    pub fn show_image(&mut self, index: usize) {
        if self.is_open() && self.image_count > 0 {
            self.image_index = index % self.image_count;
        }
    }

    pub fn select_tab(&mut self, tab: OverlayTab) {
        if self.is_open() {
            self.tab = tab;
        }
    }

    fn can_navigate(&self) -> bool {
        self.is_open() && self.image_count > 1
    }

    pub fn is_open(&self) -> bool {
        self.phase != OverlayPhase::Closed
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn tab(&self) -> OverlayTab {
        self.tab
    }

    pub fn last_exit(&self) -> Option<ExitPath> {
        self.last_exit
    }
}

use alloc::sync::Arc;

use crate::ViewportMode;
use crate::viewport::Viewport;

/// Row height used when none is configured.
pub const DEFAULT_ROW_HEIGHT: u32 = 33;

/// A callback fired after a viewport state update.
pub type OnChangeCallback = Arc<dyn Fn(&Viewport) + Send + Sync>;

/// Configuration for [`crate::Viewport`].
///
/// Cheap to clone: the callback is stored in an `Arc`.
#[derive(Clone)]
pub struct ViewportOptions {
    pub mode: ViewportMode,
    /// Row size in fixed mode, fallback in variable mode, minimum in auto mode.
    pub row_height: u32,
    /// Caps the container size used for window computation.
    pub max_size: Option<u32>,
    pub on_change: Option<OnChangeCallback>,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            mode: ViewportMode::Disabled,
            row_height: DEFAULT_ROW_HEIGHT,
            max_size: None,
            on_change: None,
        }
    }
}

impl ViewportOptions {
    pub fn new(mode: ViewportMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: ViewportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_max_size(mut self, max_size: Option<u32>) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&Viewport) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for ViewportOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewportOptions")
            .field("mode", &self.mode)
            .field("row_height", &self.row_height)
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}

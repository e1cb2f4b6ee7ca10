use eframe::egui::{Vec2, vec2};

/// Display size assumed when the primary monitor cannot be queried.
pub const DEFAULT_SCREEN: Vec2 = vec2(400.0, 300.0);

/// How the widgets are arranged on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Everything stacked in one centred, scrolling column (phones).
    Narrow,
    /// Controls in a side panel, plot in the central panel.
    Wide,
}

impl LayoutMode {
    pub fn for_width(width: f32, narrow_below: f32) -> Self {
        if width < narrow_below {
            LayoutMode::Narrow
        } else {
            LayoutMode::Wide
        }
    }
}

/// Startup window size: `fraction` of the display in each dimension.
pub fn initial_window_size(monitor: Option<Vec2>, fraction: f32) -> Vec2 {
    monitor.unwrap_or(DEFAULT_SCREEN) * fraction
}

/// Width the layout decision is based on: the narrower of the display and
/// the current window.
pub fn effective_width(monitor: Option<Vec2>, window_width: f32) -> f32 {
    match monitor {
        Some(size) => size.x.min(window_width),
        None => window_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_threshold() {
        assert_eq!(LayoutMode::for_width(399.0, 400.0), LayoutMode::Narrow);
        assert_eq!(LayoutMode::for_width(400.0, 400.0), LayoutMode::Wide);
        assert_eq!(LayoutMode::for_width(1920.0, 400.0), LayoutMode::Wide);
    }

    #[test]
    fn test_initial_window_size() {
        let size = initial_window_size(Some(vec2(1920.0, 1080.0)), 0.8);
        assert_eq!(size, vec2(1536.0, 864.0));
        assert_eq!(initial_window_size(None, 0.8), vec2(320.0, 240.0));
    }

    #[test]
    fn test_effective_width() {
        assert_eq!(effective_width(Some(vec2(360.0, 800.0)), 1000.0), 360.0);
        assert_eq!(effective_width(Some(vec2(1920.0, 1080.0)), 350.0), 350.0);
        assert_eq!(effective_width(None, 640.0), 640.0);
    }
}

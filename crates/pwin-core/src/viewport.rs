#![forbid(unsafe_code)]

//! Viewport signals supplied by the hosting surface.

/// Scroll position and size of the hosting viewport, along the scroll axis.
///
/// `cross_size` is the extent perpendicular to scrolling (width for a
/// vertical gallery); grid layouts use it to decide items per row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Distance scrolled from the top of the content.
    pub scroll_offset: f64,
    /// Visible extent along the scroll axis.
    pub size: f64,
    /// Visible extent across the scroll axis.
    pub cross_size: f64,
}

impl Viewport {
    /// Create a viewport at offset zero.
    #[must_use]
    pub const fn new(size: f64, cross_size: f64) -> Self {
        Self {
            scroll_offset: 0.0,
            size,
            cross_size,
        }
    }

    /// Offset of the trailing edge (`scroll_offset + size`).
    #[must_use]
    pub fn end(&self) -> f64 {
        self.scroll_offset + self.size
    }
}

/// A discrete change reported by the hosting surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportSignal {
    /// The scroll offset changed.
    Scroll {
        /// New scroll offset.
        offset: f64,
    },
    /// The viewport was resized.
    Resize {
        /// New extent along the scroll axis.
        size: f64,
        /// New extent across the scroll axis.
        cross_size: f64,
    },
}

/// Replace non-finite or negative values with zero.
#[inline]
#[must_use]
pub fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_adds_size() {
        let mut vp = Viewport::new(300.0, 800.0);
        vp.scroll_offset = 150.0;
        assert_eq!(vp.end(), 450.0);
    }

    #[test]
    fn sanitize_rejects_nan_and_negative() {
        assert_eq!(sanitize_extent(f64::NAN), 0.0);
        assert_eq!(sanitize_extent(-4.0), 0.0);
        assert_eq!(sanitize_extent(f64::INFINITY), 0.0);
        assert_eq!(sanitize_extent(12.5), 12.5);
    }
}

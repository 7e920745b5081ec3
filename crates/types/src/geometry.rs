use serde::{Deserialize, Serialize};

/// A point in page space. The origin is the top-left corner and `y` grows
/// downward; containers flip to their native coordinate system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Builds a rectangle from two opposite corners.
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// US Letter, the size used when a page carries no usable MediaBox.
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self::all(54.0)
    }
}

impl Margins {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// The physical page a TOC is laid out on: its size plus the margins the
/// TOC content must respect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub size: Size,
    pub margins: Margins,
}

impl PageGeometry {
    pub fn new(size: Size, margins: Margins) -> Self {
        Self { size, margins }
    }

    /// The lowest baseline a line may sit on before it overflows.
    pub fn content_bottom(&self) -> f32 {
        self.size.height - self.margins.bottom
    }

    /// The x-coordinate page numbers are right-aligned against.
    pub fn right_edge(&self) -> f32 {
        self.size.width - self.margins.right
    }

    pub fn usable_height(&self) -> f32 {
        self.content_bottom() - self.margins.top
    }

    pub fn usable_width(&self) -> f32 {
        self.right_edge() - self.margins.left
    }
}

//! Value types shared by the host and every module.

use serde::{Deserialize, Serialize};

pub type Int8 = i8;
pub type Int16 = i16;
pub type Int32 = i32;
pub type Int64 = i64;
pub type UInt8 = u8;
pub type UInt16 = u16;
pub type UInt32 = u32;
pub type UInt64 = u64;
pub type Float32 = f32;
pub type Float64 = f64;

pub use glam::{Vec2 as Vector2, Vec3 as Vector3, Vec4 as Vector4};

/// Linear RGBA color. Defaults to opaque white.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Color::new(r, g, b, a)
    }
}

impl From<Color> for [f32; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

/// Axis aligned rectangle in screen space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Initialization order of a module. Lower values load first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ModulePriority {
    Core = 0,
    System = 100,
    Engine = 200,
    Game = 300,
    Ui = 400,
}

impl ModulePriority {
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(ModulePriority::Core),
            100 => Some(ModulePriority::System),
            200 => Some(ModulePriority::Engine),
            300 => Some(ModulePriority::Game),
            400 => Some(ModulePriority::Ui),
            _ => None,
        }
    }

    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_normalize_to_zero_when_degenerate() {
        assert_eq!(Vector2::ZERO.normalize_or_zero(), Vector2::ZERO);
        assert_eq!(Vector3::new(3.0, 4.0, 0.0).length(), 5.0);
        let n = Vector3::new(0.0, 0.0, 2.0).normalize_or_zero();
        assert_eq!(n, Vector3::Z);
    }

    #[test]
    fn rectangle_contains_edges() {
        let rect = Rectangle::new(10.0, 10.0, 5.0, 5.0);
        assert!(rect.contains(Vector2::new(10.0, 10.0)));
        assert!(rect.contains(Vector2::new(15.0, 15.0)));
        assert!(!rect.contains(Vector2::new(15.1, 12.0)));
        assert!(!rect.contains(Vector2::new(9.9, 12.0)));
    }

    #[test]
    fn color_defaults_to_white() {
        assert_eq!(Color::default(), Color::WHITE);
        assert_eq!(Color::rgb(0.1, 0.2, 0.3).a, 1.0);
    }

    #[test]
    fn priority_raw_values() {
        assert_eq!(ModulePriority::from_raw(100), Some(ModulePriority::System));
        assert_eq!(ModulePriority::from_raw(7), None);
        assert!(ModulePriority::Core < ModulePriority::Ui);
    }
}

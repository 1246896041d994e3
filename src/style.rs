//! Pens, brushes and marker symbols forwarded to child renderers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::render::Color;

/// Stroke pattern of a pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PenStyle {
    /// Continuous stroke.
    #[default]
    Solid,
    /// Dashed stroke.
    Dash,
    /// Dotted stroke.
    Dot,
}

/// Outline styling for curves and markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels; zero draws a hairline.
    pub width: f32,
    /// Stroke pattern.
    pub style: PenStyle,
}

impl Pen {
    /// A solid one-pixel pen.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            width: 1.0,
            style: PenStyle::Solid,
        }
    }

    /// Replace the stroke width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Replace the stroke pattern.
    pub fn with_style(mut self, style: PenStyle) -> Self {
        self.style = style;
        self
    }
}

impl PenStyle {
    /// Dash and gap lengths in pixels for a pen of `width`; `None` when solid.
    pub fn dash_pattern(self, width: f32) -> Option<(f32, f32)> {
        let width = width.max(1.0);
        match self {
            Self::Solid => None,
            Self::Dash => Some((4.0 * width, 2.0 * width)),
            Self::Dot => Some((width, 2.0 * width)),
        }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Color::new(0.78, 0.78, 0.78, 1.0))
    }
}

/// Area fill styling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// Fill color.
    pub color: Color,
}

impl Brush {
    /// A solid brush.
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

/// Marker symbol for scatter points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// `o`
    Circle,
    /// `s`
    Square,
    /// `t`, pointing down.
    Triangle,
    /// `d`
    Diamond,
    /// `+`
    Plus,
    /// `x`
    Cross,
    /// `star`
    Star,
}

impl Symbol {
    /// Short code used in option strings.
    pub fn code(self) -> &'static str {
        match self {
            Self::Circle => "o",
            Self::Square => "s",
            Self::Triangle => "t",
            Self::Diamond => "d",
            Self::Plus => "+",
            Self::Cross => "x",
            Self::Star => "star",
        }
    }
}

/// Returned when a symbol code is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown marker symbol `{0}`")]
pub struct UnknownSymbol(pub String);

impl FromStr for Symbol {
    type Err = UnknownSymbol;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(match code {
            "o" => Self::Circle,
            "s" => Self::Square,
            "t" => Self::Triangle,
            "d" => Self::Diamond,
            "+" => Self::Plus,
            "x" => Self::Cross,
            "star" => Self::Star,
            other => return Err(UnknownSymbol(other.to_owned())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_codes_parse_back() {
        for symbol in [
            Symbol::Circle,
            Symbol::Square,
            Symbol::Triangle,
            Symbol::Diamond,
            Symbol::Plus,
            Symbol::Cross,
            Symbol::Star,
        ] {
            assert_eq!(symbol.code().parse::<Symbol>(), Ok(symbol));
        }
        assert_eq!("q".parse::<Symbol>(), Err(UnknownSymbol("q".to_owned())));
    }

    #[test]
    fn pen_builder() {
        let pen = Pen::new(Color::WHITE).with_width(3.0).with_style(PenStyle::Dash);
        assert_eq!(pen.width, 3.0);
        assert_eq!(pen.style, PenStyle::Dash);
        assert_eq!(pen.color, Color::WHITE);
    }
}

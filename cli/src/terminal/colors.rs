use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 137, g: 220, b: 235 };
pub const ACCENT: Color = Color::TrueColor { r: 250, g: 179, b: 135 };
pub const SEPARATOR: Color = Color::TrueColor { r: 108, g: 112, b: 134 };
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 205, g: 214, b: 244 };
pub const IPV4_ADDR: Color = Color::TrueColor { r: 166, g: 227, b: 161 };
pub const MAC_ADDR: Color = Color::TrueColor { r: 249, g: 226, b: 175 };
pub const DEAD: Color = Color::TrueColor { r: 88, g: 91, b: 112 };

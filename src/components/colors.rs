use std::fmt;

/// An 8-bit RGB triple. This is the only color model the editor works in;
/// alpha samples in the buffer are never read or written through it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Text shown in the color label after a successful pick.
    pub fn label(&self) -> String {
        format!("RGB: R={}, G={}, B={}", self.r, self.g, self.b)
    }

    /// `#rrggbb`, used to fill the swatch next to the label.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({}, {}, {})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_and_hex() {
        let c = Rgb::new(12, 34, 255);
        assert_eq!(c.label(), "RGB: R=12, G=34, B=255");
        assert_eq!(c.hex(), "#0c22ff");
        assert_eq!(c.to_string(), "RGB(12, 34, 255)");
    }
}

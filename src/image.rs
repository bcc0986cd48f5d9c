#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn gray(value: u8) -> Rgb {
        Rgb { r: value, g: value, b: value }
    }

    /// `0xRRGGBB`, the layout canvas surfaces expect for a pixel.
    pub fn packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

/// Decoded image, `height` rows of `width` pixels.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize) -> PixelGrid {
        PixelGrid { width, height, pixels: vec!(Rgb::default(); width * height) }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, pixel: Rgb) {
        self.pixels[y * self.width + x] = pixel;
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        self.pixels.chunks(self.width.max(1))
    }

    pub fn to_packed_rgb(&self) -> Vec<u32> {
        self.pixels.iter().map(|p| p.packed()).collect()
    }
}

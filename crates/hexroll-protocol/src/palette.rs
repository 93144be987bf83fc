//! Claimable tile colors.
//!
//! Palette indices are 1-based and always lie in `[1, palette_size]`.

/// An RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PaletteColor {
    pub const OFF: Self = Self { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Same hue at a quarter brightness; used for a losing die.
    pub const fn dimmed(self) -> Self {
        Self {
            r: self.r / 4,
            g: self.g / 4,
            b: self.b / 4,
        }
    }

    /// Evenly spaced fully-saturated hue for `index` of `palette_size`.
    pub fn for_index(index: u8, palette_size: u8) -> Self {
        let size = u32::from(palette_size.max(1));
        let index = u32::from(wrap_index(index, palette_size) - 1);
        // Hue in sixths of the color wheel, scaled by 255.
        let hue = index * 6 * 255 / size;
        let sector = hue / 255;
        let rise = (hue % 255) as u8;
        let fall = 255 - rise;
        match sector {
            0 => Self::new(255, rise, 0),
            1 => Self::new(fall, 255, 0),
            2 => Self::new(0, 255, rise),
            3 => Self::new(0, fall, 255),
            4 => Self::new(rise, 0, 255),
            _ => Self::new(255, 0, fall),
        }
    }
}

/// Next palette entry, wrapping from the last back to the first.
pub fn next_index(index: u8, palette_size: u8) -> u8 {
    let index = wrap_index(index, palette_size);
    if index >= palette_size { 1 } else { index + 1 }
}

/// Bring any index into `[1, palette_size]`.
pub fn wrap_index(index: u8, palette_size: u8) -> u8 {
    let size = palette_size.max(1);
    if index == 0 {
        return 1;
    }
    (index - 1) % size + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wraps_from_last_to_first() {
        assert_eq!(next_index(5, 6), 6);
        assert_eq!(next_index(6, 6), 1);
        assert_eq!(next_index(1, 1), 1);
    }

    #[test]
    fn out_of_range_indices_are_brought_back() {
        assert_eq!(wrap_index(0, 6), 1);
        assert_eq!(wrap_index(7, 6), 1);
        assert_eq!(wrap_index(12, 6), 6);
        assert_eq!(next_index(9, 6), 4);
    }

    #[test]
    fn six_color_wheel() {
        assert_eq!(PaletteColor::for_index(1, 6), PaletteColor::new(255, 0, 0));
        assert_eq!(PaletteColor::for_index(3, 6), PaletteColor::new(0, 255, 0));
        assert_eq!(PaletteColor::for_index(5, 6), PaletteColor::new(0, 0, 255));
    }

    #[test]
    fn distinct_indices_get_distinct_colors() {
        let colors: Vec<_> = (1..=6).map(|i| PaletteColor::for_index(i, 6)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    proptest! {
        #[test]
        fn next_index_stays_in_range(size in 1u8..=49, index in 0u8..=255) {
            let next = next_index(index, size);
            prop_assert!((1..=size).contains(&next));
        }
    }
}

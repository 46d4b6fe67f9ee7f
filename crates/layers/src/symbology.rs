/// Pixel dimensions for a cluster badge at a given leaf count.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BadgeStyle {
    pub width: u32,
    pub height: u32,
    pub size: u32,
    pub font_size: u32,
}

impl BadgeStyle {
    pub const fn new(width: u32, height: u32, size: u32, font_size: u32) -> Self {
        Self {
            width,
            height,
            size,
            font_size,
        }
    }
}

/// Badge sizing table, stepped by leaf count.
pub const fn badge_style(count: usize) -> BadgeStyle {
    if count >= 50 {
        BadgeStyle::new(84, 84, 64, 20)
    } else if count >= 25 {
        BadgeStyle::new(78, 78, 58, 19)
    } else if count >= 15 {
        BadgeStyle::new(72, 72, 54, 18)
    } else if count >= 10 {
        BadgeStyle::new(66, 66, 50, 17)
    } else if count >= 8 {
        BadgeStyle::new(60, 60, 46, 17)
    } else if count >= 4 {
        BadgeStyle::new(54, 54, 40, 16)
    } else {
        BadgeStyle::new(48, 48, 36, 15)
    }
}

#[cfg(test)]
mod tests {
    use super::badge_style;

    #[test]
    fn style_steps_up_with_count() {
        assert_eq!(badge_style(2).width, 48);
        assert_eq!(badge_style(4).width, 54);
        assert_eq!(badge_style(8).width, 60);
        assert_eq!(badge_style(10).width, 66);
        assert_eq!(badge_style(15).width, 72);
        assert_eq!(badge_style(25).width, 78);
        assert_eq!(badge_style(50).width, 84);
        assert_eq!(badge_style(500).width, 84);
    }

    #[test]
    fn font_grows_monotonically() {
        let mut last = 0;
        for count in [2, 4, 8, 10, 15, 25, 50] {
            let style = badge_style(count);
            assert!(style.font_size >= last);
            last = style.font_size;
        }
    }
}

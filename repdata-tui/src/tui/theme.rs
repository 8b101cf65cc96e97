use ratatui::style::Color;

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight: Color,
    pub accent: Color,
    pub muted: Color,
    pub link: Color,
    pub warning: Color,
    pub success: Color,
    pub chart: [Color; 5], // cycled across bars
}

impl Theme {
    /// Near-monochrome with a single accent, the dashboard's default look.
    pub fn lux() -> Self {
        Self {
            bg: Color::Rgb(255, 255, 255),
            fg: Color::Rgb(26, 26, 26),
            highlight: Color::Rgb(26, 26, 26),
            accent: Color::Rgb(85, 89, 92),
            muted: Color::Rgb(145, 145, 145),
            link: Color::Rgb(26, 26, 26),
            warning: Color::Rgb(240, 173, 78),
            success: Color::Rgb(76, 157, 41),
            chart: [
                Color::Rgb(26, 26, 26),
                Color::Rgb(85, 89, 92),
                Color::Rgb(120, 120, 120),
                Color::Rgb(160, 160, 160),
                Color::Rgb(200, 200, 200),
            ],
        }
    }
    pub fn dark() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            link: Color::LightBlue,
            warning: Color::LightYellow,
            success: Color::LightGreen,
            chart: [Color::Cyan, Color::Green, Color::Yellow, Color::Magenta, Color::Blue],
        }
    }
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            highlight: Color::Blue,
            accent: Color::DarkGray,
            muted: Color::Gray,
            link: Color::Blue,
            warning: Color::LightYellow,
            success: Color::Green,
            chart: [Color::Blue, Color::Green, Color::Magenta, Color::Red, Color::DarkGray],
        }
    }
    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(216, 222, 233),
            highlight: Color::Rgb(136, 192, 208),
            accent: Color::Rgb(129, 161, 193),
            muted: Color::Rgb(76, 86, 106),
            link: Color::Rgb(136, 192, 208),
            warning: Color::Rgb(235, 203, 139),
            success: Color::Rgb(163, 190, 140),
            chart: [
                Color::Rgb(136, 192, 208),
                Color::Rgb(129, 161, 193),
                Color::Rgb(163, 190, 140),
                Color::Rgb(235, 203, 139),
                Color::Rgb(180, 142, 173),
            ],
        }
    }
    pub fn colorblind() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            link: Color::Rgb(0x00, 0x80, 0xFF),
            warning: Color::Rgb(0xFF, 0x8C, 0x00), // orange instead of red
            success: Color::Rgb(0x00, 0x80, 0xFF), // blue instead of green
            chart: [
                Color::Rgb(0x00, 0x72, 0xB2),
                Color::Rgb(0xE6, 0x9F, 0x00),
                Color::Rgb(0x56, 0xB4, 0xE9),
                Color::Rgb(0xCC, 0x79, 0xA7),
                Color::Rgb(0x00, 0x9E, 0x73),
            ],
        }
    }
    pub const NAMES: [&'static str; 5] = ["lux", "dark", "light", "nord", "colorblind"];

    /// Name following `name` in [`Theme::NAMES`], wrapping around.
    pub fn next_name(name: &str) -> &'static str {
        let i = Self::NAMES.iter().position(|n| *n == name).unwrap_or(0);
        Self::NAMES[(i + 1) % Self::NAMES.len()]
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            "light" => Self::light(),
            "nord" => Self::nord(),
            "colorblind" => Self::colorblind(),
            _ => Self::lux(),
        }
    }

    pub fn bar_color(&self, i: usize) -> Color {
        self.chart[i % self.chart.len()]
    }
}

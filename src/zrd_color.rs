use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Extends Ratatui's Color with a terminal-capability-aware variant
pub trait WTMatch {
    /// Adjusts the color to the Windows Terminal (Campbell) look
    /// based on the current terminal's color capabilities.
    fn wtmatch(self) -> Color;
}

/// Campbell RGB sample and its stable 256-color index
fn campbell(color: Color) -> Option<((u8, u8, u8), u8)> {
    match color {
        Color::Red => Some(((197, 15, 31), 160)),
        Color::Yellow => Some(((193, 156, 0), 178)),
        Color::Gray => Some(((204, 204, 204), 250)),
        Color::DarkGray => Some(((118, 118, 118), 243)),
        Color::LightRed => Some(((231, 72, 86), 203)),
        _ => None,
    }
}

impl WTMatch for Color {
    fn wtmatch(self) -> Color {
        let Some(((r, g, b), index256)) = campbell(self) else {
            return self;
        };
        let support = ColorSupport::stdout();
        if support.has_16m {
            Color::Rgb(r, g, b)
        } else if support.has_256 {
            Color::Indexed(index256)
        } else {
            self
        }
    }
}

/// Foreground colors used by the board and the game over screen
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub safe: Color,
    pub bonus: Color, // accent
    pub mine: Color,  // alert
    pub game_over: Color,
    pub hint: Color,
}

impl Palette {
    pub fn new(monochrome: bool) -> Self {
        if monochrome {
            return Palette {
                safe: Color::Reset,
                bonus: Color::Reset,
                mine: Color::Reset,
                game_over: Color::Reset,
                hint: Color::Reset,
            };
        }
        Palette {
            safe: Color::Gray.wtmatch(),
            bonus: Color::Yellow.wtmatch(),
            mine: Color::Red.wtmatch(),
            game_over: Color::LightRed.wtmatch(),
            hint: Color::DarkGray.wtmatch(),
        }
    }
}

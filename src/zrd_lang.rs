// Multi-language support module
// Provides localized UI strings for English and Chinese

#[derive(Clone)]
pub struct Assets {
    // Board frame
    pub title: &'static str,
    pub hint_keys: &'static str,

    // Game over screen
    pub game_over: &'static str,
    pub game_over_hint: &'static str,

    // Diagnostics printed after the terminal is restored
    pub log_error_fmt: &'static str, // "Position log disabled: {}"
}

fn english_assets() -> Assets {
    Assets {
        title: "Zero or Dead",
        hint_keys: "Arrows: Move   Q: Quit",
        game_over: "Game Over",
        game_over_hint: "Press any key to exit",
        log_error_fmt: "Position log disabled: {}",
    }
}

fn chinese_assets() -> Assets {
    Assets {
        title: "零或死",
        hint_keys: "方向键：移动   Q：退出",
        game_over: "游戏结束",
        game_over_hint: "按任意键退出",
        log_error_fmt: "位置日志不可用：{}",
    }
}

/// Holds the current language code and active string assets
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Creates a new Lang instance from a language code
    /// Normalizes input (e.g., "zh-CN" → "zh") and defaults to English for unsupported languages
    pub fn new(lang_code: &str) -> Self {
        let code = if lang_code.to_lowercase().starts_with("zh") {
            "zh"
        } else {
            "en"
        };

        Lang {
            current_lang: code.to_string(),
            assets: if code == "zh" {
                chinese_assets()
            } else {
                english_assets()
            },
        }
    }

    /// Fill the single `{}` placeholder of a format asset
    pub fn fill(fmt: &str, value: impl std::fmt::Display) -> String {
        fmt.replacen("{}", &value.to_string(), 1)
    }
}

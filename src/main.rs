// Entry point for the Zero or Dead grid game
// Loads configuration and language settings, then launches the game UI

use std::error::Error;

// Module declarations
mod zrd_color; // Cross-platform color matching utilities
mod zrd_game;  // Grid generation, game state and configuration
mod zrd_lang;  // Multi-language string resources
mod zrd_log;   // Background position logger
mod zrd_ui;    // Terminal UI rendering and event handling

use zrd_game::load_or_create_config;
use zrd_lang::Lang;
use zrd_ui::run as run_ui;

fn main() -> Result<(), Box<dyn Error>> {
    // Load or create user configuration (board size, variant, log file, preferences)
    let cfg = load_or_create_config();

    // Initialize language resources based on saved or system language
    let lang = Lang::new(&cfg.language);

    // Play one game; both quitting and losing exit with status 0
    run_ui(&cfg, &lang)
}

//! Reusable UI fragments shared by every page.

mod main_menu;
mod navbar;

pub use main_menu::MainMenu;
pub use navbar::NavBar;

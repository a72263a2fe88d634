pub mod app;
pub mod document;
pub mod keybindings;
pub mod keybindings_default;
pub mod view;

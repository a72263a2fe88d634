pub mod action;
pub mod clock;
pub mod content;
pub mod fade;
pub mod intro;
pub mod observer;
pub mod page;
pub mod site;
pub mod storage;
pub mod theme;
pub mod tracker;
pub mod ui;

pub mod agent;
pub mod browser;
pub mod errors;
pub mod models;
pub mod page;
pub mod prompt_template;
pub mod providers;
pub mod registry;
pub mod systems;
pub mod webdriver;

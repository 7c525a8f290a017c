#![allow(
    private_interfaces,
    clippy::collapsible_if,
    clippy::too_many_arguments,
    clippy::type_complexity
)]

pub mod app;
pub mod audio;
pub mod battle;
pub mod character;
pub mod combat;
pub mod composition;
pub mod field;
pub mod model;
pub mod scenes;
pub mod services;
pub mod session;
pub mod settings;
pub mod ui;
pub mod vfx;
pub mod world;

pub use app::state::AppState;

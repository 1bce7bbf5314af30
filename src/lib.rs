#![warn(clippy::all, rust_2018_idioms)]

pub mod animation;
pub mod app;
pub mod brush;
pub mod canvas;
pub mod command;
pub mod components;
pub mod element;
pub mod error;
pub mod file_handler;
pub mod id_generator;
pub mod input;
pub mod media;
pub mod panels;
pub mod renderer;
pub mod settings;
pub mod state;
pub mod texture_manager;
pub mod tools;
pub mod ui_state;
pub mod widgets;

pub use app::WhiteboardApp;
pub use brush::{Brush, BrushSettings};
pub use canvas::Canvas;
pub use command::{Command, CommandHistory};
pub use element::{SceneObject, SceneObjectKind};
pub use media::{IncomingFile, MediaImporter};
pub use settings::Settings;
pub use state::EditorModel;
pub use tools::{Tool, ToolState};

pub mod audio;
pub mod codecs;
pub mod command;
pub mod engine;
pub mod error;
pub mod fstools;
pub mod job;
pub mod output_path;
pub mod post_actions;
pub mod probe;
pub mod progress;
pub mod settings;
pub mod supervisor;

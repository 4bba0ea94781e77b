pub mod bulk;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod gallery;
pub mod models;
pub mod selection;
pub mod startup;
pub mod state;
pub mod upload;

pub use error::{GalleryError, Result};

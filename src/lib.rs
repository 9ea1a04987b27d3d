//! Wavefield library - animated point-cloud wave field

pub mod animation;
pub mod camera;
pub mod cli;
pub mod error;
pub mod field;
pub mod heightmap;
pub mod noise;
pub mod params;
pub mod rendering;
pub mod sprite;
pub mod tuning;

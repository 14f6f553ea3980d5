mod manager;
mod media;
pub mod pexels;

pub use manager::BackgroundManager;
pub use media::{find_tick_sound, MusicLibrary, TICK_SOUND_NAMES};
pub use pexels::{select_video_file, PexelsClient};

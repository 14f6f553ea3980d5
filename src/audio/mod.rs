mod duration;

pub use duration::{audio_duration, file_duration, mp3_duration, silent_wav_bytes};

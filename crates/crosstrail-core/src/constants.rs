use std::time::Duration;

// Shared presence/audio tuning constants used by the coordinator and every viewer.

// Trails
pub const MAX_TRAIL_LENGTH: usize = 60; // points kept per participant trail
pub const SEND_RATE: Duration = Duration::from_millis(30); // min spacing of outbound moves

// Participant defaults assigned by the coordinator
pub const SOUND_PROFILE_COUNT: u8 = 6; // soundIndex is drawn from [0, 6)
pub const HUE_RANGE: u16 = 360; // hue is drawn from [0, 360)
pub const OFFSCREEN_POSITION: [f64; 2] = [-10.0, -10.0]; // sentinel until the first move

// Voice levels (decibels) and ducking timings (seconds)
pub const NOMINAL_VOLUME_DB: f32 = -15.0;
pub const DUCK_FLOOR_DB: f32 = -100.0;
pub const DUCK_DROP_SEC: f64 = 0.05;
pub const DUCK_RECOVER_DELAY_SEC: f64 = 0.1;
pub const DUCK_RECOVER_SEC: f64 = 1.0;

// Coordinator transport
pub const DEFAULT_PORT: u16 = 3333;

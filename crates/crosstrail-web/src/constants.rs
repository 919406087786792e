// Front-end tuning constants (audio levels, rendering)

// Audio graph
pub const MASTER_GAIN: f32 = 0.8;
pub const NOTE_PEAK_GAIN: f32 = 0.12; // per oscillator, four per chord
pub const NOTE_STOP_PAD_SEC: f64 = 0.05;
pub const SCHEDULE_LOOKAHEAD_SEC: f64 = 0.05;

// Canvas
pub const BACKGROUND_FADE_ALPHA: f64 = 0.2; // lower = longer ghosting
pub const TRAIL_LINE_WIDTH: f64 = 2.0;
pub const AVATAR_BASE_DIAMETER: f64 = 20.0;
pub const AVATAR_PULSE_AMPLITUDE: f64 = 5.0;
pub const AVATAR_PULSE_RATE: f64 = 0.1; // radians per frame

// Crossing flash around the ducked participant
pub const FLASH_DIAMETER: f64 = 100.0;
pub const FLASH_LINE_WIDTH: f64 = 50.0;
pub const FLASH_FRAMES: u32 = 1;

// Endpoint
pub const WS_PATH: &str = "/ws";
pub const RECONNECT_BASE_MS: u32 = 500;
pub const RECONNECT_MAX_MS: u32 = 10_000;
pub const START_PROMPT: &str = "START";

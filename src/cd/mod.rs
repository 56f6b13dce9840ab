// Red Book CD-DA addressing
pub const FRAMES_PER_SECOND: u64 = 75;
pub const SECONDS_PER_MINUTE: u64 = 60;
pub const FRAMES_PER_MINUTE: u64 = FRAMES_PER_SECOND * SECONDS_PER_MINUTE;

/// Frames of the lead-in pregap that precede LBA 0 on a pressed disc.
pub const LEAD_IN_FRAMES: u64 = 2 * FRAMES_PER_SECOND;

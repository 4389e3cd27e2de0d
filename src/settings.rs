use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const MIN_MAZE_SIZE: usize = 5;
pub const MAX_MAZE_SIZE: usize = 15;
pub const MAX_PUMPKINS: usize = 10;
pub const MAX_MONSTERS: usize = 5;
pub const MAX_MONSTER_SPEED: u64 = 10;
pub const MAX_SAFE_ZONE: usize = 4;

/// Monster tick period at speed 1; higher speeds divide it.
const MONSTER_BASE_INTERVAL_MS: u64 = 1000;

/// Game configuration, sourced from `PUMPKIN_MAZE_*` environment variables
/// and clamped to playable ranges. Treated as immutable for the life of a
/// session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Settings {
    pub maze_width: usize,
    pub maze_height: usize,
    pub num_pumpkins: usize,
    pub num_monsters: usize,
    pub monster_speed: u64,
    pub safe_zone_size: usize,
    pub render_fps: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            maze_width: 10,
            maze_height: 6,
            num_pumpkins: 4,
            num_monsters: 3,
            monster_speed: 2,
            safe_zone_size: 3,
            render_fps: 60,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Settings {
            maze_width: read_clamped(
                "PUMPKIN_MAZE_WIDTH",
                defaults.maze_width,
                MIN_MAZE_SIZE,
                MAX_MAZE_SIZE,
            ),
            maze_height: read_clamped(
                "PUMPKIN_MAZE_HEIGHT",
                defaults.maze_height,
                MIN_MAZE_SIZE,
                MAX_MAZE_SIZE,
            ),
            num_pumpkins: read_clamped(
                "PUMPKIN_MAZE_PUMPKINS",
                defaults.num_pumpkins,
                0,
                MAX_PUMPKINS,
            ),
            num_monsters: read_clamped(
                "PUMPKIN_MAZE_MONSTERS",
                defaults.num_monsters,
                0,
                MAX_MONSTERS,
            ),
            monster_speed: read_clamped(
                "PUMPKIN_MAZE_SPEED",
                defaults.monster_speed,
                1,
                MAX_MONSTER_SPEED,
            ),
            safe_zone_size: read_clamped(
                "PUMPKIN_MAZE_SAFE_ZONE",
                defaults.safe_zone_size,
                1,
                MAX_SAFE_ZONE,
            ),
            render_fps: read_clamped("PUMPKIN_MAZE_FPS", defaults.render_fps, 1, 240),
        }
    }

    /// How long between monster steps: the base interval divided by speed.
    pub fn monster_tick_period(&self) -> Duration {
        Duration::from_millis(MONSTER_BASE_INTERVAL_MS / self.monster_speed)
    }
}

fn read_clamped<T>(name: &str, default: T, min: T, max: T) -> T
where
    T: Copy + Ord + FromStr,
{
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .map(|value| value.clamp(min, max))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_bounds() {
        let settings = Settings::default();
        assert!((MIN_MAZE_SIZE..=MAX_MAZE_SIZE).contains(&settings.maze_width));
        assert!((MIN_MAZE_SIZE..=MAX_MAZE_SIZE).contains(&settings.maze_height));
        assert!(settings.num_pumpkins <= MAX_PUMPKINS);
        assert!(settings.num_monsters <= MAX_MONSTERS);
        assert!((1..=MAX_MONSTER_SPEED).contains(&settings.monster_speed));
        assert!((1..=MAX_SAFE_ZONE).contains(&settings.safe_zone_size));
    }

    #[test]
    fn speed_divides_the_tick_period() {
        let mut settings = Settings::default();
        settings.monster_speed = 1;
        assert_eq!(settings.monster_tick_period(), Duration::from_millis(1000));
        settings.monster_speed = 4;
        assert_eq!(settings.monster_tick_period(), Duration::from_millis(250));
    }

    #[test]
    fn env_values_are_parsed_and_clamped() {
        env::set_var("PUMPKIN_MAZE_WIDTH", "12");
        env::set_var("PUMPKIN_MAZE_HEIGHT", "99");
        env::set_var("PUMPKIN_MAZE_PUMPKINS", "not a number");
        let settings = Settings::from_env();
        assert_eq!(settings.maze_width, 12);
        assert_eq!(settings.maze_height, MAX_MAZE_SIZE);
        assert_eq!(settings.num_pumpkins, Settings::default().num_pumpkins);
        env::remove_var("PUMPKIN_MAZE_WIDTH");
        env::remove_var("PUMPKIN_MAZE_HEIGHT");
        env::remove_var("PUMPKIN_MAZE_PUMPKINS");
    }
}

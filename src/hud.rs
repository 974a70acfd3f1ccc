//! HUD values derived from the game snapshot
//!
//! Drawing happens elsewhere; this module only computes what to draw.

use glam::Vec2;

use crate::Settings;
use crate::driver::Snapshot;
use crate::sim::SpeedLimits;

/// Speed slider hit box in normalized device coordinates
pub const SPEED_SLIDER_LEFT: f32 = -0.4;
pub const SPEED_SLIDER_RIGHT: f32 = 0.4;
pub const SPEED_SLIDER_BOTTOM: f32 = -0.87;
pub const SPEED_SLIDER_TOP: f32 = -0.78;

/// Cap on the speed bar count
pub const MAX_SPEED_BARS: u32 = 15;

/// Seven-segment patterns for 0-9.
///
/// Segment order: top, top-right, bottom-right, bottom, bottom-left,
/// top-left, middle.
pub const SEVEN_SEGMENT: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],
    [false, true, true, false, false, false, false],
    [true, true, false, true, true, false, true],
    [true, true, true, true, false, false, true],
    [false, true, true, false, false, true, true],
    [true, false, true, true, false, true, true],
    [true, false, true, true, true, true, true],
    [true, true, true, false, false, false, false],
    [true, true, true, true, true, true, true],
    [true, true, true, true, false, true, true],
];

/// Segments lit for a single digit
pub fn digit_segments(digit: u8) -> Option<[bool; 7]> {
    SEVEN_SEGMENT.get(usize::from(digit)).copied()
}

/// Digits of `number` with their x positions, centered on `x`
pub fn number_layout(number: u32, x: f32, size: f32) -> Vec<(u8, f32)> {
    let digits: Vec<u8> = number
        .to_string()
        .bytes()
        .map(|b| b - b'0')
        .collect();
    let digit_width = size * 0.8;
    let start_x = x - (digits.len() - 1) as f32 * digit_width * 0.5;
    digits
        .into_iter()
        .enumerate()
        .map(|(i, d)| (d, start_x + i as f32 * digit_width))
        .collect()
}

/// Lid indicator fill in [0, 1], None when there is no sensor
pub fn lid_indicator(angle: f64, sensor_available: bool, settings: &Settings) -> Option<f32> {
    if !sensor_available {
        return None;
    }
    let span = settings.indicator_max_angle - settings.indicator_min_angle;
    Some(((angle - settings.indicator_min_angle) / span).clamp(0.0, 1.0) as f32)
}

/// Speed slider fill in [0, 1]
pub fn speed_fill(speed_multiplier: f32, limits: &SpeedLimits) -> f32 {
    limits.to_slider(speed_multiplier)
}

/// Number of speed bars to draw
pub fn speed_bars(speed_multiplier: f32) -> u32 {
    ((speed_multiplier * 5.0).max(0.0) as u32).min(MAX_SPEED_BARS)
}

/// Window pixel position to normalized device coordinates (y up)
pub fn pointer_to_ndc(px: f64, py: f64, width: u32, height: u32) -> Vec2 {
    let w = f64::from(width.max(1));
    let h = f64::from(height.max(1));
    Vec2::new(
        ((px / w) * 2.0 - 1.0) as f32,
        (1.0 - (py / h) * 2.0) as f32,
    )
}

/// Slider position under the pointer, if it is over the speed slider
pub fn speed_slider_position(ndc: Vec2) -> Option<f32> {
    let inside = (SPEED_SLIDER_BOTTOM..=SPEED_SLIDER_TOP).contains(&ndc.y)
        && (SPEED_SLIDER_LEFT..=SPEED_SLIDER_RIGHT).contains(&ndc.x);
    inside.then(|| (ndc.x - SPEED_SLIDER_LEFT) / (SPEED_SLIDER_RIGHT - SPEED_SLIDER_LEFT))
}

/// One-line console status
pub fn status_line(snapshot: &Snapshot) -> String {
    let ms = &snapshot.match_state;
    if snapshot.game_over() {
        format!(
            "GAME OVER! Final Score: {} hits | Lives: {} | Press SPACE to restart | ESC to quit",
            ms.score(),
            ms.lives
        )
    } else {
        format!(
            "Hits: {} | Lives: {} | Lid: {:.1} degrees | Speed: {:.1}x | Ball: ({:.2},{:.2})",
            ms.score(),
            ms.lives,
            snapshot.sensor_angle,
            ms.speed_multiplier,
            snapshot.ball.pos.x,
            snapshot.ball.pos.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_table() {
        assert_eq!(digit_segments(8), Some([true; 7]));
        assert_eq!(digit_segments(1).unwrap().iter().filter(|s| **s).count(), 2);
        assert_eq!(digit_segments(10), None);
    }

    #[test]
    fn test_number_layout_is_centered() {
        let layout = number_layout(42, 0.0, 0.1);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].0, 4);
        assert_eq!(layout[1].0, 2);
        assert!((layout[0].1 + layout[1].1).abs() < 1e-6);
        assert_eq!(number_layout(0, 0.5, 0.1), vec![(0, 0.5)]);
    }

    #[test]
    fn test_lid_indicator() {
        let settings = Settings::default();
        assert_eq!(lid_indicator(90.0, true, &settings), Some(0.5));
        assert_eq!(lid_indicator(10.0, true, &settings), Some(0.0));
        assert_eq!(lid_indicator(170.0, true, &settings), Some(1.0));
        assert_eq!(lid_indicator(90.0, false, &settings), None);
    }

    #[test]
    fn test_speed_bars() {
        assert_eq!(speed_bars(0.6), 3);
        assert_eq!(speed_bars(3.0), 15);
        assert_eq!(speed_bars(0.2), 1);
    }

    #[test]
    fn test_pointer_over_slider() {
        let ndc = pointer_to_ndc(400.0, 549.0, 800, 600);
        let pos = speed_slider_position(ndc).unwrap();
        assert!((pos - 0.5).abs() < 1e-6);

        let above = pointer_to_ndc(400.0, 300.0, 800, 600);
        assert_eq!(speed_slider_position(above), None);
    }
}

//! Ball/paddle collision detection and response

use glam::Vec2;

use super::state::{Ball, Paddle};
use crate::consts::{MAX_BALL_VY, SPIN_FACTOR};

/// Axis-aligned overlap between a circle's bounding box and a rectangle
///
/// Both axes are tested independently, so corners count as hits. That is
/// generous on purpose for a fast ball against a thin paddle.
pub fn circle_overlaps_rect(center: Vec2, radius: f32, rect_center: Vec2, half: Vec2) -> bool {
    center.x - radius <= rect_center.x + half.x
        && center.x + radius >= rect_center.x - half.x
        && center.y - radius <= rect_center.y + half.y
        && center.y + radius >= rect_center.y - half.y
}

/// Bounce the ball off the paddle if it is hitting the leading face.
///
/// Only a ball travelling toward the paddle (`vx < 0`) counts, so a ball
/// still overlapping after the bounce is not scored twice. The vertical
/// deflection grows with the distance from the paddle center.
///
/// Returns true when a hit was applied.
pub fn resolve_paddle_hit(ball: &mut Ball, paddle: &Paddle) -> bool {
    if !ball.active || ball.vel.x >= 0.0 || !paddle.overlaps(ball) {
        return false;
    }

    ball.vel.x = ball.vel.x.abs();

    let hit_pos = (ball.pos.y - paddle.pos.y) / (paddle.height / 2.0);
    ball.vel.y = (ball.vel.y + hit_pos * SPIN_FACTOR).clamp(-MAX_BALL_VY, MAX_BALL_VY);

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn ball_at(x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        Ball {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            ..Default::default()
        }
    }

    #[test]
    fn test_overlap_edges_touching() {
        let half = Vec2::new(0.5, 0.5);
        assert!(circle_overlaps_rect(Vec2::new(1.0, 0.0), 0.5, Vec2::ZERO, half));
        assert!(!circle_overlaps_rect(Vec2::new(1.1, 0.0), 0.5, Vec2::ZERO, half));
        assert!(!circle_overlaps_rect(Vec2::new(0.0, -1.2), 0.5, Vec2::ZERO, half));
    }

    #[test]
    fn test_center_hit_reverses_without_spin() {
        let paddle = Paddle::default();
        let mut ball = ball_at(PADDLE_X + 0.01, 0.0, -0.8, 0.0);
        assert!(resolve_paddle_hit(&mut ball, &paddle));
        assert_eq!(ball.vel.x, 0.8);
        assert_eq!(ball.vel.y, 0.0);
    }

    #[test]
    fn test_second_check_in_same_spot_is_ignored() {
        let paddle = Paddle::default();
        let mut ball = ball_at(PADDLE_X, 0.0, -0.8, 0.6);
        assert!(resolve_paddle_hit(&mut ball, &paddle));
        assert!(!resolve_paddle_hit(&mut ball, &paddle));
    }

    #[test]
    fn test_edge_hit_adds_clamped_spin() {
        let paddle = Paddle::default();
        // Top edge of the paddle: hit_pos = 1.0
        let mut ball = ball_at(PADDLE_X, PADDLE_HEIGHT / 2.0, -0.8, 0.6);
        assert!(resolve_paddle_hit(&mut ball, &paddle));
        assert_eq!(ball.vel.y, MAX_BALL_VY);

        let mut ball = ball_at(PADDLE_X, -PADDLE_HEIGHT / 4.0, -0.8, 0.0);
        assert!(resolve_paddle_hit(&mut ball, &paddle));
        assert!((ball.vel.y + 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_inactive_ball_never_hits() {
        let paddle = Paddle::default();
        let mut ball = ball_at(PADDLE_X, 0.0, -0.8, 0.0);
        ball.active = false;
        assert!(!resolve_paddle_hit(&mut ball, &paddle));
    }
}

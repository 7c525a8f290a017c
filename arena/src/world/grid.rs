use bevy::prelude::*;

/// Floor grid drawn with gizmos at the current floor height.
#[derive(Resource, Clone, Copy, Debug)]
pub struct FloorGridConfig {
    pub size: f32,
    pub divisions: u32,
    pub center_color: Color,
    pub line_color: Color,
    pub y_offset: f32,
}

impl Default for FloorGridConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            divisions: 50,
            center_color: Color::srgb_u8(0x00, 0xff, 0xff),
            line_color: Color::srgb_u8(0x1a, 0x1a, 0x2e),
            y_offset: 0.01,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLineSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub center: bool,
}

pub fn grid_line_count(divisions: u32) -> usize {
    if divisions == 0 {
        return 0;
    }
    2 * (divisions as usize + 1)
}

/// Lines of a square grid centred on the origin; the two lines through the
/// origin are flagged so they can be highlighted.
pub fn build_grid_segments(floor_y: f32, config: &FloorGridConfig) -> Vec<GridLineSegment> {
    if config.size <= 0.0 || config.divisions == 0 {
        return Vec::new();
    }
    let half = config.size / 2.0;
    let step = config.size / config.divisions as f32;
    let y = floor_y + config.y_offset;
    let middle = config.divisions / 2;
    let mut lines = Vec::with_capacity(grid_line_count(config.divisions));

    for i in 0..=config.divisions {
        let offset = -half + i as f32 * step;
        let center = config.divisions % 2 == 0 && i == middle;
        lines.push(GridLineSegment {
            start: Vec3::new(-half, y, offset),
            end: Vec3::new(half, y, offset),
            center,
        });
        lines.push(GridLineSegment {
            start: Vec3::new(offset, y, -half),
            end: Vec3::new(offset, y, half),
            center,
        });
    }
    lines
}

pub fn draw_floor_grid(gizmos: &mut Gizmos, floor_y: f32, config: &FloorGridConfig) {
    for segment in build_grid_segments(floor_y, config) {
        let color = if segment.center {
            config.center_color
        } else {
            config.line_color
        };
        gizmos.line(segment.start, segment.end, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_spans_the_floor_with_highlighted_axes() {
        let config = FloorGridConfig::default();
        let lines = build_grid_segments(-4.0, &config);
        assert_eq!(lines.len(), grid_line_count(config.divisions));
        assert_eq!(lines.iter().filter(|line| line.center).count(), 2);
        assert!(lines.iter().all(|line| (line.start.y + 3.99).abs() < 1e-5));
        assert_eq!(lines[0].start.x, -50.0);
        assert_eq!(lines[0].end.x, 50.0);
    }

    #[test]
    fn empty_config_draws_nothing() {
        let config = FloorGridConfig {
            divisions: 0,
            ..Default::default()
        };
        assert!(build_grid_segments(0.0, &config).is_empty());
    }
}

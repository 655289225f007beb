/// Upper bound on the device pixel ratio used for backing stores.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Horizontal padding of the scroll container, excluded from fit-width.
pub const CONTAINER_PADDING: f32 = 40.0;

/// Page dimensions in CSS pixels at the current scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// How page zoom is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    Fixed(f32),
    /// Fill the container width (minus padding).
    FitWidth,
}

impl ScaleMode {
    pub fn scale_for(&self, native_width: f32, container_width: f32) -> f32 {
        match *self {
            ScaleMode::Fixed(scale) if scale > 0.0 && scale.is_finite() => scale,
            ScaleMode::Fixed(_) => 1.0,
            ScaleMode::FitWidth => {
                let usable = container_width - CONTAINER_PADDING;
                if usable <= 0.0 || native_width <= 0.0 {
                    1.0
                } else {
                    usable / native_width
                }
            }
        }
    }
}

impl std::str::FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" | "fit" | "page-width" => Ok(ScaleMode::FitWidth),
            other => {
                let (digits, percent) = match other.strip_suffix('%') {
                    Some(d) => (d, true),
                    None => (other, false),
                };
                let value: f32 = digits
                    .parse()
                    .map_err(|_| format!("invalid scale '{other}'"))?;
                let value = if percent { value / 100.0 } else { value };
                if value > 0.0 && value.is_finite() {
                    Ok(ScaleMode::Fixed(value))
                } else {
                    Err(format!("scale must be positive, got '{other}'"))
                }
            }
        }
    }
}

/// Missing, zero or negative ratios fall back to 1; large ones are capped.
pub fn clamp_pixel_ratio(ratio: f32) -> f32 {
    if ratio > 0.0 && ratio.is_finite() {
        ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// A rendered page surface: backing-store size, display size and the drawing
/// operations painted onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub page: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub css_width: u32,
    pub css_height: u32,
    pub pixel_ratio: f32,
    /// Painted with high-quality image smoothing.
    pub smoothing_high: bool,
    pub is_current: bool,
    operations: Vec<String>,
}

impl Canvas {
    pub fn new(page: u32, viewport: Viewport, pixel_ratio: f32) -> Self {
        let ratio = clamp_pixel_ratio(pixel_ratio);
        Self {
            page,
            pixel_width: (viewport.width * ratio).floor() as u32,
            pixel_height: (viewport.height * ratio).floor() as u32,
            css_width: viewport.width.floor() as u32,
            css_height: viewport.height.floor() as u32,
            pixel_ratio: ratio,
            smoothing_high: true,
            is_current: false,
            operations: Vec::new(),
        }
    }

    pub(crate) fn record<'a>(&mut self, operators: impl Iterator<Item = &'a str>) {
        self.operations.extend(operators.map(str::to_string));
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Number of text-showing operations painted.
    pub fn text_runs(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op.as_str(), "Tj" | "TJ" | "'" | "\""))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_is_clamped() {
        assert_eq!(clamp_pixel_ratio(3.0), 2.0);
        assert_eq!(clamp_pixel_ratio(1.5), 1.5);
        assert_eq!(clamp_pixel_ratio(0.0), 1.0);
        assert_eq!(clamp_pixel_ratio(f32::NAN), 1.0);
    }

    #[test]
    fn test_canvas_backing_store_scales_with_ratio() {
        let canvas = Canvas::new(
            1,
            Viewport {
                width: 300.5,
                height: 400.9,
            },
            3.0,
        );
        assert_eq!(canvas.pixel_ratio, 2.0);
        assert_eq!((canvas.pixel_width, canvas.pixel_height), (601, 801));
        assert_eq!((canvas.css_width, canvas.css_height), (300, 400));
        assert!(canvas.smoothing_high);
    }

    #[test]
    fn test_fit_width_excludes_padding() {
        let scale = ScaleMode::FitWidth.scale_for(600.0, 640.0);
        assert!((scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(ScaleMode::FitWidth.scale_for(600.0, 20.0), 1.0);
        assert_eq!(ScaleMode::Fixed(1.5).scale_for(600.0, 640.0), 1.5);
        assert_eq!(ScaleMode::Fixed(-2.0).scale_for(600.0, 640.0), 1.0);
    }

    #[test]
    fn test_scale_mode_parsing() {
        assert_eq!("auto".parse::<ScaleMode>().unwrap(), ScaleMode::FitWidth);
        assert_eq!("page-width".parse::<ScaleMode>().unwrap(), ScaleMode::FitWidth);
        assert_eq!("1.25".parse::<ScaleMode>().unwrap(), ScaleMode::Fixed(1.25));
        assert_eq!("150%".parse::<ScaleMode>().unwrap(), ScaleMode::Fixed(1.5));
        assert!("0".parse::<ScaleMode>().is_err());
        assert!("big".parse::<ScaleMode>().is_err());
    }
}

use foundation::bounds::Aabb2;
use foundation::math::{Vec2, ViewportTransform};
use runtime::Frame;

pub const DEFAULT_SCALE_MIN: f64 = 0.7;
pub const DEFAULT_SCALE_MAX: f64 = 8.0;

/// Duration of the zoom in/out and set-zoom transitions.
const ZOOM_DURATION_S: f64 = 0.5;
/// Duration of the animated fit-and-center transition.
const CENTER_DURATION_S: f64 = 0.75;
/// Wheel delta to zoom-factor exponent rate.
const WHEEL_ZOOM_RATE: f64 = 0.002;

/// In-flight animated transition between two transforms.
///
/// A newer transition simply replaces the current one; the animation
/// always runs toward the latest target, so no cancellation tokens are
/// needed.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Transition {
    from: ViewportTransform,
    to: ViewportTransform,
    duration_s: f64,
    elapsed_s: f64,
}

impl Transition {
    fn sample(&self) -> ViewportTransform {
        let t = (self.elapsed_s / self.duration_s).clamp(0.0, 1.0);
        let e = ease_cubic_in_out(t);
        ViewportTransform::new(
            lerp(self.from.scale, self.to.scale, e),
            Vec2::new(
                lerp(self.from.translate.x, self.to.translate.x, e),
                lerp(self.from.translate.y, self.to.translate.y, e),
            ),
        )
    }

    fn finished(&self) -> bool {
        self.elapsed_s >= self.duration_s
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct PanState {
    last: Vec2,
}

/// Owns the pan/zoom transform.
///
/// Every write path, gesture or programmatic, funnels through this type
/// and the same scale clamp; renderers and hit tests read copies of the
/// transform and never mutate it.
#[derive(Debug, Clone)]
pub struct ViewportController {
    transform: ViewportTransform,
    transition: Option<Transition>,
    pan: Option<PanState>,
    scale_min: f64,
    scale_max: f64,
    width: f64,
    height: f64,
    base_width: f64,
    base_height: f64,
    fullscreen: bool,
}

impl ViewportController {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_scale_range(width, height, DEFAULT_SCALE_MIN, DEFAULT_SCALE_MAX)
    }

    pub fn with_scale_range(width: f64, height: f64, scale_min: f64, scale_max: f64) -> Self {
        Self {
            transform: ViewportTransform::identity(),
            transition: None,
            pan: None,
            scale_min,
            scale_max,
            width: width.max(1.0),
            height: height.max(1.0),
            base_width: width.max(1.0),
            base_height: height.max(1.0),
            fullscreen: false,
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn viewport_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn scale_range(&self) -> (f64, f64) {
        (self.scale_min, self.scale_max)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Advance the active transition, if any.
    pub fn tick(&mut self, frame: Frame) {
        let Some(mut transition) = self.transition.take() else {
            return;
        };
        transition.elapsed_s += frame.dt_s;
        if transition.finished() {
            self.transform = self.clamped(transition.to);
        } else {
            self.transform = self.clamped(transition.sample());
            self.transition = Some(transition);
        }
    }

    pub fn zoom_in(&mut self) {
        self.scale_by(2.0);
    }

    pub fn zoom_out(&mut self) {
        self.scale_by(0.5);
    }

    /// Animate to an absolute zoom level, anchored at the viewport center.
    pub fn set_zoom(&mut self, level: f64) {
        let target = self.anchored_scale(level, self.viewport_center());
        self.animate_to(target, ZOOM_DURATION_S);
    }

    fn scale_by(&mut self, factor: f64) {
        let target = self.anchored_scale(self.transform.scale * factor, self.viewport_center());
        self.animate_to(target, ZOOM_DURATION_S);
    }

    /// Fit the content bounding box (surface space) into the viewport and
    /// center it, immediately or via an animated transition.
    pub fn center(&mut self, content: Aabb2, instant: bool) {
        let (w, h) = (self.width, self.height);
        let bw = content.width().max(1e-9);
        let bh = content.height().max(1e-9);
        let scale = (w / bw).min(h / bh).clamp(self.scale_min, self.scale_max);
        let c = content.center();
        let translate = Vec2::new(w / 2.0 - c.x * scale, h / 2.0 - c.y * scale);
        let target = ViewportTransform::new(scale, translate);

        if instant {
            self.transition = None;
            self.transform = self.clamped(target);
        } else {
            self.animate_to(target, CENTER_DURATION_S);
        }
    }

    /// Wheel/pinch zoom about the pointer position (screen space).
    pub fn wheel(&mut self, pointer: Vec2, delta_y: f64) {
        self.transition = None;
        let factor = (-delta_y * WHEEL_ZOOM_RATE).exp();
        let next = self.anchored_scale(self.transform.scale * factor, pointer);
        self.transform = next;
    }

    pub fn pan_begin(&mut self, pointer: Vec2) {
        self.transition = None;
        self.pan = Some(PanState { last: pointer });
    }

    pub fn pan_move(&mut self, pointer: Vec2) {
        let Some(pan) = &mut self.pan else {
            return;
        };
        let delta = pointer - pan.last;
        pan.last = pointer;
        self.transform.translate = self.transform.translate + delta;
    }

    pub fn pan_end(&mut self) {
        self.pan = None;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        if !self.fullscreen {
            self.base_width = self.width;
            self.base_height = self.height;
        }
    }

    /// Swap the logical viewport dimensions; the caller re-centers after
    /// the new dimensions are applied.
    pub fn set_fullscreen(&mut self, on: bool, screen_width: f64, screen_height: f64) {
        self.fullscreen = on;
        if on {
            self.width = screen_width.max(1.0);
            self.height = screen_height.max(1.0);
        } else {
            self.width = self.base_width;
            self.height = self.base_height;
        }
    }

    fn viewport_center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// New transform with the given scale, keeping `anchor` (screen space)
    /// over the same surface point.
    fn anchored_scale(&self, scale: f64, anchor: Vec2) -> ViewportTransform {
        let clamped = scale.clamp(self.scale_min, self.scale_max);
        let ratio = clamped / self.transform.scale;
        let translate = anchor - (anchor - self.transform.translate).scale(ratio);
        ViewportTransform::new(clamped, translate)
    }

    fn animate_to(&mut self, target: ViewportTransform, duration_s: f64) {
        let target = self.clamped(target);
        if duration_s <= 0.0 {
            self.transition = None;
            self.transform = target;
            return;
        }
        self.transition = Some(Transition {
            from: self.transform,
            to: target,
            duration_s,
            elapsed_s: 0.0,
        });
    }

    fn clamped(&self, t: ViewportTransform) -> ViewportTransform {
        ViewportTransform::new(t.scale.clamp(self.scale_min, self.scale_max), t.translate)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 2.0 * t - 2.0;
        0.5 * u * u * u + 1.0
    }
}

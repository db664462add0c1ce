use std::f64::consts::TAU;

use radarview::layout::Point;
use radarview::render::{surface_size, Painter};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// [`Painter`] over a 2D canvas context.
pub(super) struct CanvasPainter {
    canvas: web_sys::HtmlCanvasElement,
    ctx: web_sys::CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub(super) fn new(canvas: web_sys::HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| "canvas: get_context threw".to_string())?
            .ok_or("canvas: missing 2d context".to_string())?
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .map_err(|_| "canvas: context is not 2d".to_string())?;
        ctx.set_text_align("center");
        Ok(Self { canvas, ctx })
    }

    /// Size the backing store to the parent element minus `padding`.
    pub(super) fn fit_to_container(&self, padding: f64) -> Result<(u32, u32), String> {
        let parent = self
            .canvas
            .parent_element()
            .ok_or("canvas: not attached to a container".to_string())?;
        let (w, h) = surface_size(
            parent.client_width() as f64,
            parent.client_height() as f64,
            padding,
        );
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        // Resizing resets the context state.
        self.ctx.set_text_align("center");
        Ok((w, h))
    }

    fn circle_path(&self, center: Point, radius: f64) -> bool {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x, center.y, radius.max(0.0), 0.0, TAU)
            .is_ok()
    }
}

#[allow(deprecated)]
impl Painter for CanvasPainter {
    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ctx.set_fill_style(&JsValue::from_str(color));
        self.ctx.fill_rect(x, y, w, h);
    }

    fn line(&mut self, from: Point, to: Point, color: &str, width: f64) {
        self.ctx.set_stroke_style(&JsValue::from_str(color));
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: &str) {
        if self.circle_path(center, radius) {
            self.ctx.set_fill_style(&JsValue::from_str(color));
            self.ctx.fill();
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, width: f64) {
        if self.circle_path(center, radius) {
            self.ctx.set_stroke_style(&JsValue::from_str(color));
            self.ctx.set_line_width(width);
            self.ctx.stroke();
        }
    }

    fn fill_triangle(&mut self, a: Point, b: Point, c: Point, color: &str) {
        self.ctx.begin_path();
        self.ctx.move_to(a.x, a.y);
        self.ctx.line_to(b.x, b.y);
        self.ctx.line_to(c.x, c.y);
        self.ctx.close_path();
        self.ctx.set_fill_style(&JsValue::from_str(color));
        self.ctx.fill();
    }

    fn text(&mut self, text: &str, at: Point, font: &str, color: &str) {
        self.ctx.set_font(font);
        self.ctx.set_fill_style(&JsValue::from_str(color));
        let _ = self.ctx.fill_text(text, at.x, at.y);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
    }

    fn set_line_dash(&mut self, dash: &[f64]) {
        let segments = js_sys::Array::new();
        for d in dash {
            segments.push(&JsValue::from_f64(*d));
        }
        let _ = self.ctx.set_line_dash(&segments);
    }
}

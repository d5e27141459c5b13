//! Pre-rendered sprite cache
//!
//! Entity sprites are drawn once into offscreen canvases at startup and
//! blitted each frame, so the per-frame path never re-traces glow shapes.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::consts::*;
use crate::sim::{InvaderTier, UpgradeKind};

use super::palette;

pub struct SpriteCache {
    sprites: HashMap<String, HtmlCanvasElement>,
}

impl SpriteCache {
    /// Pre-render every invader tier and upgrade orb
    pub fn new(document: &Document) -> Result<Self, wasm_bindgen::JsValue> {
        let mut cache = Self {
            sprites: HashMap::new(),
        };

        for (tier, key) in [
            (InvaderTier::Grunt, "invader_grunt"),
            (InvaderTier::Soldier, "invader_soldier"),
            (InvaderTier::Elite, "invader_elite"),
        ] {
            cache.pre_render(document, key, INVADER_W, INVADER_H, |ctx, w, h| {
                draw_invader(ctx, w, h, palette::css(tier.color()));
            })?;
        }
        // Bosses reuse the invader silhouette at larger scale
        for (tier, key, scale) in [
            (InvaderTier::MiniBoss, "invader_miniboss", 4.0),
            (InvaderTier::Boss, "invader_boss", 6.0),
        ] {
            cache.pre_render(
                document,
                key,
                INVADER_W * scale,
                INVADER_H * scale,
                |ctx, w, h| {
                    draw_invader(ctx, w, h, palette::css(tier.color()));
                },
            )?;
        }

        for kind in UpgradeKind::ALL {
            let key = format!("upgrade_{}", kind.as_str());
            cache.pre_render(document, &key, UPGRADE_W, UPGRADE_H, |ctx, w, h| {
                draw_upgrade_orb(ctx, w, h, palette::css(kind.color()), kind.glyph());
            })?;
        }

        Ok(cache)
    }

    fn pre_render(
        &mut self,
        document: &Document,
        key: &str,
        w: f32,
        h: f32,
        draw: impl FnOnce(&CanvasRenderingContext2d, f64, f64),
    ) -> Result<(), wasm_bindgen::JsValue> {
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;
        draw(&ctx, w as f64, h as f64);
        self.sprites.insert(key.to_string(), canvas);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&HtmlCanvasElement> {
        self.sprites.get(key)
    }

    pub fn invader_key(tier: InvaderTier) -> &'static str {
        match tier {
            InvaderTier::Grunt => "invader_grunt",
            InvaderTier::Soldier => "invader_soldier",
            InvaderTier::Elite => "invader_elite",
            InvaderTier::MiniBoss => "invader_miniboss",
            InvaderTier::Boss => "invader_boss",
        }
    }
}

/// Blocky crab silhouette with a neon glow
fn draw_invader(ctx: &CanvasRenderingContext2d, w: f64, h: f64, color: &str) {
    let px = w / 12.0;
    let py = h / 8.0;

    ctx.set_shadow_blur(px * 2.0);
    ctx.set_shadow_color(color);
    ctx.set_fill_style_str(color);

    // Body
    ctx.fill_rect(px * 2.0, py * 2.0, px * 8.0, py * 4.0);
    // Eyestalks
    ctx.fill_rect(px * 3.0, py, px * 2.0, py);
    ctx.fill_rect(px * 7.0, py, px * 2.0, py);
    // Legs
    ctx.fill_rect(px, py * 6.0, px * 2.0, py);
    ctx.fill_rect(px * 5.0, py * 6.0, px * 2.0, py);
    ctx.fill_rect(px * 9.0, py * 6.0, px * 2.0, py);

    // Dark eyes punched out of the body
    ctx.set_shadow_blur(0.0);
    ctx.set_fill_style_str("#0d0d14");
    ctx.fill_rect(px * 4.0, py * 3.0, px, py);
    ctx.fill_rect(px * 7.0, py * 3.0, px, py);
}

/// Glowing ring with a single-letter glyph
fn draw_upgrade_orb(ctx: &CanvasRenderingContext2d, w: f64, h: f64, color: &str, glyph: &str) {
    use std::f64::consts::TAU;

    let cx = w / 2.0;
    let cy = h / 2.0;
    let r = w.min(h) / 2.0 - 2.0;

    ctx.set_shadow_blur(6.0);
    ctx.set_shadow_color(color);
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(2.0);
    ctx.begin_path();
    let _ = ctx.arc(cx, cy, r, 0.0, TAU);
    ctx.stroke();

    ctx.set_shadow_blur(0.0);
    ctx.set_fill_style_str(color);
    ctx.set_font("bold 12px monospace");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(glyph, cx, cy + 1.0);
}

impl UpgradeKind {
    /// Single-letter orb label
    fn glyph(self) -> &'static str {
        match self {
            UpgradeKind::Shield => "S",
            UpgradeKind::Double => "D",
            UpgradeKind::Rocket => "R",
            UpgradeKind::Pierce => "P",
            UpgradeKind::Heal => "+",
        }
    }
}

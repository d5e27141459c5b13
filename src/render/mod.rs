//! Canvas2D presentation of a simulation snapshot
//!
//! Purely read-only over [`GameState`]: the renderer owns no game logic, just
//! a context, a sprite cache and the parallax starfield. Visual randomness
//! (shake jitter, star placement) uses `Math.random` and never touches the
//! simulation RNG.

mod sprites;

pub use sprites::SpriteCache;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::Settings;
use crate::consts::*;
use crate::sim::GameState;

/// Palette id -> CSS color mapping shared by sprites and particles
pub mod palette {
    use crate::sim::particles::color;

    pub fn css(id: u32) -> &'static str {
        match id {
            color::PLAYER => "#00f5ff",
            color::INVADER_MID => "#ff00ff",
            color::INVADER_LOW => "#39ff14",
            color::INVADER_TOP => "#ff6600",
            color::BOSS => "#ff0844",
            color::ROCKET => "#ff6600",
            color::FLASH => "#ffffff",
            color::SHIELD => "#00f5ff",
            color::PIERCE => "#ffff00",
            _ => "#ff3366",
        }
    }
}

const BACKGROUND: &str = "#0d0d14";

struct Star {
    x: f64,
    y: f64,
    size: f64,
    speed: f64,
}

/// Three parallax layers, slowest and smallest at the back
fn build_starfield() -> Vec<Star> {
    let layers: [(f64, f64, usize); 3] = [(1.0, 0.5, 50), (2.0, 1.2, 30), (3.0, 2.5, 15)];
    let mut stars = Vec::new();
    for (size, speed, count) in layers {
        for _ in 0..count {
            stars.push(Star {
                x: js_sys::Math::random() * FIELD_W as f64,
                y: js_sys::Math::random() * FIELD_H as f64,
                size,
                speed,
            });
        }
    }
    stars
}

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
    sprites: SpriteCache,
    stars: Vec<Star>,
}

impl Renderer {
    pub fn new(canvas: &HtmlCanvasElement, document: &Document) -> Result<Self, JsValue> {
        canvas.set_width(FIELD_W as u32);
        canvas.set_height(FIELD_H as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        Ok(Self {
            ctx,
            sprites: SpriteCache::new(document)?,
            stars: build_starfield(),
        })
    }

    /// Draw one full frame
    pub fn draw(&mut self, state: &GameState, settings: &Settings) {
        let ctx = &self.ctx;

        ctx.save();
        if state.shake > 0.0 && settings.effective_screen_shake() {
            let dx = (js_sys::Math::random() - 0.5) * state.shake as f64;
            let dy = (js_sys::Math::random() - 0.5) * state.shake as f64;
            let _ = ctx.translate(dx, dy);
        }

        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(-50.0, -50.0, FIELD_W as f64 + 100.0, FIELD_H as f64 + 100.0);

        self.draw_starfield();
        self.draw_invaders(state);
        self.draw_projectiles(state);
        self.draw_rockets(state);
        self.draw_upgrades(state);
        if settings.particles {
            self.draw_particles(state);
        }
        self.draw_player(state);

        if state.debug {
            let ctx = &self.ctx;
            ctx.set_fill_style_str("#ffff00");
            ctx.set_font("12px monospace");
            ctx.set_text_align("left");
            let _ = ctx.fill_text("DEBUG", 8.0, 16.0);
        }

        self.ctx.restore();
    }

    fn draw_starfield(&mut self) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str("#556");
        for star in &mut self.stars {
            star.y += star.speed;
            if star.y > FIELD_H as f64 {
                star.y = 0.0;
                star.x = js_sys::Math::random() * FIELD_W as f64;
            }
            ctx.fill_rect(star.x, star.y, star.size, star.size);
        }
    }

    fn draw_invaders(&self, state: &GameState) {
        let ctx = &self.ctx;
        for inv in &state.invaders {
            let key = SpriteCache::invader_key(inv.tier);
            // Damaged units fade toward the background
            let ratio = 0.45 + 0.55 * (inv.hp.max(0) as f64 / inv.max_hp as f64);
            ctx.set_global_alpha(ratio);
            if let Some(sprite) = self.sprites.get(key) {
                let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
                    sprite,
                    inv.pos.x as f64,
                    inv.pos.y as f64,
                    inv.size.x as f64,
                    inv.size.y as f64,
                );
            } else {
                ctx.set_fill_style_str(palette::css(inv.tier.color()));
                ctx.fill_rect(
                    inv.pos.x as f64,
                    inv.pos.y as f64,
                    inv.size.x as f64,
                    inv.size.y as f64,
                );
            }
            ctx.set_global_alpha(1.0);

            // HP bar under bosses
            if inv.is_boss() {
                let frac = inv.hp.max(0) as f64 / inv.max_hp as f64;
                let y = (inv.pos.y + inv.size.y) as f64 + 4.0;
                ctx.set_fill_style_str("#222");
                ctx.fill_rect(inv.pos.x as f64, y, inv.size.x as f64, 4.0);
                ctx.set_fill_style_str(palette::css(inv.tier.color()));
                ctx.fill_rect(inv.pos.x as f64, y, inv.size.x as f64 * frac, 4.0);
            }
        }
    }

    fn draw_projectiles(&self, state: &GameState) {
        let ctx = &self.ctx;

        ctx.set_shadow_blur(6.0);
        ctx.set_shadow_color(palette::css(crate::sim::particles::color::PLAYER));
        ctx.set_fill_style_str("#affcff");
        for bullet in &state.bullets {
            ctx.fill_rect(
                bullet.pos.x as f64,
                bullet.pos.y as f64,
                BULLET_W as f64,
                BULLET_H as f64,
            );
        }

        ctx.set_shadow_color("#ff0844");
        ctx.set_fill_style_str("#ff88aa");
        for bullet in &state.enemy_bullets {
            ctx.fill_rect(
                bullet.pos.x as f64,
                bullet.pos.y as f64,
                INVADER_BULLET_W as f64,
                INVADER_BULLET_H as f64,
            );
        }
        ctx.set_shadow_blur(0.0);

        // Missiles point along their cached heading
        for missile in &state.boss_missiles {
            ctx.save();
            let cx = (missile.pos.x + BOSS_MISSILE_W / 2.0) as f64;
            let cy = (missile.pos.y + BOSS_MISSILE_H / 2.0) as f64;
            let _ = ctx.translate(cx, cy);
            let _ = ctx.rotate(missile.heading as f64 - std::f64::consts::FRAC_PI_2);
            ctx.set_fill_style_str(palette::css(crate::sim::particles::color::BOSS));
            ctx.fill_rect(
                -(BOSS_MISSILE_W as f64) / 2.0,
                -(BOSS_MISSILE_H as f64) / 2.0,
                BOSS_MISSILE_W as f64,
                BOSS_MISSILE_H as f64,
            );
            ctx.restore();
        }
    }

    fn draw_rockets(&self, state: &GameState) {
        let ctx = &self.ctx;
        let rocket_color = palette::css(crate::sim::particles::color::ROCKET);

        for rocket in &state.rockets {
            // Target crosshair
            ctx.set_stroke_style_str(rocket_color);
            ctx.set_line_width(1.0);
            ctx.stroke_rect(
                (rocket.target.x - INVADER_W / 2.0) as f64,
                (rocket.target.y - INVADER_H / 2.0) as f64,
                INVADER_W as f64,
                INVADER_H as f64,
            );

            ctx.save();
            let center = rocket.center();
            let _ = ctx.translate(center.x as f64, center.y as f64);
            let _ = ctx.rotate(
                (rocket.vel.y.atan2(rocket.vel.x) + std::f32::consts::FRAC_PI_2) as f64,
            );
            ctx.set_fill_style_str(rocket_color);
            ctx.fill_rect(
                -(ROCKET_W as f64) / 2.0,
                -(ROCKET_H as f64) / 2.0,
                ROCKET_W as f64,
                ROCKET_H as f64,
            );
            ctx.restore();
        }
    }

    fn draw_upgrades(&self, state: &GameState) {
        let ctx = &self.ctx;
        for upgrade in &state.upgrades {
            let key = format!("upgrade_{}", upgrade.kind.as_str());
            if let Some(sprite) = self.sprites.get(&key) {
                let _ = ctx.draw_image_with_html_canvas_element(
                    sprite,
                    upgrade.pos.x as f64,
                    upgrade.pos.y as f64,
                );
            }
        }
    }

    fn draw_particles(&self, state: &GameState) {
        let ctx = &self.ctx;
        for p in state.particles.iter_active() {
            let t = p.life as f64 / p.max_life as f64;
            let size = p.max_size as f64 * (1.0 - t);
            if size < 0.5 {
                continue;
            }
            ctx.set_global_alpha(1.0 - t);
            ctx.set_fill_style_str(palette::css(p.color));
            ctx.fill_rect(
                p.pos.x as f64 - size / 2.0,
                p.pos.y as f64 - size / 2.0,
                size,
                size,
            );
        }
        ctx.set_global_alpha(1.0);
    }

    fn draw_player(&self, state: &GameState) {
        use std::f64::consts::TAU;

        let ctx = &self.ctx;
        let p = &state.player;
        let color = palette::css(crate::sim::particles::color::PLAYER);

        ctx.set_shadow_blur(10.0);
        ctx.set_shadow_color(color);
        ctx.set_fill_style_str(color);
        // Hull triangle with a wide base
        ctx.begin_path();
        ctx.move_to((p.pos.x + PLAYER_W / 2.0) as f64, p.pos.y as f64);
        ctx.line_to(p.pos.x as f64, (p.pos.y + PLAYER_H) as f64);
        ctx.line_to((p.pos.x + PLAYER_W) as f64, (p.pos.y + PLAYER_H) as f64);
        ctx.close_path();
        ctx.fill();
        ctx.set_shadow_blur(0.0);

        if state.shield_hits > 0 {
            let center = p.center();
            ctx.set_stroke_style_str(palette::css(crate::sim::particles::color::SHIELD));
            ctx.set_line_width(2.0);
            ctx.begin_path();
            let _ = ctx.arc(
                center.x as f64,
                center.y as f64,
                PLAYER_W as f64 * 0.75,
                0.0,
                TAU,
            );
            ctx.stroke();
        }
    }
}

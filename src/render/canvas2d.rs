//! Canvas 2D tile renderer
//!
//! Sprites are plain `<img>` elements named after `sprite_key`. Until one has
//! finished loading (or if it never does) the tile is drawn as a palette circle.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::{TileCanvas, TileSprite, fallback_color, sprite_key};

const SELECTION_COLOR: &str = "#ffffff";
const SELECTION_WIDTH: f64 = 3.0;
const BACKGROUND_COLOR: &str = "#1d2b3a";

pub struct Canvas2dRenderer {
    ctx: CanvasRenderingContext2d,
    /// Added to every tile position (board placement on the canvas)
    offset: Vec2,
    sprites: HashMap<String, HtmlImageElement>,
    /// Keys already reported as missing
    missing: HashSet<String>,
}

impl Canvas2dRenderer {
    pub fn new(ctx: CanvasRenderingContext2d, offset: Vec2) -> Self {
        Self {
            ctx,
            offset,
            sprites: HashMap::new(),
            missing: HashSet::new(),
        }
    }

    /// Start loading `<base_url>/tile_<i>.png` for every color
    pub fn load_sprites(&mut self, base_url: &str, colors: u8) -> Result<(), JsValue> {
        let base = base_url.trim_end_matches('/');
        for color in 0..colors {
            let key = sprite_key(color);
            let img = HtmlImageElement::new()?;
            img.set_src(&format!("{base}/{key}.png"));
            self.sprites.insert(key, img);
        }
        log::info!("Loading {} tile sprites from {}", colors, base);
        Ok(())
    }

    /// Paint the background over the whole canvas
    pub fn clear(&self, width: f64, height: f64) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_str(BACKGROUND_COLOR);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn ready_sprite(&mut self, color: u8) -> Option<&HtmlImageElement> {
        let key = sprite_key(color);
        let ready = self
            .sprites
            .get(&key)
            .is_some_and(|img| img.complete() && img.natural_width() > 0);
        if !ready {
            if self.missing.insert(key.clone()) {
                log::warn!("Sprite {} not available, drawing fallback", key);
            }
            return None;
        }
        self.sprites.get(&key)
    }

    fn draw_circle(&self, color: u8, center: Vec2, radius: f64) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius, 0.0, TAU)?;
        self.ctx.set_fill_style_str(fallback_color(color));
        self.ctx.fill();
        Ok(())
    }

    fn draw_selection(&self, center: Vec2, size: f64) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx.arc(
            center.x as f64,
            center.y as f64,
            size / 2.0 - SELECTION_WIDTH / 2.0,
            0.0,
            TAU,
        )?;
        self.ctx.set_stroke_style_str(SELECTION_COLOR);
        self.ctx.set_line_width(SELECTION_WIDTH);
        self.ctx.stroke();
        Ok(())
    }

    fn try_draw_tile(&mut self, sprite: &TileSprite) -> Result<(), JsValue> {
        let center = sprite.center() + self.offset;
        let drawn = sprite.drawn_size() as f64;
        let corner = center - Vec2::splat(sprite.drawn_size() / 2.0);

        self.ctx.set_global_alpha(sprite.alpha.clamp(0.0, 1.0) as f64);
        let img = self.ready_sprite(sprite.color).cloned();
        match img {
            Some(img) => self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                &img,
                corner.x as f64,
                corner.y as f64,
                drawn,
                drawn,
            )?,
            None => self.draw_circle(sprite.color, center, drawn * 0.45)?,
        }
        if sprite.selected {
            self.draw_selection(center, sprite.size as f64)?;
        }
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }
}

impl TileCanvas for Canvas2dRenderer {
    fn draw_tile(&mut self, sprite: &TileSprite) {
        if let Err(e) = self.try_draw_tile(sprite) {
            log::warn!("Tile draw failed: {:?}", e);
        }
    }
}

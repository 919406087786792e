use std::f64::consts::TAU;

use crosstrail_core::{AudioEngine, ClientSession, ParticipantId};
use web_sys as web;

use crate::constants::*;
use crate::style::{avatar_diameter, hsb_css};

/// White ring drawn around a participant whose sound was just ducked.
pub struct Flash {
    pub id: ParticipantId,
    pub frames_left: u32,
}

/// Draws one frame. Reads the session only.
pub fn draw_frame<A: AudioEngine>(
    ctx: &web::CanvasRenderingContext2d,
    session: &ClientSession<A>,
    flashes: &mut Vec<Flash>,
    frame: u64,
) {
    let vp = session.viewport();
    let (w, h) = (vp.width as f64, vp.height as f64);

    ctx.set_fill_style_str(&hsb_css(240.0, 0.0, 10.0, BACKGROUND_FADE_ALPHA));
    ctx.fill_rect(0.0, 0.0, w, h);

    if !session.audio_started() {
        ctx.set_fill_style_str("white");
        ctx.set_font("20px sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text(START_PROMPT, w / 2.0, h / 2.0);
        return;
    }

    let me = session.self_id();
    ctx.set_line_width(TRAIL_LINE_WIDTH);
    for (id, trail) in session.trails().iter() {
        let Some(user) = session.mirror().get(id) else {
            continue;
        };
        if trail.len() < 2 {
            continue;
        }
        ctx.set_stroke_style_str(&hsb_css(user.hue as f64, 80.0, 90.0, 1.0));
        ctx.begin_path();
        let own = Some(id) == me;
        for (i, p) in trail.iter().enumerate() {
            let p = if own { p } else { vp.denormalize(p) };
            if i == 0 {
                ctx.move_to(p.x as f64, p.y as f64);
            } else {
                ctx.line_to(p.x as f64, p.y as f64);
            }
        }
        ctx.stroke();
    }

    let diameter = avatar_diameter(
        frame,
        AVATAR_BASE_DIAMETER,
        AVATAR_PULSE_AMPLITUDE,
        AVATAR_PULSE_RATE,
    );
    for (id, user) in session.mirror().iter() {
        if Some(id) == me {
            continue;
        }
        let p = vp.denormalize(user.position());
        ctx.set_fill_style_str(&hsb_css(user.hue as f64, 100.0, 100.0, 1.0));
        ctx.begin_path();
        let _ = ctx.arc(p.x as f64, p.y as f64, diameter / 2.0, 0.0, TAU);
        ctx.fill();
    }

    ctx.set_stroke_style_str("white");
    ctx.set_line_width(FLASH_LINE_WIDTH);
    for flash in flashes.iter_mut() {
        if let Some(user) = session.mirror().get(&flash.id) {
            let p = vp.denormalize(user.position());
            ctx.begin_path();
            let _ = ctx.arc(p.x as f64, p.y as f64, FLASH_DIAMETER / 2.0, 0.0, TAU);
            ctx.stroke();
        }
        flash.frames_left = flash.frames_left.saturating_sub(1);
    }
    flashes.retain(|f| f.frames_left > 0);
}

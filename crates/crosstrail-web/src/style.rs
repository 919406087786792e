// Pure helpers shared by the renderer and socket setup (no web-sys types).

/// CSS color for an HSB triple (hue 0..360, saturation/brightness 0..100).
pub fn hsb_css(hue: f64, saturation: f64, brightness: f64, alpha: f64) -> String {
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let v = (brightness / 100.0).clamp(0.0, 1.0);
    let l = v * (1.0 - s / 2.0);
    let sl = if l <= 0.0 || l >= 1.0 {
        0.0
    } else {
        (v - l) / l.min(1.0 - l)
    };
    format!(
        "hsla({:.0}, {:.1}%, {:.1}%, {})",
        hue.rem_euclid(360.0),
        sl * 100.0,
        l * 100.0,
        alpha.clamp(0.0, 1.0)
    )
}

/// Avatar diameter breathing with the frame counter.
#[inline]
pub fn avatar_diameter(frame: u64, base: f64, amplitude: f64, rate: f64) -> f64 {
    base + (frame as f64 * rate).sin() * amplitude
}

/// WebSocket URL on the page's own origin.
pub fn websocket_url(page_protocol: &str, host: &str, path: &str) -> String {
    let scheme = if page_protocol == "https:" { "wss" } else { "ws" };
    format!("{}://{}{}", scheme, host, path)
}

/// Reconnect delay for the `attempt`-th retry: doubles from `base_ms`, capped.
pub fn reconnect_delay_ms(attempt: u32, base_ms: u32, max_ms: u32) -> u32 {
    base_ms
        .saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
        .min(max_ms)
}

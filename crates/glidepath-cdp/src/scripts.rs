//! Page-side JavaScript.
//!
//! The `*_FN` constants are function declarations for
//! `Runtime.callFunctionOn`, called with `this` bound to an element. The
//! builders return self-contained expressions for `Runtime.evaluate` with
//! every argument embedded as a JSON literal.

/// Computed `left`, `margin-left`, `transform` and `width` of `this`.
pub const STYLE_FN: &str = r#"function() {
    if (!this.isConnected) throw new Error('element detached');
    const s = getComputedStyle(this);
    return { left: s.left, marginLeft: s.marginLeft, transform: s.transform, width: s.width };
}"#;

/// Same as [`STYLE_FN`] for the parent element, or `null`.
pub const PARENT_STYLE_FN: &str = r#"function() {
    if (!this.isConnected) throw new Error('element detached');
    const p = this.parentElement;
    if (!p) return null;
    const s = getComputedStyle(p);
    return { left: s.left, marginLeft: s.marginLeft, transform: s.transform, width: s.width };
}"#;

pub const RECT_FN: &str = r#"function() {
    if (!this.isConnected) throw new Error('element detached');
    const r = this.getBoundingClientRect();
    return { x: r.x, y: r.y, width: r.width, height: r.height };
}"#;

/// Fire a bubbling `MouseEvent(type)` on `this`.
pub const DISPATCH_FN: &str = r#"function(type, screenX, screenY, clientX, clientY) {
    if (!this.isConnected) throw new Error('element detached');
    this.dispatchEvent(new MouseEvent(type, {
        bubbles: true, cancelable: true, view: window,
        screenX, screenY, clientX, clientY
    }));
}"#;

/// Where `this` gets its pixels from: `{kind: 'data' | 'url', value}` or `null`.
///
/// Canvases are serialised directly, images and inputs use `src`, anything
/// else its CSS background image.
pub const IMAGE_SOURCE_FN: &str = r#"function() {
    if (!this.isConnected) throw new Error('element detached');
    if (this instanceof HTMLCanvasElement) return { kind: 'data', value: this.toDataURL('image/png') };
    let src = '';
    if (this instanceof HTMLImageElement || this instanceof HTMLInputElement) {
        src = this.getAttribute('src') || '';
    } else {
        const m = /url\(["']?(.*?)["']?\)/.exec(getComputedStyle(this).backgroundImage);
        src = m ? m[1] : '';
    }
    src = src.replace(/\r?\n/g, '').replace(/%0D%0A/gi, '');
    if (!src) return null;
    if (src.startsWith('data:')) return { kind: 'data', value: src };
    return { kind: 'url', value: new URL(src, document.baseURI).href };
}"#;

/// Expression yielding the first element matching `selector` when it is
/// rendered and visible, otherwise `null`.
pub fn query_visible(selector: &str) -> String {
    format!(
        r#"(() => {{
    const el = document.querySelector({selector});
    if (!el || !el.isConnected) return null;
    const r = el.getBoundingClientRect();
    const s = getComputedStyle(el);
    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none' ? el : null;
}})()"#,
        selector = js_string(selector)
    )
}

const NOTICE_ID: &str = "glidepath-notice";

/// Expression showing `message` in a fixed overlay for `duration_ms`.
///
/// A newer notice replaces an older one.
pub fn show_notice(message: &str, duration_ms: u128) -> String {
    format!(
        r#"(() => {{
    const old = document.getElementById({id});
    if (old) old.remove();
    const el = document.createElement('div');
    el.id = {id};
    el.textContent = {message};
    Object.assign(el.style, {{
        position: 'fixed', top: '16px', left: '50%', transform: 'translateX(-50%)',
        zIndex: '2147483647', padding: '8px 16px', borderRadius: '4px',
        background: 'rgba(0, 0, 0, 0.75)', color: '#fff', font: '14px sans-serif',
        pointerEvents: 'none'
    }});
    (document.body || document.documentElement).appendChild(el);
    setTimeout(() => el.remove(), {duration_ms});
}})()"#,
        id = js_string(NOTICE_ID),
        message = js_string(message),
    )
}

/// A JSON string literal is a valid JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

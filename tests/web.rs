// Browser tests for the canvas path. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use piano_tiles::render::{self, Renderer};
use piano_tiles::web::{self, CanvasRenderer};
use piano_tiles::GameError;
use piano_tiles::Point2;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::js_sys::Promise;
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

wasm_bindgen_test_configure!(run_in_browser);

fn canvas_context(w: u32, h: u32) -> CanvasRenderingContext2d {
    let doc = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = doc.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_width(w);
    canvas.set_height(h);
    canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap()
}

#[wasm_bindgen_test]
fn fill_rect_paints_the_given_colour() {
    let ctx = canvas_context(50, 50);
    let mut r = CanvasRenderer::new(ctx.clone());
    r.fill_rect(Point2::new(10.0, 10.0), "rgb(255, 0, 0)", Point2::new(5.0, 5.0));
    let px = ctx.get_image_data(12.0, 12.0, 1.0, 1.0).unwrap().data();
    assert_eq!(&px[..], &[255, 0, 0, 255]);
    let outside = ctx.get_image_data(0.0, 0.0, 1.0, 1.0).unwrap().data();
    assert_eq!(outside[3], 0);
}

#[wasm_bindgen_test]
fn loading_screen_covers_the_canvas() {
    let ctx = canvas_context(40, 40);
    let mut r = CanvasRenderer::new(ctx.clone());
    render::draw_loading(&mut r, Point2::new(40.0, 40.0));
    let px = ctx.get_image_data(1.0, 1.0, 1.0, 1.0).unwrap().data();
    assert_eq!(px[3], 255);
}

#[wasm_bindgen_test]
async fn rejected_play_promise_surfaces_as_error() {
    let blocked = Promise::reject(&JsValue::from_str("NotAllowedError"));
    let err = web::playback_started(blocked).await.unwrap_err();
    assert!(matches!(err, GameError::Host(ref msg) if msg.contains("NotAllowedError")));

    let ok = Promise::resolve(&JsValue::UNDEFINED);
    assert!(web::playback_started(ok).await.is_ok());
}

#![cfg(feature = "recording")]

use std::cell::RefCell;
use std::collections::HashMap;

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{self, FutureExt};

use frames_wasm::gl::{TextureFilter, TextureWrap};
use frames_wasm::recording::{Call, RecordedImage, RecordingGl};
use frames_wasm::texture::{load_all, placeholder, upload_image, TextureOptions};
use frames_wasm::RenderError;

type Fetched = Result<RecordedImage, RenderError>;

fn urls(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn failed(url: &str) -> RenderError {
    RenderError::AssetLoad {
        url: url.to_string(),
        reason: "404".to_string(),
    }
}

#[test]
fn power_of_two_images_get_mipmaps() {
    let gl = RecordingGl::new();
    let texture = upload_image(&gl, &RecordedImage::new(256, 64), TextureOptions::default()).unwrap();
    assert!(texture.mipmapped);
    assert_eq!((texture.width, texture.height), (256, 64));

    let calls = gl.calls();
    assert!(calls.contains(&Call::GenerateMipmap));
    assert!(!calls.iter().any(|c| matches!(c, Call::TexWrap(_))));
    assert!(calls.contains(&Call::TexFilter {
        min: TextureFilter::LinearMipmapLinear,
        mag: TextureFilter::Linear,
    }));
}

#[test]
fn npot_images_clamp_without_mipmaps() {
    let gl = RecordingGl::new();
    let texture = upload_image(&gl, &RecordedImage::new(640, 480), TextureOptions::default()).unwrap();
    assert!(!texture.mipmapped);

    let calls = gl.calls();
    assert!(!calls.contains(&Call::GenerateMipmap));
    assert!(calls.contains(&Call::TexWrap(TextureWrap::ClampToEdge)));
    assert!(calls.contains(&Call::TexFilter {
        min: TextureFilter::Linear,
        mag: TextureFilter::Linear,
    }));
}

#[test]
fn one_power_of_two_side_is_not_enough() {
    let gl = RecordingGl::new();
    let texture = upload_image(&gl, &RecordedImage::new(64, 48), TextureOptions::default()).unwrap();
    assert!(!texture.mipmapped);
}

#[test]
fn sharp_textures_use_nearest_filtering() {
    let gl = RecordingGl::new();
    upload_image(&gl, &RecordedImage::new(32, 32), TextureOptions { sharp: true }).unwrap();
    assert!(gl.calls().contains(&Call::TexFilter {
        min: TextureFilter::Nearest,
        mag: TextureFilter::Nearest,
    }));
}

#[test]
fn placeholder_is_one_blue_pixel() {
    let gl = RecordingGl::new();
    let texture = placeholder(&gl).unwrap();
    assert!(texture.placeholder);
    assert_eq!((texture.width, texture.height), (1, 1));
    assert!(gl.calls().contains(&Call::TexImage { width: 1, height: 1 }));
}

#[test]
fn empty_url_list_resolves_immediately() {
    let gl = RecordingGl::new();
    let fetch = |_: &str| future::pending::<Fetched>();
    let loaded = load_all(&gl, &[], fetch, TextureOptions::default())
        .now_or_never()
        .expect("resolves without waiting");
    assert!(loaded.unwrap().is_empty());
    assert!(gl.calls().is_empty());
}

#[test]
fn a_failed_fetch_becomes_a_placeholder_in_place() {
    let gl = RecordingGl::new();
    let list = urls(&["a.png", "missing.png", "c.png"]);
    let fetch = |url: &str| {
        future::ready(if url.starts_with("missing") {
            Err(failed(url))
        } else {
            Ok(RecordedImage::new(8, 8))
        })
    };

    let textures = block_on(load_all(&gl, &list, fetch, TextureOptions::default())).unwrap();
    assert_eq!(textures.len(), 3);
    let placeholders: Vec<bool> = textures.iter().map(|t| t.placeholder).collect();
    assert_eq!(placeholders, vec![false, true, false]);
}

#[test]
fn a_failed_upload_also_becomes_a_placeholder() {
    let gl = RecordingGl::new();
    let list = urls(&["empty.png"]);
    let fetch = |_: &str| future::ready::<Fetched>(Ok(RecordedImage::new(0, 0)));

    let textures = block_on(load_all(&gl, &list, fetch, TextureOptions::default())).unwrap();
    assert!(textures[0].placeholder);
}

#[test]
fn resolves_only_after_every_fetch_settles_and_keeps_url_order() {
    let gl = RecordingGl::new();
    let list = urls(&["first.png", "second.png", "third.png"]);

    let mut senders = Vec::new();
    let mut receivers = HashMap::new();
    for url in &list {
        let (tx, rx) = oneshot::channel::<Fetched>();
        senders.push(tx);
        receivers.insert(url.clone(), rx);
    }
    let receivers = RefCell::new(receivers);
    let fetch = |url: &str| {
        let rx = receivers.borrow_mut().remove(url).expect("url requested once");
        let url = url.to_string();
        async move { rx.await.unwrap_or_else(|_| Err(failed(&url))) }
    };

    let mut loading = Box::pin(load_all(&gl, &list, fetch, TextureOptions::default()));
    assert!((&mut loading).now_or_never().is_none());

    let mut senders = senders.into_iter();
    let (first, second, third) = (senders.next().unwrap(), senders.next().unwrap(), senders.next().unwrap());

    // settle out of order: third, then a failure for first, then second
    third.send(Ok(RecordedImage::new(4, 4))).ok();
    assert!((&mut loading).now_or_never().is_none());
    first.send(Err(failed("first.png"))).ok();
    assert!((&mut loading).now_or_never().is_none());
    second.send(Ok(RecordedImage::new(2, 2))).ok();

    let textures = (&mut loading).now_or_never().expect("all settled").unwrap();
    let sizes: Vec<(u32, u32)> = textures.iter().map(|t| (t.width, t.height)).collect();
    assert_eq!(sizes, vec![(1, 1), (2, 2), (4, 4)]);
    assert!(textures[0].placeholder);
}

#[test]
fn placeholder_allocation_failure_is_returned() {
    let gl = RecordingGl::new();
    gl.lose_context();
    let list = urls(&["a.png"]);
    let fetch = |url: &str| future::ready::<Fetched>(Err(failed(url)));

    let err = block_on(load_all(&gl, &list, fetch, TextureOptions::default())).err().expect("must fail");
    assert!(matches!(err, RenderError::Allocation("texture")));
}

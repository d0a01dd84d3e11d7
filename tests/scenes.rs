#![cfg(feature = "recording")]

use frames_wasm::animation::Direction;
use frames_wasm::config::RendererConfig;
use frames_wasm::frame::{DrawCall, FrameRenderer};
use frames_wasm::geometry::Channel;
use frames_wasm::recording::{Call, RecordedImage, RecordingGl};
use frames_wasm::scene::{Scene, SceneKind};
use frames_wasm::texture::{upload_image, TextureOptions};
use frames_wasm::RenderError;

fn scene(gl: &RecordingGl, kind: SceneKind) -> Scene<RecordingGl> {
    match Scene::new(gl, kind) {
        Ok(scene) => scene,
        Err(err) => panic!("{kind:?} failed to build: {err}"),
    }
}

#[test]
fn every_builtin_scene_compiles() {
    let gl = RecordingGl::new();
    for kind in [
        SceneKind::WhiteQuad,
        SceneKind::ColorQuad,
        SceneKind::IndexedColorQuad,
        SceneKind::TexturedQuad,
        SceneKind::SpriteBatches,
    ] {
        scene(&gl, kind);
    }
}

#[test]
fn white_quad_is_static() {
    let gl = RecordingGl::new();
    let mut white = scene(&gl, SceneKind::WhiteQuad);
    assert!(!white.kind().is_animated());
    let renderer = FrameRenderer::new(&gl, [0.0, 0.0, 0.0, 1.0]);
    gl.take_calls();

    let draws = white.render(&renderer, 0.0).unwrap();
    assert_eq!(draws, vec![DrawCall::Strip { vertices: 4 }]);
    assert!(!gl.calls().iter().any(|c| matches!(c, Call::BufferDataF32 { .. })));
}

#[test]
fn color_quad_reuploads_colors_each_frame() {
    let gl = RecordingGl::new();
    let mut color = scene(&gl, SceneKind::ColorQuad);
    let renderer = FrameRenderer::new(&gl, [0.0; 4]);

    assert_eq!(color.render(&renderer, 0.0).unwrap(), vec![DrawCall::Strip { vertices: 4 }]);
    assert_eq!(color.oscillator().value, 1.0);

    color.render(&renderer, 0.25).unwrap();
    assert_eq!(color.oscillator().value, 0.75);
    assert_eq!(color.oscillator().direction, Direction::Falling);
    let colors = color.geometry().data(Channel::Color).unwrap();
    assert_eq!(&colors[0..4], &[0.75, 0.25, 1.0, 1.0]);

    let creates = gl.calls().iter().filter(|c| matches!(c, Call::CreateBuffer(_))).count();
    assert_eq!(creates, 2, "position and color buffers are reused across frames");
}

#[test]
fn indexed_color_quad_draws_six_indices() {
    let gl = RecordingGl::new();
    let mut indexed = scene(&gl, SceneKind::IndexedColorQuad);
    let renderer = FrameRenderer::new(&gl, [0.0; 4]);
    assert_eq!(indexed.render(&renderer, 0.016).unwrap(), vec![DrawCall::Indexed { indices: 6 }]);
}

#[test]
fn textured_quad_draws_with_its_texture() {
    let gl = RecordingGl::new();
    let mut textured = scene(&gl, SceneKind::TexturedQuad);
    let texture = upload_image(&gl, &RecordedImage::new(64, 64), TextureOptions::default()).unwrap();
    let handle = texture.handle;
    textured.attach_textures(vec![texture]).unwrap();
    let renderer = FrameRenderer::new(&gl, [0.0; 4]);
    gl.take_calls();

    assert_eq!(textured.render(&renderer, 0.016).unwrap(), vec![DrawCall::Indexed { indices: 6 }]);
    assert!(gl.calls().contains(&Call::BindTexture(handle)));
}

#[test]
fn sprite_batches_issue_three_rebind_and_draw_cycles() {
    let gl = RecordingGl::new();
    let mut sprites = scene(&gl, SceneKind::SpriteBatches);
    let textures = (0..3)
        .map(|_| upload_image(&gl, &RecordedImage::new(32, 32), TextureOptions { sharp: true }).unwrap())
        .collect::<Vec<_>>();
    let handles: Vec<u32> = textures.iter().map(|t| t.handle).collect();
    sprites.attach_textures(textures).unwrap();
    let renderer = FrameRenderer::new(&gl, [0.0; 4]);
    gl.take_calls();

    let draws = sprites.render(&renderer, 0.016).unwrap();
    assert_eq!(
        draws,
        vec![
            DrawCall::Indexed { indices: 6 },
            DrawCall::Indexed { indices: 6 },
            DrawCall::Indexed { indices: 12 },
        ]
    );

    let calls = gl.calls();
    let clears = calls.iter().filter(|c| matches!(c, Call::Clear(_))).count();
    assert_eq!(clears, 1, "one clear per frame");
    let bound: Vec<u32> = calls
        .iter()
        .filter_map(|c| match c {
            Call::BindTexture(id) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(bound, handles);
    assert!(!calls.iter().any(|c| matches!(c, Call::ActiveTexture(unit) if *unit != 0)));
}

#[test]
fn sprite_batches_still_draw_when_textures_are_missing() {
    let gl = RecordingGl::new();
    let mut sprites = scene(&gl, SceneKind::SpriteBatches);
    let renderer = FrameRenderer::new(&gl, [0.0; 4]);
    assert_eq!(sprites.render(&renderer, 0.0).unwrap().len(), 3);
}

#[test]
fn short_texture_list_is_padded_with_placeholders() {
    let gl = RecordingGl::new();
    let mut sprites = scene(&gl, SceneKind::SpriteBatches);
    let texture = upload_image(&gl, &RecordedImage::new(32, 32), TextureOptions { sharp: true }).unwrap();
    let handle = texture.handle;
    sprites.attach_textures(vec![texture]).unwrap();

    let textures = sprites.textures();
    assert_eq!(textures.len(), 3);
    assert!(!textures[0].placeholder);
    assert!(textures[1].placeholder && textures[2].placeholder);

    let renderer = FrameRenderer::new(&gl, [0.0; 4]);
    gl.take_calls();
    sprites.render(&renderer, 0.0).unwrap();

    let calls = gl.calls();
    let mut bound_before_draw = Vec::new();
    let mut last_bound = None;
    for call in &calls {
        match call {
            Call::BindTexture(id) => last_bound = Some(*id),
            c if c.is_draw() => bound_before_draw.push(last_bound.take()),
            _ => {}
        }
    }
    assert_eq!(bound_before_draw.len(), 3);
    assert!(bound_before_draw.iter().all(Option::is_some), "every batch binds its own texture");
    assert_eq!(bound_before_draw[0], Some(handle));
    assert_ne!(bound_before_draw[1], bound_before_draw[2]);
}

#[test]
fn lost_context_fails_the_frame() {
    let gl = RecordingGl::new();
    let mut color = scene(&gl, SceneKind::ColorQuad);
    let renderer = FrameRenderer::new(&gl, [0.0; 4]);
    gl.lose_context();
    assert!(matches!(color.render(&renderer, 0.1), Err(RenderError::Allocation(_))));
}

#[test]
fn config_defaults_when_attribute_missing() {
    let config = RendererConfig::from_attribute(None).unwrap();
    assert_eq!(config, RendererConfig::default());
    assert_eq!(config.scene, SceneKind::ColorQuad);
    assert!(config.texture_urls().is_empty());
    assert_eq!(RendererConfig::from_attribute(Some("  ")).unwrap(), RendererConfig::default());
}

#[test]
fn config_parses_scene_and_overrides() {
    let config = RendererConfig::from_attribute(Some(
        r#"{ "scene": "sprite_batches", "clear_color": [0.1, 0.1, 0.1, 1.0], "log_level": "debug" }"#,
    ))
    .unwrap();
    assert_eq!(config.scene, SceneKind::SpriteBatches);
    assert_eq!(config.texture_urls().len(), 3);
    assert!(config.texture_options().sharp);
    assert_eq!(config.log_level(), log::Level::Debug);

    let config = RendererConfig::from_attribute(Some(
        r#"{ "scene": "textured_quad", "texture_urls": ["a.png", "b.png"], "sharp_textures": true }"#,
    ))
    .unwrap();
    assert_eq!(config.texture_urls(), vec!["a.png".to_string(), "b.png".to_string()]);
    assert!(config.texture_options().sharp);
}

#[test]
fn malformed_config_is_a_fatal_config_error() {
    let err = RendererConfig::from_attribute(Some(r#"{ "scene": "teapot" }"#)).unwrap_err();
    assert!(matches!(err, RenderError::Config(_)));
    assert!(err.is_fatal());

    let err = RendererConfig::from_attribute(Some(r#"{ "scen": "white_quad" }"#)).unwrap_err();
    assert!(matches!(err, RenderError::Config(_)));
}

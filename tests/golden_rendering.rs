use std::fs;
use std::path::PathBuf;

use image::RgbaImage;
use infografia::export::{Artifact, ExportFormat};
use infografia::extract::ExtractPolicy;
use infografia::preview::PreviewPage;
use infografia::rendering::WireframeRasterizer;
use infografia::session::NavigationState;
use infografia::{Rasterizer, Viewport};
use sha2::{Digest, Sha256};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn render_fixture() -> RgbaImage {
    let html = fs::read_to_string("tests/goldens/pages/page1.html").expect("read fixture");
    let page = PreviewPage::new(Some(NavigationState { html }), ExtractPolicy::default());
    let target = page.render_target().expect("target");
    let mut r = WireframeRasterizer::new(Viewport { width: 256, height: 128 });
    r.rasterize(&target, 2.0).expect("rasterize")
}

/// Digest of the raw RGBA pixels, independent of the PNG encoder.
fn pixel_digest(bitmap: &RgbaImage) -> String {
    hex::encode(Sha256::digest(bitmap.as_raw()))
}

#[test]
fn wireframe_output_is_deterministic() {
    let a = Artifact::encode(&render_fixture(), ExportFormat::Png).expect("encode");
    let b = Artifact::encode(&render_fixture(), ExportFormat::Png).expect("encode");
    assert_eq!(a.digest(), b.digest());
}

#[test]
fn fixture_layout_size() {
    // 8 top + section 74 + image 120+8 + rule 2+8 + list items 26+20 + 8 bottom = 274 css px
    let bitmap = render_fixture();
    assert_eq!(bitmap.dimensions(), (512, 548));
}

#[test]
fn golden_raster_matches_fixture() {
    let digest = pixel_digest(&render_fixture());

    let expected_path = golden_path("page1.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, format!("{}\n", digest)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let exp = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(digest, exp.trim());
}

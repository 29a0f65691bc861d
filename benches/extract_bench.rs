use criterion::{criterion_group, criterion_main, Criterion};
use infografia::extract::{extract, ExtractPolicy};
use infografia::rendering::WireframeRasterizer;
use infografia::{Rasterizer, RenderTarget, Viewport};

fn sample_page(blocks: usize) -> String {
    let mut body = String::new();
    for i in 0..blocks {
        body.push_str(&format!(
            "<div class=\"b{i}\"><h2>Section&nbsp;{i}</h2><p>Lorem ipsum dolor sit amet.</p>\
             <img src=\"https://cdn.example.com/{i}.png\" width=\"120\" height=\"80\"></div>"
        ));
    }
    format!(
        "<html><head><style>.b0{{color:red}}</style><link href=\"a.css\" rel=\"stylesheet\"></head><body>{}</body></html>",
        body
    )
}

fn bench_extract(c: &mut Criterion) {
    let html = sample_page(200);
    let cleaning = ExtractPolicy::default();
    let passthrough = ExtractPolicy::passthrough();

    c.bench_function("extract_cleaning", |b| b.iter(|| extract(Some(&html), &cleaning)));
    c.bench_function("extract_passthrough", |b| b.iter(|| extract(Some(&html), &passthrough)));
}

fn bench_wireframe(c: &mut Criterion) {
    let html = sample_page(20);
    let target = RenderTarget {
        document: html,
        selector: "body".to_string(),
    };
    let mut r = WireframeRasterizer::new(Viewport::default());

    c.bench_function("wireframe_rasterize_2x", |b| {
        b.iter(|| r.rasterize(&target, 2.0).unwrap())
    });
}

criterion_group!(benches, bench_extract, bench_wireframe);
criterion_main!(benches);

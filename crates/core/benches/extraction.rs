use criterion::{Criterion, black_box, criterion_group, criterion_main};
use postprep_core::extract_page;

fn load_fixture() -> String {
    std::fs::read_to_string("../../tests/fixtures/blog.html").expect("fixture present")
}

fn bench_extract_page(c: &mut Criterion) {
    let html = load_fixture();

    c.bench_function("extract_page/blog", |b| {
        b.iter(|| extract_page(black_box(&html), black_box("https://bakery.example/blog/sourdough-basics")))
    });

    let large = html.repeat(50);
    c.bench_function("extract_page/blog_x50", |b| {
        b.iter(|| extract_page(black_box(&large), black_box("https://bakery.example/blog/sourdough-basics")))
    });
}

criterion_group!(benches, bench_extract_page);
criterion_main!(benches);

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mindmap_rs_renderer::config::{Config, LayoutConfig};
use mindmap_rs_renderer::ir::{InputNode, parse_note_tree};
use mindmap_rs_renderer::layout::{LayerEdge, LayerNode, LayerOptions, compute_mindmap_layout, layerize};
use mindmap_rs_renderer::render::render_svg;
use mindmap_rs_renderer::theme::{Theme, ThemeId};
use std::hint::black_box;

/// Tree with `branches` first-level children, each `depth` levels deep and
/// `fanout` wide below the first level.
fn generated_tree(branches: usize, fanout: usize, depth: usize) -> InputNode {
    fn grow(label: String, fanout: usize, depth: usize) -> InputNode {
        let children = if depth == 0 {
            Vec::new()
        } else {
            (0..fanout)
                .map(|idx| grow(format!("{label}.{idx} supporting detail"), fanout, depth - 1))
                .collect()
        };
        InputNode::new(label).with_children(children)
    }
    let children = (0..branches)
        .map(|idx| grow(format!("Topic {idx}"), fanout, depth))
        .collect();
    InputNode::new("Central idea").with_children(children)
}

fn fixture(name: &str) -> &'static str {
    match name {
        "photosynthesis" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/photosynthesis.json"
        )),
        "uneven" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/uneven.json"
        )),
        _ => panic!("unknown fixture {name}"),
    }
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for name in ["photosynthesis", "uneven"] {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| {
                let tree = parse_note_tree(black_box(data)).expect("decode failed");
                black_box(tree.map(|tree| tree.node_count()));
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let theme = Theme::light();
    let config = LayoutConfig::default();
    for (branches, fanout, depth) in [(4, 2, 1), (8, 3, 2), (12, 3, 3), (16, 4, 3)] {
        let tree = generated_tree(branches, fanout, depth);
        let name = format!("{}_nodes", tree.node_count());
        group.bench_with_input(BenchmarkId::from_parameter(name), &tree, |b, tree| {
            b.iter(|| {
                let layout = compute_mindmap_layout(Some(black_box(tree)), &theme, &config)
                    .expect("layout failed");
                black_box(layout.width);
            });
        });
    }
    group.finish();
}

fn bench_layerize_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("layerize_chain");
    let options = LayerOptions::default();
    for len in [16usize, 64, 256] {
        let nodes: Vec<LayerNode> = (0..len)
            .map(|idx| LayerNode::new(format!("n{idx}"), 240.0, 60.0))
            .collect();
        let edges: Vec<LayerEdge> = (1..len)
            .map(|idx| LayerEdge::new(format!("n{}", idx / 2), format!("n{idx}")))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                let placements =
                    layerize(black_box(&nodes), black_box(&edges), &options).expect("layerize failed");
                black_box(placements.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    for id in ThemeId::ALL {
        let config = Config::with_theme(id);
        let input = fixture("photosynthesis");
        group.bench_with_input(BenchmarkId::from_parameter(id.as_str()), input, |b, data| {
            b.iter(|| {
                let tree = parse_note_tree(black_box(data)).expect("decode failed");
                let layout = compute_mindmap_layout(tree.as_ref(), &config.theme, &config.layout)
                    .expect("layout failed");
                let svg = render_svg(&layout, &config.theme, &config.render);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_decode, bench_layout, bench_layerize_chain, bench_end_to_end
);
criterion_main!(benches);

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use xpath1::simple_node::{attr, doc, elem, text};
use xpath1::{EvalOptions, SimpleNode, parse};

fn sample_queries() -> Vec<&'static str> {
    vec![
        "1 + 2 * 3",
        "string-length('Lorem ipsum dolor sit amet, consectetur adipiscing elit.')",
        "/root/section/item[@type='a'][position() < 5]/@id",
        "//item[starts-with(@id, 'i1')]",
        "count(//item) + sum(//item/@n)",
    ]
}

fn sample_document() -> SimpleNode {
    let mut root = elem("root");
    for s in 0..10 {
        let mut section = elem("section").attr(attr("s", &s.to_string()));
        for i in 0..20 {
            section = section.child(
                elem("item")
                    .attr(attr("id", &format!("i{s}-{i}")))
                    .attr(attr("type", if i % 2 == 0 { "a" } else { "b" }))
                    .attr(attr("n", &i.to_string()))
                    .child(text("payload")),
            );
        }
        root = root.child(section);
    }
    doc().child(root).build()
}

fn benchmark_parser(c: &mut Criterion) {
    let queries = sample_queries();
    c.bench_function("parser/parse", |b| {
        b.iter(|| {
            for q in &queries {
                let ast = parse(black_box(q)).expect("parse failure");
                black_box(ast);
            }
        })
    });
}

fn benchmark_evaluator(c: &mut Criterion) {
    let queries = sample_queries();
    let document = sample_document();
    let compiled: Vec<_> = queries.iter().map(|q| parse(q).unwrap()).collect();
    c.bench_function("evaluator/evaluate", |b| {
        b.iter(|| {
            let options = EvalOptions::new().with_node(document.clone());
            for xp in &compiled {
                let out = xp.evaluate(black_box(&options)).expect("evaluation failure");
                black_box(out);
            }
        })
    });
}

criterion_group!(benches, benchmark_parser, benchmark_evaluator);
criterion_main!(benches);

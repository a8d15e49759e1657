use arbor_bt::{Condition, ReactiveSequence, Tree};
use arbor_core::{TickContext, Vec2};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_bt_tick(c: &mut Criterion) {
    let mut tree = Tree::new();
    let root = tree.root();
    let seq = tree
        .insert_node(Box::new(ReactiveSequence::default()), Vec2::ZERO)
        .expect("insert sequence");
    tree.link(root, seq).expect("link sequence");
    for _ in 0..32 {
        let id = tree
            .insert_node(Box::new(Condition::new(true)), Vec2::ZERO)
            .expect("insert condition");
        tree.link(seq, id).expect("link condition");
    }

    let mut ctx = TickContext::default();
    c.bench_function("arbor-bt/tick(conditions=32)", |b| {
        b.iter(|| {
            black_box(tree.tick(ctx));
            ctx = ctx.next();
        })
    });
}

criterion_group!(benches, bench_bt_tick);
criterion_main!(benches);

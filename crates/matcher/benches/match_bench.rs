use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use matcher::{Match, Type};
use std::hint::black_box;

#[derive(Clone)]
enum Token {
    Int(i64),
    Float(f64),
    Word(String),
}

fn int() -> Type<Token, i64> {
    Type::new("int", |token| match token {
        Token::Int(n) => Some(n),
        _ => None,
    })
}

fn float() -> Type<Token, f64> {
    Type::new("float", |token| match token {
        Token::Float(x) => Some(x),
        _ => None,
    })
}

/// Benchmark value chains where the matching case sits at increasing depth
fn bench_value_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_chain");

    for depth in [1_u32, 4, 16, 64].iter() {
        group.throughput(Throughput::Elements(u64::from(*depth)));
        group.bench_function(format!("depth_{}", depth), |b| {
            b.iter(|| {
                let mut cases = Match::of(black_box(*depth)).returns::<u32>();
                for candidate in 1..=*depth {
                    cases = cases.when_is(candidate).then(candidate * 2);
                }
                cases.get_or_else(0)
            });
        });
    }

    group.finish();
}

/// Benchmark type dispatch over a closed subject type
fn bench_type_dispatch(c: &mut Criterion) {
    let int = int();
    let float = float();
    let tokens = [
        Token::Int(7),
        Token::Float(0.5),
        Token::Word("casematch".into()),
    ];

    c.bench_function("type_dispatch", |b| {
        b.iter(|| {
            tokens
                .iter()
                .cloned()
                .map(|token| {
                    Match::of(black_box(token))
                        .when_type(&int)
                        .then_apply(|n| *n as f64)
                        .when_type(&float)
                        .then_apply(|x| *x)
                        .otherwise(f64::NAN)
                        .get_or_else(0.0)
                })
                .sum::<f64>()
        });
    });
}

criterion_group!(benches, bench_value_chain, bench_type_dispatch);
criterion_main!(benches);

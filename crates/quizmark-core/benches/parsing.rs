use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmark_core::parser::{parse_questions_str, validate_questions};

fn question_json(n: usize) -> String {
    let records: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"question": "Question {i}?", "options": ["a", "b", "c", "d"], "correct": [{}], "explanation": "Because {i}.", "difficulty": 0.{}}}"#,
                i % 4,
                i % 10
            )
        })
        .collect();
    format!("[{}]", records.join(","))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_questions");

    for n in [10, 100, 1000] {
        let json = question_json(n);
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| parse_questions_str(black_box(&json), "bench.json"))
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let questions = parse_questions_str(&question_json(1000), "bench.json").unwrap();
    c.bench_function("validate_questions/1000", |b| {
        b.iter(|| validate_questions(black_box(&questions)))
    });
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);

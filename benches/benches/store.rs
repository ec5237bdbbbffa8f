// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `tessel_property`: conversion, storage and validation.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use tessel_property::{
    PropertyDefinition, PropertyId, PropertyKind, PropertyOptions, PropertySet, PropertyStore,
    StandardValidator, Value,
};

fn numbered_set(count: u16) -> (PropertySet, Vec<PropertyId>) {
    let mut set = PropertySet::new();
    let ids = (0..count)
        .map(|i| {
            let definition = PropertyDefinition::create(
                &format!("p{i}"),
                Some(PropertyKind::Number),
                PropertyOptions::new().validator(StandardValidator::IsPositive.into()),
            )
            .unwrap();
            set.register(definition).unwrap()
        })
        .collect();
    (set, ids)
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/set");

    for count in [4_u16, 8, 32] {
        let (set, ids) = numbered_set(count);
        group.bench_function(BenchmarkId::new("fill", count), |b| {
            b.iter_batched(
                PropertyStore::new,
                |mut store| {
                    for &id in &ids {
                        let definition = set.get(id).unwrap();
                        black_box(store.set(id, definition, Value::from("12")).unwrap());
                    }
                    black_box(store);
                },
                BatchSize::SmallInput,
            )
        });
    }

    let (set, ids) = numbered_set(8);
    let mut filled = PropertyStore::new();
    for &id in &ids {
        filled.set(id, set.get(id).unwrap(), Value::from(1)).unwrap();
    }
    group.bench_function("unchanged", |b| {
        let id = ids[3];
        let definition = set.get(id).unwrap();
        b.iter_batched(
            || filled.clone(),
            |mut store| black_box(store.set(id, definition, Value::from(1)).unwrap()),
            BatchSize::SmallInput,
        )
    });
    group.finish();

    let mut group = c.benchmark_group("store/read");
    group.bench_function("get", |b| {
        let id = ids[5];
        b.iter(|| black_box(filled.get(black_box(id))))
    });
    group.bench_function("by_name", |b| {
        b.iter(|| black_box(set.by_name(black_box("p5"))))
    });
    group.finish();

    let mut group = c.benchmark_group("store/validate");
    group.bench_function("all_properties", |b| {
        b.iter(|| {
            let mut valid = true;
            for (id, definition) in set.iter() {
                valid &= definition.check_validity(filled.get(id), definition.name()).is_valid();
            }
            black_box(valid)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_store);
criterion_main!(benches);

// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `tessel_model`: bulk assignment, serialization and
//! validation of instances.

use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use tessel_model::{ModelType, PropertyKind, PropertyOptions, StandardValidator};

fn person() -> Arc<ModelType> {
    let company = ModelType::define("Company", |t| {
        t.add_property_with(
            "name",
            PropertyKind::String,
            PropertyOptions::new().validator(StandardValidator::IsFilled.into()),
        )?;
        Ok(())
    })
    .unwrap();
    ModelType::define("Person", |t| {
        t.add_property_with(
            "name",
            PropertyKind::String,
            PropertyOptions::new().validator(StandardValidator::IsFilled.into()),
        )?;
        t.add_property_with(
            "age",
            PropertyKind::Number,
            PropertyOptions::new().validator(StandardValidator::IsPositive.into()),
        )?;
        t.add_property_with(
            "isAlive",
            PropertyKind::Boolean,
            PropertyOptions::new().default_value(true),
        )?;
        t.add_property("tags", PropertyKind::Array)?;
        t.add_property("address", PropertyKind::Object)?;
        t.add_property("employer", company.kind())?;
        Ok(())
    })
    .unwrap()
}

fn bench_model(c: &mut Criterion) {
    let person = person();
    let source = json!({
        "name": "Dupont",
        "age": "42",
        "tags": ["admin", "ops"],
        "address": { "city": "Paris", "zip": null },
        "employer": { "name": "Acme" }
    });

    let mut group = c.benchmark_group("model/assign");
    group.bench_function("create", |b| {
        b.iter(|| black_box(person.create(source.clone()).unwrap()))
    });
    group.bench_function("unserialize", |b| {
        b.iter(|| black_box(person.unserialize(source.clone()).unwrap()))
    });
    let model = person.create(source.clone()).unwrap();
    group.bench_function("update_unchanged", |b| {
        b.iter_batched(
            || model.clone(),
            |mut model| black_box(model.update_value(source.clone()).unwrap()),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("replace_with_listener", |b| {
        b.iter_batched(
            || {
                let mut model = model.clone();
                model.subscribe(|_, event| {
                    black_box(event);
                });
                model
            },
            |mut model| black_box(model.replace_value(json!({ "name": "Durand" })).unwrap()),
            BatchSize::SmallInput,
        )
    });
    group.finish();

    let mut group = c.benchmark_group("model/read");
    group.bench_function("serialize", |b| b.iter(|| black_box(model.serialize())));
    group.bench_function("to_json", |b| b.iter(|| black_box(model.to_json())));
    group.bench_function("check_validity", |b| {
        b.iter(|| black_box(model.check_validity()))
    });
    group.finish();
}

criterion_group!(benches, bench_model);
criterion_main!(benches);

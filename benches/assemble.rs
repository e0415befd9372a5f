use criterion::{black_box, criterion_group, criterion_main, Criterion};

use soil_advisor::{FieldSnapshot, Language, Parameter, ParameterReading, Rulebook, SoilEngine};

fn field(idx: usize) -> FieldSnapshot {
    let shift = (idx % 10) as f64;
    FieldSnapshot {
        field_id: format!("field-{}", idx),
        readings: vec![
            ParameterReading::new(Parameter::Ph, 5.0 + shift * 0.3),
            ParameterReading::new(Parameter::Nitrogen, 70.0 + shift * 12.0),
            ParameterReading::new(Parameter::Phosphorus, 35.0 + shift * 6.0),
            ParameterReading::new(Parameter::Potassium, 120.0 + shift * 15.0),
            ParameterReading::new(Parameter::Moisture, 45.0 + shift * 4.0),
            ParameterReading::new(Parameter::Temperature, 18.0 + shift * 2.0),
            ParameterReading::new(Parameter::Humidity, 55.0 + shift * 3.0),
        ],
    }
}

fn bench_engine(c: &mut Criterion) {
    let engine = SoilEngine::new(Rulebook::builtin().expect("built-in rulebook"));
    let single = field(3);
    let batch: Vec<FieldSnapshot> = (0..1_000).map(field).collect();

    c.bench_function("assemble_one_field", |b| {
        b.iter(|| engine.assemble(black_box(&single.readings), Language::En))
    });

    c.bench_function("feasibility_one_field", |b| {
        b.iter(|| engine.check_feasibility(black_box(&single.readings)))
    });

    c.bench_function("assess_1000_fields", |b| {
        b.iter(|| engine.assess_fields(black_box(&batch), Language::En))
    });
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);

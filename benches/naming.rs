//! Benchmarks for signature decoding and identifier synthesis.
//!
//! - Element and method signature decoding
//! - Method identifier synthesis including referenced class names
//! - Planning and rendering a whole skeleton

extern crate nanometa;

use criterion::{criterion_group, criterion_main, Criterion};
use nanometa::{
    interop::{GeneratorOptions, SkeletonGenerator},
    metadata::{
        assembly::Assembly,
        builder::{AssemblyBuilder, FieldDefBuilder, MethodDefBuilder, TypeDefBuilder},
        header::Version,
        signatures::{decode_element, parse_method_signature, ElementType, MethodSignature},
        tables::{Record, TypeDefRecord, TYPEREF_FLAG},
    },
    naming::{method_identifier, MethodNamer, NamingPolicy},
};
use std::hint::black_box;

/// An image with `types` classes of eight native methods each.
fn sample(types: usize) -> Assembly {
    let mut builder = AssemblyBuilder::new("Bench.Widgets", Version::new(1, 0, 0, 0));
    let mscorlib = builder.assembly_ref("mscorlib", Version::new(1, 0, 0, 0));
    let object = builder.type_ref("System", "Object", mscorlib);

    for index in 0..types {
        let mut type_def = TypeDefBuilder::new("Bench.Widgets", &format!("Gadget{index}"))
            .extends(TYPEREF_FLAG | object)
            .instance_field(FieldDefBuilder::new("_speed", ElementType::I4))
            .static_field(FieldDefBuilder::new("Count", ElementType::U8));

        for method in 0..8u32 {
            let signature = MethodSignature {
                has_this: method % 2 == 0,
                return_type: ElementType::Boolean,
                params: vec![
                    ElementType::I4,
                    ElementType::ByRef(Box::new(ElementType::R8)),
                    ElementType::SzArray(Box::new(ElementType::String)),
                    ElementType::Class(TypeDefRecord::token(0)),
                ],
            };
            type_def =
                type_def.method(MethodDefBuilder::native(&format!("Op{}", method % 4), signature));
        }

        builder.type_def(type_def).unwrap();
    }

    Assembly::from_mem(builder.build().unwrap()).unwrap()
}

/// Benchmark decoding one nested element.
/// Element: BYREF SZARRAY CLASS TypeDef #1
fn bench_decode_element(c: &mut Criterion) {
    let data = [0x14, 0x13, 0x11, 0x80, 0x04];

    c.bench_function("decode_element_nested", |b| {
        b.iter(|| {
            let element = decode_element(black_box(&data), 0).unwrap();
            black_box(element)
        });
    });
}

/// Benchmark decoding a method signature with mixed parameters.
/// Signature: instance bool Method(int, ref double, string[])
fn bench_method_signature(c: &mut Criterion) {
    let data = [0x20, 0x03, 0x01, 0x07, 0x14, 0x0C, 0x13, 0x0F];

    c.bench_function("parse_method_signature_mixed", |b| {
        b.iter(|| {
            let signature = parse_method_signature(black_box(&data)).unwrap();
            black_box(signature)
        });
    });
}

/// Benchmark synthesizing and disambiguating the identifiers of one type.
fn bench_method_identifiers(c: &mut Criterion) {
    let assembly = sample(1);
    let methods: Vec<_> = (0..assembly.method_def_count())
        .map(|index| {
            let method = assembly.method_def(index).unwrap();
            let signature =
                parse_method_signature(assembly.signature(method.sig).unwrap()).unwrap();
            (method, signature)
        })
        .collect();

    c.bench_function("method_identifiers_type", |b| {
        b.iter(|| {
            let mut namer = MethodNamer::new();
            for (method, signature) in &methods {
                let base =
                    method_identifier(&assembly, method, signature, NamingPolicy::Interop).unwrap();
                black_box(namer.disambiguate(base));
            }
        });
    });
}

/// Benchmark rendering the complete skeleton of a 64 type image.
fn bench_render_skeleton(c: &mut Criterion) {
    let assembly = sample(64);
    let mut group = c.benchmark_group("render_skeleton");

    for parallel in [false, true] {
        let options = GeneratorOptions::new("out/Bench_Widgets").parallel(parallel);
        let name = if parallel { "parallel" } else { "sequential" };

        group.bench_function(name, |b| {
            b.iter(|| {
                let skeleton = SkeletonGenerator::new(&options).render(&assembly).unwrap();
                black_box(skeleton)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_element,
    bench_method_signature,
    bench_method_identifiers,
    bench_render_skeleton
);
criterion_main!(benches);

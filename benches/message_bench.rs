use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use spellwire::core::guid::ObjectGuid;
use spellwire::protocol::message::{Message, Opcode};
use spellwire::protocol::spells::cast::{
    SpellCastData, SpellGo, SpellHitInfo, SpellMissReason, SpellMissStatus,
};

fn spell_go(targets: u64) -> Message {
    Message::SpellGo(SpellGo {
        cast: SpellCastData {
            caster: ObjectGuid::new(0x0000_0000_0012_00FF),
            caster_unit: ObjectGuid::new(0x0000_0000_0012_00FF),
            spell_id: 42_208,
            remaining_power: Some(3_000),
            ..Default::default()
        }
        .normalized(),
        hit_info: SpellHitInfo {
            hit_targets: (0..targets)
                .map(|i| ObjectGuid::new(0xF130_0000_0000_0000 | i))
                .collect(),
            miss_status: vec![SpellMissStatus {
                target: ObjectGuid::new(0xF130_0000_0000_FFFF),
                reason: SpellMissReason::Resist,
            }],
        },
    })
}

#[allow(clippy::unwrap_used)]
fn bench_spell_go(c: &mut Criterion) {
    let mut group = c.benchmark_group("spell_go");

    for &targets in &[1u64, 20, 255] {
        let message = spell_go(targets);
        let body = message.encode();
        group.throughput(Throughput::Bytes(body.len() as u64));

        group.bench_function(format!("encode_{targets}_targets"), |b| {
            b.iter_batched(
                || message.clone(),
                |m| black_box(m.encode()),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("decode_{targets}_targets"), |b| {
            b.iter(|| Message::decode(Opcode::SpellGo, black_box(&body)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spell_go);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wire103::{Wire103Read, Wire103Sized, Wire103Write};

pub fn fallible(c: &mut Criterion) {
    #[derive(Copy, Clone, wire103::Wire103ReadWrite)]
    #[repr(u8)]
    enum OneByte {
        Foo = 0x01,
        Bar = 0x02,
        Baz = 0x03,
        Quux = 0xab,
    }

    let input_data = [0xab];

    c.bench_function("enum 1 byte unpack", |b| {
        b.iter(|| OneByte::unpack_from_slice(black_box(&input_data)))
    });

    let instance = OneByte::unpack_from_slice(&input_data).unwrap();

    c.bench_function("enum 1 byte pack array", |b| {
        b.iter(|| black_box(instance.pack()))
    });

    c.bench_function("enum 1 byte pack slice unchecked", |b| {
        b.iter(|| {
            let mut buf = [0u8; 16];

            instance.pack_to_slice_unchecked(black_box(&mut buf));
        })
    });

    c.bench_function("enum 1 byte pack slice checked", |b| {
        b.iter(|| {
            let mut buf = [0u8; 16];

            let _ = instance.pack_to_slice(black_box(&mut buf));
        })
    });
}

criterion_group!(enums, fallible);
criterion_main!(enums);

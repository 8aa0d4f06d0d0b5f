use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgba, RgbaImage};
use qoi::{Channels, Colorspace, Image, Pixel};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_images() -> Vec<(&'static str, Image)> {
    let mut rng = StdRng::seed_from_u64(1);

    let gradient = RgbaImage::from_fn(512, 512, |x, y| {
        Rgba([(x / 2) as u8, (y / 2) as u8, ((x + y) / 4) as u8, 255])
    });
    let flat = RgbaImage::from_fn(512, 512, |x, y| {
        let c = if (x / 64 + y / 64) % 2 == 0 { 30 } else { 220 };
        Rgba([c, c, c, 255])
    });
    let noise = RgbaImage::from_fn(512, 512, |_, _| Rgba(rng.random::<[u8; 4]>()));

    [("gradient", gradient), ("flat", flat), ("noise", noise)]
        .into_iter()
        .map(|(name, img)| {
            let image = Image::from_raw(
                img.width(),
                img.height(),
                Channels::Rgba,
                Colorspace::Srgb,
                img.as_raw(),
            )
            .unwrap();
            (name, image)
        })
        .collect()
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthetic decode");

    for (image_name, image) in bench_images() {
        let pixel_count = image.pixels().len();
        let encoded = qoi::encode(&image);

        group.throughput(criterion::Throughput::Elements(pixel_count as u64));
        group.bench_with_input(BenchmarkId::new("vec", image_name), &encoded, |b, input| {
            let mut output = Vec::with_capacity(pixel_count);
            b.iter(|| {
                output.clear();
                qoi::QoiDecodeContext::decode_to_vec(input, &mut output)
            })
        });
        group.bench_with_input(
            BenchmarkId::new("slice", image_name),
            &encoded,
            |b, input| {
                let mut output = vec![Pixel::ZERO; pixel_count];
                b.iter(|| qoi::QoiDecodeContext::decode_to_slice(input, &mut output))
            },
        );
        group.bench_with_input(
            BenchmarkId::new("streaming", image_name),
            &encoded,
            |b, input| {
                let mut output = Vec::with_capacity(pixel_count);
                b.iter(|| {
                    output.clear();
                    let mut state = qoi::QoiStreamingDecodeContext::new();
                    for chunk in input.chunks(512) {
                        state.push(chunk, &mut output).unwrap();
                    }
                    state.finish()
                })
            },
        );
    }
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthetic encode");

    for (image_name, image) in bench_images() {
        let pixel_count = image.pixels().len();

        group.throughput(criterion::Throughput::Elements(pixel_count as u64));

        group.bench_with_input(
            BenchmarkId::new("encode_to_vec", image_name),
            &image,
            |b, input| {
                let mut encoded = Vec::with_capacity(pixel_count * 2);
                b.iter(|| {
                    encoded.clear();
                    qoi::QoiEncodeContext::encode_to_vec(input, &mut encoded)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("encode_std", image_name),
            &image,
            |b, input| {
                let mut encoded = Vec::with_capacity(pixel_count * 2);
                b.iter(|| {
                    encoded.clear();
                    qoi::QoiEncodeContext::encode(input, &mut encoded)
                })
            },
        );
    }
}

criterion_group!(benches, decode, encode);
criterion_main!(benches);

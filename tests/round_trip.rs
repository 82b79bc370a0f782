//! End-to-end compress/decompress coverage across the scenarios the
//! codec's contract is built around: solid blocks, chroma-subsampled
//! dummy-block edges, undersized output buffers, and rejected inputs.

use jsc::compressor::{ChromaSubsampling, CompressParams};
use jsc::image::ComponentSpec;
use jsc::{jsc_compress, jsc_decompress, ColorSpace, CompressStatus, ImageInfo};

fn max_abs_diff(a: &[u8], b: &[u8]) -> i32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (i32::from(x) - i32::from(y)).abs())
        .max()
        .unwrap_or(0)
}

#[test]
fn solid_gray_8x8_round_trips_within_one() {
    let pixels = vec![128u8; 64];
    let params = CompressParams::default().with_quality(90);
    let mut compressed = Vec::with_capacity(1024);
    let status = jsc_compress(8, 8, ColorSpace::Grayscale, &pixels, &params, &mut compressed).unwrap();
    assert_eq!(status, CompressStatus::Complete);

    let mut decoded = Vec::new();
    let info = jsc_decompress(&compressed, &mut decoded).unwrap();
    assert_eq!(info.width, 8);
    assert_eq!(info.height, 8);
    assert!(max_abs_diff(&pixels, &decoded) <= 1);
}

#[test]
fn rgb_gradient_16x16_stays_within_tolerance_and_budget() {
    let mut pixels = Vec::with_capacity(16 * 16 * 3);
    for y in 0..16u32 {
        for x in 0..16u32 {
            pixels.push(((x * 16) % 256) as u8);
            pixels.push(((y * 16) % 256) as u8);
            pixels.push((((x + y) * 8) % 256) as u8);
        }
    }
    let params = CompressParams::default()
        .with_quality(85)
        .with_chroma_subsampling(ChromaSubsampling::Yuv444);

    let mut compressed = Vec::with_capacity(4096);
    let status = jsc_compress(16, 16, ColorSpace::Rgb, &pixels, &params, &mut compressed).unwrap();
    assert_eq!(status, CompressStatus::Complete);
    assert!(compressed.len() <= 512, "expected a small stream, got {}", compressed.len());

    let mut decoded = Vec::new();
    jsc_decompress(&compressed, &mut decoded).unwrap();
    assert!(max_abs_diff(&pixels, &decoded) <= 8);
}

#[test]
fn nine_by_nine_420_forces_dummy_blocks_but_crops_correctly() {
    // 9x9 with 4:2:0 chroma forces a right-edge and bottom-edge dummy
    // block on every component; only the real 9x9 region should surface.
    let mut pixels = Vec::with_capacity(9 * 9 * 3);
    for y in 0..9u8 {
        for x in 0..9u8 {
            pixels.push(x * 20);
            pixels.push(150);
            pixels.push(y * 20);
        }
    }
    let params = CompressParams::default()
        .with_quality(90)
        .with_chroma_subsampling(ChromaSubsampling::Yuv420);

    let mut compressed = Vec::with_capacity(4096);
    jsc_compress(9, 9, ColorSpace::Rgb, &pixels, &params, &mut compressed).unwrap();

    let mut decoded = Vec::new();
    let info = jsc_decompress(&compressed, &mut decoded).unwrap();
    assert_eq!(info.width, 9);
    assert_eq!(info.height, 9);
    assert_eq!(decoded.len(), 9 * 9 * 3);
    assert!(max_abs_diff(&pixels, &decoded) <= 10);
}

#[test]
fn undersized_output_buffer_truncates_deterministically() {
    let width = 256;
    let height = 256;
    let pixels: Vec<u8> = (0..width * height * 3).map(|i| (i % 256) as u8).collect();
    let params = CompressParams::default()
        .with_quality(70)
        .with_chroma_subsampling(ChromaSubsampling::Yuv420);

    let mut small = Vec::with_capacity(1024);
    let status = jsc_compress(width, height, ColorSpace::Rgb, &pixels, &params, &mut small).unwrap();
    assert_eq!(status, CompressStatus::OutputBufferFull);
    assert_eq!(small.len(), 1024);

    let mut large = Vec::with_capacity(1 << 20);
    let status = jsc_compress(width, height, ColorSpace::Rgb, &pixels, &params, &mut large).unwrap();
    assert_eq!(status, CompressStatus::Complete);
    assert_eq!(&small[..], &large[..1024]);
}

#[test]
fn invalid_sampling_factors_are_rejected_before_producing_output() {
    use jsc::preprocess::PrepController;

    let components = vec![ComponentSpec::new(0, 3, 1, 0), ComponentSpec::new(1, 2, 1, 1)];
    let image = ImageInfo::new(8, 8, ColorSpace::YCbCr, components).unwrap();
    let derived = image.derive();
    assert!(PrepController::start_pass(&image, &derived).is_err());
}

#[test]
fn com_marker_round_trips_at_quality_100_444() {
    let pixels = vec![200u8; 8 * 8 * 3];
    let params = CompressParams::default()
        .with_quality(100)
        .with_chroma_subsampling(ChromaSubsampling::Yuv444);

    let mut compressed = Vec::with_capacity(4096);
    jsc_compress(8, 8, ColorSpace::Rgb, &pixels, &params, &mut compressed).unwrap();

    let parsed = jsc::markers::parse_headers(&compressed).unwrap();
    assert_eq!(parsed.com_payload.unwrap(), jsc::consts::JSC_COM_PAYLOAD.to_vec());

    let mut decoded = Vec::new();
    jsc_decompress(&compressed, &mut decoded).unwrap();
    assert!(max_abs_diff(&pixels, &decoded) <= 2);
}

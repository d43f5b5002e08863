//! PNG image input/output

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ghstretch_core::SampleBuffer;

/// Decode a PNG file into a normalized sample buffer. Grayscale sources
/// stay single-channel; an alpha channel is dropped.
pub fn read_png<P: AsRef<Path>>(path: P) -> Result<SampleBuffer, String> {
    let file = File::open(path.as_ref()).map_err(|e| format!("Failed to open PNG file: {}", e))?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .map_err(|e| format!("Failed to read PNG info: {}", e))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame_info = reader
        .next_frame(&mut buf)
        .map_err(|e| format!("Failed to read PNG frame: {}", e))?;
    let bytes = &buf[..frame_info.buffer_size()];

    let (data, channels) = match (color_type, bit_depth) {
        (png::ColorType::Grayscale, png::BitDepth::Eight) => (decode8(bytes, 1, 1), 1),
        (png::ColorType::Grayscale, png::BitDepth::Sixteen) => (decode16(bytes, 1, 1), 1),
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => (decode8(bytes, 2, 1), 1),
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Sixteen) => (decode16(bytes, 2, 1), 1),
        (png::ColorType::Rgb, png::BitDepth::Eight) => (decode8(bytes, 3, 3), 3),
        (png::ColorType::Rgb, png::BitDepth::Sixteen) => (decode16(bytes, 3, 3), 3),
        (png::ColorType::Rgba, png::BitDepth::Eight) => (decode8(bytes, 4, 3), 3),
        (png::ColorType::Rgba, png::BitDepth::Sixteen) => (decode16(bytes, 4, 3), 3),
        _ => {
            return Err(format!(
                "Unsupported PNG format: {:?} with bit depth {:?}",
                color_type, bit_depth
            ));
        }
    };

    SampleBuffer::from_data(width, height, channels, data)
}

/// Normalize 8-bit samples, keeping the first `keep` of every `stride`
/// components (drops alpha).
fn decode8(bytes: &[u8], stride: usize, keep: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(bytes.len() / stride * keep);
    for px in bytes.chunks_exact(stride) {
        for &v in &px[..keep] {
            data.push(f32::from(v) / 255.0);
        }
    }
    data
}

/// Normalize big-endian 16-bit samples, keeping the first `keep` of every
/// `stride` components.
fn decode16(bytes: &[u8], stride: usize, keep: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(bytes.len() / (stride * 2) * keep);
    for px in bytes.chunks_exact(stride * 2) {
        for c in 0..keep {
            let v = u16::from_be_bytes([px[c * 2], px[c * 2 + 1]]);
            data.push(f32::from(v) / 65535.0);
        }
    }
    data
}

/// Encode a sample buffer as a 16-bit PNG (grayscale or RGB by channel
/// count). Samples are clamped into [0, 1] before quantization.
pub fn write_png16<P: AsRef<Path>>(buffer: &SampleBuffer, path: P) -> Result<(), String> {
    let color_type = match buffer.channels() {
        1 => png::ColorType::Grayscale,
        3 => png::ColorType::Rgb,
        n => return Err(format!("Cannot encode a {}-channel buffer as PNG", n)),
    };

    let file =
        File::create(path.as_ref()).map_err(|e| format!("Failed to create PNG file: {}", e))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), buffer.width(), buffer.height());
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Sixteen);

    let mut writer = encoder
        .write_header()
        .map_err(|e| format!("Failed to write PNG header: {}", e))?;

    let mut bytes = Vec::with_capacity(buffer.data().len() * 2);
    for &v in buffer.data() {
        let q = (v.clamp(0.0, 1.0) * 65535.0).round() as u16;
        bytes.extend_from_slice(&q.to_be_bytes());
    }
    writer
        .write_image_data(&bytes)
        .map_err(|e| format!("Failed to write PNG data: {}", e))
}

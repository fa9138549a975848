//! Per-attribute encoding and decoding.
//!
//! Normalized formats store `round(clamp((raw - bias) / scale, lo, 1) * code_max)`
//! where `lo` is -1 for signed and 0 for unsigned formats, and decode with
//! `stored / code_max * scale + bias`. Raw integer formats round and saturate,
//! float formats pass values through unchanged. Scale and bias only apply to
//! normalized formats. Pad items beyond the supplied values are stored as
//! code 0.

use half::f16;

use super::{FormatKind, VertexComponent, VertexFormat};

/// Append the encoded bytes of one attribute instance to `out`.
///
/// Items past the end of `values` are stored as code 0 regardless of scale
/// and bias; extra values are truncated. Always appends exactly
/// `format.byte_size()` bytes.
pub fn encode_component(component: &VertexComponent, values: &[f32], out: &mut Vec<u8>) {
    let format = component.format;
    for i in 0..format.num_items() {
        match values.get(i) {
            Some(&raw) => encode_item(format, component.scale, component.bias, raw, out),
            None => out.resize(out.len() + format.item_bytes(), 0),
        }
    }
}

fn encode_item(format: VertexFormat, scale: f32, bias: f32, raw: f32, out: &mut Vec<u8>) {
    match format.kind() {
        FormatKind::Float => out.extend_from_slice(&raw.to_le_bytes()),
        FormatKind::Half => out.extend_from_slice(&f16::from_f32(raw).to_le_bytes()),
        FormatKind::SNorm => {
            let code = quantize(raw, scale, bias, -1.0, format.code_max());
            if format.item_bytes() == 1 {
                out.push(code as i8 as u8);
            } else {
                out.extend_from_slice(&(code as i16).to_le_bytes());
            }
        }
        FormatKind::UNorm => {
            let code = quantize(raw, scale, bias, 0.0, format.code_max());
            if format.item_bytes() == 1 {
                out.push(code as u8);
            } else {
                out.extend_from_slice(&(code as u16).to_le_bytes());
            }
        }
        FormatKind::Int => {
            if format.item_bytes() == 1 {
                out.push(raw.round().clamp(i8::MIN as f32, i8::MAX as f32) as i8 as u8);
            } else {
                let v = raw.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        FormatKind::UInt => {
            out.push(raw.round().clamp(0.0, u8::MAX as f32) as u8);
        }
    }
}

/// Map a real value to a normalized integer code.
#[inline]
pub fn quantize(raw: f32, scale: f32, bias: f32, lo: f32, code_max: f32) -> f32 {
    let normalized = ((raw - bias) / scale).clamp(lo, 1.0);
    (normalized * code_max).round()
}

/// Map a normalized integer code back to a real value.
#[inline]
pub fn dequantize(code: f32, scale: f32, bias: f32, lo: f32, code_max: f32) -> f32 {
    (code / code_max).max(lo) * scale + bias
}

/// Decode one attribute instance from `bytes`.
///
/// `bytes` must hold at least `format.byte_size()` bytes.
pub fn decode_component(component: &VertexComponent, bytes: &[u8]) -> Vec<f32> {
    let format = component.format;
    let width = format.item_bytes();
    (0..format.num_items())
        .map(|i| {
            let item = &bytes[i * width..(i + 1) * width];
            decode_item(format, component.scale, component.bias, item)
        })
        .collect()
}

fn decode_item(format: VertexFormat, scale: f32, bias: f32, item: &[u8]) -> f32 {
    let code_max = format.code_max();
    match format.kind() {
        FormatKind::Float => f32::from_le_bytes([item[0], item[1], item[2], item[3]]),
        FormatKind::Half => f16::from_le_bytes([item[0], item[1]]).to_f32(),
        FormatKind::SNorm => {
            let code = if item.len() == 1 {
                item[0] as i8 as f32
            } else {
                i16::from_le_bytes([item[0], item[1]]) as f32
            };
            dequantize(code, scale, bias, -1.0, code_max)
        }
        FormatKind::UNorm => {
            let code = if item.len() == 1 {
                item[0] as f32
            } else {
                u16::from_le_bytes([item[0], item[1]]) as f32
            };
            dequantize(code, scale, bias, 0.0, code_max)
        }
        FormatKind::Int => {
            if item.len() == 1 {
                item[0] as i8 as f32
            } else {
                i16::from_le_bytes([item[0], item[1]]) as f32
            }
        }
        FormatKind::UInt => item[0] as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quant::VertexAttr;

    fn encode(component: &VertexComponent, values: &[f32]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_component(component, values, &mut out);
        out
    }

    #[test]
    fn test_snorm_clamps_and_rounds() {
        let c = VertexComponent::new(VertexAttr::Normal, VertexFormat::Byte4N);
        let bytes = encode(&c, &[1.0, -1.0, 2.5]);
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes[0] as i8, 127);
        assert_eq!(bytes[1] as i8, -127);
        assert_eq!(bytes[2] as i8, 127);
        // padded item
        assert_eq!(bytes[3], 0);
    }

    #[test]
    fn test_scale_bias_affine() {
        let c = VertexComponent::with_range(VertexAttr::Position, VertexFormat::Short4N, 10.0, 5.0);
        let bytes = encode(&c, &[15.0, -5.0, 5.0]);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), 32767);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), -32767);
        assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), 0);

        let decoded = decode_component(&c, &bytes);
        assert!((decoded[0] - 15.0).abs() < 1e-3);
        assert!((decoded[1] + 5.0).abs() < 1e-3);
        assert!((decoded[2] - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_pad_item_is_code_zero() {
        // positions in [10, 12]: a quantized raw 0 would land on -32767
        let c = VertexComponent::with_range(VertexAttr::Position, VertexFormat::Short4N, 1.0, 11.0);
        let bytes = encode(&c, &[10.0, 12.0, 11.0]);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), -32767);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), 32767);
        assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), 0);
        assert_eq!(&bytes[6..8], &[0, 0]);

        let c = VertexComponent::with_range(VertexAttr::Normal, VertexFormat::Byte4N, 0.5, 0.5);
        assert_eq!(encode(&c, &[1.0, 0.0, 0.5])[3], 0);
    }

    #[test]
    fn test_unorm_lower_bound_is_zero() {
        let c = VertexComponent::new(VertexAttr::Weights, VertexFormat::UByte4N);
        let bytes = encode(&c, &[0.5, -0.25, 1.0, 0.0]);
        assert_eq!(bytes, vec![128, 0, 255, 0]);
    }

    #[test]
    fn test_raw_integer_passthrough() {
        let c = VertexComponent::with_range(VertexAttr::Indices, VertexFormat::UByte4, 4.0, 1.0);
        let bytes = encode(&c, &[3.0, 17.4, 300.0, -2.0]);
        assert_eq!(bytes, vec![3, 17, 255, 0]);
        assert_eq!(decode_component(&c, &bytes), vec![3.0, 17.0, 255.0, 0.0]);
    }

    #[test]
    fn test_half_passthrough() {
        let c = VertexComponent::new(VertexAttr::TexCoord0, VertexFormat::Half2);
        let bytes = encode(&c, &[0.5, 0.25]);
        assert_eq!(bytes.len(), 4);
        assert_eq!(decode_component(&c, &bytes), vec![0.5, 0.25]);
    }

    #[test]
    fn test_float_truncates_extra_values() {
        let c = VertexComponent::new(VertexAttr::TexCoord0, VertexFormat::Float2);
        let bytes = encode(&c, &[0.1, 0.2, 0.3]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(decode_component(&c, &bytes), vec![0.1, 0.2]);
    }
}

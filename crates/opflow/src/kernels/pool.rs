//! Reference max/average pooling.

use super::{read_f32, write_f32};
use crate::ops::pool::{PoolKind, PoolParam};
use crate::ops::KernelError;

const OP: &str = "pool2d";

/// Windowed pooling over NCHW activations.
///
/// Average pooling divides by the number of in-bounds elements, so padded
/// border windows are not diluted by the zero padding.
pub fn pool2d(param: &PoolParam) -> Result<(), KernelError> {
    let (in_dims, x) = read_f32(OP, param.input())?;
    let out_dims = param.output().read().shape().dims().to_vec();

    let (batch, channels, in_h, in_w) = (in_dims[0], in_dims[1], in_dims[2], in_dims[3]);
    let (out_h, out_w) = (out_dims[2], out_dims[3]);
    let [k_h, k_w] = param.ksize();
    let [stride_h, stride_w] = param.stride();
    let [pad_h, pad_w] = param.paddings();
    let kind = param.kind();

    let mut out = vec![0.0f32; batch * channels * out_h * out_w];
    for b in 0..batch {
        for c in 0..channels {
            let plane = (b * channels + c) * in_h * in_w;
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut acc = f32::NEG_INFINITY;
                    let mut sum = 0.0f32;
                    let mut count = 0usize;
                    for ky in 0..k_h {
                        let pos_y = oy * stride_h + ky;
                        if pos_y < pad_h || pos_y - pad_h >= in_h {
                            continue;
                        }
                        let iy = pos_y - pad_h;
                        for kx in 0..k_w {
                            let pos_x = ox * stride_w + kx;
                            if pos_x < pad_w || pos_x - pad_w >= in_w {
                                continue;
                            }
                            let ix = pos_x - pad_w;
                            let value = x[plane + iy * in_w + ix];
                            acc = acc.max(value);
                            sum += value;
                            count += 1;
                        }
                    }
                    let pooled = match kind {
                        PoolKind::Max if count > 0 => acc,
                        PoolKind::Avg if count > 0 => sum / count as f32,
                        _ => 0.0,
                    };
                    out[((b * channels + c) * out_h + oy) * out_w + ox] = pooled;
                }
            }
        }
    }
    write_f32(OP, param.output(), &out)
}

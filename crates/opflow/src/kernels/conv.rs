//! Direct (non-im2col) reference convolution.

use super::{read_f32, write_f32};
use crate::ops::conv::ConvParam;
use crate::ops::KernelError;

const OP: &str = "conv2d";

/// Grouped 2D convolution over NCHW activations and OIHW filters.
pub fn conv2d(param: &ConvParam) -> Result<(), KernelError> {
    let (in_dims, x) = read_f32(OP, param.input())?;
    let (filter_dims, w) = read_f32(OP, param.filter())?;
    let out_dims = param.output().read().shape().dims().to_vec();

    let (batch, c_in, in_h, in_w) = (in_dims[0], in_dims[1], in_dims[2], in_dims[3]);
    let (c_out, f_in, k_h, k_w) = (
        filter_dims[0],
        filter_dims[1],
        filter_dims[2],
        filter_dims[3],
    );
    let (out_h, out_w) = (out_dims[2], out_dims[3]);
    let [stride_h, stride_w] = param.stride();
    let [pad_h, pad_w] = param.paddings();
    let [dil_h, dil_w] = param.dilations();
    let groups = param.groups();
    let c_in_per_group = c_in / groups;
    let c_out_per_group = c_out / groups;

    let mut out = vec![0.0f32; batch * c_out * out_h * out_w];
    for b in 0..batch {
        for oc in 0..c_out {
            let group = oc / c_out_per_group;
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut acc = 0.0f32;
                    for ic in 0..c_in_per_group {
                        let channel = group * c_in_per_group + ic;
                        for ky in 0..k_h {
                            let pos_y = oy * stride_h + ky * dil_h;
                            if pos_y < pad_h || pos_y - pad_h >= in_h {
                                continue;
                            }
                            let iy = pos_y - pad_h;
                            for kx in 0..k_w {
                                let pos_x = ox * stride_w + kx * dil_w;
                                if pos_x < pad_w || pos_x - pad_w >= in_w {
                                    continue;
                                }
                                let ix = pos_x - pad_w;
                                let x_idx = ((b * c_in + channel) * in_h + iy) * in_w + ix;
                                let w_idx = ((oc * f_in + ic) * k_h + ky) * k_w + kx;
                                acc += x[x_idx] * w[w_idx];
                            }
                        }
                    }
                    out[((b * c_out + oc) * out_h + oy) * out_w + ox] = acc;
                }
            }
        }
    }
    write_f32(OP, param.output(), &out)
}

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

/// Homogeneous transformation from the frame of `pose` into the world frame.
///
/// `pose` is `[x, y, z, roll, yaw, pitch]`, angles in degrees if `degree_flag` is set.
pub fn x_to_world(pose: &[f64; 6], degree_flag: bool) -> Array2<f64> {
    let [x, y, z, mut roll, mut yaw, mut pitch] = *pose;

    if degree_flag {
        roll = roll.to_radians();
        yaw = yaw.to_radians();
        pitch = pitch.to_radians();
    }

    let (s_y, c_y) = yaw.sin_cos();
    let (s_r, c_r) = roll.sin_cos();
    let (s_p, c_p) = pitch.sin_cos();

    let mut matrix = Array2::eye(4);
    matrix[[0, 3]] = x;
    matrix[[1, 3]] = y;
    matrix[[2, 3]] = z;

    matrix[[0, 0]] = c_p * c_y;
    matrix[[0, 1]] = c_y * s_p * s_r - s_y * c_r;
    matrix[[0, 2]] = -c_y * s_p * c_r - s_y * s_r;
    matrix[[1, 0]] = s_y * c_p;
    matrix[[1, 1]] = s_y * s_p * s_r + c_y * c_r;
    matrix[[1, 2]] = -s_y * s_p * c_r + c_y * s_r;
    matrix[[2, 0]] = s_p;
    matrix[[2, 1]] = -c_p * s_r;
    matrix[[2, 2]] = c_p * c_r;

    matrix
}

/// Inverse of [`x_to_world`]. The rotation block is orthonormal, so the inverse is `[Rᵀ | -Rᵀt]`.
pub fn world_to_x(pose: &[f64; 6], degree_flag: bool) -> Array2<f64> {
    let to_world = x_to_world(pose, degree_flag);
    let rotation_t = to_world.slice(s![0..3, 0..3]).t().to_owned();
    let translation = to_world.slice(s![0..3, 3]).to_owned();

    let mut matrix = Array2::eye(4);
    matrix.slice_mut(s![0..3, 0..3]).assign(&rotation_t);
    matrix.slice_mut(s![0..3, 3]).assign(&(-(rotation_t.dot(&translation) as Array1<f64>)));
    matrix
}

/// Transformation from the frame of `x1` into the frame of `x2`, both given in world coordinates.
pub fn x1_to_x2(x1: &[f64; 6], x2: &[f64; 6], degree_flag: bool) -> Array2<f64> {
    world_to_x(x2, degree_flag).dot(&x_to_world(x1, degree_flag))
}

/// Converts discretized (grid) coordinates back into continuous space of a BEV representation.
pub fn dist_to_continuous(
    p_dist: ArrayView2<f64>,
    displacement_dist: ArrayView1<f64>,
    res: f64,
    downsample_rate: f64,
) -> Array2<f64> {
    (&p_dist + &displacement_dist) * res * downsample_rate
}

use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// A 4x4 matrix stored as four rows.
///
/// Products compose right-to-left: `(a * b).transform_point(p)` applies `b` first.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4 {
    pub rows: [Vec4; 4],
}

macro_rules! impl_elementwise_op {
    ($trait:ident, $op:ident, $target:ident { $($field:ident),* }) => {
        impl $trait<$target> for $target {
            type Output = Self;

            fn $op(self, other: Self) -> Self {
                Self {
                    $(
                        $field: $trait::$op(self.$field, other.$field),
                    )*
                }
            }
        }
    }
}

macro_rules! impl_scalar_op {
    ($trait:ident, $op:ident, $target:ident { $($field:ident),* }, $scalar:ident) => {
        impl $trait<$scalar> for $target {
            type Output = Self;

            fn $op(self, other: $scalar) -> Self {
                Self {
                    $(
                        $field: $trait::$op(self.$field, other),
                    )*
                }
            }
        }
    };

    ($trait:ident, $op:ident, $scalar:ident, $target:ident { $($field:ident),* }) => {
        impl $trait<$target> for $scalar {
            type Output = $target;

            fn $op(self, other: $target) -> $target {
                $target {
                    $(
                        $field: $trait::$op(self, other.$field),
                    )*
                }
            }
        }
    };
}

macro_rules! impl_conversion {
    ($vector:ident { $($field:ident),* }) => {
        impl $vector {
            pub const DIMENSION: usize = count!($($field),*);
        }

        impl From<[f32; $vector::DIMENSION]> for $vector {
            fn from([$($field),*]: [f32; $vector::DIMENSION]) -> $vector {
                $vector { $($field),* }
            }
        }

        impl From<$vector> for [f32; $vector::DIMENSION] {
            fn from(vector: $vector) -> [f32; $vector::DIMENSION] {
                [ $( vector.$field ),* ]
            }
        }
    }
}

macro_rules! impl_index {
    ($vector:ident { $($index:literal => $field:ident),* }) => {
        impl Index<usize> for $vector {
            type Output = f32;

            fn index(&self, index: usize) -> &Self::Output {
                match index {
                    $( $index => &self.$field, )*
                    _ => panic!("{}: index {} is out of bounds", stringify!($vector), index),
                }
            }
        }

        impl IndexMut<usize> for $vector {
            fn index_mut(&mut self, index: usize) -> &mut Self::Output {
                match index {
                    $( $index => &mut self.$field, )*
                    _ => panic!("{}: index {} is out of bounds", stringify!($vector), index),
                }
            }
        }
    }
}

macro_rules! impl_vector {
    ($vector:ident { $($field:ident),* }) => {
        impl $vector {
            #[inline(always)]
            pub const fn new($($field:f32),*) -> $vector {
                $vector {
                    $( $field ),*
                }
            }

            #[inline(always)]
            pub const fn zero() -> $vector {
                $vector {
                    $( $field: 0.0 ),*
                }
            }

            #[inline(always)]
            pub fn dot(self, other: $vector) -> f32 {
                0.0 $( + self.$field * other.$field)*
            }

            #[inline(always)]
            pub fn length_squared(self) -> f32 {
                self.dot(self)
            }

            /// Euclidean norm.
            #[inline(always)]
            pub fn length(self) -> f32 {
                self.length_squared().sqrt()
            }

            /// Scales the vector to unit length.
            ///
            /// The caller guarantees a non-zero length: no check is made and a zero vector
            /// yields NaN components.
            #[inline(always)]
            pub fn normalize(self) -> $vector {
                self / self.length()
            }

            #[inline(always)]
            pub fn all(self, mut f: impl FnMut(f32) -> bool) -> bool {
                true $( && f(self.$field) )*
            }

            #[inline(always)]
            pub fn is_finite(self) -> bool {
                self.all(f32::is_finite)
            }
        }

        impl Neg for $vector {
            type Output = $vector;

            fn neg(self) -> Self::Output {
                $vector {
                    $( $field: -self.$field ),*
                }
            }
        }

        impl_conversion!($vector { $($field),* });

        impl_elementwise_op!(Add, add, $vector { $( $field ),* });
        impl_elementwise_op!(Sub, sub, $vector { $( $field ),* });

        impl_scalar_op!(Mul, mul, f32, $vector { $( $field ),* });
        impl_scalar_op!(Mul, mul, $vector { $( $field ),* }, f32);
        impl_scalar_op!(Div, div, $vector { $( $field ),* }, f32);

        impl AddAssign<$vector> for $vector {
            fn add_assign(&mut self, rhs: $vector) {
                $( self.$field += rhs.$field; )*
            }
        }

        impl SubAssign<$vector> for $vector {
            fn sub_assign(&mut self, rhs: $vector) {
                $( self.$field -= rhs.$field; )*
            }
        }
    }
}

impl_vector!(Vec3 { x, y, z });
impl_vector!(Vec4 { x, y, z, w });

impl_index!(Vec3 { 0 => x, 1 => y, 2 => z });
impl_index!(Vec4 { 0 => x, 1 => y, 2 => z, 3 => w });

impl Vec3 {
    /// Right-handed cross product. Anti-commutative: `a.cross(b) == -b.cross(a)`.
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub const fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl Vec4 {
    #[cfg(test)]
    pub const fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Mat4 {
        let [r0, r1, r2, r3] = rows;
        Mat4 {
            rows: [
                Vec4::new(r0[0], r0[1], r0[2], r0[3]),
                Vec4::new(r1[0], r1[1], r1[2], r1[3]),
                Vec4::new(r2[0], r2[1], r2[2], r2[3]),
                Vec4::new(r3[0], r3[1], r3[2], r3[3]),
            ],
        }
    }

    /// A matrix whose first three rows are `x`, `y` and `z` with a zero last column, over
    /// the identity bottom row.
    pub const fn from_row_vectors(x: Vec3, y: Vec3, z: Vec3) -> Mat4 {
        Mat4 {
            rows: [
                x.extend(0.0),
                y.extend(0.0),
                z.extend(0.0),
                Vec4::new(0.0, 0.0, 0.0, 1.0),
            ],
        }
    }

    /// Identity with `offset` in the last column.
    pub const fn translation(offset: Vec3) -> Mat4 {
        Mat4::from_rows([
            [1.0, 0.0, 0.0, offset.x],
            [0.0, 1.0, 0.0, offset.y],
            [0.0, 0.0, 1.0, offset.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn column(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.rows[0][index],
            self.rows[1][index],
            self.rows[2][index],
            self.rows[3][index],
        )
    }

    pub fn transpose(&self) -> Mat4 {
        Mat4 {
            rows: [self.column(0), self.column(1), self.column(2), self.column(3)],
        }
    }

    /// Dense product: `C[i][j] = sum_k A[i][k] * B[k][j]`.
    pub fn product(&self, other: &Mat4) -> Mat4 {
        let mut result = Mat4 {
            rows: [Vec4::zero(); 4],
        };
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    result.rows[i][j] += self.rows[i][k] * other.rows[k][j];
                }
            }
        }
        result
    }

    #[cfg(test)]
    pub fn transform(&self, vector: Vec4) -> Vec4 {
        Vec4::new(
            self.rows[0].dot(vector),
            self.rows[1].dot(vector),
            self.rows[2].dot(vector),
            self.rows[3].dot(vector),
        )
    }

    /// Transforms a point (implicit `w = 1`), dropping the resulting `w`.
    #[cfg(test)]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.transform(point.extend(1.0)).truncate()
    }

    /// All 16 entries, row after row.
    pub fn to_row_major(&self) -> [f32; 16] {
        bytemuck::cast(*self)
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, other: Mat4) -> Mat4 {
        self.product(&other)
    }
}

impl Index<usize> for Mat4 {
    type Output = Vec4;

    fn index(&self, row: usize) -> &Self::Output {
        &self.rows[row]
    }
}

#[cfg(test)]
impl From<Mat4> for [[f32; 4]; 4] {
    fn from(matrix: Mat4) -> [[f32; 4]; 4] {
        matrix.rows.map(<[f32; 4]>::from)
    }
}

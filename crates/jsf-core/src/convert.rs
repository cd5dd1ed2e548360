// Conversions from caller-side types to the primitive shapes a Format
// understands: f64 for numbers, i32 for enum indices and identifiers.
// Casts are plain `as` conversions in both directions.

/// Any primitive number; carried through the format as `f64`.
pub trait Numeric: Copy + PartialEq {
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_numeric {
    ($($t:ty),* $(,)?) => {
        $(
            impl Numeric for $t {
                #[inline(always)]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline(always)]
                fn from_f64(v: f64) -> Self {
                    v as $t
                }
            }
        )*
    };
}

impl_numeric!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// A value stored as an index into a string table.
///
/// Implemented for small integers; fieldless enums implement it by hand.
pub trait EnumIndex: Copy + PartialEq {
    fn to_index(self) -> i32;
    fn from_index(index: i32) -> Self;
}

macro_rules! impl_enum_index {
    ($($t:ty),* $(,)?) => {
        $(
            impl EnumIndex for $t {
                #[inline(always)]
                fn to_index(self) -> i32 {
                    self as i32
                }

                #[inline(always)]
                fn from_index(index: i32) -> Self {
                    index as $t
                }
            }
        )*
    };
}

impl_enum_index!(i8, i16, i32, i64, u8, u16, u32);

/// Newtype around a numeric identifier, written as its string name.
pub trait Identifier: Copy + PartialEq {
    fn num(self) -> i32;
    fn from_num(num: i32) -> Self;
}

impl Identifier for i32 {
    fn num(self) -> i32 {
        self
    }

    fn from_num(num: i32) -> Self {
        num
    }
}

// Mon Oct 12 2026 - Alex

use crate::memory::Endianness;
use crate::value::{MatchFlags, NumberValue, ScanMatchType, ScanTarget, Value, Widths};

trait Scalar: Copy + PartialOrd {
    fn from_user(n: &NumberValue) -> Self;
    fn difference(self, other: Self) -> Self;
    fn same_bits(self, other: Self) -> bool;
}

macro_rules! int_scalar {
    ($($ty:ty => $field:ident),*) => {$(
        impl Scalar for $ty {
            fn from_user(n: &NumberValue) -> Self {
                n.$field as $ty
            }
            fn difference(self, other: Self) -> Self {
                self.wrapping_sub(other)
            }
            fn same_bits(self, other: Self) -> bool {
                self == other
            }
        }
    )*};
}

int_scalar!(u8 => unsigned, u16 => unsigned, u32 => unsigned, u64 => unsigned,
            i8 => signed, i16 => signed, i32 => signed, i64 => signed);

impl Scalar for f32 {
    fn from_user(n: &NumberValue) -> Self {
        n.float32
    }
    fn difference(self, other: Self) -> Self {
        self - other
    }
    fn same_bits(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Scalar for f64 {
    fn from_user(n: &NumberValue) -> Self {
        n.float64
    }
    fn difference(self, other: Self) -> Self {
        self - other
    }
    fn same_bits(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

fn check<T: Scalar>(m: ScanMatchType, old: Option<T>, new: T, target: &ScanTarget) -> bool {
    let user = match target {
        ScanTarget::Number(n) => Some(T::from_user(n)),
        _ => None,
    };
    match m {
        ScanMatchType::Any => true,
        ScanMatchType::EqualTo => user.is_some_and(|u| new == u),
        ScanMatchType::NotEqualTo => user.is_some_and(|u| new != u),
        ScanMatchType::LessThan => user.is_some_and(|u| new < u),
        ScanMatchType::GreaterThan => user.is_some_and(|u| new > u),
        ScanMatchType::Range => match target {
            ScanTarget::Range(lo, hi) => T::from_user(lo) <= new && new <= T::from_user(hi),
            _ => false,
        },
        ScanMatchType::Changed => old.is_some_and(|o| !o.same_bits(new)),
        ScanMatchType::NotChanged => old.is_some_and(|o| o.same_bits(new)),
        ScanMatchType::Increased => old.is_some_and(|o| new > o),
        ScanMatchType::Decreased => old.is_some_and(|o| new < o),
        ScanMatchType::IncreasedBy => match (old, user) {
            (Some(o), Some(u)) => new.difference(o) == u,
            _ => false,
        },
        ScanMatchType::DecreasedBy => match (old, user) {
            (Some(o), Some(u)) => o.difference(new) == u,
            _ => false,
        },
    }
}

/// Evaluates `m` for every numeric width still possible for `new` (and
/// `old`, when given) and returns the widths that satisfy it.
pub fn compare_numbers(
    m: ScanMatchType,
    old: Option<&Value>,
    new: &Value,
    target: &ScanTarget,
    order: Endianness,
) -> Widths {
    let mut candidates = new.widths() & target.widths() & Widths::NUMBERS;
    if let Some(old) = old {
        candidates &= old.widths();
    } else if m.needs_old() {
        return Widths::empty();
    }

    let mut result = Widths::empty();

    macro_rules! width {
        ($flag:expr, $get:ident) => {
            if candidates.contains($flag)
                && check(m, old.map(|o| o.$get()), new.$get(), target)
            {
                result |= $flag;
            }
        };
        ($flag:expr, $get:ident, ordered) => {
            if candidates.contains($flag)
                && check(m, old.map(|o| o.$get(order)), new.$get(order), target)
            {
                result |= $flag;
            }
        };
    }

    width!(Widths::U8, as_u8);
    width!(Widths::S8, as_i8);
    width!(Widths::U16, as_u16, ordered);
    width!(Widths::S16, as_i16, ordered);
    width!(Widths::U32, as_u32, ordered);
    width!(Widths::S32, as_i32, ordered);
    width!(Widths::U64, as_u64, ordered);
    width!(Widths::S64, as_i64, ordered);
    width!(Widths::F32, as_f32, ordered);
    width!(Widths::F64, as_f64, ordered);

    result
}

/// Matches a byte-array pattern or a string against the start of `data`.
/// Returns the flags to record, or `MatchFlags::EMPTY` on mismatch.
pub fn compare_bytes(data: &[u8], target: &ScanTarget) -> MatchFlags {
    match target {
        ScanTarget::Bytes(pattern) => {
            let hit = data.len() >= pattern.len()
                && pattern.iter().zip(data).all(|(mask, &b)| mask.matches(b));
            if hit {
                MatchFlags::bytearray(pattern.len() as u16)
            } else {
                MatchFlags::EMPTY
            }
        }
        ScanTarget::Text(text) => {
            if data.starts_with(text) {
                MatchFlags::string(text.len() as u16)
            } else {
                MatchFlags::EMPTY
            }
        }
        _ => MatchFlags::EMPTY,
    }
}

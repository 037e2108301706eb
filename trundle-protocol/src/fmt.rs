//! Response value formatting

use core::fmt::{self, Write};

/// Write a scaled integer as fixed-point decimal.
///
/// `value` is given in units of 10^-`decimals`; `write_fixed(out, 1234, 2)`
/// prints "12.34". With zero decimals this is a plain integer.
pub fn write_fixed<W: Write>(out: &mut W, value: u32, decimals: u32) -> fmt::Result {
    if decimals == 0 {
        return write!(out, "{}", value);
    }
    let scale = 10u32.pow(decimals);
    write!(
        out,
        "{}.{:0width$}",
        value / scale,
        value % scale,
        width = decimals as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn fixed(value: u32, decimals: u32) -> String<16> {
        let mut s = String::new();
        write_fixed(&mut s, value, decimals).unwrap();
        s
    }

    #[test]
    fn two_decimals() {
        assert_eq!(fixed(1234, 2), "12.34");
        assert_eq!(fixed(96, 2), "0.96");
        assert_eq!(fixed(1005, 2), "10.05");
        assert_eq!(fixed(0, 2), "0.00");
    }

    #[test]
    fn plain_integer() {
        assert_eq!(fixed(10200, 0), "10200");
    }
}

use bytesize::ByteSize;

use crate::config::ValueFormat;

pub fn human_bytes(b: impl Into<u64>) -> String {
    ByteSize::b(b.into()).to_string()
}

/// Short tick/tooltip label: `1.5k`, `2M`, `12`, `0.25`.
pub fn compact_number(v: f64) -> String {
    if !v.is_finite() {
        return "–".to_string();
    }
    let abs = v.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (v / 1e9, "B")
    } else if abs >= 1e6 {
        (v / 1e6, "M")
    } else if abs >= 1e3 {
        (v / 1e3, "k")
    } else {
        (v, "")
    };
    let digits = if suffix.is_empty() && abs < 1.0 { 2 } else { 1 };
    let mut s = format!("{scaled:.digits$}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s.push_str(suffix);
    s
}

pub fn format_value(v: f64, format: ValueFormat) -> String {
    match format {
        ValueFormat::Compact => compact_number(v),
        ValueFormat::Plain => {
            if v.fract() == 0.0 {
                format!("{v:.0}")
            } else {
                format!("{v:.2}")
            }
        }
        ValueFormat::Bytes => {
            if v.is_finite() && v >= 0.0 {
                human_bytes(v.round() as u64)
            } else {
                compact_number(v)
            }
        }
        ValueFormat::Percent => format!("{:.1}%", v * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_numbers() {
        assert_eq!(compact_number(12.0), "12");
        assert_eq!(compact_number(1500.0), "1.5k");
        assert_eq!(compact_number(2_000_000.0), "2M");
        assert_eq!(compact_number(-3_260.0), "-3.3k");
        assert_eq!(compact_number(0.25), "0.25");
        assert_eq!(compact_number(4.2e9), "4.2B");
        assert_eq!(compact_number(f64::NAN), "–");
    }

    #[test]
    fn formats_by_kind() {
        assert_eq!(format_value(3.0, ValueFormat::Plain), "3");
        assert_eq!(format_value(3.14159, ValueFormat::Plain), "3.14");
        assert_eq!(format_value(0.125, ValueFormat::Percent), "12.5%");
        assert!(format_value(2048.0, ValueFormat::Bytes).ends_with('B'));
    }
}

use crate::core::schema::AxisBase;
use chrono::NaiveDateTime;

const SI_UNITS: [(f64, &str); 3] = [(1000.0, " K"), (1_000_000.0, " M"), (1_000_000_000.0, " G")];
const IEC_UNITS: [(f64, &str); 3] = [
    (1024.0, " Ki"),
    (1_048_576.0, " Mi"),
    (1_073_741_824.0, " Gi"),
];

/// `#,##0.0`: thousands grouping and a single decimal
pub fn format_decimal(value: f64) -> String {
    let text = format!("{:.1}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "0"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && text != "0.0" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Axis label for a plotted value
///
/// `factor` is the unit of the raw column (1024 for a kB column on an IEC
/// axis). Values below one kilo unit after scaling are shown as they are.
pub fn format_axis_value(value: f64, base: AxisBase, factor: f64) -> String {
    let units = match base {
        AxisBase::Plain => return format_decimal(value),
        AxisBase::Si => &SI_UNITS,
        AxisBase::Iec => &IEC_UNITS,
    };

    let kilo = factor.trunc();
    if kilo == 0.0 {
        return format_decimal(value);
    }

    let scaled = value * kilo;
    if scaled < units[0].0 {
        return format_decimal(value);
    }
    for window in units.windows(2) {
        let (unit, suffix) = window[0];
        if scaled < window[1].0 {
            return format!("{}{}", format_decimal(scaled / unit), suffix);
        }
    }
    let (unit, suffix) = units[units.len() - 1];
    format!("{}{}", format_decimal(scaled / unit), suffix)
}

/// Format timestamp in human-readable format (YYYY-MM-DD HH:MM:SS)
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_duration(elapsed: std::time::Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

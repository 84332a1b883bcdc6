//! Locale-aware number and boolean formatting.
//!
//! Parsed [`NumberFormat`]s are cached process-wide by `(locale, pattern)`.
//! Each render clones the formats it uses into its own [`FormatCache`],
//! which the renderer clears at the start and end of `process()`.

use std::sync::LazyLock;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use stencil_ir::Name;
use stencil_numeric::{rescale, BigDecimal, BigInt, Number, RoundingMode};
use stencil_value::{invalid_setting, RenderResult};

/// Decimal and grouping separators of a locale.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LocaleSymbols {
    pub decimal: char,
    pub grouping: char,
}

impl LocaleSymbols {
    /// Symbols for a locale such as `de_DE` or `fr-CA`.
    pub fn for_locale(locale: &str) -> Self {
        let normalized = locale.replace('-', "_");
        if matches!(normalized.as_str(), "de_CH" | "it_CH" | "de_LI") {
            return LocaleSymbols {
                decimal: '.',
                grouping: '\'',
            };
        }
        let language = normalized.split('_').next().unwrap_or("");
        match language {
            "de" | "es" | "it" | "nl" | "pt" | "id" | "tr" | "da" | "el" | "ro" => LocaleSymbols {
                decimal: ',',
                grouping: '.',
            },
            "fr" | "ru" | "pl" | "cs" | "sv" | "nb" | "no" | "fi" | "uk" | "hu" | "sk" | "bg" => {
                LocaleSymbols {
                    decimal: ',',
                    grouping: '\u{a0}',
                }
            }
            _ => LocaleSymbols {
                decimal: '.',
                grouping: ',',
            },
        }
    }
}

/// Pattern-driven decimal formatting (`#,##0.00`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecimalPattern {
    prefix: String,
    suffix: String,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: Option<usize>,
    percent: bool,
    symbols: LocaleSymbols,
}

/// A parsed number format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// Locale-independent, full precision (`computer`, `c`).
    Computer,
    Pattern(DecimalPattern),
}

impl NumberFormat {
    /// Parse a format name or pattern for `locale`.
    pub fn parse(pattern: &str, locale: &str) -> RenderResult<Self> {
        let expanded = match pattern {
            "computer" | "c" => return Ok(NumberFormat::Computer),
            "number" => "#,##0.###",
            "percent" => "#,##0%",
            other => other,
        };
        let symbols = LocaleSymbols::for_locale(locale);
        DecimalPattern::parse(expanded, symbols)
            .map(NumberFormat::Pattern)
            .ok_or_else(|| invalid_setting("number_format", pattern))
    }

    pub fn format(&self, number: &Number) -> String {
        if let Some(special) = non_finite(number) {
            return special.to_string();
        }
        match self {
            NumberFormat::Computer => number.to_string(),
            NumberFormat::Pattern(pattern) => pattern.format(number),
        }
    }
}

fn non_finite(number: &Number) -> Option<&'static str> {
    let value = match number {
        Number::Float(f) => f64::from(*f),
        Number::Double(d) => *d,
        _ => return None,
    };
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("\u{221e}")
    } else if value == f64::NEG_INFINITY {
        Some("-\u{221e}")
    } else {
        None
    }
}

impl DecimalPattern {
    fn parse(pattern: &str, symbols: LocaleSymbols) -> Option<Self> {
        let is_numeric = |c: char| matches!(c, '#' | '0' | ',' | '.');
        let start = pattern.find(is_numeric)?;
        let end = pattern[start..]
            .find(|c: char| !is_numeric(c))
            .map_or(pattern.len(), |i| start + i);
        let (prefix, body, suffix) = (&pattern[..start], &pattern[start..end], &pattern[end..]);

        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if frac_part.contains(['.', ',']) || !body.contains(['#', '0']) {
            return None;
        }
        let grouping = int_part
            .rsplit_once(',')
            .map(|(_, tail)| tail.len())
            .filter(|n| *n > 0);
        Some(DecimalPattern {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            min_int: int_part.chars().filter(|c| *c == '0').count(),
            min_frac: frac_part.chars().filter(|c| *c == '0').count(),
            max_frac: frac_part.len(),
            grouping,
            percent: suffix.contains('%') || prefix.contains('%'),
            symbols,
        })
    }

    fn format(&self, number: &Number) -> String {
        let Ok(mut value) = number.to_big_decimal() else {
            return number.to_string();
        };
        if self.percent {
            value = value * BigDecimal::new(BigInt::from(100u8), 0);
        }
        let scale = i64::try_from(self.max_frac).unwrap_or(i64::MAX);
        let (digits, _) = rescale(&value, scale, RoundingMode::HalfEven).as_bigint_and_exponent();
        let negative = digits < BigInt::from(0u8);
        let mut text = digits.magnitude().to_string();
        if text.len() <= self.max_frac {
            text.insert_str(0, &"0".repeat(self.max_frac - text.len() + 1));
        }
        let (int_digits, frac_digits) = text.split_at(text.len() - self.max_frac);

        let mut frac = frac_digits.to_string();
        while frac.len() > self.min_frac && frac.ends_with('0') {
            frac.pop();
        }

        let int_digits = int_digits.trim_start_matches('0');
        let mut int = if int_digits.len() < self.min_int {
            "0".repeat(self.min_int - int_digits.len()) + int_digits
        } else {
            int_digits.to_string()
        };
        if let Some(size) = self.grouping {
            int = group(&int, size, self.symbols.grouping);
        }

        let mut out = String::with_capacity(self.prefix.len() + int.len() + frac.len() + 2);
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&int);
        if !frac.is_empty() {
            out.push(self.symbols.decimal);
            out.push_str(&frac);
        }
        out.push_str(&self.suffix);
        out
    }
}

/// Insert `separator` every `size` digits from the right.
fn group(digits: &str, size: usize, separator: char) -> String {
    let count = digits.chars().count();
    let mut out = String::with_capacity(digits.len() + count / size);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (count - i) % size == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Render a boolean with a `boolean_format` value (`c` or `yes,no`).
pub fn format_boolean(value: bool, format: &str) -> String {
    match format.split_once(',') {
        Some((yes, no)) if format != "c" => {
            let text = if value { yes } else { no };
            text.to_string()
        }
        _ => value.to_string(),
    }
}

type FormatKey = (Name, Name);

static GLOBAL_FORMATS: LazyLock<Mutex<FxHashMap<FormatKey, NumberFormat>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));

/// Per-render format cache backed by the process-wide one.
#[derive(Debug, Default)]
pub(crate) struct FormatCache {
    formats: FxHashMap<FormatKey, NumberFormat>,
}

impl FormatCache {
    pub fn get(&mut self, locale: &Name, pattern: &Name) -> RenderResult<&NumberFormat> {
        let key = (Name::clone(locale), Name::clone(pattern));
        if !self.formats.contains_key(&key) {
            let format = {
                let mut global = GLOBAL_FORMATS.lock();
                if let Some(format) = global.get(&key) {
                    format.clone()
                } else {
                    let format = NumberFormat::parse(pattern, locale)?;
                    global.insert(key.clone(), format.clone());
                    format
                }
            };
            self.formats.insert(key.clone(), format);
        }
        self.formats
            .get(&key)
            .ok_or_else(|| invalid_setting("number_format", pattern))
    }

    pub fn clear(&mut self) {
        self.formats.clear();
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

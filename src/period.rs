// Period label grammar.
//
// Labels look like `MTD (Jun 2025)`, `QTD (Q2 2025)` or `YTD (2025)`: a
// period-kind token, a parenthesized optional detail, and a 4-digit year
// closing the parentheses.
use crate::types::{FilterPeriod, NormalizedRecord, PeriodFilter, PeriodKind, Selection};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLabel {
    pub kind: PeriodKind,
    pub year: i32,
    pub month: Option<u32>,
    pub quarter: Option<u32>,
}

/// Case-sensitive lookup of a 3-letter month abbreviation.
pub fn month_from_abbrev(s: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == s)
        .map(|idx| idx as u32 + 1)
}

pub fn month_abbrev(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_ABBREVIATIONS.get(idx).copied()
}

/// `Q1`..`Q4` to 1..4; anything else is `None`.
pub fn quarter_from_detail(s: &str) -> Option<u32> {
    let digit = s.strip_prefix('Q')?;
    match digit.parse::<u32>() {
        Ok(q @ 1..=4) if digit.len() == 1 => Some(q),
        _ => None,
    }
}

// Kind token, then a parenthesized optional detail closed by a 4-digit
// year. Matched anywhere in the label so surrounding text is tolerated.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\w+)\s*\(\s*(.*?)\s*([0-9]{4})\s*\)").expect("valid period label pattern")
});

/// Parse a period label. Returns `None` when no `KIND (detail YYYY)` group
/// is found or its kind is not MTD, QTD or YTD; an unrecognised month or
/// quarter detail only leaves the corresponding field unset.
pub fn parse_period_label(label: &str) -> Option<ParsedLabel> {
    let caps = LABEL_RE.captures(label)?;
    let kind = PeriodKind::from_token(caps.get(1)?.as_str())?;
    let detail = caps.get(2).map_or("", |m| m.as_str());
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;

    let (month, quarter) = match kind {
        PeriodKind::Mtd => (month_from_abbrev(detail), None),
        PeriodKind::Qtd => (None, quarter_from_detail(detail)),
        PeriodKind::Ytd => (None, None),
    };

    Some(ParsedLabel {
        kind,
        year,
        month,
        quarter,
    })
}

/// Parse a month selector from user input: `all`, `1`..`12`, or `Jan`..`Dec`.
pub fn parse_month_selection(s: &str) -> Option<Selection> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("all") {
        return Some(Selection::All);
    }
    if let Some(m) = month_from_abbrev(s) {
        return Some(Selection::Only(m));
    }
    match s.parse::<u32>() {
        Ok(m @ 1..=12) => Some(Selection::Only(m)),
        _ => None,
    }
}

/// Parse a quarter selector from user input: `all`, `1`..`4`, or `Q1`..`Q4`.
pub fn parse_quarter_selection(s: &str) -> Option<Selection> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("all") {
        return Some(Selection::All);
    }
    if let Some(q) = quarter_from_detail(&s.to_ascii_uppercase()) {
        return Some(Selection::Only(q));
    }
    match s.parse::<u32>() {
        Ok(q @ 1..=4) => Some(Selection::Only(q)),
        _ => None,
    }
}

impl NormalizedRecord {
    /// Canonical label for this record's period, e.g. `MTD (Jun 2025)`.
    /// An unset month or quarter renders as `?`.
    pub fn period_label(&self) -> String {
        match self.period_kind {
            PeriodKind::Mtd => {
                let month = self.month.and_then(month_abbrev).unwrap_or("?");
                format!("MTD ({} {})", month, self.year)
            }
            PeriodKind::Qtd => match self.quarter {
                Some(q) => format!("QTD (Q{} {})", q, self.year),
                None => format!("QTD (? {})", self.year),
            },
            PeriodKind::Ytd => format!("YTD ({})", self.year),
        }
    }
}

impl PeriodFilter {
    /// Human readable title used for report headings.
    pub fn title(&self) -> String {
        match &self.period {
            FilterPeriod::Mtd(Selection::Only(m)) => match month_abbrev(*m) {
                Some(name) => format!("MTD ({} {})", name, self.year),
                None => format!("MTD (month {} {})", m, self.year),
            },
            FilterPeriod::Mtd(Selection::All) => format!("MTD (all months {})", self.year),
            FilterPeriod::Qtd(Selection::Only(q)) => format!("QTD (Q{} {})", q, self.year),
            FilterPeriod::Qtd(Selection::All) => format!("QTD (all quarters {})", self.year),
            FilterPeriod::Ytd => format!("YTD ({})", self.year),
            FilterPeriod::Other(token) => format!("{} ({})", token, self.year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_labels() {
        assert_eq!(
            parse_period_label("MTD (Jun 2025)"),
            Some(ParsedLabel { kind: PeriodKind::Mtd, year: 2025, month: Some(6), quarter: None })
        );
        assert_eq!(
            parse_period_label("QTD (Q2 2025)"),
            Some(ParsedLabel { kind: PeriodKind::Qtd, year: 2025, month: None, quarter: Some(2) })
        );
        assert_eq!(
            parse_period_label("YTD (2025)"),
            Some(ParsedLabel { kind: PeriodKind::Ytd, year: 2025, month: None, quarter: None })
        );
    }

    #[test]
    fn tolerates_spacing_variations() {
        let parsed = parse_period_label("  MTD(Dec  2024 ) ").unwrap();
        assert_eq!(parsed.month, Some(12));
        assert_eq!(parsed.year, 2024);
        assert_eq!(parse_period_label("QTD (Q42025)").unwrap().quarter, Some(4));
    }

    #[test]
    fn rejects_labels_outside_the_grammar() {
        for label in [
            "Unknown Format",
            "MTD 2025",
            "MTD (Jun 25)",
            "WTD (Jun 2025)",
            "mtd (Jun 2025)",
            "MTD (Jun 2025",
            "YTD ()",
            "",
        ] {
            assert_eq!(parse_period_label(label), None, "label {:?}", label);
        }
    }

    #[test]
    fn finds_the_period_inside_surrounding_text() {
        let expected = Some(ParsedLabel { kind: PeriodKind::Mtd, year: 2025, month: Some(6), quarter: None });
        assert_eq!(parse_period_label("MTD (Jun 2025) - revised"), expected);
        assert_eq!(parse_period_label("Revenue MTD (Jun 2025)"), expected);
        assert_eq!(parse_period_label("MTD (Jun 2025)*"), expected);
        assert_eq!(parse_period_label("Total YTD (2024) final").unwrap().year, 2024);
    }

    #[test]
    fn unknown_month_is_kept_without_month() {
        let parsed = parse_period_label("MTD (June 2025)").unwrap();
        assert_eq!(parsed.kind, PeriodKind::Mtd);
        assert_eq!(parsed.month, None);

        // Month abbreviations are case-sensitive.
        assert_eq!(parse_period_label("MTD (jun 2025)").unwrap().month, None);
    }

    #[test]
    fn out_of_range_quarter_is_kept_without_quarter() {
        let parsed = parse_period_label("QTD (Q5 2025)").unwrap();
        assert_eq!(parsed.kind, PeriodKind::Qtd);
        assert_eq!(parsed.quarter, None);
        assert_eq!(parse_period_label("QTD (Q12 2025)").unwrap().quarter, None);
    }

    #[test]
    fn selection_parsing() {
        assert_eq!(parse_month_selection("all"), Some(Selection::All));
        assert_eq!(parse_month_selection("ALL"), Some(Selection::All));
        assert_eq!(parse_month_selection("Jun"), Some(Selection::Only(6)));
        assert_eq!(parse_month_selection("11"), Some(Selection::Only(11)));
        assert_eq!(parse_month_selection("13"), None);
        assert_eq!(parse_quarter_selection("q3"), Some(Selection::Only(3)));
        assert_eq!(parse_quarter_selection("2"), Some(Selection::Only(2)));
        assert_eq!(parse_quarter_selection("Q0"), None);
    }

    #[test]
    fn filter_titles() {
        assert_eq!(PeriodFilter::mtd(2025, Selection::Only(6)).title(), "MTD (Jun 2025)");
        assert_eq!(PeriodFilter::qtd(2025, Selection::All).title(), "QTD (all quarters 2025)");
        assert_eq!(PeriodFilter::ytd(2024).title(), "YTD (2024)");
    }
}

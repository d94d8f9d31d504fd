//! Structured calculation log.
//!
//! A line is a sequence of text segments and tagged amounts. Amounts carry
//! their native currency, so a renderer can show them converted without
//! parsing text back into numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Segment {
    Text(String),
    Amount(Money),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// One derivation line per complete section.
    Section,
    /// Heading above the coefficient lines of a section.
    CoefficientHeader,
    Coefficient,
    /// Sum of the contributing sections.
    Summary,
    /// Validation message of a rejected form.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub kind: LineKind,
    pub segments: Vec<Segment>,
}

impl LogLine {
    pub fn new(kind: LineKind) -> Self {
        Self {
            kind,
            segments: Vec::new(),
        }
    }

    pub fn text(
        mut self,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        // Adjacent text segments merge into one.
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(&text),
            _ => self.segments.push(Segment::Text(text)),
        }
        self
    }

    pub fn amount(
        mut self,
        money: Money,
    ) -> Self {
        self.segments.push(Segment::Amount(money));
        self
    }

    pub fn amounts(&self) -> impl Iterator<Item = &Money> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Amount(m) => Some(m),
            Segment::Text(_) => None,
        })
    }

    /// Renders the line with every amount formatted by `format_amount`.
    pub fn render_with(
        &self,
        format_amount: impl Fn(&Money) -> String,
    ) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.clone(),
                Segment::Amount(m) => format_amount(m),
            })
            .collect()
    }

    /// Renders the line in each amount's native currency.
    pub fn render(&self) -> String {
        self.render_with(Money::to_string)
    }
}

impl fmt::Display for LogLine {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn line() -> LogLine {
        LogLine::new(LineKind::Section)
            .text("Часова ставка: 10 ч. * ")
            .amount(Money::bgn(dec!(200)))
            .text("/ч. = ")
            .amount(Money::bgn(dec!(2000)))
    }

    #[test]
    fn render_uses_native_currency() {
        assert_eq!(
            line().render(),
            "Часова ставка: 10 ч. * 200.00 лв./ч. = 2000.00 лв."
        );
    }

    #[test]
    fn render_with_formats_amounts_through_closure() {
        let rendered = line().render_with(|m| format!("<{}>", m.amount));

        assert_eq!(rendered, "Часова ставка: 10 ч. * <200>/ч. = <2000>");
    }

    #[test]
    fn adjacent_text_segments_merge() {
        let line = LogLine::new(LineKind::Summary).text("ОБЩО").text(" = ");

        assert_eq!(line.segments, vec![Segment::Text("ОБЩО = ".to_string())]);
    }

    #[test]
    fn amounts_lists_tagged_money() {
        let amounts: Vec<_> = line().amounts().copied().collect();

        assert_eq!(amounts, vec![Money::bgn(dec!(200)), Money::bgn(dec!(2000))]);
    }

    #[test]
    fn serializes_with_tagged_segments() {
        let value = serde_json::to_value(LogLine::new(LineKind::Error).text("bad")).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "kind": "error",
                "segments": [{ "type": "text", "value": "bad" }]
            })
        );
    }
}

// Scores and filters for the mean tables.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::*;

static FILTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([=!<>]{1,2})\s+(.+)$").expect("valid filter regex"));

/// The score of a value: its numeric value if it is a number, or the score of
/// its label otherwise. Labels without a score and empty cells have no score.
pub fn to_score(value: &RawValue, score_map: &ScoreMap) -> Option<f64> {
    match value {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Some(n),
            _ => score_map.get(&s.to_lowercase()).map(|x| *x as f64),
        },
        RawValue::Absent => None,
    }
}

impl FilterExpr {
    /// Parses an expression of the form `<op> <operand>`.
    ///
    /// Only the six comparison operators are accepted. A label operand can only
    /// be tested for (in)equality.
    pub fn parse(expr: &str) -> Result<FilterExpr, TableErrors> {
        let malformed = || TableErrors::MalformedFilter(expr.to_string());
        let caps = FILTER_RE.captures(expr.trim()).ok_or_else(malformed)?;
        let op = match &caps[1] {
            "==" => FilterOp::Eq,
            "!=" => FilterOp::Ne,
            "<" => FilterOp::Lt,
            "<=" => FilterOp::Le,
            ">" => FilterOp::Gt,
            ">=" => FilterOp::Ge,
            _ => return Err(malformed()),
        };
        let raw_operand = caps[2].trim();
        let operand = match raw_operand.parse::<f64>() {
            Ok(n) if n.is_finite() => FilterOperand::Number(n),
            _ => match op {
                FilterOp::Eq | FilterOp::Ne => FilterOperand::Label(raw_operand.to_lowercase()),
                _ => return Err(malformed()),
            },
        };
        debug!("FilterExpr::parse: {:?} -> {:?} {:?}", expr, op, operand);
        Ok(FilterExpr { op, operand })
    }

    /// Whether a value with the given score passes the filter.
    pub fn accepts(&self, value: &RawValue, score: Option<f64>) -> bool {
        match &self.operand {
            FilterOperand::Number(rhs) => match score {
                Some(lhs) => match self.op {
                    FilterOp::Eq => lhs == *rhs,
                    FilterOp::Ne => lhs != *rhs,
                    FilterOp::Lt => lhs < *rhs,
                    FilterOp::Le => lhs <= *rhs,
                    FilterOp::Gt => lhs > *rhs,
                    FilterOp::Ge => lhs >= *rhs,
                },
                None => false,
            },
            FilterOperand::Label(rhs) => {
                let same = value.as_text().as_deref() == Some(rhs.as_str());
                match self.op {
                    FilterOp::Ne => !same,
                    _ => same,
                }
            }
        }
    }
}

/// Applies the optional filter to a sequence of values.
pub fn passes_filter(filter: Option<&FilterExpr>, values: &[(&RawValue, Option<f64>)]) -> Vec<bool> {
    values
        .iter()
        .map(|(v, score)| filter.map(|f| f.accepts(v, *score)).unwrap_or(true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    fn score_map() -> ScoreMap {
        [("yes".to_string(), 1), ("no".to_string(), 0)].into_iter().collect()
    }

    #[test]
    fn scores() {
        let sm = score_map();
        assert_eq!(to_score(&text("yes"), &sm), Some(1.0));
        assert_eq!(to_score(&text("No"), &sm), Some(0.0));
        assert_eq!(to_score(&text("4"), &sm), Some(4.0));
        assert_eq!(to_score(&text("2.5"), &sm), Some(2.5));
        assert_eq!(to_score(&RawValue::Number(3.0), &sm), Some(3.0));
        assert_eq!(to_score(&text("maybe"), &sm), None);
        assert_eq!(to_score(&RawValue::Absent, &sm), None);
    }

    #[test]
    fn parses_the_six_operators() {
        for (s, op) in [
            ("== 1", FilterOp::Eq),
            ("!= 1", FilterOp::Ne),
            ("< 1", FilterOp::Lt),
            ("<= 1", FilterOp::Le),
            ("> 1", FilterOp::Gt),
            (">= 1", FilterOp::Ge),
        ] {
            let f = FilterExpr::parse(s).unwrap();
            assert_eq!(f.op, op);
            assert_eq!(f.operand, FilterOperand::Number(1.0));
        }
        let f = FilterExpr::parse("!= N/A").unwrap();
        assert_eq!(f.operand, FilterOperand::Label("n/a".to_string()));
    }

    #[test]
    fn rejects_malformed_filters() {
        for s in [
            "",
            ">=3",
            "=> 3",
            "= 3",
            "<> 3",
            "> yes",
            "<= strongly agree",
        ] {
            assert_eq!(
                FilterExpr::parse(s),
                Err(TableErrors::MalformedFilter(s.to_string())),
                "{}",
                s
            );
        }
    }

    #[test]
    fn operands_are_never_evaluated() {
        let f = FilterExpr::parse("== __import__('os').system('ls')").unwrap();
        assert_eq!(
            f.operand,
            FilterOperand::Label("__import__('os').system('ls')".to_string())
        );
        let yes = text("yes");
        assert_eq!(passes_filter(Some(&f), &[(&yes, Some(1.0))]), vec![false]);
        let f = FilterExpr::parse("== Strongly Agree").unwrap();
        assert_eq!(f.operand, FilterOperand::Label("strongly agree".to_string()));
    }

    #[test]
    fn numeric_filters_use_scores() {
        let f = FilterExpr::parse("> 2").unwrap();
        let (three, one, other) = (text("3"), text("1"), text("whatever"));
        let values = vec![(&three, Some(3.0)), (&one, Some(1.0)), (&other, None)];
        assert_eq!(passes_filter(Some(&f), &values), vec![true, false, false]);
        assert_eq!(passes_filter(None, &values), vec![true, true, true]);
    }

    #[test]
    fn label_filters_use_text() {
        let f = FilterExpr::parse("!= n/a").unwrap();
        let (na, yes) = (text("n/a"), text("yes"));
        let values = vec![(&na, None), (&yes, Some(1.0))];
        assert_eq!(passes_filter(Some(&f), &values), vec![false, true]);
        let f = FilterExpr::parse("== yes").unwrap();
        assert_eq!(passes_filter(Some(&f), &values), vec![false, true]);
    }
}

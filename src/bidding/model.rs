use crate::dom::Document;
use indextree::NodeId;

pub const BID_FORM_ID: &str = "bid-form";
pub const AMOUNT_INPUT_NAME: &str = "amount";
pub const CURRENT_BID_KEY: &str = "current-bid";
pub const MIN_BID_KEY: &str = "min-bid";

// 입찰 폼에서 읽은 값
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidFormReading {
    /// 숫자로 읽을 수 없으면 `None`
    pub amount: Option<f64>,
    pub current_bid: f64,
    pub min_bid: f64,
}

impl BidFormReading {
    /// 폼 속성과 금액 입력란 읽기, 속성이 없거나 숫자가 아니면 0
    pub fn read(doc: &Document, form: NodeId) -> Self {
        let amount = doc
            .find_input_by_name(form, AMOUNT_INPUT_NAME)
            .and_then(|input| doc.value(input))
            .and_then(|v| parse_leading_number(&v));

        let attr = |key: &str| {
            doc.dataset(form, key)
                .and_then(|v| parse_leading_number(&v))
                .unwrap_or(0.0)
        };

        Self {
            amount,
            current_bid: attr(CURRENT_BID_KEY),
            min_bid: attr(MIN_BID_KEY),
        }
    }
}

/// 문자열 앞부분의 십진수 해석 (`"150 kr"` -> 150)
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_numbers() {
        assert_eq!(parse_leading_number("150"), Some(150.0));
        assert_eq!(parse_leading_number("  150.5 kr"), Some(150.5));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("7."), Some(7.0));
        assert_eq!(parse_leading_number("1e3x"), Some(1000.0));
        assert_eq!(parse_leading_number("2e"), Some(2.0));
        assert_eq!(parse_leading_number("-20"), Some(-20.0));
        assert_eq!(parse_leading_number("kr 150"), None);
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("."), None);
    }

    #[test]
    fn missing_attributes_default_to_zero() {
        let doc = Document::new();
        let input = doc
            .element("input")
            .attr("name", AMOUNT_INPUT_NAME)
            .value("abc")
            .build();
        let form = doc
            .element("form")
            .id(BID_FORM_ID)
            .data(CURRENT_BID_KEY, "n/a")
            .child(input)
            .append_to(doc.body());

        let reading = BidFormReading::read(&doc, form);

        assert_eq!(reading.amount, None);
        assert_eq!(reading.current_bid, 0.0);
        assert_eq!(reading.min_bid, 0.0);
    }
}

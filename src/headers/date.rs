use chrono::{DateTime, FixedOffset};

use super::{FieldBody, StructuredField};
use crate::error::ParseError;
use crate::header_layout::HeaderFieldFormatter;
use crate::header_layout::FOLD_WIDTH;
use crate::parse::complete;
use crate::parse::date_time::date_time;

// RFC 5322 date-time, for any year chrono can represent
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

fn format_date_time(date_time: &DateTime<FixedOffset>) -> String {
    date_time.format(DATE_FORMAT).to_string()
}

fn parse_date_time(
    element: &str,
    value: &str,
) -> Result<DateTime<FixedOffset>, ParseError> {
    complete(element, value, date_time)?
        .resolve()
        .map_err(|e| ParseError::new(element, value, e.to_string()))
}

/// Date and Resent-Date.
#[derive(Clone, Debug)]
pub struct DateField {
    date_time: DateTime<FixedOffset>,
    errors: Vec<ParseError>,
}

impl DateField {
    pub fn new(date_time: DateTime<FixedOffset>) -> Self {
        Self {
            date_time,
            errors: vec![],
        }
    }

    pub fn date_time(&self) -> &DateTime<FixedOffset> {
        &self.date_time
    }
}

impl FieldBody for DateField {
    fn encode(&self) -> String {
        format_date_time(&self.date_time)
    }

    field_errors!();
}

impl StructuredField for DateField {
    const ELEMENT: &'static str = "date-time";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        parse_date_time(Self::ELEMENT, value).map(Self::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// The trace tokens before the `;`, unfolded.
    pub info: String,
    pub date_time: DateTime<FixedOffset>,
}

/// `*received-token ";" date-time`
#[derive(Clone, Debug)]
pub struct ReceivedField {
    received: Received,
    errors: Vec<ParseError>,
}

impl ReceivedField {
    pub fn received(&self) -> &Received {
        &self.received
    }
}

impl FieldBody for ReceivedField {
    fn encode(&self) -> String {
        let mut formatter = HeaderFieldFormatter::new(FOLD_WIDTH);
        for word in self.received.info.split(' ').filter(|w| !w.is_empty()) {
            formatter.push(word, true);
        }
        formatter.push(";", false);
        formatter.push(&format_date_time(&self.received.date_time), true);
        formatter.finish()
    }

    field_errors!();
}

impl StructuredField for ReceivedField {
    const ELEMENT: &'static str = "received";

    fn parse(value: &str, _charset: &str) -> Result<Self, ParseError> {
        // a comment after the date-time may hold ';', so take the first
        // split whose remainder is a whole date-time
        let mut last_err = None;
        for (split, _) in value.match_indices(';') {
            match parse_date_time(Self::ELEMENT, &value[split + 1..]) {
                Ok(date_time) => {
                    return Ok(Self {
                        received: Received {
                            info: value[..split].trim().to_owned(),
                            date_time,
                        },
                        errors: vec![],
                    })
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            ParseError::new(Self::ELEMENT, value, "missing ';' before the date-time")
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn date_round_trips() {
        let field = DateField::parse("Fri, 18 Sep 2020 23:35:23 -0400", "UTF-8").unwrap();
        assert_eq!(field.encode(), "Fri, 18 Sep 2020 23:35:23 -0400");
    }

    #[test]
    fn bad_date_names_the_element() {
        let err = DateField::parse("not-a-date", "UTF-8").unwrap_err();
        assert_eq!(err.element, "date-time");
        assert_eq!(err.value, "not-a-date");
    }

    #[test]
    fn impossible_date_is_a_parse_error() {
        let err = DateField::parse("30 Feb 2020 10:00:00 +0000", "UTF-8").unwrap_err();
        assert!(err.reason.contains("no such date"), "{}", err.reason);
    }

    #[test]
    fn received_splits_at_last_semicolon() {
        let field = ReceivedField::parse(
            "from [192.168.1.213] by umanwizard.com ; Sat, 19 Sep 2020 16:39:37 +0000",
            "UTF-8",
        )
        .unwrap();
        assert_eq!(field.received().info, "from [192.168.1.213] by umanwizard.com");
        assert_eq!(
            field.encode(),
            "from [192.168.1.213] by umanwizard.com; Sat, 19 Sep 2020 16:39:37 +0000"
        );
    }

    #[test]
    fn received_comment_may_hold_semicolons() {
        let field = ReceivedField::parse(
            "from x by y; Sat, 19 Sep 2020 16:39:37 +0000 (UTC; relayed)",
            "UTF-8",
        )
        .unwrap();
        assert_eq!(field.received().info, "from x by y");
        assert_eq!(field.received().date_time.year(), 2020);
    }

    #[test]
    fn received_info_may_hold_semicolons() {
        let field = ReceivedField::parse(
            "from x; by y; Sat, 19 Sep 2020 16:39:37 +0000",
            "UTF-8",
        )
        .unwrap();
        assert_eq!(field.received().info, "from x; by y");
    }

    #[test]
    fn five_digit_year_is_rejected() {
        let err = DateField::parse("Sat, 1 Jan 10000 00:00:00 +0000", "UTF-8").unwrap_err();
        assert!(err.reason.contains("four digits"), "{}", err.reason);
        assert!(ReceivedField::parse("from x; 1 Jan 10000 00:00:00 +0000", "UTF-8").is_err());
    }

    #[test]
    fn any_representable_year_encodes() {
        let date_time = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(12345, 1, 1, 0, 0, 0)
            .unwrap();
        let field = DateField::new(date_time);
        assert!(field.encode().contains("12345"), "{}", field.encode());
    }

    #[test]
    fn received_without_date_fails() {
        assert!(ReceivedField::parse("from somewhere", "UTF-8").is_err());
    }
}

// Academic year buckets.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::debug;

use crate::config::*;

impl YearRange {
    /// Resolves the configured bounds against the current date.
    ///
    /// `year_end` defaults to last year, or to the current year once
    /// `rollover_month` is reached (a new academic year has started).
    pub fn resolve(
        year_start: Option<i32>,
        year_end: Option<i32>,
        today: NaiveDate,
        rollover_month: u32,
    ) -> Result<YearRange, TableErrors> {
        let mut current_year = today.year();
        if today.month() >= rollover_month {
            current_year += 1;
        }
        let start = year_start.unwrap_or(YearRange::DEFAULT_START);
        let end = year_end.unwrap_or(current_year - 1);
        if start > end {
            return Err(TableErrors::EmptyYearRange { start, end });
        }
        Ok(YearRange { start, end })
    }
}

/// First and last instants (both included) of the academic year starting in `year`.
pub fn academic_year_bounds(year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::from_ymd_opt(year, 8, 1)?.and_hms_opt(0, 0, 0)?;
    let last = NaiveDate::from_ymd_opt(year + 1, 6, 1)?.and_hms_opt(0, 0, 0)?;
    Some((first, last))
}

pub fn in_year(record: &Record, year: i32) -> bool {
    match academic_year_bounds(year) {
        Some((first, last)) => first <= record.timestamp && record.timestamp <= last,
        None => false,
    }
}

/// The records of one academic year.
#[derive(Debug, Clone)]
pub struct YearBucket<'a> {
    pub year: i32,
    pub records: Vec<&'a Record>,
}

/// Splits the records into one bucket per year of the range, in order.
/// Records outside of every academic year are not in any bucket.
pub fn partition_by_year<'a>(dataset: &'a Dataset, years: &YearRange) -> Vec<YearBucket<'a>> {
    years
        .years()
        .into_iter()
        .map(|year| {
            let records: Vec<&Record> = dataset.records.iter().filter(|r| in_year(r, year)).collect();
            debug!("partition_by_year: {}: {} records", year, records.len());
            YearBucket { year, records }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DatasetBuilder;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset(timestamps: &[&str]) -> Dataset {
        let mut b = DatasetBuilder::new(&["recordeddate".to_string()], "recordeddate").unwrap();
        for ts in timestamps {
            b.add_record(&[RawValue::Text(ts.to_string())]).unwrap();
        }
        b.build()
    }

    #[test]
    fn default_range_follows_the_calendar() {
        let r = YearRange::resolve(None, None, date(2023, 3, 10), 9).unwrap();
        assert_eq!(r, YearRange { start: 2019, end: 2022 });
        let r = YearRange::resolve(None, None, date(2023, 8, 31), 9).unwrap();
        assert_eq!(r.end, 2022);
        let r = YearRange::resolve(None, None, date(2023, 9, 1), 9).unwrap();
        assert_eq!(r.end, 2023);
        // A rollover month past December never rolls over.
        let r = YearRange::resolve(None, None, date(2023, 12, 1), 13).unwrap();
        assert_eq!(r.end, 2022);
    }

    #[test]
    fn explicit_range() {
        let r = YearRange::resolve(Some(2020), Some(2021), date(2030, 1, 1), 9).unwrap();
        assert_eq!(r.years(), vec![2020, 2021]);
        assert_eq!(
            YearRange::resolve(Some(2022), Some(2021), date(2030, 1, 1), 9),
            Err(TableErrors::EmptyYearRange {
                start: 2022,
                end: 2021
            })
        );
    }

    #[test]
    fn buckets_include_both_bounds() {
        let ds = dataset(&[
            "2020-07-31 23:59:59",
            "2020-08-01 00:00:00",
            "2021-01-15 10:00:00",
            "2021-06-01 00:00:00",
            "2021-06-01 00:00:01",
            "2021-08-02 09:00:00",
        ]);
        let buckets = partition_by_year(&ds, &YearRange { start: 2019, end: 2021 });
        let counts: Vec<(i32, usize)> = buckets.iter().map(|b| (b.year, b.records.len())).collect();
        assert_eq!(counts, vec![(2019, 0), (2020, 3), (2021, 1)]);
        for b in buckets.iter() {
            let (first, last) = academic_year_bounds(b.year).unwrap();
            assert!(b.records.iter().all(|r| first <= r.timestamp && r.timestamp <= last));
        }
    }
}

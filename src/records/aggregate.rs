use serde::Serialize;

use crate::records::repo::Record;

/// Aggregated intake for one distinct day of a month.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub day: i32,
    /// Sum of all dosages recorded that day.
    pub overall: i64,
    /// Number of records that day.
    pub servings: u32,
}

/// Fold records into one bucket per distinct day. Buckets appear in the
/// order their day first occurs in the input; they are not sorted.
pub fn aggregate_by_day(records: &[Record]) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = Vec::new();
    for record in records {
        match buckets.iter_mut().find(|b| b.day == record.day) {
            Some(bucket) => {
                bucket.overall += record.dosage as i64;
                bucket.servings += 1;
            }
            None => buckets.push(DayBucket {
                day: record.day,
                overall: record.dosage as i64,
                servings: 1,
            }),
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn record(day: i32, dosage: i32) -> Record {
        Record {
            id: Uuid::new_v4(),
            dosage,
            time: "08:00".into(),
            day,
            month: "June".into(),
            year: 2024,
            owner: Uuid::nil(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn groups_by_day_summing_and_counting() {
        let records = [record(1, 2), record(1, 3), record(2, 1)];
        let buckets = aggregate_by_day(&records);
        assert_eq!(
            buckets,
            vec![
                DayBucket { day: 1, overall: 5, servings: 2 },
                DayBucket { day: 2, overall: 1, servings: 1 },
            ]
        );
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(aggregate_by_day(&[]).is_empty());
    }

    #[test]
    fn preserves_first_occurrence_order() {
        let records = [record(15, 100), record(3, 200), record(15, 50), record(8, 10)];
        let days: Vec<i32> = aggregate_by_day(&records).iter().map(|b| b.day).collect();
        assert_eq!(days, vec![15, 3, 8]);
    }

    #[test]
    fn totals_are_conserved() {
        let records: Vec<Record> = (0..50)
            .map(|i| record(i % 7 + 1, (i + 1) * 10))
            .collect();
        let buckets = aggregate_by_day(&records);

        let total_dosage: i64 = records.iter().map(|r| r.dosage as i64).sum();
        let total_overall: i64 = buckets.iter().map(|b| b.overall).sum();
        let total_servings: u32 = buckets.iter().map(|b| b.servings).sum();

        assert_eq!(total_overall, total_dosage);
        assert_eq!(total_servings as usize, records.len());
    }

    #[test]
    fn bucket_serialization_shape() {
        let json = serde_json::to_string(&DayBucket { day: 1, overall: 5, servings: 2 }).unwrap();
        assert_eq!(json, r#"{"day":1,"overall":5,"servings":2}"#);
    }
}
